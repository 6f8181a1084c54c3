use anyhow::Result;
use std::path::Path;

use crate::core::compiler::Compiler;

/// Runs with `printf` output echoed to stdout as it happens.
pub fn main(input: &Path, max_call_depth: usize) -> Result<bool> {
    let source = super::read_source(input)?;
    let compiler = Compiler::new().with_echo(true).with_max_call_depth(max_call_depth);
    match compiler.run_source(&source) {
        Ok(outcome) => {
            super::report(input, &source, &outcome.errors);
            Ok(outcome.is_ok())
        }
        Err(e) => {
            super::report_rejection(input, &source, &e);
            Ok(false)
        }
    }
}
