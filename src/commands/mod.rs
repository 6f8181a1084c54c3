//! One module per subcommand. Each returns `Ok(true)` when no diagnostic was
//! reported, `Ok(false)` otherwise; I/O failures surface as errors.

pub mod ast;
pub mod check;
pub mod run;
pub mod symbols;
pub mod tokens;

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::diagnostics::print_diagnostic;
use crate::core::error::{CoreError, Diagnostic, ErrorKind};

pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Read source {}", path.display()))
}

pub(crate) fn report(path: &Path, source: &str, diags: &[Diagnostic]) {
    let name = path.display().to_string();
    for d in diags {
        print_diagnostic(&name, source, d);
    }
}

/// Prints the diagnostics of a rejected stage plus the line saying what it blocked.
pub(crate) fn report_rejection(path: &Path, source: &str, err: &CoreError) {
    report(path, source, err.diagnostics());
    let CoreError::Rejected { stage, .. } = err;
    eprintln!("{}", blocked_message(*stage));
}

pub(crate) fn blocked_message(stage: ErrorKind) -> &'static str {
    match stage {
        ErrorKind::Lexical | ErrorKind::Syntax => {
            "the checker could not start because the parser reported errors"
        }
        ErrorKind::Semantic => "the interpreter could not start because the checker reported errors",
        ErrorKind::Runtime => "execution stopped on a runtime error",
    }
}
