use anyhow::{Context, Result};
use std::path::Path;

use crate::core::compiler::Compiler;

pub fn main(input: &Path, json: bool) -> Result<bool> {
    let source = super::read_source(input)?;
    let compiler = Compiler::new();
    let program = match compiler.parse_source(&source) {
        Ok(p) => p,
        Err(e) => {
            super::report_rejection(input, &source, &e);
            return Ok(false);
        }
    };
    let (table, diags) = compiler.analyze(&program);
    if json {
        let text = serde_json::to_string_pretty(&table).context("Serialize symbol table")?;
        println!("{}", text);
    } else {
        print!("{}", table.dump());
    }
    super::report(input, &source, &diags);
    Ok(diags.is_empty())
}
