use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::core::compiler::Compiler;

pub fn main(input: &Path) -> Result<bool> {
    let source = super::read_source(input)?;
    match Compiler::new().check_source(&source) {
        Ok(_) => {
            println!("{} {}", "ok:".green().bold(), input.display());
            Ok(true)
        }
        Err(e) => {
            super::report_rejection(input, &source, &e);
            Ok(false)
        }
    }
}
