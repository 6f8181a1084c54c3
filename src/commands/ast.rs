use anyhow::Result;
use std::path::Path;

use crate::core::compiler::Compiler;

pub fn main(input: &Path) -> Result<bool> {
    let source = super::read_source(input)?;
    let (program, diags) = Compiler::new().parse(&source);
    for stmt in &program.decls {
        println!("{:#?}", stmt);
    }
    super::report(input, &source, &diags);
    Ok(diags.is_empty())
}
