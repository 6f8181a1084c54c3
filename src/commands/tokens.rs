use anyhow::Result;
use std::fmt::Write;
use std::path::Path;

use crate::core::compiler::Compiler;
use crate::core::token::Token;

pub fn main(input: &Path) -> Result<bool> {
    let source = super::read_source(input)?;
    let (tokens, diags) = Compiler::new().tokenize(&source);
    print!("{}", table(&tokens));
    super::report(input, &source, &diags);
    Ok(diags.is_empty())
}

/// Kind / lexeme / line, one token per row.
pub fn table(tokens: &[Token]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<16} {:<24} {}", "KIND", "LEXEME", "LINE");
    for t in tokens {
        let _ = writeln!(out, "{:<16} {:<24} {}", t.kind.to_string(), t.lexeme, t.line());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_per_token_plus_header() {
        let (tokens, _) = Compiler::new().tokenize("int x = 1;");
        let text = table(&tokens);
        assert_eq!(text.lines().count(), tokens.len() + 1);
        assert!(text.lines().nth(2).unwrap().contains('x'));
    }
}
