// src/core/diagnostics.rs
//! Source-line + caret rendering for diagnostics of every stage:
//!
//! ```text
//! int x = 1 @ 2;
//!           ^
//! 1: Lexical error: Illegal character '@' at line 1
//! ```

use colored::Colorize;

use crate::core::error::Diagnostic;
use crate::core::token::Span;

/// The source line a span starts on, plus the caret underline beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// Whitespace that lines the carets up under the span (tabs preserved).
    pub pad: String,
    pub carets: String,
    pub column: usize,
}

/// Underlines the part of `span` that lies on its first line; at least one caret.
pub fn snippet(source: &str, span: Span) -> Snippet {
    let start = char_floor(source, span.start.min(source.len()));
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[start..].find('\n').map(|i| start + i).unwrap_or(source.len());
    let end = char_floor(source, span.end.clamp(start, line_end));

    let text = source[line_start..line_end].trim_end_matches('\r').to_string();
    let prefix = &source[line_start..start];
    let pad: String = prefix.chars().map(|c| if c == '\t' { '\t' } else { ' ' }).collect();
    let width = source[start..end].chars().count().max(1);
    Snippet { text, pad, carets: "^".repeat(width), column: prefix.chars().count() + 1 }
}

fn char_floor(source: &str, mut idx: usize) -> usize {
    while idx > 0 && !source.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Plain three-line rendering.
pub fn render(source: &str, diag: &Diagnostic) -> String {
    let s = snippet(source, diag.span);
    format!("{}\n{}{}\n{}", s.text, s.pad, s.carets, diag)
}

pub fn render_all(source: &str, diags: &[Diagnostic]) -> String {
    diags.iter().map(|d| render(source, d)).collect::<Vec<_>>().join("\n")
}

/// Colored rendering to stderr, headed by the file location.
pub fn print_diagnostic(filename: &str, source: &str, diag: &Diagnostic) {
    let s = snippet(source, diag.span);
    eprintln!(
        "{} {}",
        "-->".bright_blue(),
        format!("{}:{}:{}", filename, diag.line(), s.column).bright_white()
    );
    eprintln!("{}", s.text);
    eprintln!("{}{}", s.pad, s.carets.bright_red());
    eprintln!(
        "{}: {} {}",
        diag.line(),
        format!("{} error:", diag.kind).bright_red().bold(),
        diag.message
    );
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn caret_under_span_on_second_line() {
        let src = "int a = 1;\nint b = a + c;\n";
        let start = src.find('c').unwrap();
        let d = Diagnostic::new(ErrorKind::Semantic, "'c' is not declared", Span::new(start, start + 1, 2, 13));
        insta::assert_snapshot!(render(src, &d), @r###"
        int b = a + c;
                    ^
        2: Semantic error: 'c' is not declared
        "###);
    }

    #[test]
    fn multi_line_span_is_cut_at_line_end() {
        let src = "printf(1 +\n 2);";
        let d = Diagnostic::new(ErrorKind::Runtime, "boom", Span::new(7, 13, 1, 8));
        let s = snippet(src, d.span);
        assert_eq!(s.text, "printf(1 +");
        assert_eq!(s.carets, "^^^");
        assert_eq!(s.column, 8);
    }

    #[test]
    fn empty_span_at_eof_still_gets_a_caret() {
        let src = "int x = 1";
        let s = snippet(src, Span::new(9, 9, 1, 10));
        assert_eq!(s.pad.len(), 9);
        assert_eq!(s.carets, "^");
    }

    #[test]
    fn tabs_are_kept_in_padding() {
        let s = snippet("\tx;", Span::new(1, 2, 1, 2));
        assert_eq!(s.pad, "\t");
    }
}
