use std::fmt;

use crate::core::token::Span;

/// Which stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lexical => "Lexical",
            ErrorKind::Syntax => "Syntax",
            ErrorKind::Semantic => "Semantic",
            ErrorKind::Runtime => "Runtime",
        };
        f.write_str(name)
    }
}

/// A user-visible error anchored to a source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self { kind, message: message.into(), span }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} error: {}", self.span.line, self.kind, self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Pipeline-level failure: a stage reported one or more diagnostics.
#[derive(Debug)]
pub enum CoreError {
    Rejected { stage: ErrorKind, diagnostics: Vec<Diagnostic> },
}

impl CoreError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CoreError::Rejected { diagnostics, .. } => diagnostics,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Rejected { stage, diagnostics } => {
                write!(f, "{} stage reported {} error(s)", stage, diagnostics.len())
            }
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(ErrorKind::Semantic, "'x' is not declared", Span::new(0, 1, 3, 1));
        assert_eq!(format!("{}", d), "3: Semantic error: 'x' is not declared");
    }

    #[test]
    fn rejected_display_counts() {
        let d = Diagnostic::new(ErrorKind::Syntax, "boom", Span::default());
        let err = CoreError::Rejected { stage: ErrorKind::Syntax, diagnostics: vec![d.clone(), d] };
        assert_eq!(format!("{}", err), "Syntax stage reported 2 error(s)");
        assert_eq!(err.diagnostics().len(), 2);
    }
}
