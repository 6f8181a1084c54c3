// src/core/compiler.rs
//! Mini C++ pipeline: lexing, parsing, checking and interpretation.
//! Each entry point stops at the first stage that reports errors; the
//! interpreter is only reachable through a clean checker pass.

use tracing::debug;

use crate::core::{
    ast::Program,
    error::{CoreError, Diagnostic, ErrorKind},
    lexer::Lexer,
    parser::Parser,
    semantic_analyzer::SemanticAnalyzer,
    symbols::SymbolTable,
    token::Token,
    vm::{Interpreter, DEFAULT_MAX_CALL_DEPTH},
};

/// What a run produced: every printed line, and the runtime error that
/// stopped it, if any.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub output: Vec<String>,
    pub errors: Vec<Diagnostic>,
}

impl RunOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Compiler {
    echo: bool,
    max_call_depth: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Compiler { echo: false, max_call_depth: DEFAULT_MAX_CALL_DEPTH }
    }

    /// Print `printf` output to stdout while running.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Token stream (ending in EOF) and the lexical errors met on the way.
    pub fn tokenize(&self, source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        let (tokens, errors) = Lexer::new(source).tokenize();
        (tokens, errors.into_iter().map(Diagnostic::from).collect())
    }

    /// Lexes and parses; the program holds whatever parsed cleanly.
    pub fn parse(&self, source: &str) -> (Program, Vec<Diagnostic>) {
        let (tokens, mut diags) = self.tokenize(source);
        let (program, errors) = Parser::new(tokens).parse();
        diags.extend(errors.into_iter().map(Diagnostic::from));
        (program, diags)
    }

    /// Parses and rejects on any lexical or syntax error.
    pub fn parse_source(&self, source: &str) -> Result<Program, CoreError> {
        let (program, diags) = self.parse(source);
        if diags.is_empty() {
            return Ok(program);
        }
        let stage = if diags.iter().any(|d| d.kind == ErrorKind::Syntax) {
            ErrorKind::Syntax
        } else {
            ErrorKind::Lexical
        };
        Err(CoreError::Rejected { stage, diagnostics: diags })
    }

    /// Runs the checker over a parsed program; the symbol table is returned
    /// even when errors were found.
    pub fn analyze(&self, program: &Program) -> (SymbolTable, Vec<Diagnostic>) {
        let mut analyzer = SemanticAnalyzer::new();
        let mut diags = Vec::new();
        analyzer.check(program, &mut diags);
        (analyzer.into_symbols(), diags)
    }

    pub fn check_source(&self, source: &str) -> Result<(Program, SymbolTable), CoreError> {
        let program = self.parse_source(source)?;
        let (symbols, diags) = self.analyze(&program);
        if !diags.is_empty() {
            return Err(CoreError::Rejected { stage: ErrorKind::Semantic, diagnostics: diags });
        }
        Ok((program, symbols))
    }

    /// Checks, then interprets. A program with semantic errors never starts.
    pub fn run(&self, program: &Program) -> Result<RunOutcome, CoreError> {
        let (_, diags) = self.analyze(program);
        if !diags.is_empty() {
            return Err(CoreError::Rejected { stage: ErrorKind::Semantic, diagnostics: diags });
        }
        let mut interpreter =
            Interpreter::new().with_echo(self.echo).with_max_call_depth(self.max_call_depth);
        let result = interpreter.interpret(program);
        let outcome = RunOutcome {
            output: interpreter.take_output(),
            errors: result.err().map(Diagnostic::from).into_iter().collect(),
        };
        debug!(lines = outcome.output.len(), ok = outcome.is_ok(), "run finished");
        Ok(outcome)
    }

    pub fn run_source(&self, source: &str) -> Result<RunOutcome, CoreError> {
        let program = self.parse_source(source)?;
        self.run(&program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_result_is_printed() {
        let outcome = Compiler::new().run_source("int f() { return 2 + 2; } printf(f());").unwrap();
        assert_eq!(outcome.output, vec!["4"]);
        assert!(outcome.is_ok());
    }

    #[test]
    fn checker_errors_prevent_running() {
        let err = Compiler::new().run_source("printf(1); printf(y);").unwrap_err();
        let CoreError::Rejected { stage, diagnostics } = err;
        assert_eq!(stage, ErrorKind::Semantic);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn lexical_errors_are_collected_with_syntax_errors() {
        let (_, diags) = Compiler::new().parse("int x = 1 @ 2; int = ;");
        assert_eq!(diags[0].kind, ErrorKind::Lexical);
        assert!(diags.iter().any(|d| d.kind == ErrorKind::Syntax));
    }

    #[test]
    fn runtime_error_keeps_earlier_output() {
        let outcome = Compiler::new().run_source("printf(\"before\"); int z = 0; printf(3 / z);").unwrap();
        assert_eq!(outcome.output, vec!["before"]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, ErrorKind::Runtime);
    }
}
