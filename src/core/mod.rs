//! Core module tree for the Mini C++ front end and interpreter.

pub mod ast;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod semantic_analyzer;
mod stack;
pub mod symbols;
pub mod token;
pub use token::TokenKind;
pub mod types;
pub mod vm;
