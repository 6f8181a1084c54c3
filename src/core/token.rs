// src/core/token.rs
use std::fmt;

/// Byte range into the original source plus the 1-based line/column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self { start, end, line, column }
    }

    /// Smallest span covering both `self` and `other` (position taken from `self`).
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKeyword {
    Int,
    Float,
    Bool,
    Void,
    String,
}

impl fmt::Display for TypeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKeyword::Int => "int",
            TypeKeyword::Float => "float",
            TypeKeyword::Bool => "bool",
            TypeKeyword::Void => "void",
            TypeKeyword::String => "string",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Identifiers and literals
    Identifier(String),
    Destructor(String), // ~Name
    IntLiteral(i64),
    FloatLiteral(f64),
    BoolLiteral(bool),
    StringLiteral(String),
    Type(TypeKeyword),

    // Keywords
    Class,
    If,
    Else,
    While,
    For,
    Return,
    Break,
    Continue,
    Size,
    Printf,
    This,
    Null,

    // Operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    PlusPlus,     // ++
    MinusMinus,   // --
    Equals,       // =
    PlusEquals,   // +=
    MinusEquals,  // -=
    StarEquals,   // *=
    SlashEquals,  // /=
    PercentEquals, // %=
    DoubleEquals, // ==
    NotEquals,    // !=
    LessThan,     // <
    LessEqual,    // <=
    GreaterThan,  // >
    GreaterEqual, // >=
    AndAnd,       // &&
    OrOr,         // ||
    Bang,         // !

    // Delimiters
    OpenParen,  // (
    CloseParen, // )
    OpenBrace,  // {
    CloseBrace, // }
    Comma,      // ,
    Semicolon,  // ;
    Dot,        // .

    EOF,
}

impl TokenKind {
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "int" => TokenKind::Type(TypeKeyword::Int),
            "float" => TokenKind::Type(TypeKeyword::Float),
            "bool" => TokenKind::Type(TypeKeyword::Bool),
            "void" => TokenKind::Type(TypeKeyword::Void),
            "string" => TokenKind::Type(TypeKeyword::String),
            "class" => TokenKind::Class,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "size" => TokenKind::Size,
            "printf" => TokenKind::Printf,
            "this" => TokenKind::This,
            "null" => TokenKind::Null,
            "true" => TokenKind::BoolLiteral(true),
            "false" => TokenKind::BoolLiteral(false),
            _ => return None,
        };
        Some(kind)
    }

    /// Tokens that may begin a statement; used as resynchronisation points.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Size
                | TokenKind::Printf
                | TokenKind::Type(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }
}

// Implement Display for TokenKind for better error messages
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier(_) => "IDENTIFIER",
            TokenKind::Destructor(_) => "DESTRUCTOR",
            TokenKind::IntLiteral(_) => "INT_LITERAL",
            TokenKind::FloatLiteral(_) => "FLOAT_LITERAL",
            TokenKind::BoolLiteral(_) => "BOOL_LITERAL",
            TokenKind::StringLiteral(_) => "STRING_LITERAL",
            TokenKind::Type(_) => "TYPE_SPECIFIER",
            TokenKind::Class => "CLASS",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::For => "FOR",
            TokenKind::Return => "RETURN",
            TokenKind::Break => "BREAK",
            TokenKind::Continue => "CONTINUE",
            TokenKind::Size => "SIZE",
            TokenKind::Printf => "PRINTF",
            TokenKind::This => "THIS",
            TokenKind::Null => "NULL",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "TIMES",
            TokenKind::Slash => "DIVIDE",
            TokenKind::Percent => "MOD",
            TokenKind::PlusPlus => "PLUSPLUS",
            TokenKind::MinusMinus => "MINUSMINUS",
            TokenKind::Equals => "ASSIGN",
            TokenKind::PlusEquals => "ADDEQ",
            TokenKind::MinusEquals => "MINEQ",
            TokenKind::StarEquals => "TIMESEQ",
            TokenKind::SlashEquals => "DIVIDEEQ",
            TokenKind::PercentEquals => "MODULEEQ",
            TokenKind::DoubleEquals => "EQUAL",
            TokenKind::NotEquals => "NOT_EQUAL",
            TokenKind::LessThan => "LESS",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::GreaterThan => "GREATER",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::AndAnd => "AND",
            TokenKind::OrOr => "OR",
            TokenKind::Bang => "NOT",
            TokenKind::OpenParen => "LEFT_PAREN",
            TokenKind::CloseParen => "RIGHT_PAREN",
            TokenKind::OpenBrace => "LEFT_BRACE",
            TokenKind::CloseBrace => "RIGHT_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Dot => "DOT",
            TokenKind::EOF => "EOF",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}('{}') @{}:{}", self.kind, self.lexeme, self.line(), self.column())
    }
}
