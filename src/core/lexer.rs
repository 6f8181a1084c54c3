// lexer.rs

use std::fmt;
use std::str::CharIndices;

use tracing::debug;
use unicode_ident::{is_xid_continue, is_xid_start};

use crate::core::error::{Diagnostic, ErrorKind};
use crate::core::token::{Span, Token, TokenKind};

/// Lexer error types with detailed location.
#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    UnexpectedCharacter(char, Span),
    UnterminatedString(Span),
    UnterminatedComment(Span),
    IntegerOverflow(String, Span),
}

impl LexerError {
    pub fn span(&self) -> Span {
        match self {
            LexerError::UnexpectedCharacter(_, s)
            | LexerError::UnterminatedString(s)
            | LexerError::UnterminatedComment(s)
            | LexerError::IntegerOverflow(_, s) => *s,
        }
    }
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LexerError::*;
        match self {
            UnexpectedCharacter(ch, s) => write!(f, "Illegal character '{}' at line {}", ch, s.line),
            UnterminatedString(s) => write!(f, "Unterminated string starting at {}:{}", s.line, s.column),
            UnterminatedComment(s) => write!(f, "Unterminated comment starting at {}:{}", s.line, s.column),
            IntegerOverflow(lit, s) => write!(f, "Integer literal '{}' out of range at line {}", lit, s.line),
        }
    }
}

impl std::error::Error for LexerError {}

impl From<LexerError> for Diagnostic {
    fn from(e: LexerError) -> Self {
        Diagnostic::new(ErrorKind::Lexical, e.to_string(), e.span())
    }
}

/// Streaming tokenizer over a borrowed source.
///
/// Yields `Ok(token)` for every recognised token and `Err(..)` for each
/// lexical error; after an error lexing resumes at the next character. The
/// final item is always an `EOF` token, after which the iterator is exhausted.
pub struct Lexer<'src> {
    source: &'src str,
    chars: CharIndices<'src>,
    current: Option<(usize, char)>,
    line: usize,
    col: usize,
    consumed_eof: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Self {
            source,
            chars: source.char_indices(),
            current: None,
            line: 1,
            col: 1,
            consumed_eof: false,
        };
        lexer.current = lexer.chars.next();
        lexer
    }

    #[inline]
    fn offset(&self) -> usize {
        self.current.map(|(i, _)| i).unwrap_or(self.source.len())
    }

    #[inline]
    fn advance_char(&mut self) {
        if let Some((_, ch)) = self.current {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.current = self.chars.next();
    }

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    /// Marker for the start of a token: (byte offset, line, column).
    #[inline]
    fn mark(&self) -> (usize, usize, usize) {
        (self.offset(), self.line, self.col)
    }

    fn finish(&self, kind: TokenKind, start: (usize, usize, usize)) -> Token {
        let (offset, line, col) = start;
        let end = self.offset();
        Token::new(kind, self.source[offset..end].to_string(), Span::new(offset, end, line, col))
    }

    fn span_from(&self, start: (usize, usize, usize)) -> Span {
        let (offset, line, col) = start;
        Span::new(offset, self.offset(), line, col)
    }

    pub fn next_token(&mut self) -> Option<Result<Token, LexerError>> {
        if self.consumed_eof {
            return None;
        }

        loop {
            let ch = match self.current {
                Some((_, ch)) => ch,
                None => {
                    self.consumed_eof = true;
                    let start = self.mark();
                    return Some(Ok(self.finish(TokenKind::EOF, start)));
                }
            };

            if ch == '/' {
                match self.peek_char() {
                    Some('/') => {
                        self.skip_line_comment();
                        continue;
                    }
                    Some('*') => {
                        if let Err(e) = self.skip_block_comment() {
                            return Some(Err(e));
                        }
                        continue;
                    }
                    _ => {}
                }
            }

            if ch.is_whitespace() {
                self.advance_char();
                continue;
            }

            let start = self.mark();
            let result = if ch.is_ascii_digit() {
                self.lex_number(start)
            } else if ch == '"' {
                self.lex_string(start)
            } else if ch == '~' && self.peek_char().map_or(false, |c| c.is_ascii_uppercase()) {
                Ok(self.lex_destructor(start))
            } else if is_identifier_start(ch) {
                Ok(self.lex_identifier(start))
            } else if let Some(kind) = self.match_two_char_operator(ch) {
                self.advance_char();
                self.advance_char();
                Ok(self.finish(kind, start))
            } else if let Some(kind) = match_single_char_token(ch) {
                self.advance_char();
                Ok(self.finish(kind, start))
            } else {
                // Skip exactly one character and report it.
                self.advance_char();
                Err(LexerError::UnexpectedCharacter(ch, self.span_from(start)))
            };
            return Some(result);
        }
    }

    /// Tokenizes the entire source, collecting lexical errors instead of
    /// stopping at the first one. The token list always ends with `EOF`.
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<LexerError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        for item in self.by_ref() {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => errors.push(e),
            }
        }
        debug!(tokens = tokens.len(), errors = errors.len(), "lexer finished");
        (tokens, errors)
    }

    fn skip_line_comment(&mut self) {
        while let Some((_, ch)) = self.current {
            if ch == '\n' {
                break;
            }
            self.advance_char();
        }
    }

    // Block comment: /* ... */ (non-nested)
    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        let start = self.mark();
        self.advance_char(); // '/'
        self.advance_char(); // '*'
        while let Some((_, ch)) = self.current {
            if ch == '*' && self.peek_char() == Some('/') {
                self.advance_char();
                self.advance_char();
                return Ok(());
            }
            self.advance_char();
        }
        let (offset, line, col) = start;
        Err(LexerError::UnterminatedComment(Span::new(offset, offset + 2, line, col)))
    }

    // Float literals (\d+\.\d+) are tried before integer literals (\d+).
    fn lex_number(&mut self, start: (usize, usize, usize)) -> Result<Token, LexerError> {
        while matches!(self.current, Some((_, c)) if c.is_ascii_digit()) {
            self.advance_char();
        }
        let is_float = matches!(self.current, Some((_, '.')))
            && self.peek_char().map_or(false, |c| c.is_ascii_digit());
        if is_float {
            self.advance_char(); // '.'
            while matches!(self.current, Some((_, c)) if c.is_ascii_digit()) {
                self.advance_char();
            }
            let text = &self.source[start.0..self.offset()];
            // digits '.' digits always parses
            let value = text.parse::<f64>().unwrap_or_default();
            return Ok(self.finish(TokenKind::FloatLiteral(value), start));
        }
        let text = &self.source[start.0..self.offset()];
        match text.parse::<i64>() {
            Ok(v) => Ok(self.finish(TokenKind::IntLiteral(v), start)),
            Err(_) => Err(LexerError::IntegerOverflow(text.to_string(), self.span_from(start))),
        }
    }

    fn lex_string(&mut self, start: (usize, usize, usize)) -> Result<Token, LexerError> {
        // Scan ahead on a clone so an unterminated literal only costs the quote.
        let mut ahead = self.chars.clone();
        let mut content = String::new();
        let mut escape = false;
        let mut closed = false;
        for (_, ch) in ahead.by_ref() {
            if escape {
                content.push(match ch {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                closed = true;
                break;
            } else if ch == '\n' {
                break;
            } else {
                content.push(ch);
            }
        }
        if !closed {
            self.advance_char();
            return Err(LexerError::UnterminatedString(self.span_from(start)));
        }
        // Consume the opening quote through the closing quote.
        self.advance_char();
        loop {
            match self.current {
                Some((_, '\\')) => {
                    self.advance_char();
                    self.advance_char();
                }
                Some((_, '"')) => {
                    self.advance_char();
                    break;
                }
                Some(_) => self.advance_char(),
                None => break,
            }
        }
        Ok(self.finish(TokenKind::StringLiteral(content), start))
    }

    // Destructor: '~' followed by a capitalised identifier
    fn lex_destructor(&mut self, start: (usize, usize, usize)) -> Token {
        self.advance_char(); // '~'
        let name_start = self.offset();
        while matches!(self.current, Some((_, c)) if is_identifier_part(c)) {
            self.advance_char();
        }
        let name = self.source[name_start..self.offset()].to_string();
        self.finish(TokenKind::Destructor(name), start)
    }

    fn lex_identifier(&mut self, start: (usize, usize, usize)) -> Token {
        while matches!(self.current, Some((_, c)) if is_identifier_part(c)) {
            self.advance_char();
        }
        let ident = &self.source[start.0..self.offset()];
        let kind = TokenKind::keyword(ident).unwrap_or_else(|| TokenKind::Identifier(ident.to_string()));
        self.finish(kind, start)
    }

    fn match_two_char_operator(&self, ch: char) -> Option<TokenKind> {
        let kind = match (ch, self.peek_char()?) {
            ('+', '+') => TokenKind::PlusPlus,
            ('-', '-') => TokenKind::MinusMinus,
            ('+', '=') => TokenKind::PlusEquals,
            ('-', '=') => TokenKind::MinusEquals,
            ('*', '=') => TokenKind::StarEquals,
            ('/', '=') => TokenKind::SlashEquals,
            ('%', '=') => TokenKind::PercentEquals,
            ('=', '=') => TokenKind::DoubleEquals,
            ('!', '=') => TokenKind::NotEquals,
            ('<', '=') => TokenKind::LessEqual,
            ('>', '=') => TokenKind::GreaterEqual,
            ('&', '&') => TokenKind::AndAnd,
            ('|', '|') => TokenKind::OrOr,
            _ => return None,
        };
        Some(kind)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Convenience entry point: a fresh lexer per call.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexerError>) {
    Lexer::new(source).tokenize()
}

fn match_single_char_token(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        '=' => TokenKind::Equals,
        '<' => TokenKind::LessThan,
        '>' => TokenKind::GreaterThan,
        '!' => TokenKind::Bang,
        ';' => TokenKind::Semicolon,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        '(' => TokenKind::OpenParen,
        ')' => TokenKind::CloseParen,
        '{' => TokenKind::OpenBrace,
        '}' => TokenKind::CloseBrace,
        _ => return None,
    };
    Some(kind)
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || is_xid_start(ch)
}

fn is_identifier_part(ch: char) -> bool {
    ch == '_' || is_xid_continue(ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token::TypeKeyword;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn float_before_int() {
        assert_eq!(
            kinds("3.25 7 8."),
            vec![
                TokenKind::FloatLiteral(3.25),
                TokenKind::IntLiteral(7),
                TokenKind::IntLiteral(8),
                TokenKind::Dot,
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            kinds("i++ += == = <= !"),
            vec![
                TokenKind::Identifier("i".into()),
                TokenKind::PlusPlus,
                TokenKind::PlusEquals,
                TokenKind::DoubleEquals,
                TokenKind::Equals,
                TokenKind::LessEqual,
                TokenKind::Bang,
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn comments_advance_lines() {
        let (tokens, errors) = tokenize("/* a\n b */ int // tail\nx");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Type(TypeKeyword::Int));
        assert_eq!(tokens[0].line(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Identifier("x".into()));
        assert_eq!(tokens[1].line(), 3);
    }

    #[test]
    fn illegal_character_skips_one() {
        let (tokens, errors) = tokenize("int @x;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexerError::UnexpectedCharacter('@', _)));
        let k: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            k,
            vec![
                TokenKind::Type(TypeKeyword::Int),
                TokenKind::Identifier("x".into()),
                TokenKind::Semicolon,
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn destructor_token() {
        assert_eq!(kinds("~Point"), vec![TokenKind::Destructor("Point".into()), TokenKind::EOF]);
        let (_, errors) = tokenize("~point");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn string_escapes_and_unterminated() {
        assert_eq!(
            kinds(r#""a\"b\n""#),
            vec![TokenKind::StringLiteral("a\"b\n".into()), TokenKind::EOF]
        );
        let (tokens, errors) = tokenize("\"abc");
        assert!(matches!(errors[0], LexerError::UnterminatedString(_)));
        assert_eq!(tokens[0].kind, TokenKind::Identifier("abc".into()));
    }

    #[test]
    fn lexer_is_lazy_and_finite() {
        let mut lx = Lexer::new("a b");
        assert!(matches!(lx.next(), Some(Ok(Token { kind: TokenKind::Identifier(_), .. }))));
        assert!(matches!(lx.next(), Some(Ok(Token { kind: TokenKind::Identifier(_), .. }))));
        assert!(matches!(lx.next(), Some(Ok(Token { kind: TokenKind::EOF, .. }))));
        assert!(lx.next().is_none());
    }
}
