use minicpp::core::lexer::{tokenize, Lexer, LexerError};
use minicpp::core::token::{TokenKind, TypeKeyword};

fn kinds(src: &str) -> Vec<TokenKind> {
    let (tokens, errors) = tokenize(src);
    assert!(errors.is_empty(), "unexpected lexical errors: {errors:?}");
    tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn declaration_with_keywords_and_literals() {
    assert_eq!(
        kinds("float r = 2.5; bool ok = true;"),
        vec![
            TokenKind::Type(TypeKeyword::Float),
            TokenKind::Identifier("r".into()),
            TokenKind::Equals,
            TokenKind::FloatLiteral(2.5),
            TokenKind::Semicolon,
            TokenKind::Type(TypeKeyword::Bool),
            TokenKind::Identifier("ok".into()),
            TokenKind::Equals,
            TokenKind::BoolLiteral(true),
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn two_char_operators_win_over_single() {
    assert_eq!(
        kinds("a += b++ <= c && !d"),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::PlusEquals,
            TokenKind::Identifier("b".into()),
            TokenKind::PlusPlus,
            TokenKind::LessEqual,
            TokenKind::Identifier("c".into()),
            TokenKind::AndAnd,
            TokenKind::Bang,
            TokenKind::Identifier("d".into()),
            TokenKind::EOF,
        ]
    );
}

#[test]
fn integer_before_member_dot_is_not_a_float() {
    // `1.` without a following digit stays an int plus a dot
    assert_eq!(
        kinds("1.x"),
        vec![TokenKind::IntLiteral(1), TokenKind::Dot, TokenKind::Identifier("x".into()), TokenKind::EOF]
    );
}

#[test]
fn comments_are_skipped_and_lines_counted() {
    let src = "// header\nint a; /* spans\ntwo lines */ a = 1;";
    let (tokens, errors) = tokenize(src);
    assert!(errors.is_empty());
    let assign = tokens.iter().find(|t| t.kind == TokenKind::Equals).unwrap();
    assert_eq!(assign.line(), 3);
    assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::EOF).count(), 1);
}

#[test]
fn destructor_token_carries_class_name() {
    assert_eq!(
        kinds("~Point()"),
        vec![TokenKind::Destructor("Point".into()), TokenKind::OpenParen, TokenKind::CloseParen, TokenKind::EOF]
    );
}

#[test]
fn string_escapes_are_decoded() {
    let (tokens, _) = tokenize(r#"printf("a\tb\"c");"#);
    assert_eq!(tokens[2].kind, TokenKind::StringLiteral("a\tb\"c".into()));
    assert_eq!(tokens[2].lexeme, r#""a\tb\"c""#);
}

#[test]
fn illegal_characters_are_reported_and_skipped() {
    let (tokens, errors) = tokenize("int x = 1 @ 2 # 3;");
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], LexerError::UnexpectedCharacter('@', _)));
    assert_eq!(errors[0].to_string(), "Illegal character '@' at line 1");
    // lexing continued past both
    assert!(tokens.iter().any(|t| t.kind == TokenKind::IntLiteral(3)));
}

#[test]
fn unterminated_string_costs_only_the_quote() {
    let (tokens, errors) = tokenize("\"abc\nint y;");
    assert!(matches!(errors.as_slice(), [LexerError::UnterminatedString(_)]));
    assert_eq!(tokens[0].kind, TokenKind::Identifier("abc".into()));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Identifier("y".into())));
}

#[test]
fn unterminated_block_comment_discards_rest() {
    let (tokens, errors) = tokenize("int a; /* never closed int b;");
    assert!(matches!(errors.as_slice(), [LexerError::UnterminatedComment(s)] if s.column == 8));
    assert_eq!(tokens.len(), 4);
}

#[test]
fn integer_overflow_is_lexical() {
    let (_, errors) = tokenize("int big = 99999999999999999999;");
    assert!(matches!(errors.as_slice(), [LexerError::IntegerOverflow(..)]));
}

#[test]
fn iterator_yields_errors_inline() {
    let items: Vec<_> = Lexer::new("a $ b").collect();
    assert_eq!(items.len(), 4);
    assert!(items[1].is_err());
    assert!(matches!(items.last(), Some(Ok(t)) if t.kind == TokenKind::EOF));
}

#[test]
fn unicode_identifiers() {
    assert_eq!(kinds("int café;")[1], TokenKind::Identifier("café".into()));
}
