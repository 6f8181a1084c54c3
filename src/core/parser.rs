//! Parser for Mini C++: recursive descent for statements, precedence climbing
//! for binary operators, panic-mode recovery so one pass reports many errors.
//!
//! Binding strength, lowest to highest:
//! `else` (dangling-else resolution) < assignment (right) < `||` < `&&`
//! < equality < relational < additive < multiplicative < unary (right)
//! < postfix (call, member access, `++`/`--`).

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::core::ast::{
    AssignOp, BinaryOp, ClassDecl, Expr, ExprKind, FuncDecl, IncDec, Literal, LogicalOp, Param,
    Program, Stmt, StmtKind, TypeName, UnaryOp, VarDecl,
};
use crate::core::error::{Diagnostic, ErrorKind};
use crate::core::stack::ensure_sufficient_stack;
use crate::core::token::{Span, Token, TokenKind, TypeKeyword};

#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    pub message: String,
    pub lexeme: String,
    pub token: String,
    pub span: Span,
}

impl ParserError {
    pub fn line(&self) -> usize {
        self.span.line
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}: syntax error at token '{}' ({}): {}",
            self.span.line, self.lexeme, self.token, self.message
        )
    }
}

impl std::error::Error for ParserError {}

impl From<ParserError> for Diagnostic {
    fn from(e: ParserError) -> Self {
        let message = format!("at token '{}' ({}): {}", e.lexeme, e.token, e.message);
        Diagnostic::new(ErrorKind::Syntax, message, e.span)
    }
}

type PResult<T> = Result<T, ParserError>;

#[derive(Clone, Copy)]
enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

/// Binary operator table: (precedence, operator). All levels are left-associative.
fn infix_operator(kind: &TokenKind) -> Option<(u8, Infix)> {
    let entry = match kind {
        TokenKind::OrOr => (1, Infix::Logical(LogicalOp::Or)),
        TokenKind::AndAnd => (2, Infix::Logical(LogicalOp::And)),
        TokenKind::DoubleEquals => (3, Infix::Binary(BinaryOp::Eq)),
        TokenKind::NotEquals => (3, Infix::Binary(BinaryOp::Ne)),
        TokenKind::LessThan => (4, Infix::Binary(BinaryOp::Lt)),
        TokenKind::LessEqual => (4, Infix::Binary(BinaryOp::Le)),
        TokenKind::GreaterThan => (4, Infix::Binary(BinaryOp::Gt)),
        TokenKind::GreaterEqual => (4, Infix::Binary(BinaryOp::Ge)),
        TokenKind::Plus => (5, Infix::Binary(BinaryOp::Add)),
        TokenKind::Minus => (5, Infix::Binary(BinaryOp::Sub)),
        TokenKind::Star => (6, Infix::Binary(BinaryOp::Mul)),
        TokenKind::Slash => (6, Infix::Binary(BinaryOp::Div)),
        TokenKind::Percent => (6, Infix::Binary(BinaryOp::Mod)),
        _ => return None,
    };
    Some(entry)
}

fn assign_operator(kind: &TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Equals => AssignOp::Assign,
        TokenKind::PlusEquals => AssignOp::Add,
        TokenKind::MinusEquals => AssignOp::Sub,
        TokenKind::StarEquals => AssignOp::Mul,
        TokenKind::SlashEquals => AssignOp::Div,
        TokenKind::PercentEquals => AssignOp::Mod,
        _ => return None,
    };
    Some(op)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParserError>,
    /// Names of the classes whose bodies are currently being parsed.
    classes: Vec<String>,
}

impl Parser {
    /// Create new parser instance; ensure trailing EOF token present
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let needs_eof = match tokens.last() {
            Some(t) => !matches!(t.kind, TokenKind::EOF),
            None => true,
        };
        if needs_eof {
            let end = tokens.last().map(|t| t.span).unwrap_or_default();
            let span = Span::new(end.end, end.end, end.line.max(1), end.column);
            tokens.push(Token::new(TokenKind::EOF, String::new(), span));
        }
        Parser { tokens, pos: 0, errors: Vec::new(), classes: Vec::new() }
    }

    /// Parses all tokens into a program. Syntax errors are collected; the
    /// returned program holds every declaration that parsed cleanly.
    pub fn parse(&mut self) -> (Program, Vec<ParserError>) {
        let mut decls = Vec::new();
        while !self.is_at_end() {
            let start = self.pos;
            match self.declaration() {
                Ok(stmt) => decls.push(stmt),
                Err(e) => self.recover(e, start),
            }
        }
        let errors = std::mem::take(&mut self.errors);
        debug!(decls = decls.len(), errors = errors.len(), "parser finished");
        (Program { decls }, errors)
    }

    /* ── Recovery ─────────────────────────────────────────── */

    fn recover(&mut self, err: ParserError, start: usize) {
        debug!(line = err.line(), "syntax error: {}", err.message);
        self.errors.push(err);
        if self.pos == start {
            self.advance();
        }
        self.synchronize();
    }

    /// Panic mode: discard tokens until a statement boundary.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if matches!(self.previous().kind, TokenKind::Semicolon) {
                return;
            }
            let kind = &self.peek().kind;
            if matches!(kind, TokenKind::CloseBrace) || kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    /* ── Declarations ─────────────────────────────────────── */

    fn declaration(&mut self) -> PResult<Stmt> {
        match self.peek().kind {
            TokenKind::Class => self.class_decl(),
            TokenKind::Type(_) => self.typed_decl(),
            TokenKind::Identifier(_) if matches!(self.peek_next().kind, TokenKind::Identifier(_)) => {
                self.typed_decl()
            }
            _ => self.statement(),
        }
    }

    fn parse_type(&mut self) -> PResult<TypeName> {
        match self.peek().kind.clone() {
            TokenKind::Type(k) => {
                self.advance();
                Ok(TypeName::from(k))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(TypeName::Class(name))
            }
            _ => Err(self.err_here("expected a type")),
        }
    }

    /// `type IDENT ( ... ) { ... }` or `type IDENT (= expr)? ;`
    fn typed_decl(&mut self) -> PResult<Stmt> {
        let start = self.peek().span;
        let ty = self.parse_type()?;
        let (name, _) = self.consume_identifier("expected a name after the type")?;
        if self.check(&TokenKind::OpenParen) {
            let decl = self.function_rest(ty, name, start)?;
            let span = decl.span;
            return Ok(Stmt::new(StmtKind::FuncDecl(Rc::new(decl)), span));
        }
        self.var_decl_rest(ty, name, start)
    }

    fn var_decl_rest(&mut self, ty: TypeName, name: String, start: Span) -> PResult<Stmt> {
        let init = if self.match_token(&TokenKind::Equals) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "expected ';' after variable declaration")?;
        let span = self.span_from(start);
        Ok(Stmt::new(StmtKind::VarDecl(VarDecl { ty, name, init }), span))
    }

    fn function_rest(&mut self, return_type: TypeName, name: String, start: Span) -> PResult<FuncDecl> {
        let params = self.parameters()?;
        let body = self.block_body()?;
        Ok(FuncDecl { return_type, name, params, body, span: self.span_from(start) })
    }

    /// `( )`, `( void )` or `( type IDENT (, type IDENT)* )`
    fn parameters(&mut self) -> PResult<Vec<Param>> {
        self.consume(TokenKind::OpenParen, "expected '(' before parameters")?;
        let mut params = Vec::new();
        if matches!(self.peek().kind, TokenKind::Type(TypeKeyword::Void))
            && matches!(self.peek_next().kind, TokenKind::CloseParen)
        {
            self.advance();
        } else if !self.check(&TokenKind::CloseParen) {
            loop {
                let start = self.peek().span;
                let ty = self.parse_type()?;
                let (name, _) = self.consume_identifier("expected parameter name")?;
                params.push(Param { ty, name, span: self.span_from(start) });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::CloseParen, "expected ')' after parameters")?;
        Ok(params)
    }

    fn class_decl(&mut self) -> PResult<Stmt> {
        let start = self.consume(TokenKind::Class, "expected 'class'")?.span;
        let (name, _) = self.consume_identifier("expected class name")?;
        self.consume(TokenKind::OpenBrace, "expected '{' after class name")?;
        self.classes.push(name.clone());
        let mut members = Vec::new();
        while !self.check(&TokenKind::CloseBrace) && !self.is_at_end() {
            let member_start = self.pos;
            match self.member(&name) {
                Ok(stmt) => members.push(stmt),
                Err(e) => self.recover(e, member_start),
            }
        }
        self.classes.pop();
        self.consume(TokenKind::CloseBrace, "expected '}' after class body")?;
        self.match_token(&TokenKind::Semicolon);
        let span = self.span_from(start);
        Ok(Stmt::new(StmtKind::ClassDecl(Rc::new(ClassDecl { name, members })), span))
    }

    fn member(&mut self, class: &str) -> PResult<Stmt> {
        match self.peek().kind.clone() {
            TokenKind::Destructor(dname) => {
                let tok = self.advance().clone();
                if dname != class {
                    let e = self.err_at(&format!("destructor '~{}' does not match class '{}'", dname, class), &tok);
                    self.errors.push(e);
                }
                self.consume(TokenKind::OpenParen, "expected '(' after destructor name")?;
                self.consume(TokenKind::CloseParen, "destructors take no parameters")?;
                let body = self.block_body()?;
                let span = self.span_from(tok.span);
                let decl = FuncDecl { return_type: TypeName::Void, name: dname, params: Vec::new(), body, span };
                Ok(Stmt::new(StmtKind::DestructorDecl(Rc::new(decl)), span))
            }
            TokenKind::Identifier(cname)
                if matches!(self.peek_next().kind, TokenKind::OpenParen)
                    && (cname == class || self.parens_then_brace()) =>
            {
                let tok = self.advance().clone();
                if cname != class {
                    let e = self.err_at(&format!("constructor '{}' does not match class '{}'", cname, class), &tok);
                    self.errors.push(e);
                }
                let decl = self.function_rest(TypeName::Void, cname, tok.span)?;
                let span = decl.span;
                Ok(Stmt::new(StmtKind::ConstructorDecl(Rc::new(decl)), span))
            }
            _ => self.declaration(),
        }
    }

    /* ── Statements ───────────────────────────────────────── */

    fn statement(&mut self) -> PResult<Stmt> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> PResult<Stmt> {
        match self.peek().kind {
            TokenKind::OpenBrace => {
                let start = self.peek().span;
                let stmts = self.block_body()?;
                Ok(Stmt::new(StmtKind::Compound(stmts), self.span_from(start)))
            }
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Break => self.keyword_stmt(StmtKind::Break),
            TokenKind::Continue => self.keyword_stmt(StmtKind::Continue),
            TokenKind::Size => self.call_like_stmt(StmtKind::Size),
            TokenKind::Printf => self.call_like_stmt(StmtKind::Printf),
            TokenKind::Semicolon => {
                let span = self.advance().span;
                Ok(Stmt::new(StmtKind::Null, span))
            }
            _ => {
                let start = self.peek().span;
                let expr = self.parse_expression()?;
                self.consume(TokenKind::Semicolon, "expected ';' after expression")?;
                Ok(Stmt::new(StmtKind::Expr(expr), self.span_from(start)))
            }
        }
    }

    /// `{ declaration* }`, recovering inside the block.
    fn block_body(&mut self) -> PResult<Vec<Stmt>> {
        self.consume(TokenKind::OpenBrace, "expected '{' to start block")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::CloseBrace) && !self.is_at_end() {
            let start = self.pos;
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => self.recover(e, start),
            }
        }
        self.consume(TokenKind::CloseBrace, "expected '}' after block")?;
        Ok(stmts)
    }

    // The `else` is taken greedily, so it binds to the innermost open `if`.
    fn if_stmt(&mut self) -> PResult<Stmt> {
        let start = self.consume(TokenKind::If, "expected 'if'")?.span;
        self.consume(TokenKind::OpenParen, "expected '(' after 'if'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::CloseParen, "expected ')' after condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(Stmt::new(StmtKind::If { cond, then_branch, else_branch }, span))
    }

    fn while_stmt(&mut self) -> PResult<Stmt> {
        let start = self.consume(TokenKind::While, "expected 'while'")?.span;
        self.consume(TokenKind::OpenParen, "expected '(' after 'while'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::CloseParen, "expected ')' after condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::new(StmtKind::While { cond, body }, self.span_from(start)))
    }

    fn for_stmt(&mut self) -> PResult<Stmt> {
        let start = self.consume(TokenKind::For, "expected 'for'")?.span;
        self.consume(TokenKind::OpenParen, "expected '(' after 'for'")?;
        let init = if self.match_token(&TokenKind::Semicolon) {
            None
        } else if self.at_declaration_start() {
            let decl_start = self.peek().span;
            let ty = self.parse_type()?;
            let (name, _) = self.consume_identifier("expected a name after the type")?;
            Some(Box::new(self.var_decl_rest(ty, name, decl_start)?))
        } else {
            let expr_start = self.peek().span;
            let expr = self.parse_expression()?;
            self.consume(TokenKind::Semicolon, "expected ';' after loop initializer")?;
            Some(Box::new(Stmt::new(StmtKind::Expr(expr), self.span_from(expr_start))))
        };
        let cond = if self.check(&TokenKind::Semicolon) { None } else { Some(self.parse_expression()?) };
        self.consume(TokenKind::Semicolon, "expected ';' after loop condition")?;
        let update = if self.check(&TokenKind::CloseParen) { None } else { Some(self.parse_expression()?) };
        self.consume(TokenKind::CloseParen, "expected ')' after for clauses")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::new(StmtKind::For { init, cond, update, body }, self.span_from(start)))
    }

    fn return_stmt(&mut self) -> PResult<Stmt> {
        let start = self.consume(TokenKind::Return, "expected 'return'")?.span;
        let value = if self.check(&TokenKind::Semicolon) { None } else { Some(self.parse_expression()?) };
        self.consume(TokenKind::Semicolon, "expected ';' after return")?;
        Ok(Stmt::new(StmtKind::Return(value), self.span_from(start)))
    }

    fn keyword_stmt(&mut self, kind: StmtKind) -> PResult<Stmt> {
        let start = self.advance().span;
        self.consume(TokenKind::Semicolon, "expected ';' after keyword")?;
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    /// `printf ( expr ) ;` and `size ( expr ) ;`
    fn call_like_stmt(&mut self, make: fn(Expr) -> StmtKind) -> PResult<Stmt> {
        let start = self.advance().span;
        self.consume(TokenKind::OpenParen, "expected '(' after keyword")?;
        let expr = self.parse_expression()?;
        self.consume(TokenKind::CloseParen, "expected ')' after argument")?;
        self.consume(TokenKind::Semicolon, "expected ';' after statement")?;
        Ok(Stmt::new(make(expr), self.span_from(start)))
    }

    /* ── Expressions ──────────────────────────────────────── */

    pub fn parse_expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    // assignment: (Var | Get) assign_op assignment | binary
    fn assignment(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| self.assignment_inner())
    }

    fn assignment_inner(&mut self) -> PResult<Expr> {
        let target = self.binary(1)?;
        let Some(op) = assign_operator(&self.peek().kind) else {
            return Ok(target);
        };
        let op_tok = self.advance().clone();
        let value = Box::new(self.assignment()?);
        let span = target.span.to(value.span);
        match target.kind {
            ExprKind::Var(name) => Ok(Expr::new(ExprKind::Assign { op, name, value }, span)),
            ExprKind::Get { object, name } => Ok(Expr::new(ExprKind::Set { object, name, op, value }, span)),
            _ => Err(self.err_at("invalid assignment target", &op_tok)),
        }
    }

    fn binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.unary()?;
        while let Some((prec, op)) = infix_operator(&self.peek().kind) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.binary(prec + 1)?;
            left = match op {
                Infix::Binary(op) => Expr::new_binary(op, left, right),
                Infix::Logical(op) => Expr::new_logical(op, left, right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| self.unary_inner())
    }

    fn unary_inner(&mut self) -> PResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.advance().span;
            let expr = self.unary()?;
            let span = start.to(expr.span);
            return Ok(Expr::new(ExprKind::Unary { op, expr: Box::new(expr) }, span));
        }
        let incdec = match self.peek().kind {
            TokenKind::PlusPlus => Some(IncDec::Inc),
            TokenKind::MinusMinus => Some(IncDec::Dec),
            _ => None,
        };
        if let Some(op) = incdec {
            let op_tok = self.advance().clone();
            let target = self.unary()?;
            if !target.is_place() {
                return Err(self.err_at(&format!("invalid operand for prefix '{}'", op), &op_tok));
            }
            let span = op_tok.span.to(target.span);
            return Ok(Expr::new(ExprKind::PreFix { op, target: Box::new(target) }, span));
        }
        self.postfix()
    }

    // primary ( '(' args? ')' | '.' IDENT | '++' | '--' )*
    fn postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek().kind {
                TokenKind::OpenParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::CloseParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if !self.match_token(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    let close = self.consume(TokenKind::CloseParen, "expected ')' after arguments")?.span;
                    let span = expr.span.to(close);
                    expr = Expr::new(ExprKind::Call { callee: Box::new(expr), args }, span);
                }
                TokenKind::Dot => {
                    self.advance();
                    let (name, name_span) = self.consume_identifier("expected member name after '.'")?;
                    let span = expr.span.to(name_span);
                    expr = Expr::new(ExprKind::Get { object: Box::new(expr), name }, span);
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op_tok = self.advance().clone();
                    let op = if op_tok.kind == TokenKind::PlusPlus { IncDec::Inc } else { IncDec::Dec };
                    if !expr.is_place() {
                        return Err(self.err_at(&format!("invalid operand for postfix '{}'", op), &op_tok));
                    }
                    let span = expr.span.to(op_tok.span);
                    expr = Expr::new(ExprKind::PostFix { op, target: Box::new(expr) }, span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let tok = self.peek().clone();
        let kind = match tok.kind {
            TokenKind::IntLiteral(v) => ExprKind::Literal(Literal::Int(v)),
            TokenKind::FloatLiteral(v) => ExprKind::Literal(Literal::Float(v)),
            TokenKind::BoolLiteral(b) => ExprKind::Literal(Literal::Bool(b)),
            TokenKind::StringLiteral(s) => ExprKind::Literal(Literal::String(s)),
            TokenKind::Null => ExprKind::Literal(Literal::Null),
            TokenKind::This => ExprKind::This,
            TokenKind::Identifier(name) => ExprKind::Var(name),
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let close = self.consume(TokenKind::CloseParen, "expected ')'")?.span;
                return Ok(Expr::new(inner.kind, tok.span.to(close)));
            }
            _ => return Err(self.err_here("expected an expression")),
        };
        self.advance();
        Ok(Expr::new(kind, tok.span))
    }

    /* ── Token utils ─────────────────────────────────────── */

    /// From `IDENT (`: does a `{` follow the matching `)`?
    fn parens_then_brace(&self) -> bool {
        let mut depth = 0usize;
        for (i, tok) in self.tokens.iter().enumerate().skip(self.pos + 1) {
            match tok.kind {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return matches!(self.tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::OpenBrace));
                    }
                }
                TokenKind::EOF => return false,
                _ => {}
            }
        }
        false
    }

    fn at_declaration_start(&self) -> bool {
        match self.peek().kind {
            TokenKind::Type(_) => true,
            TokenKind::Identifier(_) => matches!(self.peek_next().kind, TokenKind::Identifier(_)),
            _ => false,
        }
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous().span)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    fn previous(&self) -> &Token {
        if self.pos == 0 {
            &self.tokens[0]
        } else {
            &self.tokens[self.pos - 1]
        }
    }

    fn peek(&self) -> &Token {
        // Safe: we ensure there's always an EOF at the end
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.peek().kind == kind
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, msg: &str) -> PResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.err_here(msg))
        }
    }

    fn consume_identifier(&mut self, msg: &str) -> PResult<(String, Span)> {
        if let TokenKind::Identifier(name) = self.peek().kind.clone() {
            let span = self.advance().span;
            Ok((name, span))
        } else {
            Err(self.err_here(msg))
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::EOF)
    }

    fn err_here(&self, msg: &str) -> ParserError {
        self.err_at(msg, self.peek())
    }

    fn err_at(&self, msg: &str, tok: &Token) -> ParserError {
        let lexeme = if tok.kind == TokenKind::EOF { "end of input".to_string() } else { tok.lexeme.clone() };
        ParserError { message: msg.into(), lexeme, token: tok.kind.to_string(), span: tok.span }
    }
}
