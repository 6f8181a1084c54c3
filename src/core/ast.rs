// src/core/ast.rs
//! Abstract Syntax Tree for Mini C++.
//!
//! Nodes are immutable once the parser has built them. Every statement and
//! expression carries the [`Span`] of the source text it was reduced from so
//! later stages can point at it.

use std::fmt;
use std::rc::Rc;

use crate::core::token::{Span, TypeKeyword};

/// A type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Float,
    Bool,
    String,
    Void,
    Class(String),
}

impl From<TypeKeyword> for TypeName {
    fn from(k: TypeKeyword) -> Self {
        match k {
            TypeKeyword::Int => TypeName::Int,
            TypeKeyword::Float => TypeName::Float,
            TypeKeyword::Bool => TypeName::Bool,
            TypeKeyword::String => TypeName::String,
            TypeKeyword::Void => TypeName::Void,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Int => f.write_str("int"),
            TypeName::Float => f.write_str("float"),
            TypeName::Bool => f.write_str("bool"),
            TypeName::String => f.write_str("string"),
            TypeName::Void => f.write_str("void"),
            TypeName::Class(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeName,
    pub name: String,
    pub span: Span,
}

/// Functions, methods, constructors and destructors share this shape.
/// Constructors and destructors always have a `void` return type.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub return_type: TypeName,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ty: TypeName,
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub members: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub decls: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // Declarations
    FuncDecl(Rc<FuncDecl>),
    VarDecl(VarDecl),
    ClassDecl(Rc<ClassDecl>),
    ConstructorDecl(Rc<FuncDecl>),
    DestructorDecl(Rc<FuncDecl>),

    // Statements
    Compound(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Printf(Expr),
    Size(Expr),
    Expr(Expr),
    Null,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::FuncDecl(_)
                | StmtKind::VarDecl(_)
                | StmtKind::ClassDecl(_)
                | StmtKind::ConstructorDecl(_)
                | StmtKind::DestructorDecl(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
        })
    }
}

/// `=` or one of the compound assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    /// The arithmetic operator a compound assignment applies, if any.
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDec {
    Inc,
    Dec,
}

impl IncDec {
    pub fn delta(self) -> i64 {
        match self {
            IncDec::Inc => 1,
            IncDec::Dec => -1,
        }
    }
}

impl fmt::Display for IncDec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IncDec::Inc => "++",
            IncDec::Dec => "--",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Var(String),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        name: String,
        value: Box<Expr>,
    },
    PreFix {
        op: IncDec,
        target: Box<Expr>,
    },
    PostFix {
        op: IncDec,
        target: Box<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: String,
    },
    Set {
        object: Box<Expr>,
        name: String,
        op: AssignOp,
        value: Box<Expr>,
    },
    This,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn new_binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let span = left.span.to(right.span);
        Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, span)
    }

    pub fn new_logical(op: LogicalOp, left: Expr, right: Expr) -> Self {
        let span = left.span.to(right.span);
        Expr::new(ExprKind::Logical { op, left: Box::new(left), right: Box::new(right) }, span)
    }

    /// Valid targets for `++`/`--`.
    pub fn is_place(&self) -> bool {
        matches!(self.kind, ExprKind::Var(_) | ExprKind::Get { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i64, start: usize) -> Expr {
        Expr::new(ExprKind::Literal(Literal::Int(v)), Span::new(start, start + 1, 1, start + 1))
    }

    #[test]
    fn binary_span_covers_operands() {
        let e = Expr::new_binary(BinaryOp::Add, lit(1, 0), lit(2, 4));
        assert_eq!((e.span.start, e.span.end), (0, 5));
        if let ExprKind::Binary { op, left, right } = e.kind {
            assert_eq!(op, BinaryOp::Add);
            assert_eq!(*left, lit(1, 0));
            assert_eq!(*right, lit(2, 4));
        } else {
            panic!("Expected Binary node");
        }
    }

    #[test]
    fn compound_assign_maps_to_binary() {
        assert_eq!(AssignOp::Mod.binary(), Some(BinaryOp::Mod));
        assert_eq!(AssignOp::Assign.binary(), None);
    }

    #[test]
    fn declaration_kinds() {
        let decl = Stmt::new(
            StmtKind::VarDecl(VarDecl { ty: TypeName::Int, name: "x".into(), init: None }),
            Span::default(),
        );
        assert!(decl.is_declaration());
        assert!(!Stmt::new(StmtKind::Break, Span::default()).is_declaration());
    }
}
