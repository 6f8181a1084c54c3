// src/core/semantic_analyzer.rs
//! Scope and type checker:
//! - builds the symbol table tree (global, function, class, block, `for` scopes)
//! - rejects redeclaration in one scope, allows shadowing in nested ones
//! - resolves every name and checks declared-type compatibility at
//!   initializers, assignments, returns and call sites
//! - validates `break`/`continue`/`return`/`this` placement
//!
//! Errors are collected; one mistake never stops the traversal.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::core::ast::{
    AssignOp, ClassDecl, Expr, ExprKind, FuncDecl, Literal, Program, Stmt, StmtKind, TypeName, UnaryOp,
    VarDecl,
};
use crate::core::error::{Diagnostic, ErrorKind};
use crate::core::stack::ensure_sufficient_stack;
use crate::core::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::core::token::Span;
use crate::core::types::{Signature, Type};

#[derive(Debug, Default)]
struct ClassInfo {
    members: HashMap<String, (SymbolKind, Type)>,
    ctor: Option<Rc<Signature>>,
}

/// Traversal state, passed down rather than stored globally.
#[derive(Debug, Clone, Default)]
struct Ctx {
    loop_depth: usize,
    /// Name and declared return type of the enclosing function.
    function: Option<(String, Type)>,
    class: Option<String>,
}

impl Ctx {
    fn in_loop(&self) -> Ctx {
        Ctx { loop_depth: self.loop_depth + 1, ..self.clone() }
    }

    fn in_function(&self, name: &str, ret: Type) -> Ctx {
        Ctx { loop_depth: 0, function: Some((name.to_string(), ret)), class: self.class.clone() }
    }
}

pub struct SemanticAnalyzer {
    table: SymbolTable,
    classes: HashMap<String, ClassInfo>,
    diags: Vec<Diagnostic>,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self { table: SymbolTable::new(), classes: HashMap::new(), diags: Vec::new() }
    }

    /// Checks the whole program, appending every error to `sink`.
    /// Returns `true` when nothing was reported.
    pub fn check(&mut self, program: &Program, sink: &mut Vec<Diagnostic>) -> bool {
        let ctx = Ctx::default();
        for stmt in &program.decls {
            self.stmt(stmt, &ctx);
        }
        debug!(scopes = self.table.scopes().len(), errors = self.diags.len(), "checker finished");
        let ok = self.diags.is_empty();
        sink.append(&mut self.diags);
        ok
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.table
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.diags.push(Diagnostic::new(ErrorKind::Semantic, message, span));
    }

    fn declare(&mut self, name: &str, kind: SymbolKind, ty: Type, span: Span) -> bool {
        let symbol = Symbol { name: name.to_string(), kind, ty, line: span.line, column: span.column };
        match self.table.declare(symbol) {
            Ok(()) => true,
            Err(prev) => {
                self.error(
                    format!("'{}' is already declared in this scope (line {})", name, prev.line),
                    span,
                );
                false
            }
        }
    }

    fn resolve_type(&mut self, name: &TypeName, span: Span) -> Type {
        match name {
            TypeName::Class(c) if !self.classes.contains_key(c) => {
                self.error(format!("unknown type '{}'", c), span);
                Type::Unknown
            }
            other => Type::from_name(other),
        }
    }

    fn signature(&mut self, decl: &FuncDecl) -> Rc<Signature> {
        let mut params = Vec::with_capacity(decl.params.len());
        for p in &decl.params {
            let ty = self.resolve_type(&p.ty, p.span);
            if ty == Type::Void {
                self.error(format!("parameter '{}' cannot have type void", p.name), p.span);
            }
            params.push(ty);
        }
        let ret = self.resolve_type(&decl.return_type, decl.span);
        Rc::new(Signature { params, ret })
    }

    /* ── Statements ───────────────────────────────────────── */

    fn stmt(&mut self, stmt: &Stmt, ctx: &Ctx) {
        ensure_sufficient_stack(|| self.stmt_inner(stmt, ctx))
    }

    fn stmt_inner(&mut self, stmt: &Stmt, ctx: &Ctx) {
        match &stmt.kind {
            StmtKind::FuncDecl(decl) => {
                let sig = self.signature(decl);
                self.declare(&decl.name, SymbolKind::Function, Type::Function(sig.clone()), stmt.span);
                self.function_body(decl, &sig, format!("function {}", decl.name), ctx);
            }
            StmtKind::VarDecl(var) => self.var_decl(var, stmt.span, ctx),
            StmtKind::ClassDecl(class) => self.class_decl(class, stmt.span),
            StmtKind::ConstructorDecl(_) | StmtKind::DestructorDecl(_) => {
                self.error("constructors and destructors may only appear inside a class", stmt.span)
            }
            StmtKind::Compound(stmts) => {
                self.table.enter("block");
                for s in stmts {
                    self.stmt(s, ctx);
                }
                self.table.exit();
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.expr(cond, ctx);
                self.stmt(then_branch, ctx);
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch, ctx);
                }
            }
            StmtKind::While { cond, body } => {
                self.expr(cond, ctx);
                self.stmt(body, &ctx.in_loop());
            }
            StmtKind::For { init, cond, update, body } => {
                self.table.enter("for");
                if let Some(init) = init {
                    self.stmt(init, ctx);
                }
                if let Some(cond) = cond {
                    self.expr(cond, ctx);
                }
                if let Some(update) = update {
                    self.expr(update, ctx);
                }
                self.stmt(body, &ctx.in_loop());
                self.table.exit();
            }
            StmtKind::Return(value) => self.return_stmt(value.as_ref(), stmt.span, ctx),
            StmtKind::Break if ctx.loop_depth == 0 => self.error("'break' used outside a loop", stmt.span),
            StmtKind::Continue if ctx.loop_depth == 0 => {
                self.error("'continue' used outside a loop", stmt.span)
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Printf(e) => {
                if self.expr(e, ctx) == Type::Void {
                    self.error("cannot print a void value", e.span);
                }
            }
            StmtKind::Size(e) => {
                let ty = self.expr(e, ctx);
                if !matches!(ty, Type::String | Type::Unknown) {
                    self.error(format!("size() expects a string, got {}", ty), e.span);
                }
            }
            StmtKind::Expr(e) => {
                self.expr(e, ctx);
            }
            StmtKind::Null => {}
        }
    }

    fn var_decl(&mut self, var: &VarDecl, span: Span, ctx: &Ctx) {
        let ty = self.resolve_type(&var.ty, span);
        if ty == Type::Void {
            self.error(format!("variable '{}' cannot have type void", var.name), span);
        }
        if let Some(init) = &var.init {
            self.initializer(&var.name, &ty, init, ctx);
        }
        self.declare(&var.name, SymbolKind::Variable, ty, span);
    }

    fn initializer(&mut self, name: &str, declared: &Type, init: &Expr, ctx: &Ctx) {
        let actual = self.expr(init, ctx);
        if *declared != Type::Void && !declared.accepts(&actual) {
            self.error(
                format!("cannot initialize '{}' of type {} with a value of type {}", name, declared, actual),
                init.span,
            );
        }
    }

    fn function_body(&mut self, decl: &FuncDecl, sig: &Signature, label: String, ctx: &Ctx) {
        self.table.enter(label);
        for (param, ty) in decl.params.iter().zip(&sig.params) {
            self.declare(&param.name, SymbolKind::Parameter, ty.clone(), param.span);
        }
        let inner = ctx.in_function(&decl.name, sig.ret.clone());
        for stmt in &decl.body {
            self.stmt(stmt, &inner);
        }
        self.table.exit();
    }

    fn return_stmt(&mut self, value: Option<&Expr>, span: Span, ctx: &Ctx) {
        let Some((name, ret)) = &ctx.function else {
            self.error("'return' used outside a function", span);
            if let Some(v) = value {
                self.expr(v, ctx);
            }
            return;
        };
        match value {
            None if *ret != Type::Void => {
                self.error(format!("'return' without a value in '{}', which returns {}", name, ret), span)
            }
            None => {}
            Some(v) => {
                let actual = self.expr(v, ctx);
                if *ret == Type::Void {
                    self.error(format!("void function '{}' cannot return a value", name), v.span);
                } else if !ret.accepts(&actual) {
                    self.error(format!("'{}' must return {}, got {}", name, ret, actual), v.span);
                }
            }
        }
    }

    /// Members are registered before any body is checked so they may refer
    /// to each other in any order.
    fn class_decl(&mut self, class: &ClassDecl, span: Span) {
        self.declare(&class.name, SymbolKind::Class, Type::ClassRef(class.name.clone()), span);
        self.classes.insert(class.name.clone(), ClassInfo::default());
        self.table.enter(format!("class {}", class.name));

        let mut info = ClassInfo::default();
        let mut member_types = Vec::with_capacity(class.members.len());
        for member in &class.members {
            let ty = match &member.kind {
                StmtKind::VarDecl(var) => {
                    let ty = self.resolve_type(&var.ty, member.span);
                    if ty == Type::Void {
                        self.error(format!("field '{}' cannot have type void", var.name), member.span);
                    }
                    self.member(&mut info, &var.name, SymbolKind::Field, ty.clone(), member.span);
                    Some(ty)
                }
                StmtKind::FuncDecl(decl) => {
                    let sig = self.signature(decl);
                    if decl.name == "init" {
                        self.constructor(&mut info, &class.name, &sig.params, member.span);
                    }
                    let ty = Type::Function(sig);
                    self.member(&mut info, &decl.name, SymbolKind::Method, ty.clone(), member.span);
                    Some(ty)
                }
                StmtKind::ConstructorDecl(decl) => {
                    let sig = self.signature(decl);
                    let ty = Type::Function(sig.clone());
                    if self.constructor(&mut info, &class.name, &sig.params, member.span) {
                        self.declare(&decl.name, SymbolKind::Constructor, ty.clone(), member.span);
                    }
                    Some(ty)
                }
                StmtKind::DestructorDecl(decl) => {
                    let ty = Type::Function(Rc::new(Signature { params: Vec::new(), ret: Type::Void }));
                    self.declare(&format!("~{}", decl.name), SymbolKind::Destructor, ty.clone(), member.span);
                    Some(ty)
                }
                _ => None,
            };
            member_types.push(ty);
        }
        self.classes.insert(class.name.clone(), info);

        let member_ctx = Ctx { loop_depth: 0, function: None, class: Some(class.name.clone()) };
        for (member, ty) in class.members.iter().zip(member_types) {
            match (&member.kind, ty) {
                (StmtKind::VarDecl(var), Some(ty)) => {
                    if let Some(init) = &var.init {
                        self.initializer(&var.name, &ty, init, &member_ctx);
                    }
                }
                (
                    StmtKind::FuncDecl(decl) | StmtKind::ConstructorDecl(decl) | StmtKind::DestructorDecl(decl),
                    Some(Type::Function(sig)),
                ) => {
                    let label = match &member.kind {
                        StmtKind::ConstructorDecl(_) => format!("constructor {}", decl.name),
                        StmtKind::DestructorDecl(_) => format!("destructor ~{}", decl.name),
                        _ => format!("method {}", decl.name),
                    };
                    self.function_body(decl, &sig, label, &member_ctx);
                }
                (StmtKind::ClassDecl(inner), _) => self.error(
                    format!("class '{}' cannot be declared inside class '{}'", inner.name, class.name),
                    member.span,
                ),
                _ if !member.is_declaration() => self.error(
                    format!("only declarations may appear in the body of class '{}'", class.name),
                    member.span,
                ),
                _ => {}
            }
        }
        self.table.exit();
        debug!(class = %class.name, members = class.members.len(), "checked class");
    }

    fn member(&mut self, info: &mut ClassInfo, name: &str, kind: SymbolKind, ty: Type, span: Span) {
        if self.declare(name, kind, ty.clone(), span) {
            info.members.insert(name.to_string(), (kind, ty));
        }
    }

    fn constructor(&mut self, info: &mut ClassInfo, class: &str, params: &[Type], span: Span) -> bool {
        if info.ctor.is_some() {
            self.error(format!("class '{}' already has a constructor", class), span);
            return false;
        }
        info.ctor = Some(Rc::new(Signature { params: params.to_vec(), ret: Type::Class(class.to_string()) }));
        true
    }

    /* ── Expressions ──────────────────────────────────────── */

    fn expr(&mut self, expr: &Expr, ctx: &Ctx) -> Type {
        ensure_sufficient_stack(|| self.expr_inner(expr, ctx))
    }

    fn expr_inner(&mut self, expr: &Expr, ctx: &Ctx) -> Type {
        match &expr.kind {
            ExprKind::Literal(lit) => match lit {
                Literal::Int(_) => Type::Int,
                Literal::Float(_) => Type::Float,
                Literal::Bool(_) => Type::Bool,
                Literal::String(_) => Type::String,
                Literal::Null => Type::Null,
            },
            ExprKind::Var(name) => match self.table.lookup(name) {
                // Inside its own class the name still means the class, not the constructor symbol.
                Some(sym) if sym.kind == SymbolKind::Constructor => Type::ClassRef(name.clone()),
                Some(sym) => sym.ty.clone(),
                None => {
                    self.error(format!("'{}' is not declared", name), expr.span);
                    Type::Unknown
                }
            },
            ExprKind::This => match &ctx.class {
                Some(class) => Type::Class(class.clone()),
                None => {
                    self.error("'this' used outside of a class", expr.span);
                    Type::Unknown
                }
            },
            ExprKind::Unary { op, expr: operand } => {
                let ty = self.expr(operand, ctx);
                match op {
                    UnaryOp::Not => Type::Bool,
                    _ if ty.is_numeric() => ty,
                    _ => Type::Unknown,
                }
            }
            ExprKind::Binary { op, left, right } => {
                let l = self.expr(left, ctx);
                let r = self.expr(right, ctx);
                Type::binary(*op, &l, &r)
            }
            ExprKind::Logical { left, right, .. } => {
                self.expr(left, ctx);
                self.expr(right, ctx);
                Type::Bool
            }
            ExprKind::Assign { op, name, value } => {
                let target = self.assign_target(name, expr.span);
                let actual = self.expr(value, ctx);
                match target {
                    Some(ty) => {
                        self.store(*op, &ty, &actual, &format!("'{}'", name), value.span);
                        ty
                    }
                    None => Type::Unknown,
                }
            }
            ExprKind::PreFix { op, target } | ExprKind::PostFix { op, target } => {
                let ty = match &target.kind {
                    ExprKind::Var(name) => self.assign_target(name, target.span).unwrap_or(Type::Unknown),
                    ExprKind::Get { object, name } => {
                        self.assignable_member(object, name, target.span, ctx).unwrap_or(Type::Unknown)
                    }
                    _ => self.expr(target, ctx),
                };
                if ty.is_numeric() || ty.is_unknown() {
                    ty
                } else {
                    self.error(format!("operand of '{}' must be int or float, got {}", op, ty), expr.span);
                    Type::Unknown
                }
            }
            ExprKind::Get { object, name } => {
                self.member_type(object, name, expr.span, ctx).map(|(_, ty)| ty).unwrap_or(Type::Unknown)
            }
            ExprKind::Set { object, name, op, value } => {
                let target = self.assignable_member(object, name, expr.span, ctx);
                let actual = self.expr(value, ctx);
                match target {
                    Some(ty) => {
                        self.store(*op, &ty, &actual, &format!("field '{}'", name), value.span);
                        ty
                    }
                    None => Type::Unknown,
                }
            }
            ExprKind::Call { callee, args } => self.call(callee, args, expr.span, ctx),
        }
    }

    fn assign_target(&mut self, name: &str, span: Span) -> Option<Type> {
        let found = self.table.lookup(name).map(|s| (s.kind, s.ty.clone()));
        match found {
            None => {
                self.error(format!("'{}' is not declared", name), span);
                None
            }
            Some((kind, _)) if !kind.is_assignable() => {
                self.error(format!("cannot assign to {} '{}'", kind.label(), name), span);
                None
            }
            Some((_, ty)) => Some(ty),
        }
    }

    fn store(&mut self, op: AssignOp, target: &Type, value: &Type, what: &str, span: Span) {
        let result = match op.binary() {
            None => value.clone(),
            Some(bin) => Type::binary(bin, target, value),
        };
        if !target.accepts(&result) {
            self.error(
                format!("cannot assign a value of type {} to {} of type {}", result, what, target),
                span,
            );
        }
    }

    fn member_type(&mut self, object: &Expr, name: &str, span: Span, ctx: &Ctx) -> Option<(SymbolKind, Type)> {
        match self.expr(object, ctx) {
            Type::Class(class) => {
                let found = self.classes.get(&class).and_then(|info| info.members.get(name)).cloned();
                if found.is_none() {
                    self.error(format!("class '{}' has no member '{}'", class, name), span);
                }
                found
            }
            Type::Unknown => None,
            other => {
                self.error(format!("cannot access member '{}' on a value of type {}", name, other), span);
                None
            }
        }
    }

    fn assignable_member(&mut self, object: &Expr, name: &str, span: Span, ctx: &Ctx) -> Option<Type> {
        match self.member_type(object, name, span, ctx)? {
            (kind, _) if !kind.is_assignable() => {
                self.error(format!("cannot assign to {} '{}'", kind.label(), name), span);
                None
            }
            (_, ty) => Some(ty),
        }
    }

    fn call(&mut self, callee: &Expr, args: &[Expr], span: Span, ctx: &Ctx) -> Type {
        let callee_ty = self.expr(callee, ctx);
        let arg_types: Vec<Type> = args.iter().map(|a| self.expr(a, ctx)).collect();
        let name = match &callee.kind {
            ExprKind::Var(n) | ExprKind::Get { name: n, .. } => n.clone(),
            _ => "expression".to_string(),
        };
        match callee_ty {
            Type::Function(sig) => {
                self.arguments(&name, &sig.params, args, &arg_types, span);
                sig.ret.clone()
            }
            Type::ClassRef(class) => {
                let params = self
                    .classes
                    .get(&class)
                    .and_then(|info| info.ctor.as_ref())
                    .map(|sig| sig.params.clone())
                    .unwrap_or_default();
                self.arguments(&name, &params, args, &arg_types, span);
                Type::Class(class)
            }
            Type::Unknown => Type::Unknown,
            other => {
                self.error(format!("'{}' is not callable (it has type {})", name, other), callee.span);
                Type::Unknown
            }
        }
    }

    fn arguments(&mut self, name: &str, params: &[Type], args: &[Expr], arg_types: &[Type], span: Span) {
        if params.len() != args.len() {
            self.error(
                format!("'{}' expects {} argument(s), got {}", name, params.len(), args.len()),
                span,
            );
            return;
        }
        for (i, ((param, actual), arg)) in params.iter().zip(arg_types).zip(args).enumerate() {
            if !param.accepts(actual) {
                self.error(
                    format!("argument {} of '{}' must be {}, got {}", i + 1, name, param, actual),
                    arg.span,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lexer::tokenize;
    use crate::core::parser::Parser;

    fn check(src: &str) -> Vec<String> {
        let (tokens, lex) = tokenize(src);
        assert!(lex.is_empty());
        let (program, errors) = Parser::new(tokens).parse();
        assert!(errors.is_empty(), "{errors:?}");
        let mut sink = Vec::new();
        SemanticAnalyzer::new().check(&program, &mut sink);
        sink.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn redeclare_fails() {
        let errors = check("int x = 1; int x = 2;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'x' is already declared"));
    }

    #[test]
    fn shadowing_in_block_ok() {
        assert!(check("int x = 1; { float x = 2.5; printf(x); } printf(x);").is_empty());
    }

    #[test]
    fn assignment_to_undeclared_fails() {
        let errors = check("x = 1;");
        assert_eq!(errors, vec!["'x' is not declared"]);
    }

    #[test]
    fn break_outside_loop() {
        let errors = check("void f() { break; } while (true) { break; }");
        assert_eq!(errors, vec!["'break' used outside a loop"]);
    }

    #[test]
    fn loop_depth_resets_in_function_body() {
        let errors = check("while (true) { void g() { continue; } break; }");
        assert_eq!(errors, vec!["'continue' used outside a loop"]);
    }

    #[test]
    fn arity_and_argument_types() {
        let errors = check("int add(int a, int b) { return a + b; } add(1); add(1, \"two\");");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("'add' expects 2 argument(s), got 1"));
        assert!(errors[1].contains("argument 2 of 'add' must be int, got string"));
    }

    #[test]
    fn class_members_resolve() {
        let src = "class Point { int x; Point(int x) { this.x = x; } int get() { return x; } } \
                   Point p = Point(5); printf(p.get() + p.x);";
        assert!(check(src).is_empty());
    }
}
