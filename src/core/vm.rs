//! Mini C++ VM: tree-walk interpreter over the checked AST.
//! Statements return a [`Flow`] signal so `return`/`break`/`continue` unwind
//! through ordinary returns; runtime errors travel separately as `Err`.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::core::ast::{BinaryOp, ClassDecl, Expr, ExprKind, FuncDecl, IncDec, Literal, LogicalOp, Program, Stmt, StmtKind, UnaryOp};
use crate::core::runtime::{Call, Class, Env, Function, Instance, Lookup, RunResult, RuntimeError, Value};
use crate::core::stack::ensure_sufficient_stack;
use crate::core::token::Span;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// How a statement finished.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Break(Span),
    Continue(Span),
    Return(Value),
}

/// Assignable location resolved once, so `p.n++` evaluates `p` a single time.
enum Place {
    Var(String),
    Field(Instance, String),
}

pub struct Interpreter {
    env: Env,
    output: Vec<String>,
    echo: bool,
    depth: usize,
    max_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self { env: Env::new(), output: Vec::new(), echo: false, depth: 0, max_depth: DEFAULT_MAX_CALL_DEPTH }
    }

    /// Also write each `printf` line to stdout as it happens.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Runs every top-level declaration in order; the first runtime error aborts the run.
    pub fn interpret(&mut self, program: &Program) -> RunResult<()> {
        debug!(decls = program.decls.len(), "interpreter start");
        let result = self.run_program(program);
        match &result {
            Ok(()) => debug!(lines = self.output.len(), "interpreter finished"),
            Err(e) => warn!(line = e.span().line, "runtime error: {}", e),
        }
        result
    }

    fn run_program(&mut self, program: &Program) -> RunResult<()> {
        for stmt in &program.decls {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                Flow::Break(span) => return Err(RuntimeError::MisplacedJump { span, keyword: "break" }),
                Flow::Continue(span) => return Err(RuntimeError::MisplacedJump { span, keyword: "continue" }),
                Flow::Return(_) => break,
            }
        }
        Ok(())
    }

    /* ── Calls ────────────────────────────────────────────── */

    /// Executes a function body in `env` (which already holds the arguments).
    pub fn call_body(&mut self, decl: &FuncDecl, env: Env, span: Span) -> RunResult<Value> {
        if self.depth >= self.max_depth {
            return Err(RuntimeError::CallDepthExceeded { span, limit: self.max_depth });
        }
        self.depth += 1;
        trace!(function = %decl.name, depth = self.depth, "call");
        let result = ensure_sufficient_stack(|| self.with_env(env, |rt| rt.exec_stmts(&decl.body)));
        self.depth -= 1;
        match result? {
            Flow::Normal => Ok(Value::Null),
            Flow::Return(v) => Ok(v),
            Flow::Break(span) => Err(RuntimeError::MisplacedJump { span, keyword: "break" }),
            Flow::Continue(span) => Err(RuntimeError::MisplacedJump { span, keyword: "continue" }),
        }
    }

    /// Declares every field of a fresh instance, then runs the initializers in order.
    pub fn init_fields(&mut self, instance: &Instance) -> RunResult<()> {
        let class = instance.class();
        let decl = Rc::clone(class.decl());
        for member in &decl.members {
            if let StmtKind::VarDecl(var) = &member.kind {
                instance.define_field(&var.name, None);
            }
        }
        let env = Env::with_this(class.env(), instance);
        self.with_env(env, |rt| {
            for member in &decl.members {
                if let StmtKind::VarDecl(var) = &member.kind {
                    if let Some(init) = &var.init {
                        let value = rt.eval_expr(init)?;
                        instance.set(&var.name, value);
                    }
                }
            }
            Ok(())
        })
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>, span: Span) -> RunResult<Value> {
        match callee {
            Value::Function(fun) => fun.call(self, args, span),
            Value::Class(class) => class.call(self, args, span),
            other => Err(RuntimeError::NotCallable { span, ty: other.type_name() }),
        }
    }

    /// Swaps in `env` for the duration of `f`, restoring the previous one on every path.
    fn with_env<T>(&mut self, env: Env, f: impl FnOnce(&mut Self) -> RunResult<T>) -> RunResult<T> {
        let saved = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = saved;
        result
    }

    /* ── Statements ───────────────────────────────────────── */

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> RunResult<Flow> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> RunResult<Flow> {
        let env = Env::wrap(&self.env);
        self.with_env(env, |rt| rt.exec_stmts(stmts))
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> RunResult<Flow> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> RunResult<Flow> {
        match &stmt.kind {
            StmtKind::FuncDecl(decl) => {
                let fun = Function::new(Rc::clone(decl), self.env.clone());
                self.env.define(&decl.name, Some(Value::Function(fun)));
            }
            StmtKind::VarDecl(var) => {
                let value = match &var.init {
                    Some(init) => Some(self.eval_expr(init)?),
                    None => None,
                };
                self.env.define(&var.name, value);
            }
            StmtKind::ClassDecl(decl) => self.declare_class(decl),
            StmtKind::ConstructorDecl(_) | StmtKind::DestructorDecl(_) => {}
            StmtKind::Compound(stmts) => return self.exec_block(stmts),
            StmtKind::If { cond, then_branch, else_branch } => {
                if self.eval_expr(cond)?.is_truthy() {
                    return self.exec_stmt(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.exec_stmt(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                while self.eval_expr(cond)?.is_truthy() {
                    match self.exec_stmt(body)? {
                        Flow::Break(_) => break,
                        Flow::Normal | Flow::Continue(_) => {}
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
            }
            StmtKind::For { init, cond, update, body } => {
                let env = Env::wrap(&self.env);
                return self.with_env(env, |rt| rt.exec_for(init.as_deref(), cond.as_ref(), update.as_ref(), body));
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Break => return Ok(Flow::Break(stmt.span)),
            StmtKind::Continue => return Ok(Flow::Continue(stmt.span)),
            StmtKind::Printf(e) => {
                let value = self.eval_expr(e)?;
                self.emit(value.to_string());
            }
            StmtKind::Size(e) => match self.eval_expr(e)? {
                Value::String(_) => {}
                other => return Err(RuntimeError::SizeOfNonString { span: e.span, ty: other.type_name() }),
            },
            StmtKind::Expr(e) => {
                self.eval_expr(e)?;
            }
            StmtKind::Null => {}
        }
        Ok(Flow::Normal)
    }

    // `continue` falls through to the update expression.
    fn exec_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> RunResult<Flow> {
        if let Some(init) = init {
            self.exec_stmt(init)?;
        }
        loop {
            if let Some(cond) = cond {
                if !self.eval_expr(cond)?.is_truthy() {
                    break;
                }
            }
            match self.exec_stmt(body)? {
                Flow::Break(_) => break,
                Flow::Normal | Flow::Continue(_) => {}
                ret @ Flow::Return(_) => return Ok(ret),
            }
            if let Some(update) = update {
                self.eval_expr(update)?;
            }
        }
        Ok(Flow::Normal)
    }

    // Destructor bodies are checked but never run.
    fn declare_class(&mut self, decl: &Rc<ClassDecl>) {
        let mut methods = HashMap::new();
        for member in &decl.members {
            match &member.kind {
                StmtKind::FuncDecl(f) => {
                    methods.insert(f.name.clone(), Function::new(Rc::clone(f), self.env.clone()));
                }
                StmtKind::ConstructorDecl(f) => {
                    methods.insert("init".to_string(), Function::new(Rc::clone(f), self.env.clone()));
                }
                _ => {}
            }
        }
        let class = Class::new(Rc::clone(decl), methods, self.env.clone());
        self.env.define(&decl.name, Some(Value::Class(class)));
    }

    fn emit(&mut self, line: String) {
        if self.echo {
            println!("{}", line);
        }
        self.output.push(line);
    }

    /* ── Expressions ──────────────────────────────────────── */

    fn eval_expr(&mut self, e: &Expr) -> RunResult<Value> {
        ensure_sufficient_stack(|| self.eval_expr_inner(e))
    }

    fn eval_expr_inner(&mut self, e: &Expr) -> RunResult<Value> {
        let span = e.span;
        Ok(match &e.kind {
            ExprKind::Literal(lit) => match lit {
                Literal::Int(i) => Value::Int(*i),
                Literal::Float(x) => Value::Float(*x),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::String(s) => Value::from(s.as_str()),
                Literal::Null => Value::Null,
            },
            ExprKind::Var(name) => self.lookup(name, span)?,
            ExprKind::This => self.lookup("this", span)?,
            ExprKind::Unary { op, expr } => {
                let v = self.eval_expr(expr)?;
                match (op, v) {
                    (UnaryOp::Not, v) => Value::Bool(!v.is_truthy()),
                    (UnaryOp::Neg, Value::Int(i)) => {
                        Value::Int(i.checked_neg().ok_or_else(|| RuntimeError::Overflow { span, op: "-".into() })?)
                    }
                    (UnaryOp::Neg, Value::Float(x)) => Value::Float(-x),
                    (UnaryOp::Plus, v @ (Value::Int(_) | Value::Float(_))) => v,
                    (op, other) => {
                        return Err(RuntimeError::NonNumericOperand {
                            span,
                            op: op.to_string(),
                            operand: other.type_name(),
                        })
                    }
                }
            }
            ExprKind::Binary { op, left, right } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                binary(*op, l, r, span)?
            }
            ExprKind::Logical { op, left, right } => {
                let l = self.eval_expr(left)?.is_truthy();
                match op {
                    LogicalOp::Or if l => Value::Bool(true),
                    LogicalOp::And if !l => Value::Bool(false),
                    _ => Value::Bool(self.eval_expr(right)?.is_truthy()),
                }
            }
            ExprKind::Assign { op, name, value } => {
                let v = self.eval_expr(value)?;
                let v = match op.binary() {
                    None => v,
                    Some(bin) => binary(bin, self.lookup(name, span)?, v, span)?,
                };
                if !self.env.assign(name, v.clone()) {
                    return Err(RuntimeError::UndefinedVariable { span, name: name.clone() });
                }
                v
            }
            ExprKind::PreFix { op, target } => {
                let place = self.place(target, *op)?;
                let old = self.read(&place, span)?;
                let new = step(*op, old, span)?;
                self.write(place, new.clone(), span)?;
                new
            }
            ExprKind::PostFix { op, target } => {
                let place = self.place(target, *op)?;
                let old = self.read(&place, span)?;
                let new = step(*op, old.clone(), span)?;
                self.write(place, new, span)?;
                old
            }
            ExprKind::Get { object, name } => {
                let obj = self.eval_expr(object)?;
                let instance = as_instance(obj, name, span)?;
                member(&instance, name, span)?
            }
            ExprKind::Set { object, name, op, value } => {
                let obj = self.eval_expr(object)?;
                let instance = as_instance(obj, name, span)?;
                let v = self.eval_expr(value)?;
                let v = match op.binary() {
                    None => v,
                    Some(bin) => binary(bin, member(&instance, name, span)?, v, span)?,
                };
                if !instance.has_field(name) {
                    return Err(RuntimeError::UndefinedMember {
                        span,
                        class: instance.class().name().to_string(),
                        name: name.clone(),
                    });
                }
                instance.set(name, v.clone());
                v
            }
            ExprKind::Call { callee, args } => {
                let callee_v = self.eval_expr(callee)?;
                let mut argv = Vec::with_capacity(args.len());
                for a in args {
                    argv.push(self.eval_expr(a)?);
                }
                self.call_value(callee_v, argv, span)?
            }
        })
    }

    fn lookup(&self, name: &str, span: Span) -> RunResult<Value> {
        match self.env.get(name) {
            Lookup::Found(v) => Ok(v),
            Lookup::Uninitialized => Err(RuntimeError::Uninitialized { span, name: name.to_string() }),
            Lookup::Missing => Err(RuntimeError::UndefinedVariable { span, name: name.to_string() }),
        }
    }

    fn place(&mut self, target: &Expr, op: IncDec) -> RunResult<Place> {
        match &target.kind {
            ExprKind::Var(name) => Ok(Place::Var(name.clone())),
            ExprKind::Get { object, name } => {
                let obj = self.eval_expr(object)?;
                Ok(Place::Field(as_instance(obj, name, target.span)?, name.clone()))
            }
            _ => Err(RuntimeError::InvalidTarget { span: target.span, op: op.to_string() }),
        }
    }

    fn read(&self, place: &Place, span: Span) -> RunResult<Value> {
        match place {
            Place::Var(name) => self.lookup(name, span),
            Place::Field(instance, name) => member(instance, name, span),
        }
    }

    fn write(&mut self, place: Place, value: Value, span: Span) -> RunResult<()> {
        match place {
            Place::Var(name) => {
                if self.env.assign(&name, value) {
                    Ok(())
                } else {
                    Err(RuntimeError::UndefinedVariable { span, name })
                }
            }
            Place::Field(instance, name) => {
                instance.set(&name, value);
                Ok(())
            }
        }
    }
}

fn as_instance(value: Value, name: &str, span: Span) -> RunResult<Instance> {
    match value {
        Value::Instance(instance) => Ok(instance),
        other => Err(RuntimeError::NotInstance { span, name: name.to_string(), ty: other.type_name() }),
    }
}

fn member(instance: &Instance, name: &str, span: Span) -> RunResult<Value> {
    match instance.get(name) {
        Lookup::Found(v) => Ok(v),
        Lookup::Uninitialized => Err(RuntimeError::Uninitialized { span, name: name.to_string() }),
        Lookup::Missing => Err(RuntimeError::UndefinedMember {
            span,
            class: instance.class().name().to_string(),
            name: name.to_string(),
        }),
    }
}

fn step(op: IncDec, value: Value, span: Span) -> RunResult<Value> {
    match value {
        Value::Int(i) => i
            .checked_add(op.delta())
            .map(Value::Int)
            .ok_or_else(|| RuntimeError::Overflow { span, op: op.to_string() }),
        Value::Float(x) => Ok(Value::Float(x + op.delta() as f64)),
        other => Err(RuntimeError::NonNumericOperand { span, op: op.to_string(), operand: other.type_name() }),
    }
}

fn binary(op: BinaryOp, l: Value, r: Value, span: Span) -> RunResult<Value> {
    use BinaryOp::*;
    let unsupported = |l: &Value, r: &Value| RuntimeError::UnsupportedOperands {
        span,
        op: op.to_string(),
        left: l.type_name(),
        right: r.type_name(),
    };
    match op {
        Eq => Ok(Value::Bool(l.equals(&r))),
        Ne => Ok(Value::Bool(!l.equals(&r))),
        Lt | Le | Gt | Ge => {
            let ordering = match (&l, &r) {
                (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
                _ => match (l.as_f64(), r.as_f64()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => return Err(unsupported(&l, &r)),
                },
            };
            // NaN compares false under every operator
            let result = ordering.is_some_and(|o| match op {
                Lt => o.is_lt(),
                Le => o.is_le(),
                Gt => o.is_gt(),
                _ => o.is_ge(),
            });
            Ok(Value::Bool(result))
        }
        Add | Sub | Mul | Div | Mod => match (&l, &r) {
            (Value::Int(a), Value::Int(b)) => int_arith(op, *a, *b, span),
            (Value::String(a), Value::String(b)) if op == Add => {
                Ok(Value::String(Rc::from(format!("{}{}", a, b))))
            }
            _ => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) => float_arith(op, a, b, span),
                _ => Err(unsupported(&l, &r)),
            },
        },
    }
}

// Truncating division and remainder, as in C++.
fn int_arith(op: BinaryOp, a: i64, b: i64, span: Span) -> RunResult<Value> {
    use BinaryOp::*;
    if matches!(op, Div | Mod) && b == 0 {
        return Err(RuntimeError::DivisionByZero { span, op: op.to_string() });
    }
    let result = match op {
        Add => a.checked_add(b),
        Sub => a.checked_sub(b),
        Mul => a.checked_mul(b),
        Div => a.checked_div(b),
        _ => a.checked_rem(b),
    };
    result.map(Value::Int).ok_or_else(|| RuntimeError::Overflow { span, op: op.to_string() })
}

fn float_arith(op: BinaryOp, a: f64, b: f64, span: Span) -> RunResult<Value> {
    use BinaryOp::*;
    if matches!(op, Div | Mod) && b == 0.0 {
        return Err(RuntimeError::DivisionByZero { span, op: op.to_string() });
    }
    Ok(Value::Float(match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div => a / b,
        _ => a % b,
    }))
}
