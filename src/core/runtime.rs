//! Runtime representation of Mini C++ values.

use std::cell::RefCell;
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::rc::Rc;

use crate::core::ast::{ClassDecl, FuncDecl};
use crate::core::error::{Diagnostic, ErrorKind};
use crate::core::token::Span;
use crate::core::vm::Interpreter;

pub type RunResult<T> = Result<T, RuntimeError>;

pub trait Call: fmt::Display {
    fn name(&self) -> String;
    fn arity(&self) -> usize;
    fn call(&self, rt: &mut Interpreter, args: Vec<Value>, span: Span) -> RunResult<Value>;
}

/* ── Errors ─────────────────────────────────────────────── */

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    ArityMismatch { span: Span, name: String, expected: usize, actual: usize },
    UnsupportedOperands { span: Span, op: String, left: String, right: String },
    NonNumericOperand { span: Span, op: String, operand: String },
    DivisionByZero { span: Span, op: String },
    Overflow { span: Span, op: String },
    NotCallable { span: Span, ty: String },
    NotInstance { span: Span, name: String, ty: String },
    UndefinedMember { span: Span, class: String, name: String },
    UndefinedVariable { span: Span, name: String },
    Uninitialized { span: Span, name: String },
    SizeOfNonString { span: Span, ty: String },
    CallDepthExceeded { span: Span, limit: usize },
    InvalidTarget { span: Span, op: String },
    /// `break`/`continue` escaping a function body.
    MisplacedJump { span: Span, keyword: &'static str },
}

impl RuntimeError {
    pub fn span(&self) -> Span {
        use RuntimeError::*;
        match self {
            ArityMismatch { span, .. }
            | UnsupportedOperands { span, .. }
            | NonNumericOperand { span, .. }
            | DivisionByZero { span, .. }
            | Overflow { span, .. }
            | NotCallable { span, .. }
            | NotInstance { span, .. }
            | UndefinedMember { span, .. }
            | UndefinedVariable { span, .. }
            | Uninitialized { span, .. }
            | SizeOfNonString { span, .. }
            | CallDepthExceeded { span, .. }
            | InvalidTarget { span, .. }
            | MisplacedJump { span, .. } => *span,
        }
    }
}

impl error::Error for RuntimeError {}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RuntimeError::*;
        match self {
            ArityMismatch { name, expected, actual, .. } => {
                write!(f, "'{}' expected {} arguments, got {}", name, expected, actual)
            }
            UnsupportedOperands { op, left, right, .. } => {
                write!(f, "unsupported operand types for '{}': {} and {}", op, left, right)
            }
            NonNumericOperand { op, operand, .. } => {
                write!(f, "operand of '{}' must be a number, got {}", op, operand)
            }
            DivisionByZero { op, .. } => write!(f, "division by zero in '{}'", op),
            Overflow { op, .. } => write!(f, "integer overflow in '{}'", op),
            NotCallable { ty, .. } => write!(f, "can only call functions and classes, not {}", ty),
            NotInstance { name, ty, .. } => {
                write!(f, "only instances have members (accessing '{}' on {})", name, ty)
            }
            UndefinedMember { class, name, .. } => {
                write!(f, "'{}' instance has no field or method '{}'", class, name)
            }
            UndefinedVariable { name, .. } => write!(f, "undefined variable '{}'", name),
            Uninitialized { name, .. } => write!(f, "'{}' is read before it is initialized", name),
            SizeOfNonString { ty, .. } => write!(f, "size() expects a string, got {}", ty),
            CallDepthExceeded { limit, .. } => write!(f, "maximum call depth ({}) exceeded", limit),
            InvalidTarget { op, .. } => write!(f, "operand of '{}' is not a variable or field", op),
            MisplacedJump { keyword, .. } => write!(f, "'{}' outside a loop", keyword),
        }
    }
}

impl From<RuntimeError> for Diagnostic {
    fn from(e: RuntimeError) -> Self {
        Diagnostic::new(ErrorKind::Runtime, e.to_string(), e.span())
    }
}

/* ── Values ─────────────────────────────────────────────── */

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(Rc<str>),
    Null,
    Function(Function),
    Class(Class),
    Instance(Instance),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            _ => true,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Int(_) => "int".into(),
            Value::Float(_) => "float".into(),
            Value::Bool(_) => "bool".into(),
            Value::String(_) => "string".into(),
            Value::Null => "null".into(),
            Value::Function(_) => "function".into(),
            Value::Class(c) => format!("class {}", c.name()),
            Value::Instance(i) => i.class().name().to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// `==` semantics: numbers across int/float, identity for reference values.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(&a.0, &b.0),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(&a.0, &b.0),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the fractional part: 3.0, not 3
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
            Value::Null => f.write_str("null"),
            Value::Function(fun) => write!(f, "{}", fun),
            Value::Class(class) => write!(f, "{}", class),
            Value::Instance(inst) => write!(f, "{}", inst),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

/* ── Environments ───────────────────────────────────────── */

/// Outcome of resolving a name in an environment chain.
pub enum Lookup {
    Found(Value),
    Uninitialized,
    Missing,
}

/// One frame of name bindings plus a link to the enclosing frame.
/// Frames created by [`Function::bind`] also carry the receiver, whose
/// fields and methods are visible as bare names below that frame.
#[derive(Clone)]
pub struct Env {
    ptr: Rc<RefCell<Frame>>,
}

struct Frame {
    values: HashMap<String, Option<Value>>,
    parent: Option<Env>,
    this: Option<Instance>,
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl Env {
    pub fn new() -> Self {
        Self::with(None, None)
    }

    pub fn wrap(env: &Env) -> Self {
        Self::with(Some(env.clone()), None)
    }

    /// Child frame defining `this`.
    pub fn with_this(env: &Env, instance: &Instance) -> Self {
        let frame = Self::with(Some(env.clone()), Some(instance.clone()));
        frame.define("this", Some(Value::Instance(instance.clone())));
        frame
    }

    fn with(parent: Option<Env>, this: Option<Instance>) -> Self {
        Env { ptr: Rc::new(RefCell::new(Frame { values: HashMap::new(), parent, this })) }
    }

    /// Binds `name` in this frame; `None` declares it without a value.
    pub fn define(&self, name: &str, value: Option<Value>) {
        self.ptr.borrow_mut().values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Lookup {
        let mut curr = Some(self.clone());
        while let Some(env) = curr {
            let frame = env.ptr.borrow();
            if let Some(slot) = frame.values.get(name) {
                return match slot {
                    Some(v) => Lookup::Found(v.clone()),
                    None => Lookup::Uninitialized,
                };
            }
            if let Some(instance) = &frame.this {
                match instance.get(name) {
                    Lookup::Missing => {}
                    found => return found,
                }
            }
            curr = frame.parent.clone();
        }
        Lookup::Missing
    }

    /// Overwrites the nearest binding of `name`. Returns false if none exists.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut curr = Some(self.clone());
        while let Some(env) = curr {
            let mut frame = env.ptr.borrow_mut();
            if let Some(slot) = frame.values.get_mut(name) {
                *slot = Some(value);
                return true;
            }
            if let Some(instance) = &frame.this {
                if instance.has_field(name) {
                    instance.set(name, value);
                    return true;
                }
            }
            curr = frame.parent.clone();
        }
        false
    }
}

/* ── Functions ──────────────────────────────────────────── */

#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

struct FunctionData {
    decl: Rc<FuncDecl>,
    closure: Env,
}

impl Function {
    pub fn new(decl: Rc<FuncDecl>, closure: Env) -> Self {
        Function(Rc::new(FunctionData { decl, closure }))
    }

    pub fn decl(&self) -> &Rc<FuncDecl> {
        &self.0.decl
    }

    /// Same code, with `this` bound in a frame between the body and the closure.
    pub fn bind(&self, instance: &Instance) -> Function {
        Function::new(Rc::clone(&self.0.decl), Env::with_this(&self.0.closure, instance))
    }
}

impl Call for Function {
    fn name(&self) -> String {
        self.0.decl.name.clone()
    }

    fn arity(&self) -> usize {
        self.0.decl.params.len()
    }

    fn call(&self, rt: &mut Interpreter, args: Vec<Value>, span: Span) -> RunResult<Value> {
        if args.len() != self.arity() {
            return Err(RuntimeError::ArityMismatch {
                span,
                name: self.name(),
                expected: self.arity(),
                actual: args.len(),
            });
        }
        let env = Env::wrap(&self.0.closure);
        for (param, value) in self.0.decl.params.iter().zip(args) {
            env.define(&param.name, Some(value));
        }
        rt.call_body(&self.0.decl, env, span)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.0.decl.name)
    }
}

/* ── Classes and instances ──────────────────────────────── */

#[derive(Clone)]
pub struct Class(Rc<ClassData>);

struct ClassData {
    decl: Rc<ClassDecl>,
    methods: HashMap<String, Function>,
    env: Env,
}

impl Class {
    pub fn new(decl: Rc<ClassDecl>, methods: HashMap<String, Function>, env: Env) -> Self {
        Class(Rc::new(ClassData { decl, methods, env }))
    }

    pub fn name(&self) -> &str {
        &self.0.decl.name
    }

    pub fn decl(&self) -> &Rc<ClassDecl> {
        &self.0.decl
    }

    /// Environment the class was declared in; field initializers run below it.
    pub fn env(&self) -> &Env {
        &self.0.env
    }

    pub fn find_method(&self, name: &str) -> Option<Function> {
        self.0.methods.get(name).cloned()
    }
}

impl Call for Class {
    fn name(&self) -> String {
        self.0.decl.name.clone()
    }

    fn arity(&self) -> usize {
        self.find_method("init").map(|fun| fun.arity()).unwrap_or(0)
    }

    fn call(&self, rt: &mut Interpreter, args: Vec<Value>, span: Span) -> RunResult<Value> {
        let instance = Instance::new(self.clone());
        rt.init_fields(&instance)?;
        match self.find_method("init") {
            Some(init) => {
                init.bind(&instance).call(rt, args, span)?;
            }
            None if !args.is_empty() => {
                return Err(RuntimeError::ArityMismatch {
                    span,
                    name: self.name().to_string(),
                    expected: 0,
                    actual: args.len(),
                });
            }
            None => {}
        }
        Ok(Value::Instance(instance))
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.0.decl.name)
    }
}

#[derive(Clone)]
pub struct Instance(Rc<RefCell<InstanceData>>);

struct InstanceData {
    class: Class,
    fields: HashMap<String, Option<Value>>,
}

impl Instance {
    pub fn new(class: Class) -> Self {
        Instance(Rc::new(RefCell::new(InstanceData { class, fields: HashMap::new() })))
    }

    pub fn class(&self) -> Class {
        self.0.borrow().class.clone()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.0.borrow().fields.contains_key(name)
    }

    /// Declares a field, possibly without a value.
    pub fn define_field(&self, name: &str, value: Option<Value>) {
        self.0.borrow_mut().fields.insert(name.to_string(), value);
    }

    /// Fields first, then methods bound to this instance.
    pub fn get(&self, name: &str) -> Lookup {
        let this = self.0.borrow();
        match this.fields.get(name) {
            Some(Some(v)) => Lookup::Found(v.clone()),
            Some(None) => Lookup::Uninitialized,
            None => match this.class.find_method(name) {
                Some(fun) => Lookup::Found(Value::Function(fun.bind(self))),
                None => Lookup::Missing,
            },
        }
    }

    pub fn set(&self, name: &str, value: Value) {
        self.0.borrow_mut().fields.insert(name.to_string(), Some(value));
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.0.borrow().class.name())
    }
}
