//! Resolved static types used by the checker.
//! Declared types come straight from the source; expression types are derived
//! from them with the small rule set below.

use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Serializer};

use crate::core::ast::{BinaryOp, TypeName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Void,
    /// Type of the `null` literal.
    Null,
    /// An instance of the named class.
    Class(String),
    /// A function or method value.
    Function(Rc<Signature>),
    /// The class itself, as a callable constructor.
    ClassRef(String),
    /// Produced after an error or when only the runtime can decide.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl Type {
    pub fn from_name(name: &TypeName) -> Type {
        match name {
            TypeName::Int => Type::Int,
            TypeName::Float => Type::Float,
            TypeName::Bool => Type::Bool,
            TypeName::String => Type::String,
            TypeName::Void => Type::Void,
            TypeName::Class(c) => Type::Class(c.clone()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Whether a value of type `actual` may be stored where `self` is declared.
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Type::Unknown, _) | (_, Type::Unknown) => true,
            (Type::Class(_) | Type::String, Type::Null) => true,
            (a, b) => a == b,
        }
    }

    /// Result of an arithmetic or comparison operator, `Unknown` when the
    /// operand types leave the outcome to the runtime.
    pub fn binary(op: BinaryOp, left: &Type, right: &Type) -> Type {
        if !op.is_arithmetic() {
            return Type::Bool;
        }
        match (left, right) {
            (Type::Int, Type::Int) => Type::Int,
            (l, r) if l.is_numeric() && r.is_numeric() => Type::Float,
            (Type::String, Type::String) if op == BinaryOp::Add => Type::String,
            _ => Type::Unknown,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Bool => f.write_str("bool"),
            Type::String => f.write_str("string"),
            Type::Void => f.write_str("void"),
            Type::Null => f.write_str("null"),
            Type::Class(name) => f.write_str(name),
            Type::Function(sig) => {
                write!(f, "{}(", sig.ret)?;
                for (i, p) in sig.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                f.write_str(")")
            }
            Type::ClassRef(name) => write!(f, "class {}", name),
            Type::Unknown => f.write_str("unknown"),
        }
    }
}

// Symbol dumps show types the way they are written in messages.
impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_promotion() {
        assert_eq!(Type::binary(BinaryOp::Add, &Type::Int, &Type::Int), Type::Int);
        assert_eq!(Type::binary(BinaryOp::Mul, &Type::Int, &Type::Float), Type::Float);
        assert_eq!(Type::binary(BinaryOp::Add, &Type::String, &Type::String), Type::String);
        assert_eq!(Type::binary(BinaryOp::Sub, &Type::String, &Type::String), Type::Unknown);
        assert_eq!(Type::binary(BinaryOp::Lt, &Type::Int, &Type::Float), Type::Bool);
    }

    #[test]
    fn null_fits_references_only() {
        assert!(Type::Class("Point".into()).accepts(&Type::Null));
        assert!(Type::String.accepts(&Type::Null));
        assert!(!Type::Int.accepts(&Type::Null));
        assert!(!Type::Int.accepts(&Type::Float));
        assert!(Type::Int.accepts(&Type::Unknown));
    }

    #[test]
    fn function_display() {
        let sig = Signature { params: vec![Type::Int, Type::Class("P".into())], ret: Type::Bool };
        assert_eq!(Type::Function(Rc::new(sig)).to_string(), "bool(int, P)");
    }
}
