//! Symbol tables for the checker.
//!
//! Scopes live in one arena and refer to each other by index: each scope
//! knows its parent and owns the list of its children, so the whole tree
//! survives the pass and can be dumped afterwards.
use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::core::types::Type;

pub type ScopeId = usize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Class,
    Field,
    Method,
    Constructor,
    Destructor,
}

impl SymbolKind {
    /// Symbols that denote storage and may appear on the left of `=`.
    pub fn is_assignable(self) -> bool {
        matches!(self, SymbolKind::Variable | SymbolKind::Parameter | SymbolKind::Field)
    }

    pub fn label(self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Destructor => "destructor",
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub label: String,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub symbols: Vec<Symbol>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Scope {
    fn new(id: ScopeId, label: String, parent: Option<ScopeId>) -> Self {
        Scope { id, label, parent, children: Vec::new(), symbols: Vec::new(), index: HashMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }
}

#[derive(Debug, Serialize)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    #[serde(skip)]
    current: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { scopes: vec![Scope::new(0, "global".into(), None)], current: 0 }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Opens a child of the current scope and makes it current.
    pub fn enter(&mut self, label: impl Into<String>) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(id, label.into(), Some(self.current)));
        self.scopes[self.current].children.push(id);
        self.current = id;
        id
    }

    pub fn exit(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Inserts into the current scope. On a clash the earlier symbol is returned.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        let scope = &mut self.scopes[self.current];
        if let Some(&i) = scope.index.get(&symbol.name) {
            return Err(scope.symbols[i].clone());
        }
        scope.index.insert(symbol.name.clone(), scope.symbols.len());
        scope.symbols.push(symbol);
        Ok(())
    }

    /// Walks outward from the current scope.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut id = Some(self.current);
        while let Some(i) = id {
            let scope = &self.scopes[i];
            if let Some(sym) = scope.get(name) {
                return Some(sym);
            }
            id = scope.parent;
        }
        None
    }

    /// Indented text rendering of the scope tree.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_scope(0, 0, &mut out);
        out
    }

    fn dump_scope(&self, id: ScopeId, depth: usize, out: &mut String) {
        let scope = &self.scopes[id];
        let pad = "  ".repeat(depth);
        let _ = writeln!(out, "{}scope #{} ({})", pad, scope.id, scope.label);
        for sym in &scope.symbols {
            let _ = writeln!(
                out,
                "{}  {} {}: {}  [{}:{}]",
                pad,
                sym.kind.label(),
                sym.name,
                sym.ty,
                sym.line,
                sym.column
            );
        }
        for &child in &scope.children {
            self.dump_scope(child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, ty: Type) -> Symbol {
        Symbol { name: name.into(), kind: SymbolKind::Variable, ty, line: 1, column: 1 }
    }

    #[test]
    fn shadowing_allowed_redeclaration_rejected() {
        let mut t = SymbolTable::new();
        t.declare(var("x", Type::Int)).unwrap();
        assert!(t.declare(var("x", Type::Float)).is_err());
        t.enter("block");
        t.declare(var("x", Type::Float)).unwrap();
        assert_eq!(t.lookup("x").map(|s| s.ty.clone()), Some(Type::Float));
        t.exit();
        assert_eq!(t.lookup("x").map(|s| s.ty.clone()), Some(Type::Int));
    }

    #[test]
    fn children_are_owned_by_parent() {
        let mut t = SymbolTable::new();
        let a = t.enter("function f");
        let b = t.enter("block");
        t.exit();
        t.exit();
        assert_eq!(t.scope(0).children, vec![a]);
        assert_eq!(t.scope(a).children, vec![b]);
        assert_eq!(t.scope(b).parent, Some(a));
    }

    #[test]
    fn dump_and_json() {
        let mut t = SymbolTable::new();
        t.declare(var("count", Type::Int)).unwrap();
        let text = t.dump();
        assert!(text.contains("scope #0 (global)"));
        assert!(text.contains("variable count: int"));
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["scopes"][0]["symbols"][0]["ty"], "int");
        assert_eq!(json["scopes"][0]["symbols"][0]["kind"], "variable");
    }
}
