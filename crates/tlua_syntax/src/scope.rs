//! Lexical scopes and variable identity.
//!
//! The parser resolves every identifier while it parses: declarations append a binding to the current scope,
//! references search the scope chain from the innermost scope outward, and anything not found becomes a global.
//!
//! ## Notes
//! - A variable's identity is its [`VarId`] (declaring scope plus position), never its name. Two `local x`
//!   declarations in the same scope are two different variables.
//! - Globals are not stored in any scope. A reconciliation table hands out one [`GlobalId`] per name, so every
//!   reference to the same undeclared name is identity-equal.

use std::collections::HashMap;

/// Index of a scope in a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a global name in a [`ScopeTree`]'s reconciliation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(u32);

/// Identity of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarId {
    Local { scope: ScopeId, position: u32 },
    Global(GlobalId),
}

impl VarId {
    pub fn is_local(self) -> bool {
        matches!(self, VarId::Local { .. })
    }
}

/// A declared variable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    /// Byte offset of the declaring name.
    pub index: usize,
}

/// A lexical scope: its parent link and its bindings in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub bindings: Vec<Binding>,
}

/// All scopes of one chunk plus the global reconciliation table.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    globals: Vec<String>,
    global_ids: HashMap<String, GlobalId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            globals: Vec::new(),
            global_ids: HashMap::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a child scope of `parent`.
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            bindings: Vec::new(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id).parent
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Append a new binding to `scope`; always a fresh variable, even when the name is already bound.
    pub fn declare(&mut self, scope: ScopeId, name: &str, index: usize) -> VarId {
        let bindings = &mut self.scopes[scope.index()].bindings;
        let position = bindings.len() as u32;
        bindings.push(Binding {
            name: name.to_string(),
            index,
        });
        VarId::Local { scope, position }
    }

    /// Find the latest declaration of `name` visible from `scope`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<VarId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let found = self.scope(id).bindings.iter().rposition(|b| b.name == name);
            if let Some(position) = found {
                return Some(VarId::Local {
                    scope: id,
                    position: position as u32,
                });
            }
            current = self.parent(id);
        }
        None
    }

    /// Resolve a reference: the visible local, or the global of that name.
    pub fn resolve(&mut self, scope: ScopeId, name: &str) -> VarId {
        match self.lookup(scope, name) {
            Some(var) => var,
            None => self.global(name),
        }
    }

    /// The identity of the global `name`, registering it on first use.
    pub fn global(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.global_ids.get(name) {
            return VarId::Global(id);
        }
        let id = GlobalId(self.globals.len() as u32);
        self.globals.push(name.to_string());
        self.global_ids.insert(name.to_string(), id);
        VarId::Global(id)
    }

    /// The identity of the global `name` if any reference to it was parsed.
    pub fn global_id(&self, name: &str) -> Option<VarId> {
        self.global_ids.get(name).map(|&id| VarId::Global(id))
    }

    /// Name of a variable.
    pub fn name(&self, var: VarId) -> &str {
        match var {
            VarId::Local { scope, position } => &self.scope(scope).bindings[position as usize].name,
            VarId::Global(GlobalId(i)) => &self.globals[i as usize],
        }
    }

    /// Names of every global referenced in the chunk, in first-reference order.
    pub fn globals(&self) -> impl Iterator<Item = &str> {
        self.globals.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redeclaration_shadows() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let first = tree.declare(root, "x", 0);
        let second = tree.declare(root, "x", 10);
        assert_ne!(first, second);
        assert_eq!(tree.lookup(root, "x"), Some(second));
    }

    #[test]
    fn test_lookup_walks_parents() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let outer = tree.declare(root, "x", 0);
        let child = tree.push(root);
        assert_eq!(tree.lookup(child, "x"), Some(outer));
        let inner = tree.declare(child, "x", 5);
        assert_eq!(tree.lookup(child, "x"), Some(inner));
        assert_eq!(tree.lookup(root, "x"), Some(outer));
    }

    #[test]
    fn test_globals_are_reconciled_by_name() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let child = tree.push(root);
        let a = tree.resolve(root, "print");
        let b = tree.resolve(child, "print");
        assert_eq!(a, b);
        assert!(!a.is_local());
        assert_eq!(tree.name(a), "print");
        assert!(tree.scope(root).bindings.is_empty());
        assert_eq!(tree.global_id("print"), Some(a));
        assert_eq!(tree.global_id("other"), None);
    }
}
