//! Lexical scope tracking.
//!
//! The parser maintains a stack-shaped path through a scope tree built as
//! declarations nest. Each scope owns a table of identifiers known to name
//! types in that scope; the type parser consults the stack when deciding
//! whether `X *y` declares a pointer or `X<` opens a template-id. Parent
//! links are indices into the tree, so the structure stays acyclic.

use rustc_hash::FxHashSet;

/// What kind of region a scope covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    /// The region between a template parameter list and the end of the
    /// declaration it applies to.
    Template,
}

/// A node in the scope tree.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: Option<String>,
    pub parent: Option<usize>,
    types: FxHashSet<String>,
    pub children: Vec<usize>,
}

/// The scope tree plus the active stack of scope ids.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    stack: Vec<usize>,
}

impl ScopeStack {
    /// Create a stack holding the global scope, optionally pre-seeded with
    /// known type names.
    pub fn new(known_types: impl IntoIterator<Item = String>) -> Self {
        let global = Scope {
            kind: ScopeKind::Global,
            name: None,
            parent: None,
            types: known_types.into_iter().collect(),
            children: Vec::new(),
        };
        Self {
            scopes: vec![global],
            stack: vec![0],
        }
    }

    /// Enter a child scope of the current one.
    pub fn push(&mut self, kind: ScopeKind, name: Option<String>) {
        let parent = self.current_id();
        let id = self.scopes.len();
        self.scopes.push(Scope {
            kind,
            name,
            parent: Some(parent),
            types: FxHashSet::default(),
            children: Vec::new(),
        });
        self.scopes[parent].children.push(id);
        self.stack.push(id);
    }

    /// Leave the current scope. The global scope is never popped.
    pub fn pop(&mut self) {
        debug_assert!(self.stack.len() > 1, "scope stack underflow");
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn current_id(&self) -> usize {
        *self.stack.last().unwrap_or(&0)
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.scopes[self.current_id()].kind
    }

    /// Record that an identifier names a type in the current scope.
    pub fn declare_type(&mut self, name: impl Into<String>) {
        let id = self.current_id();
        self.scopes[id].types.insert(name.into());
    }

    /// Record a type name in the parent of the current scope. Used when a
    /// class registers its own name while its body scope is already open.
    pub fn declare_type_in_parent(&mut self, name: impl Into<String>) {
        let id = self.current_id();
        let target = self.scopes[id].parent.unwrap_or(id);
        self.scopes[target].types.insert(name.into());
    }

    /// Record a type name in the nearest scope that outlives the current
    /// template header, so names introduced by templated declarations stay
    /// visible after the header scope is popped.
    pub fn declare_type_skipping_templates(&mut self, name: impl Into<String>) {
        let mut id = self.current_id();
        while self.scopes[id].kind == ScopeKind::Template {
            match self.scopes[id].parent {
                Some(parent) => id = parent,
                None => break,
            }
        }
        self.scopes[id].types.insert(name.into());
    }

    /// Whether an identifier names a type in the current scope or any
    /// enclosing one.
    pub fn is_type_name(&self, name: &str) -> bool {
        for &id in self.stack.iter().rev() {
            if self.scopes[id].types.contains(name) {
                return true;
            }
        }
        false
    }

    /// Depth of the active stack (1 = global only).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_stack() {
        let mut scopes = ScopeStack::new(std::iter::empty());
        scopes.declare_type("GlobalT");
        scopes.push(ScopeKind::Namespace, Some("ns".into()));
        scopes.declare_type("NsT");

        assert!(scopes.is_type_name("GlobalT"));
        assert!(scopes.is_type_name("NsT"));

        scopes.pop();
        assert!(scopes.is_type_name("GlobalT"));
        assert!(!scopes.is_type_name("NsT"));
    }

    #[test]
    fn test_seeded_types() {
        let scopes = ScopeStack::new(["Known".to_string()]);
        assert!(scopes.is_type_name("Known"));
        assert!(!scopes.is_type_name("Unknown"));
    }

    #[test]
    fn test_declare_in_parent() {
        let mut scopes = ScopeStack::new(std::iter::empty());
        scopes.push(ScopeKind::Class, Some("C".into()));
        scopes.declare_type_in_parent("C");
        assert!(scopes.is_type_name("C"));
        scopes.pop();
        assert!(scopes.is_type_name("C"));
    }

    #[test]
    fn test_global_never_popped() {
        let mut scopes = ScopeStack::new(std::iter::empty());
        scopes.pop();
        assert_eq!(scopes.depth(), 1);
        assert_eq!(scopes.current_kind(), ScopeKind::Global);
    }
}
