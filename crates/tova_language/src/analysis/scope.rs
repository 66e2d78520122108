//! Scope and symbol storage.
//!
//! Scopes form a tree stored in append-only vectors, addressed by
//! [`ScopeId`] / [`SymbolId`] indices. The tree is built during analysis and
//! retained by the language server for position queries, so lookups never
//! require the AST.

use std::collections::HashMap;

use tova_base::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// What kind of construct opened a scope. [`ScopeTree::block_context`]
/// reduces this to the four block contexts declarations care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeContext {
    Module,
    Server,
    Client,
    Shared,
    Function,
    Block,
    Component,
    Store,
    RouteGroup,
}

/// The effective block context after walking out of functions and blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockContext {
    Module,
    Server,
    Client,
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Type,
    Builtin,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub span: Span,
    pub type_annotation: Option<String>,
    pub inferred_type: Option<String>,
    pub param_names: Vec<String>,
    pub param_types: Vec<Option<String>>,
    pub return_type: Option<String>,
    /// For variant constructors, the type they belong to.
    pub variant_of: Option<String>,
    pub mutable: bool,
    /// Reads of reactive symbols lower to getter calls on the client.
    pub reactive: bool,
    /// Exempt from the unused-symbol warning (`pub`, `main`, `_`-prefixed,
    /// constructors, RPC functions, components).
    pub exempt_unused: bool,
    pub used: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, span: Span) -> Self {
        Symbol {
            name: name.into(),
            kind,
            span,
            type_annotation: None,
            inferred_type: None,
            param_names: Vec::new(),
            param_types: Vec::new(),
            return_type: None,
            variant_of: None,
            mutable: false,
            reactive: false,
            exempt_unused: false,
            used: false,
        }
    }
}

#[derive(Debug)]
pub struct Scope {
    pub context: ScopeContext,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub symbols: HashMap<String, SymbolId>,
    pub start: Span,
    pub end: Span,
}

#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl ScopeTree {
    pub fn new() -> Self {
        let root = Scope {
            context: ScopeContext::Module,
            parent: None,
            children: Vec::new(),
            symbols: HashMap::new(),
            start: Span::new(0, 0, 1, 1),
            end: Span::new(usize::MAX, usize::MAX, u32::MAX, u32::MAX),
        };
        ScopeTree {
            scopes: vec![root],
            symbols: Vec::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self, parent: ScopeId, context: ScopeContext, start: Span) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            context,
            parent: Some(parent),
            children: Vec::new(),
            symbols: HashMap::new(),
            start,
            end: start,
        });
        self.scopes[parent.0 as usize].children.push(id);
        id
    }

    pub fn set_scope_end(&mut self, id: ScopeId, end: Span) {
        self.scope_mut(id).end = end;
    }

    /// Installs a symbol. `Err` carries the already-present symbol.
    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol) -> Result<SymbolId, SymbolId> {
        if let Some(&existing) = self.scope(scope).symbols.get(&symbol.name) {
            return Err(existing);
        }
        let id = SymbolId(self.symbols.len() as u32);
        let name = symbol.name.clone();
        self.symbols.push(symbol);
        self.scope_mut(scope).symbols.insert(name, id);
        Ok(id)
    }

    /// Replaces an existing binding in `scope`. User declarations may
    /// override seeded builtins this way.
    pub fn override_symbol(&mut self, scope: ScopeId, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        let name = symbol.name.clone();
        self.symbols.push(symbol);
        self.scope_mut(scope).symbols.insert(name, id);
        id
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope).symbols.get(name).copied()
    }

    /// Walks this scope and its ancestors.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if let Some(sym) = self.lookup_local(id, name) {
                return Some(sym);
            }
            cursor = self.scope(id).parent;
        }
        None
    }

    /// Looks up starting from the parent scope; used for shadowing checks.
    pub fn lookup_outer(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope).parent.and_then(|p| self.lookup(p, name))
    }

    /// The effective block context, walking out of functions, blocks,
    /// components, and stores.
    pub fn block_context(&self, scope: ScopeId) -> BlockContext {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            match self.scope(id).context {
                ScopeContext::Module => return BlockContext::Module,
                ScopeContext::Server => return BlockContext::Server,
                ScopeContext::Client | ScopeContext::Component | ScopeContext::Store => {
                    return BlockContext::Client
                }
                ScopeContext::Shared => return BlockContext::Shared,
                _ => cursor = self.scope(id).parent,
            }
        }
        BlockContext::Module
    }

    /// Every name visible from `scope`, innermost first. Used for
    /// did-you-mean hints.
    pub fn visible_names(&self, scope: ScopeId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            names.extend(self.scope(id).symbols.keys().map(|s| s.as_str()));
            cursor = self.scope(id).parent;
        }
        names
    }

    /// Symbol ids declared in `scope`, in declaration order.
    pub fn local_symbols(&self, scope: ScopeId) -> Vec<SymbolId> {
        let mut ids: Vec<SymbolId> = self.scope(scope).symbols.values().copied().collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Descends to the innermost scope containing the 1-based position.
    pub fn find_scope_at(&self, line: u32, column: u32) -> ScopeId {
        let mut current = self.root();
        'descend: loop {
            for &child in &self.scope(current).children {
                let s = self.scope(child);
                let after_start = (s.start.line, s.start.column) <= (line, column);
                let before_end = (line, column) <= (s.end.line, s.end.column);
                if after_start && before_end {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: u32, col: u32) -> Span {
        Span::new(0, 0, line, col)
    }

    #[test]
    fn declare_and_lookup_local() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let id = tree
            .declare(root, Symbol::new("x", SymbolKind::Variable, span(1, 1)))
            .unwrap();
        assert_eq!(tree.lookup_local(root, "x"), Some(id));
        assert_eq!(tree.lookup_local(root, "y"), None);
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let first = tree
            .declare(root, Symbol::new("x", SymbolKind::Variable, span(1, 1)))
            .unwrap();
        let err = tree
            .declare(root, Symbol::new("x", SymbolKind::Variable, span(2, 1)))
            .unwrap_err();
        assert_eq!(err, first);
    }

    #[test]
    fn lookup_walks_parents() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let id = tree
            .declare(root, Symbol::new("outer", SymbolKind::Variable, span(1, 1)))
            .unwrap();
        let inner = tree.push_scope(root, ScopeContext::Function, span(2, 1));
        assert_eq!(tree.lookup(inner, "outer"), Some(id));
        assert_eq!(tree.lookup_local(inner, "outer"), None);
    }

    #[test]
    fn block_context_walks_out_of_functions() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let server = tree.push_scope(root, ScopeContext::Server, span(1, 1));
        let func = tree.push_scope(server, ScopeContext::Function, span(2, 1));
        let block = tree.push_scope(func, ScopeContext::Block, span(3, 1));
        assert_eq!(tree.block_context(block), BlockContext::Server);

        let client = tree.push_scope(root, ScopeContext::Client, span(10, 1));
        let comp = tree.push_scope(client, ScopeContext::Component, span(11, 1));
        assert_eq!(tree.block_context(comp), BlockContext::Client);
    }

    #[test]
    fn find_scope_at_descends_to_innermost() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let outer = tree.push_scope(root, ScopeContext::Function, span(2, 1));
        tree.set_scope_end(outer, span(10, 1));
        let inner = tree.push_scope(outer, ScopeContext::Block, span(4, 1));
        tree.set_scope_end(inner, span(6, 1));

        assert_eq!(tree.find_scope_at(5, 3), inner);
        assert_eq!(tree.find_scope_at(8, 1), outer);
        assert_eq!(tree.find_scope_at(20, 1), root);
    }

    #[test]
    fn child_parent_links_hold() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let child = tree.push_scope(root, ScopeContext::Block, span(1, 1));
        assert_eq!(tree.scope(child).parent, Some(root));
        assert!(tree.scope(root).children.contains(&child));
    }
}
