//! Lexical scope tree.
//!
//! One tree per file, built from `@scope.*` captures in document order.
//! Scope identities are derived from kind + range, so rebuilding the same
//! source produces the same ids and re-entrant handlers stay idempotent.

mod resolver;

pub use resolver::{ResolvedName, ScopeConfig, SearchOrder, SymbolResolver, Visibility, builtins};

use crate::types::{Location, ScopeId, SymbolId, SymbolName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Block,
    Comprehension,
    Lambda,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeKind::Module => "module",
            ScopeKind::Function => "function",
            ScopeKind::Class => "class",
            ScopeKind::Block => "block",
            ScopeKind::Comprehension => "comprehension",
            ScopeKind::Lambda => "lambda",
        };
        f.write_str(s)
    }
}

/// Metadata the resolver needs about a declaration beyond its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclMeta {
    pub location: Location,
    /// Whether the declaration hoists to the nearest function/module scope
    /// (JS function declarations and `var`).
    pub hoistable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub range: Location,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub declarations: IndexMap<SymbolName, SymbolId>,
    /// Name of the defining construct for class scopes; `None` elsewhere.
    pub label: Option<SymbolName>,
    pub(crate) decl_meta: IndexMap<SymbolName, DeclMeta>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, range: Location, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            kind,
            range,
            parent,
            children: Vec::new(),
            declarations: IndexMap::new(),
            label: None,
            decl_meta: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeTree {
    scopes: IndexMap<ScopeId, Scope>,
    root: ScopeId,
}

fn scope_id_for(kind: ScopeKind, range: &Location) -> ScopeId {
    ScopeId::new(format!("scope.{kind}:{}", range.key()))
}

impl ScopeTree {
    /// Create a tree whose root module scope spans the whole file.
    pub fn new(file_range: Location) -> Self {
        let root_id = scope_id_for(ScopeKind::Module, &file_range);
        let mut scopes = IndexMap::new();
        scopes.insert(
            root_id.clone(),
            Scope::new(root_id.clone(), ScopeKind::Module, file_range, None),
        );
        Self {
            scopes,
            root: root_id,
        }
    }

    pub fn root_id(&self) -> &ScopeId {
        &self.root
    }

    pub fn get(&self, id: &ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    /// Insert a scope. The parent is the innermost existing scope containing
    /// the range, so captures must arrive outermost-first (document order
    /// sorted by start ascending, end descending). Re-inserting the same
    /// kind + range returns the existing id.
    pub fn insert(&mut self, kind: ScopeKind, range: Location) -> ScopeId {
        let id = scope_id_for(kind, &range);
        if self.scopes.contains_key(&id) {
            return id;
        }
        let parent_id = self.innermost_containing(&range);
        let scope = Scope::new(id.clone(), kind, range, Some(parent_id.clone()));
        if let Some(parent) = self.scopes.get_mut(&parent_id) {
            parent.children.push(id.clone());
        }
        self.scopes.insert(id.clone(), scope);
        id
    }

    /// Attach a label (the defining construct's name) to a scope.
    pub fn set_label(&mut self, id: &ScopeId, label: SymbolName) {
        if let Some(scope) = self.scopes.get_mut(id) {
            scope.label = Some(label);
        }
    }

    fn innermost_containing(&self, range: &Location) -> ScopeId {
        let mut current = self.root.clone();
        'descend: loop {
            let scope = &self.scopes[&current];
            for child_id in &scope.children {
                let child = &self.scopes[child_id];
                if child.range.contains(range) && child.range != *range {
                    current = child_id.clone();
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// The innermost scope whose range contains the given location.
    pub fn scope_at(&self, location: &Location) -> &ScopeId {
        let mut current = &self.root;
        'descend: loop {
            let scope = &self.scopes[current];
            for child_id in &scope.children {
                let child = &self.scopes[child_id];
                if child.range.contains(location) {
                    current = child_id;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Path of scopes from the innermost containing `location` up to the
    /// root, in inner-to-outer order.
    pub fn chain_at(&self, location: &Location) -> Vec<&Scope> {
        let mut chain = Vec::new();
        let mut current = Some(self.scope_at(location).clone());
        while let Some(id) = current {
            let scope = &self.scopes[&id];
            current = scope.parent.clone();
            chain.push(scope);
        }
        chain
    }

    /// The innermost class scope containing `location`, if any.
    pub fn enclosing_class(&self, location: &Location) -> Option<&Scope> {
        self.chain_at(location)
            .into_iter()
            .find(|s| s.kind == ScopeKind::Class)
    }

    /// Register a declaration in a scope.
    pub fn declare(
        &mut self,
        scope_id: &ScopeId,
        name: SymbolName,
        symbol_id: SymbolId,
        location: Location,
        hoistable: bool,
    ) {
        if let Some(scope) = self.scopes.get_mut(scope_id) {
            scope.declarations.insert(name.clone(), symbol_id);
            scope.decl_meta.insert(
                name,
                DeclMeta {
                    location,
                    hoistable,
                },
            );
        }
    }

    /// Move hoistable declarations out of block scopes into the nearest
    /// enclosing function or module scope. JS/TS finalization pass.
    pub fn hoist_declarations(&mut self) {
        let block_ids: Vec<ScopeId> = self
            .scopes
            .values()
            .filter(|s| s.kind == ScopeKind::Block)
            .map(|s| s.id.clone())
            .collect();

        for block_id in block_ids {
            let hoisted: Vec<(SymbolName, SymbolId, DeclMeta)> = {
                let block = &self.scopes[&block_id];
                block
                    .decl_meta
                    .iter()
                    .filter(|(_, meta)| meta.hoistable)
                    .map(|(name, meta)| {
                        (
                            name.clone(),
                            block.declarations[name].clone(),
                            meta.clone(),
                        )
                    })
                    .collect()
            };
            if hoisted.is_empty() {
                continue;
            }

            let target = self.nearest_hoist_target(&block_id);
            let block = self.scopes.get_mut(&block_id).expect("block scope");
            for (name, _, _) in &hoisted {
                block.declarations.shift_remove(name);
                block.decl_meta.shift_remove(name);
            }
            let target_scope = self.scopes.get_mut(&target).expect("hoist target");
            for (name, symbol_id, meta) in hoisted {
                // An explicit declaration already present in the target wins.
                target_scope.declarations.entry(name.clone()).or_insert(symbol_id);
                target_scope.decl_meta.entry(name).or_insert(meta);
            }
        }
    }

    /// Remove a declaration from a scope, returning it for re-registration
    /// elsewhere. Used by the Python `global`/`nonlocal` pass.
    pub fn undeclare(
        &mut self,
        scope_id: &ScopeId,
        name: &SymbolName,
    ) -> Option<(SymbolId, DeclMeta)> {
        let scope = self.scopes.get_mut(scope_id)?;
        let symbol_id = scope.declarations.shift_remove(name)?;
        let meta = scope.decl_meta.shift_remove(name)?;
        Some((symbol_id, meta))
    }

    /// Ids of the scopes containing `location`, inner-to-outer.
    pub fn chain_ids_at(&self, location: &Location) -> Vec<ScopeId> {
        self.chain_at(location)
            .into_iter()
            .map(|s| s.id.clone())
            .collect()
    }

    fn nearest_hoist_target(&self, from: &ScopeId) -> ScopeId {
        let mut current = self.scopes[from].parent.clone();
        while let Some(id) = current {
            let scope = &self.scopes[&id];
            if matches!(scope.kind, ScopeKind::Function | ScopeKind::Module) {
                return id;
            }
            current = scope.parent.clone();
        }
        self.root.clone()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DefKind, FilePath};

    fn loc(sl: u32, sc: u32, el: u32, ec: u32) -> Location {
        Location::new(FilePath::new("t.js"), sl, sc, el, ec)
    }

    fn sym(name: &str, location: &Location) -> SymbolId {
        SymbolId::for_definition(DefKind::Variable, location, Some(&SymbolName::new(name)))
    }

    #[test]
    fn test_nesting_by_containment() {
        let mut tree = ScopeTree::new(loc(1, 1, 100, 1));
        let outer = tree.insert(ScopeKind::Function, loc(10, 1, 50, 1));
        let inner = tree.insert(ScopeKind::Block, loc(20, 1, 30, 1));

        assert_eq!(tree.get(&inner).unwrap().parent.as_ref(), Some(&outer));
        assert_eq!(
            tree.get(&outer).unwrap().parent.as_ref(),
            Some(tree.root_id())
        );
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut tree = ScopeTree::new(loc(1, 1, 100, 1));
        let a = tree.insert(ScopeKind::Function, loc(10, 1, 50, 1));
        let b = tree.insert(ScopeKind::Function, loc(10, 1, 50, 1));
        assert_eq!(a, b);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_scope_at_picks_innermost() {
        let mut tree = ScopeTree::new(loc(1, 1, 100, 1));
        let outer = tree.insert(ScopeKind::Function, loc(10, 1, 50, 1));
        let inner = tree.insert(ScopeKind::Block, loc(20, 1, 30, 1));

        let probe = loc(25, 3, 25, 10);
        assert_eq!(tree.scope_at(&probe), &inner);
        let probe = loc(40, 3, 40, 10);
        assert_eq!(tree.scope_at(&probe), &outer);
        let probe = loc(90, 1, 90, 5);
        assert_eq!(tree.scope_at(&probe), tree.root_id());
    }

    #[test]
    fn test_enclosing_class() {
        let mut tree = ScopeTree::new(loc(1, 1, 100, 1));
        let class = tree.insert(ScopeKind::Class, loc(5, 1, 40, 1));
        tree.set_label(&class, SymbolName::new("Widget"));
        tree.insert(ScopeKind::Function, loc(10, 3, 20, 3));

        let probe = loc(15, 5, 15, 12);
        let found = tree.enclosing_class(&probe).unwrap();
        assert_eq!(found.label.as_ref().unwrap().as_str(), "Widget");
        assert!(tree.enclosing_class(&loc(60, 1, 60, 4)).is_none());
    }

    #[test]
    fn test_hoisting_moves_block_functions_up() {
        let mut tree = ScopeTree::new(loc(1, 1, 100, 1));
        let func = tree.insert(ScopeKind::Function, loc(10, 1, 50, 1));
        let block = tree.insert(ScopeKind::Block, loc(20, 1, 30, 1));

        let decl_loc = loc(21, 3, 23, 3);
        let id = sym("helper", &decl_loc);
        tree.declare(&block, SymbolName::new("helper"), id.clone(), decl_loc, true);

        let non_hoisted_loc = loc(22, 3, 22, 20);
        let let_id = sym("x", &non_hoisted_loc);
        tree.declare(
            &block,
            SymbolName::new("x"),
            let_id.clone(),
            non_hoisted_loc,
            false,
        );

        tree.hoist_declarations();

        let func_scope = tree.get(&func).unwrap();
        assert_eq!(func_scope.declarations.get(&SymbolName::new("helper")), Some(&id));
        let block_scope = tree.get(&block).unwrap();
        assert!(!block_scope.declarations.contains_key(&SymbolName::new("helper")));
        assert_eq!(block_scope.declarations.get(&SymbolName::new("x")), Some(&let_id));
    }
}
