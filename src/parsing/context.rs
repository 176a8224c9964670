//! Per-file processing context handed to capture handlers.
//!
//! Handlers never walk up the syntax tree to find where they are; the
//! context answers "which scope am I in" and "which class encloses this
//! location" from the scope tree built in the scope phase.

use super::capture::{node_location, node_text};
use crate::parsing::Language;
use crate::scope::ScopeTree;
use crate::types::{FilePath, Location, ScopeId, SymbolName};
use tree_sitter::Node;

pub struct ProcessingContext<'s> {
    file_path: FilePath,
    language: Language,
    source: &'s str,
    scopes: ScopeTree,
}

impl<'s> ProcessingContext<'s> {
    pub fn new(
        file_path: FilePath,
        language: Language,
        source: &'s str,
        scopes: ScopeTree,
    ) -> Self {
        Self {
            file_path,
            language,
            source,
            scopes,
        }
    }

    pub fn file_path(&self) -> &FilePath {
        &self.file_path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Replace the scope snapshot once the scope phase has run.
    pub fn set_scopes(&mut self, scopes: ScopeTree) {
        self.scopes = scopes;
    }

    pub fn root_scope_id(&self) -> &ScopeId {
        self.scopes.root_id()
    }

    /// The innermost scope containing a location.
    pub fn get_scope_id(&self, location: &Location) -> ScopeId {
        self.scopes.scope_at(location).clone()
    }

    /// The scope a definition spanning `location` is declared in: the
    /// innermost containing scope that is not the definition's own.
    pub fn declaring_scope_id(&self, location: &Location) -> ScopeId {
        for scope in self.scopes.chain_at(location) {
            if scope.range == *location {
                continue;
            }
            return scope.id.clone();
        }
        self.scopes.root_id().clone()
    }

    /// Name and range of the innermost labeled class scope containing
    /// `location`, when there is one.
    pub fn enclosing_class(&self, location: &Location) -> Option<(&SymbolName, &Location)> {
        let scope = self.scopes.enclosing_class(location)?;
        scope.label.as_ref().map(|name| (name, &scope.range))
    }

    /// Whether a definition spanning `location` sits directly in a class
    /// body. Skips the definition's own scope (same range), then checks the
    /// first real ancestor. Distinguishes methods from functions for
    /// grammars where both match the same node type.
    pub fn directly_in_class_body(&self, location: &Location) -> bool {
        for scope in self.scopes.chain_at(location) {
            if scope.range == *location {
                continue;
            }
            return scope.kind == crate::scope::ScopeKind::Class;
        }
        false
    }

    pub fn text(&self, node: Node<'_>) -> &'s str {
        node_text(node, self.source)
    }

    pub fn location(&self, node: Node<'_>) -> Location {
        node_location(node, &self.file_path)
    }
}
