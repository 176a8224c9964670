//! The immutable per-file index record.

use super::{
    ClassDef, EnumDef, FunctionDef, ImportDef, InterfaceDef, Reference, ReferenceKind,
    ReexportRecord, TraitImplEdge, TypeAliasDef, VariableDef,
};
use crate::error::Diagnostic;
use crate::parsing::Language;
use crate::scope::ScopeTree;
use crate::types::{FilePath, Location, LocationKey, ScopeId, SymbolId, SymbolName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A reference the intra-file resolver could not bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub name: SymbolName,
    pub location: Location,
    pub scope_id: ScopeId,
    pub kind: ReferenceKind,
}

/// An explicit type annotation collected for the type tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    pub name: SymbolName,
    pub annotation: String,
    pub location: Location,
}

/// A variable declaration, with its initializer text when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: SymbolName,
    pub initializer: Option<String>,
    pub location: Location,
}

/// A later assignment to an already-declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAssignment {
    pub name: SymbolName,
    pub value: String,
    pub location: Location,
}

/// Raw per-file material for the two-phase type tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalTypeTracking {
    pub annotations: Vec<TypeAnnotation>,
    pub declarations: Vec<TypeDeclaration>,
    pub assignments: Vec<TypeAssignment>,
}

/// The semantic index of one source file.
///
/// Created by the single-file indexer from a parsed tree; immutable
/// afterward. The project index owns the collection of these and swaps
/// whole records on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleFileIndex {
    pub file_path: FilePath,
    pub language: Language,

    pub classes: IndexMap<SymbolId, ClassDef>,
    pub interfaces: IndexMap<SymbolId, InterfaceDef>,
    pub functions: IndexMap<SymbolId, FunctionDef>,
    pub variables: IndexMap<SymbolId, VariableDef>,
    pub enums: IndexMap<SymbolId, EnumDef>,
    pub type_aliases: IndexMap<SymbolId, TypeAliasDef>,
    pub imports: IndexMap<SymbolId, ImportDef>,

    pub references: Vec<Reference>,
    pub scopes: ScopeTree,
    pub unresolved_references: Vec<UnresolvedReference>,

    /// Tracked type names keyed by the location of the annotated binding.
    pub type_bindings: IndexMap<LocationKey, SymbolName>,
    /// Raw material for the cross-file type tracker.
    pub type_tracking: LocalTypeTracking,

    /// Export cache: exported name (alias when renamed) to the definition
    /// behind it. Built once during finalization.
    pub exported_names: IndexMap<SymbolName, SymbolId>,
    pub reexports: Vec<ReexportRecord>,
    pub trait_impls: Vec<TraitImplEdge>,

    pub diagnostics: Vec<Diagnostic>,
}

impl SingleFileIndex {
    /// Look up an exported definition by its public name.
    pub fn find_exported(&self, name: &SymbolName) -> Option<&SymbolId> {
        self.exported_names.get(name)
    }

    /// Find a class by source name.
    pub fn class_by_name(&self, name: &SymbolName) -> Option<&ClassDef> {
        self.classes.values().find(|c| &c.name == name)
    }

    /// Find an interface/trait by source name.
    pub fn interface_by_name(&self, name: &SymbolName) -> Option<&InterfaceDef> {
        self.interfaces.values().find(|i| &i.name == name)
    }

    /// Find an import record by bound name (the alias, when aliased).
    pub fn import_by_name(&self, name: &SymbolName) -> Option<&ImportDef> {
        self.imports.values().find(|i| &i.name == name)
    }

    /// All top-level definition ids with their display names, in insertion
    /// order. Methods, properties, and parameters stay inside their owners.
    pub fn document_symbols(&self) -> Vec<(&SymbolId, Option<&SymbolName>)> {
        let mut out: Vec<(&SymbolId, Option<&SymbolName>)> = Vec::new();
        out.extend(self.classes.iter().map(|(id, d)| (id, Some(&d.name))));
        out.extend(self.interfaces.iter().map(|(id, d)| (id, Some(&d.name))));
        out.extend(self.functions.iter().map(|(id, d)| (id, d.name.as_ref())));
        out.extend(self.variables.iter().map(|(id, d)| (id, Some(&d.name))));
        out.extend(self.enums.iter().map(|(id, d)| (id, Some(&d.name))));
        out.extend(self.type_aliases.iter().map(|(id, d)| (id, Some(&d.name))));
        out.extend(self.imports.iter().map(|(id, d)| (id, Some(&d.name))));
        out
    }

    /// Total number of definitions of every kind, nested members included.
    pub fn definition_count(&self) -> usize {
        let nested: usize = self
            .classes
            .values()
            .map(|c| c.methods.len() + c.properties.len() + c.constructors.len())
            .sum::<usize>()
            + self
                .interfaces
                .values()
                .map(|i| i.methods.len() + i.properties.len())
                .sum::<usize>();
        self.classes.len()
            + self.interfaces.len()
            + self.functions.len()
            + self.variables.len()
            + self.enums.len()
            + self.type_aliases.len()
            + self.imports.len()
            + nested
    }
}
