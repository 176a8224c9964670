//! Definition records and reference records.
//!
//! Definitions are modeled as an owned tree: a class record owns its methods
//! and properties, methods own their parameters. Cross-file links always go
//! through [`SymbolId`] keys, never pointers, so records stay serializable
//! and a file's index can be swapped out atomically.

mod index;

pub use index::{
    LocalTypeTracking, SingleFileIndex, TypeAnnotation, TypeAssignment, TypeDeclaration,
    UnresolvedReference,
};

use crate::types::{Location, ModulePath, ScopeId, SymbolId, SymbolName};
use serde::{Deserialize, Serialize};

/// Export status of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExportInfo {
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_reexport: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_name: Option<SymbolName>,
}

impl ExportInfo {
    pub fn private() -> Self {
        Self::default()
    }

    pub fn exported() -> Self {
        Self {
            is_exported: true,
            ..Self::default()
        }
    }

    pub fn default_export() -> Self {
        Self {
            is_exported: true,
            is_default: true,
            ..Self::default()
        }
    }

    pub fn renamed(alias: SymbolName) -> Self {
        Self {
            is_exported: true,
            export_name: Some(alias),
            ..Self::default()
        }
    }
}

/// A class (or struct) definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub scope_id: ScopeId,
    pub extends: Vec<SymbolName>,
    pub methods: Vec<MethodDef>,
    pub properties: Vec<PropertyDef>,
    pub constructors: Vec<MethodDef>,
    pub export: ExportInfo,
}

impl ClassDef {
    pub fn find_method(&self, name: &SymbolName) -> Option<&MethodDef> {
        self.methods.iter().find(|m| &m.name == name)
    }
}

/// An interface (TypeScript) or trait (Rust) definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub scope_id: ScopeId,
    pub extends: Vec<SymbolName>,
    pub methods: Vec<MethodDef>,
    pub properties: Vec<PropertyDef>,
    pub export: ExportInfo,
}

impl InterfaceDef {
    pub fn find_method(&self, name: &SymbolName) -> Option<&MethodDef> {
        self.methods.iter().find(|m| &m.name == name)
    }
}

/// A free function. Anonymous callables carry `name: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub symbol_id: SymbolId,
    pub name: Option<SymbolName>,
    pub location: Location,
    pub scope_id: ScopeId,
    pub signature: Signature,
    pub is_async: bool,
    pub export: ExportInfo,
    /// Set when the function is passed directly as an argument to a call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<CallbackContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Signature {
    pub parameters: Vec<ParameterDef>,
    pub return_type: Option<SymbolName>,
}

/// A method owned by a class, interface, or trait record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub parameters: Vec<ParameterDef>,
    pub return_type: Option<SymbolName>,
    pub is_static: bool,
    pub is_async: bool,
}

/// A property or field owned by a class or interface record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub type_annotation: Option<SymbolName>,
    pub is_static: bool,
}

/// A variable binding at any scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub scope_id: ScopeId,
    pub type_annotation: Option<SymbolName>,
    pub initializer: Option<String>,
    pub export: ExportInfo,
    /// For import-binding variables, the module they came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_path: Option<ModulePath>,
    /// Set when the initializer is a collection literal storing function
    /// references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<FunctionCollection>,
}

/// A parameter owned by its callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub type_annotation: Option<SymbolName>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub members: Vec<EnumMember>,
    pub export: ExportInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: SymbolName,
    pub value: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAliasDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub aliased: String,
    pub export: ExportInfo,
}

/// How an import binds names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Named,
    Namespace,
}

/// An import record. For aliased imports (`import X as Y`) the record sits
/// at the alias node's location and carries the alias as `name`, so scope
/// lookups of the alias land here; `original_name` preserves the source name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDef {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub import_path: ModulePath,
    pub import_kind: ImportKind,
    pub original_name: Option<SymbolName>,
    pub export: ExportInfo,
}

/// The kinds of use-sites the indexer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Call,
    Variable,
    Type,
    SelfReferenceCall,
    Constructor,
}

/// The self-reference keyword a receiver used, when it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfKeyword {
    This,
    SelfKw,
    Super,
    Cls,
}

impl SelfKeyword {
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "this" => Some(Self::This),
            "self" => Some(Self::SelfKw),
            "super" => Some(Self::Super),
            "cls" => Some(Self::Cls),
            _ => None,
        }
    }
}

/// Receiver details for method calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverInfo {
    pub receiver_location: Location,
    /// Identifier chain left of the method name: `a.b.c()` yields `["a","b"]`.
    pub property_chain: Vec<SymbolName>,
    pub is_self_reference: bool,
    pub self_keyword: Option<SelfKeyword>,
}

/// A use-site of a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub location: Location,
    pub name: SymbolName,
    pub resolved_symbol_id: Option<SymbolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<ReceiverInfo>,
}

/// What kind of literal a function collection was stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    Array,
    Object,
    Map,
}

/// A collection literal populated with identifier references, recorded so
/// "function stored in a collection" still shows up in the call graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCollection {
    pub collection_type: CollectionType,
    pub stored_references: Vec<SymbolName>,
}

/// Context for a function passed as a call argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackContext {
    pub outer_call: Option<SymbolName>,
}

/// A `impl Trait for Type` edge recorded during Rust indexing, consumed by
/// override detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitImplEdge {
    pub type_name: SymbolName,
    pub trait_name: SymbolName,
    pub location: Location,
}

/// What a re-export statement forwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReexportNames {
    /// `export * from 'mod'`
    All,
    /// `export { a, b as c } from 'mod'` — pairs of (source name, alias).
    Named(Vec<(SymbolName, Option<SymbolName>)>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReexportRecord {
    pub source: ModulePath,
    pub names: ReexportNames,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilePath;

    fn loc(line: u32) -> Location {
        Location::new(FilePath::new("test.ts"), line, 1, line, 20)
    }

    #[test]
    fn test_export_info_constructors() {
        assert!(!ExportInfo::private().is_exported);
        assert!(ExportInfo::exported().is_exported);
        assert!(ExportInfo::default_export().is_default);

        let renamed = ExportInfo::renamed(SymbolName::new("b"));
        assert_eq!(renamed.export_name.as_ref().unwrap().as_str(), "b");
    }

    #[test]
    fn test_class_find_method() {
        let location = loc(1);
        let method = MethodDef {
            symbol_id: SymbolId::for_definition(
                crate::types::DefKind::Method,
                &loc(2),
                Some(&SymbolName::new("speak")),
            ),
            name: SymbolName::new("speak"),
            location: loc(2),
            parameters: vec![],
            return_type: None,
            is_static: false,
            is_async: false,
        };
        let class = ClassDef {
            symbol_id: SymbolId::for_definition(
                crate::types::DefKind::Class,
                &location,
                Some(&SymbolName::new("Animal")),
            ),
            name: SymbolName::new("Animal"),
            location,
            scope_id: ScopeId::new("scope.module:test.ts:1:1:10:1"),
            extends: vec![],
            methods: vec![method],
            properties: vec![],
            constructors: vec![],
            export: ExportInfo::private(),
        };
        assert!(class.find_method(&SymbolName::new("speak")).is_some());
        assert!(class.find_method(&SymbolName::new("bark")).is_none());
    }

    #[test]
    fn test_self_keyword_from_text() {
        assert_eq!(SelfKeyword::from_text("this"), Some(SelfKeyword::This));
        assert_eq!(SelfKeyword::from_text("cls"), Some(SelfKeyword::Cls));
        assert_eq!(SelfKeyword::from_text("that"), None);
    }
}
