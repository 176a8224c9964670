//! Name resolution over the scope tree.
//!
//! Resolution order, hoisting, and visibility defaults differ per language;
//! the differences live in a [`ScopeConfig`] table instead of per-language
//! resolver types, so the walk itself is shared.

use super::{Scope, ScopeKind, ScopeTree};
use crate::parsing::Language;
use crate::types::{Location, SymbolId, SymbolName};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How the resolver walks outward from the use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOrder {
    /// local -> parent -> global. JavaScript and TypeScript.
    Lexical,
    /// Local, Enclosing (skipping class bodies), Global, Builtin. Python.
    Legb,
    /// Explicit module paths; lexical walk stops at the module scope. Rust.
    ModulePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

/// Per-language scoping rules.
#[derive(Debug, Clone, Copy)]
pub struct ScopeConfig {
    pub search_order: SearchOrder,
    pub hoist_functions: bool,
    pub hoist_variables: bool,
    pub hoist_classes: bool,
    pub requires_decl_before_use: bool,
    pub case_sensitive: bool,
    pub default_visibility: Visibility,
}

impl ScopeConfig {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::JavaScript => Self {
                search_order: SearchOrder::Lexical,
                hoist_functions: true,
                hoist_variables: false,
                hoist_classes: false,
                requires_decl_before_use: false,
                case_sensitive: true,
                default_visibility: Visibility::Public,
            },
            Language::TypeScript => Self {
                search_order: SearchOrder::Lexical,
                hoist_functions: true,
                hoist_variables: false,
                hoist_classes: false,
                requires_decl_before_use: false,
                case_sensitive: true,
                default_visibility: Visibility::Public,
            },
            Language::Python => Self {
                search_order: SearchOrder::Legb,
                hoist_functions: false,
                hoist_variables: false,
                hoist_classes: false,
                requires_decl_before_use: true,
                case_sensitive: true,
                default_visibility: Visibility::Public,
            },
            Language::Rust => Self {
                search_order: SearchOrder::ModulePath,
                hoist_functions: false,
                hoist_variables: false,
                hoist_classes: false,
                requires_decl_before_use: true,
                case_sensitive: true,
                default_visibility: Visibility::Private,
            },
        }
    }
}

/// Outcome of resolving one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedName {
    Definition(SymbolId),
    Builtin,
    Unresolved,
}

/// Python builtins the resolver recognizes without a declaration.
const PYTHON_BUILTINS: &[&str] = &[
    "print", "len", "range", "str", "int", "float", "bool", "list", "dict", "set", "tuple",
    "type", "isinstance", "issubclass", "super", "object", "enumerate", "zip", "map", "filter",
    "sorted", "reversed", "sum", "min", "max", "abs", "round", "open", "input", "repr", "hash",
    "id", "iter", "next", "getattr", "setattr", "hasattr", "delattr", "callable", "vars",
    "globals", "locals", "staticmethod", "classmethod", "property", "Exception", "ValueError",
    "TypeError", "KeyError", "IndexError", "RuntimeError", "StopIteration", "NotImplementedError",
    "None", "True", "False",
];

/// Host globals JavaScript and TypeScript code can use undeclared.
const JS_GLOBALS: &[&str] = &[
    "console", "Math", "JSON", "Object", "Array", "String", "Number", "Boolean", "Promise",
    "Map", "Set", "WeakMap", "WeakSet", "Symbol", "Error", "TypeError", "RangeError", "RegExp",
    "Date", "parseInt", "parseFloat", "isNaN", "isFinite", "setTimeout", "setInterval",
    "clearTimeout", "clearInterval", "fetch", "window", "document", "globalThis", "undefined",
    "NaN", "Infinity", "require", "module", "exports", "process",
];

/// Rust prelude names usable without a `use`.
const RUST_PRELUDE: &[&str] = &[
    "Some", "None", "Ok", "Err", "Option", "Result", "String", "Vec", "Box", "Rc", "Arc",
    "Cow", "Clone", "Copy", "Debug", "Default", "Drop", "Eq", "PartialEq", "Ord", "PartialOrd",
    "Hash", "Iterator", "IntoIterator", "From", "Into", "TryFrom", "TryInto", "AsRef", "AsMut",
    "ToString", "Send", "Sync", "Sized", "Fn", "FnMut", "FnOnce", "drop", "println", "eprintln",
    "format", "vec", "panic", "assert", "assert_eq", "assert_ne", "todo", "unimplemented",
];

/// The precomputed builtin/global set for a language.
pub fn builtins(language: Language) -> &'static [&'static str] {
    match language {
        Language::Python => PYTHON_BUILTINS,
        Language::JavaScript | Language::TypeScript => JS_GLOBALS,
        Language::Rust => RUST_PRELUDE,
    }
}

/// Resolves names against a finished scope tree.
pub struct SymbolResolver<'a> {
    tree: &'a ScopeTree,
    config: ScopeConfig,
    builtin_set: HashSet<&'static str>,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(tree: &'a ScopeTree, language: Language) -> Self {
        Self {
            tree,
            config: ScopeConfig::for_language(language),
            builtin_set: builtins(language).iter().copied().collect(),
        }
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Resolve `name` as seen from `at`. Finds the innermost scope containing
    /// the location and searches outward per the language's order; the first
    /// match wins. Builtins are consulted last.
    pub fn resolve(&self, name: &SymbolName, at: &Location) -> ResolvedName {
        let chain = self.tree.chain_at(at);

        for (depth, scope) in chain.iter().enumerate() {
            if !self.scope_participates(scope, depth) {
                continue;
            }
            if let Some(id) = self.lookup_in(scope, name, at, depth == 0) {
                return ResolvedName::Definition(id);
            }
        }

        if self.builtin_set.contains(name.as_str()) {
            return ResolvedName::Builtin;
        }

        ResolvedName::Unresolved
    }

    /// LEGB: a class body is not an enclosing scope for the functions nested
    /// in it. The class scope still participates when the use site is
    /// directly inside it (depth 0).
    fn scope_participates(&self, scope: &Scope, depth: usize) -> bool {
        match self.config.search_order {
            SearchOrder::Legb => depth == 0 || scope.kind != ScopeKind::Class,
            SearchOrder::Lexical | SearchOrder::ModulePath => true,
        }
    }

    fn lookup_in(
        &self,
        scope: &Scope,
        name: &SymbolName,
        at: &Location,
        innermost: bool,
    ) -> Option<SymbolId> {
        let symbol_id = scope.declarations.get(name)?;

        // Declaration-before-use is enforced only in the scope the use site
        // actually sits in; later-file definitions in outer scopes stay
        // visible (a Python function body runs after the module loads).
        if self.config.requires_decl_before_use
            && innermost
            && let Some(meta) = scope.decl_meta.get(name)
            && !meta.hoistable
            && meta.location.file_path == at.file_path
            && (meta.location.start_line > at.start_line
                || (meta.location.start_line == at.start_line
                    && meta.location.start_column > at.start_column))
        {
            return None;
        }

        Some(symbol_id.clone())
    }
}
