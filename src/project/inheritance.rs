//! Inheritance and override detection.
//!
//! Walks class hierarchies and trait-implementation edges across the
//! project's per-file indices and produces override edges. JS/TS compare
//! instance methods over `extends` (statics excluded, `implements` makes
//! interface edges only); Python walks bases left to right and skips magic
//! methods other than `__init__`; Rust `impl Trait for T` methods are
//! explicit overrides of the trait's methods.

use crate::model::{ClassDef, InterfaceDef, MethodDef, SingleFileIndex};
use crate::parsing::Language;
use crate::types::{FilePath, SymbolId, SymbolName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEdge {
    pub method: SymbolId,
    pub base_method: SymbolId,
    /// Root-first chain ending in `method`.
    pub override_chain: Vec<SymbolId>,
    /// Rust trait impls are explicit; `extends` shadowing is not.
    pub is_explicit: bool,
}

/// Computed override relations with lookup maps.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideIndex {
    pub edges: Vec<OverrideEdge>,
    by_method: HashMap<SymbolId, usize>,
    overriding: HashMap<SymbolId, Vec<SymbolId>>,
}

impl OverrideIndex {
    /// Methods that override `base_method`, directly or transitively.
    pub fn find_overriding_methods(&self, base_method: &SymbolId) -> Vec<&SymbolId> {
        self.overriding
            .get(base_method)
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    /// The nearest base method `method` overrides.
    pub fn find_overridden_method(&self, method: &SymbolId) -> Option<&SymbolId> {
        self.by_method
            .get(method)
            .map(|&idx| &self.edges[idx].base_method)
    }

    /// Root-first chain for `method`: for `A.m <- B.m <- C.m`,
    /// `get_override_chain(C.m)` is `[A.m, B.m, C.m]`.
    pub fn get_override_chain(&self, method: &SymbolId) -> Vec<SymbolId> {
        match self.by_method.get(method) {
            Some(&idx) => self.edges[idx].override_chain.clone(),
            None => vec![method.clone()],
        }
    }
}

pub struct OverrideDetector<'a> {
    files: &'a IndexMap<FilePath, SingleFileIndex>,
}

impl<'a> OverrideDetector<'a> {
    pub fn new(files: &'a IndexMap<FilePath, SingleFileIndex>) -> Self {
        Self { files }
    }

    pub fn detect(&self) -> OverrideIndex {
        let mut index = OverrideIndex::default();

        for (file_path, file) in self.files {
            match file.language {
                Language::JavaScript | Language::TypeScript | Language::Python => {
                    for class in file.classes.values() {
                        self.detect_extends_overrides(file_path, file, class, &mut index);
                    }
                }
                Language::Rust => {
                    self.detect_trait_overrides(file, &mut index);
                }
            }
        }

        for (idx, edge) in index.edges.iter().enumerate() {
            index.by_method.insert(edge.method.clone(), idx);
        }
        let pairs: Vec<(SymbolId, SymbolId)> = index
            .edges
            .iter()
            .flat_map(|e| {
                // `method` overrides every earlier link in its chain.
                e.override_chain
                    .iter()
                    .filter(|id| *id != &e.method)
                    .map(|base| (base.clone(), e.method.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (base, overriding) in pairs {
            index.overriding.entry(base).or_default().push(overriding);
        }

        index
    }

    fn detect_extends_overrides(
        &self,
        file_path: &FilePath,
        file: &SingleFileIndex,
        class: &ClassDef,
        out: &mut OverrideIndex,
    ) {
        let skip_magic = file.language == Language::Python;

        for method in &class.methods {
            if method.is_static {
                continue;
            }
            if skip_magic
                && method.name.as_str().starts_with("__")
                && method.name.as_str().ends_with("__")
                && method.name.as_str() != "__init__"
            {
                continue;
            }

            // Collect same-name instance methods up the chain, nearest
            // base first.
            let mut chain_methods: Vec<SymbolId> = Vec::new();
            let mut visited: Vec<SymbolName> = vec![class.name.clone()];
            self.walk_bases(
                file_path,
                file,
                &class.extends,
                &method.name,
                &mut chain_methods,
                &mut visited,
                0,
            );

            if chain_methods.is_empty() {
                continue;
            }

            // Root-first chain: furthest ancestor down to this method.
            let mut override_chain: Vec<SymbolId> =
                chain_methods.iter().rev().cloned().collect();
            override_chain.push(method.symbol_id.clone());

            out.edges.push(OverrideEdge {
                method: method.symbol_id.clone(),
                base_method: chain_methods[0].clone(),
                override_chain,
                is_explicit: false,
            });
        }
    }

    /// Left-to-right, depth-first walk of `extends`, collecting same-name
    /// instance methods nearest-first.
    #[allow(clippy::too_many_arguments)]
    fn walk_bases(
        &self,
        file_path: &FilePath,
        file: &SingleFileIndex,
        bases: &[SymbolName],
        method_name: &SymbolName,
        found: &mut Vec<SymbolId>,
        visited: &mut Vec<SymbolName>,
        depth: usize,
    ) {
        if depth > 32 {
            return;
        }
        for base_name in bases {
            if visited.contains(base_name) {
                continue;
            }
            visited.push(base_name.clone());
            let Some((base_file_path, base_file, base)) =
                self.resolve_class(file_path, file, base_name)
            else {
                continue;
            };
            if let Some(base_method) = base
                .methods
                .iter()
                .find(|m| &m.name == method_name && !m.is_static)
            {
                found.push(base_method.symbol_id.clone());
            }
            let bases = base.extends.clone();
            self.walk_bases(
                base_file_path,
                base_file,
                &bases,
                method_name,
                found,
                visited,
                depth + 1,
            );
        }
    }

    fn detect_trait_overrides(&self, file: &SingleFileIndex, out: &mut OverrideIndex) {
        for edge in &file.trait_impls {
            let Some(class) = self.class_anywhere(file, &edge.type_name) else {
                continue;
            };
            let Some(trait_def) = self.interface_anywhere(file, &edge.trait_name) else {
                continue;
            };

            for method in &class.methods {
                let Some(trait_method) = trait_def.find_method(&method.name) else {
                    continue;
                };
                out.edges.push(OverrideEdge {
                    method: method.symbol_id.clone(),
                    base_method: trait_method.symbol_id.clone(),
                    override_chain: vec![
                        trait_method.symbol_id.clone(),
                        method.symbol_id.clone(),
                    ],
                    is_explicit: true,
                });
            }
        }
    }

    /// Same file first, then first match across the project.
    fn resolve_class<'b>(
        &self,
        file_path: &'b FilePath,
        file: &'b SingleFileIndex,
        name: &SymbolName,
    ) -> Option<(&'b FilePath, &'b SingleFileIndex, &'b ClassDef)>
    where
        'a: 'b,
    {
        if let Some(class) = file.class_by_name(name) {
            return Some((file_path, file, class));
        }
        for (other_path, other) in self.files {
            if let Some(class) = other.class_by_name(name) {
                return Some((other_path, other, class));
            }
        }
        None
    }

    fn class_anywhere<'b>(&self, prefer: &'b SingleFileIndex, name: &SymbolName) -> Option<&'b ClassDef>
    where
        'a: 'b,
    {
        if let Some(class) = prefer.class_by_name(name) {
            return Some(class);
        }
        self.files.values().find_map(move |f| f.class_by_name(name))
    }

    fn interface_anywhere<'b>(
        &self,
        prefer: &'b SingleFileIndex,
        name: &SymbolName,
    ) -> Option<&'b InterfaceDef>
    where
        'a: 'b,
    {
        if let Some(interface) = prefer.interface_by_name(name) {
            return Some(interface);
        }
        self.files.values().find_map(move |f| f.interface_by_name(name))
    }
}

/// Convenience for tests and small tools: all methods named `name` in a
/// class, instance first.
pub fn method_named<'c>(class: &'c ClassDef, name: &str) -> Option<&'c MethodDef> {
    class.methods.iter().find(|m| m.name.as_str() == name)
}
