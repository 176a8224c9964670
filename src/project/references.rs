//! Cross-file reference resolution.
//!
//! Links references through imports, receiver types, and inheritance to
//! concrete definitions in other files. Works over the immutable per-file
//! indices and produces fresh reference lists; nothing here mutates a
//! `SingleFileIndex`.

use super::file_tree::FileTree;
use super::module_resolver::resolve_module_path;
use super::type_tracker::TypeResolution;
use crate::error::Diagnostic;
use crate::model::{Reference, ReferenceKind, ReexportNames, SingleFileIndex};
use crate::scope::{ResolvedName, SymbolResolver};
use crate::types::{FilePath, SymbolId, SymbolName};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

/// The project-wide result of one resolution run.
#[derive(Debug, Default, Clone)]
pub struct ResolutionOutcome {
    /// Per-file reference lists with cross-file targets filled in.
    pub references: HashMap<FilePath, Vec<Reference>>,
    pub diagnostics: Vec<Diagnostic>,
    pub resolved_count: usize,
    /// References left for external/unknown targets.
    pub external_count: usize,
}

pub struct CrossFileResolver<'a> {
    files: &'a IndexMap<FilePath, SingleFileIndex>,
    tree: &'a dyn FileTree,
    types: &'a TypeResolution,
    max_reexport_depth: usize,
}

impl<'a> CrossFileResolver<'a> {
    pub fn new(
        files: &'a IndexMap<FilePath, SingleFileIndex>,
        tree: &'a dyn FileTree,
        types: &'a TypeResolution,
        max_reexport_depth: usize,
    ) -> Self {
        Self {
            files,
            tree,
            types,
            max_reexport_depth,
        }
    }

    pub fn resolve(&self) -> ResolutionOutcome {
        let mut outcome = ResolutionOutcome::default();

        for (file_path, index) in self.files {
            let mut references = index.references.clone();
            for reference in &mut references {
                self.resolve_reference(file_path, index, reference, &mut outcome.diagnostics);
                if reference.resolved_symbol_id.is_some() {
                    outcome.resolved_count += 1;
                } else {
                    outcome.external_count += 1;
                }
            }
            outcome.references.insert(file_path.clone(), references);
        }

        outcome
    }

    fn resolve_reference(
        &self,
        file_path: &FilePath,
        index: &SingleFileIndex,
        reference: &mut Reference,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        // A reference the local pass bound to an import record forwards to
        // the definition the import names, re-exports included.
        if let Some(resolved) = reference.resolved_symbol_id.clone()
            && let Some(import) = index.imports.get(&resolved)
        {
            let lookup = import
                .original_name
                .clone()
                .unwrap_or_else(|| import.name.clone());
            if let Some(target_file) = resolve_module_path(
                index.language,
                import.import_path.as_str(),
                file_path,
                self.tree,
            ) && let Some(target) =
                self.resolve_export(&target_file, &lookup, 0, diagnostics)
            {
                reference.resolved_symbol_id = Some(target);
            }
            return;
        }

        if reference.resolved_symbol_id.is_some() {
            return;
        }

        match reference.kind {
            ReferenceKind::Call if reference.receiver.is_some() => {
                self.resolve_receiver_call(file_path, index, reference, diagnostics);
            }
            ReferenceKind::SelfReferenceCall => {
                self.resolve_self_call_cross_file(file_path, index, reference);
            }
            // Plain names the local scopes could not bind are external.
            _ => {}
        }
    }

    /// Method calls on a known receiver: variable types first, then class
    /// names for static/associated calls, then namespace imports.
    fn resolve_receiver_call(
        &self,
        file_path: &FilePath,
        index: &SingleFileIndex,
        reference: &mut Reference,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(receiver) = &reference.receiver else {
            return;
        };
        let Some(head) = receiver.property_chain.first() else {
            return;
        };
        // Multi-segment chains beyond the head are not typed; stay
        // conservative and only handle single-step receivers and paths
        // ending in a type name.
        let tail = receiver.property_chain.last().unwrap_or(head);

        let resolver = SymbolResolver::new(&index.scopes, index.language);
        if let ResolvedName::Definition(id) =
            resolver.resolve(head, &receiver.receiver_location)
        {
            // Receiver is an import: `ns.helper()` / `mod::helper()`.
            if let Some(import) = index.imports.get(&id) {
                if let Some(target_file) = resolve_module_path(
                    index.language,
                    import.import_path.as_str(),
                    file_path,
                    self.tree,
                ) && let Some(target) =
                    self.resolve_export(&target_file, &reference.name, 0, diagnostics)
                {
                    reference.resolved_symbol_id = Some(target);
                }
                return;
            }

            // Receiver is a class: static call.
            if index.classes.contains_key(&id) {
                reference.resolved_symbol_id =
                    self.find_method_in_hierarchy(file_path, head, &reference.name, 0);
                return;
            }

            // Receiver is a typed variable.
            if let Some(type_id) = self.types.variable_types.get(&id) {
                let class_name = SymbolName::new(type_id.as_str());
                reference.resolved_symbol_id =
                    self.find_method_in_hierarchy(file_path, &class_name, &reference.name, 0);
                return;
            }
        }

        // Paths like `String::new()` or `pkg.Class.method()`: the last
        // chain segment names a type when it starts uppercase.
        if tail.as_str().chars().next().is_some_and(|c| c.is_uppercase()) {
            reference.resolved_symbol_id =
                self.find_method_in_hierarchy(file_path, tail, &reference.name, 0);
        }
    }

    /// Self calls whose method lives on an imported base class.
    fn resolve_self_call_cross_file(
        &self,
        file_path: &FilePath,
        index: &SingleFileIndex,
        reference: &mut Reference,
    ) {
        let Some(scope) = index.scopes.enclosing_class(&reference.location) else {
            return;
        };
        let Some(class_name) = scope.label.clone() else {
            return;
        };
        reference.resolved_symbol_id =
            self.find_method_in_hierarchy(file_path, &class_name, &reference.name, 0);
    }

    /// Look up `name` among `file`'s exports, following re-export chains up
    /// to the configured depth.
    fn resolve_export(
        &self,
        file: &FilePath,
        name: &SymbolName,
        depth: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<SymbolId> {
        if depth > self.max_reexport_depth {
            diagnostics.push(Diagnostic::warning(format!(
                "re-export chain for '{name}' exceeded depth {}; possible cycle through '{file}'",
                self.max_reexport_depth
            )));
            return None;
        }
        let index = self.files.get(file)?;

        if let Some(id) = index.exported_names.get(name) {
            // The export may itself be an import (`pub use`, `export ... from`).
            if let Some(import) = index.imports.get(id) {
                let lookup = import
                    .original_name
                    .clone()
                    .unwrap_or_else(|| import.name.clone());
                let target_file = resolve_module_path(
                    index.language,
                    import.import_path.as_str(),
                    file,
                    self.tree,
                )?;
                return self.resolve_export(&target_file, &lookup, depth + 1, diagnostics);
            }
            return Some(id.clone());
        }

        for reexport in &index.reexports {
            let forwarded = match &reexport.names {
                ReexportNames::All => Some(name.clone()),
                ReexportNames::Named(pairs) => pairs
                    .iter()
                    .find(|(source_name, alias)| alias.as_ref().unwrap_or(source_name) == name)
                    .map(|(source_name, _)| source_name.clone()),
            };
            let Some(forwarded) = forwarded else { continue };
            let Some(target_file) = resolve_module_path(
                index.language,
                reexport.source.as_str(),
                file,
                self.tree,
            ) else {
                continue;
            };
            if let Some(found) =
                self.resolve_export(&target_file, &forwarded, depth + 1, diagnostics)
            {
                return Some(found);
            }
        }

        debug!("'{name}' is not exported from '{file}'");
        None
    }

    /// Find a method on a class, walking `extends` chains; bases resolve in
    /// the class's own file first, then anywhere in the project.
    fn find_method_in_hierarchy(
        &self,
        prefer_file: &FilePath,
        class_name: &SymbolName,
        method_name: &SymbolName,
        depth: usize,
    ) -> Option<SymbolId> {
        if depth > 32 {
            return None;
        }
        let (class_file, class) = self.resolve_class(prefer_file, class_name)?;
        if let Some(method) = class.find_method(method_name) {
            return Some(method.symbol_id.clone());
        }
        for base in &class.extends {
            if let Some(found) =
                self.find_method_in_hierarchy(class_file, base, method_name, depth + 1)
            {
                return Some(found);
            }
        }
        None
    }

    fn resolve_class<'b>(
        &self,
        prefer_file: &'b FilePath,
        name: &SymbolName,
    ) -> Option<(&'b FilePath, &'b crate::model::ClassDef)>
    where
        'a: 'b,
    {
        if let Some(index) = self.files.get(prefer_file)
            && let Some(class) = index.class_by_name(name)
        {
            return Some((prefer_file, class));
        }
        for (path, index) in self.files {
            if let Some(class) = index.class_by_name(name) {
                return Some((path, class));
            }
        }
        None
    }
}
