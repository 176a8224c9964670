//! Project-wide aggregation.
//!
//! The project index owns the per-file indices and is the only mutable
//! aggregate. `update_file` swaps a file's index in atomically — the new
//! record is fully finalized before the old one is replaced — and
//! invalidates everything derived: the exported-symbol view, the type
//! registry, override edges, and resolved references. Derived artifacts
//! are rebuilt on the next `resolve_project`, so results never depend on
//! file processing order.

pub mod file_tree;
pub mod inheritance;
pub mod module_resolver;
pub mod references;
pub mod type_tracker;

pub use file_tree::{FileTree, MemoryFileTree, OsFileTree};
pub use inheritance::{OverrideDetector, OverrideEdge, OverrideIndex};
pub use module_resolver::resolve_module_path;
pub use references::{CrossFileResolver, ResolutionOutcome};
pub use type_tracker::{FlowKind, TypeFlowEdge, TypeResolution, TypeTracker};

use crate::config::Settings;
use crate::error::IndexResult;
use crate::model::{Reference, SingleFileIndex};
use crate::parsing::FileIndexer;
use crate::types::{FilePath, SymbolId, SymbolName};
use indexmap::IndexMap;
use tracing::info;

pub struct ProjectIndex {
    indexer: FileIndexer,
    files: IndexMap<FilePath, SingleFileIndex>,

    // Derived state, valid only when `resolved` is true.
    resolved: bool,
    outcome: ResolutionOutcome,
    types: TypeResolution,
    overrides: OverrideIndex,
}

impl ProjectIndex {
    pub fn new(settings: Settings) -> IndexResult<Self> {
        Ok(Self {
            indexer: FileIndexer::new(settings)?,
            files: IndexMap::new(),
            resolved: false,
            outcome: ResolutionOutcome::default(),
            types: TypeResolution::default(),
            overrides: OverrideIndex::default(),
        })
    }

    /// Index (or re-index) one file and swap its record in. On error the
    /// previous record, if any, stays untouched.
    pub fn update_file(&mut self, path: &FilePath, source: &str) -> IndexResult<()> {
        let index = self.indexer.index_file(path, source)?;
        self.files.insert(path.clone(), index);
        self.invalidate();
        Ok(())
    }

    pub fn remove_file(&mut self, path: &FilePath) -> bool {
        let removed = self.files.shift_remove(path).is_some();
        if removed {
            self.invalidate();
        }
        removed
    }

    fn invalidate(&mut self) {
        self.resolved = false;
        self.outcome = ResolutionOutcome::default();
        self.types = TypeResolution::default();
        self.overrides = OverrideIndex::default();
    }

    pub fn file(&self, path: &FilePath) -> Option<&SingleFileIndex> {
        self.files.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = (&FilePath, &SingleFileIndex)> {
        self.files.iter()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Run the cross-file phases: type tracking, override detection, then
    /// reference resolution through imports and inheritance.
    pub fn resolve_project(&mut self, tree: &dyn FileTree) {
        let max_depth = self.indexer.settings().resolution.max_reexport_depth;

        self.types = TypeTracker::new(&self.files).resolve();
        self.overrides = OverrideDetector::new(&self.files).detect();
        self.outcome =
            CrossFileResolver::new(&self.files, tree, &self.types, max_depth).resolve();
        self.resolved = true;

        info!(
            "project resolution: {} resolved, {} external across {} files",
            self.outcome.resolved_count,
            self.outcome.external_count,
            self.files.len()
        );
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn types(&self) -> &TypeResolution {
        &self.types
    }

    pub fn overrides(&self) -> &OverrideIndex {
        &self.overrides
    }

    pub fn outcome(&self) -> &ResolutionOutcome {
        &self.outcome
    }

    /// Resolved references for one file, after `resolve_project`.
    pub fn resolved_references(&self, path: &FilePath) -> Option<&[Reference]> {
        self.outcome.references.get(path).map(|v| v.as_slice())
    }

    /// Project-wide name lookup over exported symbols, then private
    /// definitions.
    pub fn find_definition(&self, name: &SymbolName) -> Vec<(&FilePath, &SymbolId)> {
        let mut out = Vec::new();
        for (path, index) in &self.files {
            if let Some(id) = index.find_exported(name) {
                out.push((path, id));
            }
        }
        if out.is_empty() {
            for (path, index) in &self.files {
                if let Some(class) = index.class_by_name(name) {
                    out.push((path, &class.symbol_id));
                } else if let Some(interface) = index.interface_by_name(name) {
                    out.push((path, &interface.symbol_id));
                }
            }
        }
        out
    }

    /// All resolved references that point at `target`.
    pub fn callers_of(&self, target: &SymbolId) -> Vec<(&FilePath, &Reference)> {
        let mut out = Vec::new();
        for (path, references) in &self.outcome.references {
            for reference in references {
                if reference.resolved_symbol_id.as_ref() == Some(target) {
                    out.push((path, reference));
                }
            }
        }
        out
    }

    /// Resolved outgoing calls from within a definition's range.
    pub fn calls_from(&self, path: &FilePath, symbol: &SymbolId) -> Vec<&Reference> {
        let Some(index) = self.files.get(path) else {
            return Vec::new();
        };
        let range = index
            .functions
            .get(symbol)
            .map(|f| f.location.clone())
            .or_else(|| {
                index.classes.values().find_map(|c| {
                    c.methods
                        .iter()
                        .find(|m| &m.symbol_id == symbol)
                        .map(|m| m.location.clone())
                })
            });
        let Some(range) = range else {
            return Vec::new();
        };

        self.outcome
            .references
            .get(path)
            .map(|references| {
                references
                    .iter()
                    .filter(|r| {
                        r.resolved_symbol_id.is_some()
                            && range.contains(&r.location)
                            && matches!(
                                r.kind,
                                crate::model::ReferenceKind::Call
                                    | crate::model::ReferenceKind::SelfReferenceCall
                                    | crate::model::ReferenceKind::Constructor
                            )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;

    fn project() -> ProjectIndex {
        ProjectIndex::new(Settings::default()).unwrap()
    }

    #[test]
    fn test_update_file_swaps_atomically() {
        let mut project = project();
        let path = FilePath::new("a.py");
        project.update_file(&path, "def one():\n    pass\n").unwrap();
        assert_eq!(project.file(&path).unwrap().functions.len(), 1);

        // An oversized update fails; the previous index must survive.
        let huge = "x = 1\n".repeat(10_000);
        let err = project.update_file(&path, &huge);
        assert!(matches!(err, Err(IndexError::FileTooLarge { .. })));
        assert_eq!(project.file(&path).unwrap().functions.len(), 1);
    }

    #[test]
    fn test_update_invalidates_derived_state() {
        let mut project = project();
        let path = FilePath::new("a.py");
        project.update_file(&path, "def one():\n    pass\n").unwrap();

        let tree = MemoryFileTree::from_paths(["a.py"]);
        project.resolve_project(&tree);
        assert!(project.is_resolved());

        project.update_file(&path, "def two():\n    pass\n").unwrap();
        assert!(!project.is_resolved());
    }

    #[test]
    fn test_find_definition_prefers_exports() {
        let mut project = project();
        project
            .update_file(&FilePath::new("m.py"), "def shared():\n    pass\n")
            .unwrap();
        let found = project.find_definition(&SymbolName::new("shared"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.as_str(), "m.py");
    }
}
