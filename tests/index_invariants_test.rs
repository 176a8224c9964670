//! Structural invariants of the per-file index: identity uniqueness,
//! determinism, scope containment, and the file-size limit.

use cartograph::types::{FilePath, SymbolId};
use cartograph::{FileIndexer, IndexError, Settings};

fn indexer() -> FileIndexer {
    FileIndexer::new(Settings::default()).unwrap()
}

fn all_symbol_ids(index: &cartograph::SingleFileIndex) -> Vec<SymbolId> {
    let mut ids = Vec::new();
    for (id, class) in &index.classes {
        ids.push(id.clone());
        ids.extend(class.methods.iter().map(|m| m.symbol_id.clone()));
        ids.extend(class.properties.iter().map(|p| p.symbol_id.clone()));
        ids.extend(class.constructors.iter().map(|c| c.symbol_id.clone()));
    }
    for (id, interface) in &index.interfaces {
        ids.push(id.clone());
        ids.extend(interface.methods.iter().map(|m| m.symbol_id.clone()));
    }
    ids.extend(index.functions.keys().cloned());
    ids.extend(index.variables.keys().cloned());
    ids.extend(index.enums.keys().cloned());
    ids.extend(index.type_aliases.keys().cloned());
    ids.extend(index.imports.keys().cloned());
    ids
}

#[test]
fn symbol_ids_are_unique_within_a_file() {
    let source = "\
class Widget:
    def draw(self, size):
        pass

    def resize(self, size):
        pass

def draw():
    pass

import os
";
    let mut indexer = indexer();
    let index = indexer
        .index_file(&FilePath::new("widgets.py"), source)
        .unwrap();

    let ids = all_symbol_ids(&index);
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(ids.len(), deduped.len(), "duplicate symbol ids: {ids:?}");

    // Same-named definitions at different locations stay distinct.
    assert!(ids.iter().filter(|id| id.as_str().contains("draw")).count() >= 2);
}

#[test]
fn reindexing_is_deterministic() {
    let source = "\
export class Store {
    items = [];
    get(key) {
        return this.items[key];
    }
}
const registry = { store: Store };
";
    let mut indexer = indexer();
    let path = FilePath::new("store.js");
    let first = indexer.index_file(&path, source).unwrap();
    let second = indexer.index_file(&path, source).unwrap();
    assert_eq!(first, second);

    let json_first = serde_json::to_string(&first).unwrap();
    let json_second = serde_json::to_string(&second).unwrap();
    assert_eq!(json_first, json_second);
}

#[test]
fn scopes_nest_by_containment() {
    let source = "\
def outer():
    def inner():
        x = 1
        return x
    return inner
";
    let mut indexer = indexer();
    let index = indexer
        .index_file(&FilePath::new("nest.py"), source)
        .unwrap();

    for scope in index.scopes.iter() {
        if let Some(parent_id) = &scope.parent {
            let parent = index.scopes.get(parent_id).unwrap();
            assert!(
                parent.range.contains(&scope.range),
                "scope {} escapes its parent {}",
                scope.id,
                parent.id
            );
        }
    }
}

#[test]
fn oversized_files_are_refused_not_truncated() {
    let mut settings = Settings::default();
    settings.indexing.max_file_size = 64;
    let mut indexer = FileIndexer::new(settings).unwrap();

    let source = "def f():\n    pass\n".repeat(10);
    let err = indexer.index_file(&FilePath::new("big.py"), &source);
    match err {
        Err(IndexError::FileTooLarge { size, limit, .. }) => {
            assert_eq!(size, source.len());
            assert_eq!(limit, 64);
        }
        other => panic!("expected FileTooLarge, got {other:?}"),
    }
}

#[test]
fn syntax_errors_degrade_to_best_effort_index() {
    let source = "def good():\n    pass\n\ndef broken(:\n";
    let mut indexer = indexer();
    let index = indexer
        .index_file(&FilePath::new("broken.py"), source)
        .unwrap();

    // The valid part is still indexed and the problem is reported.
    assert!(
        index
            .functions
            .values()
            .any(|f| f.name.as_ref().map(|n| n.as_str()) == Some("good"))
    );
    assert!(
        index
            .diagnostics
            .iter()
            .any(|d| d.message.contains("syntax errors"))
    );
}

#[test]
fn anonymous_callables_get_anonymous_ids() {
    let source = "items.forEach((item) => {\n    use(item);\n});\n";
    let mut indexer = indexer();
    let index = indexer
        .index_file(&FilePath::new("cb.js"), source)
        .unwrap();

    let arrow = index
        .functions
        .values()
        .find(|f| f.name.is_none())
        .expect("arrow function indexed");
    assert!(arrow.symbol_id.as_str().starts_with("anonymous:"));
    let callback = arrow.callback_context.as_ref().expect("callback context");
    assert_eq!(callback.outer_call.as_ref().unwrap().as_str(), "forEach");
}
