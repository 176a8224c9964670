//! Cross-file resolution through imports, aliases, and re-export chains.

use cartograph::model::ReferenceKind;
use cartograph::project::MemoryFileTree;
use cartograph::types::{FilePath, SymbolName};
use cartograph::{ProjectIndex, Settings};

fn project() -> ProjectIndex {
    ProjectIndex::new(Settings::default()).unwrap()
}

#[test]
fn python_aliased_import_resolves_to_original_definition() {
    let mut project = project();
    let app = FilePath::new("app.py");
    let sub = FilePath::new("pkg/sub.py");

    project
        .update_file(&sub, "def foo():\n    return 1\n")
        .unwrap();
    project
        .update_file(&app, "from pkg.sub import foo as bar\n\nbar()\n")
        .unwrap();

    // The import record sits under the alias with the original preserved.
    let app_index = project.file(&app).unwrap();
    let import = app_index
        .import_by_name(&SymbolName::new("bar"))
        .expect("alias binds an import record");
    assert_eq!(import.original_name.as_ref().unwrap().as_str(), "foo");
    assert_eq!(import.import_path.as_str(), "pkg.sub");

    let tree = MemoryFileTree::from_paths(["app.py", "pkg/sub.py"]);
    project.resolve_project(&tree);

    let foo_id = project
        .file(&sub)
        .unwrap()
        .functions
        .values()
        .find(|f| f.name.as_ref().map(|n| n.as_str()) == Some("foo"))
        .unwrap()
        .symbol_id
        .clone();

    let references = project.resolved_references(&app).unwrap();
    let call = references
        .iter()
        .find(|r| r.kind == ReferenceKind::Call && r.name.as_str() == "bar")
        .expect("call through the alias recorded");
    assert_eq!(call.resolved_symbol_id.as_ref(), Some(&foo_id));
}

#[test]
fn python_sibling_module_wins_over_project_root() {
    let mut project = project();
    let main = FilePath::new("pkg/main.py");

    project
        .update_file(&FilePath::new("utils.py"), "def helper():\n    return 0\n")
        .unwrap();
    project
        .update_file(
            &FilePath::new("pkg/utils.py"),
            "def helper():\n    return 1\n",
        )
        .unwrap();
    project
        .update_file(&main, "import utils\n\nutils.helper()\n")
        .unwrap();

    let tree = MemoryFileTree::from_paths(["utils.py", "pkg/utils.py", "pkg/main.py"]);
    project.resolve_project(&tree);

    let sibling_helper = project
        .file(&FilePath::new("pkg/utils.py"))
        .unwrap()
        .functions
        .values()
        .next()
        .unwrap()
        .symbol_id
        .clone();

    let references = project.resolved_references(&main).unwrap();
    let call = references
        .iter()
        .find(|r| r.name.as_str() == "helper")
        .expect("namespace call recorded");
    assert_eq!(call.resolved_symbol_id.as_ref(), Some(&sibling_helper));
}

#[test]
fn js_reexport_chain_is_followed() {
    let mut project = project();
    let a = FilePath::new("a.js");
    let b = FilePath::new("b.js");
    let c = FilePath::new("c.js");

    project
        .update_file(&a, "export function f() {}\n")
        .unwrap();
    project
        .update_file(&b, "export { f } from './a';\n")
        .unwrap();
    project
        .update_file(&c, "import { f } from './b';\nf();\n")
        .unwrap();

    let tree = MemoryFileTree::from_paths(["a.js", "b.js", "c.js"]);
    project.resolve_project(&tree);

    let f_id = project
        .file(&a)
        .unwrap()
        .functions
        .values()
        .next()
        .unwrap()
        .symbol_id
        .clone();

    let references = project.resolved_references(&c).unwrap();
    let call = references
        .iter()
        .find(|r| r.kind == ReferenceKind::Call && r.name.as_str() == "f")
        .unwrap();
    assert_eq!(call.resolved_symbol_id.as_ref(), Some(&f_id));
}

#[test]
fn reexport_cycle_stops_at_depth_limit() {
    let mut project = project();
    project
        .update_file(&FilePath::new("a.js"), "export { x } from './b';\n")
        .unwrap();
    project
        .update_file(&FilePath::new("b.js"), "export { x } from './a';\n")
        .unwrap();
    let c = FilePath::new("c.js");
    project
        .update_file(&c, "import { x } from './a';\nx();\n")
        .unwrap();

    let tree = MemoryFileTree::from_paths(["a.js", "b.js", "c.js"]);
    project.resolve_project(&tree);

    let references = project.resolved_references(&c).unwrap();
    let call = references.iter().find(|r| r.name.as_str() == "x").unwrap();
    // The cycle is reported, not resolved.
    assert!(call.resolved_symbol_id.is_none());
    assert!(
        project
            .outcome()
            .diagnostics
            .iter()
            .any(|d| d.message.contains("re-export chain"))
    );
}

#[test]
fn ts_default_import_binds_default_export() {
    let mut project = project();
    let lib = FilePath::new("widget.ts");
    let app = FilePath::new("app.ts");

    project
        .update_file(&lib, "export default function make() {}\n")
        .unwrap();
    project
        .update_file(&app, "import make from './widget';\nmake();\n")
        .unwrap();

    let tree = MemoryFileTree::from_paths(["widget.ts", "app.ts"]);
    project.resolve_project(&tree);

    let make_id = project
        .file(&lib)
        .unwrap()
        .functions
        .values()
        .next()
        .unwrap()
        .symbol_id
        .clone();
    let references = project.resolved_references(&app).unwrap();
    let call = references
        .iter()
        .find(|r| r.kind == ReferenceKind::Call && r.name.as_str() == "make")
        .unwrap();
    assert_eq!(call.resolved_symbol_id.as_ref(), Some(&make_id));
}

#[test]
fn rust_use_resolves_across_modules() {
    let mut project = project();
    let lib = FilePath::new("src/lib.rs");
    let io = FilePath::new("src/io.rs");

    project
        .update_file(&io, "pub fn read_all() -> String {\n    String::new()\n}\n")
        .unwrap();
    project
        .update_file(
            &lib,
            "use crate::io::read_all;\n\nfn run() {\n    read_all();\n}\n",
        )
        .unwrap();

    let tree = MemoryFileTree::from_paths(["src/lib.rs", "src/io.rs"]);
    project.resolve_project(&tree);

    let target = project
        .file(&io)
        .unwrap()
        .functions
        .values()
        .next()
        .unwrap()
        .symbol_id
        .clone();
    let references = project.resolved_references(&lib).unwrap();
    let call = references
        .iter()
        .find(|r| r.kind == ReferenceKind::Call && r.name.as_str() == "read_all")
        .unwrap();
    assert_eq!(call.resolved_symbol_id.as_ref(), Some(&target));
}
