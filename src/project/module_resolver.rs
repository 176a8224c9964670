//! Module-path resolution.
//!
//! Turns an import's module string into an indexed file path, per language.
//! A `None` result means the import is external (a package, the standard
//! library) and stays unresolved by design.

use super::file_tree::{FileTree, join_paths};
use crate::parsing::Language;
use crate::types::FilePath;

/// JS/TS candidate extensions, tried in order, then `index.<ext>`.
const JS_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

pub fn resolve_module_path(
    language: Language,
    import_text: &str,
    importing_file: &FilePath,
    tree: &dyn FileTree,
) -> Option<FilePath> {
    match language {
        Language::Python => resolve_python(import_text, importing_file, tree),
        Language::JavaScript | Language::TypeScript => {
            resolve_javascript(import_text, importing_file, tree)
        }
        Language::Rust => resolve_rust(import_text, importing_file, tree),
    }
}

/// Python: leading dots walk up from the importing file's package;
/// otherwise the sibling directory is tried before the project root, so
/// `pkg/main.py` importing `utils` binds `pkg/utils.py` even when a
/// top-level `utils.py` exists.
fn resolve_python(
    import_text: &str,
    importing_file: &FilePath,
    tree: &dyn FileTree,
) -> Option<FilePath> {
    let sibling_dir = importing_file.parent().to_string();

    if import_text.starts_with('.') {
        let dots = import_text.chars().take_while(|&c| c == '.').count();
        let rest = &import_text[dots..];
        let mut base = sibling_dir;
        for _ in 0..dots.saturating_sub(1) {
            base = parent_dir(&base);
        }
        return resolve_dotted(&base, rest, tree);
    }

    for base in [sibling_dir.as_str(), ""] {
        if let Some(found) = resolve_dotted(base, import_text, tree) {
            return Some(found);
        }
    }
    None
}

fn resolve_dotted(base: &str, dotted: &str, tree: &dyn FileTree) -> Option<FilePath> {
    if dotted.is_empty() {
        // `from . import x` — the package itself.
        let init = join_paths(base, "__init__.py");
        return tree.exists(&init).then(|| FilePath::new(init));
    }

    let segments: Vec<&str> = dotted.split('.').filter(|s| !s.is_empty()).collect();
    let (last, dirs) = segments.split_last()?;

    let mut dir = base.to_string();
    for segment in dirs {
        dir = join_paths(&dir, segment);
    }

    // `<last>.py` wins over `<last>/__init__.py`.
    let module_file = join_paths(&dir, &format!("{last}.py"));
    if tree.exists(&module_file) {
        return Some(FilePath::new(module_file));
    }
    let package_init = join_paths(&dir, &format!("{last}/__init__.py"));
    if tree.exists(&package_init) {
        return Some(FilePath::new(package_init));
    }
    None
}

/// JS/TS: only relative specifiers resolve; bare specifiers are packages.
fn resolve_javascript(
    import_text: &str,
    importing_file: &FilePath,
    tree: &dyn FileTree,
) -> Option<FilePath> {
    if !import_text.starts_with("./") && !import_text.starts_with("../") {
        return None;
    }

    let base = join_paths(importing_file.parent(), import_text);

    // Explicit extension.
    if base.rsplit('/').next().is_some_and(|name| name.contains('.')) && tree.exists(&base) {
        return Some(FilePath::new(base));
    }

    for ext in JS_EXTENSIONS {
        let candidate = format!("{base}.{ext}");
        if tree.exists(&candidate) {
            return Some(FilePath::new(candidate));
        }
    }
    for ext in JS_EXTENSIONS {
        let candidate = join_paths(&base, &format!("index.{ext}"));
        if tree.exists(&candidate) {
            return Some(FilePath::new(candidate));
        }
    }
    None
}

/// Rust: `use` paths through the module tree the file layout implies.
/// `crate::` starts at the crate root, `super::` one module up, `self::`
/// in the current module; a bare leading segment is tried crate-relative.
fn resolve_rust(
    import_text: &str,
    importing_file: &FilePath,
    tree: &dyn FileTree,
) -> Option<FilePath> {
    let mut segments: Vec<&str> = import_text.split("::").filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }

    let dir = match segments[0] {
        "crate" => {
            segments.remove(0);
            crate_root_dir(tree)?
        }
        "self" => {
            segments.remove(0);
            module_dir(importing_file)
        }
        "super" => {
            let mut dir = module_dir(importing_file);
            while segments.first() == Some(&"super") {
                segments.remove(0);
                dir = parent_dir(&dir);
            }
            dir
        }
        _ => crate_root_dir(tree)?,
    };

    if segments.is_empty() {
        return module_file(&dir, tree);
    }

    // First try the whole path as a module; then all-but-last, treating the
    // final segment as an item inside that module.
    if let Some(found) = descend(&dir, &segments, tree) {
        return Some(found);
    }
    let (_, module_segments) = segments.split_last()?;
    if module_segments.is_empty() {
        return module_file(&dir, tree);
    }
    if let Some(found) = descend(&dir, module_segments, tree) {
        return Some(found);
    }
    None
}

fn descend(base: &str, segments: &[&str], tree: &dyn FileTree) -> Option<FilePath> {
    let (last, dirs) = segments.split_last()?;
    let mut dir = base.to_string();
    for segment in dirs {
        dir = join_paths(&dir, segment);
    }
    let file = join_paths(&dir, &format!("{last}.rs"));
    if tree.exists(&file) {
        return Some(FilePath::new(file));
    }
    let mod_file = join_paths(&dir, &format!("{last}/mod.rs"));
    if tree.exists(&mod_file) {
        return Some(FilePath::new(mod_file));
    }
    None
}

/// The directory whose children are this file's submodules.
fn module_dir(file: &FilePath) -> String {
    let name = file.file_name();
    if name == "mod.rs" || name == "lib.rs" || name == "main.rs" {
        file.parent().to_string()
    } else {
        let stem = name.strip_suffix(".rs").unwrap_or(name);
        join_paths(file.parent(), stem)
    }
}

fn module_file(dir: &str, tree: &dyn FileTree) -> Option<FilePath> {
    for name in ["mod.rs", "lib.rs", "main.rs"] {
        let candidate = join_paths(dir, name);
        if tree.exists(&candidate) {
            return Some(FilePath::new(candidate));
        }
    }
    // `src/foo/` may not exist as a directory; `src/foo.rs` is the module.
    let file = format!("{dir}.rs");
    tree.exists(&file).then(|| FilePath::new(file))
}

fn crate_root_dir(tree: &dyn FileTree) -> Option<String> {
    for root in ["src/lib.rs", "src/main.rs"] {
        if tree.exists(root) {
            return Some("src".to_string());
        }
    }
    for root in ["lib.rs", "main.rs"] {
        if tree.exists(root) {
            return Some(String::new());
        }
    }
    None
}

fn parent_dir(dir: &str) -> String {
    match dir.rfind('/') {
        Some(idx) => dir[..idx].to_string(),
        None => String::new(),
    }
}
