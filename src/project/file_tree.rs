//! Filesystem collaborator.
//!
//! The module resolver only needs existence checks, byte reads, and
//! directory listings. Paths are forward-slash relative to the project
//! root. The in-memory implementation backs the tests; a thin adapter
//! over `std::fs` serves real projects.

use std::collections::BTreeMap;
use std::path::Path;

pub trait FileTree {
    fn exists(&self, path: &str) -> bool;
    fn read_bytes(&self, path: &str) -> Option<Vec<u8>>;
    fn list_dir(&self, path: &str) -> Vec<String>;
}

fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let normalized = path.replace('\\', "/");
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

/// Join and normalize two forward-slash path fragments.
pub fn join_paths(base: &str, rest: &str) -> String {
    if base.is_empty() {
        normalize(rest)
    } else {
        normalize(&format!("{base}/{rest}"))
    }
}

/// An in-memory project tree.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileTree {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from bare paths; contents are empty.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.add(path, Vec::new());
        }
        tree
    }

    pub fn add(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(normalize(&path.into()), bytes);
    }
}

impl FileTree for MemoryFileTree {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn read_bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(&normalize(path)).cloned()
    }

    fn list_dir(&self, path: &str) -> Vec<String> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", normalize(path))
        };
        let mut out = Vec::new();
        for key in self.files.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                let entry = rest.split('/').next().unwrap_or(rest);
                if !entry.is_empty() && !out.contains(&entry.to_string()) {
                    out.push(entry.to_string());
                }
            }
        }
        out
    }
}

/// Adapter over the real filesystem rooted at a directory.
pub struct OsFileTree {
    root: std::path::PathBuf,
}

impl OsFileTree {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn full(&self, path: &str) -> std::path::PathBuf {
        self.root.join(normalize(path))
    }
}

impl FileTree for OsFileTree {
    fn exists(&self, path: &str) -> bool {
        self.full(path).is_file()
    }

    fn read_bytes(&self, path: &str) -> Option<Vec<u8>> {
        std::fs::read(self.full(path)).ok()
    }

    fn list_dir(&self, path: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.full(path)) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a/./b/../c.py"), "a/c.py");
        assert_eq!(normalize("./x.ts"), "x.ts");
        assert_eq!(join_paths("pkg", "../utils.py"), "utils.py");
        assert_eq!(join_paths("", "m.rs"), "m.rs");
    }

    #[test]
    fn test_memory_tree() {
        let tree = MemoryFileTree::from_paths(["pkg/main.py", "pkg/utils.py", "utils.py"]);
        assert!(tree.exists("pkg/utils.py"));
        assert!(tree.exists("./pkg/../utils.py"));
        assert!(!tree.exists("pkg/missing.py"));

        let mut entries = tree.list_dir("pkg");
        entries.sort();
        assert_eq!(entries, vec!["main.py", "utils.py"]);

        let mut root = tree.list_dir("");
        root.sort();
        assert_eq!(root, vec!["pkg", "utils.py"]);
    }

    #[test]
    fn test_os_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), b"pub fn x() {}").unwrap();

        let tree = OsFileTree::new(dir.path());
        assert!(tree.exists("src/lib.rs"));
        assert!(!tree.exists("src/other.rs"));
        assert_eq!(tree.read_bytes("src/lib.rs").unwrap(), b"pub fn x() {}");
    }
}
