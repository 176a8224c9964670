//! Core identity and location types.
//!
//! Every identifier the indexer hands out is an opaque string newtype.
//! Equality is string equality; nothing outside the construction helpers
//! is allowed to take these apart.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_string {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Box<str>);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into().into_boxed_str())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

opaque_string!(
    /// A file path, normalized to forward slashes. Used as identity only.
    FilePath
);
opaque_string!(
    /// The name of a definition or reference as it appears in source.
    SymbolName
);
opaque_string!(
    /// An import's module string (`pkg.sub`, `./utils`, `crate::io`).
    ModulePath
);
opaque_string!(
    /// Identity of a lexical scope within one file's scope tree.
    ScopeId
);
opaque_string!(
    /// Identity of a tracked type in the type registry.
    TypeId
);

impl FilePath {
    /// Normalize separators so Windows-style inputs compare equal to
    /// forward-slash paths.
    pub fn normalized(value: impl Into<String>) -> Self {
        let s: String = value.into();
        Self::new(s.replace('\\', "/"))
    }

    /// The directory portion of this path, or `""` for bare file names.
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// The file name without its directory.
    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// The extension (without the dot), if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        name.rfind('.').map(|idx| &name[idx + 1..])
    }
}

/// A source range. Lines and columns are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file_path: FilePath,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn new(
        file_path: FilePath,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            file_path,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Whether this range contains the given 1-based position.
    pub fn contains_position(&self, line: u32, column: u32) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && column < self.start_column {
            return false;
        }
        if line == self.end_line && column > self.end_column {
            return false;
        }
        true
    }

    /// Whether this range fully contains `other`. Ranges in different files
    /// never contain each other.
    pub fn contains(&self, other: &Location) -> bool {
        self.file_path == other.file_path
            && self.contains_position(other.start_line, other.start_column)
            && self.contains_position(other.end_line, other.end_column)
    }

    /// Canonical deterministic key for this location.
    pub fn key(&self) -> LocationKey {
        LocationKey::new(format!(
            "{}:{}:{}:{}:{}",
            self.file_path, self.start_line, self.start_column, self.end_line, self.end_column
        ))
    }
}

opaque_string!(
    /// Canonical string form of a [`Location`], usable as a map key.
    LocationKey
);

/// The definition kinds a [`SymbolId`] can carry in its leading segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefKind {
    Class,
    Interface,
    Function,
    Method,
    Variable,
    Parameter,
    Enum,
    TypeAlias,
    Import,
    Property,
}

impl DefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefKind::Class => "class",
            DefKind::Interface => "interface",
            DefKind::Function => "function",
            DefKind::Method => "method",
            DefKind::Variable => "variable",
            DefKind::Parameter => "parameter",
            DefKind::Enum => "enum",
            DefKind::TypeAlias => "type_alias",
            DefKind::Import => "import",
            DefKind::Property => "property",
        }
    }
}

impl fmt::Display for DefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, location-unique identity of a definition.
///
/// Shape: `<kind>:<file>:<start_line>:<start_col>:<end_line>:<end_col>[:name]`,
/// or `anonymous:<location>` for unnamed callables. Two distinct definitions
/// in a project always get distinct ids, and an id is stable under edits to
/// unrelated files because it only embeds its own file's coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(Box<str>);

impl SymbolId {
    /// Id for a named definition at a location.
    pub fn for_definition(kind: DefKind, location: &Location, name: Option<&SymbolName>) -> Self {
        let base = format!(
            "{}:{}:{}:{}:{}:{}",
            kind,
            location.file_path,
            location.start_line,
            location.start_column,
            location.end_line,
            location.end_column
        );
        match name {
            Some(name) => Self(format!("{base}:{name}").into_boxed_str()),
            None => Self(base.into_boxed_str()),
        }
    }

    /// Id for an anonymous callable (arrow function, lambda, closure).
    pub fn anonymous(location: &Location) -> Self {
        Self(format!("anonymous:{}", location.key()).into_boxed_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(file: &str, sl: u32, sc: u32, el: u32, ec: u32) -> Location {
        Location::new(FilePath::new(file), sl, sc, el, ec)
    }

    #[test]
    fn test_opaque_string_equality() {
        assert_eq!(FilePath::new("a/b.py"), FilePath::from("a/b.py"));
        assert_ne!(SymbolName::new("foo"), SymbolName::new("Foo"));
    }

    #[test]
    fn test_file_path_normalization() {
        let path = FilePath::normalized("src\\lib\\mod.rs");
        assert_eq!(path.as_str(), "src/lib/mod.rs");
        assert_eq!(path.parent(), "src/lib");
        assert_eq!(path.file_name(), "mod.rs");
        assert_eq!(path.extension(), Some("rs"));
    }

    #[test]
    fn test_file_path_bare_name() {
        let path = FilePath::new("utils.py");
        assert_eq!(path.parent(), "");
        assert_eq!(path.file_name(), "utils.py");
    }

    #[test]
    fn test_location_contains_position() {
        let range = loc("f.ts", 10, 5, 15, 20);
        assert!(range.contains_position(12, 1));
        assert!(range.contains_position(10, 5));
        assert!(range.contains_position(15, 20));
        assert!(!range.contains_position(9, 30));
        assert!(!range.contains_position(10, 4));
        assert!(!range.contains_position(15, 21));
    }

    #[test]
    fn test_location_contains_range() {
        let outer = loc("f.ts", 1, 1, 20, 1);
        let inner = loc("f.ts", 5, 3, 6, 10);
        let other_file = loc("g.ts", 5, 3, 6, 10);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&other_file));
    }

    #[test]
    fn test_location_key_is_deterministic() {
        let a = loc("pkg/mod.py", 3, 1, 3, 12);
        let b = loc("pkg/mod.py", 3, 1, 3, 12);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().as_str(), "pkg/mod.py:3:1:3:12");
    }

    #[test]
    fn test_symbol_id_shape() {
        let location = loc("src/app.ts", 4, 1, 8, 2);
        let name = SymbolName::new("Widget");
        let id = SymbolId::for_definition(DefKind::Class, &location, Some(&name));
        assert_eq!(id.as_str(), "class:src/app.ts:4:1:8:2:Widget");

        let nameless = SymbolId::for_definition(DefKind::Function, &location, None);
        assert_eq!(nameless.as_str(), "function:src/app.ts:4:1:8:2");
    }

    #[test]
    fn test_anonymous_symbol_id() {
        let location = loc("src/app.js", 2, 10, 2, 30);
        let id = SymbolId::anonymous(&location);
        assert_eq!(id.as_str(), "anonymous:src/app.js:2:10:2:30");
    }

    #[test]
    fn test_symbol_ids_distinct_by_location() {
        let name = SymbolName::new("helper");
        let a = SymbolId::for_definition(DefKind::Function, &loc("a.py", 1, 1, 2, 1), Some(&name));
        let b = SymbolId::for_definition(DefKind::Function, &loc("a.py", 5, 1, 6, 1), Some(&name));
        assert_ne!(a, b);
    }
}
