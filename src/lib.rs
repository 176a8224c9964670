//! cartograph: a cross-language semantic code indexer.
//!
//! Source files in JavaScript, TypeScript, Python, or Rust are parsed with
//! tree-sitter, run through capture queries, and distilled into per-file
//! semantic indices: definitions, lexical scopes, references, exports, and
//! tracked types. The project index aggregates files, resolves references
//! across them through imports and inheritance, and exposes the call graph.

pub mod capture;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod parsing;
pub mod project;
pub mod scope;
pub mod types;

pub use config::Settings;
pub use error::{Diagnostic, IndexError, IndexResult, Severity};
pub use model::SingleFileIndex;
pub use parsing::{FileIndexer, Language};
pub use project::{MemoryFileTree, OsFileTree, ProjectIndex};
pub use types::{FilePath, Location, ModulePath, ScopeId, SymbolId, SymbolName, TypeId};
