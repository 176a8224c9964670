//! Query-driven parsing: capture handling, per-language dispatch tables,
//! and the single-file indexer.

pub mod builder;
pub mod capture;
pub mod context;
pub mod factory;
pub mod handlers;
pub mod indexer;
pub mod javascript;
pub mod language;
pub mod python;
pub mod queries;
pub mod rust;
pub mod typescript;

pub use builder::DefinitionBuilder;
pub use capture::Capture;
pub use context::ProcessingContext;
pub use handlers::{HandlerFn, HandlerMap};
pub use indexer::FileIndexer;
pub use language::Language;
