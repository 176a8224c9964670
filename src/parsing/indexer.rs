//! Single-file indexing orchestration.
//!
//! parse -> run the query -> dispatch captures family by family (scopes,
//! definitions, imports/exports, references) -> language passes -> local
//! resolution -> finalize. The fixed family order means scopes exist when
//! definitions register and definitions exist when references resolve.

use crate::capture::CaptureSchema;
use crate::config::Settings;
use crate::error::{Diagnostic, IndexError, IndexResult};
use crate::model::SingleFileIndex;
use crate::parsing::builder::DefinitionBuilder;
use crate::parsing::context::ProcessingContext;
use crate::parsing::handlers::HandlerMap;
use crate::parsing::queries::CompiledQuery;
use crate::parsing::{Language, capture::node_location};
use crate::types::FilePath;
use std::collections::HashMap;
use tracing::{debug, warn};
use tree_sitter::Parser;

struct LanguageSupport {
    parser: Parser,
    query: CompiledQuery,
    handlers: HandlerMap,
}

/// Builds [`SingleFileIndex`] values, one language registration at a time.
///
/// Construction validates the whole configuration: every query compiles,
/// every emitted capture is in the schema, every capture has a handler.
/// Nothing is indexed if any of that fails.
pub struct FileIndexer {
    settings: Settings,
    languages: HashMap<Language, LanguageSupport>,
}

impl FileIndexer {
    pub fn new(settings: Settings) -> IndexResult<Self> {
        let schema = CaptureSchema::new();
        let mut languages = HashMap::new();

        for language in Language::ALL {
            let enabled = settings
                .languages
                .get(language.config_key())
                .map(|c| c.enabled)
                .unwrap_or(true);
            if !enabled {
                debug!("language {language} disabled by configuration");
                continue;
            }

            let mut parser = Parser::new();
            parser
                .set_language(&language.grammar())
                .map_err(|e| IndexError::ParserInit {
                    language: language.config_key().to_string(),
                    reason: e.to_string(),
                })?;

            let query = CompiledQuery::compile(language)?;
            schema.validate_query_captures(language.config_key(), query.capture_names())?;

            let handlers = handler_map_for(language);
            handlers.validate_totality(language.config_key(), query.capture_names())?;

            let support = LanguageSupport {
                parser,
                query,
                handlers,
            };
            if languages.insert(language, support).is_some() {
                return Err(IndexError::DuplicateLanguage {
                    language: language.config_key().to_string(),
                });
            }
        }

        Ok(Self {
            settings,
            languages,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Index a file, detecting the language from its extension.
    pub fn index_file(&mut self, path: &FilePath, source: &str) -> IndexResult<SingleFileIndex> {
        let language = Language::from_path(path).ok_or_else(|| {
            IndexError::General(format!("cannot detect language of '{path}'"))
        })?;
        self.index_source(path, source, language)
    }

    /// Index one source text as the given language.
    pub fn index_source(
        &mut self,
        path: &FilePath,
        source: &str,
        language: Language,
    ) -> IndexResult<SingleFileIndex> {
        let limit = self.settings.indexing.max_file_size;
        if source.len() > limit {
            return Err(IndexError::FileTooLarge {
                path: path.clone(),
                size: source.len(),
                limit,
            });
        }

        let support = self
            .languages
            .get_mut(&language)
            .ok_or_else(|| IndexError::ConfigError {
                reason: format!("language '{language}' is not registered"),
            })?;

        let tree = support
            .parser
            .parse(source, None)
            .ok_or_else(|| IndexError::ParseFailed { path: path.clone() })?;
        let root = tree.root_node();

        let file_range = node_location(root, path);
        let mut builder = DefinitionBuilder::new(path.clone(), language, file_range);

        if root.has_error() {
            warn!("'{path}' parsed with errors; indexing the best-effort tree");
            builder.add_diagnostic(Diagnostic::error(format!(
                "parser reported syntax errors in '{path}'; the index is best-effort"
            )));
        }

        let captures = support.query.collect(&tree, source);
        let mut ctx =
            ProcessingContext::new(path.clone(), language, source, builder.scopes_snapshot());

        // Scope captures first; then refresh the context's snapshot so
        // definition and reference handlers see the finished tree.
        let mut rest_start = captures.len();
        for (i, capture) in captures.iter().enumerate() {
            if !capture.name.starts_with("@scope") {
                rest_start = i;
                break;
            }
            if let Some(handler) = support.handlers.get(capture.name) {
                handler(capture, &mut builder, &ctx);
            }
        }
        ctx.set_scopes(builder.scopes_snapshot());

        for capture in &captures[rest_start..] {
            match support.handlers.get(capture.name) {
                Some(handler) => handler(capture, &mut builder, &ctx),
                // Unreachable after validation; keep indexing regardless.
                None => debug!("no handler for {}", capture.name),
            }
        }

        builder.run_language_passes();
        builder.resolve_local_references();
        Ok(builder.finalize())
    }
}

fn handler_map_for(language: Language) -> HandlerMap {
    match language {
        Language::JavaScript => crate::parsing::javascript::handler_map(),
        Language::TypeScript => crate::parsing::typescript::handler_map(),
        Language::Python => crate::parsing::python::handler_map(),
        Language::Rust => crate::parsing::rust::handler_map(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReferenceKind;
    use crate::types::SymbolName;

    fn indexer() -> FileIndexer {
        FileIndexer::new(Settings::default()).expect("configuration is valid")
    }

    #[test]
    fn test_configuration_validates() {
        assert!(FileIndexer::new(Settings::default()).is_ok());
    }

    #[test]
    fn test_file_too_large_is_refused() {
        let mut indexer = indexer();
        let big = "x = 1\n".repeat(10_000);
        let err = indexer.index_file(&FilePath::new("big.py"), &big);
        assert!(matches!(err, Err(IndexError::FileTooLarge { .. })));
    }

    #[test]
    fn test_python_class_with_method() {
        let mut indexer = indexer();
        let source = "\
class Animal:
    def speak(self):
        return \"...\"

def free():
    pass
";
        let index = indexer
            .index_file(&FilePath::new("zoo.py"), source)
            .unwrap();

        assert_eq!(index.classes.len(), 1);
        let class = index.class_by_name(&SymbolName::new("Animal")).unwrap();
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name.as_str(), "speak");

        // `speak` must not double as a free function; `free` must.
        let function_names: Vec<_> = index
            .functions
            .values()
            .filter_map(|f| f.name.as_ref().map(|n| n.as_str().to_string()))
            .collect();
        assert_eq!(function_names, vec!["free".to_string()]);
    }

    #[test]
    fn test_deterministic_reindex() {
        let mut indexer = indexer();
        let source = "def foo():\n    bar()\n\ndef bar():\n    pass\n";
        let path = FilePath::new("m.py");
        let first = indexer.index_file(&path, source).unwrap();
        let second = indexer.index_file(&path, source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_intra_file_call_resolution() {
        let mut indexer = indexer();
        let source = "def helper():\n    pass\n\ndef main():\n    helper()\n";
        let index = indexer
            .index_file(&FilePath::new("app.py"), source)
            .unwrap();

        let call = index
            .references
            .iter()
            .find(|r| r.kind == ReferenceKind::Call && r.name.as_str() == "helper")
            .expect("call reference recorded");
        assert!(call.resolved_symbol_id.is_some());
    }

    #[test]
    fn test_unknown_name_lands_in_unresolved() {
        let mut indexer = indexer();
        let source = "def main():\n    missing()\n";
        let index = indexer
            .index_file(&FilePath::new("app.py"), source)
            .unwrap();
        assert!(
            index
                .unresolved_references
                .iter()
                .any(|u| u.name.as_str() == "missing")
        );
    }

    #[test]
    fn test_rust_trait_impl_shapes() {
        let mut indexer = indexer();
        let source = "\
trait Display {
    fn fmt(&self) -> String;
}

struct P {}

impl Display for P {
    fn fmt(&self) -> String {
        String::new()
    }
}
";
        let index = indexer.index_file(&FilePath::new("p.rs"), source).unwrap();

        let display = index
            .interface_by_name(&SymbolName::new("Display"))
            .expect("trait indexed");
        assert_eq!(display.methods.len(), 1);
        assert!(!display.methods[0].is_static);

        let p = index.class_by_name(&SymbolName::new("P")).expect("struct indexed");
        assert_eq!(p.methods.len(), 1);
        assert_eq!(p.methods[0].name.as_str(), "fmt");
        // `fmt` takes `&self`.
        assert!(!p.methods[0].is_static);

        assert_eq!(index.trait_impls.len(), 1);
        assert_eq!(index.trait_impls[0].type_name.as_str(), "P");
        assert_eq!(index.trait_impls[0].trait_name.as_str(), "Display");
    }

    #[test]
    fn test_rust_associated_function_is_static() {
        let mut indexer = indexer();
        let source = "\
struct P {}

impl P {
    fn new() -> Self {
        P {}
    }
    fn get(&self) -> i32 {
        0
    }
}
";
        let index = indexer.index_file(&FilePath::new("p.rs"), source).unwrap();
        let p = index.class_by_name(&SymbolName::new("P")).unwrap();
        let new = p.find_method(&SymbolName::new("new")).unwrap();
        assert!(new.is_static);
        let get = p.find_method(&SymbolName::new("get")).unwrap();
        assert!(!get.is_static);
    }

    #[test]
    fn test_js_exports_and_collection() {
        let mut indexer = indexer();
        let source = "\
function fn1() {}
function fn2() {}
const H = { a: fn1, b: fn2 };
export { fn1 as first };
";
        let index = indexer.index_file(&FilePath::new("h.js"), source).unwrap();

        let variable = index.variables.values().next().unwrap();
        let collection = variable.collection.as_ref().expect("collection detected");
        assert_eq!(collection.stored_references.len(), 2);

        // `export { fn1 as first }` round-trips through the alias.
        let fn1 = index
            .functions
            .values()
            .find(|f| f.name.as_ref().map(|n| n.as_str()) == Some("fn1"))
            .unwrap();
        assert!(fn1.export.is_exported);
        assert_eq!(fn1.export.export_name.as_ref().unwrap().as_str(), "first");
        assert_eq!(
            index.find_exported(&SymbolName::new("first")),
            Some(&fn1.symbol_id)
        );
    }

    #[test]
    fn test_ts_interface_members() {
        let mut indexer = indexer();
        let source = "\
interface Shape {
    area(): number;
    name: string;
}
";
        let index = indexer.index_file(&FilePath::new("s.ts"), source).unwrap();
        let shape = index.interface_by_name(&SymbolName::new("Shape")).unwrap();
        assert_eq!(shape.methods.len(), 1);
        assert_eq!(shape.methods[0].name.as_str(), "area");
        assert_eq!(shape.properties.len(), 1);
        assert_eq!(shape.properties[0].name.as_str(), "name");
    }
}
