//! Query compilation and capture collection.
//!
//! The `.scm` files are data. They are compiled once per language at
//! startup, validated against the capture schema, and executed per file.
//! Captures come back partitioned by family in the fixed processing order
//! (scopes, then definitions, then imports/exports, then references) and in
//! document order within a family, outermost node first.

use super::capture::Capture;
use crate::error::{IndexError, IndexResult};
use crate::parsing::Language;
use tree_sitter::{Query, QueryCursor, StreamingIterator, Tree};

/// Processing order of capture families.
fn family_rank(name: &str) -> usize {
    let (family, _, _) = crate::capture::split_capture(name);
    match family {
        "scope" => 0,
        "definition" => 1,
        "import" => 2,
        "export" => 3,
        "reference" => 4,
        _ => 5,
    }
}

pub struct CompiledQuery {
    query: Query,
    /// Capture names with the leading `@` restored.
    names: Vec<String>,
}

impl CompiledQuery {
    pub fn compile(language: Language) -> IndexResult<Self> {
        let query =
            Query::new(&language.grammar(), language.query_source()).map_err(|e| {
                IndexError::QueryCompile {
                    language: language.config_key().to_string(),
                    reason: e.to_string(),
                }
            })?;
        let names = query
            .capture_names()
            .iter()
            .map(|n| format!("@{n}"))
            .collect();
        Ok(Self { query, names })
    }

    pub fn capture_names(&self) -> &[String] {
        &self.names
    }

    /// Run the query over a tree and return captures sorted by
    /// (family rank, start byte, widest node first).
    pub fn collect<'t>(&'t self, tree: &'t Tree, source: &str) -> Vec<Capture<'t>> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), source.as_bytes());

        let mut raw: Vec<(usize, usize, isize, Capture<'t>)> = Vec::new();
        while let Some(m) = matches.next() {
            for qc in m.captures {
                let name = self.names[qc.index as usize].as_str();
                raw.push((
                    family_rank(name),
                    qc.node.start_byte(),
                    -(qc.node.end_byte() as isize),
                    Capture::new(name, qc.node),
                ));
            }
        }

        raw.sort_by_key(|(rank, start, neg_end, _)| (*rank, *start, *neg_end));
        raw.dedup_by_key(|(rank, start, neg_end, c)| (*rank, *start, *neg_end, c.name));
        raw.into_iter().map(|(_, _, _, c)| c).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    #[test]
    fn test_family_rank_order() {
        assert!(family_rank("@scope.module") < family_rank("@definition.class"));
        assert!(family_rank("@definition.class") < family_rank("@import.named"));
        assert!(family_rank("@import.named") < family_rank("@export.statement"));
        assert!(family_rank("@export.statement") < family_rank("@reference.call"));
    }

    #[test]
    fn test_compile_all_languages() {
        for language in Language::ALL {
            let compiled = CompiledQuery::compile(language);
            assert!(
                compiled.is_ok(),
                "{language} query failed to compile: {:?}",
                compiled.err()
            );
        }
    }

    #[test]
    fn test_collect_orders_scopes_before_definitions() {
        let compiled = CompiledQuery::compile(Language::Python).unwrap();
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let source = "def foo():\n    pass\n";
        let tree = parser.parse(source, None).unwrap();

        let captures = compiled.collect(&tree, source);
        let first_def = captures
            .iter()
            .position(|c| c.name.starts_with("@definition"))
            .unwrap();
        let last_scope = captures
            .iter()
            .rposition(|c| c.name.starts_with("@scope"))
            .unwrap();
        assert!(last_scope < first_def);
    }
}
