//! A single labeled query match.
//!
//! Wraps a tree-sitter node together with the capture name that matched it.
//! Handlers and symbol factories only ever see captures; they never run
//! queries themselves.

use crate::types::{FilePath, Location};
use tree_sitter::Node;

/// A labeled match from a grammar query.
#[derive(Debug, Clone, Copy)]
pub struct Capture<'t> {
    /// Full capture name including the leading `@`.
    pub name: &'t str,
    pub node: Node<'t>,
}

impl<'t> Capture<'t> {
    pub fn new(name: &'t str, node: Node<'t>) -> Self {
        Self { name, node }
    }

    /// Source text of the captured node.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        node_text(self.node, source)
    }

    /// Location of the captured node within `file`.
    pub fn location(&self, file: &FilePath) -> Location {
        node_location(self.node, file)
    }
}

/// Source text of any node. Out-of-range nodes yield `""` rather than
/// panicking on malformed trees.
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Convert a node's 0-based position span to a 1-based inclusive [`Location`].
///
/// tree-sitter's end position is exclusive, so its 0-based end column is
/// already the 1-based inclusive one.
pub fn node_location(node: Node<'_>, file: &FilePath) -> Location {
    let start = node.start_position();
    let end = node.end_position();
    Location::new(
        file.clone(),
        start.row as u32 + 1,
        start.column as u32 + 1,
        end.row as u32 + 1,
        (end.column as u32).max(1),
    )
}

/// Text of a named field child, when present.
pub fn field_text<'s>(node: Node<'_>, field: &str, source: &'s str) -> Option<&'s str> {
    node.child_by_field_name(field).map(|n| node_text(n, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_python(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_node_location_is_one_based_inclusive() {
        let source = "def foo():\n    pass\n";
        let tree = parse_python(source);
        let func = tree.root_node().child(0).unwrap();
        assert_eq!(func.kind(), "function_definition");

        let file = FilePath::new("t.py");
        let location = node_location(func, &file);
        assert_eq!(location.start_line, 1);
        assert_eq!(location.start_column, 1);
        assert_eq!(location.end_line, 2);
        assert_eq!(location.end_column, 8);
    }

    #[test]
    fn test_field_text() {
        let source = "def foo():\n    pass\n";
        let tree = parse_python(source);
        let func = tree.root_node().child(0).unwrap();
        assert_eq!(field_text(func, "name", source), Some("foo"));
        assert_eq!(field_text(func, "no_such_field", source), None);
    }

    #[test]
    fn test_capture_text() {
        let source = "x = 1\n";
        let tree = parse_python(source);
        let capture = Capture::new("@definition.variable", tree.root_node());
        assert_eq!(capture.text(source), source);
    }
}
