//! Shared symbol-factory helpers.
//!
//! Pure functions over captured nodes that more than one language module
//! needs: literal stripping, async detection, collection-literal scanning,
//! and callback-context detection. Language-specific extractors live in the
//! language modules themselves.

use super::capture::node_text;
use crate::model::{CallbackContext, CollectionType, FunctionCollection};
use crate::types::SymbolName;
use tree_sitter::Node;

/// Strip matching string quotes from an import source or literal.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    for quote in ["\"", "'", "`"] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Whether a callable node is marked `async`. Grammars expose the keyword
/// as an anonymous leading token rather than a field.
pub fn is_async_callable(node: Node<'_>, source: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_named() {
            break;
        }
        if node_text(child, source) == "async" {
            return true;
        }
    }
    false
}

/// One-line, bounded initializer text for storage on variable records.
pub fn initializer_text(node: Node<'_>, source: &str) -> String {
    let text = node_text(node, source);
    let mut compact: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.len() > 160 {
        let mut cut = 160;
        while cut > 0 && !compact.is_char_boundary(cut) {
            cut -= 1;
        }
        compact.truncate(cut);
    }
    compact
}

/// Recognize a collection literal populated with identifier references.
///
/// Spread/splat forms contribute their source identifier. Returns `None`
/// when the node is not a recognized collection literal or stores no
/// identifier references at all.
pub fn detect_function_collection(node: Node<'_>, source: &str) -> Option<FunctionCollection> {
    let collection_type = match node.kind() {
        "array" | "list" | "tuple" | "array_expression" => CollectionType::Array,
        "object" => CollectionType::Object,
        "dictionary" => CollectionType::Map,
        "set" => CollectionType::Array,
        "new_expression" => {
            let ctor = node.child_by_field_name("constructor")?;
            if node_text(ctor, source) != "Map" {
                return None;
            }
            CollectionType::Map
        }
        _ => return None,
    };

    let mut stored = Vec::new();
    collect_stored_references(node, source, &mut stored, 0);
    if stored.is_empty() {
        return None;
    }
    Some(FunctionCollection {
        collection_type,
        stored_references: stored,
    })
}

fn collect_stored_references(node: Node<'_>, source: &str, out: &mut Vec<SymbolName>, depth: usize) {
    if depth > 4 {
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "identifier" | "shorthand_property_identifier" => {
                out.push(SymbolName::new(node_text(child, source)));
            }
            // `{ a: fn1 }` / `"a": fn1` — only the value side is a reference.
            "pair" => {
                if let Some(value) = child.child_by_field_name("value")
                    && value.kind() == "identifier"
                {
                    out.push(SymbolName::new(node_text(value, source)));
                }
            }
            // `...BASE`, `*rest`, `**extra`
            "spread_element" | "list_splat" | "dictionary_splat" => {
                collect_stored_references(child, source, out, depth + 1);
            }
            "arguments" | "array" | "list" | "tuple" => {
                collect_stored_references(child, source, out, depth + 1);
            }
            _ => {}
        }
    }
}

/// Detect that a callable node is being passed as an argument to a call,
/// and name the call when possible.
pub fn detect_callback_context(node: Node<'_>, source: &str) -> Option<CallbackContext> {
    let parent = node.parent()?;
    if parent.kind() != "arguments" && parent.kind() != "argument_list" {
        return None;
    }
    let call = parent.parent()?;
    if call.kind() != "call_expression" && call.kind() != "call" {
        return None;
    }

    let outer_call = call.child_by_field_name("function").map(|f| {
        let text = node_text(f, source);
        let last = text
            .rsplit(['.', ':'])
            .next()
            .unwrap_or(text);
        SymbolName::new(last)
    });
    Some(CallbackContext { outer_call })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_js(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn find_node<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(found) = find_node(child, kind) {
                return Some(found);
            }
        }
        None
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'./utils'"), "./utils");
        assert_eq!(strip_quotes("\"pkg.sub\""), "pkg.sub");
        assert_eq!(strip_quotes("bare"), "bare");
    }

    #[test]
    fn test_object_collection_with_spread() {
        let source = "const H = { a: fn1, ...BASE, b: fn2 };";
        let tree = parse_js(source);
        let object = find_node(tree.root_node(), "object").unwrap();

        let collection = detect_function_collection(object, source).unwrap();
        assert_eq!(collection.collection_type, CollectionType::Object);
        let names: Vec<&str> = collection
            .stored_references
            .iter()
            .map(|n| n.as_str())
            .collect();
        assert!(names.contains(&"fn1"));
        assert!(names.contains(&"BASE"));
        assert!(names.contains(&"fn2"));
    }

    #[test]
    fn test_array_collection() {
        let source = "const handlers = [onOpen, onClose];";
        let tree = parse_js(source);
        let array = find_node(tree.root_node(), "array").unwrap();

        let collection = detect_function_collection(array, source).unwrap();
        assert_eq!(collection.collection_type, CollectionType::Array);
        assert_eq!(collection.stored_references.len(), 2);
    }

    #[test]
    fn test_non_collection_returns_none() {
        let source = "const n = 42;";
        let tree = parse_js(source);
        let number = find_node(tree.root_node(), "number").unwrap();
        assert!(detect_function_collection(number, source).is_none());
    }

    #[test]
    fn test_callback_context() {
        let source = "items.forEach(function (x) { use(x); });";
        let tree = parse_js(source);
        let func = find_node(tree.root_node(), "function_expression").unwrap();

        let context = detect_callback_context(func, source).unwrap();
        assert_eq!(context.outer_call.unwrap().as_str(), "forEach");
    }

    #[test]
    fn test_async_detection() {
        let source = "async function go() {}";
        let tree = parse_js(source);
        let func = find_node(tree.root_node(), "function_declaration").unwrap();
        assert!(is_async_callable(func, source));

        let source = "function stay() {}";
        let tree = parse_js(source);
        let func = find_node(tree.root_node(), "function_declaration").unwrap();
        assert!(!is_async_callable(func, source));
    }
}
