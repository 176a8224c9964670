//! JavaScript/TypeScript symbol-factory helpers.
//!
//! Pure extractors over the JS/TS grammars. The TS grammar is a superset:
//! the same functions work for both, returning `None` where a construct
//! does not exist in plain JavaScript.

use crate::model::SelfKeyword;
use crate::parsing::capture::node_text;
use crate::types::SymbolName;
use tree_sitter::Node;

/// `name` field text of a declaration node.
pub fn name_of<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    node.child_by_field_name("name").map(|n| node_text(n, source))
}

/// The name node itself, for location-accurate symbol ids.
pub fn name_node(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("name")
}

/// Superclass names from a class heritage clause.
///
/// JS allows a single `extends <expression>`; TS wraps it in an
/// `extends_clause`. Only identifier-shaped superclasses are extracted;
/// `extends mixin(Base)` stays empty, keeping dispatch conservative.
pub fn extract_extends(class_node: Node<'_>, source: &str) -> Vec<SymbolName> {
    let mut out = Vec::new();
    let Some(heritage) = child_of_kind(class_node, "class_heritage") else {
        return out;
    };

    let mut cursor = heritage.walk();
    for child in heritage.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => out.push(SymbolName::new(node_text(child, source))),
            "extends_clause" => {
                let mut inner = child.walk();
                for value in child.named_children(&mut inner) {
                    if value.kind() == "identifier" || value.kind() == "type_identifier" {
                        out.push(SymbolName::new(node_text(value, source)));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Interface names from a TS `implements` clause.
pub fn extract_implements(class_node: Node<'_>, source: &str) -> Vec<SymbolName> {
    let mut out = Vec::new();
    let Some(heritage) = child_of_kind(class_node, "class_heritage") else {
        return out;
    };
    let mut cursor = heritage.walk();
    for child in heritage.named_children(&mut cursor) {
        if child.kind() == "implements_clause" {
            let mut inner = child.walk();
            for value in child.named_children(&mut inner) {
                if value.kind() == "type_identifier" || value.kind() == "identifier" {
                    out.push(SymbolName::new(node_text(value, source)));
                }
            }
        }
    }
    out
}

/// Interface extends: `interface A extends B, C`.
pub fn extract_interface_extends(interface_node: Node<'_>, source: &str) -> Vec<SymbolName> {
    let mut out = Vec::new();
    let mut cursor = interface_node.walk();
    for child in interface_node.named_children(&mut cursor) {
        if child.kind() == "extends_type_clause" || child.kind() == "extends_clause" {
            let mut inner = child.walk();
            for value in child.named_children(&mut inner) {
                if value.kind() == "type_identifier" || value.kind() == "identifier" {
                    out.push(SymbolName::new(node_text(value, source)));
                }
            }
        }
    }
    out
}

/// Return-type annotation text, without the leading colon.
pub fn extract_return_type(node: Node<'_>, source: &str) -> Option<String> {
    let annotation = node.child_by_field_name("return_type")?;
    Some(clean_type_text(node_text(annotation, source)))
}

/// A `type` field annotation, without the leading colon.
pub fn extract_type_annotation(node: Node<'_>, source: &str) -> Option<String> {
    let annotation = node.child_by_field_name("type")?;
    Some(clean_type_text(node_text(annotation, source)))
}

pub fn clean_type_text(text: &str) -> String {
    text.trim_start_matches(':').trim().to_string()
}

/// Whether a class member carries the `static` modifier.
pub fn is_static_member(node: Node<'_>, source: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_named() && child.kind() != "decorator" {
            break;
        }
        if node_text(child, source) == "static" {
            return true;
        }
    }
    false
}

/// The module string of the import statement enclosing `node`.
pub fn import_source_of(node: Node<'_>, source: &str) -> Option<String> {
    let mut current = Some(node);
    for _ in 0..5 {
        let n = current?;
        if n.kind() == "import_statement" || n.kind() == "export_statement" {
            let src = n.child_by_field_name("source")?;
            return Some(
                crate::parsing::factory::strip_quotes(node_text(src, source)).to_string(),
            );
        }
        current = n.parent();
    }
    None
}

/// Receiver chain of a member-expression callee: for `a.b.c()` the callee
/// is `a.b.c`; the chain is `["a", "b"]` and the method name is `c`.
pub fn member_chain(callee: Node<'_>, source: &str) -> Vec<SymbolName> {
    let mut chain = Vec::new();
    if let Some(object) = callee.child_by_field_name("object") {
        walk_object(object, source, &mut chain);
    }
    chain
}

fn walk_object(node: Node<'_>, source: &str, chain: &mut Vec<SymbolName>) {
    match node.kind() {
        "member_expression" => {
            if let Some(object) = node.child_by_field_name("object") {
                walk_object(object, source, chain);
            }
            if let Some(property) = node.child_by_field_name("property") {
                chain.push(SymbolName::new(node_text(property, source)));
            }
        }
        "identifier" | "this" | "super" => {
            chain.push(SymbolName::new(node_text(node, source)));
        }
        // Chained calls (`foo().bar()`) and subscripts contribute nothing
        // nameable; receiver typing stays unknown.
        _ => {}
    }
}

/// The self keyword at the head of a receiver chain, if any.
pub fn chain_self_keyword(chain: &[SymbolName]) -> Option<SelfKeyword> {
    chain.first().and_then(|n| SelfKeyword::from_text(n.as_str()))
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
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

    fn parse_ts(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn find_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(found) = find_kind(child, kind) {
                return Some(found);
            }
        }
        None
    }

    #[test]
    fn test_extract_extends_js() {
        let source = "class Dog extends Animal {}";
        let tree = parse_js(source);
        let class = find_kind(tree.root_node(), "class_declaration").unwrap();
        let extends = extract_extends(class, source);
        assert_eq!(extends.len(), 1);
        assert_eq!(extends[0].as_str(), "Animal");
    }

    #[test]
    fn test_extract_extends_ts() {
        let source = "class Dog extends Animal implements Pet {}";
        let tree = parse_ts(source);
        let class = find_kind(tree.root_node(), "class_declaration").unwrap();
        let extends = extract_extends(class, source);
        assert_eq!(extends.len(), 1);
        assert_eq!(extends[0].as_str(), "Animal");
        let implements = extract_implements(class, source);
        assert_eq!(implements.len(), 1);
        assert_eq!(implements[0].as_str(), "Pet");
    }

    #[test]
    fn test_member_chain() {
        let source = "a.b.c();";
        let tree = parse_js(source);
        let call = find_kind(tree.root_node(), "call_expression").unwrap();
        let callee = call.child_by_field_name("function").unwrap();
        let chain = member_chain(callee, source);
        let names: Vec<&str> = chain.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_this_chain_detected() {
        let source = "this.render();";
        let tree = parse_js(source);
        let call = find_kind(tree.root_node(), "call_expression").unwrap();
        let callee = call.child_by_field_name("function").unwrap();
        let chain = member_chain(callee, source);
        assert_eq!(chain_self_keyword(&chain), Some(SelfKeyword::This));
    }

    #[test]
    fn test_return_type_ts() {
        let source = "function f(): number { return 1; }";
        let tree = parse_ts(source);
        let func = find_kind(tree.root_node(), "function_declaration").unwrap();
        assert_eq!(extract_return_type(func, source).as_deref(), Some("number"));
    }

    #[test]
    fn test_static_member() {
        let source = "class A { static create() {} make() {} }";
        let tree = parse_js(source);
        let mut methods = Vec::new();
        fn gather<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
            if node.kind() == "method_definition" {
                out.push(node);
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                gather(child, out);
            }
        }
        gather(tree.root_node(), &mut methods);
        assert_eq!(methods.len(), 2);
        assert!(is_static_member(methods[0], source));
        assert!(!is_static_member(methods[1], source));
    }
}
