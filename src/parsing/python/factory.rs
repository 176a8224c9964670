//! Python symbol-factory helpers.

use crate::parsing::capture::node_text;
use crate::types::SymbolName;
use tree_sitter::Node;

/// Superclass names from `class C(Base, mixin.Other, metaclass=M)`.
/// Keyword arguments (metaclass) are not inheritance.
pub fn extract_superclasses(class_node: Node<'_>, source: &str) -> Vec<SymbolName> {
    let mut out = Vec::new();
    let Some(args) = class_node.child_by_field_name("superclasses") else {
        return out;
    };
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => out.push(SymbolName::new(node_text(child, source))),
            // `module.Base` — the rightmost attribute is the class name.
            "attribute" => {
                if let Some(attr) = child.child_by_field_name("attribute") {
                    out.push(SymbolName::new(node_text(attr, source)));
                }
            }
            _ => {}
        }
    }
    out
}

/// `-> T` return annotation text.
pub fn extract_return_type(function_node: Node<'_>, source: &str) -> Option<String> {
    function_node
        .child_by_field_name("return_type")
        .map(|n| node_text(n, source).trim().to_string())
}

/// Whether a function is decorated with `@staticmethod` or `@classmethod`.
pub fn has_static_decorator(function_node: Node<'_>, source: &str) -> bool {
    let Some(parent) = function_node.parent() else {
        return false;
    };
    if parent.kind() != "decorated_definition" {
        return false;
    }
    let mut cursor = parent.walk();
    for child in parent.named_children(&mut cursor) {
        if child.kind() == "decorator" {
            let text = node_text(child, source);
            if text.contains("staticmethod") || text.contains("classmethod") {
                return true;
            }
        }
    }
    false
}

/// Whether a name is public by Python convention: no leading underscore,
/// or a dunder.
pub fn is_public_name(name: &str) -> bool {
    !name.starts_with('_') || (name.starts_with("__") && name.ends_with("__") && name.len() > 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
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
    fn test_superclasses() {
        let source = "class Dog(Animal, pets.Companion, metaclass=Meta):\n    pass\n";
        let tree = parse(source);
        let class = find_kind(tree.root_node(), "class_definition").unwrap();
        let supers = extract_superclasses(class, source);
        let names: Vec<&str> = supers.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["Animal", "Companion"]);
    }

    #[test]
    fn test_return_type() {
        let source = "def f() -> int:\n    return 1\n";
        let tree = parse(source);
        let func = find_kind(tree.root_node(), "function_definition").unwrap();
        assert_eq!(extract_return_type(func, source).as_deref(), Some("int"));
    }

    #[test]
    fn test_static_decorator() {
        let source = "class A:\n    @staticmethod\n    def s():\n        pass\n    def m(self):\n        pass\n";
        let tree = parse(source);
        let mut funcs = Vec::new();
        fn gather<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
            if node.kind() == "function_definition" {
                out.push(node);
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                gather(child, out);
            }
        }
        gather(tree.root_node(), &mut funcs);
        assert_eq!(funcs.len(), 2);
        assert!(has_static_decorator(funcs[0], source));
        assert!(!has_static_decorator(funcs[1], source));
    }

    #[test]
    fn test_public_name_convention() {
        assert!(is_public_name("foo"));
        assert!(is_public_name("__init__"));
        assert!(!is_public_name("_internal"));
        assert!(!is_public_name("__mangled"));
    }
}
