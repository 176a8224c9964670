//! Rust symbol-factory helpers.

use crate::parsing::capture::node_text;
use crate::types::SymbolName;
use tree_sitter::Node;

/// Whether an item carries a `pub` visibility modifier.
pub fn is_pub(node: Node<'_>, source: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "visibility_modifier" {
            return node_text(child, source).starts_with("pub");
        }
    }
    false
}

/// Whether a function has a `self` receiver (associated functions without
/// one are static).
pub fn has_self_receiver(function_node: Node<'_>) -> bool {
    let Some(parameters) = function_node.child_by_field_name("parameters") else {
        return false;
    };
    let mut cursor = parameters.walk();
    parameters
        .named_children(&mut cursor)
        .any(|p| p.kind() == "self_parameter")
}

/// `-> T` return type text.
pub fn extract_return_type(function_node: Node<'_>, source: &str) -> Option<String> {
    function_node
        .child_by_field_name("return_type")
        .map(|n| node_text(n, source).trim().to_string())
}

/// Base type name of a possibly generic or qualified type: `a::B<T>` → `B`.
pub fn base_type_name(text: &str) -> &str {
    let base = text.split('<').next().unwrap_or(text);
    base.rsplit("::").next().unwrap_or(base).trim()
}

/// Supertraits from `trait A: B + C`.
pub fn extract_supertraits(trait_node: Node<'_>, source: &str) -> Vec<SymbolName> {
    let mut out = Vec::new();
    let mut cursor = trait_node.walk();
    for child in trait_node.named_children(&mut cursor) {
        if child.kind() == "trait_bounds" {
            let mut inner = child.walk();
            for bound in child.named_children(&mut inner) {
                if bound.kind() == "type_identifier" || bound.kind() == "scoped_type_identifier" {
                    out.push(SymbolName::new(base_type_name(node_text(bound, source))));
                }
            }
        }
    }
    out
}

/// One name bound by a `use` tree.
#[derive(Debug)]
pub struct UseTarget<'t> {
    /// Node the import record anchors to: the alias when present, the
    /// name segment otherwise.
    pub anchor: Node<'t>,
    /// Full module path including the item: `crate::io::Reader`.
    pub path: String,
    /// Name the import binds in this module.
    pub bound_name: String,
    /// Source name when the binding is aliased.
    pub original: Option<String>,
    /// `use path::*`.
    pub wildcard: bool,
}

/// Flatten a `use` declaration's tree into individual bindings.
/// Handles plain paths, `as` aliases, `{}` groups, and globs.
pub fn parse_use_tree<'t>(use_node: Node<'t>, source: &str) -> Vec<UseTarget<'t>> {
    let mut out = Vec::new();
    if let Some(argument) = use_node.child_by_field_name("argument") {
        walk_use(argument, source, "", &mut out);
    }
    out
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}::{segment}")
    }
}

fn walk_use<'t>(node: Node<'t>, source: &str, prefix: &str, out: &mut Vec<UseTarget<'t>>) {
    match node.kind() {
        "identifier" | "type_identifier" | "crate" | "super" | "self" => {
            let text = node_text(node, source);
            // `use a::{self}` binds the module itself under its last name.
            if text == "self" && !prefix.is_empty() {
                let name = prefix.rsplit("::").next().unwrap_or(prefix).to_string();
                out.push(UseTarget {
                    anchor: node,
                    path: prefix.to_string(),
                    bound_name: name,
                    original: None,
                    wildcard: false,
                });
            } else {
                out.push(UseTarget {
                    anchor: node,
                    path: join(prefix, text),
                    bound_name: text.to_string(),
                    original: None,
                    wildcard: false,
                });
            }
        }
        "scoped_identifier" => {
            let path_prefix = node
                .child_by_field_name("path")
                .map(|p| join(prefix, node_text(p, source)))
                .unwrap_or_else(|| prefix.to_string());
            if let Some(name) = node.child_by_field_name("name") {
                walk_use(name, source, &path_prefix, out);
            }
        }
        "use_as_clause" => {
            let mut inner = Vec::new();
            if let Some(path) = node.child_by_field_name("path") {
                walk_use(path, source, prefix, &mut inner);
            }
            let alias = node.child_by_field_name("alias");
            for mut target in inner {
                if let Some(alias_node) = alias {
                    target.original = Some(target.bound_name.clone());
                    target.bound_name = node_text(alias_node, source).to_string();
                    target.anchor = alias_node;
                }
                out.push(target);
            }
        }
        "use_list" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                walk_use(child, source, prefix, out);
            }
        }
        "scoped_use_list" => {
            let new_prefix = node
                .child_by_field_name("path")
                .map(|p| join(prefix, node_text(p, source)))
                .unwrap_or_else(|| prefix.to_string());
            if let Some(list) = node.child_by_field_name("list") {
                walk_use(list, source, &new_prefix, out);
            }
        }
        "use_wildcard" => {
            let mut cursor = node.walk();
            let path = node
                .named_children(&mut cursor)
                .next()
                .map(|p| join(prefix, node_text(p, source)))
                .unwrap_or_else(|| prefix.to_string());
            out.push(UseTarget {
                anchor: node,
                path,
                bound_name: String::from("*"),
                original: None,
                wildcard: true,
            });
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn first_use<'t>(tree: &'t tree_sitter::Tree) -> Node<'t> {
        let root = tree.root_node();
        let mut cursor = root.walk();
        let found = root
            .named_children(&mut cursor)
            .find(|c| c.kind() == "use_declaration")
            .unwrap();
        found
    }

    #[test]
    fn test_plain_use() {
        let source = "use crate::io::Reader;\n";
        let tree = parse(source);
        let targets = parse_use_tree(first_use(&tree), source);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].path, "crate::io::Reader");
        assert_eq!(targets[0].bound_name, "Reader");
        assert!(targets[0].original.is_none());
    }

    #[test]
    fn test_aliased_use() {
        let source = "use std::collections::HashMap as Map;\n";
        let tree = parse(source);
        let targets = parse_use_tree(first_use(&tree), source);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].bound_name, "Map");
        assert_eq!(targets[0].original.as_deref(), Some("HashMap"));
        assert_eq!(targets[0].path, "std::collections::HashMap");
    }

    #[test]
    fn test_grouped_use() {
        let source = "use crate::model::{ClassDef, EnumDef as E};\n";
        let tree = parse(source);
        let targets = parse_use_tree(first_use(&tree), source);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].path, "crate::model::ClassDef");
        assert_eq!(targets[1].bound_name, "E");
        assert_eq!(targets[1].original.as_deref(), Some("EnumDef"));
    }

    #[test]
    fn test_wildcard_use() {
        let source = "use crate::prelude::*;\n";
        let tree = parse(source);
        let targets = parse_use_tree(first_use(&tree), source);
        assert_eq!(targets.len(), 1);
        assert!(targets[0].wildcard);
        assert_eq!(targets[0].path, "crate::prelude");
    }

    #[test]
    fn test_self_receiver() {
        let source = "impl P { fn m(&self) {} fn s() {} }\n";
        let tree = parse(source);
        let mut funcs = Vec::new();
        fn gather<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
            if node.kind() == "function_item" {
                out.push(node);
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                gather(child, out);
            }
        }
        gather(tree.root_node(), &mut funcs);
        assert_eq!(funcs.len(), 2);
        assert!(has_self_receiver(funcs[0]));
        assert!(!has_self_receiver(funcs[1]));
    }

    #[test]
    fn test_base_type_name() {
        assert_eq!(base_type_name("Vec<T>"), "Vec");
        assert_eq!(base_type_name("crate::io::Reader"), "Reader");
        assert_eq!(base_type_name("Display"), "Display");
    }
}
