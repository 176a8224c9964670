//! Two-phase type tracking.
//!
//! Phase 1 resolves explicit annotations, phase 2 infers types from
//! initializers, phase 3 turns assignments into flow edges and keeps the
//! per-variable current type up to date. Variables whose declaration is
//! unknown are skipped rather than guessed.

use crate::model::SingleFileIndex;
use crate::types::{DefKind, FilePath, Location, LocationKey, SymbolId, SymbolName, TypeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Initialization,
    Assignment,
    Narrowing,
    Widening,
}

/// One edge in the type-flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFlowEdge {
    pub from_type: Option<TypeId>,
    pub to_type: TypeId,
    pub location: Location,
    pub kind: FlowKind,
}

/// Output of the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeResolution {
    pub variable_types: HashMap<SymbolId, TypeId>,
    pub expression_types: HashMap<LocationKey, TypeId>,
    pub type_flows: Vec<TypeFlowEdge>,
}

/// A parsed annotation: base name plus generic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    pub base: String,
    pub generics: Vec<String>,
}

/// Parse `T`, `T<U, V>`, `T[]`, and nested angle brackets.
pub fn parse_type_text(text: &str) -> ParsedType {
    let text = text.trim();

    if let Some(inner) = text.strip_suffix("[]") {
        return ParsedType {
            base: "Array".to_string(),
            generics: vec![inner.trim().to_string()],
        };
    }

    let Some(open) = text.find(['<', '[']) else {
        return ParsedType {
            base: text.to_string(),
            generics: Vec::new(),
        };
    };
    let close_char = if text.as_bytes()[open] == b'<' { '>' } else { ']' };
    let Some(close) = text.rfind(close_char) else {
        return ParsedType {
            base: text.to_string(),
            generics: Vec::new(),
        };
    };

    let base = text[..open].trim().to_string();
    let inner = &text[open + 1..close];

    // Split generics on top-level commas only.
    let mut generics = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '<' | '[' | '(' => {
                depth += 1;
                current.push(c);
            }
            '>' | ']' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                if !current.trim().is_empty() {
                    generics.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        generics.push(current.trim().to_string());
    }

    ParsedType { base, generics }
}

/// Canonicalize a base type name across the four languages' primitives.
/// Unrecognized names come back unchanged (nominal types).
pub fn canonical_builtin(base: &str) -> Option<&'static str> {
    Some(match base {
        "string" | "str" | "String" | "&str" => "string",
        "number" | "int" | "float" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8"
        | "u16" | "u32" | "u64" | "u128" | "usize" | "f32" | "f64" => "number",
        "boolean" | "bool" => "boolean",
        "void" | "()" => "void",
        "any" => "any",
        "unknown" => "unknown",
        "never" => "never",
        "null" | "None" => "null",
        "undefined" => "undefined",
        "object" => "object",
        "Function" => "Function",
        "Array" | "list" | "Vec" | "tuple" => "Array",
        "Map" | "dict" | "HashMap" | "BTreeMap" => "Map",
        "Set" | "set" | "HashSet" | "BTreeSet" => "Set",
        "Promise" => "Promise",
        _ => return None,
    })
}

/// Tracks declared and inferred types across a set of per-file indices.
pub struct TypeTracker<'a> {
    files: &'a IndexMap<FilePath, SingleFileIndex>,
}

impl<'a> TypeTracker<'a> {
    pub fn new(files: &'a IndexMap<FilePath, SingleFileIndex>) -> Self {
        Self { files }
    }

    pub fn resolve(&self) -> TypeResolution {
        let mut resolution = TypeResolution::default();

        for index in self.files.values() {
            // Per-file working state: the latest known type per name, and
            // each name's declaration id so later assignments update the
            // right variable.
            let mut current: HashMap<SymbolName, TypeId> = HashMap::new();
            let mut decl_ids: HashMap<SymbolName, SymbolId> = HashMap::new();

            // Phase 1: explicit annotations.
            for annotation in &index.type_tracking.annotations {
                let parsed = parse_type_text(&annotation.annotation);
                let type_id = self.resolve_base(&parsed.base, index);
                let symbol_id = SymbolId::for_definition(
                    DefKind::Variable,
                    &annotation.location,
                    Some(&annotation.name),
                );
                resolution
                    .variable_types
                    .insert(symbol_id.clone(), type_id.clone());
                resolution
                    .expression_types
                    .insert(annotation.location.key(), type_id.clone());
                current.insert(annotation.name.clone(), type_id);
                decl_ids.insert(annotation.name.clone(), symbol_id);
            }

            // Phase 2: inference from initializers for unannotated
            // declarations.
            for declaration in &index.type_tracking.declarations {
                let symbol_id = SymbolId::for_definition(
                    DefKind::Variable,
                    &declaration.location,
                    Some(&declaration.name),
                );
                decl_ids
                    .entry(declaration.name.clone())
                    .or_insert_with(|| symbol_id.clone());

                if resolution.variable_types.contains_key(&symbol_id) {
                    // Annotated in phase 1; the annotation wins, but the
                    // initializer still makes an initialization edge.
                    if let Some(type_id) = current.get(&declaration.name) {
                        resolution.type_flows.push(TypeFlowEdge {
                            from_type: None,
                            to_type: type_id.clone(),
                            location: declaration.location.clone(),
                            kind: FlowKind::Initialization,
                        });
                    }
                    continue;
                }

                let Some(initializer) = &declaration.initializer else {
                    continue;
                };
                let Some(type_id) = self.infer_from_text(initializer, index, &current) else {
                    continue;
                };
                resolution
                    .variable_types
                    .insert(symbol_id.clone(), type_id.clone());
                resolution
                    .expression_types
                    .insert(declaration.location.key(), type_id.clone());
                resolution.type_flows.push(TypeFlowEdge {
                    from_type: None,
                    to_type: type_id.clone(),
                    location: declaration.location.clone(),
                    kind: FlowKind::Initialization,
                });
                current.insert(declaration.name.clone(), type_id);
            }

            // Phase 3: assignment flow.
            for assignment in &index.type_tracking.assignments {
                // Declaration unknown: skip, conservatively.
                let Some(decl_id) = decl_ids.get(&assignment.name) else {
                    continue;
                };
                let Some(to_type) = self.infer_from_text(&assignment.value, index, &current)
                else {
                    continue;
                };
                let from_type = current.get(&assignment.name).cloned();

                let kind = match &from_type {
                    None => FlowKind::Initialization,
                    Some(from) if from == &to_type => FlowKind::Assignment,
                    Some(from) if is_top_type(from.as_str()) => FlowKind::Narrowing,
                    Some(_) if is_top_type(to_type.as_str()) => FlowKind::Widening,
                    Some(_) => FlowKind::Assignment,
                };

                resolution.type_flows.push(TypeFlowEdge {
                    from_type,
                    to_type: to_type.clone(),
                    location: assignment.location.clone(),
                    kind,
                });
                resolution
                    .variable_types
                    .insert(decl_id.clone(), to_type.clone());
                current.insert(assignment.name.clone(), to_type);
            }
        }

        resolution
    }

    /// Builtin first, then the file's own declared types, then any file's.
    fn resolve_base(&self, base: &str, local: &SingleFileIndex) -> TypeId {
        if let Some(builtin) = canonical_builtin(base) {
            return TypeId::new(builtin);
        }
        let name = SymbolName::new(base);
        if local.class_by_name(&name).is_some()
            || local.interface_by_name(&name).is_some()
            || local.enums.values().any(|e| e.name == name)
            || local.type_aliases.values().any(|t| t.name == name)
        {
            return TypeId::new(base);
        }
        for index in self.files.values() {
            if index.class_by_name(&name).is_some() || index.interface_by_name(&name).is_some() {
                return TypeId::new(base);
            }
        }
        TypeId::new(base)
    }

    /// The fixed initializer rule set.
    fn infer_from_text(
        &self,
        text: &str,
        local: &SingleFileIndex,
        current: &HashMap<SymbolName, TypeId>,
    ) -> Option<TypeId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if text.starts_with('"') || text.starts_with('\'') || text.starts_with('`') {
            return Some(TypeId::new("string"));
        }
        if text.parse::<f64>().is_ok() {
            return Some(TypeId::new("number"));
        }
        match text {
            "true" | "false" | "True" | "False" => return Some(TypeId::new("boolean")),
            "null" | "None" => return Some(TypeId::new("null")),
            "undefined" => return Some(TypeId::new("undefined")),
            _ => {}
        }
        if let Some(rest) = text.strip_prefix("new ") {
            let ctor: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !ctor.is_empty() {
                return Some(self.resolve_base(&ctor, local));
            }
        }
        if text.starts_with('[') {
            return Some(TypeId::new("Array"));
        }
        if text.starts_with('{') {
            return Some(TypeId::new("object"));
        }

        // Bare identifier: the identifier's current type, if tracked.
        if text.chars().all(|c| c.is_alphanumeric() || c == '_')
            && text.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        {
            return current.get(&SymbolName::new(text)).cloned();
        }

        // Python-style constructor call `ClassName(...)`.
        if let Some(open) = text.find('(') {
            let head = text[..open].trim();
            if head
                .chars()
                .next()
                .is_some_and(|c| c.is_uppercase())
                && head.chars().all(|c| c.is_alphanumeric() || c == '_')
            {
                return Some(self.resolve_base(head, local));
            }
        }

        None
    }
}

fn is_top_type(name: &str) -> bool {
    matches!(name, "any" | "unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let parsed = parse_type_text("number");
        assert_eq!(parsed.base, "number");
        assert!(parsed.generics.is_empty());
    }

    #[test]
    fn test_parse_generics() {
        let parsed = parse_type_text("Map<string, Array<number>>");
        assert_eq!(parsed.base, "Map");
        assert_eq!(parsed.generics, vec!["string", "Array<number>"]);
    }

    #[test]
    fn test_parse_array_suffix() {
        let parsed = parse_type_text("string[]");
        assert_eq!(parsed.base, "Array");
        assert_eq!(parsed.generics, vec!["string"]);
    }

    #[test]
    fn test_canonical_builtins() {
        assert_eq!(canonical_builtin("str"), Some("string"));
        assert_eq!(canonical_builtin("i64"), Some("number"));
        assert_eq!(canonical_builtin("Vec"), Some("Array"));
        assert_eq!(canonical_builtin("dict"), Some("Map"));
        assert_eq!(canonical_builtin("Widget"), None);
    }
}
