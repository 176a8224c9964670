//! Capture handler dispatch.
//!
//! One handler per capture name, per language. Dispatch is total: a query
//! may only emit capture names its language registered a handler for, and
//! that is validated once at startup, not discovered mid-file.

use super::builder::DefinitionBuilder;
use super::capture::Capture;
use super::context::ProcessingContext;
use crate::capture::split_capture;
use crate::error::{IndexError, IndexResult};
use crate::scope::ScopeKind;
use crate::types::SymbolName;
use std::collections::HashMap;

pub type HandlerFn = fn(&Capture<'_>, &mut DefinitionBuilder, &ProcessingContext<'_>);

/// Capture-name to handler table for one language.
pub struct HandlerMap {
    handlers: HashMap<&'static str, HandlerFn>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, handler: HandlerFn) {
        self.handlers.insert(name, handler);
    }

    pub fn get(&self, name: &str) -> Option<HandlerFn> {
        self.handlers.get(name).copied()
    }

    /// Every capture name the query emits must have a handler.
    pub fn validate_totality(&self, language: &str, emitted: &[String]) -> IndexResult<()> {
        for name in emitted {
            if !self.handlers.contains_key(name.as_str()) {
                return Err(IndexError::MissingHandler {
                    language: language.to_string(),
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handler for every `@scope.*` capture. Inserts the scope and, for
/// class-like scopes, labels it with the defining construct's name so later
/// phases can answer "which class am I in" without tree walks.
pub fn handle_scope(capture: &Capture<'_>, builder: &mut DefinitionBuilder, ctx: &ProcessingContext<'_>) {
    let (_, entity, _) = split_capture(capture.name);
    let kind = match entity {
        "module" => ScopeKind::Module,
        "function" => ScopeKind::Function,
        "class" => ScopeKind::Class,
        "block" => ScopeKind::Block,
        "comprehension" => ScopeKind::Comprehension,
        "lambda" => ScopeKind::Lambda,
        _ => return,
    };

    let range = capture.location(ctx.file_path());
    let scope_id = builder.add_scope(kind, range);

    if kind == ScopeKind::Class {
        // `name` covers classes/traits; `type` covers Rust impl blocks,
        // where the Self type is the class identity.
        let label = capture
            .node
            .child_by_field_name("name")
            .or_else(|| capture.node.child_by_field_name("type"))
            .map(|n| ctx.text(n));
        if let Some(label) = label {
            // Normalize `path::Type<T>` down to the bare type name so the
            // label matches the class record's name.
            let base = label.split('<').next().unwrap_or(label);
            let base = base.rsplit("::").next().unwrap_or(base).trim();
            builder.label_scope(&scope_id, SymbolName::new(base));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Capture<'_>, _: &mut DefinitionBuilder, _: &ProcessingContext<'_>) {}

    #[test]
    fn test_totality_validation() {
        let mut map = HandlerMap::new();
        map.register("@definition.class", noop);

        let ok = vec!["@definition.class".to_string()];
        assert!(map.validate_totality("python", &ok).is_ok());

        let missing = vec!["@definition.class".to_string(), "@reference.call".to_string()];
        let err = map.validate_totality("python", &missing);
        assert!(matches!(err, Err(IndexError::MissingHandler { name, .. }) if name == "@reference.call"));
    }
}
