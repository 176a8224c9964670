//! Canonical capture schema.
//!
//! The schema is the contract between grammar-specific query files and the
//! handler tables: a fixed registry of recognized capture names, their
//! well-formedness rules, and which of them every language query must emit.
//! It is independent of any grammar; the query text is data validated
//! against it at startup.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Capture families recognized by the schema.
pub const FAMILIES: &[&str] = &["scope", "definition", "reference", "import", "export"];

/// Captures every language query must emit to produce a valid index.
pub const REQUIRED: &[&str] = &[
    "@scope.module",
    "@scope.function",
    "@scope.class",
    "@definition.function",
    "@definition.class",
    "@definition.method",
    "@reference.call",
];

/// Recognized but not mandatory.
pub const OPTIONAL: &[&str] = &[
    "@scope.block",
    "@scope.lambda",
    "@scope.comprehension",
    "@scope.module.inline",
    "@definition.interface",
    "@definition.enum",
    "@definition.type_alias",
    "@definition.variable",
    "@definition.parameter",
    "@definition.property",
    "@definition.property.signature",
    "@definition.method.signature",
    "@definition.method.default",
    "@definition.function.anonymous",
    "@definition.impl",
    "@reference.call.method",
    "@reference.call.scoped",
    "@reference.constructor",
    "@reference.variable",
    "@reference.type",
    "@reference.global",
    "@reference.nonlocal",
    "@import.named",
    "@import.named.aliased",
    "@import.default",
    "@import.namespace",
    "@import.from",
    "@import.use",
    "@export.statement",
];

/// Maximum number of dot-separated segments after the `@`.
pub const MAX_DEPTH: usize = 4;

fn name_rule() -> &'static Regex {
    static RULE: OnceLock<Regex> = OnceLock::new();
    RULE.get_or_init(|| Regex::new(r"^@[a-z_]+(\.[a-z_]+){1,3}$").expect("capture name rule"))
}

/// The capture schema: recognized names plus their well-formedness rules.
#[derive(Debug, Clone)]
pub struct CaptureSchema {
    required: BTreeSet<&'static str>,
    optional: BTreeSet<&'static str>,
}

impl CaptureSchema {
    pub fn new() -> Self {
        Self {
            required: REQUIRED.iter().copied().collect(),
            optional: OPTIONAL.iter().copied().collect(),
        }
    }

    pub fn required(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required.iter().copied()
    }

    /// Whether `name` is a recognized, well-formed capture name.
    pub fn is_valid(&self, name: &str) -> bool {
        self.errors(name).is_empty()
    }

    /// All validation errors for `name`. Empty means valid.
    pub fn errors(&self, name: &str) -> Vec<String> {
        let mut errors = Vec::new();

        if !name.starts_with('@') {
            errors.push(format!("capture '{name}' must start with '@'"));
            return errors;
        }

        let segments: Vec<&str> = name[1..].split('.').collect();
        if segments.len() > MAX_DEPTH {
            errors.push(format!(
                "capture '{name}' has {} segments, maximum is {MAX_DEPTH}",
                segments.len()
            ));
        }

        if !name_rule().is_match(name) {
            errors.push(format!(
                "capture '{name}' does not match @family.entity[.qualifier] syntax"
            ));
        }

        if let Some(family) = segments.first()
            && !FAMILIES.contains(family)
        {
            errors.push(format!(
                "capture '{name}' has unknown family '{family}' (known: {})",
                FAMILIES.join(", ")
            ));
        }

        if errors.is_empty() && !self.required.contains(name) && !self.optional.contains(name) {
            errors.push(format!("capture '{name}' is not in the schema registry"));
        }

        errors
    }

    /// Validate the set of capture names a query emits: each must be known,
    /// and every required capture must appear.
    pub fn validate_query_captures(
        &self,
        language: &str,
        emitted: &[String],
    ) -> Result<(), crate::error::IndexError> {
        for name in emitted {
            let errors = self.errors(name);
            if !errors.is_empty() {
                return Err(crate::error::IndexError::UnknownCapture {
                    language: language.to_string(),
                    name: name.clone(),
                    reason: errors.join("; "),
                });
            }
        }

        for required in &self.required {
            if !emitted.iter().any(|name| name == required) {
                return Err(crate::error::IndexError::MissingRequiredCapture {
                    language: language.to_string(),
                    name: (*required).to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Default for CaptureSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a capture name into (family, entity, qualifiers).
///
/// Callers must only pass names the schema accepted.
pub fn split_capture(name: &str) -> (&str, &str, &str) {
    let body = name.strip_prefix('@').unwrap_or(name);
    let mut parts = body.splitn(3, '.');
    let family = parts.next().unwrap_or("");
    let entity = parts.next().unwrap_or("");
    let qualifier = parts.next().unwrap_or("");
    (family, entity, qualifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_captures_are_valid() {
        let schema = CaptureSchema::new();
        for name in REQUIRED {
            assert!(schema.is_valid(name), "required capture {name} invalid");
        }
    }

    #[test]
    fn test_optional_captures_are_valid() {
        let schema = CaptureSchema::new();
        for name in OPTIONAL {
            assert!(schema.is_valid(name), "optional capture {name} invalid");
        }
    }

    #[test]
    fn test_malformed_prefix() {
        let schema = CaptureSchema::new();
        let errors = schema.errors("definition.class");
        assert!(errors.iter().any(|e| e.contains("must start with '@'")));
    }

    #[test]
    fn test_unknown_family() {
        let schema = CaptureSchema::new();
        let errors = schema.errors("@widget.class");
        assert!(errors.iter().any(|e| e.contains("unknown family")));
    }

    #[test]
    fn test_excessive_depth() {
        let schema = CaptureSchema::new();
        let errors = schema.errors("@definition.class.a.b.c");
        assert!(errors.iter().any(|e| e.contains("segments")));
    }

    #[test]
    fn test_unregistered_name() {
        let schema = CaptureSchema::new();
        assert!(!schema.is_valid("@definition.gadget"));
    }

    #[test]
    fn test_bare_family_rejected() {
        // The regex requires at least one entity segment.
        let schema = CaptureSchema::new();
        assert!(!schema.is_valid("@definition"));
    }

    #[test]
    fn test_validate_query_captures_totality() {
        let schema = CaptureSchema::new();
        let mut emitted: Vec<String> = REQUIRED.iter().map(|s| s.to_string()).collect();
        assert!(schema.validate_query_captures("python", &emitted).is_ok());

        emitted.pop();
        let err = schema.validate_query_captures("python", &emitted);
        assert!(matches!(
            err,
            Err(crate::error::IndexError::MissingRequiredCapture { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown() {
        let schema = CaptureSchema::new();
        let emitted = vec!["@definition.gadget".to_string()];
        let err = schema.validate_query_captures("rust", &emitted);
        assert!(matches!(
            err,
            Err(crate::error::IndexError::UnknownCapture { .. })
        ));
    }

    #[test]
    fn test_split_capture() {
        assert_eq!(
            split_capture("@reference.call.method"),
            ("reference", "call", "method")
        );
        assert_eq!(split_capture("@scope.module"), ("scope", "module", ""));
    }
}
