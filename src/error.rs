//! Error types for the indexing system
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages. Fatal conditions surface
//! synchronously from `build_index`/`update_file`; everything recoverable
//! is carried as diagnostics on the per-file index instead.

use crate::types::{FilePath, Location};
use thiserror::Error;

/// Main error type for indexing operations
#[derive(Error, Debug)]
pub enum IndexError {
    /// Configuration errors: fatal at startup, no partial index is built
    #[error("Unknown capture name '{name}' in {language} query: {reason}")]
    UnknownCapture {
        language: String,
        name: String,
        reason: String,
    },

    #[error("Capture '{name}' has no handler registered for {language}")]
    MissingHandler { language: String, name: String },

    #[error("Required capture '{name}' is never emitted by the {language} query")]
    MissingRequiredCapture { language: String, name: String },

    #[error("Language '{language}' registered twice")]
    DuplicateLanguage { language: String },

    #[error("Failed to compile {language} query: {reason}")]
    QueryCompile { language: String, reason: String },

    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    /// File-level errors
    #[error(
        "File '{path}' is {size} bytes, above the {limit}-byte parser limit; it was not indexed"
    )]
    FileTooLarge {
        path: FilePath,
        size: usize,
        limit: usize,
    },

    #[error("File '{path}' is not valid UTF-8")]
    InvalidUtf8 { path: FilePath },

    #[error("Parser returned no tree for '{path}'")]
    ParseFailed { path: FilePath },

    #[error("File '{path}' not found in the project index")]
    FileNotIndexed { path: FilePath },

    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl IndexError {
    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::UnknownCapture { .. } | Self::MissingRequiredCapture { .. } => vec![
                "Check the query file against the capture schema",
                "Capture names follow @family.entity with at most four segments",
            ],
            Self::MissingHandler { .. } => vec![
                "Every capture a query emits needs an entry in the language's handler table",
            ],
            Self::FileTooLarge { .. } => vec![
                "Raise max_file_size in the settings if the file is legitimate",
                "Generated or vendored files are usually better excluded",
            ],
            Self::InvalidUtf8 { .. } => {
                vec!["Re-encode the file as UTF-8; other encodings are not supported"]
            }
            _ => vec![],
        }
    }

    /// Whether this error leaves the project index untouched.
    ///
    /// All errors do: an index is swapped in only after finalize succeeds.
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownCapture { .. }
                | Self::MissingHandler { .. }
                | Self::MissingRequiredCapture { .. }
                | Self::DuplicateLanguage { .. }
                | Self::QueryCompile { .. }
                | Self::ParserInit { .. }
                | Self::ConfigError { .. }
        )
    }
}

/// Severity of a non-fatal finding attached to a per-file index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal finding recorded during indexing.
///
/// Parse errors, orphan attachments, and re-export cycles all land here;
/// the index is still produced.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_fatal() {
        let err = IndexError::MissingHandler {
            language: "python".into(),
            name: "@definition.class".into(),
        };
        assert!(err.is_fatal_configuration());

        let err = IndexError::FileTooLarge {
            path: FilePath::new("big.js"),
            size: 40_000,
            limit: 32_768,
        };
        assert!(!err.is_fatal_configuration());
    }

    #[test]
    fn test_recovery_suggestions_present_for_schema_errors() {
        let err = IndexError::UnknownCapture {
            language: "rust".into(),
            name: "@definition.widget".into(),
            reason: "not in schema".into(),
        };
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn test_diagnostic_builder() {
        let location = Location::new(FilePath::new("a.py"), 1, 1, 1, 5);
        let diag = Diagnostic::warning("orphan method 'speak'").at(location.clone());
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.location, Some(location));
    }
}
