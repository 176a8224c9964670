//! Configuration module for the indexing system.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CARTOGRAPH_` and use double
//! underscores to separate nested levels:
//! - `CARTOGRAPH_INDEXING__MAX_FILE_SIZE=65536` sets `indexing.max_file_size`
//! - `CARTOGRAPH_RESOLUTION__MAX_REEXPORT_DEPTH=4` sets `resolution.max_reexport_depth`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Indexing configuration
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Cross-file resolution configuration
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Language-specific settings
    #[serde(default = "default_languages")]
    pub languages: HashMap<String, LanguageConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Hard limit on individual source file size, in bytes.
    /// Files above this are refused with a typed error, mirroring the
    /// parser's own limitation.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResolutionConfig {
    /// How many re-export hops to follow before reporting a cycle.
    #[serde(default = "default_max_reexport_depth")]
    pub max_reexport_depth: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    /// Whether this language is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// File extensions for this language
    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_max_file_size() -> usize {
    32 * 1024
}
fn default_max_reexport_depth() -> usize {
    8
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            indexing: IndexingConfig::default(),
            resolution: ResolutionConfig::default(),
            languages: default_languages(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_reexport_depth: default_max_reexport_depth(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    let mut langs = HashMap::new();

    langs.insert(
        "rust".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["rs".to_string()],
        },
    );

    langs.insert(
        "python".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["py".to_string(), "pyi".to_string()],
        },
    );

    langs.insert(
        "javascript".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["js".to_string(), "jsx".to_string(), "mjs".to_string()],
        },
    );

    langs.insert(
        "typescript".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["ts".to_string(), "tsx".to_string()],
        },
    );

    langs
}

impl Settings {
    /// Load settings from defaults, `cartograph.toml` if present, and
    /// `CARTOGRAPH_` environment variables, in increasing precedence.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("cartograph.toml"))
            .merge(Env::prefixed("CARTOGRAPH_").split("__"))
            .extract()
    }

    /// Load settings from an explicit TOML file path.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CARTOGRAPH_").split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.indexing.max_file_size, 32 * 1024);
        assert_eq!(settings.resolution.max_reexport_depth, 8);
        assert!(settings.languages.contains_key("python"));
        assert!(settings.languages.contains_key("typescript"));
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_language_extensions() {
        let settings = Settings::default();
        let ts = &settings.languages["typescript"];
        assert!(ts.enabled);
        assert!(ts.extensions.iter().any(|e| e == "tsx"));
    }
}
