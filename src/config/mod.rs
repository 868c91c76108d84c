//! Configuration
//!
//! `MapMakerConfig` is assembled by the `config` crate from built-in defaults,
//! the global config file, a root-local `.mapmaker.toml` and `MAPMAKER__*`
//! environment variables, in increasing order of precedence.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod rules;
pub mod sources;
pub mod workspace;

pub use facade::{ConfigLoader, WORKSPACE_CONFIG_FILE};
pub use paths::xdg_root as xdg;
pub use rules::{RootRule, RootRules, GENERIC_RULE};
pub use workspace::storage_paths::StorageConfig;

use crate::logging::LoggingConfig;
use crate::persona::{DEFAULT_CONFIDENCE, DEFAULT_LANGUAGE, SCHEMA_VERSION};
use crate::provider::ProviderConfig;
use crate::sampler::{SAMPLE_BYTES, SAMPLE_LIMIT};
use crate::tree::MIN_TEXT_FILES;
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapMakerConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Rule table keyed by the first path segment under the root
    #[serde(default)]
    pub root_constraints: RootRules,

    #[serde(default)]
    pub schema: SchemaConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MapMakerConfig {
    /// Validate settings that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<(), String> {
        self.provider.validate()?;
        self.processing.validate()?;
        if !(0.0..=1.0).contains(&self.schema.confidence) {
            return Err(format!(
                "schema.confidence must be between 0.0 and 1.0, got {}",
                self.schema.confidence
            ));
        }
        Ok(())
    }
}

/// Traversal and sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Descend into symlinked directories
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Process sibling folders concurrently
    #[serde(default)]
    pub allow_parallel: bool,

    /// Concurrent siblings per recursion level when parallel
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    #[serde(default = "default_min_text_files")]
    pub min_text_files: usize,

    /// Files sampled from a LEAF folder
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    /// Bytes read from each sampled file
    #[serde(default = "default_sample_bytes")]
    pub sample_bytes: usize,

    /// Characters of each file included in a prompt
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,

    /// Cap on raw-text descriptions
    #[serde(default = "default_description_chars")]
    pub description_chars: usize,

    /// Confidence recorded when a persona rests on fallback output or no file text
    #[serde(default = "default_low_confidence")]
    pub low_confidence: f64,
}

fn default_max_parallel() -> usize {
    8
}

fn default_min_text_files() -> usize {
    MIN_TEXT_FILES
}

fn default_sample_limit() -> usize {
    SAMPLE_LIMIT
}

fn default_sample_bytes() -> usize {
    SAMPLE_BYTES
}

fn default_snippet_chars() -> usize {
    500
}

fn default_description_chars() -> usize {
    800
}

fn default_low_confidence() -> f64 {
    0.35
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            allow_parallel: false,
            max_parallel: default_max_parallel(),
            min_text_files: default_min_text_files(),
            sample_limit: default_sample_limit(),
            sample_bytes: default_sample_bytes(),
            snippet_chars: default_snippet_chars(),
            description_chars: default_description_chars(),
            low_confidence: default_low_confidence(),
        }
    }
}

impl ProcessingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_parallel == 0 {
            return Err("processing.max_parallel must be at least 1".to_string());
        }
        if self.min_text_files == 0 {
            return Err("processing.min_text_files must be at least 1".to_string());
        }
        if self.sample_bytes == 0 || self.snippet_chars == 0 || self.description_chars == 0 {
            return Err(
                "processing sample_bytes, snippet_chars and description_chars must be positive"
                    .to_string(),
            );
        }
        if !(0.0..=1.0).contains(&self.low_confidence) {
            return Err(format!(
                "processing.low_confidence must be between 0.0 and 1.0, got {}",
                self.low_confidence
            ));
        }
        Ok(())
    }
}

/// Document-level defaults written into every persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_schema_version")]
    pub version: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            version: default_schema_version(),
            language: default_language(),
            confidence: default_confidence(),
        }
    }
}
