//! Pipeline configuration.
//!
//! Deserializable with serde so the embedding application can load it
//! from whatever format it keeps its settings in; every field has a
//! default, and `validate()` catches out-of-range values up front.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::semantic::{DEFAULT_MODEL, DEFAULT_THRESHOLD};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("semantic.threshold must be within [0.0, 1.0], got {0}")]
    InvalidThreshold(f32),

    #[error("semantic.model must not be empty")]
    EmptyModelName,
}

/// Configuration for the semantic relevance filter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Embedding model name (e.g. "all-MiniLM-L6-v2").
    #[serde(default = "default_model")]
    pub model: String,

    /// Minimum similarity to keep a listing [0.0, 1.0].
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Drop accessory/refurbished/bundle/warranty listings before scoring.
    #[serde(default = "default_exclude_non_product")]
    pub exclude_non_product: bool,

    /// Keep at most this many listings per source after ranking.
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Where to cache downloaded model files; a temp directory if unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            exclude_non_product: true,
            max_results: None,
            cache_dir: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_exclude_non_product() -> bool {
    true
}

/// What the pipeline does when the embedding backend is unavailable.
/// Retry policy belongs to the caller either way; the core never retries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingFailurePolicy {
    /// Surface the error and abort the request.
    #[default]
    Fail,
    /// Continue with exclusion-filtered but unscored listings.
    FallBackUnfiltered,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub on_embedding_failure: EmbeddingFailurePolicy,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.semantic.threshold) {
            return Err(ConfigError::InvalidThreshold(self.semantic.threshold));
        }
        if self.semantic.model.trim().is_empty() {
            return Err(ConfigError::EmptyModelName);
        }
        Ok(())
    }
}
