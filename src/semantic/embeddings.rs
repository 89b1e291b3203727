//! Embedding backend for product titles.
//!
//! The `TextEmbedder` trait is the seam between the relevance filter and
//! whatever produces vectors: the default fastembed-backed model here, or
//! a deterministic stub in tests. Requirements on implementations: a fixed
//! dimension per instance, deterministic output for a given input and
//! model version, and batch support so a request costs one round trip per
//! source rather than one per title.

use fastembed::{InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Mutex;

/// Error type for embedding operations. Any of these surfaces to the
/// caller as "embedding backend unavailable"; the core never retries.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("model initialization failed: {0}")]
    InitFailed(String),

    #[error("embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("unknown embedding model: {0}")]
    InvalidModel(String),
}

/// A batchable text-to-vector backend.
pub trait TextEmbedder: Send + Sync {
    /// Fixed output dimension of this backend instance.
    fn dimensions(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed a batch of texts in one backend call.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Wrapper around fastembed's TextEmbedding model.
/// Uses a Mutex because fastembed's embed() requires &mut self.
pub struct EmbeddingModel {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimensions: usize,
}

impl EmbeddingModel {
    /// Create a new embedding model with the given name.
    ///
    /// The model files are downloaded on first use and cached under
    /// `cache_dir` (a temp-dir subdirectory when not given).
    pub fn new(model_name: &str, cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let model_enum = Self::parse_model_name(model_name)?;

        let cache =
            cache_dir.unwrap_or_else(|| std::env::temp_dir().join("pricematch-models"));
        std::fs::create_dir_all(&cache).map_err(|e| {
            EmbeddingError::InitFailed(format!("failed to create model cache directory: {}", e))
        })?;

        let options = InitOptions::new(model_enum)
            .with_cache_dir(cache)
            .with_show_download_progress(false);

        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        let dimensions = Self::probe_dimensions(&mut model)?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: model_name.to_string(),
            dimensions,
        })
    }

    /// Get the model name.
    pub fn name(&self) -> &str {
        &self.model_name
    }

    /// Parse model name string to fastembed enum.
    fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
        match name.to_lowercase().as_str() {
            "all-minilm-l6-v2" | "allminiml6v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
            "all-minilm-l6-v2-q" | "allminiml6v2q" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2Q),
            "bge-small-en-v1.5" | "bgesmallenv15" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
            "bge-small-en-v1.5-q" | "bgesmallenv15q" => Ok(fastembed::EmbeddingModel::BGESmallENV15Q),
            "bge-base-en-v1.5" | "bgebaseenv15" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
            "bge-base-en-v1.5-q" | "bgebaseenv15q" => Ok(fastembed::EmbeddingModel::BGEBaseENV15Q),
            "bge-large-en-v1.5" | "bgelargeenv15" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
            "bge-large-en-v1.5-q" | "bgelargeenv15q" => Ok(fastembed::EmbeddingModel::BGELargeENV15Q),
            _ => Err(EmbeddingError::InvalidModel(format!(
                "unknown model: {}. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5 (add -q suffix for quantized)",
                name
            ))),
        }
    }

    /// Probe the model to determine embedding dimensions.
    fn probe_dimensions(model: &mut TextEmbedding) -> Result<usize, EmbeddingError> {
        let test_embeddings = model
            .embed(vec!["probe"], None)
            .map_err(|e| EmbeddingError::InitFailed(format!("failed to probe dimensions: {}", e)))?;

        test_embeddings
            .first()
            .map(|v| v.len())
            .ok_or_else(|| EmbeddingError::InitFailed("model returned no embedding".to_string()))
    }
}

impl TextEmbedder for EmbeddingModel {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut model = self.model.lock().map_err(|e| {
            EmbeddingError::EmbeddingFailed(format!("failed to acquire model lock: {}", e))
        })?;

        let embeddings = model
            .embed(vec![text], None)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("no embedding returned".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut model = self.model.lock().map_err(|e| {
            EmbeddingError::EmbeddingFailed(format!("failed to acquire model lock: {}", e))
        })?;

        let embeddings = model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::EmbeddingFailed(format!(
                "backend returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require model download - run with --ignored
    #[test]
    #[ignore = "requires model download"]
    fn test_model_creation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let model = EmbeddingModel::new("all-MiniLM-L6-v2", Some(temp_dir.path().to_path_buf()));
        assert!(model.is_ok());

        let model = model.unwrap();
        assert_eq!(model.name(), "all-MiniLM-L6-v2");
        assert_eq!(model.dimensions(), 384); // MiniLM produces 384-dim embeddings
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_embedding_generation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let model =
            EmbeddingModel::new("all-MiniLM-L6-v2", Some(temp_dir.path().to_path_buf())).unwrap();

        let embedding = model.embed("apple iphone 15 (128 gb) - black").unwrap();
        assert_eq!(embedding.len(), 384);

        // Check that values are normalized (L2 norm ~= 1)
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_batch_matches_single() {
        let temp_dir = tempfile::tempdir().unwrap();
        let model =
            EmbeddingModel::new("all-MiniLM-L6-v2", Some(temp_dir.path().to_path_buf())).unwrap();

        let titles = vec![
            "apple iphone 15 (128 gb) - black".to_string(),
            "samsung galaxy s24 256gb".to_string(),
        ];
        let batch = model.embed_batch(&titles).unwrap();
        assert_eq!(batch.len(), 2);

        let single = model.embed(&titles[0]).unwrap();
        // Deterministic for a given model version.
        assert_eq!(batch[0], single);
    }

    #[test]
    fn test_invalid_model_name() {
        let result = EmbeddingModel::new("nonexistent-model", None);
        assert!(matches!(result, Err(EmbeddingError::InvalidModel(_))));
    }
}
