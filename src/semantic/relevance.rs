//! Relevance scoring of listings against the user query.
//!
//! The filter runs the exclusion lexicon first (excluded listings are
//! never scored), then embeds the query once and all surviving titles in
//! one batch, scores with cosine similarity, thresholds, ranks and
//! truncates. The embedding backend is lazily initialized on first use
//! and shared, read-only, across concurrent requests.

use std::sync::{Arc, Mutex};

use crate::config::SemanticConfig;
use crate::listing::{Listing, ScoredListing};
use crate::semantic::embeddings::{EmbeddingError, EmbeddingModel, TextEmbedder};
use crate::semantic::exclusions::exclusion_match;

/// Errors from the relevance filter. Data absence is never an error here;
/// only backend failures and caller mistakes are.
#[derive(Debug, thiserror::Error)]
pub enum RelevanceError {
    /// The embedding backend could not be reached or failed to load.
    /// Surfaced to the caller, never retried internally.
    #[error("embedding backend unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),

    #[error("query is empty")]
    EmptyQuery,

    #[error("similarity threshold {0} outside [0.0, 1.0]")]
    InvalidThreshold(f32),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Per-call knobs for `RelevanceFilter::filter`.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Minimum cosine similarity to keep a listing.
    pub threshold: f32,
    /// Drop accessory/refurbished/bundle/warranty listings before scoring.
    pub exclude_non_product: bool,
    /// Keep at most this many listings after ranking.
    pub max_results: Option<usize>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            threshold: crate::semantic::DEFAULT_THRESHOLD,
            exclude_non_product: true,
            max_results: None,
        }
    }
}

/// Scores listings against a query and keeps the relevant ones.
///
/// Lazily initializes the embedding backend on first use. Thread-safe:
/// after initialization the backend handle is only read.
pub struct RelevanceFilter {
    config: SemanticConfig,
    /// Lazily-initialized backend. Mutex<Option<_>> instead of OnceLock
    /// because get_or_try_init is unstable.
    backend: Mutex<Option<Arc<dyn TextEmbedder>>>,
}

impl RelevanceFilter {
    /// Create a filter that loads the configured fastembed model on first
    /// use.
    pub fn new(config: SemanticConfig) -> Self {
        Self {
            config,
            backend: Mutex::new(None),
        }
    }

    /// Create a filter with an already-built backend (tests, alternate
    /// embedding services).
    pub fn with_embedder(config: SemanticConfig, embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            config,
            backend: Mutex::new(Some(embedder)),
        }
    }

    /// Score `listings` against `query` and return the relevant ones,
    /// best first.
    ///
    /// Excluded non-product listings are dropped before scoring and are
    /// never returned, whatever their similarity would have been.
    pub fn filter(
        &self,
        query: &str,
        listings: Vec<Listing>,
        options: &FilterOptions,
    ) -> Result<Vec<ScoredListing>, RelevanceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RelevanceError::EmptyQuery);
        }
        if !(0.0..=1.0).contains(&options.threshold) {
            return Err(RelevanceError::InvalidThreshold(options.threshold));
        }

        let total = listings.len();
        let survivors: Vec<Listing> = if options.exclude_non_product {
            listings
                .into_iter()
                .filter(|listing| match exclusion_match(&listing.title) {
                    Some((category, keyword)) => {
                        log::debug!(
                            "excluded '{}' ({} keyword: '{}')",
                            listing.title,
                            category,
                            keyword
                        );
                        false
                    }
                    None => true,
                })
                .collect()
        } else {
            listings
        };
        let excluded = total - survivors.len();

        if survivors.is_empty() {
            log::info!(
                "relevance filter: 0 of {} listings survived the exclusion pass",
                total
            );
            return Ok(vec![]);
        }

        let backend = self.backend()?;

        // One embedding call for the query, one batch call for the titles.
        let query_embedding = backend.embed(&query.to_lowercase())?;
        let titles: Vec<String> = survivors
            .iter()
            .map(|l| l.title.trim().to_lowercase())
            .collect();
        let title_embeddings = backend.embed_batch(&titles)?;

        let mut scored: Vec<ScoredListing> = survivors
            .into_iter()
            .zip(title_embeddings)
            .filter_map(|(listing, embedding)| {
                let score = cosine_similarity(&query_embedding, &embedding);
                if score >= options.threshold {
                    Some(ScoredListing { listing, score })
                } else {
                    log::debug!("below threshold ({:.4}): '{}'", score, listing.title);
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        if let Some(limit) = options.max_results {
            scored.truncate(limit);
        }

        log::info!(
            "relevance filter: kept {} of {} listings (threshold {}, excluded {})",
            scored.len(),
            total,
            options.threshold,
            excluded
        );

        Ok(scored)
    }

    fn backend(&self) -> Result<Arc<dyn TextEmbedder>, RelevanceError> {
        let mut guard = self
            .backend
            .lock()
            .map_err(|e| RelevanceError::Internal(format!("lock poisoned: {}", e)))?;

        if guard.is_none() {
            log::info!("initializing embedding backend (model '{}')", self.config.model);
            let model = EmbeddingModel::new(&self.config.model, self.config.cache_dir.clone())?;
            *guard = Some(Arc::new(model));
        }

        guard
            .clone()
            .ok_or_else(|| RelevanceError::Internal("backend not initialized".to_string()))
    }
}

/// Cosine similarity between two vectors, clamped to [-1, 1].
///
/// Zero-norm vectors and mismatched dimensions score 0 rather than
/// erroring; a single bad vector should not sink the whole request.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        log::warn!("embedding dimension mismatch: {} vs {}", a.len(), b.len());
        return 0.0;
    }

    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
