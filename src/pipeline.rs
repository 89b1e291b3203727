//! Per-request orchestration: query -> fetch -> filter -> match -> compare.
//!
//! One `Pipeline` serves many requests; it owns the configuration and the
//! lazily-initialized relevance filter and nothing else, so concurrent
//! requests share no mutable state. Fetching is delegated to the
//! `ListingProvider` collaborators; storage and report rendering consume
//! the serializable `SearchOutcome`.

use crate::compare::{compare, ComparisonResult};
use crate::config::{ConfigError, EmbeddingFailurePolicy, PipelineConfig};
use crate::listing::{Listing, ListingProvider, ScoredListing};
use crate::matching::{find_best_match, MatchResult};
use crate::semantic::{exclusion_match, FilterOptions, RelevanceError, RelevanceFilter, TextEmbedder};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("relevance filtering failed: {0}")]
    Relevance(#[from] RelevanceError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("listing provider error: {0:?}")]
    Provider(#[from] anyhow::Error),
}

/// A matched pair together with its comparison.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MatchedPair {
    pub result: MatchResult,
    pub comparison: ComparisonResult,
}

/// Everything one search request produced.
///
/// The per-source candidate lists are kept even when a match exists, so
/// the caller can show the runners-up; when no match exists they let the
/// caller display the best unmatched listings from each source separately
/// rather than showing nothing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub candidates_a: Vec<ScoredListing>,
    pub candidates_b: Vec<ScoredListing>,
    pub matched: Option<MatchedPair>,
}

/// The search pipeline. Create once, use for any number of requests.
pub struct Pipeline {
    config: PipelineConfig,
    filter: RelevanceFilter,
}

impl Pipeline {
    /// Build a pipeline that lazily loads the configured embedding model
    /// on the first request.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let filter = RelevanceFilter::new(config.semantic.clone());
        Ok(Self { config, filter })
    }

    /// Build a pipeline around an existing embedding backend.
    pub fn with_embedder(
        config: PipelineConfig,
        embedder: Arc<dyn TextEmbedder>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let filter = RelevanceFilter::with_embedder(config.semantic.clone(), embedder);
        Ok(Self { config, filter })
    }

    /// Fetch listings from both providers and run the full request.
    pub fn search(
        &self,
        query: &str,
        provider_a: &dyn ListingProvider,
        provider_b: &dyn ListingProvider,
    ) -> Result<SearchOutcome, PipelineError> {
        let listings_a = provider_a.fetch(query)?;
        log::info!(
            "source {} returned {} listings for '{}'",
            provider_a.source(),
            listings_a.len(),
            query
        );

        let listings_b = provider_b.fetch(query)?;
        log::info!(
            "source {} returned {} listings for '{}'",
            provider_b.source(),
            listings_b.len(),
            query
        );

        self.run(query, listings_a, listings_b)
    }

    /// Run a request on already-fetched listings.
    pub fn run(
        &self,
        query: &str,
        listings_a: Vec<Listing>,
        listings_b: Vec<Listing>,
    ) -> Result<SearchOutcome, PipelineError> {
        let options = FilterOptions {
            threshold: self.config.semantic.threshold,
            exclude_non_product: self.config.semantic.exclude_non_product,
            max_results: self.config.semantic.max_results,
        };

        let candidates_a = self.filter_side(query, listings_a, &options)?;
        let candidates_b = self.filter_side(query, listings_b, &options)?;

        let matched = find_best_match(&candidates_a, &candidates_b).map(|result| {
            let comparison = compare(&result);
            MatchedPair { result, comparison }
        });

        if matched.is_none() {
            log::info!("no viable cross-source match for '{}'", query);
        }

        Ok(SearchOutcome {
            query: query.to_string(),
            candidates_a,
            candidates_b,
            matched,
        })
    }

    /// Filter one source's listings, applying the configured policy when
    /// the embedding backend is down.
    fn filter_side(
        &self,
        query: &str,
        listings: Vec<Listing>,
        options: &FilterOptions,
    ) -> Result<Vec<ScoredListing>, PipelineError> {
        match self.config.on_embedding_failure {
            EmbeddingFailurePolicy::Fail => Ok(self.filter.filter(query, listings, options)?),
            EmbeddingFailurePolicy::FallBackUnfiltered => {
                let retained = listings.clone();
                match self.filter.filter(query, listings, options) {
                    Ok(scored) => Ok(scored),
                    Err(RelevanceError::EmbeddingUnavailable(err)) => {
                        log::warn!(
                            "embedding backend unavailable ({}); continuing with unscored listings",
                            err
                        );
                        // The lexical exclusion pass needs no backend, so
                        // non-products stay excluded even on this path.
                        Ok(retained
                            .into_iter()
                            .filter(|l| {
                                !options.exclude_non_product
                                    || exclusion_match(&l.title).is_none()
                            })
                            .map(|listing| ScoredListing {
                                listing,
                                score: 0.0,
                            })
                            .collect())
                    }
                    Err(other) => Err(other.into()),
                }
            }
        }
    }
}
