//! Cross-catalog product listing matcher.
//!
//! Given a free-text product query and raw listings scraped from two
//! independent catalogs, this crate selects the single cross-source pair
//! that most plausibly refers to the same real-world item, across variants
//! differing in color, storage capacity and physical size.
//!
//! # Architecture
//!
//! - `listing`: the scraped-listing data model and the provider trait
//! - `extract`: structured facets (base name, color, storage, size) from titles
//! - `semantic`: embedding-based relevance filtering with a non-product lexicon
//! - `matching`: hard gates plus a four-level strictness cascade over pairs
//! - `compare`: price/rating/review comparison and recommendation
//! - `pipeline`: per-request orchestration of the stages above
//!
//! The crate holds no request-spanning mutable state; the only shared
//! resource is the lazily-initialized embedding model handle.

pub mod compare;
pub mod config;
pub mod extract;
pub mod listing;
pub mod matching;
pub mod pipeline;
pub mod semantic;

#[cfg(test)]
mod tests;

pub use compare::{compare, ComparisonResult, Recommendation};
pub use config::{ConfigError, EmbeddingFailurePolicy, PipelineConfig, SemanticConfig};
pub use extract::{extract, Category, ExtractedAttributes};
pub use listing::{Listing, ListingProvider, ScoredListing, Source};
pub use matching::{find_best_match, MatchLevel, MatchResult};
pub use pipeline::{MatchedPair, Pipeline, PipelineError, SearchOutcome};
pub use semantic::{
    EmbeddingError, EmbeddingModel, FilterOptions, RelevanceError, RelevanceFilter, TextEmbedder,
};
