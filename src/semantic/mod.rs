//! Semantic relevance filtering for scraped product listings.
//!
//! Scrapers return everything the catalog's own search coughed up: cases,
//! chargers, refurbished units, bundles. This module keeps only listings
//! that plausibly ARE the queried product:
//!
//! - `embeddings`: fastembed wrapper and the `TextEmbedder` backend seam
//! - `exclusions`: lexical non-product filter (accessory/refurbished/
//!   bundle/warranty), applied before any scoring
//! - `relevance`: cosine-similarity scoring against the query, threshold
//!   and ranking

pub mod embeddings;
mod exclusions;
mod relevance;

pub use embeddings::{EmbeddingError, EmbeddingModel, TextEmbedder};
pub use exclusions::{exclusion_match, ExclusionCategory};
pub use relevance::{cosine_similarity, FilterOptions, RelevanceError, RelevanceFilter};

/// Default embedding model; small, fast, and good enough for
/// title-vs-query similarity.
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Default similarity threshold for keeping a listing.
pub const DEFAULT_THRESHOLD: f32 = 0.80;
