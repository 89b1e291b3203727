//! Shared fixtures for tests: a deterministic embedding stub and listing
//! builders.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::listing::{Listing, ListingProvider, ScoredListing, Source};
use crate::semantic::{EmbeddingError, TextEmbedder};

/// Deterministic hashed bag-of-words embedder.
///
/// Each token is hashed into one of `DIMS` buckets; titles sharing tokens
/// get proportionally similar vectors, so cosine similarity behaves the
/// way the real model does directionally, without downloading anything.
pub struct StubEmbedder;

const DIMS: usize = 64;

impl StubEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIMS];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            vector[(hasher.finish() % DIMS as u64) as usize] += 1.0;
        }
        vector
    }
}

impl TextEmbedder for StubEmbedder {
    fn dimensions(&self) -> usize {
        DIMS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(Self::vectorize(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }
}

/// An embedder that is permanently down, for failure-policy tests.
pub struct FailingEmbedder;

impl TextEmbedder for FailingEmbedder {
    fn dimensions(&self) -> usize {
        DIMS
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::EmbeddingFailed("backend down".to_string()))
    }

    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::EmbeddingFailed("backend down".to_string()))
    }
}

pub fn listing(title: &str, price: Option<f64>, source: Source) -> Listing {
    Listing {
        title: title.to_string(),
        price,
        rating: None,
        review_count: None,
        url: format!("https://{}.example/item", source.to_string().to_lowercase()),
        source,
    }
}

pub fn scored(title: &str, score: f32, source: Source) -> ScoredListing {
    ScoredListing {
        listing: listing(title, None, source),
        score,
    }
}

/// Provider returning a fixed listing set, whatever the query.
pub struct StaticProvider {
    pub source: Source,
    pub listings: Vec<Listing>,
}

impl ListingProvider for StaticProvider {
    fn source(&self) -> Source {
        self.source
    }

    fn fetch(&self, _query: &str) -> anyhow::Result<Vec<Listing>> {
        Ok(self.listings.clone())
    }
}

/// Provider whose transport always fails.
pub struct FailingProvider {
    pub source: Source,
}

impl ListingProvider for FailingProvider {
    fn source(&self) -> Source {
        self.source
    }

    fn fetch(&self, _query: &str) -> anyhow::Result<Vec<Listing>> {
        anyhow::bail!("connection refused")
    }
}
