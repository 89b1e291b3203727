//! Cross-source pair matching.
//!
//! Given the relevance-filtered listing lists of the two catalogs, find
//! the single pair that most plausibly names the same item:
//!
//! - `gates`: hard pass/fail preconditions (category, brand, base-name
//!   similarity) applied to every candidate pair at every level
//! - `engine`: a four-level strictness cascade over the gate-surviving
//!   pairs, strictest level first, best-scoring pair within a level

pub mod gates;

mod engine;

pub use engine::find_best_match;

use crate::extract::{classify, extract, Category, ExtractedAttributes};
use crate::listing::{Listing, ScoredListing};
use serde::Serialize;

/// Strictness tier at which two listings were judged equivalent. Declared
/// strictest first; the engine never reports a looser level when a
/// stricter one has a qualifying pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MatchLevel {
    /// Storage, color and (when present) size all agree.
    Perfect,
    /// Color and storage agree; size not required.
    ColorStorage,
    /// Color agrees; storage differs or is unknown on either side.
    ColorOnly,
    /// No facet agreement required; warnings enumerate the mismatches.
    PartialWithWarning,
}

impl std::fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MatchLevel::Perfect => "perfect",
            MatchLevel::ColorStorage => "color+storage",
            MatchLevel::ColorOnly => "color only",
            MatchLevel::PartialWithWarning => "partial (with warnings)",
        };
        write!(f, "{}", label)
    }
}

/// The selected cross-source pair.
///
/// `PartialWithWarning` always carries at least one warning; stricter
/// levels may carry none.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub a: Listing,
    pub b: Listing,
    pub level: MatchLevel,
    pub warnings: Vec<String>,
}

/// A scored listing with its facets computed once up front, so the
/// cross-product loop does not re-extract per pair.
pub(crate) struct Candidate<'a> {
    pub scored: &'a ScoredListing,
    pub attrs: ExtractedAttributes,
    pub category: Category,
}

impl<'a> Candidate<'a> {
    pub(crate) fn new(scored: &'a ScoredListing) -> Self {
        Self {
            attrs: extract(&scored.listing.title),
            category: classify(&scored.listing.title),
            scored,
        }
    }
}
