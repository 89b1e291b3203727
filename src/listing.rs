//! Scraped-listing data model and the provider seam.
//!
//! A `Listing` is one product record as scraped from one catalog. The core
//! never mutates listings; they live for a single search request. The
//! numeric-field parsers at the bottom turn the messy strings scrapers see
//! ("₹1,299.99", "4.3 out of 5 stars", "1.2K ratings") into typed values,
//! with absence represented as `None` rather than sentinels.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which of the two scraped catalogs a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    A,
    B,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::A => write!(f, "A"),
            Source::B => write!(f, "B"),
        }
    }
}

/// One scraped product record. The title string is the authoritative
/// source of truth; price, rating and review count are absent whenever the
/// scraper could not parse them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Rating within [0, 5] when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,

    pub url: String,
    pub source: Source,
}

/// A listing plus its similarity score against the active query.
///
/// Scores are comparable only within one query + model version; they carry
/// no meaning across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredListing {
    pub listing: Listing,
    pub score: f32,
}

/// Collaborator interface: anything that can fetch raw listings for a
/// query from one catalog. An empty result list is a normal outcome, not
/// an error; only transport failures are errors.
pub trait ListingProvider: Send + Sync {
    fn source(&self) -> Source;
    fn fetch(&self, query: &str) -> anyhow::Result<Vec<Listing>>;
}

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[₹$€£]").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static THOUSANDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*k\b").unwrap());

/// Extract a price from a scraped string.
///
/// Splits on currency symbols first so concatenated scrapes like
/// "64900₹64900" yield the first occurrence, then falls back to the first
/// number in the string. Returns `None` when nothing parses to a positive
/// finite value.
pub fn parse_price(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for part in CURRENCY_RE.split(raw) {
        let cleaned: String = part
            .chars()
            .filter(|c| !matches!(c, ',' | ' '))
            .collect();
        if cleaned.is_empty() {
            continue;
        }
        if let Ok(value) = cleaned.parse::<f64>() {
            if value > 0.0 && value.is_finite() {
                return Some(value);
            }
        }
    }

    // Aggressive fallback: first number anywhere, grouping commas removed.
    let normalized = raw.replace(',', "");
    NUMBER_RE
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| *v > 0.0 && v.is_finite())
}

/// Extract a star rating from a scraped string ("4.3 out of 5 stars").
///
/// Returns `None` when no number is found or the number is outside [0, 5].
pub fn parse_rating(raw: &str) -> Option<f32> {
    NUMBER_RE
        .find(raw.trim())
        .and_then(|m| m.as_str().parse::<f32>().ok())
        .filter(|r| (0.0..=5.0).contains(r))
}

/// Extract a review count from a scraped string ("1,245 ratings", "1.2K").
pub fn parse_review_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Some(caps) = THOUSANDS_RE.captures(raw) {
        let n: f64 = caps[1].parse().ok()?;
        return Some((n * 1000.0) as u32);
    }

    let normalized = raw.replace(',', "");
    NUMBER_RE
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|n| n as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_plain() {
        assert_eq!(parse_price("52990"), Some(52990.0));
        assert_eq!(parse_price("1299.99"), Some(1299.99));
    }

    #[test]
    fn test_parse_price_currency_and_commas() {
        assert_eq!(parse_price("₹1,299.99"), Some(1299.99));
        assert_eq!(parse_price("$ 449"), Some(449.0));
    }

    #[test]
    fn test_parse_price_concatenated_takes_first() {
        // Scrapers sometimes glue the visible and aria-label price together.
        assert_eq!(parse_price("64900₹64900"), Some(64900.0));
    }

    #[test]
    fn test_parse_price_with_trailing_text() {
        assert_eq!(parse_price("1,299 incl. taxes"), Some(1299.0));
    }

    #[test]
    fn test_parse_price_unparsable() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("price unavailable"), None);
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4.3 out of 5 stars"), Some(4.3));
        assert_eq!(parse_rating("4.5★"), Some(4.5));
        assert_eq!(parse_rating("no rating"), None);
    }

    #[test]
    fn test_parse_rating_out_of_range_rejected() {
        // "10 ratings" is a count, not a rating.
        assert_eq!(parse_rating("10"), None);
    }

    #[test]
    fn test_parse_review_count() {
        assert_eq!(parse_review_count("1,245 ratings"), Some(1245));
        assert_eq!(parse_review_count("1.2K"), Some(1200));
        assert_eq!(parse_review_count("87"), Some(87));
        assert_eq!(parse_review_count("none"), None);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(Source::A.to_string(), "A");
        assert_eq!(Source::B.to_string(), "B");
    }

    #[test]
    fn test_listing_serialization_skips_absent_fields() {
        let listing = Listing {
            title: "Apple iPhone 15".to_string(),
            price: None,
            rating: Some(4.5),
            review_count: None,
            url: "https://a.example/ip15".to_string(),
            source: Source::A,
        };
        let json = serde_json::to_string(&listing).unwrap();
        assert!(!json.contains("price"));
        assert!(json.contains("rating"));
    }
}
