//! Price/rating/review comparison of a matched pair.
//!
//! Pure functions of the two listings; no I/O, no state. Price dominates
//! the recommendation; rating and review count only break ties. When both
//! prices are missing the engine says so instead of guessing.

use serde::Serialize;

use crate::listing::Source;
use crate::matching::MatchResult;

/// The recommendation verdict for a matched pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    /// One source wins on price, or on tie-break points.
    Prefer(Source),
    /// Neither source wins; either is reasonable.
    Comparable,
    /// Both prices missing; no recommendation is fabricated.
    PriceUnavailable,
}

/// Derived comparison of a matched pair. No independent lifecycle; purely
/// a function of the two listings.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Strictly cheaper source; `None` when prices tie or either is absent.
    pub cheaper_source: Option<Source>,
    /// `|a - b| / max(a, b) * 100`; `None` when either price is absent.
    pub price_diff_pct: Option<f64>,
    pub better_rated_source: Option<Source>,
    pub more_reviewed_source: Option<Source>,
    pub recommendation: Recommendation,
    pub recommendation_text: String,
}

/// Compare the two listings of a match and produce a recommendation.
pub fn compare(pair: &MatchResult) -> ComparisonResult {
    let a = &pair.a;
    let b = &pair.b;

    let (cheaper_source, price_diff_pct) = match (a.price, b.price) {
        (Some(x), Some(y)) => {
            let max = x.max(y);
            let pct = if max > 0.0 {
                Some((x - y).abs() / max * 100.0)
            } else {
                None
            };
            let cheaper = if x < y {
                Some(Source::A)
            } else if y < x {
                Some(Source::B)
            } else {
                None
            };
            (cheaper, pct)
        }
        _ => (None, None),
    };

    // Absent ratings/counts compare as zero; a tie awards no point.
    let better_rated_source =
        strictly_higher(a.rating.unwrap_or(0.0), b.rating.unwrap_or(0.0));
    let more_reviewed_source = strictly_higher(
        a.review_count.unwrap_or(0) as f32,
        b.review_count.unwrap_or(0) as f32,
    );

    let (recommendation, recommendation_text) = recommend(
        a.price.is_none() && b.price.is_none(),
        cheaper_source,
        price_diff_pct,
        better_rated_source,
        more_reviewed_source,
    );

    ComparisonResult {
        cheaper_source,
        price_diff_pct,
        better_rated_source,
        more_reviewed_source,
        recommendation,
        recommendation_text,
    }
}

fn strictly_higher(a: f32, b: f32) -> Option<Source> {
    if a > b {
        Some(Source::A)
    } else if b > a {
        Some(Source::B)
    } else {
        None
    }
}

fn recommend(
    no_prices: bool,
    cheaper: Option<Source>,
    price_diff_pct: Option<f64>,
    better_rated: Option<Source>,
    more_reviewed: Option<Source>,
) -> (Recommendation, String) {
    if no_prices {
        return (
            Recommendation::PriceUnavailable,
            "price unavailable on both sources; no recommendation".to_string(),
        );
    }

    // Price dominates: a strictly cheaper source wins outright.
    if let Some(source) = cheaper {
        let text = match price_diff_pct {
            Some(pct) => format!("source {} is cheaper by {:.2}%", source, pct),
            None => format!("source {} is cheaper", source),
        };
        return (Recommendation::Prefer(source), text);
    }

    // No price winner: rating and review count each award one point.
    let points = |s: Source| {
        [better_rated, more_reviewed]
            .iter()
            .filter(|winner| **winner == Some(s))
            .count()
    };

    match points(Source::A).cmp(&points(Source::B)) {
        std::cmp::Ordering::Greater => (
            Recommendation::Prefer(Source::A),
            "source A leads on rating and review signals".to_string(),
        ),
        std::cmp::Ordering::Less => (
            Recommendation::Prefer(Source::B),
            "source B leads on rating and review signals".to_string(),
        ),
        std::cmp::Ordering::Equal => (
            Recommendation::Comparable,
            "comparable / either is reasonable".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Listing;
    use crate::matching::MatchLevel;

    fn pair(a: Listing, b: Listing) -> MatchResult {
        MatchResult {
            a,
            b,
            level: MatchLevel::Perfect,
            warnings: vec![],
        }
    }

    fn listing(price: Option<f64>, rating: Option<f32>, reviews: Option<u32>, source: Source) -> Listing {
        Listing {
            title: "Apple iPhone 15 (128 GB) - Black".to_string(),
            price,
            rating,
            review_count: reviews,
            url: String::new(),
            source,
        }
    }

    #[test]
    fn test_cheaper_source_wins_outright() {
        let result = compare(&pair(
            listing(Some(52990.0), Some(4.2), Some(100), Source::A),
            listing(Some(51000.0), Some(4.8), Some(9000), Source::B),
        ));

        assert_eq!(result.cheaper_source, Some(Source::B));
        assert_eq!(result.recommendation, Recommendation::Prefer(Source::B));
        let pct = result.price_diff_pct.unwrap();
        assert!((pct - 3.7554).abs() < 0.001);
    }

    #[test]
    fn test_price_beats_rating_and_reviews() {
        // A is cheaper; B wins both tie-breakers. Price still decides.
        let result = compare(&pair(
            listing(Some(40000.0), Some(3.9), Some(10), Source::A),
            listing(Some(45000.0), Some(4.9), Some(50000), Source::B),
        ));
        assert_eq!(result.recommendation, Recommendation::Prefer(Source::A));
    }

    #[test]
    fn test_equal_prices_fall_to_points() {
        let result = compare(&pair(
            listing(Some(50000.0), Some(4.8), Some(2000), Source::A),
            listing(Some(50000.0), Some(4.1), Some(500), Source::B),
        ));

        assert_eq!(result.cheaper_source, None);
        assert_eq!(result.price_diff_pct, Some(0.0));
        assert_eq!(result.recommendation, Recommendation::Prefer(Source::A));
    }

    #[test]
    fn test_one_price_missing_uses_points() {
        let result = compare(&pair(
            listing(None, Some(4.0), Some(100), Source::A),
            listing(Some(50000.0), Some(4.5), Some(900), Source::B),
        ));

        assert_eq!(result.price_diff_pct, None);
        assert_eq!(result.cheaper_source, None);
        assert_eq!(result.recommendation, Recommendation::Prefer(Source::B));
    }

    #[test]
    fn test_both_prices_missing_reports_unavailable() {
        let result = compare(&pair(
            listing(None, Some(4.9), Some(10000), Source::A),
            listing(None, Some(2.0), Some(3), Source::B),
        ));

        assert_eq!(result.recommendation, Recommendation::PriceUnavailable);
        assert!(result.recommendation_text.contains("price unavailable"));
    }

    #[test]
    fn test_full_tie_is_comparable() {
        let result = compare(&pair(
            listing(Some(100.0), Some(4.0), Some(50), Source::A),
            listing(Some(100.0), Some(4.0), Some(50), Source::B),
        ));

        assert_eq!(result.recommendation, Recommendation::Comparable);
        assert_eq!(result.recommendation_text, "comparable / either is reasonable");
    }

    #[test]
    fn test_split_points_are_comparable() {
        // Equal prices, A better rated, B more reviewed.
        let result = compare(&pair(
            listing(Some(100.0), Some(4.5), Some(50), Source::A),
            listing(Some(100.0), Some(4.0), Some(5000), Source::B),
        ));

        assert_eq!(result.better_rated_source, Some(Source::A));
        assert_eq!(result.more_reviewed_source, Some(Source::B));
        assert_eq!(result.recommendation, Recommendation::Comparable);
    }

    #[test]
    fn test_missing_rating_compares_as_zero() {
        let result = compare(&pair(
            listing(Some(100.0), None, None, Source::A),
            listing(Some(100.0), Some(3.0), None, Source::B),
        ));
        assert_eq!(result.better_rated_source, Some(Source::B));
    }
}
