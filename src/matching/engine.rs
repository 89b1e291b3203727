//! Four-level matching cascade over gate-surviving pairs.
//!
//! Every cross-source pair is gated first; the surviving pairs are then
//! tested against the strictest level, then the next, across ALL pairs at
//! once. Returning early on the first qualifying pair would miss a
//! better-scoring pair later in iteration, so each level does a full scan
//! and picks its best pair before the cascade moves on.

use crate::extract::ExtractedAttributes;
use crate::listing::ScoredListing;
use crate::matching::{gates, Candidate, MatchLevel, MatchResult};

/// Warning attached to a color-only match.
const STORAGE_UNCERTAIN_WARNING: &str =
    "storage capacity differs or is unknown; prices may not be directly comparable";

/// Suggestion appended to every partial match.
const NARROW_QUERY_SUGGESTION: &str =
    "no fully aligned variant was found; consider a more specific query to narrow both result sets";

/// A gate-surviving pair. `rank` orders pairs within a level: base-name
/// similarity plus both relevance scores.
struct SurvivingPair {
    ai: usize,
    bi: usize,
    rank: f32,
}

/// Find the best cross-source pair, or `None` when no pair passes the
/// hard gates. Absence of a match is an expected outcome, not an error.
///
/// Runs on the full `|A| x |B|` cross product; catalog result pages are
/// tens of listings at most, so no indexing is needed.
pub fn find_best_match(
    side_a: &[ScoredListing],
    side_b: &[ScoredListing],
) -> Option<MatchResult> {
    if side_a.is_empty() || side_b.is_empty() {
        return None;
    }

    let cands_a: Vec<Candidate<'_>> = side_a.iter().map(Candidate::new).collect();
    let cands_b: Vec<Candidate<'_>> = side_b.iter().map(Candidate::new).collect();

    let mut surviving = Vec::new();
    for (ai, a) in cands_a.iter().enumerate() {
        for (bi, b) in cands_b.iter().enumerate() {
            if let Some(similarity) = gates::check(a, b) {
                surviving.push(SurvivingPair {
                    ai,
                    bi,
                    rank: similarity + a.scored.score + b.scored.score,
                });
            }
        }
    }

    if surviving.is_empty() {
        log::info!(
            "no pair of {}x{} candidates passed the hard gates",
            side_a.len(),
            side_b.len()
        );
        return None;
    }

    for level in [
        MatchLevel::Perfect,
        MatchLevel::ColorStorage,
        MatchLevel::ColorOnly,
    ] {
        let best = surviving
            .iter()
            .filter(|p| qualifies(level, &cands_a[p.ai].attrs, &cands_b[p.bi].attrs))
            .max_by(|x, y| x.rank.partial_cmp(&y.rank).unwrap_or(std::cmp::Ordering::Equal));

        if let Some(pair) = best {
            let a = &cands_a[pair.ai];
            let b = &cands_b[pair.bi];
            log::info!(
                "match at level '{}': '{}' / '{}'",
                level,
                a.scored.listing.title,
                b.scored.listing.title
            );
            let warnings = match level {
                MatchLevel::ColorOnly => vec![STORAGE_UNCERTAIN_WARNING.to_string()],
                _ => vec![],
            };
            return Some(MatchResult {
                a: a.scored.listing.clone(),
                b: b.scored.listing.clone(),
                level,
                warnings,
            });
        }
    }

    partial_fallback(&cands_a, &cands_b, &surviving)
}

/// Level qualification predicates.
///
/// Storage is compared only when BOTH sides expose a value: a listing that
/// simply omits capacity from its title must not be rejected against one
/// that spells it out. One-sided absence therefore blocks Perfect and
/// ColorStorage (which require agreement on both sides) but never demotes
/// a pair below ColorOnly.
fn qualifies(level: MatchLevel, a: &ExtractedAttributes, b: &ExtractedAttributes) -> bool {
    match level {
        MatchLevel::Perfect => {
            storage_agrees(a, b) && color_agrees(a, b) && sizes_compatible(a, b)
        }
        MatchLevel::ColorStorage => color_agrees(a, b) && storage_agrees(a, b),
        MatchLevel::ColorOnly => color_agrees(a, b),
        MatchLevel::PartialWithWarning => true,
    }
}

fn color_agrees(a: &ExtractedAttributes, b: &ExtractedAttributes) -> bool {
    match (&a.color, &b.color) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => false,
    }
}

fn storage_agrees(a: &ExtractedAttributes, b: &ExtractedAttributes) -> bool {
    match (a.storage_gb, b.storage_gb) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// For Perfect only: when either side has a size, both must, with the
/// same unit (no conversion) and values within 0.5.
fn sizes_compatible(a: &ExtractedAttributes, b: &ExtractedAttributes) -> bool {
    match (a.size_value, b.size_value) {
        (None, None) => true,
        (Some(x), Some(y)) => {
            a.size_unit == b.size_unit && (x - y).abs() <= 0.5
        }
        _ => false,
    }
}

/// Last-resort level: no pair aligned on any facet, but some pairs did
/// pass the hard gates, so the listings plausibly name the same product
/// family. Pick the highest-relevance gate-surviving listing from each
/// source independently and spell out everything known to differ.
fn partial_fallback(
    cands_a: &[Candidate<'_>],
    cands_b: &[Candidate<'_>],
    surviving: &[SurvivingPair],
) -> Option<MatchResult> {
    let best_a = best_on_side(cands_a, surviving.iter().map(|p| p.ai))?;
    let best_b = best_on_side(cands_b, surviving.iter().map(|p| p.bi))?;

    let attrs_a = &cands_a[best_a].attrs;
    let attrs_b = &cands_b[best_b].attrs;

    let mut warnings = Vec::new();
    if let (Some(x), Some(y)) = (&attrs_a.color, &attrs_b.color) {
        if !x.eq_ignore_ascii_case(y) {
            warnings.push(format!("colors do not match ({} vs {})", x, y));
        }
    }
    if let (Some(x), Some(y)) = (attrs_a.storage_gb, attrs_b.storage_gb) {
        if x != y {
            warnings.push(format!("storage differs ({}GB vs {}GB)", x, y));
        }
    }
    if attrs_a.storage_gb.is_some() != attrs_b.storage_gb.is_some() {
        warnings.push("storage capacity is unknown for one of the listings".to_string());
    }
    warnings.push(NARROW_QUERY_SUGGESTION.to_string());

    let a = &cands_a[best_a];
    let b = &cands_b[best_b];
    log::warn!(
        "partial match only: '{}' / '{}' ({} warnings)",
        a.scored.listing.title,
        b.scored.listing.title,
        warnings.len()
    );

    Some(MatchResult {
        a: a.scored.listing.clone(),
        b: b.scored.listing.clone(),
        level: MatchLevel::PartialWithWarning,
        warnings,
    })
}

/// Highest-relevance candidate on one side among those that survived the
/// gates against at least one listing on the other side.
fn best_on_side(
    cands: &[Candidate<'_>],
    surviving_indices: impl Iterator<Item = usize>,
) -> Option<usize> {
    let mut seen = vec![false; cands.len()];
    for idx in surviving_indices {
        seen[idx] = true;
    }

    (0..cands.len())
        .filter(|i| seen[*i])
        .max_by(|x, y| {
            cands[*x]
                .scored
                .score
                .partial_cmp(&cands[*y].scored.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
