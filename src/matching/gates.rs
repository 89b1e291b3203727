//! Hard gates applied to every candidate pair before any match level is
//! considered.
//!
//! A pair that fails a gate is out entirely; the cascade never sees it.
//! Gates in order: category compatibility, brand compatibility, base-name
//! similarity (which includes the tier/material variant guard).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::Category;
use crate::matching::Candidate;

/// Minimum base-name similarity for a pair to be considered at all.
pub const NAME_SIMILARITY_GATE: f32 = 0.70;

/// Similarity granted when every token of a 1-2-token name appears in the
/// other name. Short names are usually truncated extractions, not
/// different products.
const SHORT_NAME_MATCH: f32 = 0.75;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "from",
];

/// Model-tier tokens. A tier present on one side but absent or different
/// on the other means a different product ("iPhone 15" vs "iPhone 15
/// Pro"), however similar the rest of the name is.
const TIER_VARIANTS: &[&str] = &["pro", "max", "mini", "plus", "ultra"];

/// Material tokens, same rule as tiers.
const MATERIAL_VARIANTS: &[&str] = &["titanium", "stainless", "aluminum", "ceramic"];

static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Run all three hard gates on a pair. Returns the base-name similarity
/// when the pair survives, `None` when any gate rejects it.
pub(crate) fn check(a: &Candidate<'_>, b: &Candidate<'_>) -> Option<f32> {
    // Category gate: only reject when BOTH sides classified into known,
    // different categories. Unclassified titles never cause a rejection.
    if a.category != Category::General
        && b.category != Category::General
        && a.category != b.category
    {
        log::debug!(
            "category mismatch: {:?} vs {:?} ('{}' / '{}')",
            a.category,
            b.category,
            a.scored.listing.title,
            b.scored.listing.title
        );
        return None;
    }

    if !brands_compatible(&a.attrs.base_name, &b.attrs.base_name) {
        log::debug!(
            "brand mismatch: '{}' vs '{}'",
            a.attrs.base_name,
            b.attrs.base_name
        );
        return None;
    }

    if variant_conflict(&a.attrs.base_name, &b.attrs.base_name) {
        log::debug!(
            "variant conflict: '{}' vs '{}'",
            a.attrs.base_name,
            b.attrs.base_name
        );
        return None;
    }

    let similarity = name_similarity(&a.attrs.base_name, &b.attrs.base_name);
    if similarity < NAME_SIMILARITY_GATE {
        log::debug!(
            "name similarity {:.2} below gate: '{}' vs '{}'",
            similarity,
            a.attrs.base_name,
            b.attrs.base_name
        );
        return None;
    }

    Some(similarity)
}

/// Leading brand token of a base name: the first token longer than two
/// characters, lowercased. `None` when no token qualifies.
pub fn brand_token(base_name: &str) -> Option<String> {
    normalize(base_name)
        .split_whitespace()
        .find(|t| t.len() > 2 && t.chars().any(|c| c.is_alphabetic()))
        .map(|t| t.to_string())
}

/// Brand compatibility across two base names.
///
/// The two catalogs disagree on whether the vendor prefix is part of the
/// title ("iPhone 15" vs "Apple iPhone 15"), so equal leading tokens are
/// not required; it is enough for one side's brand token to appear as a
/// word anywhere in the other side's name.
pub fn brands_compatible(base_a: &str, base_b: &str) -> bool {
    let brand_a = brand_token(base_a);
    let brand_b = brand_token(base_b);

    match (brand_a, brand_b) {
        (None, None) => true,
        (Some(x), Some(y)) => {
            x == y
                || normalize(base_b).split_whitespace().any(|t| t == x)
                || normalize(base_a).split_whitespace().any(|t| t == y)
        }
        _ => false,
    }
}

/// Normalized token-overlap similarity of two base names, in [0, 1].
pub fn name_similarity(name_a: &str, name_b: &str) -> f32 {
    let norm_a = normalize(name_a);
    let norm_b = normalize(name_b);

    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }
    if norm_a == norm_b {
        return 1.0;
    }

    let tokens_a = significant_tokens(&norm_a);
    let tokens_b = significant_tokens(&norm_b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    // Lenient path for 1-2-token names (likely incomplete extraction):
    // full containment of the shorter name counts as a good match.
    if tokens_a.len() <= 2 || tokens_b.len() <= 2 {
        let (shorter, longer) = if tokens_a.len() <= tokens_b.len() {
            (&tokens_a, &tokens_b)
        } else {
            (&tokens_b, &tokens_a)
        };
        let overlap = shorter.iter().filter(|t| longer.contains(t)).count();
        return if overlap == shorter.len() {
            SHORT_NAME_MATCH
        } else {
            overlap as f32 / shorter.len() as f32
        };
    }

    let overlap = tokens_a.iter().filter(|t| tokens_b.contains(t)).count();
    let max_len = tokens_a.len().max(tokens_b.len());
    overlap as f32 / max_len as f32
}

/// Tier/material conflict between two base names: a variant token present
/// on exactly one side, or different variant tokens on the two sides.
pub fn variant_conflict(base_a: &str, base_b: &str) -> bool {
    let norm_a = normalize(base_a);
    let norm_b = normalize(base_b);
    let tokens_a: Vec<&str> = norm_a.split_whitespace().collect();
    let tokens_b: Vec<&str> = norm_b.split_whitespace().collect();

    for table in [TIER_VARIANTS, MATERIAL_VARIANTS] {
        let found_a: Vec<&str> = table
            .iter()
            .copied()
            .filter(|v| tokens_a.contains(v))
            .collect();
        let found_b: Vec<&str> = table
            .iter()
            .copied()
            .filter(|v| tokens_b.contains(v))
            .collect();
        if found_a != found_b {
            return true;
        }
    }

    false
}

/// Lowercase, strip punctuation, collapse whitespace.
fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_ALNUM_RE.replace_all(&lowered, " ").trim().to_string()
}

/// Tokens that carry meaning for name comparison: longer than two
/// characters and not a stop word.
fn significant_tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|t| t.len() > 2 && !STOP_WORDS.contains(t))
        .collect()
}
