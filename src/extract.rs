//! Attribute extraction from free-text product titles.
//!
//! Two catalogs format the same product differently ("iPhone 14 Pro 256GB
//! Space Black" vs "Apple iPhone 14 Pro (Space Black, 256GB)"). This module
//! pulls the structured facets out of a title so the matching engine can
//! compare listings on facts rather than raw strings:
//!
//! - storage capacity in GB (TB converted)
//! - color, via a static lexicon with multi-word entries matched first
//! - physical size (value + unit, no unit conversion)
//! - the base name left over once those tokens are stripped
//!
//! Extraction never fails; an absent facet is `None`, not an error. The
//! lexicons are built once and shared across requests.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;

/// Facets derived from a single listing title. Pure function of the title:
/// re-extracting the same string yields the same value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedAttributes {
    /// Title with color/storage/size tokens removed, whitespace collapsed.
    pub base_name: String,
    /// Title-cased color name, possibly multi-word ("Deep Blue").
    pub color: Option<String>,
    pub storage_gb: Option<u32>,
    /// Present together with `size_unit` or not at all.
    pub size_value: Option<f32>,
    /// Lowercased unit as written; "in" and "inch" are distinct on purpose.
    pub size_unit: Option<String>,
}

/// Coarse product category, inferred heuristically from title keywords.
///
/// Coverage is exactly the keyword tables below; anything unrecognized is
/// `General`. The matching engine only uses this to reject pairs where both
/// sides classify into different known categories, so unrecognized titles
/// never cause a false rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Phone,
    PhoneCase,
    ScreenProtector,
    Accessory,
    Skincare,
    Electronics,
    General,
}

/// Color lexicon. Multi-word entries come first so "Space Black" wins over
/// "Space" and "Black" when building the scan pattern.
const COLOR_LEXICON: &[&str] = &[
    "Cosmic Orange",
    "Deep Blue",
    "Space Black",
    "Midnight Black",
    "Sierra Blue",
    "Desert Titanium",
    "Natural Titanium",
    "Blue Titanium",
    "Black Titanium",
    "White Titanium",
    "Gold Titanium",
    "Silver Titanium",
    "Pacific Blue",
    "Alpine Green",
    "Dark Purple",
    "Light Purple",
    "Forest Green",
    "Ocean Blue",
    "Sky Blue",
    "Phantom Black",
    "Phantom White",
    "Phantom Silver",
    "Midnight Green",
    "Product Red",
    "Starlight Blue",
    "Starlight Green",
    "Starlight Black",
    "Starlight White",
    "Glacier White",
    "Pearl White",
    "Pearl Black",
    "Marble White",
    "Marble Black",
    "Space Gray",
    "Space Grey",
    "Black",
    "White",
    "Silver",
    "Gold",
    "Red",
    "Blue",
    "Green",
    "Purple",
    "Pink",
    "Orange",
    "Yellow",
    "Brown",
    "Grey",
    "Gray",
    "Titanium",
    "Rose",
    "Pearl",
    "Phantom",
    "Midnight",
    "Starlight",
    "Glacier",
    "Alpine",
    "Pacific",
    "Desert",
    "Cosmic",
    "Sierra",
    "Ebony",
    "Ivory",
    "Marble",
    "Onyx",
];

static STORAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,5})\s*([GT]B)\b").unwrap());

/// Unit alternation is ordered so longer units match before their prefixes
/// ("inch" before "in", "kg" before "g").
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(oz|ml|kg|lb|inch|in|cm|g)\b").unwrap());

static TRAILING_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*-\s*([A-Za-z][A-Za-z ]*)$").unwrap());

static PAREN_SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*([A-Za-z][A-Za-z ]*?)\s*[,)]").unwrap());

/// Words that mark a dash/parenthetical segment as specs rather than color.
static SPEC_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(gb|mb|tb|mp|ram|rom|storage|processor|chip|inch|inches)\b").unwrap()
});

static COLOR_SCAN_RE: Lazy<Regex> = Lazy::new(|| {
    let mut entries: Vec<&str> = COLOR_LEXICON.to_vec();
    // Longest-first keeps multi-word colors ahead of their substrings.
    entries.sort_by_key(|e| std::cmp::Reverse(e.len()));
    let alternation = entries.join("|").replace(' ', r"\s+");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
});

static EMPTY_PARENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*[,;]*\s*\)").unwrap());
static PAREN_OPEN_SEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*[,;]\s*").unwrap());
static PAREN_CLOSE_SEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[,;]\s*\)").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static CATEGORY_RULES: Lazy<Vec<(Category, Regex)>> = Lazy::new(|| {
    // Accessory categories are checked before device categories so
    // "iPhone 14 Pro Case" classifies as a case, not a phone.
    let table: &[(Category, &[&str])] = &[
        (
            Category::PhoneCase,
            &["back cover", "flip cover", "flip case", "phone case", "cover", "case", "bumper"],
        ),
        (
            Category::ScreenProtector,
            &["tempered glass", "screen protector", "glass protector", "screen guard"],
        ),
        (
            Category::Accessory,
            &["charger", "charging cable", "usb cable", "data cable", "adapter", "power bank"],
        ),
        (
            Category::Phone,
            &["smartphone", "mobile phone", "iphone", "galaxy", "mobile", "phone", "android"],
        ),
        (
            Category::Skincare,
            &["ointment", "cream", "lotion", "serum", "moisturizer", "sunscreen"],
        ),
        (
            Category::Electronics,
            &["tablet", "ipad", "laptop", "macbook", "monitor", "tv"],
        ),
    ];

    table
        .iter()
        .map(|(category, keywords)| {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k).replace(' ', r"\s+"))
                .collect::<Vec<_>>()
                .join("|");
            let re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap();
            (*category, re)
        })
        .collect()
});

/// Extract structured facets from a raw listing title. Never fails.
pub fn extract(title: &str) -> ExtractedAttributes {
    let storage = find_storage(title);
    let size = find_size(title);
    let color = find_color(title);

    let mut strip = Vec::new();
    if let Some((_, range)) = &storage {
        strip.push(range.clone());
    }
    if let Some((_, _, range)) = &size {
        strip.push(range.clone());
    }
    if let Some((_, range)) = &color {
        strip.push(range.clone());
    }

    ExtractedAttributes {
        base_name: build_base_name(title, strip),
        color: color.map(|(c, _)| c),
        storage_gb: storage.map(|(gb, _)| gb),
        size_value: size.as_ref().map(|(v, _, _)| *v),
        size_unit: size.map(|(_, u, _)| u),
    }
}

/// Classify a title into a coarse category; `General` when nothing matches.
pub fn classify(title: &str) -> Category {
    for (category, re) in CATEGORY_RULES.iter() {
        if re.is_match(title) {
            return *category;
        }
    }
    Category::General
}

/// Byte ranges of parenthesized stretches, for the in-parens storage
/// preference.
fn paren_spans(title: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut stack = Vec::new();
    for (idx, ch) in title.char_indices() {
        match ch {
            '(' => stack.push(idx),
            ')' => {
                if let Some(start) = stack.pop() {
                    spans.push(start..idx + 1);
                }
            }
            _ => {}
        }
    }
    spans
}

fn find_storage(title: &str) -> Option<(u32, Range<usize>)> {
    let candidates: Vec<(u32, Range<usize>)> = STORAGE_RE
        .captures_iter(title)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let value: u32 = caps.get(1)?.as_str().parse().ok()?;
            let unit = caps.get(2)?.as_str();
            let gb = if unit.eq_ignore_ascii_case("tb") {
                value.checked_mul(1024)?
            } else {
                value
            };
            Some((gb, m.start()..m.end()))
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let spans = paren_spans(title);
    candidates
        .iter()
        .find(|(_, range)| spans.iter().any(|span| span.contains(&range.start)))
        .or_else(|| candidates.first())
        .cloned()
}

fn find_size(title: &str) -> Option<(f32, String, Range<usize>)> {
    let caps = SIZE_RE.captures(title)?;
    let m = caps.get(0)?;
    let value: f32 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();
    Some((value, unit, m.start()..m.end()))
}

/// Color extraction strategies in priority order, first match wins:
/// trailing dash segment, parenthetical segment, lexicon scan.
fn find_color(title: &str) -> Option<(String, Range<usize>)> {
    if let Some(caps) = TRAILING_DASH_RE.captures(title) {
        let segment = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if segment.len() > 1 && !SPEC_WORD_RE.is_match(segment) {
            let full = caps.get(0)?;
            return Some((title_case(segment), full.start()..full.end()));
        }
    }

    if let Some(caps) = PAREN_SEGMENT_RE.captures(title) {
        let m = caps.get(1)?;
        let segment = m.as_str().trim();
        if segment.len() > 1 && !SPEC_WORD_RE.is_match(segment) {
            return Some((title_case(segment), m.start()..m.end()));
        }
    }

    COLOR_SCAN_RE
        .find(title)
        .map(|m| (title_case(m.as_str()), m.start()..m.end()))
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rebuild the title with the given byte ranges removed, then clean up the
/// separators and parentheses the removal leaves behind.
fn build_base_name(title: &str, mut strip: Vec<Range<usize>>) -> String {
    strip.sort_by_key(|r| r.start);

    let mut kept = String::with_capacity(title.len());
    let mut cursor = 0;
    for range in strip {
        if range.start > cursor {
            kept.push_str(&title[cursor..range.start]);
        }
        cursor = cursor.max(range.end);
    }
    if cursor < title.len() {
        kept.push_str(&title[cursor..]);
    }

    let cleaned = PAREN_CLOSE_SEP_RE.replace_all(&kept, ")");
    let cleaned = PAREN_OPEN_SEP_RE.replace_all(&cleaned, "(");
    let cleaned = EMPTY_PARENS_RE.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");
    cleaned
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'))
        .to_string()
}
