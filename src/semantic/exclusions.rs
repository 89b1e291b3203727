//! Lexical non-product filter.
//!
//! Accessory, refurbished, bundle and warranty listings score deceptively
//! high on title similarity ("iPhone 14 Screen Protector" is mostly the
//! query), so they are dropped by keyword before any embedding work. The
//! tables are built once and shared across requests.
//!
//! Keywords match on word boundaries; multi-word entries match as phrases.
//! "pack" hits "Combo Pack" but not "Backpack".

use once_cell::sync::Lazy;
use regex::Regex;

/// Why a listing was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionCategory {
    Accessory,
    Refurbished,
    Bundle,
    Warranty,
}

impl std::fmt::Display for ExclusionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExclusionCategory::Accessory => "accessory",
            ExclusionCategory::Refurbished => "refurbished",
            ExclusionCategory::Bundle => "bundle",
            ExclusionCategory::Warranty => "warranty",
        };
        write!(f, "{}", label)
    }
}

const ACCESSORY_TERMS: &[&str] = &[
    "case",
    "cover",
    "protector",
    "charger",
    "cable",
    "adapter",
    "stand",
    "holder",
    "mount",
    "screen protector",
    "tempered glass",
    "glass",
    "foil",
    "sticker",
    "pouch",
    "bag",
    "sleeve",
    "flip cover",
    "flip case",
    "leather case",
];

const REFURBISHED_TERMS: &[&str] = &[
    "refurbished",
    "used",
    "open box",
    "renewed",
    "reconditioned",
    "certified",
    "b grade",
    "c grade",
    "seller refurbished",
];

const BUNDLE_TERMS: &[&str] = &["bundle", "combo", "pack", "set", "kit", "pair"];

const WARRANTY_TERMS: &[&str] = &[
    "warranty",
    "insurance",
    "protection plan",
    "extended warranty",
    "care plan",
    "accidental damage",
];

static EXCLUSION_RULES: Lazy<Vec<(ExclusionCategory, Regex)>> = Lazy::new(|| {
    [
        (ExclusionCategory::Accessory, ACCESSORY_TERMS),
        (ExclusionCategory::Refurbished, REFURBISHED_TERMS),
        (ExclusionCategory::Bundle, BUNDLE_TERMS),
        (ExclusionCategory::Warranty, WARRANTY_TERMS),
    ]
    .into_iter()
    .map(|(category, terms)| {
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap();
        (category, re)
    })
    .collect()
});

/// Check a title against the exclusion lexicon.
///
/// Returns the category and the matched keyword (lowercased) for logging,
/// or `None` when the title looks like an actual product.
pub fn exclusion_match(title: &str) -> Option<(ExclusionCategory, String)> {
    for (category, re) in EXCLUSION_RULES.iter() {
        if let Some(m) = re.find(title) {
            return Some((*category, m.as_str().to_lowercase()));
        }
    }
    None
}
