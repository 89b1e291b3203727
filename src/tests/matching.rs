//! Matching-engine properties that cut across gates and cascade.

use crate::listing::Source;
use crate::matching::gates;
use crate::matching::{find_best_match, Candidate, MatchLevel};
use crate::tests::support::scored;

#[test]
fn test_perfect_is_never_reached_through_a_gate_bypass() {
    // Any pair the engine reports as Perfect must also pass the hard
    // gates when checked directly.
    let a = scored("iPhone 14 Pro 256GB Space Black", 0.9, Source::A);
    let b = scored("Apple iPhone 14 Pro (Space Black, 256GB)", 0.85, Source::B);

    let result = find_best_match(
        std::slice::from_ref(&a),
        std::slice::from_ref(&b),
    )
    .unwrap();
    assert_eq!(result.level, MatchLevel::Perfect);

    let cand_a = Candidate::new(&a);
    let cand_b = Candidate::new(&b);
    let similarity = gates::check(&cand_a, &cand_b);
    assert!(similarity.is_some());
    assert!(similarity.unwrap() >= gates::NAME_SIMILARITY_GATE);
}

#[test]
fn test_one_sided_storage_is_not_a_rejection() {
    // Regression guard: "one side has storage, the other doesn't" must
    // never disqualify a pair; it resolves at ColorOnly or better.
    let a = vec![scored("iPhone 17 Pro Cosmic Orange", 0.9, Source::A)];
    let b = vec![scored("iPhone 17 Pro Cosmic Orange 256GB", 0.9, Source::B)];

    let result = find_best_match(&a, &b).expect("pair must not be rejected");
    assert!(matches!(
        result.level,
        MatchLevel::Perfect | MatchLevel::ColorStorage | MatchLevel::ColorOnly
    ));
    assert_eq!(result.level, MatchLevel::ColorOnly);
}

#[test]
fn test_color_agreement_outranks_relevance_order() {
    // B1 outranks B2 on relevance but carries the wrong color; the engine
    // must pick B2 at a color-bearing level, never B1.
    let a = vec![scored("iPhone 17 Pro Cosmic Orange 256GB", 0.95, Source::A)];
    let b = vec![
        scored("Apple iPhone 17 Pro (Deep Blue, 256GB)", 0.99, Source::B),
        scored("Apple iPhone 17 Pro (Cosmic Orange, 256GB)", 0.70, Source::B),
    ];

    let result = find_best_match(&a, &b).unwrap();
    assert!(result.b.title.contains("Cosmic Orange"));
}

#[test]
fn test_no_gate_survivor_means_no_result_at_all() {
    // PartialWithWarning is a fallback within the gate envelope, never
    // outside it: different brands produce no result, not a partial one.
    let a = vec![scored("Samsung Galaxy S24 256GB Black", 0.9, Source::A)];
    let b = vec![scored("Apple iPhone 15 256GB Black", 0.9, Source::B)];

    assert!(find_best_match(&a, &b).is_none());
}

#[test]
fn test_partial_match_always_carries_warnings() {
    let a = vec![scored("Apple iPhone 15 (128 GB) - Black", 0.9, Source::A)];
    let b = vec![scored("Apple iPhone 15 (256 GB) - Blue", 0.9, Source::B)];

    let result = find_best_match(&a, &b).unwrap();
    assert_eq!(result.level, MatchLevel::PartialWithWarning);
    assert!(!result.warnings.is_empty());
    assert!(result.warnings.iter().any(|w| w.contains("colors do not match")));
    assert!(result.warnings.iter().any(|w| w.contains("storage differs")));
}

#[test]
fn test_tier_variants_never_cross_match() {
    // "iPhone 15" and "iPhone 15 Pro" are different products even with
    // matching color and storage.
    let a = vec![scored("Apple iPhone 15 Black 128GB", 0.9, Source::A)];
    let b = vec![scored("Apple iPhone 15 Pro Black 128GB", 0.9, Source::B)];

    assert!(find_best_match(&a, &b).is_none());
}
