//! Property-based tests for the template matcher and quality estimator.
//!
//! These use proptest to check the verdict contract over arbitrary
//! templates rather than hand-picked samples.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use proptest::prelude::*;
use rollcall_biometric::{FingerprintTemplate, calculate_quality, matcher, verify};

/// Non-empty capture buffers of realistic size.
fn capture_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..2048)
}

proptest! {
    /// Property: a template always matches itself with full confidence.
    #[test]
    fn prop_self_verification(bytes in capture_bytes()) {
        let encoded = STANDARD.encode(&bytes);
        let result = verify(&encoded, &encoded);

        prop_assert!(result.is_match);
        prop_assert_eq!(result.confidence, 100);
        prop_assert_eq!(result.threshold, 85);
    }

    /// Property: templates differing at every overlapping position score 0.
    #[test]
    fn prop_disjoint_templates(bytes in capture_bytes(), extra in 0usize..64) {
        let flipped: Vec<u8> = bytes
            .iter()
            .map(|b| b.wrapping_add(1))
            .chain(std::iter::repeat_n(0u8, extra))
            .collect();

        let result = verify(&STANDARD.encode(&bytes), &STANDARD.encode(&flipped));
        prop_assert!(!result.is_match);
        prop_assert_eq!(result.confidence, 0);
    }

    /// Property: an empty side is always a confident non-match.
    #[test]
    fn prop_empty_side_never_matches(bytes in capture_bytes()) {
        let encoded = STANDARD.encode(&bytes);

        let left = verify("", &encoded);
        let right = verify(&encoded, "");
        prop_assert!(!left.is_match && left.confidence == 0);
        prop_assert!(!right.is_match && right.confidence == 0);
    }

    /// Property: similarity is symmetric and bounded.
    #[test]
    fn prop_similarity_symmetric(a in capture_bytes(), b in capture_bytes()) {
        let ab = matcher::similarity(&a, &b);
        let ba = matcher::similarity(&b, &a);

        prop_assert_eq!(ab, ba);
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    /// Property: quality is always within 0-100 and captures round-trip.
    #[test]
    fn prop_capture_template(bytes in capture_bytes()) {
        let template = FingerprintTemplate::from_capture(&bytes);

        prop_assert!(template.quality <= 100);
        prop_assert_eq!(template.quality, calculate_quality(&bytes));
        prop_assert_eq!(template.decode().unwrap(), bytes);
    }
}
