//! Template comparison.
//!
//! Two templates are compared position by position over their common
//! prefix: the similarity ratio is the fraction of positions holding the
//! same byte, and a ratio of 0.85 or more is a match. Trailing bytes of the
//! longer template are ignored.
//!
//! This is a byte-equality proxy, not a geometric or minutiae matcher. Two
//! captures of the same finger taken at different moments will rarely line
//! up byte for byte. It exists so that the enrollment and identification
//! flows can be exercised end to end, and it is expected to be replaced by
//! a real biometric algorithm.

use crate::error::Result;
use crate::template::decode_non_empty;
use rollcall_core::constants::{MATCH_THRESHOLD, MATCH_THRESHOLD_PERCENT};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Verdict of comparing two templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the similarity reached the threshold.
    #[serde(rename = "match")]
    pub is_match: bool,

    /// Similarity as a rounded percentage (0-100).
    pub confidence: u8,

    /// Threshold the similarity was compared against, as a percentage.
    pub threshold: u8,
}

impl MatchResult {
    /// A confident non-match, used for absent or unreadable templates.
    pub fn no_match() -> Self {
        Self {
            is_match: false,
            confidence: 0,
            threshold: MATCH_THRESHOLD_PERCENT,
        }
    }

    /// Build a verdict from a similarity ratio in `0.0..=1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_biometric::MatchResult;
    ///
    /// let result = MatchResult::from_similarity(0.85);
    /// assert!(result.is_match);
    /// assert_eq!(result.confidence, 85);
    ///
    /// let result = MatchResult::from_similarity(0.849);
    /// assert!(!result.is_match);
    /// assert_eq!(result.confidence, 85);
    /// ```
    pub fn from_similarity(similarity: f64) -> Self {
        Self {
            is_match: similarity >= MATCH_THRESHOLD,
            confidence: (similarity * 100.0).round().clamp(0.0, 100.0) as u8,
            threshold: MATCH_THRESHOLD_PERCENT,
        }
    }
}

/// Fraction of equal bytes over the overlapping prefix of `a` and `b`.
///
/// Returns `0.0` when either slice is empty.
///
/// # Examples
///
/// ```
/// use rollcall_biometric::matcher::similarity;
///
/// assert_eq!(similarity(&[1, 2, 3, 4], &[1, 2, 0, 0]), 0.5);
///
/// // Only the common prefix is compared.
/// assert_eq!(similarity(&[1, 2], &[1, 2, 3, 4, 5]), 1.0);
/// ```
pub fn similarity(a: &[u8], b: &[u8]) -> f64 {
    let overlap = a.len().min(b.len());
    if overlap == 0 {
        return 0.0;
    }

    let matching = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matching as f64 / overlap as f64
}

/// Decode two base64 templates and compute their similarity ratio.
///
/// # Errors
///
/// - [`TemplateError::Empty`](crate::TemplateError::Empty) if either template
///   is empty or decodes to no bytes
/// - [`TemplateError::Decode`](crate::TemplateError::Decode) if either is not
///   valid base64
pub fn compare_templates(scanned: &str, stored: &str) -> Result<f64> {
    let scanned = decode_non_empty(scanned)?;
    let stored = decode_non_empty(stored)?;

    Ok(similarity(&scanned, &stored))
}

/// Verify a freshly scanned template against a stored one.
///
/// Never fails: absent, empty or malformed templates yield
/// [`MatchResult::no_match`].
///
/// # Examples
///
/// ```
/// use rollcall_biometric::verify;
///
/// let result = verify("AQIDBA==", "AQIDBA==");
/// assert!(result.is_match);
/// assert_eq!(result.confidence, 100);
///
/// let result = verify("", "AQIDBA==");
/// assert!(!result.is_match);
/// assert_eq!(result.confidence, 0);
/// ```
pub fn verify(scanned: &str, stored: &str) -> MatchResult {
    if scanned.is_empty() || stored.is_empty() {
        return MatchResult::no_match();
    }

    match compare_templates(scanned, stored) {
        Ok(similarity) => MatchResult::from_similarity(similarity),
        Err(e) => {
            warn!("Verification error: {}", e);
            MatchResult::no_match()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::encode;
    use rstest::rstest;

    #[test]
    fn test_verify_identical() {
        let t = encode(&[9u8; 700]);
        let result = verify(&t, &t);
        assert_eq!(
            result,
            MatchResult {
                is_match: true,
                confidence: 100,
                threshold: 85
            }
        );
    }

    #[test]
    fn test_verify_disjoint() {
        let a = encode(&[0u8; 512]);
        let b = encode(&[1u8; 512]);
        let result = verify(&a, &b);
        assert!(!result.is_match);
        assert_eq!(result.confidence, 0);
    }

    #[rstest]
    #[case("", "AQID")]
    #[case("AQID", "")]
    #[case("", "")]
    fn test_verify_empty_inputs(#[case] scanned: &str, #[case] stored: &str) {
        let result = verify(scanned, stored);
        assert!(!result.is_match);
        assert_eq!(result.confidence, 0);
    }

    #[rstest]
    #[case("***", "AQID")]
    #[case("AQID", "not base64 at all")]
    fn test_verify_malformed_inputs(#[case] scanned: &str, #[case] stored: &str) {
        assert_eq!(verify(scanned, stored), MatchResult::no_match());
    }

    #[test]
    fn test_verify_padding_only_is_no_match() {
        // Padding alone carries no bytes.
        assert_eq!(verify("====", "AQID"), MatchResult::no_match());
    }

    #[test]
    fn test_verify_unpadded_templates() {
        assert_eq!(verify("AQI", "AQI").confidence, 100);
        assert!(verify("AQI", "AQI=").is_match);
    }

    #[test]
    fn test_compare_templates_reports_errors() {
        assert!(matches!(
            compare_templates("", "AQID"),
            Err(crate::TemplateError::Empty)
        ));
        assert!(matches!(
            compare_templates("!!", "AQID"),
            Err(crate::TemplateError::Decode(_))
        ));
    }

    #[rstest]
    #[case::all_equal(&[1, 2, 3, 4], &[1, 2, 3, 4], 1.0)]
    #[case::half(&[1, 2, 3, 4], &[1, 2, 9, 9], 0.5)]
    #[case::none(&[1, 2], &[3, 4], 0.0)]
    #[case::longer_stored(&[1, 2], &[1, 2, 3], 1.0)]
    #[case::longer_scanned(&[1, 9, 3], &[1, 2], 0.5)]
    #[case::empty(&[], &[1], 0.0)]
    fn test_similarity(#[case] a: &[u8], #[case] b: &[u8], #[case] expected: f64) {
        assert_eq!(similarity(a, b), expected);
    }

    #[test]
    fn test_threshold_boundary() {
        // 17 of 20 positions equal -> exactly 0.85
        let a = vec![0u8; 20];
        let mut b = vec![0u8; 20];
        b[0] = 1;
        b[1] = 1;
        b[2] = 1;

        let result = verify(&encode(&a), &encode(&b));
        assert!(result.is_match);
        assert_eq!(result.confidence, 85);

        // 16 of 20 -> 0.80
        b[3] = 1;
        let result = verify(&encode(&a), &encode(&b));
        assert!(!result.is_match);
        assert_eq!(result.confidence, 80);
    }

    #[test]
    fn test_match_result_json_shape() {
        let json = serde_json::to_value(MatchResult::from_similarity(1.0)).unwrap();
        assert_eq!(json["match"], true);
        assert_eq!(json["confidence"], 100);
        assert_eq!(json["threshold"], 85);
    }
}
