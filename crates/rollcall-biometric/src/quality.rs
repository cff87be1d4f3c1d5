//! Capture quality estimation.
//!
//! The score is derived from the population standard deviation of the raw
//! capture bytes: a flat buffer (a finger that never touched the sensor, or
//! a stuck reader) scores 0, while a buffer with a spread of 10 or more
//! scores 100.
//!
//! This is a placeholder heuristic. It assumes more spread means more ridge
//! detail, which is not a calibrated biometric quality metric (such as NFIQ)
//! and should be replaced together with the matcher.

use rollcall_core::constants::{MAX_QUALITY_SCORE, MIN_QUALITY_SCORE, QUALITY_SCALE_DIVISOR};

/// Population standard deviation of a byte sequence.
///
/// Returns `0.0` for an empty sequence.
///
/// # Examples
///
/// ```
/// use rollcall_biometric::quality::standard_deviation;
///
/// assert_eq!(standard_deviation(&[5, 5, 5, 5]), 0.0);
/// assert_eq!(standard_deviation(&[16, 32]), 8.0);
/// ```
pub fn standard_deviation(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let len = data.len() as f64;
    let mean = data.iter().map(|&b| f64::from(b)).sum::<f64>() / len;
    let squared_diffs = data
        .iter()
        .map(|&b| (f64::from(b) - mean).powi(2))
        .sum::<f64>();

    (squared_diffs / len).sqrt()
}

/// Calculate a 0-100 quality score for raw capture bytes.
///
/// The standard deviation is scaled by `/ 10 * 100`, clamped to the
/// quality range and rounded to the nearest integer.
///
/// # Examples
///
/// ```
/// use rollcall_biometric::calculate_quality;
///
/// // Uniform data carries no detail.
/// assert_eq!(calculate_quality(&[0x42; 512]), 0);
///
/// // Bimodal data with a deviation of 8.
/// let mut data = vec![0x10u8; 256];
/// data.extend(vec![0x20u8; 256]);
/// assert_eq!(calculate_quality(&data), 80);
///
/// // Wide spread saturates at 100.
/// assert_eq!(calculate_quality(&[0, 255]), 100);
/// ```
pub fn calculate_quality(data: &[u8]) -> u8 {
    let scaled = standard_deviation(data) / QUALITY_SCALE_DIVISOR * 100.0;
    let clamped = scaled.clamp(
        f64::from(MIN_QUALITY_SCORE),
        f64::from(MAX_QUALITY_SCORE),
    );

    clamped.round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_standard_deviation_empty() {
        assert_eq!(standard_deviation(&[]), 0.0);
    }

    #[test]
    fn test_standard_deviation_single_value() {
        assert_eq!(standard_deviation(&[200]), 0.0);
    }

    #[test]
    fn test_standard_deviation_known_values() {
        // mean 5, squared diffs 9+1+1+9 = 20, /4 = 5
        let sd = standard_deviation(&[2, 4, 6, 8]);
        assert!((sd - 5f64.sqrt()).abs() < 1e-12);
    }

    #[rstest]
    #[case::empty(&[], 0)]
    #[case::uniform(&[7, 7, 7, 7], 0)]
    #[case::sd_half(&[0, 1], 5)]
    #[case::sd_one(&[0, 2], 10)]
    #[case::sd_eight(&[16, 32], 80)]
    #[case::sd_exactly_ten(&[0, 20], 100)]
    #[case::saturated(&[0, 255], 100)]
    fn test_calculate_quality(#[case] data: &[u8], #[case] expected: u8) {
        assert_eq!(calculate_quality(data), expected);
    }

    #[test]
    fn test_quality_rounds_to_nearest() {
        // sd = sqrt(2/9) ~= 0.4714 -> 4.714 -> 5
        assert_eq!(calculate_quality(&[0, 0, 1]), 5);
    }

    #[test]
    fn test_bimodal_capture_quality() {
        let mut data = vec![0x10u8; 256];
        data.extend(vec![0x20u8; 256]);
        let quality = calculate_quality(&data);
        assert_eq!(quality, 80);
        assert!(quality > 0);
    }
}
