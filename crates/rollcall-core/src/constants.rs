//! Core constants for the fingerprint enrollment and verification pipeline.
//!
//! The capture threshold, match threshold and quality scale are placeholders
//! inherited from the desktop application. They are kept exactly as-is so
//! that stored templates and verdicts stay compatible until a real biometric
//! matcher replaces them.
//!
//! # Usage
//!
//! ```
//! use rollcall_core::constants::*;
//! use std::time::Duration;
//!
//! let timeout = Duration::from_millis(DEFAULT_SCAN_TIMEOUT_MS);
//! assert_eq!(timeout.as_secs(), 10);
//! assert_eq!(MIN_TEMPLATE_SIZE, 512);
//! ```

// ============================================================================
// Capture
// ============================================================================

/// Default time allowed for a single capture, in milliseconds.
///
/// If the scanner has not streamed [`MIN_TEMPLATE_SIZE`] bytes within this
/// window the scan fails with a timeout.
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 10_000;

/// Minimum number of accumulated bytes that completes a capture.
///
/// The capture state machine checks this after every chunk. Bytes beyond
/// the threshold are kept in the template, never truncated.
pub const MIN_TEMPLATE_SIZE: usize = 512;

/// Size of a single HID input report read from a scanner.
pub const HID_REPORT_SIZE: usize = 64;

/// Poll interval of the blocking HID reader thread, in milliseconds.
pub const HID_READ_POLL_MS: i32 = 100;

// ============================================================================
// Quality
// ============================================================================

/// Lowest possible quality score.
pub const MIN_QUALITY_SCORE: u8 = 0;

/// Highest possible quality score.
pub const MAX_QUALITY_SCORE: u8 = 100;

/// Standard deviation that maps to a full quality score.
///
/// Quality is `std_dev / QUALITY_SCALE_DIVISOR * 100`, clamped to 0-100, so
/// any capture whose bytes deviate by 10 or more scores 100.
pub const QUALITY_SCALE_DIVISOR: f64 = 10.0;

// ============================================================================
// Matching
// ============================================================================

/// Similarity ratio at or above which two templates are considered a match.
pub const MATCH_THRESHOLD: f64 = 0.85;

/// [`MATCH_THRESHOLD`] expressed as a whole percentage.
pub const MATCH_THRESHOLD_PERCENT: u8 = 85;

// ============================================================================
// Device Signatures
// ============================================================================

/// DigitalPersona (U.are.U readers).
pub const VENDOR_DIGITALPERSONA: u16 = 0x1C7A;

/// ZKTeco.
pub const VENDOR_ZKTECO: u16 = 0x2808;

/// Goodix.
pub const VENDOR_GOODIX: u16 = 0x27C6;

/// Synaptics.
pub const VENDOR_SYNAPTICS: u16 = 0x06CB;

/// Upek / Validity Sensors.
pub const VENDOR_UPEK_VALIDITY: u16 = 0x147E;

/// USB vendor ids recognized as fingerprint scanner manufacturers.
pub const FINGERPRINT_VENDOR_IDS: [u16; 5] = [
    VENDOR_DIGITALPERSONA,
    VENDOR_ZKTECO,
    VENDOR_GOODIX,
    VENDOR_SYNAPTICS,
    VENDOR_UPEK_VALIDITY,
];

/// Case-insensitive product name fragment that marks a scanner of unknown vendor.
pub const FINGERPRINT_NAME_HINT: &str = "fingerprint";

/// Manufacturer reported when the device leaves the string empty.
pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

/// Product reported when the device leaves the string empty.
pub const DEFAULT_PRODUCT_NAME: &str = "Fingerprint Scanner";
