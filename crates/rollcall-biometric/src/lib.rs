//! Fingerprint template handling for the Rollcall attendance system.
//!
//! This crate holds the pure, device-independent half of the fingerprint
//! pipeline:
//!
//! - [`FingerprintTemplate`]: the durable artifact produced by a capture and
//!   persisted by the record store.
//! - [`quality`]: a 0-100 score derived from the spread of captured bytes.
//! - [`matcher`]: byte-positional similarity between two stored templates.
//!
//! # Placeholder Algorithms
//!
//! Both the quality estimator and the matcher are crude proxies carried over
//! from the desktop application. They are not calibrated biometric metrics
//! and must be replaced by a minutiae-based matcher before relying on them
//! for identity decisions. Their contracts are kept exact so that templates
//! already enrolled keep producing the same verdicts.
//!
//! # Examples
//!
//! ```
//! use rollcall_biometric::{FingerprintTemplate, matcher};
//!
//! let capture = vec![0x10u8; 256]
//!     .into_iter()
//!     .chain(vec![0x20u8; 256])
//!     .collect::<Vec<_>>();
//!
//! let template = FingerprintTemplate::from_capture(&capture);
//! assert_eq!(template.quality, 80);
//!
//! let result = matcher::verify(&template.template, &template.template);
//! assert!(result.is_match);
//! assert_eq!(result.confidence, 100);
//! ```

pub mod error;
pub mod matcher;
pub mod quality;
pub mod template;

pub use error::{Result, TemplateError};
pub use matcher::{MatchResult, verify};
pub use quality::calculate_quality;
pub use template::{FingerprintTemplate, FingerprintTemplateBuilder};
