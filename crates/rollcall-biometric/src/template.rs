//! The fingerprint template artifact.
//!
//! A [`FingerprintTemplate`] is what a completed capture produces and what
//! the record store persists. The raw capture bytes are stored as standard
//! base64 text so they fit a plain `TEXT` column and a JSON envelope.

use crate::error::{Result, TemplateError};
use crate::quality::calculate_quality;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use rollcall_core::constants::MAX_QUALITY_SCORE;
use serde::{Deserialize, Serialize};

/// Encoded fingerprint capture.
///
/// # Development Note
///
/// The template format is whatever bytes the scanner streamed; it is not
/// interchangeable between scanner vendors. Templates are biometric data
/// and should be encrypted at rest in deployments that store real captures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintTemplate {
    /// Capture bytes encoded as standard base64.
    pub template: String,

    /// Quality score of the capture (0-100, higher is better).
    pub quality: u8,

    /// When the capture completed.
    pub timestamp: DateTime<Utc>,
}

impl FingerprintTemplate {
    /// Build a template from raw capture bytes.
    ///
    /// Encodes the whole buffer, scores it with
    /// [`calculate_quality`] and stamps the current time.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_biometric::FingerprintTemplate;
    ///
    /// let template = FingerprintTemplate::from_capture(&[0u8; 512]);
    /// assert_eq!(template.quality, 0);
    /// assert_eq!(template.decode().unwrap().len(), 512);
    /// ```
    pub fn from_capture(bytes: &[u8]) -> Self {
        Self {
            template: encode(bytes),
            quality: calculate_quality(bytes),
            timestamp: Utc::now(),
        }
    }

    /// Create a builder for a template that is already encoded.
    ///
    /// Used when rehydrating a template from storage.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_biometric::FingerprintTemplate;
    /// use chrono::Utc;
    ///
    /// let template = FingerprintTemplate::builder("AAEC", 40)
    ///     .timestamp(Utc::now())
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(template.decode().unwrap(), vec![0, 1, 2]);
    /// ```
    pub fn builder(template: impl Into<String>, quality: u8) -> FingerprintTemplateBuilder {
        FingerprintTemplateBuilder::new(template, quality)
    }

    /// Decode the template back to raw capture bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Decode`] if the text is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode(&self.template)
    }
}

/// Builder for [`FingerprintTemplate`] values that did not come from a capture.
#[derive(Debug, Clone)]
pub struct FingerprintTemplateBuilder {
    template: String,
    quality: u8,
    timestamp: Option<DateTime<Utc>>,
}

impl FingerprintTemplateBuilder {
    /// Create a builder with the required fields.
    pub fn new(template: impl Into<String>, quality: u8) -> Self {
        Self {
            template: template.into(),
            quality,
            timestamp: None,
        }
    }

    /// Set the capture timestamp. Defaults to now.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the template, validating quality and encoding.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::InvalidQuality`] if quality exceeds 100
    /// - [`TemplateError::Empty`] if the template text is empty
    /// - [`TemplateError::Decode`] if the text is not valid base64
    pub fn build(self) -> Result<FingerprintTemplate> {
        if self.quality > MAX_QUALITY_SCORE {
            return Err(TemplateError::InvalidQuality {
                quality: self.quality,
                max: MAX_QUALITY_SCORE,
            });
        }

        decode_non_empty(&self.template)?;

        Ok(FingerprintTemplate {
            template: self.template,
            quality: self.quality,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

/// Standard alphabet; padding optional, trailing bits ignored.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode raw bytes as standard base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 text, padded or not.
///
/// # Errors
///
/// Returns [`TemplateError::Decode`] for malformed input.
pub fn decode(template: &str) -> Result<Vec<u8>> {
    Ok(LENIENT.decode(template)?)
}

/// Decode standard base64 text, rejecting input that yields no bytes.
///
/// # Errors
///
/// - [`TemplateError::Empty`] for empty text or an empty payload
/// - [`TemplateError::Decode`] for malformed input
pub fn decode_non_empty(template: &str) -> Result<Vec<u8>> {
    if template.is_empty() {
        return Err(TemplateError::Empty);
    }

    let bytes = decode(template)?;
    if bytes.is_empty() {
        return Err(TemplateError::Empty);
    }

    Ok(bytes)
}
