//! Error types for template handling.

/// Result type alias for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors raised while decoding or validating fingerprint templates.
///
/// The public [`verify`](crate::matcher::verify) entry point never returns
/// these; it degrades to a non-match instead. They surface through the
/// fallible helpers for callers that need to tell a bad template apart from
/// a genuine mismatch.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template text is not valid base64.
    #[error("Template decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Template is missing or decodes to zero bytes.
    #[error("Template is empty")]
    Empty,

    /// Quality score is outside 0-100.
    #[error("Template quality must be 0-{max}, got {quality}")]
    InvalidQuality { quality: u8, max: u8 },
}
