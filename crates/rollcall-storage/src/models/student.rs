use chrono::{DateTime, Utc};
use rollcall_biometric::FingerprintTemplate;
use serde::{Deserialize, Serialize};

/// Student entity with its enrolled fingerprint, if any.
///
/// Only the identity and fingerprint columns of the school's student
/// record live here; the rest of the record belongs to the school
/// administration application.
///
/// # Database Schema
///
/// Maps to the `students` table:
/// - `student_code` is unique (natural key used by enrollment requests)
/// - `fingerprint_enrolled` implies `fingerprint_data` is present
/// - `fingerprint_quality` is within 0-100 when present
///
/// # Examples
///
/// ```
/// use rollcall_storage::models::Student;
/// use chrono::Utc;
///
/// let student = Student {
///     id: 1,
///     student_code: "S-2024-001".to_string(),
///     name: "Ada Obi".to_string(),
///     fingerprint_data: Some("AAEC".to_string()),
///     fingerprint_enrolled: true,
///     fingerprint_quality: Some(72),
///     enrolled_at: Some(Utc::now()),
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// assert_eq!(student.enrolled_template(), Some("AAEC"));
/// assert!(student.fingerprint().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Auto-increment primary key
    pub id: i64,

    /// Unique school-issued student code
    pub student_code: String,

    /// Display name
    pub name: String,

    /// Base64 fingerprint template, `None` until enrolled
    pub fingerprint_data: Option<String>,

    /// Whether a fingerprint is enrolled
    pub fingerprint_enrolled: bool,

    /// Quality score of the enrolled capture
    pub fingerprint_quality: Option<u8>,

    /// When the current fingerprint was enrolled
    pub enrolled_at: Option<DateTime<Utc>>,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,

    /// Record last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// The enrolled template text, if the student is enrolled.
    pub fn enrolled_template(&self) -> Option<&str> {
        if !self.fingerprint_enrolled {
            return None;
        }
        self.fingerprint_data.as_deref()
    }

    /// Rebuild the enrolled template artifact.
    ///
    /// Returns `None` if the student is not enrolled or the stored row is
    /// not a valid template.
    pub fn fingerprint(&self) -> Option<FingerprintTemplate> {
        let data = self.enrolled_template()?;
        let mut builder =
            FingerprintTemplate::builder(data, self.fingerprint_quality.unwrap_or_default());
        if let Some(enrolled_at) = self.enrolled_at {
            builder = builder.timestamp(enrolled_at);
        }
        builder.build().ok()
    }
}
