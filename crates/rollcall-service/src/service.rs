//! The fingerprint dispatch service.
//!
//! [`FingerprintService`] owns the scanner session and the record store and
//! answers [`Request`]s with [`Envelope`]s. It is the only place internal
//! errors become `{success: false, error}` objects; the scanner and store
//! return typed errors.
//!
//! ```text
//! JSON line ──► Request ──► FingerprintService ──┬──► FingerprintScanner
//!                                                ├──► matcher
//!                                                └──► StudentRepository
//!                              │
//!                              ▼
//!                           Envelope ──► JSON line
//! ```

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::protocol::{Envelope, Payload, Request, field, payload};
use rollcall_biometric::{FingerprintTemplate, MatchResult, matcher};
use rollcall_hardware::{FingerprintScanner, HidBackend};
use rollcall_storage::{StorageError, Student, StudentRepository};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of matching one capture against every enrolled student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identification {
    /// Whether an enrolled student matched.
    pub matched: bool,

    /// The best-matching student.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,

    /// Verdict for the best-matching student.
    #[serde(flatten)]
    pub result: Option<MatchResult>,
}

impl Identification {
    fn unmatched() -> Self {
        Self {
            matched: false,
            student: None,
            result: None,
        }
    }
}

/// Request dispatcher over one scanner session and one record store.
///
/// # Examples
///
/// ```
/// use rollcall_hardware::FingerprintScanner;
/// use rollcall_hardware::mock::MockHidBackend;
/// use rollcall_service::{FingerprintService, Request, ServiceConfig};
/// use rollcall_storage::{Database, SqliteStudentRepository};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let (backend, _handle) = MockHidBackend::with_scanner();
///     let db = Database::in_memory().await?;
///     let service = FingerprintService::new(
///         FingerprintScanner::new(backend),
///         SqliteStudentRepository::new(db.pool().clone()),
///         ServiceConfig::default(),
///     );
///
///     let envelope = service.dispatch(Request::Connect { path: None }).await;
///     assert!(envelope.success);
///
///     service.shutdown();
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FingerprintService<B: HidBackend, R> {
    scanner: FingerprintScanner<B>,
    students: R,
    config: ServiceConfig,
}

impl<B: HidBackend, R: StudentRepository> FingerprintService<B, R> {
    /// Create a service owning `scanner` and `students`.
    pub fn new(scanner: FingerprintScanner<B>, students: R, config: ServiceConfig) -> Self {
        Self {
            scanner,
            students,
            config,
        }
    }

    /// The scanner session.
    pub fn scanner(&self) -> &FingerprintScanner<B> {
        &self.scanner
    }

    /// The record store.
    pub fn students(&self) -> &R {
        &self.students
    }

    /// The service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Parse one JSON request line and dispatch it.
    ///
    /// The envelope echoes the request `id`, if any.
    pub async fn dispatch_json(&self, line: &str) -> Envelope {
        let (id, request) = Request::parse_line(line);
        let envelope = match request {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                warn!("Rejected request: {}", e);
                Envelope::from(e)
            }
        };
        envelope.with_id(id)
    }

    /// Handle one request, translating any failure into an envelope.
    pub async fn dispatch(&self, request: Request) -> Envelope {
        let action = request.action();
        debug!("Dispatching {}", action);

        match self.handle(request).await {
            Ok(fields) => Envelope::success(fields),
            Err(e) => {
                warn!("Request {} failed: {}", action, e);
                Envelope::from(e)
            }
        }
    }

    async fn handle(&self, request: Request) -> Result<Payload> {
        match request {
            Request::ListDevices => field("devices", &self.scanner.list_devices()),
            Request::Connect { path } => {
                let path = self.scanner.connect(path.as_deref())?;
                field("path", &path)
            }
            Request::Disconnect => {
                self.scanner.disconnect();
                Ok(Payload::new())
            }
            Request::Status => payload(&self.scanner.status()),
            Request::Scan => payload(&self.scanner.scan().await?),
            Request::Verify { scanned, stored } => payload(&matcher::verify(&scanned, &stored)),
            Request::Enroll { student_id } => {
                let template = self.enroll(&student_id).await?;
                let mut fields = payload(&template)?;
                fields.insert("studentId".to_string(), student_id.into());
                Ok(fields)
            }
            Request::Identify => payload(&self.identify().await?),
            Request::RemoveFingerprint { student_id } => {
                self.remove_fingerprint(&student_id).await?;
                field("studentId", &student_id)
            }
        }
    }

    /// Capture a fingerprint and store it for the student with `student_code`.
    ///
    /// The student must exist before the scanner is armed.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if no such student exists
    /// - any scan error of [`FingerprintScanner::scan`]
    /// - [`ServiceError::LowQuality`] if the capture scores below
    ///   [`ServiceConfig::min_enroll_quality`]; nothing is stored
    pub async fn enroll(&self, student_code: &str) -> Result<FingerprintTemplate> {
        if self.students.find_by_code(student_code).await?.is_none() {
            return Err(StorageError::student_not_found("student_code", student_code).into());
        }

        let template = self.scanner.scan().await?;
        if template.quality < self.config.min_enroll_quality {
            return Err(ServiceError::LowQuality {
                quality: template.quality,
                minimum: self.config.min_enroll_quality,
            });
        }

        self.students
            .update_fingerprint(student_code, &template)
            .await?;
        Ok(template)
    }

    /// Capture a fingerprint and identify the enrolled student it matches.
    pub async fn identify(&self) -> Result<Identification> {
        let template = self.scanner.scan().await?;
        self.identify_template(&template.template).await
    }

    /// Match an encoded template against every enrolled student.
    ///
    /// Picks the matching student with the highest confidence; ties go to
    /// the lowest student id.
    pub async fn identify_template(&self, template: &str) -> Result<Identification> {
        let enrolled = self.students.find_enrolled().await?;
        let candidates = enrolled.len();

        let mut best: Option<(Student, MatchResult)> = None;
        for student in enrolled {
            let Some(stored) = student.enrolled_template() else {
                continue;
            };

            let result = matcher::verify(template, stored);
            if !result.is_match {
                continue;
            }
            if best
                .as_ref()
                .is_none_or(|(_, current)| result.confidence > current.confidence)
            {
                best = Some((student, result));
            }
        }

        match best {
            Some((student, result)) => {
                info!(
                    "Identified student {} ({}% confidence)",
                    student.student_code, result.confidence
                );
                Ok(Identification {
                    matched: true,
                    student: Some(student),
                    result: Some(result),
                })
            }
            None => {
                info!("No match among {} enrolled student(s)", candidates);
                Ok(Identification::unmatched())
            }
        }
    }

    /// Delete the enrolled fingerprint of the student with `student_code`.
    pub async fn remove_fingerprint(&self, student_code: &str) -> Result<()> {
        self.students.remove_fingerprint(student_code).await?;
        Ok(())
    }

    /// Release the scanner. Safe to call more than once.
    pub fn shutdown(&self) {
        self.scanner.disconnect();
        info!("Fingerprint service stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_hardware::mock::{MockHidBackend, MockHidHandle};
    use rollcall_storage::{Database, SqliteStudentRepository};
    use serde_json::json;

    async fn service() -> (
        FingerprintService<MockHidBackend, SqliteStudentRepository>,
        MockHidHandle,
    ) {
        let (backend, handle) = MockHidBackend::with_scanner();
        let db = Database::in_memory().await.unwrap();
        let service = FingerprintService::new(
            FingerprintScanner::new(backend),
            SqliteStudentRepository::new(db.pool().clone()),
            ServiceConfig::default(),
        );
        (service, handle)
    }

    fn template_of(bytes: &[u8]) -> String {
        FingerprintTemplate::from_capture(bytes).template
    }

    #[tokio::test]
    async fn test_identify_template_without_enrollments() {
        let (service, _handle) = service().await;
        let identification = service.identify_template(&template_of(&[1; 512])).await.unwrap();
        assert_eq!(identification, Identification::unmatched());
    }

    #[tokio::test]
    async fn test_identify_template_prefers_highest_confidence() {
        let (service, _handle) = service().await;
        let students = service.students();
        students.create_student("Near", "S-1").await.unwrap();
        students.create_student("Exact", "S-2").await.unwrap();

        let probe = vec![7u8; 100];
        let mut near = probe.clone();
        near[..10].fill(0);

        students
            .update_fingerprint("S-1", &FingerprintTemplate::from_capture(&near))
            .await
            .unwrap();
        students
            .update_fingerprint("S-2", &FingerprintTemplate::from_capture(&probe))
            .await
            .unwrap();

        let identification = service.identify_template(&template_of(&probe)).await.unwrap();
        assert!(identification.matched);
        assert_eq!(identification.student.unwrap().student_code, "S-2");
        assert_eq!(identification.result.unwrap().confidence, 100);
    }

    #[tokio::test]
    async fn test_identify_template_ignores_below_threshold() {
        let (service, _handle) = service().await;
        service.students().create_student("Far", "S-1").await.unwrap();
        service
            .students()
            .update_fingerprint("S-1", &FingerprintTemplate::from_capture(&[9u8; 100]))
            .await
            .unwrap();

        let identification = service.identify_template(&template_of(&[8u8; 100])).await.unwrap();
        assert!(!identification.matched);
    }

    #[test]
    fn test_unmatched_serialization() {
        let json = serde_json::to_value(Identification::unmatched()).unwrap();
        assert_eq!(json, json!({ "matched": false }));
    }
}
