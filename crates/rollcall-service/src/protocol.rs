//! Request and response shapes of the dispatch boundary.
//!
//! Requests are JSON objects tagged by `action`:
//!
//! ```json
//! {"action": "connect", "path": "/dev/hidraw3"}
//! {"action": "verify", "scanned": "EBAQ...", "stored": "EBAQ..."}
//! {"action": "enroll", "studentId": "S-001"}
//! ```
//!
//! Every response is an [`Envelope`]: `{"success": true, ...payload}` or
//! `{"success": false, "error": "<message>"}`. A request may carry an `id`
//! of any JSON type; its envelope echoes it so replies that complete out of
//! order can be matched:
//!
//! ```json
//! {"id": 7, "action": "status"}
//! {"id": 7, "success": true, "connected": true, "scanning": true, "ready": false}
//! ```

use crate::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request to the fingerprint service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    /// List attached fingerprint scanners.
    ListDevices,

    /// Open a scanner, the first one found if `path` is absent.
    Connect {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    /// Close the scanner.
    Disconnect,

    /// Report connection and scanning state.
    Status,

    /// Capture one fingerprint.
    Scan,

    /// Compare two encoded templates. A missing side compares as empty.
    Verify {
        #[serde(default)]
        scanned: String,
        #[serde(default)]
        stored: String,
    },

    /// Capture a fingerprint and store it for a student.
    Enroll {
        #[serde(rename = "studentId")]
        student_id: String,
    },

    /// Capture a fingerprint and find the enrolled student it matches.
    Identify,

    /// Delete a student's enrolled fingerprint.
    RemoveFingerprint {
        #[serde(rename = "studentId")]
        student_id: String,
    },
}

impl Request {
    /// Parse one JSON request.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] for malformed JSON, an
    /// unknown action or missing fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_service::Request;
    ///
    /// let request = Request::parse(r#"{"action":"connect"}"#).unwrap();
    /// assert_eq!(request, Request::Connect { path: None });
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| ServiceError::invalid_request(e.to_string()))
    }

    /// Parse one JSON request line, splitting off its `id`.
    ///
    /// The `id` is recovered even when the request itself is invalid, so the
    /// error envelope can still be correlated.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_service::Request;
    /// use serde_json::json;
    ///
    /// let (id, request) = Request::parse_line(r#"{"id":"a1","action":"scan"}"#);
    /// assert_eq!(id, Some(json!("a1")));
    /// assert_eq!(request.unwrap(), Request::Scan);
    /// ```
    pub fn parse_line(line: &str) -> (Option<Value>, Result<Self>) {
        let mut value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => return (None, Err(ServiceError::invalid_request(e.to_string()))),
        };

        let id = value.as_object_mut().and_then(|fields| fields.remove("id"));
        let request =
            serde_json::from_value(value).map_err(|e| ServiceError::invalid_request(e.to_string()));
        (id, request)
    }

    /// Action name, for logs.
    pub fn action(&self) -> &'static str {
        match self {
            Self::ListDevices => "list_devices",
            Self::Connect { .. } => "connect",
            Self::Disconnect => "disconnect",
            Self::Status => "status",
            Self::Scan => "scan",
            Self::Verify { .. } => "verify",
            Self::Enroll { .. } => "enroll",
            Self::Identify => "identify",
            Self::RemoveFingerprint { .. } => "remove_fingerprint",
        }
    }
}

const SERIALIZATION_FAILURE: &str = r#"{"success":false,"error":"Response serialization failed"}"#;

/// Payload fields merged into a successful envelope.
pub type Payload = Map<String, Value>;

/// Serialize `value` into payload fields.
///
/// Objects are merged field by field; any other JSON value is placed under
/// `"data"`.
pub fn payload<T: Serialize>(value: &T) -> Result<Payload> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        Value::Null => Ok(Payload::new()),
        other => {
            let mut fields = Payload::new();
            fields.insert("data".to_string(), other);
            Ok(fields)
        }
    }
}

/// A payload holding the single field `name`.
pub fn field<T: Serialize>(name: &str, value: &T) -> Result<Payload> {
    let mut fields = Payload::new();
    fields.insert(name.to_string(), serde_json::to_value(value)?);
    Ok(fields)
}

/// The `{success, ...}` object returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Echo of the request `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Whether the request succeeded.
    pub success: bool,

    /// Failure message, present iff `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Result fields of a successful request.
    #[serde(flatten)]
    pub payload: Payload,
}

impl Envelope {
    /// A successful envelope carrying `payload`.
    pub fn success(payload: Payload) -> Self {
        Self {
            id: None,
            success: true,
            error: None,
            payload,
        }
    }

    /// A failed envelope carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            id: None,
            success: false,
            error: Some(message.into()),
            payload: Payload::new(),
        }
    }

    /// Attach the `id` of the request this envelope answers.
    pub fn with_id(mut self, id: Option<Value>) -> Self {
        self.id = id;
        self
    }

    /// Look up a payload field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    /// Serialize to a single JSON line.
    pub fn to_json_line(&self) -> String {
        // Payload keys are strings, so serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| SERIALIZATION_FAILURE.to_string())
    }
}

impl From<ServiceError> for Envelope {
    fn from(error: ServiceError) -> Self {
        Self::failure(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(r#"{"action":"list_devices"}"#, Request::ListDevices)]
    #[case(r#"{"action":"connect"}"#, Request::Connect { path: None })]
    #[case(
        r#"{"action":"connect","path":"/dev/hidraw0"}"#,
        Request::Connect { path: Some("/dev/hidraw0".into()) }
    )]
    #[case(r#"{"action":"disconnect"}"#, Request::Disconnect)]
    #[case(r#"{"action":"status"}"#, Request::Status)]
    #[case(r#"{"action":"scan"}"#, Request::Scan)]
    #[case(
        r#"{"action":"verify","scanned":"AA==","stored":"AQ=="}"#,
        Request::Verify { scanned: "AA==".into(), stored: "AQ==".into() }
    )]
    #[case(
        r#"{"action":"enroll","studentId":"S-1"}"#,
        Request::Enroll { student_id: "S-1".into() }
    )]
    #[case(
        r#"{"action":"verify","scanned":"AA=="}"#,
        Request::Verify { scanned: "AA==".into(), stored: String::new() }
    )]
    #[case(r#"{"action":"identify"}"#, Request::Identify)]
    #[case(
        r#"{"action":"remove_fingerprint","studentId":"S-1"}"#,
        Request::RemoveFingerprint { student_id: "S-1".into() }
    )]
    fn test_parse_requests(#[case] line: &str, #[case] expected: Request) {
        assert_eq!(Request::parse(line).unwrap(), expected);
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"action":"format_disk"}"#)]
    #[case(r#"{"path":"/dev/hidraw0"}"#)]
    #[case(r#"{"action":"enroll"}"#)]
    fn test_parse_rejects(#[case] line: &str) {
        assert!(matches!(
            Request::parse(line),
            Err(ServiceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_line_splits_id() {
        let (id, request) =
            Request::parse_line(r#"{"id":42,"action":"connect","path":"/dev/hidraw1"}"#);
        assert_eq!(id, Some(json!(42)));
        assert_eq!(
            request.unwrap(),
            Request::Connect {
                path: Some("/dev/hidraw1".into())
            }
        );

        let (id, request) = Request::parse_line(r#"{"action":"status"}"#);
        assert_eq!(id, None);
        assert_eq!(request.unwrap(), Request::Status);
    }

    #[rstest]
    #[case(r#"{"id":"x","action":"reboot"}"#, Some(json!("x")))]
    #[case(r#"{"id":3}"#, Some(json!(3)))]
    #[case(r#"[1,2]"#, None)]
    #[case("{broken", None)]
    fn test_parse_line_keeps_id_of_invalid_request(
        #[case] line: &str,
        #[case] expected: Option<Value>,
    ) {
        let (id, request) = Request::parse_line(line);
        assert_eq!(id, expected);
        assert!(matches!(request, Err(ServiceError::InvalidRequest(_))));
    }

    #[test]
    fn test_envelope_echoes_id() {
        let envelope = Envelope::failure("Scan already in progress").with_id(Some(json!(4)));
        assert_eq!(
            envelope.to_json_line(),
            r#"{"id":4,"success":false,"error":"Scan already in progress"}"#
        );
    }

    #[test]
    fn test_action_names_round_trip() {
        let request = Request::RemoveFingerprint {
            student_id: "S-1".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["action"], request.action());
    }

    #[test]
    fn test_success_envelope_flattens_payload() {
        let envelope = Envelope::success(payload(&json!({"connected": true})).unwrap());
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json, json!({"success": true, "connected": true}));
    }

    #[test]
    fn test_failure_envelope() {
        let envelope = Envelope::failure("Scan already in progress");
        assert_eq!(
            envelope.to_json_line(),
            r#"{"success":false,"error":"Scan already in progress"}"#
        );
    }

    #[test]
    fn test_payload_wraps_non_objects() {
        let fields = payload(&vec![1, 2]).unwrap();
        assert_eq!(fields["data"], json!([1, 2]));
        assert!(payload(&()).unwrap().is_empty());
    }
}
