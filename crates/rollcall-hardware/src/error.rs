//! Error types for scanner operations.
//!
//! This module defines the failure taxonomy of the device registry, the
//! device session and the capture state machine. Display strings are meant
//! to be shown to the operator as-is ("plug in the device", "try again").

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while talking to a fingerprint scanner.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The registry found no recognized scanner to connect to.
    #[error("No fingerprint scanner found")]
    NoDeviceFound,

    /// Opening the scanner handle failed.
    #[error(
        "Could not connect to fingerprint scanner. Make sure the device is plugged in. ({message})"
    )]
    ConnectionError { message: String },

    /// A scan was requested without an open scanner handle.
    #[error("Scanner not connected. Please connect a fingerprint scanner first.")]
    NotConnected,

    /// Another capture is already running on this session.
    #[error("Scan already in progress")]
    ScanInProgress,

    /// No complete fingerprint arrived before the capture timeout.
    #[error("Scan timeout - no fingerprint detected after {duration_ms}ms")]
    ScanTimeout { duration_ms: u64 },

    /// The device reported a hardware or stream error during capture.
    #[error("Device fault: {message}")]
    DeviceFault { message: String },

    /// The capture state machine was driven through an invalid transition.
    #[error("Invalid capture transition from {from} to {to}")]
    InvalidCaptureTransition { from: String, to: String },

    /// The HID layer could not enumerate devices.
    #[error("Device enumeration failed: {message}")]
    Enumeration { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Create a new scan timeout error.
    pub fn scan_timeout(duration_ms: u64) -> Self {
        Self::ScanTimeout { duration_ms }
    }

    /// Create a new device fault error.
    pub fn device_fault(message: impl Into<String>) -> Self {
        Self::DeviceFault {
            message: message.into(),
        }
    }

    /// Create a new enumeration error.
    pub fn enumeration(message: impl Into<String>) -> Self {
        Self::Enumeration {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_device_found_error() {
        let error = HardwareError::NoDeviceFound;
        assert_eq!(error.to_string(), "No fingerprint scanner found");
    }

    #[test]
    fn test_connection_error() {
        let error = HardwareError::connection("access denied");
        assert!(matches!(error, HardwareError::ConnectionError { .. }));
        assert!(error.to_string().contains("Make sure the device is plugged in"));
        assert!(error.to_string().contains("access denied"));
    }

    #[test]
    fn test_not_connected_error() {
        let error = HardwareError::NotConnected;
        assert_eq!(
            error.to_string(),
            "Scanner not connected. Please connect a fingerprint scanner first."
        );
    }

    #[test]
    fn test_scan_timeout_error() {
        let error = HardwareError::scan_timeout(10000);
        assert!(matches!(
            error,
            HardwareError::ScanTimeout { duration_ms: 10000 }
        ));
        assert!(error.to_string().contains("no fingerprint detected"));
    }

    #[test]
    fn test_device_fault_error() {
        let error = HardwareError::device_fault("pipe broken");
        assert_eq!(error.to_string(), "Device fault: pipe broken");
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            HardwareError::NoDeviceFound,
            HardwareError::NotConnected,
            HardwareError::ScanInProgress,
            HardwareError::enumeration("hidapi init failed"),
            HardwareError::other("misc"),
        ];

        for error in errors {
            let _ = format!("{}", error);
            let _ = format!("{:?}", error);
        }
    }
}
