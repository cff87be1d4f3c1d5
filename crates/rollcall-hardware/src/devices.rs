//! Enum wrappers for HID backend dispatch.
//!
//! [`HidBackend`] carries an associated connection type, so backends cannot
//! be boxed as trait objects. These enums give the service layer a single
//! concrete type while the backend is chosen at startup (mock for
//! development, hidapi for real scanners).
//!
//! # Examples
//!
//! ```
//! use rollcall_hardware::devices::AnyHidBackend;
//! use rollcall_hardware::mock::MockHidBackend;
//! use rollcall_hardware::traits::HidBackend;
//!
//! let (mock, _handle) = MockHidBackend::with_scanner();
//! let backend = AnyHidBackend::Mock(mock);
//!
//! assert_eq!(backend.enumerate().unwrap().len(), 1);
//! ```

#[cfg(feature = "hardware-hid")]
use crate::host::{HidapiBackend, HidapiConnection};
use crate::mock::{MockHidBackend, MockHidConnection};
use crate::traits::{EventReceiver, HidBackend, HidConnection};
use crate::types::HidDeviceEntry;
use crate::Result;

/// Enum wrapper for HID backend dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyHidBackend {
    /// Simulated bus for development and testing.
    Mock(MockHidBackend),

    /// Host HID devices through hidapi.
    #[cfg(feature = "hardware-hid")]
    Hidapi(HidapiBackend),
}

impl AnyHidBackend {
    /// Short name of the active backend, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mock(_) => "mock",
            #[cfg(feature = "hardware-hid")]
            Self::Hidapi(_) => "hidapi",
        }
    }
}

impl HidBackend for AnyHidBackend {
    type Connection = AnyHidConnection;

    fn enumerate(&self) -> Result<Vec<HidDeviceEntry>> {
        match self {
            Self::Mock(backend) => backend.enumerate(),
            #[cfg(feature = "hardware-hid")]
            Self::Hidapi(backend) => backend.enumerate(),
        }
    }

    fn open(&self, path: &str) -> Result<AnyHidConnection> {
        match self {
            Self::Mock(backend) => backend.open(path).map(AnyHidConnection::Mock),
            #[cfg(feature = "hardware-hid")]
            Self::Hidapi(backend) => backend.open(path).map(AnyHidConnection::Hidapi),
        }
    }
}

/// Enum wrapper for open HID handles.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyHidConnection {
    /// Handle on the simulated bus.
    Mock(MockHidConnection),

    /// Handle on a host HID device.
    #[cfg(feature = "hardware-hid")]
    Hidapi(HidapiConnection),
}

impl HidConnection for AnyHidConnection {
    fn listen(&mut self) -> Result<EventReceiver> {
        match self {
            Self::Mock(conn) => conn.listen(),
            #[cfg(feature = "hardware-hid")]
            Self::Hidapi(conn) => conn.listen(),
        }
    }

    fn unlisten(&mut self) {
        match self {
            Self::Mock(conn) => conn.unlisten(),
            #[cfg(feature = "hardware-hid")]
            Self::Hidapi(conn) => conn.unlisten(),
        }
    }

    fn is_listening(&self) -> bool {
        match self {
            Self::Mock(conn) => conn.is_listening(),
            #[cfg(feature = "hardware-hid")]
            Self::Hidapi(conn) => conn.is_listening(),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self {
            Self::Mock(conn) => conn.close(),
            #[cfg(feature = "hardware-hid")]
            Self::Hidapi(conn) => conn.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MOCK_SCANNER_PATH;

    #[test]
    fn test_any_backend_mock_enumerate() {
        let (mock, _handle) = MockHidBackend::with_scanner();
        let backend = AnyHidBackend::Mock(mock);

        assert_eq!(backend.name(), "mock");
        let devices = backend.enumerate().unwrap();
        assert_eq!(devices[0].path, MOCK_SCANNER_PATH);
    }

    #[tokio::test]
    async fn test_any_connection_mock_stream() {
        let (mock, handle) = MockHidBackend::with_scanner();
        let backend = AnyHidBackend::Mock(mock);

        let mut conn = backend.open(MOCK_SCANNER_PATH).unwrap();
        let mut rx = conn.listen().unwrap();
        assert!(conn.is_listening());

        handle.send_chunk(vec![7u8; 4]);
        assert!(rx.recv().await.is_some());

        conn.unlisten();
        assert!(!conn.is_listening());
        conn.close().unwrap();
        assert_eq!(handle.open_handles(), 0);
    }
}
