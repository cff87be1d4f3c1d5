//! Fingerprint scanner access for the rollcall attendance system.
//!
//! This crate discovers USB HID fingerprint scanners, manages the single
//! open scanner handle of a process, and drives streamed captures into
//! [`FingerprintTemplate`](rollcall_biometric::FingerprintTemplate)s.
//!
//! # Layers
//!
//! - [`traits`]: the HID boundary ([`HidBackend`], [`HidConnection`]).
//! - [`mock`] and, with the `hardware-hid` feature, `host`: the backends.
//! - [`devices`]: enum dispatch over the backends for runtime selection.
//! - [`registry`]: filters enumeration results to fingerprint scanners.
//! - [`capture`]: the per-scan state machine.
//! - [`scanner`]: the session tying them together.
//!
//! # Examples
//!
//! ```
//! use rollcall_hardware::mock::MockHidBackend;
//! use rollcall_hardware::{FingerprintScanner, HardwareError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (backend, _handle) = MockHidBackend::new();
//!     let scanner = FingerprintScanner::new(backend);
//!
//!     assert!(scanner.list_devices().is_empty());
//!     assert!(matches!(scanner.connect(None), Err(HardwareError::NoDeviceFound)));
//!     assert!(matches!(scanner.scan().await, Err(HardwareError::NotConnected)));
//! }
//! ```

pub mod capture;
pub mod devices;
pub mod error;
#[cfg(feature = "hardware-hid")]
pub mod host;
pub mod mock;
pub mod registry;
pub mod scanner;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use capture::{Capture, CaptureConfig, CaptureState};
pub use devices::{AnyHidBackend, AnyHidConnection};
pub use error::{HardwareError, Result};
pub use registry::DeviceRegistry;
pub use scanner::{FingerprintScanner, ScannerConfig};
pub use traits::{EventReceiver, EventSender, HidBackend, HidConnection};
pub use types::{DeviceEvent, HidDeviceEntry, ScannerDescriptor, ScannerStatus};
