//! Mock device implementations for testing and development.
//!
//! This module provides a simulated HID bus that can be controlled
//! programmatically without requiring a physical fingerprint scanner.

pub mod hid;

// Re-export commonly used types
pub use hid::{MOCK_SCANNER_PATH, MockHidBackend, MockHidConnection, MockHidHandle};
