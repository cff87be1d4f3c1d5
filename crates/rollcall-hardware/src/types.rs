//! Common types shared across the scanner layer.
//!
//! This module defines the raw HID enumeration entry, the filtered scanner
//! descriptor handed to callers, the status snapshot and the events a
//! device handle streams to an active capture.

use bytes::Bytes;
use rollcall_core::constants::{DEFAULT_PRODUCT_NAME, UNKNOWN_MANUFACTURER};
use serde::{Deserialize, Serialize};

/// One entry of a raw HID enumeration, before filtering.
///
/// Manufacturer and product strings are optional because many devices
/// leave them empty or the OS refuses to read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HidDeviceEntry {
    /// USB vendor id.
    pub vendor_id: u16,

    /// USB product id.
    pub product_id: u16,

    /// Manufacturer string, if reported.
    pub manufacturer: Option<String>,

    /// Product string, if reported.
    pub product: Option<String>,

    /// OS-specific device path used to open the device.
    pub path: String,
}

impl HidDeviceEntry {
    /// Create a new entry without manufacturer or product strings.
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            manufacturer: None,
            product: None,
            path: path.into(),
        }
    }

    /// Set the manufacturer string.
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set the product string.
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }
}

/// A recognized fingerprint scanner.
///
/// Descriptors are enumerated fresh on every registry query and never
/// persisted. Two descriptors denote the same device iff their `path` is
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerDescriptor {
    /// USB vendor id.
    pub vendor_id: u16,

    /// USB product id.
    pub product_id: u16,

    /// Manufacturer, `"Unknown"` when not reported.
    pub manufacturer: String,

    /// Product name, `"Fingerprint Scanner"` when not reported.
    pub product: String,

    /// Opaque path used to connect.
    pub path: String,
}

impl From<HidDeviceEntry> for ScannerDescriptor {
    fn from(entry: HidDeviceEntry) -> Self {
        Self {
            vendor_id: entry.vendor_id,
            product_id: entry.product_id,
            manufacturer: non_empty_or(entry.manufacturer, UNKNOWN_MANUFACTURER),
            product: non_empty_or(entry.product, DEFAULT_PRODUCT_NAME),
            path: entry.path,
        }
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Snapshot of the scanner session state for polling collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerStatus {
    /// A scanner handle is open.
    pub connected: bool,

    /// A capture is in flight.
    pub scanning: bool,

    /// Connected and idle, i.e. a scan may be started.
    pub ready: bool,
}

impl ScannerStatus {
    /// Derive the status from the two underlying flags.
    pub fn new(connected: bool, scanning: bool) -> Self {
        Self {
            connected,
            scanning,
            ready: connected && !scanning,
        }
    }
}

/// Event streamed from an open device handle to its listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A chunk of raw capture data, in arrival order.
    Data(Bytes),

    /// The device reported a hardware or stream error.
    Error(String),
}
