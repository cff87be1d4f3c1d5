//! Fingerprint scanner discovery.
//!
//! The registry enumerates every attached HID device and keeps those that
//! look like fingerprint scanners: a vendor id on the allow-list, or a
//! product string containing "fingerprint". Finding nothing is a routine
//! state, so enumeration faults are logged and reported as an empty list.

use crate::traits::HidBackend;
use crate::types::{HidDeviceEntry, ScannerDescriptor};
use rollcall_core::constants::{FINGERPRINT_NAME_HINT, FINGERPRINT_VENDOR_IDS};
use tracing::{debug, warn};

/// Filters HID enumeration results down to fingerprint scanners.
///
/// # Examples
///
/// ```
/// use rollcall_hardware::mock::MockHidBackend;
/// use rollcall_hardware::registry::DeviceRegistry;
/// use rollcall_hardware::types::HidDeviceEntry;
///
/// let (backend, handle) = MockHidBackend::new();
/// handle.add_device(HidDeviceEntry::new(0x046D, 0xC52B, "mouse").with_product("USB Receiver"));
/// handle.add_device(HidDeviceEntry::new(0x1234, 0x0001, "fp").with_product("Generic Fingerprint Reader"));
///
/// let registry = DeviceRegistry::new(backend);
/// let scanners = registry.list_devices();
/// assert_eq!(scanners.len(), 1);
/// assert_eq!(scanners[0].path, "fp");
/// ```
#[derive(Debug)]
pub struct DeviceRegistry<B> {
    backend: B,
    vendor_ids: Vec<u16>,
}

impl<B: HidBackend> DeviceRegistry<B> {
    /// Create a registry using the built-in vendor allow-list.
    pub fn new(backend: B) -> Self {
        Self::with_vendor_ids(backend, FINGERPRINT_VENDOR_IDS.to_vec())
    }

    /// Create a registry with a custom vendor allow-list.
    ///
    /// The product-name heuristic applies regardless of the list.
    pub fn with_vendor_ids(backend: B, vendor_ids: Vec<u16>) -> Self {
        Self {
            backend,
            vendor_ids,
        }
    }

    /// The underlying HID backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Vendor ids treated as fingerprint scanner manufacturers.
    pub fn vendor_ids(&self) -> &[u16] {
        &self.vendor_ids
    }

    /// List attached fingerprint scanners.
    ///
    /// Never fails: an enumeration fault is logged and yields an empty list.
    pub fn list_devices(&self) -> Vec<ScannerDescriptor> {
        let entries = match self.backend.enumerate() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error listing devices: {}", e);
                return Vec::new();
            }
        };

        let scanners: Vec<ScannerDescriptor> = entries
            .into_iter()
            .filter(|entry| self.is_fingerprint_scanner(entry))
            .map(ScannerDescriptor::from)
            .collect();

        debug!("Found {} fingerprint scanner(s)", scanners.len());
        scanners
    }

    /// Whether a raw HID entry is recognized as a fingerprint scanner.
    pub fn is_fingerprint_scanner(&self, entry: &HidDeviceEntry) -> bool {
        self.vendor_ids.contains(&entry.vendor_id)
            || entry
                .product
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(FINGERPRINT_NAME_HINT))
    }
}
