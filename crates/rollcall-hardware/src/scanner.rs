//! The fingerprint scanner session.
//!
//! [`FingerprintScanner`] owns at most one open scanner handle and runs at
//! most one capture on it at a time. It is an explicitly constructed object:
//! the dispatch layer creates one at startup, shares it by reference, and
//! disconnects it at shutdown.
//!
//! # Concurrency
//!
//! The open handle lives behind a [`std::sync::Mutex`] that is only held for
//! the duration of a synchronous HID call, never across an `.await`. The
//! at-most-one-capture rule is enforced with an atomic compare-and-swap on
//! the `scanning` flag, so a second [`scan`](FingerprintScanner::scan) fails
//! fast with [`HardwareError::ScanInProgress`] without disturbing the first.
//!
//! Every exit path of a scan, including the caller dropping the future,
//! detaches the listener and clears the flag.
//!
//! # Examples
//!
//! ```
//! use rollcall_hardware::mock::MockHidBackend;
//! use rollcall_hardware::scanner::FingerprintScanner;
//!
//! #[tokio::main]
//! async fn main() -> rollcall_hardware::Result<()> {
//!     let (backend, handle) = MockHidBackend::with_scanner();
//!     let scanner = FingerprintScanner::new(backend);
//!
//!     scanner.connect(None)?;
//!     handle.send_chunk(vec![0x10u8; 256]);
//!     handle.send_chunk(vec![0x20u8; 256]);
//!
//!     let template = scanner.scan().await?;
//!     assert_eq!(template.quality, 80);
//!
//!     scanner.disconnect();
//!     Ok(())
//! }
//! ```

use crate::capture::{Capture, CaptureConfig};
use crate::error::{HardwareError, Result};
use crate::registry::DeviceRegistry;
use crate::traits::{HidBackend, HidConnection};
use crate::types::{ScannerDescriptor, ScannerStatus};
use rollcall_biometric::FingerprintTemplate;
use rollcall_core::constants::{DEFAULT_SCAN_TIMEOUT_MS, FINGERPRINT_VENDOR_IDS, MIN_TEMPLATE_SIZE};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Scanner session configuration.
///
/// # Examples
///
/// ```
/// use rollcall_hardware::scanner::ScannerConfig;
/// use std::time::Duration;
///
/// let config = ScannerConfig::default().with_scan_timeout(Duration::from_secs(5));
/// assert_eq!(config.min_template_size, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Time a capture may take before failing with a timeout.
    pub scan_timeout: Duration,

    /// Buffer length that completes a capture.
    pub min_template_size: usize,

    /// Vendor ids recognized as fingerprint scanner manufacturers.
    pub vendor_ids: Vec<u16>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scan_timeout: Duration::from_millis(DEFAULT_SCAN_TIMEOUT_MS),
            min_template_size: MIN_TEMPLATE_SIZE,
            vendor_ids: FINGERPRINT_VENDOR_IDS.to_vec(),
        }
    }
}

impl ScannerConfig {
    /// Set the capture timeout.
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Set the completion threshold.
    pub fn with_min_template_size(mut self, size: usize) -> Self {
        self.min_template_size = size;
        self
    }

    /// Replace the vendor allow-list.
    pub fn with_vendor_ids(mut self, vendor_ids: Vec<u16>) -> Self {
        self.vendor_ids = vendor_ids;
        self
    }

    fn capture(&self) -> CaptureConfig {
        CaptureConfig {
            timeout: self.scan_timeout,
            min_template_size: self.min_template_size,
        }
    }
}

struct ActiveConnection<C> {
    path: String,
    handle: C,
}

/// A fingerprint scanner session over a HID backend.
pub struct FingerprintScanner<B: HidBackend> {
    registry: DeviceRegistry<B>,
    config: ScannerConfig,
    connection: Mutex<Option<ActiveConnection<B::Connection>>>,
    scanning: AtomicBool,
}

impl<B: HidBackend> FingerprintScanner<B> {
    /// Create a disconnected session with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, ScannerConfig::default())
    }

    /// Create a disconnected session.
    pub fn with_config(backend: B, config: ScannerConfig) -> Self {
        Self {
            registry: DeviceRegistry::with_vendor_ids(backend, config.vendor_ids.clone()),
            config,
            connection: Mutex::new(None),
            scanning: AtomicBool::new(false),
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// The device registry used for discovery.
    pub fn registry(&self) -> &DeviceRegistry<B> {
        &self.registry
    }

    /// List attached fingerprint scanners. Never fails.
    pub fn list_devices(&self) -> Vec<ScannerDescriptor> {
        self.registry.list_devices()
    }

    /// Open a scanner handle.
    ///
    /// With no `path`, connects to the first scanner the registry reports.
    /// An already open handle is closed first, so at most one handle is
    /// ever open. Returns the path that was opened.
    ///
    /// # Errors
    ///
    /// - [`HardwareError::NoDeviceFound`] if no path was given and the
    ///   registry is empty.
    /// - [`HardwareError::ConnectionError`] if opening the handle failed.
    ///   The session is left disconnected.
    pub fn connect(&self, path: Option<&str>) -> Result<String> {
        let path = match path {
            Some(path) => path.to_string(),
            None => self
                .registry
                .list_devices()
                .into_iter()
                .next()
                .map(|descriptor| descriptor.path)
                .ok_or(HardwareError::NoDeviceFound)?,
        };

        let mut connection = self.lock_connection();
        if let Some(previous) = connection.take() {
            debug!("Replacing open scanner handle {}", previous.path);
            close_quietly(previous);
        }

        let handle = self.registry.backend().open(&path).map_err(|e| {
            warn!("Failed to connect to fingerprint scanner: {}", e);
            HardwareError::connection(e.to_string())
        })?;

        *connection = Some(ActiveConnection {
            path: path.clone(),
            handle,
        });
        info!("Connected to fingerprint scanner at {}", path);
        Ok(path)
    }

    /// Close the scanner handle, if any.
    ///
    /// Idempotent and infallible: close errors are logged and the session
    /// ends up disconnected regardless.
    pub fn disconnect(&self) {
        if let Some(previous) = self.lock_connection().take() {
            let path = previous.path.clone();
            close_quietly(previous);
            info!("Disconnected from fingerprint scanner at {}", path);
        }
    }

    /// Whether a scanner handle is open.
    pub fn is_connected(&self) -> bool {
        self.lock_connection().is_some()
    }

    /// Whether a capture is in flight.
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// Whether a scan may be started right now.
    pub fn is_ready(&self) -> bool {
        self.status().ready
    }

    /// Path of the open handle, if any.
    pub fn connected_path(&self) -> Option<String> {
        self.lock_connection().as_ref().map(|c| c.path.clone())
    }

    /// Snapshot of the session state. No side effects.
    pub fn status(&self) -> ScannerStatus {
        ScannerStatus::new(self.is_connected(), self.is_scanning())
    }

    /// Capture one fingerprint.
    ///
    /// Resolves once the device has streamed at least the configured
    /// template size, or fails when the timeout elapses first or the device
    /// reports a fault. There is no cancel API; dropping the returned future
    /// abandons the capture and releases the session.
    ///
    /// # Errors
    ///
    /// - [`HardwareError::NotConnected`] if no handle is open.
    /// - [`HardwareError::ScanInProgress`] if another capture is running.
    /// - [`HardwareError::ScanTimeout`] if the threshold was not reached in time.
    /// - [`HardwareError::DeviceFault`] if the device reported an error or
    ///   its stream closed.
    pub async fn scan(&self) -> Result<FingerprintTemplate> {
        let events = {
            let mut connection = self.lock_connection();
            let active = connection.as_mut().ok_or(HardwareError::NotConnected)?;

            if self
                .scanning
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Err(HardwareError::ScanInProgress);
            }

            match active.handle.listen() {
                Ok(events) => events,
                Err(e) => {
                    self.scanning.store(false, Ordering::Release);
                    return Err(e);
                }
            }
        };

        // Constructed after the lock scope; its drop locks the connection.
        let _guard = ScanGuard { scanner: self };

        info!("Waiting for fingerprint...");
        Capture::new(self.config.capture()).run(events).await
    }

    fn lock_connection(&self) -> MutexGuard<'_, Option<ActiveConnection<B::Connection>>> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: HidBackend> fmt::Debug for FingerprintScanner<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintScanner")
            .field("config", &self.config)
            .field("connected_path", &self.connected_path())
            .field("scanning", &self.is_scanning())
            .finish_non_exhaustive()
    }
}

fn close_quietly<C: HidConnection>(mut active: ActiveConnection<C>) {
    if let Err(e) = active.handle.close() {
        warn!("Error disconnecting scanner at {}: {}", active.path, e);
    }
}

/// Detaches the capture listener and clears the scanning flag on drop.
struct ScanGuard<'a, B: HidBackend> {
    scanner: &'a FingerprintScanner<B>,
}

impl<B: HidBackend> Drop for ScanGuard<'_, B> {
    fn drop(&mut self) {
        if let Some(active) = self.scanner.lock_connection().as_mut() {
            active.handle.unlisten();
        }
        self.scanner.scanning.store(false, Ordering::Release);
    }
}
