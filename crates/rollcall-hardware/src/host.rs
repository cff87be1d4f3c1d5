//! USB HID backend built on `hidapi`.
//!
//! Enabled with the `hardware-hid` feature. `hidapi` reads are blocking, so
//! each open handle gets a dedicated reader thread that polls the device
//! with a short timeout and forwards input reports to the attached
//! listener, if any. Reports arriving while nobody listens are dropped,
//! matching how scanners behave between scans.

use crate::error::{HardwareError, Result};
use crate::traits::{EventReceiver, EventSender, HidBackend, HidConnection};
use crate::types::{DeviceEvent, HidDeviceEntry};
use bytes::Bytes;
use hidapi::{HidApi, HidDevice};
use rollcall_core::constants::{HID_READ_POLL_MS, HID_REPORT_SIZE};
use std::ffi::CString;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

type ListenerSlot = Arc<Mutex<Option<EventSender>>>;

fn lock_slot(slot: &ListenerSlot) -> MutexGuard<'_, Option<EventSender>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Host HID devices through hidapi.
pub struct HidapiBackend {
    api: Mutex<HidApi>,
}

impl HidapiBackend {
    /// Initialize the hidapi library.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Enumeration`] if hidapi cannot initialize.
    pub fn new() -> Result<Self> {
        let api = HidApi::new().map_err(|e| HardwareError::enumeration(e.to_string()))?;
        Ok(Self {
            api: Mutex::new(api),
        })
    }

    fn api(&self) -> MutexGuard<'_, HidApi> {
        self.api.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for HidapiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HidapiBackend").finish_non_exhaustive()
    }
}

impl HidBackend for HidapiBackend {
    type Connection = HidapiConnection;

    fn enumerate(&self) -> Result<Vec<HidDeviceEntry>> {
        let mut api = self.api();
        api.refresh_devices()
            .map_err(|e| HardwareError::enumeration(e.to_string()))?;

        let devices = api
            .device_list()
            .map(|info| HidDeviceEntry {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                manufacturer: info.manufacturer_string().map(str::to_string),
                product: info.product_string().map(str::to_string),
                path: info.path().to_string_lossy().into_owned(),
            })
            .collect();

        Ok(devices)
    }

    fn open(&self, path: &str) -> Result<HidapiConnection> {
        let c_path = CString::new(path)
            .map_err(|_| HardwareError::other(format!("invalid device path: {}", path)))?;

        let device = self
            .api()
            .open_path(&c_path)
            .map_err(|e| HardwareError::other(e.to_string()))?;

        HidapiConnection::start(device, path)
    }
}

/// Open hidapi handle with its reader thread.
pub struct HidapiConnection {
    path: String,
    listener: ListenerSlot,
    stop: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl HidapiConnection {
    fn start(device: HidDevice, path: &str) -> Result<Self> {
        let listener: ListenerSlot = Arc::new(Mutex::new(None));
        let stop = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));

        let reader = {
            let listener = listener.clone();
            let stop = stop.clone();
            let alive = alive.clone();
            std::thread::Builder::new()
                .name("hid-reader".to_string())
                .spawn(move || read_loop(device, listener, stop, alive))?
        };

        debug!("HID reader started for {}", path);

        Ok(Self {
            path: path.to_string(),
            listener,
            stop,
            alive,
            reader: Some(reader),
        })
    }
}

fn read_loop(device: HidDevice, listener: ListenerSlot, stop: Arc<AtomicBool>, alive: Arc<AtomicBool>) {
    let mut buf = [0u8; HID_REPORT_SIZE];

    while !stop.load(Ordering::Acquire) {
        match device.read_timeout(&mut buf, HID_READ_POLL_MS) {
            Ok(0) => {}
            Ok(n) => {
                if let Some(tx) = lock_slot(&listener).as_ref() {
                    let _ = tx.send(DeviceEvent::Data(Bytes::copy_from_slice(&buf[..n])));
                }
            }
            Err(e) => {
                error!("HID read failed: {}", e);
                if let Some(tx) = lock_slot(&listener).as_ref() {
                    let _ = tx.send(DeviceEvent::Error(e.to_string()));
                }
                break;
            }
        }
    }

    alive.store(false, Ordering::Release);
}

impl fmt::Debug for HidapiConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HidapiConnection")
            .field("path", &self.path)
            .field("alive", &self.alive.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl HidConnection for HidapiConnection {
    fn listen(&mut self) -> Result<EventReceiver> {
        if !self.alive.load(Ordering::Acquire) {
            return Err(HardwareError::device_fault(format!(
                "reader for {} has stopped",
                self.path
            )));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *lock_slot(&self.listener) = Some(tx);
        Ok(rx)
    }

    fn unlisten(&mut self) {
        lock_slot(&self.listener).take();
    }

    fn is_listening(&self) -> bool {
        lock_slot(&self.listener).is_some()
    }

    fn close(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::Release);
        self.unlisten();

        match self.reader.take() {
            Some(reader) => reader
                .join()
                .map_err(|_| HardwareError::other("HID reader thread panicked")),
            None => Ok(()),
        }
    }
}

impl Drop for HidapiConnection {
    fn drop(&mut self) {
        if self.reader.is_some()
            && let Err(e) = self.close()
        {
            warn!("Error closing {} on drop: {}", self.path, e);
        }
    }
}
