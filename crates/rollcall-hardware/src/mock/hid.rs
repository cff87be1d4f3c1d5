//! Mock HID backend for testing and development.
//!
//! This module provides a simulated HID bus with scriptable devices. Tests
//! drive it through a [`MockHidHandle`]: plug devices in, make enumeration
//! or opening fail, and stream capture chunks or errors to whichever
//! listener the scanner attaches.

use crate::error::{HardwareError, Result};
use crate::traits::{EventReceiver, EventSender, HidBackend, HidConnection};
use crate::types::{DeviceEvent, HidDeviceEntry};
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Notify, mpsc};

/// Path of the scanner plugged in by [`MockHidBackend::with_scanner`].
pub const MOCK_SCANNER_PATH: &str = "mock://scanner/0";

/// Shared state of the simulated bus.
#[derive(Debug, Default)]
struct MockBus {
    devices: Vec<HidDeviceEntry>,
    fail_enumeration: bool,
    fail_open: bool,
    fail_close: bool,
    listener: Option<EventSender>,
    pending: VecDeque<DeviceEvent>,
    open_handles: usize,
    opened_paths: Vec<String>,
    close_count: usize,
}

#[derive(Debug, Default)]
struct Shared {
    bus: Mutex<MockBus>,
    listener_attached: Notify,
}

impl Shared {
    fn bus(&self) -> MutexGuard<'_, MockBus> {
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Mock HID backend.
///
/// # Examples
///
/// ```
/// use rollcall_hardware::mock::MockHidBackend;
/// use rollcall_hardware::traits::HidBackend;
/// use rollcall_hardware::types::HidDeviceEntry;
///
/// let (backend, handle) = MockHidBackend::new();
/// handle.add_device(HidDeviceEntry::new(0x2808, 0x9338, "mock://zk"));
///
/// let devices = backend.enumerate().unwrap();
/// assert_eq!(devices.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockHidBackend {
    shared: Arc<Shared>,
}

impl MockHidBackend {
    /// Create an empty bus and the handle that controls it.
    pub fn new() -> (Self, MockHidHandle) {
        let shared = Arc::new(Shared::default());
        (
            Self {
                shared: shared.clone(),
            },
            MockHidHandle { shared },
        )
    }

    /// Create a bus with one ZKTeco scanner already plugged in.
    pub fn with_scanner() -> (Self, MockHidHandle) {
        let (backend, handle) = Self::new();
        handle.add_device(
            HidDeviceEntry::new(0x2808, 0x9338, MOCK_SCANNER_PATH)
                .with_manufacturer("ZKTeco")
                .with_product("Mock Fingerprint Scanner"),
        );
        (backend, handle)
    }
}

impl HidBackend for MockHidBackend {
    type Connection = MockHidConnection;

    fn enumerate(&self) -> Result<Vec<HidDeviceEntry>> {
        let bus = self.shared.bus();
        if bus.fail_enumeration {
            return Err(HardwareError::enumeration("mock enumeration failure"));
        }
        Ok(bus.devices.clone())
    }

    fn open(&self, path: &str) -> Result<MockHidConnection> {
        let mut bus = self.shared.bus();
        if bus.fail_open {
            return Err(HardwareError::other(format!("cannot open device {}", path)));
        }
        if !bus.devices.iter().any(|d| d.path == path) {
            return Err(HardwareError::other(format!("no device at {}", path)));
        }

        bus.open_handles += 1;
        bus.opened_paths.push(path.to_string());

        Ok(MockHidConnection {
            path: path.to_string(),
            shared: self.shared.clone(),
            closed: false,
        })
    }
}

/// Open handle on the mock bus.
#[derive(Debug)]
pub struct MockHidConnection {
    path: String,
    shared: Arc<Shared>,
    closed: bool,
}

impl MockHidConnection {
    /// Path this handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl HidConnection for MockHidConnection {
    fn listen(&mut self) -> Result<EventReceiver> {
        if self.closed {
            return Err(HardwareError::device_fault("handle is closed"));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut bus = self.shared.bus();
            while let Some(event) = bus.pending.pop_front() {
                // Receiver is alive in this scope.
                let _ = tx.send(event);
            }
            bus.listener = Some(tx);
        }
        self.shared.listener_attached.notify_waiters();

        Ok(rx)
    }

    fn unlisten(&mut self) {
        self.shared.bus().listener = None;
    }

    fn is_listening(&self) -> bool {
        self.shared.bus().listener.is_some()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut bus = self.shared.bus();
        bus.listener = None;
        bus.open_handles = bus.open_handles.saturating_sub(1);
        bus.close_count += 1;

        if bus.fail_close {
            return Err(HardwareError::other("mock close failure"));
        }
        Ok(())
    }
}

/// Handle for controlling a [`MockHidBackend`].
///
/// Events sent while no listener is attached are queued and flushed to the
/// next listener, so a test can script a whole capture before starting the
/// scan.
///
/// # Examples
///
/// ```
/// use rollcall_hardware::mock::{MOCK_SCANNER_PATH, MockHidBackend};
/// use rollcall_hardware::traits::{HidBackend, HidConnection};
///
/// #[tokio::main]
/// async fn main() -> rollcall_hardware::Result<()> {
///     let (backend, handle) = MockHidBackend::with_scanner();
///
///     handle.send_chunk(vec![1u8, 2, 3]);
///
///     let mut conn = backend.open(MOCK_SCANNER_PATH)?;
///     let mut rx = conn.listen()?;
///     let event = rx.recv().await;
///     assert!(event.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockHidHandle {
    shared: Arc<Shared>,
}

impl MockHidHandle {
    /// Plug a device into the bus.
    pub fn add_device(&self, entry: HidDeviceEntry) {
        self.shared.bus().devices.push(entry);
    }

    /// Unplug the device at `path`. Open handles stay open.
    pub fn remove_device(&self, path: &str) {
        self.shared.bus().devices.retain(|d| d.path != path);
    }

    /// Make [`HidBackend::enumerate`] fail.
    pub fn set_fail_enumeration(&self, fail: bool) {
        self.shared.bus().fail_enumeration = fail;
    }

    /// Make [`HidBackend::open`] fail.
    pub fn set_fail_open(&self, fail: bool) {
        self.shared.bus().fail_open = fail;
    }

    /// Make [`HidConnection::close`] report an error (the handle still closes).
    pub fn set_fail_close(&self, fail: bool) {
        self.shared.bus().fail_close = fail;
    }

    /// Stream a chunk of capture data.
    pub fn send_chunk(&self, data: impl Into<Bytes>) {
        self.send_event(DeviceEvent::Data(data.into()));
    }

    /// Report a device error on the stream.
    pub fn send_error(&self, message: impl Into<String>) {
        self.send_event(DeviceEvent::Error(message.into()));
    }

    /// Close the current listener's stream, as an unplugged device would.
    pub fn end_stream(&self) {
        self.shared.bus().listener = None;
    }

    /// Wait until a listener is attached.
    pub async fn wait_for_listener(&self) {
        loop {
            let attached = self.shared.listener_attached.notified();
            if self.is_listening() {
                return;
            }
            attached.await;
        }
    }

    /// Whether a listener is currently attached.
    pub fn is_listening(&self) -> bool {
        self.shared.bus().listener.is_some()
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.shared.bus().open_handles
    }

    /// Paths passed to successful opens, in order.
    pub fn opened_paths(&self) -> Vec<String> {
        self.shared.bus().opened_paths.clone()
    }

    /// Number of handles closed so far.
    pub fn close_count(&self) -> usize {
        self.shared.bus().close_count
    }

    fn send_event(&self, event: DeviceEvent) {
        let mut bus = self.shared.bus();
        let event = match &bus.listener {
            Some(tx) => match tx.send(event) {
                Ok(()) => return,
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };
        bus.listener = None;
        bus.pending.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_and_fail() {
        let (backend, handle) = MockHidBackend::with_scanner();
        assert_eq!(backend.enumerate().unwrap().len(), 1);

        handle.set_fail_enumeration(true);
        assert!(matches!(
            backend.enumerate(),
            Err(HardwareError::Enumeration { .. })
        ));
    }

    #[test]
    fn test_open_unknown_path_fails() {
        let (backend, _handle) = MockHidBackend::with_scanner();
        assert!(backend.open("mock://nowhere").is_err());
    }

    #[test]
    fn test_open_and_close_counts() {
        let (backend, handle) = MockHidBackend::with_scanner();
        let mut conn = backend.open(MOCK_SCANNER_PATH).unwrap();
        assert_eq!(conn.path(), MOCK_SCANNER_PATH);
        assert_eq!(handle.open_handles(), 1);

        conn.close().unwrap();
        conn.close().unwrap();
        assert_eq!(handle.open_handles(), 0);
        assert_eq!(handle.close_count(), 1);
    }

    #[tokio::test]
    async fn test_pending_events_flush_to_listener() {
        let (backend, handle) = MockHidBackend::with_scanner();
        handle.send_chunk(vec![1u8, 2]);
        handle.send_error("boom");

        let mut conn = backend.open(MOCK_SCANNER_PATH).unwrap();
        let mut rx = conn.listen().unwrap();

        assert_eq!(
            rx.recv().await,
            Some(DeviceEvent::Data(Bytes::from_static(&[1, 2])))
        );
        assert_eq!(rx.recv().await, Some(DeviceEvent::Error("boom".into())));
    }

    #[tokio::test]
    async fn test_unlisten_closes_stream() {
        let (backend, handle) = MockHidBackend::with_scanner();
        let mut conn = backend.open(MOCK_SCANNER_PATH).unwrap();
        let mut rx = conn.listen().unwrap();
        assert!(handle.is_listening());

        conn.unlisten();
        assert!(!handle.is_listening());
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_listen_after_close_fails() {
        let (backend, _handle) = MockHidBackend::with_scanner();
        let mut conn = backend.open(MOCK_SCANNER_PATH).unwrap();
        conn.close().unwrap();
        assert!(matches!(
            conn.listen(),
            Err(HardwareError::DeviceFault { .. })
        ));
    }

    #[tokio::test]
    async fn test_wait_for_listener() {
        let (backend, handle) = MockHidBackend::with_scanner();
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.wait_for_listener().await })
        };

        let mut conn = backend.open(MOCK_SCANNER_PATH).unwrap();
        let _rx = conn.listen().unwrap();
        waiter.await.unwrap();
    }
}
