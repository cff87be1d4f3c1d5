//! HID access layer trait definitions.
//!
//! These traits are the outbound boundary of the scanner core: enumerate
//! attached HID devices, open one by path, stream its input reports to a
//! listener, and close it. The core never talks to the OS directly, which
//! lets the mock backend stand in for a physical scanner in tests.
//!
//! Enumeration and opening are synchronous, as they are in every HID
//! library we target. Only the data stream is asynchronous, delivered as
//! [`DeviceEvent`]s over a Tokio channel.
//!
//! # Dispatch
//!
//! [`HidBackend`] has an associated connection type, so it is not used as a
//! trait object. Use generics, or the enum wrappers in
//! [`devices`](crate::devices) to choose a backend at runtime.

use crate::error::Result;
use crate::types::{DeviceEvent, HidDeviceEntry};
use tokio::sync::mpsc;

/// Receiving end of a device data stream.
pub type EventReceiver = mpsc::UnboundedReceiver<DeviceEvent>;

/// Sending end of a device data stream.
pub type EventSender = mpsc::UnboundedSender<DeviceEvent>;

/// Access to the host's HID devices.
///
/// # Examples
///
/// ```no_run
/// use rollcall_hardware::traits::HidBackend;
/// use rollcall_hardware::error::Result;
///
/// fn first_path<B: HidBackend>(backend: &B) -> Result<Option<String>> {
///     Ok(backend.enumerate()?.into_iter().next().map(|d| d.path))
/// }
/// ```
pub trait HidBackend: Send + Sync {
    /// Handle type returned by [`open`](HidBackend::open).
    type Connection: HidConnection;

    /// Enumerate every attached HID device, unfiltered.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Enumeration`](crate::HardwareError::Enumeration)
    /// if the HID layer cannot be queried.
    fn enumerate(&self) -> Result<Vec<HidDeviceEntry>>;

    /// Open the device at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is gone, busy, or the process lacks
    /// permission to open it.
    fn open(&self, path: &str) -> Result<Self::Connection>;
}

/// An open handle to one HID device.
///
/// A connection has at most one listener. Attaching a new listener replaces
/// the previous one, whose receiver then observes a closed channel.
pub trait HidConnection: Send {
    /// Attach a listener and return the receiving end of its stream.
    ///
    /// Host devices drop input reports arriving while no listener is
    /// attached. The mock backend queues them for scripted tests.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::DeviceFault`](crate::HardwareError::DeviceFault)
    /// if the handle can no longer produce data.
    fn listen(&mut self) -> Result<EventReceiver>;

    /// Detach the current listener, if any. Idempotent.
    fn unlisten(&mut self);

    /// Whether a listener is currently attached.
    fn is_listening(&self) -> bool;

    /// Close the handle and release the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS reports a failure while releasing the
    /// device. The handle must be considered closed regardless.
    fn close(&mut self) -> Result<()>;
}
