//! Request-dispatch layer of the Rollcall fingerprint pipeline.
//!
//! Callers on the far side of a process boundary (a desktop UI, a kiosk
//! shell, the `rollcall serve` loop) send JSON [`Request`]s and get back
//! JSON [`Envelope`]s. [`FingerprintService`] owns the scanner session for
//! its whole lifetime: create it at startup, call
//! [`shutdown`](FingerprintService::shutdown) when done.

pub mod config;
pub mod error;
pub mod protocol;
pub mod service;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use protocol::{Envelope, Payload, Request};
pub use service::{FingerprintService, Identification};
