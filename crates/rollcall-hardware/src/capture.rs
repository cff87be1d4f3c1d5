//! Streamed fingerprint capture state machine.
//!
//! A [`Capture`] drives exactly one scan to completion. It arms a timeout,
//! appends every chunk the device streams to its buffer in arrival order,
//! and completes as soon as the buffer holds at least the minimum template
//! size. Excess bytes are kept.
//!
//! # States
//!
//! ```text
//! Idle ──► Arming ──► Accumulating ──┬──► Completed
//!                                    ├──► TimedOut
//!                                    └──► DeviceFault
//! ```
//!
//! The three right-hand states are terminal. A capture is never reused.
//!
//! # Timing
//!
//! The timeout is a [`tokio::time::Sleep`] raced against the chunk channel
//! in a `select!`. Both are owned by [`Capture::run`], so every exit path
//! drops the timer and no late timeout can fire after the capture resolved.
//!
//! # Examples
//!
//! ```
//! use rollcall_hardware::capture::{Capture, CaptureConfig};
//! use rollcall_hardware::types::DeviceEvent;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> rollcall_hardware::Result<()> {
//!     let (tx, rx) = mpsc::unbounded_channel();
//!     tx.send(DeviceEvent::Data(vec![0x10u8; 256].into())).unwrap();
//!     tx.send(DeviceEvent::Data(vec![0x20u8; 256].into())).unwrap();
//!
//!     let template = Capture::new(CaptureConfig::default()).run(rx).await?;
//!     assert_eq!(template.quality, 80);
//!     Ok(())
//! }
//! ```

use crate::error::{HardwareError, Result};
use crate::traits::EventReceiver;
use crate::types::DeviceEvent;
use rollcall_biometric::FingerprintTemplate;
use rollcall_core::constants::{DEFAULT_SCAN_TIMEOUT_MS, MIN_TEMPLATE_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Phase of a single capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// Created, nothing armed yet.
    Idle,

    /// Timeout armed, listener not yet consuming.
    Arming,

    /// Collecting streamed chunks.
    Accumulating,

    /// Threshold reached; a template was produced.
    Completed,

    /// The timeout elapsed before the threshold.
    TimedOut,

    /// The device reported an error or its stream closed.
    DeviceFault,
}

impl CaptureState {
    /// Check whether moving from this state to `target` is allowed.
    pub fn can_transition_to(&self, target: &CaptureState) -> bool {
        matches!(
            (self, target),
            (CaptureState::Idle, CaptureState::Arming)
                | (CaptureState::Arming, CaptureState::Accumulating)
                | (
                    CaptureState::Accumulating,
                    CaptureState::Completed | CaptureState::TimedOut | CaptureState::DeviceFault
                )
        )
    }

    /// Whether the capture has resolved.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaptureState::Completed | CaptureState::TimedOut | CaptureState::DeviceFault
        )
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            CaptureState::Idle => "Idle",
            CaptureState::Arming => "Arming",
            CaptureState::Accumulating => "Accumulating",
            CaptureState::Completed => "Completed",
            CaptureState::TimedOut => "TimedOut",
            CaptureState::DeviceFault => "DeviceFault",
        };
        write!(f, "{}", state_str)
    }
}

/// Parameters of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Time allowed to reach the threshold.
    pub timeout: Duration,

    /// Buffer length that completes the capture.
    pub min_template_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_SCAN_TIMEOUT_MS),
            min_template_size: MIN_TEMPLATE_SIZE,
        }
    }
}

/// One scan-to-completion cycle.
#[derive(Debug)]
pub struct Capture {
    state: CaptureState,
    buffer: Vec<u8>,
    config: CaptureConfig,
    started_at: Option<Instant>,
    chunks: usize,
}

impl Capture {
    /// Create an idle capture.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            state: CaptureState::Idle,
            buffer: Vec::with_capacity(config.min_template_size),
            config,
            started_at: None,
            chunks: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Bytes accumulated so far.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Chunks received so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Time since the capture was armed, zero if it never was.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    /// Move to `target`, rejecting transitions the state graph forbids.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InvalidCaptureTransition`] for a forbidden
    /// transition; the state is left unchanged.
    pub fn transition_to(&mut self, target: CaptureState) -> Result<()> {
        if !self.state.can_transition_to(&target) {
            return Err(HardwareError::InvalidCaptureTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }

        if target == CaptureState::Arming {
            self.started_at = Some(Instant::now());
        }
        self.state = target;
        Ok(())
    }

    /// Append a chunk and report whether the capture just completed.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InvalidCaptureTransition`] if the capture
    /// is not accumulating.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<bool> {
        if self.state != CaptureState::Accumulating {
            return Err(HardwareError::InvalidCaptureTransition {
                from: self.state.to_string(),
                to: CaptureState::Accumulating.to_string(),
            });
        }

        self.buffer.extend_from_slice(chunk);
        self.chunks += 1;

        if self.buffer.len() >= self.config.min_template_size {
            self.transition_to(CaptureState::Completed)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Encode the completed buffer as a template.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InvalidCaptureTransition`] unless completed.
    pub fn into_template(self) -> Result<FingerprintTemplate> {
        if self.state != CaptureState::Completed {
            return Err(HardwareError::InvalidCaptureTransition {
                from: self.state.to_string(),
                to: CaptureState::Completed.to_string(),
            });
        }

        let template = FingerprintTemplate::from_capture(&self.buffer);
        info!(
            "Fingerprint captured: {} bytes in {} chunk(s), quality {}",
            self.buffer.len(),
            self.chunks,
            template.quality
        );
        Ok(template)
    }

    /// Drive the capture against a device stream until it resolves.
    ///
    /// Resolves exactly once: with a template when the threshold is reached,
    /// with [`HardwareError::ScanTimeout`] when the timeout elapses first,
    /// or with [`HardwareError::DeviceFault`] when the device reports an
    /// error or its stream closes.
    pub async fn run(mut self, mut events: EventReceiver) -> Result<FingerprintTemplate> {
        self.transition_to(CaptureState::Arming)?;
        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);

        self.transition_to(CaptureState::Accumulating)?;
        debug!(
            "Capture accumulating, threshold {} bytes, timeout {}ms",
            self.config.min_template_size,
            self.config.timeout.as_millis()
        );

        loop {
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(DeviceEvent::Data(chunk)) => {
                        if self.push_chunk(&chunk)? {
                            return self.into_template();
                        }
                    }
                    Some(DeviceEvent::Error(message)) => return Err(self.fault(message)),
                    None => return Err(self.fault("device stream closed")),
                },

                () = &mut deadline => return Err(self.expire()),
            }
        }
    }

    fn expire(&mut self) -> HardwareError {
        if let Err(e) = self.transition_to(CaptureState::TimedOut) {
            return e;
        }

        warn!(
            "Scan timeout after {}ms with {} of {} bytes",
            self.config.timeout.as_millis(),
            self.buffer.len(),
            self.config.min_template_size
        );
        HardwareError::scan_timeout(self.config.timeout.as_millis() as u64)
    }

    fn fault(&mut self, message: impl Into<String>) -> HardwareError {
        if let Err(e) = self.transition_to(CaptureState::DeviceFault) {
            return e;
        }

        let message = message.into();
        warn!("Capture aborted by device fault: {}", message);
        HardwareError::device_fault(message)
    }
}
