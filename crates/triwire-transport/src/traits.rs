//! Lower-transport abstraction and consumer-facing event types.
//!
//! The H5 engine sits between a consumer exchanging vendor-specific
//! payloads and a byte-oriented lower transport, typically a serial port
//! driver. The lower transport delivers inbound byte chunks and status
//! events through the sinks registered at `open`; bytes must arrive from a
//! single callback thread.

use std::sync::Arc;

use crate::error::TransportError;

/// Status codes reported to the consumer's status callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// A Reset packet has been sent to the target.
    ResetPerformed,
    /// The link handshake completed; the link is active.
    ConnectionActive,
    /// The lower transport lost its I/O resources.
    IoResourcesUnavailable,
}

/// A status code paired with a human-readable message.
#[derive(Debug, Clone)]
pub struct StatusEvent {
    pub code: StatusCode,
    pub message: String,
}

impl StatusEvent {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        StatusEvent {
            code,
            message: message.into(),
        }
    }
}

/// Consumer callback invoked for every delivered reliable payload.
pub type DataCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Consumer callback invoked for status events.
pub type StatusCallback = Arc<dyn Fn(&StatusEvent) + Send + Sync>;

/// Event sinks handed to the lower transport on `open`.
///
/// The data sink is not thread-safe and must only be invoked from the
/// transport's single callback thread; the status sink may be invoked from
/// any thread.
pub struct LowerEvents {
    pub data: Box<dyn FnMut(&[u8]) + Send>,
    pub status: Box<dyn Fn(StatusEvent) + Send + Sync>,
}

/// A byte-oriented transport below the H5 engine.
///
/// Implementations use interior mutability: the engine shares the transport
/// between caller threads, the state-machine worker, and the inbound
/// dispatcher for the transport's whole lifetime.
pub trait LowerTransport: Send + Sync {
    /// Human-readable name, e.g. `uart[/dev/ttyACM0]`.
    fn name(&self) -> &str;

    /// Open the transport and register the event sinks.
    fn open(&self, events: LowerEvents) -> Result<(), TransportError>;

    /// Close the transport and release its resources.
    fn close(&self) -> Result<(), TransportError>;

    /// Write one framed packet to the line.
    fn send(&self, frame: &[u8]) -> Result<(), TransportError>;
}
