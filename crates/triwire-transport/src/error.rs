//! Error types for the transport layer.

use triwire_core::error::{FramingError, PacketError};

/// Errors surfaced by the H5 transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("operation timed out")]
    Timeout,

    #[error("internal transport failure: {0}")]
    Internal(String),

    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    #[error("framing error: {0}")]
    Framing(#[from] FramingError),
}
