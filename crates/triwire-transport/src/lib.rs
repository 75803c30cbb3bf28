//! Reliable Three-Wire UART (H5) link transport.
//!
//! Drives a byte-oriented lower transport (a serial line) from power-on to
//! an active, acknowledged link: frame reassembly, the five-state
//! synchronization handshake, and a stop-and-wait reliable transmission
//! engine with retransmission and duplicate detection.
//!
//! The wire formats (H5 packet codec, SLIP framing, link-control patterns)
//! live in `triwire-core`; this crate owns all the state.

pub mod constants;
pub mod error;
pub mod exit_criteria;
pub mod link;
pub mod reassembly;
pub mod state;
pub mod stats;
pub mod testing;
pub mod trace;
pub mod traits;

pub use error::TransportError;
pub use link::{H5Config, H5Transport};
pub use reassembly::FrameAccumulator;
pub use state::LinkState;
pub use stats::LinkStats;
pub use traits::{
    DataCallback, LowerEvents, LowerTransport, StatusCallback, StatusCode, StatusEvent,
};
