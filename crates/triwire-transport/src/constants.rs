//! Timing and retry constants for the link state machine.

use std::time::Duration;

/// Transmit attempts for reliable packets and Sync probes before giving up.
pub const PACKET_RETRANSMISSIONS: u8 = 4;

/// Spacing between handshake packet transmissions in the non-active states.
pub const NON_ACTIVE_STATE_TIMEOUT: Duration = Duration::from_millis(250);

/// How long `open` waits for the link to reach `Active`.
pub const OPEN_WAIT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Settle time after a Reset packet is sent to the target.
pub const RESET_WAIT_DURATION: Duration = Duration::from_millis(300);

/// Default acknowledgement timeout for reliable packets.
pub const DEFAULT_RETRANSMISSION_TIMEOUT: Duration = Duration::from_millis(250);
