//! Packet counters for an H5 link session.

/// Counters kept for the lifetime of a transport instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    /// Inbound frames successfully decoded.
    pub rx_packets: u64,
    /// Packets transmitted, including control packets and retransmissions.
    pub tx_packets: u64,
    /// Inbound frames dropped because of SLIP or header decode failures.
    pub decode_errors: u64,
}
