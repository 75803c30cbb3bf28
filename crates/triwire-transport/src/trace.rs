//! Human-readable rendering of packets for debug output.
//!
//! Wakeup, Woken and Sleep link-control packets are decoded here so they
//! show up meaningfully in logs, even though the engine never generates or
//! acts on them.

use std::fmt::Write;

use triwire_core::packet::link_control::LinkControl;
use triwire_core::{H5Packet, PacketKind};

/// Render a byte slice as space-separated hex.
pub fn hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Describe a decoded packet on one line.
pub fn describe_packet(pkt: &H5Packet) -> String {
    let mut out = format!(
        "type:{} reliable:{} seq#:{} ack#:{} [{}]",
        pkt.kind.name(),
        if pkt.reliable { "yes" } else { "no" },
        pkt.seq,
        pkt.ack,
        hex_bytes(&pkt.payload),
    );
    if pkt.kind == PacketKind::LinkControl {
        let _ = write!(out, " {}", describe_link_control(&pkt.payload));
    }
    out
}

/// Decode a link-control payload for log output.
pub fn describe_link_control(payload: &[u8]) -> String {
    match LinkControl::classify(payload) {
        Some(LinkControl::Sync) => "[SYNC]".into(),
        Some(LinkControl::SyncRsp) => "[SYNC_RESP]".into(),
        Some(LinkControl::Config(f)) => format!(
            "[CONFIG sliding-window-size:{} out-of-frame:{} data-integrity-check-type:{} version-number:{}]",
            f.sliding_window, f.out_of_frame as u8, f.data_integrity as u8, f.version,
        ),
        Some(LinkControl::ConfigRsp(f)) => format!(
            "[CONFIG_RESP sliding-window-size:{} out-of-frame:{} data-integrity-check-type:{} version-number:{}]",
            f.sliding_window, f.out_of_frame as u8, f.data_integrity as u8, f.version,
        ),
        Some(LinkControl::Wakeup) => "[WAKEUP]".into(),
        Some(LinkControl::Woken) => "[WOKEN]".into(),
        Some(LinkControl::Sleep) => "[SLEEP]".into(),
        None => "[UNKNOWN]".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triwire_core::SeqNum;

    #[test]
    fn hex_rendering() {
        assert_eq!(hex_bytes(&[]), "");
        assert_eq!(hex_bytes(&[0x01, 0x7E, 0xC0]), "01 7e c0");
    }

    #[test]
    fn sync_packet_description() {
        let pkt = H5Packet {
            seq: SeqNum::ZERO,
            ack: SeqNum::ZERO,
            integrity: false,
            reliable: false,
            kind: PacketKind::LinkControl,
            payload: vec![0x01, 0x7E],
        };
        let desc = describe_packet(&pkt);
        assert!(desc.contains("LINK_CONTROL"));
        assert!(desc.contains("[SYNC]"));
    }

    #[test]
    fn config_field_is_decoded() {
        let desc = describe_link_control(&[0x03, 0xFC, 0x01]);
        assert!(desc.contains("CONFIG"));
        assert!(desc.contains("sliding-window-size:1"));
    }

    #[test]
    fn low_power_packets_are_recognized() {
        assert_eq!(describe_link_control(&[0x05, 0xFA]), "[WAKEUP]");
        assert_eq!(describe_link_control(&[0x06, 0xF9]), "[WOKEN]");
        assert_eq!(describe_link_control(&[0x07, 0x78]), "[SLEEP]");
    }

    #[test]
    fn unknown_payload_is_flagged() {
        assert_eq!(describe_link_control(&[0xAA, 0xBB]), "[UNKNOWN]");
    }
}
