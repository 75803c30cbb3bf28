//! H5 packet serialization and parsing.
//!
//! An H5 packet is the 4-byte header followed by the payload. This is the
//! unit that gets SLIP-framed onto the serial line.

extern crate alloc;
use alloc::vec::Vec;

use crate::constants::{HEADER_SIZE, PacketKind};
use crate::error::PacketError;
use crate::packet::header::PacketHeader;
use crate::types::SeqNum;

/// A decoded H5 packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct H5Packet {
    pub seq: SeqNum,
    pub ack: SeqNum,
    pub integrity: bool,
    pub reliable: bool,
    pub kind: PacketKind,
    pub payload: Vec<u8>,
}

impl H5Packet {
    /// Parse a packet from raw (already unframed) bytes.
    #[must_use = "parsing may fail; check the Result"]
    pub fn parse(raw: &[u8]) -> Result<Self, PacketError> {
        let header = PacketHeader::decode(raw)?;

        let payload = &raw[HEADER_SIZE..];
        if payload.len() != header.payload_len {
            return Err(PacketError::PayloadLengthMismatch {
                header_says: header.payload_len,
                actual: payload.len(),
            });
        }

        Ok(H5Packet {
            seq: header.seq,
            ack: header.ack,
            integrity: header.integrity,
            reliable: header.reliable,
            kind: header.kind,
            payload: payload.to_vec(),
        })
    }

    /// Serialize the packet back to wire format.
    #[must_use = "serialization produces a new Vec without modifying the packet"]
    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        let header = PacketHeader {
            seq: self.seq,
            ack: self.ack,
            integrity: self.integrity,
            reliable: self.reliable,
            kind: self.kind,
            payload_len: self.payload.len(),
        }
        .encode()?;

        let mut result = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        result.extend_from_slice(&header);
        result.extend_from_slice(&self.payload);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_packet_wire_bytes() {
        // A Sync link-control packet as it appears between the SLIP
        // delimiters.
        let pkt = H5Packet {
            seq: SeqNum::ZERO,
            ack: SeqNum::ZERO,
            integrity: false,
            reliable: false,
            kind: PacketKind::LinkControl,
            payload: vec![0x01, 0x7E],
        };
        let raw = pkt.serialize().unwrap();
        assert_eq!(raw, hex::decode("002f00d1017e").unwrap());

        let parsed = H5Packet::parse(&raw).unwrap();
        assert_eq!(parsed, pkt);
    }

    #[test]
    fn test_reliable_vendor_packet_roundtrip() {
        let pkt = H5Packet {
            seq: SeqNum::new(3),
            ack: SeqNum::new(6),
            integrity: false,
            reliable: true,
            kind: PacketKind::VendorSpecific,
            payload: vec![0xAA, 0xBB, 0xCC],
        };
        let raw = pkt.serialize().unwrap();
        let parsed = H5Packet::parse(&raw).unwrap();
        assert_eq!(parsed, pkt);
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let pkt = H5Packet {
            seq: SeqNum::ZERO,
            ack: SeqNum::new(1),
            integrity: false,
            reliable: false,
            kind: PacketKind::Ack,
            payload: vec![],
        };
        let raw = pkt.serialize().unwrap();
        assert_eq!(raw.len(), HEADER_SIZE);
        let parsed = H5Packet::parse(&raw).unwrap();
        assert_eq!(parsed, pkt);
    }

    #[test]
    fn test_parse_rejects_length_mismatch() {
        let pkt = H5Packet {
            seq: SeqNum::ZERO,
            ack: SeqNum::ZERO,
            integrity: false,
            reliable: false,
            kind: PacketKind::HciEvent,
            payload: vec![0x01, 0x02],
        };
        let mut raw = pkt.serialize().unwrap();
        raw.push(0xFF);
        assert!(matches!(
            H5Packet::parse(&raw),
            Err(PacketError::PayloadLengthMismatch {
                header_says: 2,
                actual: 3
            })
        ));

        raw.truncate(HEADER_SIZE + 1);
        assert!(matches!(
            H5Packet::parse(&raw),
            Err(PacketError::PayloadLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_truncated_header() {
        assert!(H5Packet::parse(&[]).is_err());
        assert!(H5Packet::parse(&[0x00, 0x2F]).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn valid_kind() -> impl Strategy<Value = PacketKind> {
        prop_oneof![
            Just(PacketKind::Ack),
            Just(PacketKind::HciCommand),
            Just(PacketKind::AclData),
            Just(PacketKind::SyncData),
            Just(PacketKind::HciEvent),
            Just(PacketKind::Reset),
            Just(PacketKind::VendorSpecific),
            Just(PacketKind::LinkControl),
        ]
    }

    fn valid_packet() -> impl Strategy<Value = H5Packet> {
        (
            0..8u8,
            0..8u8,
            any::<bool>(),
            any::<bool>(),
            valid_kind(),
            proptest::collection::vec(any::<u8>(), 0..256),
        )
            .prop_map(|(seq, ack, integrity, reliable, kind, payload)| H5Packet {
                seq: SeqNum::new(seq),
                ack: SeqNum::new(ack),
                integrity,
                reliable,
                kind,
                payload,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn serialize_parse_roundtrip(pkt in valid_packet()) {
            let raw = pkt.serialize().unwrap();
            let parsed = H5Packet::parse(&raw).unwrap();
            prop_assert_eq!(parsed, pkt);
        }

        #[test]
        fn parse_arbitrary_bytes_never_panics(
            raw in proptest::collection::vec(any::<u8>(), 0..512)
        ) {
            let _ = H5Packet::parse(&raw);
        }
    }
}
