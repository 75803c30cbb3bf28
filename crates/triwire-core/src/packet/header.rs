//! H5 packet header packing and unpacking.
//!
//! Header layout (4 bytes):
//! ```text
//! Byte 0: bits 0-2 seq, bits 3-5 ack, bit 6 integrity, bit 7 reliable
//! Byte 1: bits 0-3 packet kind, bits 4-7 payload length low nibble
//! Byte 2: payload length high byte (12-bit length total)
//! Byte 3: checksum, the two's complement of the sum of bytes 0-2
//! ```

use crate::constants::{HEADER_SIZE, MAX_PAYLOAD_LEN, PacketKind};
use crate::error::PacketError;
use crate::types::SeqNum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub seq: SeqNum,
    pub ack: SeqNum,
    pub integrity: bool,
    pub reliable: bool,
    pub kind: PacketKind,
    pub payload_len: usize,
}

impl PacketHeader {
    /// Pack the header into its 4-byte wire form.
    pub fn encode(&self) -> Result<[u8; HEADER_SIZE], PacketError> {
        if self.payload_len > MAX_PAYLOAD_LEN {
            return Err(PacketError::PayloadTooLong {
                max: MAX_PAYLOAD_LEN,
                actual: self.payload_len,
            });
        }

        let b0 = self.seq.value()
            | (self.ack.value() << 3)
            | ((self.integrity as u8) << 6)
            | ((self.reliable as u8) << 7);
        let b1 = (self.kind as u8) | (((self.payload_len as u8) & 0x0F) << 4);
        let b2 = (self.payload_len >> 4) as u8;
        let b3 = header_checksum(b0, b1, b2);

        Ok([b0, b1, b2, b3])
    }

    /// Unpack a header from the first 4 bytes of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < HEADER_SIZE {
            return Err(PacketError::TooShort {
                min: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let (b0, b1, b2, b3) = (bytes[0], bytes[1], bytes[2], bytes[3]);

        let expected = header_checksum(b0, b1, b2);
        if b3 != expected {
            return Err(PacketError::HeaderChecksumMismatch {
                expected,
                actual: b3,
            });
        }

        let kind = PacketKind::from_u8(b1 & 0x0F)?;

        Ok(PacketHeader {
            seq: SeqNum::new(b0 & 0x07),
            ack: SeqNum::new((b0 >> 3) & 0x07),
            integrity: (b0 >> 6) & 0x01 != 0,
            reliable: (b0 >> 7) & 0x01 != 0,
            kind,
            payload_len: ((b1 >> 4) as usize) | ((b2 as usize) << 4),
        })
    }
}

/// Two's complement of the modulo-256 sum of the first three header bytes,
/// so that all four header bytes sum to zero modulo 256.
fn header_checksum(b0: u8, b1: u8, b2: u8) -> u8 {
    (!(b0.wrapping_add(b1).wrapping_add(b2))).wrapping_add(1)
}
