//! Error types for the triwire-core crate.

use core::fmt;

#[derive(Debug)]
pub enum PacketError {
    TooShort { min: usize, actual: usize },
    HeaderChecksumMismatch { expected: u8, actual: u8 },
    PayloadLengthMismatch { header_says: usize, actual: usize },
    InvalidPacketKind(u8),
    PayloadTooLong { max: usize, actual: usize },
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::TooShort { min, actual } => {
                write!(
                    f,
                    "packet too short: need at least {min} bytes, got {actual}"
                )
            }
            PacketError::HeaderChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "header checksum mismatch: expected 0x{expected:02x}, got 0x{actual:02x}"
                )
            }
            PacketError::PayloadLengthMismatch { header_says, actual } => {
                write!(
                    f,
                    "payload length mismatch: header says {header_says} bytes, got {actual}"
                )
            }
            PacketError::InvalidPacketKind(v) => write!(f, "invalid packet kind: {v}"),
            PacketError::PayloadTooLong { max, actual } => {
                write!(f, "payload too long: {actual} bytes (maximum {max})")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PacketError {}

#[derive(Debug)]
pub enum FramingError {
    MissingDelimiter,
    IncompleteEscape,
    InvalidEscapeSequence(u8),
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::MissingDelimiter => write!(f, "missing frame delimiter"),
            FramingError::IncompleteEscape => write!(f, "incomplete escape sequence"),
            FramingError::InvalidEscapeSequence(v) => {
                write!(f, "invalid escape sequence: 0x{v:02x}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FramingError {}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_packet_error_display_all_variants() {
        let variants: &[PacketError] = &[
            PacketError::TooShort { min: 4, actual: 2 },
            PacketError::HeaderChecksumMismatch {
                expected: 0xD1,
                actual: 0x00,
            },
            PacketError::PayloadLengthMismatch {
                header_says: 2,
                actual: 5,
            },
            PacketError::InvalidPacketKind(9),
            PacketError::PayloadTooLong {
                max: 4095,
                actual: 5000,
            },
        ];
        for v in variants {
            let msg = v.to_string();
            assert!(!msg.is_empty(), "{v:?} should have non-empty Display");
        }
    }

    #[test]
    fn test_framing_error_display_all_variants() {
        let variants: &[FramingError] = &[
            FramingError::MissingDelimiter,
            FramingError::IncompleteEscape,
            FramingError::InvalidEscapeSequence(0xAB),
        ];
        for v in variants {
            let msg = v.to_string();
            assert!(!msg.is_empty(), "{v:?} should have non-empty Display");
        }
    }
}
