//! Link-control payload patterns and the configuration field.
//!
//! Link establishment exchanges fixed byte patterns inside non-reliable
//! LINK_CONTROL packets (Bluetooth core specification, Three-Wire UART
//! transport layer):
//!
//! ```text
//! SYNC            01 7e
//! SYNC RESPONSE   02 7d
//! CONFIG          03 fc <configuration field>
//! CONFIG RESPONSE 04 7b <configuration field>
//! WAKEUP          05 fa
//! WOKEN           06 f9
//! SLEEP           07 78
//! ```
//!
//! Wakeup/Woken/Sleep belong to the low-power mode of the protocol; this
//! implementation classifies them (so they show up meaningfully in trace
//! output) but never generates or acts on them.

extern crate alloc;
use alloc::vec::Vec;

pub const SYNC: [u8; 2] = [0x01, 0x7E];
pub const SYNC_RSP: [u8; 2] = [0x02, 0x7D];
pub const CONFIG: [u8; 2] = [0x03, 0xFC];
pub const CONFIG_RSP: [u8; 2] = [0x04, 0x7B];
pub const WAKEUP: [u8; 2] = [0x05, 0xFA];
pub const WOKEN: [u8; 2] = [0x06, 0xF9];
pub const SLEEP: [u8; 2] = [0x07, 0x78];

/// The configuration field carried by Config/ConfigRsp.
///
/// ```text
/// Bits 0-2: sliding-window size
/// Bit 3:    out-of-frame software flow control
/// Bit 4:    data-integrity-check type
/// Bits 5-7: version number
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
    pub sliding_window: u8,
    pub out_of_frame: bool,
    pub data_integrity: bool,
    pub version: u8,
}

impl ConfigField {
    pub const fn from_byte(byte: u8) -> Self {
        ConfigField {
            sliding_window: byte & 0x07,
            out_of_frame: (byte >> 3) & 0x01 != 0,
            data_integrity: (byte >> 4) & 0x01 != 0,
            version: (byte >> 5) & 0x07,
        }
    }

    pub const fn to_byte(self) -> u8 {
        self.sliding_window
            | ((self.out_of_frame as u8) << 3)
            | ((self.data_integrity as u8) << 4)
            | (self.version << 5)
    }
}

impl Default for ConfigField {
    /// The configuration this implementation advertises: sliding-window
    /// size 1, no out-of-frame flow control, no data-integrity check,
    /// version 0.
    fn default() -> Self {
        ConfigField {
            sliding_window: 1,
            out_of_frame: false,
            data_integrity: false,
            version: 0,
        }
    }
}

/// A classified link-control payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkControl {
    Sync,
    SyncRsp,
    Config(ConfigField),
    ConfigRsp(ConfigField),
    Wakeup,
    Woken,
    Sleep,
}

impl LinkControl {
    /// Classify an inbound LINK_CONTROL payload by its leading pattern.
    ///
    /// Returns `None` for unknown patterns and for Config/ConfigRsp missing
    /// their configuration field.
    pub fn classify(payload: &[u8]) -> Option<Self> {
        if payload.len() < 2 {
            return None;
        }
        match [payload[0], payload[1]] {
            SYNC => Some(LinkControl::Sync),
            SYNC_RSP => Some(LinkControl::SyncRsp),
            CONFIG => payload
                .get(2)
                .map(|&b| LinkControl::Config(ConfigField::from_byte(b))),
            CONFIG_RSP => payload
                .get(2)
                .map(|&b| LinkControl::ConfigRsp(ConfigField::from_byte(b))),
            WAKEUP => Some(LinkControl::Wakeup),
            WOKEN => Some(LinkControl::Woken),
            SLEEP => Some(LinkControl::Sleep),
            _ => None,
        }
    }

    /// The payload bytes for an outgoing link-control packet.
    pub fn payload(self) -> Vec<u8> {
        match self {
            LinkControl::Sync => SYNC.to_vec(),
            LinkControl::SyncRsp => SYNC_RSP.to_vec(),
            LinkControl::Config(field) => {
                let mut p = CONFIG.to_vec();
                p.push(field.to_byte());
                p
            }
            LinkControl::ConfigRsp(field) => {
                let mut p = CONFIG_RSP.to_vec();
                p.push(field.to_byte());
                p
            }
            LinkControl::Wakeup => WAKEUP.to_vec(),
            LinkControl::Woken => WOKEN.to_vec(),
            LinkControl::Sleep => SLEEP.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_fixed_patterns() {
        assert_eq!(LinkControl::classify(&[0x01, 0x7E]), Some(LinkControl::Sync));
        assert_eq!(
            LinkControl::classify(&[0x02, 0x7D]),
            Some(LinkControl::SyncRsp)
        );
        assert_eq!(
            LinkControl::classify(&[0x05, 0xFA]),
            Some(LinkControl::Wakeup)
        );
        assert_eq!(LinkControl::classify(&[0x06, 0xF9]), Some(LinkControl::Woken));
        assert_eq!(LinkControl::classify(&[0x07, 0x78]), Some(LinkControl::Sleep));
    }

    #[test]
    fn classify_config_with_field() {
        let ctl = LinkControl::classify(&[0x03, 0xFC, 0x01]).unwrap();
        match ctl {
            LinkControl::Config(field) => {
                assert_eq!(field.sliding_window, 1);
                assert!(!field.out_of_frame);
                assert!(!field.data_integrity);
                assert_eq!(field.version, 0);
            }
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn classify_config_missing_field() {
        assert_eq!(LinkControl::classify(&[0x03, 0xFC]), None);
        assert_eq!(LinkControl::classify(&[0x04, 0x7B]), None);
    }

    #[test]
    fn classify_rejects_unknown_and_short() {
        assert_eq!(LinkControl::classify(&[]), None);
        assert_eq!(LinkControl::classify(&[0x01]), None);
        assert_eq!(LinkControl::classify(&[0x01, 0x00]), None);
        assert_eq!(LinkControl::classify(&[0xFF, 0xFF]), None);
    }

    #[test]
    fn payload_classify_roundtrip() {
        let all = [
            LinkControl::Sync,
            LinkControl::SyncRsp,
            LinkControl::Config(ConfigField::default()),
            LinkControl::ConfigRsp(ConfigField::from_byte(0x1F)),
            LinkControl::Wakeup,
            LinkControl::Woken,
            LinkControl::Sleep,
        ];
        for ctl in all {
            let payload = ctl.payload();
            assert_eq!(LinkControl::classify(&payload), Some(ctl));
        }
    }

    #[test]
    fn config_field_bit_layout() {
        let field = ConfigField::from_byte(0b1011_1101);
        assert_eq!(field.sliding_window, 5);
        assert!(field.out_of_frame);
        assert!(field.data_integrity);
        assert_eq!(field.version, 5);
        assert_eq!(field.to_byte(), 0b1011_1101);
    }

    #[test]
    fn config_field_default_byte() {
        assert_eq!(ConfigField::default().to_byte(), 0x01);
    }

    #[test]
    fn config_field_roundtrip_all_bytes() {
        for byte in 0u8..=255 {
            assert_eq!(ConfigField::from_byte(byte).to_byte(), byte);
        }
    }
}
