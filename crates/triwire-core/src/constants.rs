//! Protocol constants and enumerations for the H5 packet layer.

use crate::error::PacketError;

/// Size of the H5 packet header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Maximum payload length expressible in the 12-bit header length field.
pub const MAX_PAYLOAD_LEN: usize = 0x0FFF;

/// H5 packet type, carried in the lower nibble of header byte 1.
///
/// Values 6–13 are reserved by the Three-Wire UART specification and are
/// rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketKind {
    Ack = 0,
    HciCommand = 1,
    AclData = 2,
    SyncData = 3,
    HciEvent = 4,
    Reset = 5,
    VendorSpecific = 14,
    LinkControl = 15,
}

impl PacketKind {
    pub fn from_u8(v: u8) -> Result<Self, PacketError> {
        match v {
            0 => Ok(PacketKind::Ack),
            1 => Ok(PacketKind::HciCommand),
            2 => Ok(PacketKind::AclData),
            3 => Ok(PacketKind::SyncData),
            4 => Ok(PacketKind::HciEvent),
            5 => Ok(PacketKind::Reset),
            14 => Ok(PacketKind::VendorSpecific),
            15 => Ok(PacketKind::LinkControl),
            _ => Err(PacketError::InvalidPacketKind(v)),
        }
    }

    /// Short name used in trace output.
    pub fn name(self) -> &'static str {
        match self {
            PacketKind::Ack => "ACK",
            PacketKind::HciCommand => "HCI_COMMAND",
            PacketKind::AclData => "ACL_DATA",
            PacketKind::SyncData => "SYNC_DATA",
            PacketKind::HciEvent => "HCI_EVENT",
            PacketKind::Reset => "RESET",
            PacketKind::VendorSpecific => "VENDOR_SPECIFIC",
            PacketKind::LinkControl => "LINK_CONTROL",
        }
    }
}
