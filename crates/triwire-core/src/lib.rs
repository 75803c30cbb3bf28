//! Core wire formats for the Three-Wire UART (H5) link transport.
//!
//! This crate defines the H5 packet header codec, the SLIP byte-stuffing
//! framing used on the serial line, and the link-control payload patterns
//! exchanged during link establishment. Everything here is stateless; the
//! link state machine and reliable transmission engine live in
//! `triwire-transport`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod error;
pub mod framing;
pub mod packet;
pub mod types;

pub use constants::PacketKind;
pub use error::{FramingError, PacketError};
pub use packet::header::PacketHeader;
pub use packet::link_control::{ConfigField, LinkControl};
pub use packet::wire::H5Packet;
pub use types::SeqNum;
