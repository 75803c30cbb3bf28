//! H5 packet wire format.

pub mod header;
pub mod link_control;
pub mod wire;
