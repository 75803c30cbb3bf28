//! SLIP byte-stuffing framing.
//!
//! Wraps an H5 packet for the serial line: END + escaped(data) + END.
//! Interior occurrences of END (0xC0) and ESC (0xDB) are escape-encoded so
//! the delimiter is unambiguous in the byte stream.

extern crate alloc;
use alloc::vec::Vec;

use crate::error::FramingError;

pub const END: u8 = 0xC0;
pub const ESC: u8 = 0xDB;
pub const ESC_END: u8 = 0xDC;
pub const ESC_ESC: u8 = 0xDD;

/// Escape special bytes in data using SLIP byte-stuffing.
///
/// Replaces END (0xC0) with ESC + ESC_END, and ESC (0xDB) with ESC + ESC_ESC.
pub fn slip_escape(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            END => {
                result.push(ESC);
                result.push(ESC_END);
            }
            ESC => {
                result.push(ESC);
                result.push(ESC_ESC);
            }
            _ => result.push(byte),
        }
    }
    result
}

/// Frame data with SLIP delimiters: END + escape(data) + END.
pub fn slip_frame(data: &[u8]) -> Vec<u8> {
    let escaped = slip_escape(data);
    let mut framed = Vec::with_capacity(escaped.len() + 2);
    framed.push(END);
    framed.extend_from_slice(&escaped);
    framed.push(END);
    framed
}

/// Remove SLIP framing: strip delimiters and unescape data.
pub fn slip_unframe(framed: &[u8]) -> Result<Vec<u8>, FramingError> {
    if framed.len() < 2 || framed[0] != END || framed[framed.len() - 1] != END {
        return Err(FramingError::MissingDelimiter);
    }

    let inner = &framed[1..framed.len() - 1];
    let mut result = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        if inner[i] == ESC {
            if i + 1 >= inner.len() {
                return Err(FramingError::IncompleteEscape);
            }
            match inner[i + 1] {
                ESC_END => result.push(END),
                ESC_ESC => result.push(ESC),
                other => return Err(FramingError::InvalidEscapeSequence(other)),
            }
            i += 2;
        } else {
            result.push(inner[i]);
            i += 1;
        }
    }
    Ok(result)
}
