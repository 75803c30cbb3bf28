//! Streaming frame accumulator for the serial byte stream.
//!
//! Finds SLIP-delimited frame boundaries in arbitrary byte chunks. Runs on
//! whatever thread the lower transport delivers bytes from; it is not
//! thread-safe and must only be touched from that thread.

use triwire_core::framing::slip::END;

/// Stateful accumulator that buffers stream data and extracts complete
/// frames delimited by END (0xC0) bytes.
///
/// - Bytes seen before an opening delimiter are line noise and are
///   discarded when the delimiter arrives.
/// - Two consecutive delimiters are taken as the end of one frame directly
///   followed by the start of the next, never as an empty frame.
/// - A partial frame persists across `feed` calls.
pub struct FrameAccumulator {
    buffer: Vec<u8>,
    in_frame: bool,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            in_frame: false,
        }
    }

    /// Feed new data from the stream and extract all complete frames.
    ///
    /// Returned frames include both delimiters and are ready for
    /// `slip_unframe`.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();

        for &byte in data {
            self.buffer.push(byte);

            if byte != END {
                continue;
            }

            if !self.in_frame {
                // Opening delimiter; everything before it was noise.
                self.buffer.clear();
                self.buffer.push(END);
                self.in_frame = true;
            } else if self.buffer.len() == 2 {
                // Two consecutive delimiters: treat the second as the
                // opening delimiter of the next frame.
                self.buffer.clear();
                self.buffer.push(END);
            } else {
                frames.push(std::mem::take(&mut self.buffer));
                self.in_frame = false;
            }
        }

        frames
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
