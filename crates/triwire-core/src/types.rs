//! Newtype wrappers for protocol quantities.

use core::fmt;

/// A 3-bit sequence counter that wraps modulo 8.
///
/// The transmit sequence number and the expected-receive (acknowledgement)
/// number of the H5 protocol both live in this space. Arithmetic outside
/// increment/decrement-by-one is meaningless for these counters, so none is
/// offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SeqNum(u8);

impl SeqNum {
    pub const MODULUS: u8 = 8;
    pub const ZERO: SeqNum = SeqNum(0);

    /// Wrap an arbitrary value into the counter space.
    pub const fn new(value: u8) -> Self {
        SeqNum(value % Self::MODULUS)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// The counter after this one (wrapping).
    pub const fn next(self) -> Self {
        SeqNum((self.0 + 1) % Self::MODULUS)
    }

    /// The counter before this one (wrapping).
    pub const fn prev(self) -> Self {
        SeqNum((self.0 + Self::MODULUS - 1) % Self::MODULUS)
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wraps_into_range() {
        assert_eq!(SeqNum::new(0).value(), 0);
        assert_eq!(SeqNum::new(7).value(), 7);
        assert_eq!(SeqNum::new(8).value(), 0);
        assert_eq!(SeqNum::new(255).value(), 7);
    }

    #[test]
    fn next_wraps_at_modulus() {
        assert_eq!(SeqNum::new(0).next().value(), 1);
        assert_eq!(SeqNum::new(6).next().value(), 7);
        assert_eq!(SeqNum::new(7).next().value(), 0);
    }

    #[test]
    fn prev_wraps_below_zero() {
        assert_eq!(SeqNum::new(1).prev().value(), 0);
        assert_eq!(SeqNum::new(0).prev().value(), 7);
    }

    #[test]
    fn next_then_prev_is_identity() {
        for v in 0..SeqNum::MODULUS {
            let n = SeqNum::new(v);
            assert_eq!(n.next().prev(), n);
            assert_eq!(n.prev().next(), n);
        }
    }

    #[test]
    fn full_cycle_returns_to_start() {
        let mut n = SeqNum::ZERO;
        for _ in 0..SeqNum::MODULUS {
            n = n.next();
        }
        assert_eq!(n, SeqNum::ZERO);
    }
}
