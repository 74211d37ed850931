//! Fibonacci Linear Feedback Shift Register
//!
//! The register shifts left by one each step. The bit shifted in at
//! position 0 is the XOR of the tapped state bits, and the same bit is the
//! register's output:
//!
//! ```text
//!   state = (state << 1 | feedback) mod 2^n
//!   feedback = XOR of state[t] for t in taps
//! ```
//!
//! Tap positions count from the least significant bit. Whether the output
//! is a maximal-length sequence depends on the taps; the register does not
//! check for that.
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_core::spreading::Lfsr;
//!
//! let mut lfsr = Lfsr::new(0b0001, &[0, 3], 4).unwrap();
//! assert_eq!(lfsr.feedback(), 1);
//! assert_eq!(lfsr.shift(), 1);
//! assert_eq!(lfsr.state(), 0b0011);
//! ```

use super::BitSource;
use crate::error::{SimError, SimResult};

/// Narrowest supported register.
pub const MIN_WIDTH: u32 = 1;
/// Widest supported register (state is a `u64`).
pub const MAX_WIDTH: u32 = 64;

/// N-bit Fibonacci LFSR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lfsr {
    /// Current register state
    state: u64,
    /// Tap positions (0-based from LSB)
    taps: Vec<u32>,
    /// Register width in bits
    width: u32,
    /// Mask of the `width` low bits
    mask: u64,
    /// Seed, kept for reset
    seed: u64,
}

impl Lfsr {
    /// Create a register.
    ///
    /// Fails if `width` is outside 1..=64, if `seed` is zero or does not fit
    /// in `width` bits, or if any tap is `>= width`. An empty tap list is
    /// accepted and yields a constant-zero feedback.
    pub fn new(seed: u64, taps: &[u32], width: u32) -> SimResult<Self> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return Err(SimError::InvalidWidth {
                width,
                min: MIN_WIDTH,
                max: MAX_WIDTH,
            });
        }
        let mask = u64::MAX >> (64 - width);
        if seed == 0 || seed & !mask != 0 {
            return Err(SimError::InvalidSeed { seed, width });
        }
        if let Some(&tap) = taps.iter().find(|&&t| t >= width) {
            return Err(SimError::InvalidTap { tap, width });
        }

        Ok(Self {
            state: seed,
            taps: taps.to_vec(),
            width,
            mask,
            seed,
        })
    }

    /// XOR of the tapped state bits. Does not change the state.
    #[inline]
    pub fn feedback(&self) -> u8 {
        self.taps
            .iter()
            .fold(0u8, |acc, &t| acc ^ ((self.state >> t) & 1) as u8)
    }

    /// Advance one step and return the feedback bit shifted in.
    #[inline]
    pub fn shift(&mut self) -> u8 {
        let fb = self.feedback();
        self.state = ((self.state << 1) | fb as u64) & self.mask;
        fb
    }

    /// Current state.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Seed the register was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Register width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Tap positions.
    pub fn taps(&self) -> &[u32] {
        &self.taps
    }
}

impl BitSource for Lfsr {
    fn next_bit(&mut self) -> u8 {
        self.shift()
    }

    fn reset(&mut self) {
        self.state = self.seed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_bounds() {
        assert!(matches!(
            Lfsr::new(1, &[0], 0),
            Err(SimError::InvalidWidth { width: 0, .. })
        ));
        assert!(matches!(
            Lfsr::new(1, &[0], 65),
            Err(SimError::InvalidWidth { width: 65, .. })
        ));
        assert!(Lfsr::new(1, &[0], 1).is_ok());
        assert!(Lfsr::new(u64::MAX, &[0, 63], 64).is_ok());
    }

    #[test]
    fn test_seed_bounds() {
        assert_eq!(
            Lfsr::new(0, &[0], 4),
            Err(SimError::InvalidSeed { seed: 0, width: 4 })
        );
        assert_eq!(
            Lfsr::new(16, &[0], 4),
            Err(SimError::InvalidSeed { seed: 16, width: 4 })
        );
        assert!(Lfsr::new(15, &[0], 4).is_ok());
    }

    #[test]
    fn test_tap_bounds() {
        assert_eq!(
            Lfsr::new(1, &[0, 4], 4),
            Err(SimError::InvalidTap { tap: 4, width: 4 })
        );
    }

    #[test]
    fn test_feedback_is_pure() {
        let lfsr = Lfsr::new(0b1001, &[0, 3], 4).unwrap();
        assert_eq!(lfsr.feedback(), 0);
        assert_eq!(lfsr.feedback(), 0);
        assert_eq!(lfsr.state(), 0b1001);
    }

    #[test]
    fn test_shift_sequence() {
        // taps {0,3}, seed 0001
        let mut lfsr = Lfsr::new(0b0001, &[0, 3], 4).unwrap();
        let expected_states = [0b0011, 0b0111, 0b1111, 0b1110, 0b1101];
        let expected_bits = [1, 1, 1, 0, 1];
        for (state, bit) in expected_states.iter().zip(expected_bits) {
            assert_eq!(lfsr.shift(), bit);
            assert_eq!(lfsr.state(), *state);
        }
    }

    /// Steps until the state returns to the seed, or `None` after `limit`.
    fn cycle_length(lfsr: &Lfsr, limit: u64) -> Option<u64> {
        let mut reg = lfsr.clone();
        (1..=limit).find(|_| {
            reg.shift();
            reg.state() == lfsr.state()
        })
    }

    #[test]
    fn test_maximal_period() {
        // x^4 + x^3 + 1 style taps give the full 15-state cycle
        let lfsr = Lfsr::new(1, &[0, 3], 4).unwrap();
        assert_eq!(cycle_length(&lfsr, 100), Some(15));

        // x^10 + x^3 + 1
        let lfsr = Lfsr::new(1, &[6, 9], 10).unwrap();
        assert_eq!(cycle_length(&lfsr, 2000), Some(1023));
    }

    #[test]
    fn test_period_limit() {
        // state drains to zero and never comes back
        let lfsr = Lfsr::new(0b1000, &[0], 4).unwrap();
        assert_eq!(cycle_length(&lfsr, 64), None);
    }

    #[test]
    fn test_empty_taps_shift_in_zero() {
        let mut lfsr = Lfsr::new(0b11, &[], 2).unwrap();
        assert_eq!(lfsr.shift(), 0);
        assert_eq!(lfsr.state(), 0b10);
    }

    #[test]
    fn test_reset() {
        let mut lfsr = Lfsr::new(5, &[0, 2], 3).unwrap();
        lfsr.shift();
        lfsr.shift();
        lfsr.reset();
        assert_eq!(lfsr.state(), 5);
    }

    #[test]
    fn test_full_width_register() {
        let mut lfsr = Lfsr::new(1 << 63, &[63], 64).unwrap();
        assert_eq!(lfsr.shift(), 1);
        assert_eq!(lfsr.state(), 1);
    }
}
