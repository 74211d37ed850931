//! Gold Code Generator
//!
//! A Gold code is the chip-by-chip XOR of two LFSR sequences of the same
//! width. With a preferred pair of polynomials the resulting family has
//! bounded cross-correlation, which is what lets several users share one
//! channel.
//!
//! ## Properties
//!
//! - **Length**: 2^n - 1 chips for an n-bit register pair
//! - **Family**: one code per seed pair; users sharing `n` and the
//!   polynomials but differing in seeds get different codes
//! - **Cross-Correlation**: for preferred pairs bounded by t(n), where
//!   t(n) = 2^((n+1)/2) + 1 for odd n and 2^((n+2)/2) + 1 for even n
//!
//! The generator does not check that the polynomials form a preferred pair.
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_core::spreading::GoldCodeGenerator;
//!
//! let gen = GoldCodeGenerator::new(10, &[0, 3], &[0, 2, 3, 8]).unwrap();
//! let code = gen.generate(1, 0b1010101010).unwrap();
//! assert_eq!(code.len(), 1023);
//! ```

use super::lfsr::Lfsr;
use super::BitSource;
use crate::bits::BitSequence;
use crate::error::{SimError, SimResult};

/// Widest register pair accepted for Gold codes.
///
/// A 32-bit pair already gives a code of four billion chips.
pub const MAX_GOLD_WIDTH: u32 = 32;

/// Validated `(n, poly1, poly2)` triple that produces Gold codes per seed pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldCodeGenerator {
    width: u32,
    poly1: Vec<u32>,
    poly2: Vec<u32>,
}

impl GoldCodeGenerator {
    /// Create a generator for `width`-bit registers with the given tap sets.
    pub fn new(width: u32, poly1: &[u32], poly2: &[u32]) -> SimResult<Self> {
        if !(1..=MAX_GOLD_WIDTH).contains(&width) {
            return Err(SimError::InvalidWidth {
                width,
                min: 1,
                max: MAX_GOLD_WIDTH,
            });
        }
        for (name, taps) in [("poly1", poly1), ("poly2", poly2)] {
            if taps.is_empty() {
                return Err(SimError::EmptyTaps(name));
            }
            if let Some(&tap) = taps.iter().find(|&&t| t >= width) {
                return Err(SimError::InvalidTap { tap, width });
            }
        }

        Ok(Self {
            width,
            poly1: poly1.to_vec(),
            poly2: poly2.to_vec(),
        })
    }

    /// Register width `n`.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// First tap set.
    pub fn poly1(&self) -> &[u32] {
        &self.poly1
    }

    /// Second tap set.
    pub fn poly2(&self) -> &[u32] {
        &self.poly2
    }

    /// Code length 2^n - 1.
    pub fn code_length(&self) -> usize {
        ((1u64 << self.width) - 1) as usize
    }

    /// Processing gain of one code period in dB.
    pub fn processing_gain_db(&self) -> f64 {
        super::processing_gain_db(self.code_length())
    }

    /// Gold's cross-correlation bound t(n), in chips.
    pub fn cross_correlation_bound(&self) -> i64 {
        let exp = if self.width % 2 == 1 {
            (self.width + 1) / 2
        } else {
            (self.width + 2) / 2
        };
        (1i64 << exp) + 1
    }

    /// Stateful chip source for one seed pair.
    pub fn sequence(&self, seed1: u64, seed2: u64) -> SimResult<GoldSequence> {
        Ok(GoldSequence {
            lfsr1: Lfsr::new(seed1, &self.poly1, self.width)?,
            lfsr2: Lfsr::new(seed2, &self.poly2, self.width)?,
        })
    }

    /// One full code period for the seed pair.
    pub fn generate(&self, seed1: u64, seed2: u64) -> SimResult<BitSequence> {
        self.sequence(seed1, seed2)?.take_bits(self.code_length())
    }
}

/// Two LFSRs clocked together; each output bit is the XOR of their feedback.
#[derive(Debug, Clone)]
pub struct GoldSequence {
    lfsr1: Lfsr,
    lfsr2: Lfsr,
}

impl BitSource for GoldSequence {
    fn next_bit(&mut self) -> u8 {
        self.lfsr1.shift() ^ self.lfsr2.shift()
    }

    fn reset(&mut self) {
        self.lfsr1.reset();
        self.lfsr2.reset();
    }
}

/// Generate the Gold code for `(n, poly1, seed1, poly2, seed2)`.
pub fn generate_gold_code(
    width: u32,
    poly1: &[u32],
    seed1: u64,
    poly2: &[u32],
    seed2: u64,
) -> SimResult<BitSequence> {
    GoldCodeGenerator::new(width, poly1, poly2)?.generate(seed1, seed2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLY1: &[u32] = &[0, 3];
    const POLY2: &[u32] = &[0, 2, 3, 8];

    #[test]
    fn test_code_length() {
        for n in 4..=12 {
            let gen = GoldCodeGenerator::new(n, &[0, 3], &[0, 1, 2, 3]).unwrap();
            let code = gen.generate(1, 3).unwrap();
            assert_eq!(code.len(), (1usize << n) - 1);
            assert_eq!(gen.code_length(), code.len());
        }
    }

    #[test]
    fn test_small_code_by_hand() {
        // lfsr1 (seed 01) emits 1,0,1 and lfsr2 (seed 10) emits 1,1,0
        let code = generate_gold_code(2, &[0, 1], 1, &[0, 1], 2).unwrap();
        assert_eq!(code.to_string(), "011");
    }

    #[test]
    fn test_deterministic() {
        let a = generate_gold_code(10, POLY1, 1, POLY2, 0b1010101010).unwrap();
        let b = generate_gold_code(10, POLY1, 1, POLY2, 0b1010101010).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_give_different_codes() {
        let gen = GoldCodeGenerator::new(10, POLY1, POLY2).unwrap();
        let a = gen.generate(1, 0b1010101010).unwrap();
        let b = gen.generate(1, 0b1010101001).unwrap();
        let c = gen.generate(2, 0b1010101010).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sequence_matches_generate_and_resets() {
        let gen = GoldCodeGenerator::new(6, &[0, 5], &[0, 1, 4, 5]).unwrap();
        let code = gen.generate(7, 9).unwrap();
        let mut seq = gen.sequence(7, 9).unwrap();
        let first = seq.take_bits(code.len()).unwrap();
        assert_eq!(first, code);
        seq.reset();
        assert_eq!(seq.next_bit(), code.get(0).unwrap());
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            GoldCodeGenerator::new(0, POLY1, POLY2),
            Err(SimError::InvalidWidth { .. })
        ));
        assert!(matches!(
            GoldCodeGenerator::new(33, POLY1, POLY2),
            Err(SimError::InvalidWidth { .. })
        ));
        assert_eq!(
            GoldCodeGenerator::new(10, &[], POLY2),
            Err(SimError::EmptyTaps("poly1"))
        );
        assert_eq!(
            GoldCodeGenerator::new(8, POLY1, POLY2),
            Err(SimError::InvalidTap { tap: 8, width: 8 })
        );

        let gen = GoldCodeGenerator::new(4, POLY1, &[0, 1]).unwrap();
        assert!(matches!(gen.generate(0, 1), Err(SimError::InvalidSeed { .. })));
        assert!(matches!(gen.generate(1, 16), Err(SimError::InvalidSeed { .. })));
    }

    #[test]
    fn test_cross_correlation_bound() {
        let bound = |n| GoldCodeGenerator::new(n, &[0], &[0]).unwrap().cross_correlation_bound();
        assert_eq!(bound(5), 9);
        assert_eq!(bound(6), 17);
        assert_eq!(bound(7), 17);
        assert_eq!(bound(10), 65);
    }

    #[test]
    fn test_processing_gain() {
        let gen = GoldCodeGenerator::new(7, &[0, 6], &[0, 3]).unwrap();
        // 127 chips = 21.03 dB
        assert!((gen.processing_gain_db() - 21.03).abs() < 0.01);
    }
}
