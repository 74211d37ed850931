//! Bit Error Injection
//!
//! Corrupts a bit sequence to model a noisy binary channel. Two patterns:
//!
//! | Pattern | Model                                                        |
//! |---------|--------------------------------------------------------------|
//! | Random  | every bit flips independently with probability `rate / 100`  |
//! | Burst   | `floor(len * rate / 100 / 3)` bursts of 3 adjacent flips      |
//!
//! Burst start positions are drawn independently, so bursts may overlap
//! and cancel each other's flips. The reported count is the number of bits
//! that actually differ from the input, which can be lower than
//! `bursts * 3`. The burst pattern approximates the rate; it does not
//! control it exactly.
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_core::bits::BitSequence;
//! use cdmasim_core::error_injection::{ErrorInjector, ErrorPattern};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let seq = BitSequence::new(1000).unwrap();
//! let injector = ErrorInjector::new(10.0, ErrorPattern::Random).unwrap();
//! let result = injector.apply(&seq, &mut rng);
//! assert_eq!(result.sequence.count_ones(), result.flipped);
//! ```

use crate::bits::BitSequence;
use crate::error::{SimError, SimResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Adjacent bits flipped by one burst.
pub const BURST_LENGTH: usize = 3;

/// Corruption pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPattern {
    /// Independent per-bit flips
    #[default]
    Random,
    /// Runs of [`BURST_LENGTH`] flips at random positions
    Burst,
}

impl fmt::Display for ErrorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPattern::Random => write!(f, "random"),
            ErrorPattern::Burst => write!(f, "burst"),
        }
    }
}

impl FromStr for ErrorPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(ErrorPattern::Random),
            "burst" => Ok(ErrorPattern::Burst),
            other => Err(format!(
                "unknown error pattern '{}' (expected 'random' or 'burst')",
                other
            )),
        }
    }
}

/// A corrupted copy and the number of bits that differ from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corruption {
    /// Corrupted sequence
    pub sequence: BitSequence,
    /// Bits that differ from the input
    pub flipped: usize,
}

/// Validated error rate and pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorInjector {
    rate: f64,
    pattern: ErrorPattern,
}

impl ErrorInjector {
    /// `rate` is a percentage in `[0, 100]`.
    pub fn new(rate: f64, pattern: ErrorPattern) -> SimResult<Self> {
        if !(0.0..=100.0).contains(&rate) {
            return Err(SimError::InvalidErrorRate(rate));
        }
        Ok(Self { rate, pattern })
    }

    /// Error rate in percent.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Corruption pattern.
    pub fn pattern(&self) -> ErrorPattern {
        self.pattern
    }

    /// Corrupt a copy of `seq`. The input is not modified.
    pub fn apply<R: Rng + ?Sized>(&self, seq: &BitSequence, rng: &mut R) -> Corruption {
        let mut sequence = seq.clone();
        if self.rate <= 0.0 {
            return Corruption { sequence, flipped: 0 };
        }

        let flipped = match self.pattern {
            ErrorPattern::Random => {
                let p = self.rate / 100.0;
                let mut flips = 0;
                for i in 0..seq.len() {
                    if rng.gen::<f64>() < p {
                        sequence.put(i, seq.bit(i) == 0);
                        flips += 1;
                    }
                }
                flips
            }
            ErrorPattern::Burst => {
                let len = seq.len();
                let bursts = (len as f64 * self.rate / 100.0 / BURST_LENGTH as f64) as usize;
                let last_start = len.saturating_sub(BURST_LENGTH);
                let mut flipped = 0usize;
                for _ in 0..bursts {
                    let start = rng.gen_range(0..=last_start);
                    for i in start..(start + BURST_LENGTH).min(len) {
                        // a second hit restores the bit
                        if sequence.toggle(i) == (seq.bit(i) == 0) {
                            flipped += 1;
                        } else {
                            flipped -= 1;
                        }
                    }
                }
                tracing::trace!(
                    bursts,
                    nominal = bursts * BURST_LENGTH,
                    flipped,
                    "burst errors injected"
                );
                flipped
            }
        };

        Corruption { sequence, flipped }
    }
}

/// Corrupt `seq` at `rate` percent with `pattern`.
///
/// Returns the corrupted copy and the number of flipped bits.
pub fn add_errors<R: Rng + ?Sized>(
    seq: &BitSequence,
    rate: f64,
    pattern: ErrorPattern,
    rng: &mut R,
) -> SimResult<(BitSequence, usize)> {
    let Corruption { sequence, flipped } = ErrorInjector::new(rate, pattern)?.apply(seq, rng);
    Ok((sequence, flipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::random_sequence;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_rate_is_exact_copy() {
        let mut rng = StdRng::seed_from_u64(5);
        let seq = random_sequence(257, &mut rng).unwrap();
        for pattern in [ErrorPattern::Random, ErrorPattern::Burst] {
            let (out, flips) = add_errors(&seq, 0.0, pattern, &mut rng).unwrap();
            assert_eq!(out, seq);
            assert_eq!(flips, 0);
        }
    }

    #[test]
    fn test_rate_validation() {
        assert_eq!(
            ErrorInjector::new(-1.0, ErrorPattern::Random),
            Err(SimError::InvalidErrorRate(-1.0))
        );
        assert!(ErrorInjector::new(100.5, ErrorPattern::Burst).is_err());
        assert!(ErrorInjector::new(f64::NAN, ErrorPattern::Burst).is_err());
        assert!(ErrorInjector::new(100.0, ErrorPattern::Burst).is_ok());
    }

    #[test]
    fn test_full_rate_random_flips_everything() {
        let mut rng = StdRng::seed_from_u64(8);
        let seq = random_sequence(100, &mut rng).unwrap();
        let (out, flips) = add_errors(&seq, 100.0, ErrorPattern::Random, &mut rng).unwrap();
        assert_eq!(flips, 100);
        assert_eq!(out, seq.complement());
    }

    #[test]
    fn test_random_count_matches_difference() {
        let mut rng = StdRng::seed_from_u64(21);
        let seq = random_sequence(5000, &mut rng).unwrap();
        let (out, flips) = add_errors(&seq, 10.0, ErrorPattern::Random, &mut rng).unwrap();
        assert_eq!(seq.hamming_distance(&out).unwrap(), flips);
        // 500 expected
        assert!(flips > 400 && flips < 600, "flips = {}", flips);
    }

    #[test]
    fn test_burst_count_bounded_by_nominal() {
        let mut rng = StdRng::seed_from_u64(4);
        let seq = BitSequence::new(300).unwrap();
        let (out, flips) = add_errors(&seq, 30.0, ErrorPattern::Burst, &mut rng).unwrap();
        // 300 * 0.3 / 3 = 30 bursts, at most 90 flipped bits
        assert!(flips <= 90);
        assert!(flips > 0);
        assert_eq!(out.count_ones(), flips);
    }

    #[test]
    fn test_overlapping_bursts_count_net_flips() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..20 {
            let seq = random_sequence(12, &mut rng).unwrap();
            // 4 bursts over 10 start positions, overlaps are common
            let (out, flips) = add_errors(&seq, 100.0, ErrorPattern::Burst, &mut rng).unwrap();
            assert_eq!(seq.hamming_distance(&out).unwrap(), flips);
        }
    }

    #[test]
    fn test_burst_flips_adjacent_bits() {
        let mut rng = StdRng::seed_from_u64(12);
        let seq = BitSequence::new(100).unwrap();
        // 100 * 3% / 3 = 1 burst
        let (out, flips) = add_errors(&seq, 3.0, ErrorPattern::Burst, &mut rng).unwrap();
        assert_eq!(flips, 3);
        let ones: Vec<usize> = (0..100).filter(|&i| out.get(i).unwrap() == 1).collect();
        assert_eq!(ones[2] - ones[0], 2);
    }

    #[test]
    fn test_burst_on_short_sequence() {
        let mut rng = StdRng::seed_from_u64(2);
        let seq = BitSequence::new(2).unwrap();
        // floor(2 * 1.0 / 3) = 0 bursts
        let (out, flips) = add_errors(&seq, 100.0, ErrorPattern::Burst, &mut rng).unwrap();
        assert_eq!(flips, 0);
        assert_eq!(out, seq);

        let seq = BitSequence::new(3).unwrap();
        let (out, flips) = add_errors(&seq, 100.0, ErrorPattern::Burst, &mut rng).unwrap();
        assert_eq!(flips, 3);
        assert_eq!(out.to_string(), "111");
    }

    #[test]
    fn test_input_untouched() {
        let mut rng = StdRng::seed_from_u64(6);
        let seq = random_sequence(64, &mut rng).unwrap();
        let before = seq.clone();
        let _ = add_errors(&seq, 50.0, ErrorPattern::Random, &mut rng).unwrap();
        assert_eq!(seq, before);
    }

    #[test]
    fn test_pattern_parse() {
        assert_eq!("random".parse::<ErrorPattern>(), Ok(ErrorPattern::Random));
        assert_eq!("BURST".parse::<ErrorPattern>(), Ok(ErrorPattern::Burst));
        assert!("gaussian".parse::<ErrorPattern>().is_err());
        assert_eq!(ErrorPattern::Burst.to_string(), "burst");
    }
}
