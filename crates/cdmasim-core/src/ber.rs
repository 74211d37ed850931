//! BER Measurement: Bit Error Rate analysis
//!
//! Single-shot BER between an original and a decoded sequence, plus an
//! accumulator for measurements that span several runs (noise sweeps) and
//! a target that says when enough has been observed.
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_core::ber::{calculate_ber, BerTester};
//! use cdmasim_core::bits::BitSequence;
//!
//! let tx: BitSequence = "1011001110".parse().unwrap();
//! let rx: BitSequence = "1010001111".parse().unwrap();
//! //                        ^        ^  -- 2 errors
//! assert!((calculate_ber(&tx, &rx).unwrap() - 0.2).abs() < 1e-12);
//!
//! let mut ber = BerTester::new();
//! ber.update(&tx, &rx).unwrap();
//! assert_eq!(ber.error_bits(), 2);
//! ```

use crate::bits::BitSequence;
use crate::error::SimResult;
use serde::{Deserialize, Serialize};

/// Number of positions where `original` and `decoded` differ.
pub fn count_bit_errors(original: &BitSequence, decoded: &BitSequence) -> SimResult<usize> {
    original.hamming_distance(decoded)
}

/// Fraction of mismatched bits between two equal-length sequences.
pub fn calculate_ber(original: &BitSequence, decoded: &BitSequence) -> SimResult<f64> {
    Ok(count_bit_errors(original, decoded)? as f64 / original.len() as f64)
}

/// Accumulated bit and error counts over several measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BerTester {
    total_bits: u64,
    error_bits: u64,
}

impl BerTester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare an original and a decoded sequence of the same length.
    pub fn update(&mut self, original: &BitSequence, decoded: &BitSequence) -> SimResult<()> {
        let errors = count_bit_errors(original, decoded)?;
        self.total_bits += original.len() as u64;
        self.error_bits += errors as u64;
        Ok(())
    }

    /// Errors per bit so far, 0 before any update.
    pub fn ber(&self) -> f64 {
        if self.total_bits == 0 {
            return 0.0;
        }
        self.error_bits as f64 / self.total_bits as f64
    }

    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    pub fn error_bits(&self) -> u64 {
        self.error_bits
    }
}

/// Point at which an accumulated BER is trusted.
///
/// Low error rates need many bits before the estimate settles, so both an
/// error count and a bit count must be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BerTarget {
    /// Errors to observe
    pub min_errors: u64,
    /// Bits to observe
    pub min_bits: u64,
}

impl Default for BerTarget {
    fn default() -> Self {
        Self {
            min_errors: 100,
            min_bits: 10_000,
        }
    }
}

impl BerTarget {
    pub fn is_met(&self, tester: &BerTester) -> bool {
        tester.error_bits >= self.min_errors && tester.total_bits >= self.min_bits
    }
}

/// Theoretical single-user BER of a correlation receiver.
///
/// Each data bit is spread over `chips` antipodal chips and every chip gets
/// Gaussian noise of standard deviation `noise_std`, so the decision
/// statistic has mean ±chips and variance chips·σ²:
/// BER = Q(√chips / σ). Multi-access interference is not included.
pub fn theoretical_spread_ber(chips: usize, noise_std: f64) -> f64 {
    if noise_std <= 0.0 {
        return 0.0;
    }
    let arg = (chips as f64).sqrt() / noise_std;
    0.5 * erfc(arg / std::f64::consts::SQRT_2)
}

/// Complementary error function, Chebyshev fit with relative error
/// below 1.2e-7 everywhere.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let r = t * poly.exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_zero_ber() {
        let x: BitSequence = "10110".parse().unwrap();
        assert_eq!(calculate_ber(&x, &x).unwrap(), 0.0);
        assert_eq!(count_bit_errors(&x, &x).unwrap(), 0);
    }

    #[test]
    fn test_complement_ber_is_one() {
        let x: BitSequence = "1011000111010".parse().unwrap();
        assert_eq!(calculate_ber(&x, &x.complement()).unwrap(), 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        let a: BitSequence = "101".parse().unwrap();
        let b: BitSequence = "10".parse().unwrap();
        assert_eq!(
            calculate_ber(&a, &b),
            Err(SimError::LengthMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_tester_accumulates() {
        let mut ber = BerTester::new();
        assert_eq!(ber.ber(), 0.0);
        let a = BitSequence::from_bits(&[1; 50]).unwrap();
        ber.update(&a, &a.complement()).unwrap(); // 50 errors
        ber.update(&a, &a).unwrap(); // 0 errors
        assert_eq!(ber.total_bits(), 100);
        assert_eq!(ber.error_bits(), 50);
        assert!((ber.ber() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_target_needs_errors_and_bits() {
        let target = BerTarget {
            min_errors: 5,
            min_bits: 20,
        };
        let a = BitSequence::from_bits(&[0; 10]).unwrap();
        let mut ber = BerTester::new();

        ber.update(&a, &a.complement()).unwrap();
        assert!(!target.is_met(&ber)); // 10 errors, 10 bits

        ber.update(&a, &a).unwrap();
        assert!(target.is_met(&ber)); // 10 errors, 20 bits

        let mut clean = BerTester::new();
        for _ in 0..10 {
            clean.update(&a, &a).unwrap();
        }
        assert!(!target.is_met(&clean));
    }

    #[test]
    fn test_erfc() {
        assert!((erfc(0.0) - 1.0).abs() < 1e-6);
        assert!(erfc(5.0) < 1e-10);
        assert!((erfc(-5.0) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_theoretical_spread_ber() {
        assert_eq!(theoretical_spread_ber(31, 0.0), 0.0);
        // 1 chip, sigma 1: Q(1) ≈ 0.1587
        assert!((theoretical_spread_ber(1, 1.0) - 0.1587).abs() < 1e-3);
        // spreading lowers the error rate at the same chip noise
        assert!(theoretical_spread_ber(1023, 5.0) < theoretical_spread_ber(31, 5.0));
    }
}
