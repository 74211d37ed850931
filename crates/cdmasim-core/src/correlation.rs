//! Correlation Analysis
//!
//! Code-quality metrics and the receiver's decision statistic.
//!
//! - **Periodic autocorrelation** of a bit sequence: for each cyclic shift,
//!   `(agreements - disagreements) / L`. Shift 0 is always 1.0; small
//!   off-peak values mean the code is easy to synchronise on.
//! - **Antipodal signals**: bit 1 → +1.0, bit 0 → -1.0. All physical-layer
//!   arithmetic (combining, noise, correlation) uses this form.
//! - **Cross-correlation** between two signals, normalized by length. Near
//!   zero means two users interfere little.
//! - **Correlation sum**: the unnormalized dot product the receiver
//!   thresholds at zero.
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_core::bits::BitSequence;
//! use cdmasim_core::correlation::{bits_to_signal, normalized_cross_correlation};
//!
//! let seq: BitSequence = "1101".parse().unwrap();
//! let sig = bits_to_signal(&seq);
//! assert_eq!(sig, vec![1.0, 1.0, -1.0, 1.0]);
//! assert_eq!(normalized_cross_correlation(&sig, &sig).unwrap(), 1.0);
//! ```

use crate::bits::BitSequence;
use crate::error::{SimError, SimResult};

/// Periodic autocorrelation for every shift in `[0, L)`.
///
/// O(L²) in the sequence length.
pub fn periodic_autocorrelation(seq: &BitSequence) -> Vec<f64> {
    let n = seq.len();
    let bits = seq.to_vec();
    (0..n)
        .map(|shift| {
            let agreements = (0..n).filter(|&i| bits[i] == bits[(i + shift) % n]).count();
            (2 * agreements as i64 - n as i64) as f64 / n as f64
        })
        .collect()
}

/// Largest `|values[i]|` for `i >= 1`; 0.0 if there is no off-peak value.
pub fn max_absolute_off_peak(values: &[f64]) -> f64 {
    values
        .iter()
        .skip(1)
        .map(|v| v.abs())
        .fold(0.0, f64::max)
}

/// Antipodal mapping: 1 → +1.0, 0 → -1.0.
pub fn bits_to_signal(seq: &BitSequence) -> Vec<f64> {
    seq.iter().map(|b| if b == 1 { 1.0 } else { -1.0 }).collect()
}

/// Antipodal value of a single bit.
#[inline]
pub fn antipodal(bit: u8) -> f64 {
    if bit == 0 {
        -1.0
    } else {
        1.0
    }
}

fn check_lengths(a: &[f64], b: &[f64]) -> SimResult<()> {
    if a.len() != b.len() {
        return Err(SimError::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() {
        return Err(SimError::InvalidLength(0));
    }
    Ok(())
}

/// `Σ a[i]·b[i]`, the receiver's decision statistic.
pub fn correlation_sum(a: &[f64], b: &[f64]) -> SimResult<f64> {
    check_lengths(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// `(1/L) Σ a[i]·b[i]` at zero shift.
pub fn normalized_cross_correlation(a: &[f64], b: &[f64]) -> SimResult<f64> {
    Ok(correlation_sum(a, b)? / a.len() as f64)
}

/// Normalized cyclic cross-correlation with `b` shifted by `lag`.
pub fn periodic_cross_correlation(a: &[f64], b: &[f64], lag: usize) -> SimResult<f64> {
    check_lengths(a, b)?;
    let n = a.len();
    let sum: f64 = a
        .iter()
        .enumerate()
        .map(|(i, x)| x * b[(i + lag) % n])
        .sum();
    Ok(sum / n as f64)
}

/// Largest absolute normalized cross-correlation over all cyclic lags.
///
/// O(L²) in the signal length.
pub fn max_cross_correlation(a: &[f64], b: &[f64]) -> SimResult<f64> {
    check_lengths(a, b)?;
    (0..a.len()).try_fold(0.0f64, |acc, lag| {
        Ok(acc.max(periodic_cross_correlation(a, b, lag)?.abs()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreading::generate_gold_code;
    use crate::text::random_sequence;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_autocorrelation_peak_is_one() {
        let mut rng = StdRng::seed_from_u64(17);
        for n in [1, 2, 31, 100] {
            let seq = random_sequence(n, &mut rng).unwrap();
            let ac = periodic_autocorrelation(&seq);
            assert_eq!(ac.len(), n);
            assert_eq!(ac[0], 1.0);
        }
    }

    #[test]
    fn test_autocorrelation_values() {
        let seq: BitSequence = "1100".parse().unwrap();
        // shift 1: 1100 vs 1001 -> 2 agree; shift 2: 1100 vs 0011 -> 0 agree
        assert_eq!(periodic_autocorrelation(&seq), vec![1.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_m_sequence_off_peak() {
        use crate::spreading::{BitSource, Lfsr};
        let seq = Lfsr::new(1, &[0, 3], 4).unwrap().take_bits(15).unwrap();
        let ac = periodic_autocorrelation(&seq);
        for v in &ac[1..] {
            assert_relative_eq!(*v, -1.0 / 15.0, epsilon = 1e-12);
        }
        assert_relative_eq!(max_absolute_off_peak(&ac), 1.0 / 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_absolute_off_peak() {
        assert_eq!(max_absolute_off_peak(&[1.0]), 0.0);
        assert_eq!(max_absolute_off_peak(&[]), 0.0);
        assert_eq!(max_absolute_off_peak(&[1.0, 0.2, -0.6, 0.3]), 0.6);
    }

    #[test]
    fn test_bits_to_signal() {
        let seq: BitSequence = "0101".parse().unwrap();
        assert_eq!(bits_to_signal(&seq), vec![-1.0, 1.0, -1.0, 1.0]);
        assert_eq!(antipodal(1), 1.0);
        assert_eq!(antipodal(0), -1.0);
    }

    #[test]
    fn test_cross_correlation_self_and_negated() {
        let mut rng = StdRng::seed_from_u64(23);
        let sig = bits_to_signal(&random_sequence(64, &mut rng).unwrap());
        let neg: Vec<f64> = sig.iter().map(|x| -x).collect();
        assert_eq!(normalized_cross_correlation(&sig, &sig).unwrap(), 1.0);
        assert_eq!(normalized_cross_correlation(&sig, &neg).unwrap(), -1.0);
    }

    #[test]
    fn test_length_checks() {
        assert_eq!(
            normalized_cross_correlation(&[1.0, 1.0], &[1.0]),
            Err(SimError::LengthMismatch { expected: 2, actual: 1 })
        );
        assert_eq!(
            normalized_cross_correlation(&[], &[]),
            Err(SimError::InvalidLength(0))
        );
        assert!(correlation_sum(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_correlation_sum() {
        assert_eq!(correlation_sum(&[1.0, -1.0, 0.5], &[2.0, 1.0, 4.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_periodic_cross_correlation_lag() {
        let a = [1.0, -1.0, -1.0];
        let b = [-1.0, 1.0, -1.0];
        // b shifted by 2: [-1, -1, 1] -> (-1 + 1 - 1) / 3
        assert_relative_eq!(periodic_cross_correlation(&a, &b, 2).unwrap(), -1.0 / 3.0);
        // b shifted by 1: [1, -1, -1] == a
        assert_relative_eq!(periodic_cross_correlation(&a, &b, 1).unwrap(), 1.0);
        assert_relative_eq!(max_cross_correlation(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn test_gold_pair_cross_correlation_is_small() {
        let a = generate_gold_code(10, &[0, 3], 1, &[0, 2, 3, 8], 0b1010101010).unwrap();
        let b = generate_gold_code(10, &[0, 3], 1, &[0, 2, 3, 8], 0b1010101001).unwrap();
        let xc = normalized_cross_correlation(&bits_to_signal(&a), &bits_to_signal(&b)).unwrap();
        assert!(xc.abs() < 1.0);
    }
}
