//! Multiple-Access Channel
//!
//! The shared medium of the CDMA simulator. Users transmit at the same time
//! on the same band, so the channel output is the sample-wise sum of their
//! antipodal chip streams, plus additive white Gaussian noise:
//!
//! ```text
//! received[k] = Σ_u transmitted_u[k] + N(0, σ²)
//! ```
//!
//! Noise is specified directly as a standard deviation per chip (not as an
//! SNR) because the users' summed power depends on how many are active.
//!
//! ## Usage
//!
//! ```rust
//! use cdmasim_sim::channel::AwgnChannel;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let a = vec![1.0, -1.0, 1.0];
//! let b = vec![1.0, 1.0, -1.0];
//!
//! let combined = AwgnChannel::combine(&[&a, &b]).unwrap();
//! assert_eq!(combined, vec![2.0, 0.0, 0.0]);
//!
//! let channel = AwgnChannel::new(0.0).unwrap();
//! assert_eq!(channel.apply(&combined, &mut rng), combined);
//! ```

use cdmasim_core::{SimError, SimResult};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Additive white Gaussian noise channel.
#[derive(Debug, Clone, Copy)]
pub struct AwgnChannel {
    noise_std: f64,
    /// `None` for a noiseless channel
    noise: Option<Normal<f64>>,
}

impl AwgnChannel {
    /// Create a channel with noise standard deviation `noise_std`.
    ///
    /// Fails for negative, NaN or infinite values.
    pub fn new(noise_std: f64) -> SimResult<Self> {
        if !noise_std.is_finite() || noise_std < 0.0 {
            return Err(SimError::InvalidNoiseLevel(noise_std));
        }
        let noise = if noise_std > 0.0 {
            Some(Normal::new(0.0, noise_std).map_err(|_| SimError::InvalidNoiseLevel(noise_std))?)
        } else {
            None
        };
        Ok(Self { noise_std, noise })
    }

    /// Noise standard deviation per chip.
    pub fn noise_std(&self) -> f64 {
        self.noise_std
    }

    /// Ratio of `signal_power` to the noise variance, in dB.
    ///
    /// Infinite for a noiseless channel.
    pub fn snr_db(&self, signal_power: f64) -> f64 {
        if self.noise_std == 0.0 {
            return f64::INFINITY;
        }
        10.0 * (signal_power / (self.noise_std * self.noise_std)).log10()
    }

    /// Linear superposition of equal-length signals.
    pub fn combine(signals: &[&[f64]]) -> SimResult<Vec<f64>> {
        let first = signals
            .first()
            .ok_or_else(|| SimError::DegenerateInput("no signals to combine".to_string()))?;
        let mut combined = first.to_vec();
        for signal in &signals[1..] {
            if signal.len() != combined.len() {
                return Err(SimError::LengthMismatch {
                    expected: combined.len(),
                    actual: signal.len(),
                });
            }
            for (acc, x) in combined.iter_mut().zip(signal.iter()) {
                *acc += x;
            }
        }
        Ok(combined)
    }

    /// Add one independent noise draw to every sample.
    ///
    /// A noiseless channel returns the input unchanged and draws nothing
    /// from `rng`.
    pub fn apply<R: Rng + ?Sized>(&self, signal: &[f64], rng: &mut R) -> Vec<f64> {
        match self.noise {
            None => signal.to_vec(),
            Some(dist) => signal.iter().map(|&s| s + dist.sample(rng)).collect(),
        }
    }
}

/// Average power of a real signal.
pub fn signal_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|s| s * s).sum::<f64>() / signal.len() as f64
}
