//! Two-User CDMA Channel Simulator
//!
//! Both users share a Gold code family (same width and feedback
//! polynomials) and pick a member by seed pair. One run walks each user's
//! data through the full chain:
//!
//! ```text
//!  data A ─┐                                          ┌─ correlate(code A) → bits A
//!          ├─ pad → spread → Σ → + N(0, σ²) → received┤
//!  data B ─┘                                          └─ correlate(code B) → bits B
//! ```
//!
//! 1. If both users chose the same seed pair, user B's second seed is nudged
//!    so the two codes differ (best effort, see [`separate_seeds`]).
//! 2. The shorter data stream is zero-padded to the longer one. Padding bits
//!    are transmitted and decoded but trimmed before any metric is taken.
//! 3. Each data bit becomes `L = 2^n - 1` chips: `antipodal(bit) * antipodal(chip)`.
//! 4. The receiver sums each `L`-chip segment against the user's own code and
//!    decides 1 when the sum is strictly positive. A sum of exactly zero is 0.
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_sim::cdma::{CdmaParams, CdmaSimulator, DataSource, UserParams};
//! use rand::SeedableRng;
//!
//! let params = CdmaParams {
//!     user_a: UserParams::new(1, 0b1010101010, DataSource::Text("Hi".into())),
//!     user_b: UserParams::new(1, 0b1010101001, DataSource::Random(16)),
//!     noise_std: 0.0,
//!     ..Default::default()
//! };
//!
//! let sim = CdmaSimulator::new(params).unwrap();
//! let result = sim.run(&mut rand::rngs::StdRng::seed_from_u64(7)).unwrap();
//! assert_eq!(result.user_a.decoded_text.as_deref(), Some("Hi"));
//! assert_eq!(result.user_b.ber, 0.0);
//! ```

use crate::channel::{signal_power, AwgnChannel};
use cdmasim_core::ber::count_bit_errors;
use cdmasim_core::bits::BitSequence;
use cdmasim_core::correlation::{
    antipodal, bits_to_signal, correlation_sum, max_absolute_off_peak, max_cross_correlation,
    normalized_cross_correlation, periodic_autocorrelation,
};
use cdmasim_core::spreading::{encode, GoldCodeGenerator};
use cdmasim_core::text::{from_text, random_sequence, to_text};
use cdmasim_core::SimResult;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where a user's data bits come from.
///
/// Serialized untagged: a YAML string is text, an integer is a random bit
/// count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    /// UTF-8 text, 8 bits per byte, MSB first
    Text(String),
    /// This many uniformly random bits
    Random(usize),
}

impl DataSource {
    /// The text, if this is a non-empty text source.
    pub fn text(&self) -> Option<&str> {
        match self {
            DataSource::Text(t) if !t.is_empty() => Some(t),
            _ => None,
        }
    }

    /// Number of bits this source yields.
    pub fn bit_len(&self) -> usize {
        match self {
            DataSource::Text(t) => t.len() * 8,
            DataSource::Random(n) => *n,
        }
    }

    /// Draw the bits, or `None` for an empty request.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<Option<BitSequence>> {
        match self {
            DataSource::Text(t) if !t.is_empty() => from_text(t).map(Some),
            DataSource::Random(n) if *n > 0 => random_sequence(*n, rng).map(Some),
            _ => Ok(None),
        }
    }
}

/// One user's code selection and payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserParams {
    /// Seed of the first register
    pub seed1: u64,
    /// Seed of the second register
    pub seed2: u64,
    /// Payload
    pub data: DataSource,
}

impl UserParams {
    /// Create user parameters.
    pub fn new(seed1: u64, seed2: u64, data: DataSource) -> Self {
        Self { seed1, seed2, data }
    }

    /// `(seed1, seed2)`.
    pub fn seeds(&self) -> (u64, u64) {
        (self.seed1, self.seed2)
    }
}

/// Parameters of a two-user run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdmaParams {
    /// Register width `n`; codes are `2^n - 1` chips
    pub width: u32,
    /// Taps of the first register (shared)
    pub poly1: Vec<u32>,
    /// Taps of the second register (shared)
    pub poly2: Vec<u32>,
    /// First user
    pub user_a: UserParams,
    /// Second user
    pub user_b: UserParams,
    /// Channel noise standard deviation per chip
    pub noise_std: f64,
}

impl Default for CdmaParams {
    fn default() -> Self {
        Self {
            width: 10,
            poly1: vec![0, 3],
            poly2: vec![0, 2, 3, 8],
            user_a: UserParams::new(1, 0b1010101010, DataSource::Text("Hello".to_string())),
            user_b: UserParams::new(1, 0b1010101001, DataSource::Text("World".to_string())),
            noise_std: 0.5,
        }
    }
}

/// Seed-collision guard.
///
/// When both users picked the same seed pair, returns a perturbed pair for
/// user B: the second seed is decremented (incremented if it is 0 or 1); if
/// the pairs still collide the first seed is incremented. Otherwise returns
/// `b` unchanged. The result is not re-validated against the register
/// width here.
pub fn separate_seeds(a: (u64, u64), b: (u64, u64)) -> (u64, u64) {
    if a != b {
        return b;
    }
    let (mut b1, mut b2) = b;
    b2 = if b2 > 1 { b2 - 1 } else { b2 + 1 };
    if a == (b1, b2) {
        b1 = b1.wrapping_add(1);
    }
    (b1, b2)
}

/// Spreading-code quality, independent of the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMetrics {
    /// Chips per data bit (`2^n - 1`)
    pub code_length: usize,
    /// Unnormalized autocorrelation peak; equals the code length
    pub autocorrelation_peak: usize,
    /// Largest normalized off-peak autocorrelation of code A
    pub max_off_peak_a: f64,
    /// Largest normalized off-peak autocorrelation of code B
    pub max_off_peak_b: f64,
    /// Normalized zero-shift cross-correlation of the two codes
    pub cross_correlation: f64,
    /// Largest normalized cross-correlation over all cyclic lags
    pub max_cross_correlation: f64,
    /// Gold's bound `t(n) / L`
    pub cross_correlation_bound: f64,
    /// `10 log10(L)`
    pub processing_gain_db: f64,
}

impl CodeMetrics {
    fn measure(
        generator: &GoldCodeGenerator,
        code_a: &BitSequence,
        code_b: &BitSequence,
    ) -> SimResult<Self> {
        let signal_a = bits_to_signal(code_a);
        let signal_b = bits_to_signal(code_b);
        let code_length = code_a.len();
        Ok(Self {
            code_length,
            autocorrelation_peak: code_length,
            max_off_peak_a: max_absolute_off_peak(&periodic_autocorrelation(code_a)),
            max_off_peak_b: max_absolute_off_peak(&periodic_autocorrelation(code_b)),
            cross_correlation: normalized_cross_correlation(&signal_a, &signal_b)?,
            max_cross_correlation: max_cross_correlation(&signal_a, &signal_b)?,
            cross_correlation_bound: generator.cross_correlation_bound() as f64 / code_length as f64,
            processing_gain_db: generator.processing_gain_db(),
        })
    }
}

/// One user's view of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResult {
    /// Effective first seed
    pub seed1: u64,
    /// Effective second seed (after the collision guard)
    pub seed2: u64,
    /// Input text, when the data came from text
    pub input_text: Option<String>,
    /// The user requested no data and was given one random bit
    pub fallback: bool,
    /// Gold code
    pub code: BitSequence,
    /// True (unpadded) data bits
    pub original: BitSequence,
    /// Padded data XOR code, the bit-domain view of the spreading
    pub encoded: BitSequence,
    /// Antipodal chips put on the channel, `simulation_length * L` samples
    pub transmitted: Vec<f64>,
    /// Receiver decision statistic per true data bit
    pub correlation_sums: Vec<f64>,
    /// Decided bits, trimmed to the true data length
    pub decoded: BitSequence,
    /// Decoded text, when the input was text and whole bytes came back
    pub decoded_text: Option<String>,
    /// Bit errors against `original`
    pub errors: usize,
    /// `errors / original.len()`
    pub ber: f64,
}

impl UserResult {
    /// True data length in bits.
    pub fn data_bits(&self) -> usize {
        self.original.len()
    }
}

/// Immutable snapshot of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdmaResult {
    /// Effective parameters, seeds after the collision guard
    pub params: CdmaParams,
    /// The collision guard changed user B's seeds
    pub seeds_adjusted: bool,
    /// Code quality
    pub metrics: CodeMetrics,
    /// Data bits per user after padding
    pub simulation_length: usize,
    /// First user
    pub user_a: UserResult,
    /// Second user
    pub user_b: UserResult,
    /// Sum of both transmitted signals
    pub combined: Vec<f64>,
    /// Combined signal plus noise
    pub received: Vec<f64>,
    /// Combined signal power over noise variance; infinite without noise
    pub snr_db: f64,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

impl CdmaResult {
    /// Chips per data bit.
    pub fn code_length(&self) -> usize {
        self.metrics.code_length
    }

    /// The part of the received signal that carries `user`'s true data bits.
    pub fn received_segment(&self, user: &UserResult) -> &[f64] {
        let end = (user.data_bits() * self.code_length()).min(self.received.len());
        &self.received[..end]
    }

    /// Errors summed over both users.
    pub fn total_errors(&self) -> usize {
        self.user_a.errors + self.user_b.errors
    }
}

/// Validated two-user simulator.
///
/// Construction checks every parameter and generates both codes; each
/// [`run`](Self::run) draws fresh data and noise from the supplied random
/// source. The simulator keeps nothing between runs.
#[derive(Debug, Clone)]
pub struct CdmaSimulator {
    params: CdmaParams,
    seeds_adjusted: bool,
    channel: AwgnChannel,
    code_a: BitSequence,
    code_b: BitSequence,
    signal_a: Vec<f64>,
    signal_b: Vec<f64>,
    metrics: CodeMetrics,
}

impl CdmaSimulator {
    /// Validate `params` and prepare both codes.
    pub fn new(mut params: CdmaParams) -> SimResult<Self> {
        let generator = GoldCodeGenerator::new(params.width, &params.poly1, &params.poly2)?;
        let channel = AwgnChannel::new(params.noise_std)?;

        let requested = params.user_b.seeds();
        let (b1, b2) = separate_seeds(params.user_a.seeds(), requested);
        let seeds_adjusted = (b1, b2) != requested;
        if seeds_adjusted {
            tracing::debug!(
                from = ?requested,
                to = ?(b1, b2),
                "user B seeds collided with user A, adjusted"
            );
            params.user_b.seed1 = b1;
            params.user_b.seed2 = b2;
        }

        let code_a = generator.generate(params.user_a.seed1, params.user_a.seed2)?;
        let code_b = generator.generate(b1, b2)?;
        let metrics = CodeMetrics::measure(&generator, &code_a, &code_b)?;

        Ok(Self {
            signal_a: bits_to_signal(&code_a),
            signal_b: bits_to_signal(&code_b),
            params,
            seeds_adjusted,
            channel,
            code_a,
            code_b,
            metrics,
        })
    }

    /// The same users and codes over a channel with another noise level.
    ///
    /// Codes and metrics are reused, so this is much cheaper than
    /// [`new`](Self::new) for long codes.
    pub fn with_noise(&self, noise_std: f64) -> SimResult<Self> {
        let channel = AwgnChannel::new(noise_std)?;
        let mut sim = self.clone();
        sim.params.noise_std = noise_std;
        sim.channel = channel;
        Ok(sim)
    }

    /// Effective parameters.
    pub fn params(&self) -> &CdmaParams {
        &self.params
    }

    /// Whether the collision guard changed user B's seeds.
    pub fn seeds_adjusted(&self) -> bool {
        self.seeds_adjusted
    }

    /// Code quality of the two codes.
    pub fn metrics(&self) -> &CodeMetrics {
        &self.metrics
    }

    /// The two Gold codes, A then B.
    pub fn codes(&self) -> (&BitSequence, &BitSequence) {
        (&self.code_a, &self.code_b)
    }

    /// Execute one run.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<CdmaResult> {
        let span = tracing::debug_span!(
            "cdma_run",
            width = self.params.width,
            noise_std = self.params.noise_std
        );
        let _enter = span.enter();

        let (data_a, fallback_a) = resolve_user(&self.params.user_a.data, "A", rng)?;
        let (data_b, fallback_b) = resolve_user(&self.params.user_b.data, "B", rng)?;
        let simulation_length = data_a.len().max(data_b.len());

        let padded_a = data_a.resized(simulation_length)?;
        let padded_b = data_b.resized(simulation_length)?;
        let transmitted_a = spread(&padded_a, &self.signal_a);
        let transmitted_b = spread(&padded_b, &self.signal_b);

        let combined = AwgnChannel::combine(&[&transmitted_a, &transmitted_b])?;
        let received = self.channel.apply(&combined, rng);
        let snr_db = self.channel.snr_db(signal_power(&combined));

        let user_a = Receiver {
            params: &self.params.user_a,
            code: &self.code_a,
            code_signal: &self.signal_a,
        }
        .finish(data_a, &padded_a, fallback_a, transmitted_a, &received)?;
        let user_b = Receiver {
            params: &self.params.user_b,
            code: &self.code_b,
            code_signal: &self.signal_b,
        }
        .finish(data_b, &padded_b, fallback_b, transmitted_b, &received)?;

        tracing::debug!(
            bits = simulation_length,
            chips = self.metrics.code_length,
            errors_a = user_a.errors,
            errors_b = user_b.errors,
            "cdma run complete"
        );

        Ok(CdmaResult {
            params: self.params.clone(),
            seeds_adjusted: self.seeds_adjusted,
            metrics: self.metrics.clone(),
            simulation_length,
            user_a,
            user_b,
            combined,
            received,
            snr_db,
            timestamp: Utc::now(),
        })
    }
}

/// Spread every data bit over the code: `antipodal(bit) * chip`.
pub fn spread(data: &BitSequence, code_signal: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len() * code_signal.len());
    for bit in data.iter() {
        let symbol = antipodal(bit);
        out.extend(code_signal.iter().map(|chip| symbol * chip));
    }
    out
}

/// Correlate each code-length segment of `received` against the code.
///
/// Returns the decided bits (1 iff the sum is strictly positive) and the
/// sums, for the first `bits` segments.
pub fn despread(
    received: &[f64],
    code_signal: &[f64],
    bits: usize,
) -> SimResult<(BitSequence, Vec<f64>)> {
    let sums = received
        .chunks_exact(code_signal.len().max(1))
        .take(bits)
        .map(|segment| correlation_sum(segment, code_signal))
        .collect::<SimResult<Vec<f64>>>()?;
    let decided: Vec<u8> = sums.iter().map(|&sum| u8::from(sum > 0.0)).collect();
    Ok((BitSequence::from_bits(&decided)?, sums))
}

fn resolve_user<R: Rng + ?Sized>(
    data: &DataSource,
    label: &str,
    rng: &mut R,
) -> SimResult<(BitSequence, bool)> {
    match data.resolve(rng)? {
        Some(bits) => Ok((bits, false)),
        None => {
            tracing::warn!(user = label, "no data requested, sending one random bit");
            Ok((random_sequence(1, rng)?, true))
        }
    }
}

struct Receiver<'a> {
    params: &'a UserParams,
    code: &'a BitSequence,
    code_signal: &'a [f64],
}

impl Receiver<'_> {
    fn finish(
        &self,
        original: BitSequence,
        padded: &BitSequence,
        fallback: bool,
        transmitted: Vec<f64>,
        received: &[f64],
    ) -> SimResult<UserResult> {
        let (decoded_padded, mut correlation_sums) =
            despread(received, self.code_signal, padded.len())?;
        let decoded = decoded_padded.resized(original.len())?;
        correlation_sums.truncate(original.len());

        let errors = count_bit_errors(&original, &decoded)?;
        let input_text = self.params.data.text().map(str::to_string);
        let decoded_text = input_text.as_ref().and_then(|_| to_text(&decoded));

        Ok(UserResult {
            seed1: self.params.seed1,
            seed2: self.params.seed2,
            input_text,
            fallback,
            code: self.code.clone(),
            encoded: encode(padded, self.code),
            transmitted,
            correlation_sums,
            ber: errors as f64 / original.len() as f64,
            errors,
            decoded,
            decoded_text,
            original,
        })
    }
}
