//! Single-User Bit-Domain Link
//!
//! The XOR spreading chain without a physical layer: data is XORed with a
//! Gold code, bits are flipped by the [`ErrorInjector`], and the receiver
//! XORs with the same code again.
//!
//! ```text
//! data → XOR(code) → flip bits → XOR(code) → decoded, BER
//! ```
//!
//! Because despreading is the same XOR, every injected flip survives as
//! exactly one decoded bit error. The link shows the code's whitening effect
//! on autocorrelation, not a coding gain.

use cdmasim_core::ber::count_bit_errors;
use cdmasim_core::bits::BitSequence;
use cdmasim_core::correlation::{max_absolute_off_peak, periodic_autocorrelation};
use cdmasim_core::error_injection::{Corruption, ErrorInjector, ErrorPattern};
use cdmasim_core::spreading::{decode, encode, GoldCodeGenerator};
use cdmasim_core::text::to_text;
use cdmasim_core::{SimError, SimResult};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cdma::DataSource;

/// Parameters of the single-user link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkParams {
    /// Register width `n`
    pub width: u32,
    /// Taps of the first register
    pub poly1: Vec<u32>,
    /// Taps of the second register
    pub poly2: Vec<u32>,
    /// Seed of the first register
    pub seed1: u64,
    /// Seed of the second register
    pub seed2: u64,
    /// Payload
    pub data: DataSource,
    /// Percentage of bits to corrupt, `[0, 100]`
    pub error_rate: f64,
    /// How corrupted bits are placed
    pub error_pattern: ErrorPattern,
    /// Run the receiver
    pub decode: bool,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            width: 10,
            poly1: vec![0, 3],
            poly2: vec![0, 2, 3, 8],
            seed1: 1,
            seed2: 0b1010101010,
            data: DataSource::Text("Hello".to_string()),
            error_rate: 0.0,
            error_pattern: ErrorPattern::Random,
            decode: true,
        }
    }
}

/// Receiver output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDecoding {
    /// Despread bits
    pub decoded: BitSequence,
    /// Decoded text, for text input of whole bytes
    pub decoded_text: Option<String>,
    /// Bit errors against the original
    pub errors: usize,
    /// Bit error rate against the original
    pub ber: f64,
}

/// Max off-peak autocorrelation at each stage of the link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageAutocorrelation {
    /// Of the data
    pub original: f64,
    /// After spreading
    pub encoded: f64,
    /// After error injection
    pub corrupted: f64,
}

/// Snapshot of one link run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResult {
    /// Parameters of the run
    pub params: LinkParams,
    /// Gold code
    pub code: BitSequence,
    /// Data bits
    pub original: BitSequence,
    /// Data XOR code
    pub encoded: BitSequence,
    /// Encoded bits after error injection
    pub corrupted: BitSequence,
    /// Bits that differ between `encoded` and `corrupted`
    pub errors_introduced: usize,
    /// Receiver output, when decoding was enabled
    pub decoding: Option<LinkDecoding>,
    /// Code-whitening view of each stage
    pub autocorrelation: StageAutocorrelation,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

/// Validated single-user link.
#[derive(Debug, Clone)]
pub struct LinkSimulator {
    params: LinkParams,
    code: BitSequence,
    injector: ErrorInjector,
}

impl LinkSimulator {
    /// Validate `params` and generate the code.
    ///
    /// Unlike the two-user simulator there is no fallback for empty data.
    pub fn new(params: LinkParams) -> SimResult<Self> {
        let generator = GoldCodeGenerator::new(params.width, &params.poly1, &params.poly2)?;
        let code = generator.generate(params.seed1, params.seed2)?;
        let injector = ErrorInjector::new(params.error_rate, params.error_pattern)?;
        if params.data.bit_len() == 0 {
            return Err(no_data());
        }
        Ok(Self {
            params,
            code,
            injector,
        })
    }

    /// Parameters.
    pub fn params(&self) -> &LinkParams {
        &self.params
    }

    /// Gold code.
    pub fn code(&self) -> &BitSequence {
        &self.code
    }

    /// Execute one run.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<LinkResult> {
        let original = self.params.data.resolve(rng)?.ok_or_else(no_data)?;
        let encoded = encode(&original, &self.code);
        let Corruption {
            sequence: corrupted,
            flipped: errors_introduced,
        } = self.injector.apply(&encoded, rng);

        let decoding = if self.params.decode {
            let decoded = decode(&corrupted, &self.code);
            let errors = count_bit_errors(&original, &decoded)?;
            let decoded_text = self.params.data.text().and_then(|_| to_text(&decoded));
            Some(LinkDecoding {
                ber: errors as f64 / original.len() as f64,
                errors,
                decoded,
                decoded_text,
            })
        } else {
            None
        };

        let autocorrelation = StageAutocorrelation {
            original: max_absolute_off_peak(&periodic_autocorrelation(&original)),
            encoded: max_absolute_off_peak(&periodic_autocorrelation(&encoded)),
            corrupted: max_absolute_off_peak(&periodic_autocorrelation(&corrupted)),
        };

        tracing::debug!(
            bits = original.len(),
            errors_introduced,
            errors = decoding.as_ref().map(|d| d.errors),
            "link run complete"
        );

        Ok(LinkResult {
            params: self.params.clone(),
            code: self.code.clone(),
            original,
            encoded,
            corrupted,
            errors_introduced,
            decoding,
            autocorrelation,
            timestamp: Utc::now(),
        })
    }
}

fn no_data() -> SimError {
    SimError::DegenerateInput("link has no data: empty text and zero random bits".to_string())
}
