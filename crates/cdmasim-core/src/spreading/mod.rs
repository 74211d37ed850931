//! Spreading Codes and XOR Spreading
//!
//! This module provides the pseudo-noise machinery of the simulator: the
//! Fibonacci LFSR, Gold codes built from two LFSRs, and the XOR spreader
//! that applies a code to a data stream.
//!
//! ## Sequence Types
//!
//! - **LFSR output**: one register, period up to 2^n - 1
//! - **Gold Codes**: XOR of two registers, preferred for multi-user access
//!
//! ```text
//! ┌──────────────┬───────────────┬─────────────────────────────┐
//! │ Code Type    │ Length        │ Cross-Corr                  │
//! ├──────────────┼───────────────┼─────────────────────────────┤
//! │ M-Sequence   │ 2^n - 1       │ Poor between family members │
//! │ Gold         │ 2^n - 1       │ Bounded (<= t(n))           │
//! └──────────────┴───────────────┴─────────────────────────────┘
//! ```
//!
//! Processing gain (dB) = 10 * log10(code length).

pub mod gold;
pub mod lfsr;
pub mod spreader;

pub use gold::{generate_gold_code, GoldCodeGenerator, GoldSequence, MAX_GOLD_WIDTH};
pub use lfsr::Lfsr;
pub use spreader::{decode, encode};

use crate::bits::BitSequence;
use crate::error::SimResult;

/// Common trait for clocked bit generators
pub trait BitSource {
    /// Clock the generator once and return the output bit (0 or 1)
    fn next_bit(&mut self) -> u8;

    /// Return to the initial state
    fn reset(&mut self);

    /// Collect the next `len` output bits
    fn take_bits(&mut self, len: usize) -> SimResult<BitSequence> {
        let mut seq = BitSequence::new(len)?;
        for i in 0..len {
            seq.put(i, self.next_bit() == 1);
        }
        Ok(seq)
    }
}

/// Processing gain in dB for a code of `chips` chips per data bit
pub fn processing_gain_db(chips: usize) -> f64 {
    10.0 * (chips as f64).log10()
}
