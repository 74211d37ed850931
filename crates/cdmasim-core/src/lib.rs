//! # Spread-Spectrum Core Library
//!
//! Primitives for direct-sequence spread spectrum and code-division
//! multiple access (CDMA) experiments on bit streams.
//!
//! ## Overview
//!
//! - **Bit sequences**: fixed-length, non-empty, packed; rendered as `'0'`/`'1'` strings
//! - **Pseudo-noise codes**: Fibonacci LFSRs and Gold codes built from two of them
//! - **Spreading**: XOR of data with a repeating code, its own inverse
//! - **Impairments**: random and burst bit-error injection
//! - **Analysis**: periodic autocorrelation, cross-correlation, bit error rate
//!
//! ## Signal Flow
//!
//! ```text
//! TX: Text → Bits → XOR(Gold code) → Errors → RX
//! RX: Bits → XOR(Gold code) → Bits → Text, BER vs original
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_core::prelude::*;
//!
//! let code = generate_gold_code(10, &[0, 3], 1, &[0, 2, 3, 8], 0b1010101010).unwrap();
//! assert_eq!(code.len(), 1023);
//!
//! let data = from_text("A").unwrap();
//! let spread = encode(&data, &code);
//! let decoded = decode(&spread, &code);
//! assert_eq!(to_text(&decoded).as_deref(), Some("A"));
//! assert_eq!(calculate_ber(&data, &decoded).unwrap(), 0.0);
//! ```

pub mod ber;
pub mod bits;
pub mod correlation;
pub mod error;
pub mod error_injection;
pub mod observe;
pub mod spreading;
pub mod text;

pub use ber::{calculate_ber, count_bit_errors, BerTarget, BerTester};
pub use bits::BitSequence;
pub use error::{ErrorCategory, SimError, SimResult};
pub use error_injection::{add_errors, ErrorInjector, ErrorPattern};
pub use spreading::{generate_gold_code, BitSource, GoldCodeGenerator, Lfsr};

/// Commonly used items
pub mod prelude {
    pub use crate::ber::{calculate_ber, count_bit_errors, theoretical_spread_ber};
    pub use crate::bits::BitSequence;
    pub use crate::correlation::{
        bits_to_signal, correlation_sum, max_absolute_off_peak, normalized_cross_correlation,
        periodic_autocorrelation,
    };
    pub use crate::error::{SimError, SimResult};
    pub use crate::error_injection::{add_errors, ErrorInjector, ErrorPattern};
    pub use crate::spreading::{
        decode, encode, generate_gold_code, BitSource, GoldCodeGenerator, Lfsr,
    };
    pub use crate::text::{from_text, random_sequence, random_text, to_text};
}
