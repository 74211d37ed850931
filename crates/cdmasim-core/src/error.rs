//! Simulation error types

use thiserror::Error;

/// Result type for engine operations
pub type SimResult<T> = Result<T, SimError>;

/// Broad class of a [`SimError`].
///
/// Callers that only care whether the parameters were wrong, the operands
/// disagreed in length, or there was nothing to simulate can match on this
/// instead of on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid width, tap, seed, rate, noise or length parameter
    Configuration,
    /// Operands of a pairwise operation have different lengths
    LengthMismatch,
    /// No data to simulate and no fallback available
    DegenerateInput,
}

/// Errors raised by the spread-spectrum engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Bit sequence length must be positive
    #[error("Invalid sequence length: {0} (must be > 0)")]
    InvalidLength(usize),

    /// Bit index outside `[0, len)`
    #[error("Bit index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Register width outside the supported range
    #[error("Invalid register width {width}: must be in [{min}, {max}]")]
    InvalidWidth { width: u32, min: u32, max: u32 },

    /// Seed is zero or does not fit in the register
    #[error("Invalid seed 0x{seed:X} for {width}-bit register: must be non-zero and < 2^{width}")]
    InvalidSeed { seed: u64, width: u32 },

    /// Tap position at or beyond the register width
    #[error("Tap position {tap} exceeds {width}-bit register")]
    InvalidTap { tap: u32, width: u32 },

    /// A feedback polynomial without taps
    #[error("Tap list for {0} is empty")]
    EmptyTaps(&'static str),

    /// Error-injection rate not a percentage
    #[error("Invalid error rate {0}: must be a percentage in [0, 100]")]
    InvalidErrorRate(f64),

    /// Channel noise standard deviation negative or not finite
    #[error("Invalid noise level {0}: standard deviation must be finite and >= 0")]
    InvalidNoiseLevel(f64),

    /// String contains something other than '0' and '1'
    #[error("Invalid bit string: {0}")]
    InvalidBitString(String),

    /// Operands of a pairwise operation differ in length
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Nothing to simulate
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

impl SimError {
    /// Map this error onto the three-way error taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::LengthMismatch { .. } => ErrorCategory::LengthMismatch,
            SimError::DegenerateInput(_) => ErrorCategory::DegenerateInput,
            _ => ErrorCategory::Configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            SimError::InvalidSeed { seed: 0, width: 4 }.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            SimError::LengthMismatch { expected: 3, actual: 4 }.category(),
            ErrorCategory::LengthMismatch
        );
        assert_eq!(
            SimError::DegenerateInput("empty".into()).category(),
            ErrorCategory::DegenerateInput
        );
        assert_eq!(
            SimError::InvalidNoiseLevel(-1.0).category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_messages() {
        let err = SimError::InvalidSeed { seed: 0x10, width: 4 };
        assert_eq!(
            err.to_string(),
            "Invalid seed 0x10 for 4-bit register: must be non-zero and < 2^4"
        );
        let err = SimError::InvalidTap { tap: 9, width: 8 };
        assert!(err.to_string().contains("Tap position 9"));
    }
}
