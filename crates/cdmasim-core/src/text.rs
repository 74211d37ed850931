//! Text and Random Bit Sources
//!
//! Converts between text and bit sequences (8 bits per byte, MSB first) and
//! draws uniformly random data from a caller-supplied random source.
//!
//! ```rust
//! use cdmasim_core::text::{from_text, to_text};
//!
//! let bits = from_text("A").unwrap();
//! assert_eq!(bits.to_string(), "01000001");
//! assert_eq!(to_text(&bits).as_deref(), Some("A"));
//! ```

use crate::bits::BitSequence;
use crate::error::SimResult;
use rand::Rng;

/// Unpack the bytes of `text` into bits, most significant bit first.
pub fn from_text(text: &str) -> SimResult<BitSequence> {
    let bytes = text.as_bytes();
    let mut seq = BitSequence::new(bytes.len() * 8)?;
    for (i, byte) in bytes.iter().enumerate() {
        for j in 0..8 {
            seq.put(i * 8 + j, (byte >> (7 - j)) & 1 == 1);
        }
    }
    Ok(seq)
}

/// Pack bits back into text, MSB first.
///
/// Returns `None` unless the length is a whole number of bytes. Bytes that
/// are not valid UTF-8 are replaced with U+FFFD.
pub fn to_text(seq: &BitSequence) -> Option<String> {
    if seq.len() % 8 != 0 {
        return None;
    }
    let bytes: Vec<u8> = (0..seq.len() / 8)
        .map(|i| (0..8).fold(0u8, |acc, j| (acc << 1) | seq.bit(i * 8 + j)))
        .collect();
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Exactly `len` uniformly random bits.
pub fn random_sequence<R: Rng + ?Sized>(len: usize, rng: &mut R) -> SimResult<BitSequence> {
    let mut seq = BitSequence::new(len)?;
    for i in 0..len {
        seq.put(i, rng.gen::<bool>());
    }
    Ok(seq)
}

/// `bits / 8` random lowercase letters from `'a'..'y'`.
///
/// Requests shorter than one byte yield an empty string.
pub fn random_text<R: Rng + ?Sized>(bits: usize, rng: &mut R) -> String {
    (0..bits / 8)
        .map(|_| char::from(rng.gen_range(b'a'..b'z')))
        .collect()
}
