//! Fixed-Length Bit Sequences
//!
//! [`BitSequence`] is the container every other component works on: data
//! bits, Gold codes, spread and corrupted streams. Its length is fixed at
//! construction and always positive; individual bits are read and written by
//! index.
//!
//! Bits are packed into 64-bit words, index 0 in the least significant bit of
//! the first word. Bits past `len` in the last word are kept at zero so that
//! equality and popcount work word-wise.
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_core::bits::BitSequence;
//!
//! let mut seq = BitSequence::new(5).unwrap();
//! seq.set(1, 1).unwrap();
//! seq.set(4, 1).unwrap();
//! assert_eq!(seq.to_string(), "01001");
//! assert_eq!(seq.count_ones(), 2);
//! ```

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const WORD_BITS: usize = 64;

/// Fixed-length, index-addressable bit vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitSequence {
    words: Vec<u64>,
    len: usize,
}

impl BitSequence {
    /// Create a sequence of `len` zero bits.
    pub fn new(len: usize) -> SimResult<Self> {
        if len == 0 {
            return Err(SimError::InvalidLength(len));
        }
        Ok(Self {
            words: vec![0; (len + WORD_BITS - 1) / WORD_BITS],
            len,
        })
    }

    /// Build a sequence from one bit per byte (any non-zero byte is a 1).
    pub fn from_bits(bits: &[u8]) -> SimResult<Self> {
        let mut seq = Self::new(bits.len())?;
        for (i, &bit) in bits.iter().enumerate() {
            seq.put(i, bit != 0);
        }
        Ok(seq)
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a sequence holds at least one bit.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Read the bit at `index` (0 or 1).
    pub fn get(&self, index: usize) -> SimResult<u8> {
        self.check_index(index)?;
        Ok(self.bit(index))
    }

    /// Write the bit at `index`; any non-zero `value` sets it to 1.
    pub fn set(&mut self, index: usize, value: u8) -> SimResult<()> {
        self.check_index(index)?;
        self.put(index, value != 0);
        Ok(())
    }

    /// Iterate over the bits in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = u8> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    /// Copy the bits out, one per byte.
    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }

    /// Number of 1 bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Bitwise inverse of this sequence.
    pub fn complement(&self) -> Self {
        let mut out = Self {
            words: self.words.iter().map(|w| !w).collect(),
            len: self.len,
        };
        out.clear_tail();
        out
    }

    /// Copy into a sequence of `len` bits, zero-padding or truncating.
    pub fn resized(&self, len: usize) -> SimResult<Self> {
        let mut out = Self::new(len)?;
        let keep = self.words.len().min(out.words.len());
        out.words[..keep].copy_from_slice(&self.words[..keep]);
        out.clear_tail();
        Ok(out)
    }

    /// Number of positions at which two equal-length sequences differ.
    pub fn hamming_distance(&self, other: &Self) -> SimResult<usize> {
        if self.len != other.len {
            return Err(SimError::LengthMismatch {
                expected: self.len,
                actual: other.len,
            });
        }
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum())
    }

    /// Unchecked read for callers that already bounded `index`.
    #[inline]
    pub(crate) fn bit(&self, index: usize) -> u8 {
        ((self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1) as u8
    }

    #[inline]
    pub(crate) fn put(&mut self, index: usize, value: bool) {
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Invert the bit at `index` and return its new value.
    #[inline]
    pub(crate) fn toggle(&mut self, index: usize) -> bool {
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        *word ^= mask;
        *word & mask != 0
    }

    fn check_index(&self, index: usize) -> SimResult<()> {
        if index >= self.len {
            return Err(SimError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    fn clear_tail(&mut self) {
        let used = self.len % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self
            .iter()
            .map(|b| if b == 1 { '1' } else { '0' })
            .collect();
        f.write_str(&s)
    }
}

impl FromStr for BitSequence {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(0),
                '1' => Ok(1),
                other => Err(SimError::InvalidBitString(format!(
                    "unexpected character {:?}",
                    other
                ))),
            })
            .collect::<SimResult<Vec<u8>>>()?;
        Self::from_bits(&bits)
    }
}

impl Serialize for BitSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BitSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
