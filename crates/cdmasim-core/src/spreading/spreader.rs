//! XOR Spreader
//!
//! Encoding XORs every data bit with the code chip at the same index, the
//! code repeating when the data is longer. XOR with the same stream twice is
//! the identity, so decoding is the same operation:
//!
//! ```rust
//! use cdmasim_core::bits::BitSequence;
//! use cdmasim_core::spreading::{decode, encode};
//!
//! let data: BitSequence = "1100101".parse().unwrap();
//! let code: BitSequence = "011".parse().unwrap();
//! let spread = encode(&data, &code);
//! assert_eq!(spread.to_string(), "1010011");
//! assert_eq!(decode(&spread, &code), data);
//! ```

use crate::bits::BitSequence;

/// `out[i] = data[i] XOR code[i mod len(code)]`.
pub fn encode(data: &BitSequence, code: &BitSequence) -> BitSequence {
    let mut out = data.clone();
    let chips = code.len();
    for i in 0..data.len() {
        out.put(i, (data.bit(i) ^ code.bit(i % chips)) == 1);
    }
    out
}

/// Inverse of [`encode`]; the same XOR.
pub fn decode(spread: &BitSequence, code: &BitSequence) -> BitSequence {
    encode(spread, code)
}
