//! Varint encoding
//!
//! Unsigned base-128 varints used as frame length prefixes.
//!
//! ```text
//!   300 = 0b10_0101100
//!
//!   ┌──────────────┬──────────────┐
//!   │ 1 0101100    │ 0 0000010    │
//!   │ 0xAC         │ 0x02         │
//!   └──────────────┴──────────────┘
//!     ^ continuation bit
//! ```
//!
//! Groups are written least significant first, 7 payload bits per byte.

use crate::error::{BridgeError, Result};

/// Maximum encoded size of a u64 varint
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION_BIT: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7F;

/// Number of bytes `value` occupies once encoded
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Append the varint encoding of `value` to `out`
pub fn encode(value: u64, out: &mut Vec<u8>) {
    let mut remaining = value;
    while remaining >= u64::from(CONTINUATION_BIT) {
        out.push((remaining as u8 & PAYLOAD_MASK) | CONTINUATION_BIT);
        remaining >>= 7;
    }
    out.push(remaining as u8);
}

/// Encode `value` into a fixed array, returning the array and the used length
pub fn encode_to_array(value: u64) -> ([u8; MAX_VARINT_LEN], usize) {
    let mut array = [0u8; MAX_VARINT_LEN];
    let mut remaining = value;
    let mut i = 0;
    while remaining >= u64::from(CONTINUATION_BIT) {
        array[i] = (remaining as u8 & PAYLOAD_MASK) | CONTINUATION_BIT;
        remaining >>= 7;
        i += 1;
    }
    array[i] = remaining as u8;
    (array, i + 1)
}

/// Decode a varint from the start of `bytes`
///
/// Returns the value and the number of bytes it occupied.
///
/// - `PartialFrame` if `bytes` ends before the terminating byte
/// - `CorruptFrame` if the varint would need more than 64 bits or its tenth
///   byte still has the continuation bit set
pub fn decode(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let payload = u64::from(byte & PAYLOAD_MASK);
        // Only one payload bit is left for the tenth byte
        if shift == 63 && payload > 1 {
            return Err(BridgeError::CorruptFrame(
                "varint overflows 64 bits".to_string(),
            ));
        }
        value |= payload << shift;

        if byte & CONTINUATION_BIT == 0 {
            return Ok((value, i + 1));
        }

        shift += 7;
        // No valid varint continues past its tenth byte
        if shift >= 64 {
            return Err(BridgeError::CorruptFrame(format!(
                "varint longer than {} bytes",
                MAX_VARINT_LEN
            )));
        }
    }

    Err(BridgeError::PartialFrame {
        available: bytes.len(),
        required: bytes.len() + 1,
    })
}
