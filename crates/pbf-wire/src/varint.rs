//! Base-128 varints and zigzag mapping, as used by every protobuf
//! integer field in a PBF file.
//!
//! ```text
//!   value 150  →  1001 0110  0000 0001
//!                 └ more ┘   └ last ┘
//!   low seven bits first; the high bit of each byte says "more follow"
//! ```

use crate::error::WireError;

/// Longest encoding of a 64-bit value: ⌈64 / 7⌉.
pub const MAX_VARINT_BYTES: usize = 10;

/// Write `value` into the front of `buf`, returning the encoded length.
///
/// # Panics
///
/// If `buf` is too short for the encoding. [`MAX_VARINT_BYTES`] always
/// suffices.
pub fn encode_varint(value: u64, buf: &mut [u8]) -> usize {
    let mut rest = value;
    let mut len = 0;
    while rest >= 0x80 {
        buf[len] = (rest as u8) | 0x80;
        rest >>= 7;
        len += 1;
    }
    buf[len] = rest as u8;
    len + 1
}

/// Read one varint from the front of `buf`.
///
/// Returns the value and the number of bytes it occupied; anything after
/// the terminating byte is left alone.
///
/// # Errors
///
/// - [`WireError::VarintTooLong`] when ten bytes pass without a
///   terminator.
/// - [`WireError::UnexpectedEof`] when `buf` ends first.
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize), WireError> {
    let mut value = 0u64;
    for (i, &byte) in buf.iter().take(MAX_VARINT_BYTES).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte < 0x80 {
            return Ok((value, i + 1));
        }
    }
    if buf.len() >= MAX_VARINT_BYTES {
        Err(WireError::VarintTooLong)
    } else {
        Err(WireError::UnexpectedEof { offset: buf.len() })
    }
}

/// `sint32`/`sint64` mapping: small magnitudes of either sign stay short.
///
/// ```text
///   0 → 0   -1 → 1   1 → 2   -2 → 3   2 → 4
/// ```
#[must_use]
pub fn encode_zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[must_use]
pub fn decode_zigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
