//! Typed views of the `osmformat` messages: the header block and the
//! primitive (entity) block with everything nested inside it.
//!
//! Only decoding matters to the decoder crate; the `encode` methods exist
//! so tests and tools can build payloads without a protobuf toolchain.

mod dense;
mod header_block;
mod node;
mod primitive;
mod relation;
mod way;

pub use dense::{DenseInfo, DenseNodes};
pub use header_block::{HeaderBBox, HeaderBlock};
pub use node::{Info, Node};
pub use primitive::{PrimitiveBlock, PrimitiveGroup, StringTable};
pub use relation::Relation;
pub use way::Way;

use pbf_wire::RawField;
use pbf_wire::fields::{encode_packed_sints, encode_packed_varints, encode_varint_field};

use crate::error::TypeError;

/// Wire form of a signed `int32`/`int64`: negatives are sign-extended to
/// 64 bits before varint encoding.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn int_bits(value: i64) -> u64 {
    value as u64
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn extend_u32(target: &mut Vec<u32>, field: &RawField<'_>) -> Result<(), TypeError> {
    target.extend(field.packed_u64()?.into_iter().map(|v| v as u32));
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn extend_i32(target: &mut Vec<i32>, field: &RawField<'_>) -> Result<(), TypeError> {
    target.extend(field.packed_u64()?.into_iter().map(|v| v as i32));
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn extend_sint32(target: &mut Vec<i32>, field: &RawField<'_>) -> Result<(), TypeError> {
    target.extend(field.packed_sint()?.into_iter().map(|v| v as i32));
    Ok(())
}

pub(crate) fn extend_sint64(target: &mut Vec<i64>, field: &RawField<'_>) -> Result<(), TypeError> {
    target.extend(field.packed_sint()?);
    Ok(())
}

pub(crate) fn encode_u32s(buf: &mut Vec<u8>, number: u32, values: &[u32]) {
    let wide: Vec<u64> = values.iter().copied().map(u64::from).collect();
    encode_packed_varints(buf, number, &wide);
}

pub(crate) fn encode_i32s(buf: &mut Vec<u8>, number: u32, values: &[i32]) {
    let wide: Vec<u64> = values.iter().map(|&v| int_bits(i64::from(v))).collect();
    encode_packed_varints(buf, number, &wide);
}

pub(crate) fn encode_sint32s(buf: &mut Vec<u8>, number: u32, values: &[i32]) {
    let wide: Vec<i64> = values.iter().copied().map(i64::from).collect();
    encode_packed_sints(buf, number, &wide);
}

/// Shared by `Node`, `Way` and `Relation`: parallel key/value string
/// indices, written only when non-empty.
pub(crate) fn encode_keys_vals(buf: &mut Vec<u8>, keys: &[u32], vals: &[u32]) {
    if !keys.is_empty() {
        encode_u32s(buf, 2, keys);
    }
    if !vals.is_empty() {
        encode_u32s(buf, 3, vals);
    }
}

pub(crate) fn encode_int_field(buf: &mut Vec<u8>, number: u32, value: i64) {
    encode_varint_field(buf, number, int_bits(value));
}
