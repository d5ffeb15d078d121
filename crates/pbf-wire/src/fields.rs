use crate::error::WireError;
use crate::varint::{decode_varint, decode_zigzag, encode_varint, encode_zigzag};

/// Protobuf wire types accepted inside a message body.
///
/// Every field is a key varint followed by a payload whose shape the low
/// three bits of the key select:
///
/// ```text
/// ┌──────┬──────────┬────────────────────────────────┐
/// │ Wire │ Type     │ Payload format                 │
/// ├──────┼──────────┼────────────────────────────────┤
/// │ 0    │ Varint   │ Single varint value            │
/// │ 1    │ Fixed64  │ 8 little-endian bytes          │
/// │ 2    │ Len      │ Varint length + raw bytes      │
/// │ 5    │ Fixed32  │ 4 little-endian bytes          │
/// └──────┴──────────┴────────────────────────────────┘
/// ```
///
/// `Len` carries strings, bytes, nested messages and packed repeated
/// scalars alike; the schema decides which.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    Len = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Convert the low three bits of a field key to a [`WireType`].
    ///
    /// # Errors
    ///
    /// [`WireError::UnknownWireType`] for group markers (3, 4) and the
    /// unassigned values 6 and 7.
    pub fn from_raw(value: u64) -> Result<Self, WireError> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::Len),
            5 => Ok(Self::Fixed32),
            other => Err(WireError::UnknownWireType { value: other }),
        }
    }
}

// ── Encoding helpers ──────────────────────────────────────────────────
//
// These append one field to a `Vec<u8>`. Message types call them from
// their `encode` methods; the key is always `(number << 3) | wire_type`.

/// Append a varint scratch-encode into `buf`.
pub fn push_varint(buf: &mut Vec<u8>, value: u64) {
    let mut scratch = [0u8; crate::varint::MAX_VARINT_BYTES];
    let n = encode_varint(value, &mut scratch);
    buf.extend_from_slice(&scratch[..n]);
}

fn push_key(buf: &mut Vec<u8>, number: u32, wire_type: WireType) {
    push_varint(buf, (u64::from(number) << 3) | wire_type as u64);
}

/// Encode a plain varint field (`uint32`, `uint64`, `int32`, `int64`,
/// `bool`, enums). Negative `int*` values are passed sign-extended.
pub fn encode_varint_field(buf: &mut Vec<u8>, number: u32, value: u64) {
    push_key(buf, number, WireType::Varint);
    push_varint(buf, value);
}

/// Encode a zigzag varint field (`sint32`, `sint64`).
pub fn encode_sint_field(buf: &mut Vec<u8>, number: u32, value: i64) {
    encode_varint_field(buf, number, encode_zigzag(value));
}

/// Encode a length-delimited field (strings, bytes, nested messages).
///
/// Wire layout:
/// ```text
///   key (varint) │ length (varint) │ data [length]
/// ```
pub fn encode_bytes_field(buf: &mut Vec<u8>, number: u32, data: &[u8]) {
    push_key(buf, number, WireType::Len);
    push_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

/// Encode a packed repeated varint field. Empty slices are written as a
/// zero-length field so the presence of the column survives the trip.
pub fn encode_packed_varints(buf: &mut Vec<u8>, number: u32, values: &[u64]) {
    let mut packed = Vec::with_capacity(values.len());
    for &value in values {
        push_varint(&mut packed, value);
    }
    encode_bytes_field(buf, number, &packed);
}

/// Encode a packed repeated zigzag field.
pub fn encode_packed_sints(buf: &mut Vec<u8>, number: u32, values: &[i64]) {
    let mut packed = Vec::with_capacity(values.len());
    for &value in values {
        push_varint(&mut packed, encode_zigzag(value));
    }
    encode_bytes_field(buf, number, &packed);
}

// ── Decoding helpers ──────────────────────────────────────────────────

/// A decoded field key: the field number and its wire type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldHeader {
    pub number: u32,
    pub wire_type: WireType,
}

/// Decode a field key from the body.
///
/// Returns `(header, bytes_consumed)`.
///
/// # Errors
///
/// Propagates varint errors and rejects unknown wire types.
pub fn decode_field_header(buf: &[u8]) -> Result<(FieldHeader, usize), WireError> {
    let (key, n) = decode_varint(buf)?;
    let wire_type = WireType::from_raw(key & 0x7)?;
    #[allow(clippy::cast_possible_truncation)]
    let number = (key >> 3) as u32;
    Ok((FieldHeader { number, wire_type }, n))
}

/// Read a length-prefixed payload. Returns `(data, bytes_consumed)`
/// where `bytes_consumed` includes the length prefix.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] when the declared length runs past the
/// end of `buf`.
pub fn decode_bytes_value(buf: &[u8]) -> Result<(&[u8], usize), WireError> {
    let (len, n) = decode_varint(buf)?;
    let end = usize::try_from(len)
        .ok()
        .and_then(|len| n.checked_add(len))
        .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;
    let data = buf
        .get(n..end)
        .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;
    Ok((data, end))
}

/// Skip a field's payload based on its wire type, returning the number
/// of bytes consumed.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] when the payload is truncated.
pub fn skip_field(buf: &[u8], wire_type: WireType) -> Result<usize, WireError> {
    let fixed = |width: usize| {
        if buf.len() < width {
            Err(WireError::UnexpectedEof { offset: buf.len() })
        } else {
            Ok(width)
        }
    };
    match wire_type {
        WireType::Varint => decode_varint(buf).map(|(_, n)| n),
        WireType::Fixed64 => fixed(8),
        WireType::Fixed32 => fixed(4),
        WireType::Len => decode_bytes_value(buf).map(|(_, n)| n),
    }
}

/// Decode every varint in a packed payload.
///
/// # Errors
///
/// Fails if the payload ends in the middle of a varint.
pub fn decode_packed_varints(mut data: &[u8]) -> Result<Vec<u64>, WireError> {
    let mut values = Vec::with_capacity(data.len());
    while !data.is_empty() {
        let (value, n) = decode_varint(data)?;
        values.push(value);
        data = &data[n..];
    }
    Ok(values)
}

/// Decode every zigzag varint in a packed payload.
///
/// # Errors
///
/// Fails if the payload ends in the middle of a varint.
pub fn decode_packed_sints(data: &[u8]) -> Result<Vec<i64>, WireError> {
    Ok(decode_packed_varints(data)?
        .into_iter()
        .map(decode_zigzag)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::decode_varint;

    #[test]
    fn varint_field_key_layout() {
        let mut buf = Vec::new();
        encode_varint_field(&mut buf, 1, 150);
        // The canonical protobuf example: field 1, value 150.
        assert_eq!(buf, vec![0x08, 0x96, 0x01]);

        let (header, n) = decode_field_header(&buf).unwrap();
        assert_eq!(header.number, 1);
        assert_eq!(header.wire_type, WireType::Varint);
        assert_eq!(decode_varint(&buf[n..]).unwrap().0, 150);
    }

    #[test]
    fn large_field_numbers_use_multibyte_keys() {
        let mut buf = Vec::new();
        encode_varint_field(&mut buf, 34, 1);
        let (header, n) = decode_field_header(&buf).unwrap();
        assert_eq!(header.number, 34);
        assert_eq!(n, 2);
    }

    #[test]
    fn bytes_field_payload() {
        let mut buf = Vec::new();
        encode_bytes_field(&mut buf, 2, b"testing");
        let (header, n) = decode_field_header(&buf).unwrap();
        assert_eq!(header.wire_type, WireType::Len);
        let (data, consumed) = decode_bytes_value(&buf[n..]).unwrap();
        assert_eq!(data, b"testing");
        assert_eq!(n + consumed, buf.len());
    }

    #[test]
    fn truncated_bytes_payload() {
        let mut buf = Vec::new();
        encode_bytes_field(&mut buf, 2, b"hello");
        buf.truncate(buf.len() - 2);
        let (_, n) = decode_field_header(&buf).unwrap();
        assert!(matches!(
            decode_bytes_value(&buf[n..]),
            Err(WireError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn packed_sints_preserve_sign() {
        let mut buf = Vec::new();
        encode_packed_sints(&mut buf, 8, &[5, -2, 10]);
        let (_, n) = decode_field_header(&buf).unwrap();
        let (data, _) = decode_bytes_value(&buf[n..]).unwrap();
        assert_eq!(decode_packed_sints(data).unwrap(), vec![5, -2, 10]);
    }

    #[test]
    fn empty_packed_field_is_still_written() {
        let mut buf = Vec::new();
        encode_packed_varints(&mut buf, 4, &[]);
        assert_eq!(buf, vec![(4 << 3) | 2, 0]);
    }

    #[test]
    fn skip_fixed_width_fields() {
        assert_eq!(skip_field(&[0; 8], WireType::Fixed64).unwrap(), 8);
        assert_eq!(skip_field(&[0; 4], WireType::Fixed32).unwrap(), 4);
        assert!(matches!(
            skip_field(&[0; 3], WireType::Fixed32),
            Err(WireError::UnexpectedEof { offset: 3 })
        ));
    }

    #[test]
    fn group_wire_types_rejected() {
        // field 1, wire type 3 (start group)
        assert!(matches!(
            decode_field_header(&[0x0B]),
            Err(WireError::UnknownWireType { value: 3 })
        ));
    }

    #[test]
    fn packed_truncated_varint() {
        assert!(matches!(
            decode_packed_varints(&[0x01, 0x80]),
            Err(WireError::UnexpectedEof { .. })
        ));
    }
}
