use crate::error::WireError;
use crate::fields::{WireType, decode_bytes_value, decode_field_header, decode_packed_varints};
use crate::varint::{decode_varint, decode_zigzag};

/// A raw field before schema-specific interpretation.
///
/// Produced by [`FieldReader::next_field`]. `data` holds:
///
///   - `Varint`: the varint bytes themselves.
///   - `Fixed64` / `Fixed32`: the 8 or 4 little-endian bytes.
///   - `Len`: the payload after the length prefix.
///
/// The typed accessors check the wire type against what the caller
/// expects and report [`WireError::WireTypeMismatch`] otherwise.
#[derive(Clone, Copy, Debug)]
pub struct RawField<'a> {
    pub number: u32,
    pub wire_type: WireType,
    pub data: &'a [u8],
}

impl<'a> RawField<'a> {
    fn expect(&self, expected: WireType) -> Result<(), WireError> {
        if self.wire_type == expected {
            Ok(())
        } else {
            Err(WireError::WireTypeMismatch {
                number: self.number,
                expected,
                found: self.wire_type,
            })
        }
    }

    /// Value of a `uint32`/`uint64`/enum field.
    ///
    /// # Errors
    ///
    /// Fails unless the field is a varint.
    pub fn as_u64(&self) -> Result<u64, WireError> {
        self.expect(WireType::Varint)?;
        Ok(decode_varint(self.data)?.0)
    }

    /// Value of an `int64` field (two's complement in 64 bits).
    ///
    /// # Errors
    ///
    /// Fails unless the field is a varint.
    #[allow(clippy::cast_possible_wrap)]
    pub fn as_i64(&self) -> Result<i64, WireError> {
        Ok(self.as_u64()? as i64)
    }

    /// Value of an `int32` field. Protobuf truncates to the low 32 bits.
    ///
    /// # Errors
    ///
    /// Fails unless the field is a varint.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i32(&self) -> Result<i32, WireError> {
        Ok(self.as_i64()? as i32)
    }

    /// Value of a `uint32` field, truncated to the low 32 bits.
    ///
    /// # Errors
    ///
    /// Fails unless the field is a varint.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_u32(&self) -> Result<u32, WireError> {
        Ok(self.as_u64()? as u32)
    }

    /// Value of a `sint32`/`sint64` field.
    ///
    /// # Errors
    ///
    /// Fails unless the field is a varint.
    pub fn as_sint(&self) -> Result<i64, WireError> {
        Ok(decode_zigzag(self.as_u64()?))
    }

    /// Value of a `bool` field; any non-zero varint is true.
    ///
    /// # Errors
    ///
    /// Fails unless the field is a varint.
    pub fn as_bool(&self) -> Result<bool, WireError> {
        Ok(self.as_u64()? != 0)
    }

    /// Payload of a `bytes`, `string` or embedded message field.
    ///
    /// # Errors
    ///
    /// Fails unless the field is length-delimited.
    pub fn as_bytes(&self) -> Result<&'a [u8], WireError> {
        self.expect(WireType::Len)?;
        Ok(self.data)
    }

    /// All values of a repeated varint field occurrence.
    ///
    /// Accepts both encodings protobuf allows for repeated scalars: a
    /// packed `Len` payload, or a single unpacked varint.
    ///
    /// # Errors
    ///
    /// Fails for fixed-width wire types or truncated payloads.
    pub fn packed_u64(&self) -> Result<Vec<u64>, WireError> {
        match self.wire_type {
            WireType::Len => decode_packed_varints(self.data),
            _ => Ok(vec![self.as_u64()?]),
        }
    }

    /// Like [`packed_u64`](Self::packed_u64) for zigzag-encoded values.
    ///
    /// # Errors
    ///
    /// Fails for fixed-width wire types or truncated payloads.
    pub fn packed_sint(&self) -> Result<Vec<i64>, WireError> {
        Ok(self.packed_u64()?.into_iter().map(decode_zigzag).collect())
    }
}

/// Cursor-based field reader over one message body.
///
/// ```text
///   let mut reader = FieldReader::new(body);
///   while let Some(field) = reader.next_field()? {
///       match field.number {
///           1 => { /* handle field 1 */ }
///           _ => { /* unknown: already skipped */ }
///       }
///   }
/// ```
///
/// The reader consumes the whole field (key and payload) on every call,
/// so ignoring a field is the same as skipping it.
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Read the next field, or `Ok(None)` once the body is exhausted.
    ///
    /// # Errors
    ///
    /// Fails on a malformed key or truncated payload. Offsets in the
    /// returned error are relative to the start of the body.
    pub fn next_field(&mut self) -> Result<Option<RawField<'a>>, WireError> {
        let buf: &'a [u8] = self.buf;
        let remaining = &buf[self.pos..];
        if remaining.is_empty() {
            return Ok(None);
        }

        let (header, key_len) = decode_field_header(remaining).map_err(|e| self.rebase(e))?;
        let payload_buf = &remaining[key_len..];

        let (data, payload_consumed) = match header.wire_type {
            WireType::Varint => {
                let (_, n) = decode_varint(payload_buf).map_err(|e| self.rebase(e))?;
                (&payload_buf[..n], n)
            }
            WireType::Fixed64 | WireType::Fixed32 => {
                let width = if header.wire_type == WireType::Fixed64 { 8 } else { 4 };
                let data = payload_buf.get(..width).ok_or(WireError::UnexpectedEof {
                    offset: self.buf.len(),
                })?;
                (data, width)
            }
            WireType::Len => decode_bytes_value(payload_buf).map_err(|e| self.rebase(e))?,
        };

        self.pos += key_len + payload_consumed;

        Ok(Some(RawField {
            number: header.number,
            wire_type: header.wire_type,
            data,
        }))
    }

    /// Return the number of bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn rebase(&self, err: WireError) -> WireError {
        match err {
            WireError::UnexpectedEof { .. } => WireError::UnexpectedEof {
                offset: self.buf.len(),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{encode_bytes_field, encode_packed_varints, encode_sint_field, encode_varint_field};

    #[test]
    fn empty_buffer_returns_none() {
        let mut reader = FieldReader::new(&[]);
        assert!(reader.next_field().unwrap().is_none());
    }

    #[test]
    fn reads_fields_sequentially() {
        let mut buf = Vec::new();
        encode_varint_field(&mut buf, 1, 7);
        encode_bytes_field(&mut buf, 2, b"world");
        encode_sint_field(&mut buf, 3, -42);

        let mut reader = FieldReader::new(&buf);

        let f1 = reader.next_field().unwrap().unwrap();
        assert_eq!(f1.number, 1);
        assert_eq!(f1.as_u64().unwrap(), 7);

        let f2 = reader.next_field().unwrap().unwrap();
        assert_eq!(f2.as_bytes().unwrap(), b"world");

        let f3 = reader.next_field().unwrap().unwrap();
        assert_eq!(f3.as_sint().unwrap(), -42);

        assert!(reader.next_field().unwrap().is_none());
        assert_eq!(reader.position(), buf.len());
    }

    #[test]
    fn negative_int32_is_sign_extended() {
        let mut buf = Vec::new();
        encode_varint_field(&mut buf, 1, -1i64 as u64);
        let mut reader = FieldReader::new(&buf);
        let field = reader.next_field().unwrap().unwrap();
        assert_eq!(field.as_i32().unwrap(), -1);
    }

    #[test]
    fn unpacked_repeated_scalar_accepted() {
        let mut buf = Vec::new();
        encode_varint_field(&mut buf, 2, 9);
        let mut reader = FieldReader::new(&buf);
        let field = reader.next_field().unwrap().unwrap();
        assert_eq!(field.packed_u64().unwrap(), vec![9]);
    }

    #[test]
    fn packed_repeated_scalar() {
        let mut buf = Vec::new();
        encode_packed_varints(&mut buf, 2, &[1, 300, 0]);
        let mut reader = FieldReader::new(&buf);
        let field = reader.next_field().unwrap().unwrap();
        assert_eq!(field.packed_u64().unwrap(), vec![1, 300, 0]);
    }

    #[test]
    fn wire_type_mismatch_reported() {
        let mut buf = Vec::new();
        encode_bytes_field(&mut buf, 4, b"x");
        let mut reader = FieldReader::new(&buf);
        let field = reader.next_field().unwrap().unwrap();
        assert!(matches!(
            field.as_u64(),
            Err(WireError::WireTypeMismatch { number: 4, .. })
        ));
    }

    #[test]
    fn truncated_fixed_field() {
        // field 1, wire type 1 (fixed64), only 3 payload bytes
        let buf = [0x09, 0x00, 0x00, 0x00];
        let mut reader = FieldReader::new(&buf);
        assert!(matches!(
            reader.next_field(),
            Err(WireError::UnexpectedEof { offset: 4 })
        ));
    }
}
