use pbf_wire::FieldReader;
use pbf_wire::fields::{encode_bytes_field, encode_packed_sints};

use super::{encode_int_field, encode_keys_vals, extend_sint64, extend_u32};
use crate::error::TypeError;
use crate::osmformat::Info;

/// An ordered-node path record.
///
/// `refs` holds the referenced point ids delta-coded: the absolute id at
/// position `i` is the sum of `refs[0..=i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Way {
    pub id: i64,
    pub keys: Vec<u32>,
    pub vals: Vec<u32>,
    pub info: Option<Info>,
    pub refs: Vec<i64>,
}

impl Way {
    /// # Errors
    ///
    /// [`TypeError::MissingRequiredField`] without `id`;
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut id = None;
        let mut way = Self::default();

        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => id = Some(field.as_i64()?),
                2 => extend_u32(&mut way.keys, &field)?,
                3 => extend_u32(&mut way.vals, &field)?,
                4 => way.info = Some(Info::decode(field.as_bytes()?)?),
                8 => extend_sint64(&mut way.refs, &field)?,
                _ => {}
            }
        }

        way.id = id.ok_or(TypeError::MissingRequiredField {
            message: "Way",
            field: "id",
        })?;
        Ok(way)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_int_field(&mut buf, 1, self.id);
        encode_keys_vals(&mut buf, &self.keys, &self.vals);
        if let Some(info) = &self.info {
            encode_bytes_field(&mut buf, 4, &info.encode());
        }
        if !self.refs.is_empty() {
            encode_packed_sints(&mut buf, 8, &self.refs);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refs_stay_delta_coded() {
        let way = Way {
            id: 42,
            refs: vec![5, -2, 10],
            ..Way::default()
        };
        let decoded = Way::decode(&way.encode()).unwrap();
        assert_eq!(decoded.refs, vec![5, -2, 10]);
    }

    #[test]
    fn split_packed_refs_concatenate() {
        let mut buf = Vec::new();
        encode_int_field(&mut buf, 1, 1);
        encode_packed_sints(&mut buf, 8, &[1, 2]);
        encode_packed_sints(&mut buf, 8, &[3]);
        assert_eq!(Way::decode(&buf).unwrap().refs, vec![1, 2, 3]);
    }
}
