use pbf_wire::FieldReader;
use pbf_wire::fields::{encode_bytes_field, encode_packed_sints};

use super::{encode_i32s, encode_int_field, encode_keys_vals, extend_i32, extend_sint64, extend_u32};
use crate::error::TypeError;
use crate::osmformat::Info;

/// A tagged group-of-members record.
///
/// `roles_sid`, `memids` and `types` are parallel: member `i` has role
/// string `roles_sid[i]`, delta-coded id `memids[i]` and type code
/// `types[i]` (0 = point, 1 = path, 2 = group).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relation {
    pub id: i64,
    pub keys: Vec<u32>,
    pub vals: Vec<u32>,
    pub info: Option<Info>,
    pub roles_sid: Vec<i32>,
    pub memids: Vec<i64>,
    pub types: Vec<i32>,
}

impl Relation {
    /// # Errors
    ///
    /// [`TypeError::MissingRequiredField`] without `id`;
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut id = None;
        let mut relation = Self::default();

        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => id = Some(field.as_i64()?),
                2 => extend_u32(&mut relation.keys, &field)?,
                3 => extend_u32(&mut relation.vals, &field)?,
                4 => relation.info = Some(Info::decode(field.as_bytes()?)?),
                8 => extend_i32(&mut relation.roles_sid, &field)?,
                9 => extend_sint64(&mut relation.memids, &field)?,
                10 => extend_i32(&mut relation.types, &field)?,
                _ => {}
            }
        }

        relation.id = id.ok_or(TypeError::MissingRequiredField {
            message: "Relation",
            field: "id",
        })?;
        Ok(relation)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_int_field(&mut buf, 1, self.id);
        encode_keys_vals(&mut buf, &self.keys, &self.vals);
        if let Some(info) = &self.info {
            encode_bytes_field(&mut buf, 4, &info.encode());
        }
        if !self.roles_sid.is_empty() {
            encode_i32s(&mut buf, 8, &self.roles_sid);
        }
        if !self.memids.is_empty() {
            encode_packed_sints(&mut buf, 9, &self.memids);
        }
        if !self.types.is_empty() {
            encode_i32s(&mut buf, 10, &self.types);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_member_columns_roundtrip() {
        let relation = Relation {
            id: 9,
            keys: vec![1],
            vals: vec![2],
            info: None,
            roles_sid: vec![3, 4, 3],
            memids: vec![100, -50, 7],
            types: vec![0, 1, 7],
        };
        assert_eq!(Relation::decode(&relation.encode()).unwrap(), relation);
    }

    #[test]
    fn missing_id_rejected() {
        assert!(matches!(
            Relation::decode(&[]),
            Err(TypeError::MissingRequiredField { message: "Relation", .. })
        ));
    }
}
