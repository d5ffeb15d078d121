use pbf_wire::FieldReader;
use pbf_wire::fields::{encode_bytes_field, encode_sint_field, encode_varint_field};

use super::{encode_int_field, encode_keys_vals, extend_u32};
use crate::error::TypeError;

/// Optional per-entity metadata as carried by individual records.
///
/// ```text
/// ┌──────────┬───────────┬───────────┬──────────────────────────────┐
/// │ Field    │ Wire Type │ Name      │ Description                  │
/// ├──────────┼───────────┼───────────┼──────────────────────────────┤
/// │ 1        │ Varint    │ version   │ int32, schema default -1     │
/// │ 2        │ Varint    │ timestamp │ int64, in date_granularity   │
/// │ 3        │ Varint    │ changeset │ int64                        │
/// │ 4        │ Varint    │ uid       │ int32                        │
/// │ 5        │ Varint    │ user_sid  │ uint32 string table index    │
/// │ 6        │ Varint    │ visible   │ bool, historical files only  │
/// └──────────┴───────────┴───────────┴──────────────────────────────┘
/// ```
///
/// Every field keeps its presence: the decoder distinguishes a missing
/// timestamp from a zero one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Info {
    pub version: Option<i32>,
    pub timestamp: Option<i64>,
    pub changeset: Option<i64>,
    pub uid: Option<i32>,
    pub user_sid: Option<u32>,
    pub visible: Option<bool>,
}

impl Info {
    /// # Errors
    ///
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut info = Self::default();
        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => info.version = Some(field.as_i32()?),
                2 => info.timestamp = Some(field.as_i64()?),
                3 => info.changeset = Some(field.as_i64()?),
                4 => info.uid = Some(field.as_i32()?),
                5 => info.user_sid = Some(field.as_u32()?),
                6 => info.visible = Some(field.as_bool()?),
                _ => {}
            }
        }
        Ok(info)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if let Some(version) = self.version {
            encode_int_field(&mut buf, 1, i64::from(version));
        }
        if let Some(timestamp) = self.timestamp {
            encode_int_field(&mut buf, 2, timestamp);
        }
        if let Some(changeset) = self.changeset {
            encode_int_field(&mut buf, 3, changeset);
        }
        if let Some(uid) = self.uid {
            encode_int_field(&mut buf, 4, i64::from(uid));
        }
        if let Some(user_sid) = self.user_sid {
            encode_varint_field(&mut buf, 5, u64::from(user_sid));
        }
        if let Some(visible) = self.visible {
            encode_varint_field(&mut buf, 6, u64::from(visible));
        }
        buf
    }
}

/// A single, non-batched point record.
///
/// `lat`/`lon` are raw coordinate units; scaling by the block's
/// granularity and offsets happens in the decoder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    pub id: i64,
    pub keys: Vec<u32>,
    pub vals: Vec<u32>,
    pub info: Option<Info>,
    pub lat: i64,
    pub lon: i64,
}

impl Node {
    /// # Errors
    ///
    /// [`TypeError::MissingRequiredField`] without `id`, `lat` or `lon`;
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut id = None;
        let mut lat = None;
        let mut lon = None;
        let mut node = Self::default();

        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => id = Some(field.as_sint()?),
                2 => extend_u32(&mut node.keys, &field)?,
                3 => extend_u32(&mut node.vals, &field)?,
                4 => node.info = Some(Info::decode(field.as_bytes()?)?),
                8 => lat = Some(field.as_sint()?),
                9 => lon = Some(field.as_sint()?),
                _ => {}
            }
        }

        let missing = |field: &'static str| TypeError::MissingRequiredField {
            message: "Node",
            field,
        };
        node.id = id.ok_or_else(|| missing("id"))?;
        node.lat = lat.ok_or_else(|| missing("lat"))?;
        node.lon = lon.ok_or_else(|| missing("lon"))?;
        Ok(node)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_sint_field(&mut buf, 1, self.id);
        encode_keys_vals(&mut buf, &self.keys, &self.vals);
        if let Some(info) = &self.info {
            encode_bytes_field(&mut buf, 4, &info.encode());
        }
        encode_sint_field(&mut buf, 8, self.lat);
        encode_sint_field(&mut buf, 9, self.lon);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_keeps_presence() {
        let info = Info {
            version: Some(3),
            timestamp: None,
            changeset: Some(0),
            uid: Some(-1),
            user_sid: Some(4),
            visible: None,
        };
        let decoded = Info::decode(&info.encode()).unwrap();
        assert_eq!(decoded, info);
        assert!(decoded.timestamp.is_none());
        assert_eq!(decoded.changeset, Some(0));
    }

    #[test]
    fn node_roundtrip_with_negative_coordinates() {
        let node = Node {
            id: -17,
            keys: vec![1, 3],
            vals: vec![2, 4],
            info: Some(Info {
                version: Some(1),
                ..Info::default()
            }),
            lat: -123_450_000,
            lon: i64::from(i32::MAX),
        };
        assert_eq!(Node::decode(&node.encode()).unwrap(), node);
    }

    #[test]
    fn node_requires_coordinates() {
        let mut buf = Vec::new();
        encode_sint_field(&mut buf, 1, 5);
        encode_sint_field(&mut buf, 8, 10);
        assert!(matches!(
            Node::decode(&buf),
            Err(TypeError::MissingRequiredField { message: "Node", field: "lon" })
        ));
    }
}
