use pbf_wire::FieldReader;
use pbf_wire::fields::{encode_bytes_field, encode_packed_sints, encode_packed_varints};

use super::{encode_i32s, encode_sint32s, extend_i32, extend_sint32, extend_sint64};
use crate::error::TypeError;

/// Column-wise metadata for a dense batch.
///
/// ```text
/// ┌──────────┬───────────────┬───────────┬─────────────────────────┐
/// │ Field    │ Encoding      │ Name      │ Coding                  │
/// ├──────────┼───────────────┼───────────┼─────────────────────────┤
/// │ 1        │ packed int32  │ version   │ absolute                │
/// │ 2        │ packed sint64 │ timestamp │ delta                   │
/// │ 3        │ packed sint64 │ changeset │ delta                   │
/// │ 4        │ packed sint32 │ uid       │ delta                   │
/// │ 5        │ packed sint32 │ user_sid  │ delta                   │
/// │ 6        │ packed bool   │ visible   │ absolute                │
/// └──────────┴───────────────┴───────────┴─────────────────────────┘
/// ```
///
/// Each column is `None` when the field never appeared and `Some` (possibly
/// empty) once it did. The decoder gives the two different meanings, so the
/// distinction must survive parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DenseInfo {
    pub version: Option<Vec<i32>>,
    pub timestamp: Option<Vec<i64>>,
    pub changeset: Option<Vec<i64>>,
    pub uid: Option<Vec<i32>>,
    pub user_sid: Option<Vec<i32>>,
    pub visible: Option<Vec<bool>>,
}

impl DenseInfo {
    /// # Errors
    ///
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut info = Self::default();
        info.merge(buf)?;
        Ok(info)
    }

    /// Parse `buf` on top of `self`, appending to the columns it carries.
    ///
    /// A `dense_info` field may occur more than once in a `DenseNodes`
    /// message; like any embedded protobuf message the occurrences merge.
    ///
    /// # Errors
    ///
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn merge(&mut self, buf: &[u8]) -> Result<(), TypeError> {
        let info = self;
        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => extend_i32(info.version.get_or_insert_with(Vec::new), &field)?,
                2 => extend_sint64(info.timestamp.get_or_insert_with(Vec::new), &field)?,
                3 => extend_sint64(info.changeset.get_or_insert_with(Vec::new), &field)?,
                4 => extend_sint32(info.uid.get_or_insert_with(Vec::new), &field)?,
                5 => extend_sint32(info.user_sid.get_or_insert_with(Vec::new), &field)?,
                6 => info
                    .visible
                    .get_or_insert_with(Vec::new)
                    .extend(field.packed_u64()?.into_iter().map(|v| v != 0)),
                _ => {}
            }
        }
        Ok(())
    }

    /// Columns that are `Some` are written even when empty.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if let Some(version) = &self.version {
            encode_i32s(&mut buf, 1, version);
        }
        if let Some(timestamp) = &self.timestamp {
            encode_packed_sints(&mut buf, 2, timestamp);
        }
        if let Some(changeset) = &self.changeset {
            encode_packed_sints(&mut buf, 3, changeset);
        }
        if let Some(uid) = &self.uid {
            encode_sint32s(&mut buf, 4, uid);
        }
        if let Some(user_sid) = &self.user_sid {
            encode_sint32s(&mut buf, 5, user_sid);
        }
        if let Some(visible) = &self.visible {
            let wide: Vec<u64> = visible.iter().map(|&v| u64::from(v)).collect();
            encode_packed_varints(&mut buf, 6, &wide);
        }
        buf
    }
}

/// A batch of points packed column-wise.
///
/// `id`, `lat` and `lon` are delta-coded across the whole batch.
/// `keys_vals` is one flat array of `(key, value)` string indices with a
/// `0` closing each point's tag list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DenseNodes {
    pub id: Vec<i64>,
    pub dense_info: Option<DenseInfo>,
    pub lat: Vec<i64>,
    pub lon: Vec<i64>,
    pub keys_vals: Vec<i32>,
}

impl DenseNodes {
    /// # Errors
    ///
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut dense = Self::default();
        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => extend_sint64(&mut dense.id, &field)?,
                5 => dense
                    .dense_info
                    .get_or_insert_with(DenseInfo::default)
                    .merge(field.as_bytes()?)?,
                8 => extend_sint64(&mut dense.lat, &field)?,
                9 => extend_sint64(&mut dense.lon, &field)?,
                10 => extend_i32(&mut dense.keys_vals, &field)?,
                _ => {}
            }
        }
        Ok(dense)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_packed_sints(&mut buf, 1, &self.id);
        if let Some(info) = &self.dense_info {
            encode_bytes_field(&mut buf, 5, &info.encode());
        }
        encode_packed_sints(&mut buf, 8, &self.lat);
        encode_packed_sints(&mut buf, 9, &self.lon);
        if !self.keys_vals.is_empty() {
            encode_i32s(&mut buf, 10, &self.keys_vals);
        }
        buf
    }

    /// Number of points in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_columns_differ() {
        let info = DenseInfo {
            version: Some(vec![1, 2]),
            timestamp: Some(vec![10, 5]),
            changeset: Some(vec![]),
            uid: None,
            user_sid: Some(vec![3, -1]),
            visible: None,
        };
        let decoded = DenseInfo::decode(&info.encode()).unwrap();
        assert_eq!(decoded.changeset, Some(vec![]));
        assert_eq!(decoded.uid, None);
        assert_eq!(decoded, info);
    }

    #[test]
    fn repeated_dense_info_merges() {
        let first = DenseInfo {
            version: Some(vec![1]),
            ..DenseInfo::default()
        };
        let second = DenseInfo {
            version: Some(vec![2]),
            uid: Some(vec![4]),
            ..DenseInfo::default()
        };
        let mut buf = Vec::new();
        encode_packed_sints(&mut buf, 1, &[7, 1]);
        encode_bytes_field(&mut buf, 5, &first.encode());
        encode_bytes_field(&mut buf, 5, &second.encode());

        let info = DenseNodes::decode(&buf).unwrap().dense_info.unwrap();
        assert_eq!(info.version, Some(vec![1, 2]));
        assert_eq!(info.uid, Some(vec![4]));
        assert_eq!(info.timestamp, None);
    }

    #[test]
    fn dense_nodes_roundtrip() {
        let dense = DenseNodes {
            id: vec![10, 1, 1],
            dense_info: None,
            lat: vec![100, -5, 0],
            lon: vec![-100, 5, 0],
            keys_vals: vec![1, 2, 0, 0, 3, 4, 5, 6, 0],
        };
        let decoded = DenseNodes::decode(&dense.encode()).unwrap();
        assert_eq!(decoded, dense);
        assert_eq!(decoded.len(), 3);
    }
}
