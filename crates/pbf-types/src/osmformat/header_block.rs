use pbf_wire::FieldReader;
use pbf_wire::fields::{encode_bytes_field, encode_sint_field};

use super::encode_int_field;
use crate::error::TypeError;

/// Bounding box of the file contents, in nanodegrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderBBox {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
}

impl HeaderBBox {
    /// # Errors
    ///
    /// [`TypeError::MissingRequiredField`] if any edge is missing.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut edges = [None; 4];
        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            if let n @ 1..=4 = field.number {
                edges[n as usize - 1] = Some(field.as_sint()?);
            }
        }

        let edge = |i: usize, field: &'static str| {
            edges[i].ok_or(TypeError::MissingRequiredField {
                message: "HeaderBBox",
                field,
            })
        };
        Ok(Self {
            left: edge(0, "left")?,
            right: edge(1, "right")?,
            top: edge(2, "top")?,
            bottom: edge(3, "bottom")?,
        })
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_sint_field(&mut buf, 1, self.left);
        encode_sint_field(&mut buf, 2, self.right);
        encode_sint_field(&mut buf, 3, self.top);
        encode_sint_field(&mut buf, 4, self.bottom);
        buf
    }
}

/// Decompressed body of the header block.
///
/// ```text
/// ┌──────────┬───────────┬─────────────────────────────┐
/// │ Field    │ Wire Type │ Name                        │
/// ├──────────┼───────────┼─────────────────────────────┤
/// │ 1        │ Len       │ bbox                        │
/// │ 4        │ Len       │ required_features           │
/// │ 5        │ Len       │ optional_features           │
/// │ 16       │ Len       │ writingprogram              │
/// │ 17       │ Len       │ source                      │
/// │ 32       │ Varint    │ replication timestamp       │
/// │ 33       │ Varint    │ replication sequence number │
/// │ 34       │ Len       │ replication base url        │
/// └──────────┴───────────┴─────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    pub bbox: Option<HeaderBBox>,
    pub required_features: Vec<String>,
    pub optional_features: Vec<String>,
    pub writing_program: Option<String>,
    pub source: Option<String>,
    pub replication_timestamp: Option<i64>,
    pub replication_sequence_number: Option<i64>,
    pub replication_base_url: Option<String>,
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl HeaderBlock {
    /// # Errors
    ///
    /// Propagates wire errors and an incomplete bounding box.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut header = Self::default();
        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => header.bbox = Some(HeaderBBox::decode(field.as_bytes()?)?),
                4 => header.required_features.push(text(field.as_bytes()?)),
                5 => header.optional_features.push(text(field.as_bytes()?)),
                16 => header.writing_program = Some(text(field.as_bytes()?)),
                17 => header.source = Some(text(field.as_bytes()?)),
                32 => header.replication_timestamp = Some(field.as_i64()?),
                33 => header.replication_sequence_number = Some(field.as_i64()?),
                34 => header.replication_base_url = Some(text(field.as_bytes()?)),
                _ => {}
            }
        }
        Ok(header)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if let Some(bbox) = &self.bbox {
            encode_bytes_field(&mut buf, 1, &bbox.encode());
        }
        for feature in &self.required_features {
            encode_bytes_field(&mut buf, 4, feature.as_bytes());
        }
        for feature in &self.optional_features {
            encode_bytes_field(&mut buf, 5, feature.as_bytes());
        }
        if let Some(program) = &self.writing_program {
            encode_bytes_field(&mut buf, 16, program.as_bytes());
        }
        if let Some(source) = &self.source {
            encode_bytes_field(&mut buf, 17, source.as_bytes());
        }
        if let Some(ts) = self.replication_timestamp {
            encode_int_field(&mut buf, 32, ts);
        }
        if let Some(seq) = self.replication_sequence_number {
            encode_int_field(&mut buf, 33, seq);
        }
        if let Some(url) = &self.replication_base_url {
            encode_bytes_field(&mut buf, 34, url.as_bytes());
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = HeaderBlock {
            bbox: Some(HeaderBBox {
                left: -180_000_000_000,
                right: 180_000_000_000,
                top: 90_000_000_000,
                bottom: -90_000_000_000,
            }),
            required_features: vec!["OsmSchema-V0.6".into(), "DenseNodes".into()],
            optional_features: vec!["Sort.Type_then_ID".into()],
            writing_program: Some("osmium/1.14".into()),
            source: None,
            replication_timestamp: Some(1_700_000_000),
            replication_sequence_number: Some(4211),
            replication_base_url: None,
        };
        assert_eq!(HeaderBlock::decode(&header.encode()).unwrap(), header);
    }

    #[test]
    fn bbox_requires_all_edges() {
        let mut buf = Vec::new();
        encode_sint_field(&mut buf, 1, 1);
        encode_sint_field(&mut buf, 2, 2);
        encode_sint_field(&mut buf, 4, 4);
        assert!(matches!(
            HeaderBBox::decode(&buf),
            Err(TypeError::MissingRequiredField { field: "top", .. })
        ));
    }
}
