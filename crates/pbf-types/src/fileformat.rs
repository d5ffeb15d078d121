use pbf_wire::FieldReader;
use pbf_wire::fields::{encode_bytes_field, encode_varint_field};

use crate::error::TypeError;

/// Block kind string of the single header block that opens a file.
pub const KIND_HEADER: &str = "OSMHeader";

/// Block kind string of every entity-carrying block.
pub const KIND_DATA: &str = "OSMData";

/// Frame header: describes the payload that follows it on the stream.
///
/// ```text
/// ┌──────────┬───────────┬────────────┬────────────────────────────┐
/// │ Field    │ Wire Type │ Name       │ Description                │
/// ├──────────┼───────────┼────────────┼────────────────────────────┤
/// │ 1        │ Len       │ kind       │ "OSMHeader" / "OSMData"    │
/// │ 2        │ Len       │ index_data │ Opaque, ignored            │
/// │ 3        │ Varint    │ data_size  │ Payload length in bytes    │
/// └──────────┴───────────┴────────────┴────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobHeader {
    pub kind: String,
    pub index_data: Option<Vec<u8>>,
    pub data_size: u32,
}

impl BlobHeader {
    /// # Errors
    ///
    /// [`TypeError::MissingRequiredField`] without `kind` or `data_size`,
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut kind = None;
        let mut index_data = None;
        let mut data_size = None;

        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => kind = Some(String::from_utf8_lossy(field.as_bytes()?).into_owned()),
                2 => index_data = Some(field.as_bytes()?.to_vec()),
                3 => data_size = Some(field.as_u32()?),
                _ => {}
            }
        }

        Ok(Self {
            kind: kind.ok_or(TypeError::MissingRequiredField {
                message: "BlobHeader",
                field: "type",
            })?,
            index_data,
            data_size: data_size.ok_or(TypeError::MissingRequiredField {
                message: "BlobHeader",
                field: "datasize",
            })?,
        })
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_bytes_field(&mut buf, 1, self.kind.as_bytes());
        if let Some(index) = &self.index_data {
            encode_bytes_field(&mut buf, 2, index);
        }
        encode_varint_field(&mut buf, 3, u64::from(self.data_size));
        buf
    }
}

/// The payload variant carried by a [`Blob`].
///
/// Protobuf `oneof`: when an encoder writes several, the last one on the
/// wire wins. `Missing` is what a blob with none of them decodes to; the
/// decompressor turns it into a format error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlobData {
    Raw(Vec<u8>),
    Zlib(Vec<u8>),
    Lzma(Vec<u8>),
    /// Field 5 is marked obsolete in the schema; kept so it can be named in
    /// an error rather than silently ignored.
    Bzip2(Vec<u8>),
    Lz4(Vec<u8>),
    Zstd(Vec<u8>),
    Missing,
}

impl BlobData {
    /// Short name of the variant, for logs and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw(_) => "raw",
            Self::Zlib(_) => "zlib",
            Self::Lzma(_) => "lzma",
            Self::Bzip2(_) => "bzip2",
            Self::Lz4(_) => "lz4",
            Self::Zstd(_) => "zstd",
            Self::Missing => "none",
        }
    }
}

/// Payload descriptor — one compressed (or raw) message body.
///
/// ```text
/// ┌──────────┬───────────┬──────────────────────────────────────┐
/// │ Field    │ Wire Type │ Name                                 │
/// ├──────────┼───────────┼──────────────────────────────────────┤
/// │ 1        │ Len       │ raw                                  │
/// │ 2        │ Varint    │ raw_size (decompressed length)       │
/// │ 3        │ Len       │ zlib_data                            │
/// │ 4        │ Len       │ lzma_data                            │
/// │ 5        │ Len       │ OBSOLETE_bzip2_data                  │
/// │ 6        │ Len       │ lz4_data                             │
/// │ 7        │ Len       │ zstd_data                            │
/// └──────────┴───────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub raw_size: Option<u32>,
    pub data: BlobData,
}

impl Blob {
    /// # Errors
    ///
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut raw_size = None;
        let mut data = BlobData::Missing;

        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => data = BlobData::Raw(field.as_bytes()?.to_vec()),
                2 => raw_size = Some(field.as_u32()?),
                3 => data = BlobData::Zlib(field.as_bytes()?.to_vec()),
                4 => data = BlobData::Lzma(field.as_bytes()?.to_vec()),
                5 => data = BlobData::Bzip2(field.as_bytes()?.to_vec()),
                6 => data = BlobData::Lz4(field.as_bytes()?.to_vec()),
                7 => data = BlobData::Zstd(field.as_bytes()?.to_vec()),
                _ => {}
            }
        }

        Ok(Self { raw_size, data })
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match &self.data {
            BlobData::Raw(bytes) => encode_bytes_field(&mut buf, 1, bytes),
            BlobData::Zlib(bytes) => encode_bytes_field(&mut buf, 3, bytes),
            BlobData::Lzma(bytes) => encode_bytes_field(&mut buf, 4, bytes),
            BlobData::Bzip2(bytes) => encode_bytes_field(&mut buf, 5, bytes),
            BlobData::Lz4(bytes) => encode_bytes_field(&mut buf, 6, bytes),
            BlobData::Zstd(bytes) => encode_bytes_field(&mut buf, 7, bytes),
            BlobData::Missing => {}
        }
        if let Some(size) = self.raw_size {
            encode_varint_field(&mut buf, 2, u64::from(size));
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_header_roundtrip() {
        let header = BlobHeader {
            kind: KIND_DATA.to_string(),
            index_data: Some(vec![1, 2, 3]),
            data_size: 4096,
        };
        assert_eq!(BlobHeader::decode(&header.encode()).unwrap(), header);
    }

    #[test]
    fn blob_header_requires_datasize() {
        let mut buf = Vec::new();
        encode_bytes_field(&mut buf, 1, b"OSMData");
        assert!(matches!(
            BlobHeader::decode(&buf),
            Err(TypeError::MissingRequiredField { field: "datasize", .. })
        ));
    }

    #[test]
    fn blob_without_payload_is_missing() {
        let mut buf = Vec::new();
        encode_varint_field(&mut buf, 2, 10);
        let blob = Blob::decode(&buf).unwrap();
        assert_eq!(blob.data, BlobData::Missing);
        assert_eq!(blob.raw_size, Some(10));
    }

    #[test]
    fn last_oneof_variant_wins() {
        let mut buf = Vec::new();
        encode_bytes_field(&mut buf, 1, b"raw");
        encode_bytes_field(&mut buf, 6, b"lz4");
        let blob = Blob::decode(&buf).unwrap();
        assert_eq!(blob.data, BlobData::Lz4(b"lz4".to_vec()));
    }

    #[test]
    fn raw_size_after_data_is_read() {
        // raw_size may legally follow the payload field
        let blob = Blob {
            raw_size: Some(77),
            data: BlobData::Zlib(vec![0xAA; 5]),
        };
        let decoded = Blob::decode(&blob.encode()).unwrap();
        assert_eq!(decoded, blob);
    }
}
