use std::fmt;
use std::io::{self, Read};

use pbf_types::fileformat::{KIND_DATA, KIND_HEADER};
use pbf_types::{Blob, BlobHeader};
use tracing::debug;

use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Size of the big-endian length prefix in front of every blob header.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Block kind named by a blob header.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Header,
    Data,
    /// Any other kind string. Readers skip these.
    Unknown(String),
}

impl BlockKind {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            KIND_HEADER => Self::Header,
            KIND_DATA => Self::Data,
            other => Self::Unknown(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Header => KIND_HEADER,
            Self::Data => KIND_DATA,
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One framed block: its parsed header and still-compressed blob.
///
/// ```text
/// ┌──────────────┬──────────────────────┬──────────────────────────┐
/// │ u32 BE len L │ BlobHeader (L bytes) │ Blob (data_size bytes)   │
/// └──────────────┴──────────────────────┴──────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub kind: BlockKind,
    pub header: BlobHeader,
    pub blob: Blob,
    /// Length of the encoded blob header, as read from the prefix.
    pub header_size: usize,
}

impl Frame {
    #[must_use]
    pub fn payload_size(&self) -> usize {
        self.header.data_size as usize
    }

    /// Bytes this frame occupies on the stream.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.header_size + self.payload_size()
    }
}

/// Read the next frame from a blocking reader.
///
/// Returns `Ok(None)` when the stream ends cleanly, i.e. before the first
/// byte of a length prefix. Ending anywhere later is an I/O error.
///
/// # Errors
///
/// - [`DecodeError::Io`] on read failures and truncated frames.
/// - [`DecodeError::HeaderTooLarge`] / [`DecodeError::BlobTooLarge`] when
///   a declared size exceeds the configured limit; nothing is allocated.
/// - [`DecodeError::Type`] when the header or blob message is malformed.
pub fn read_frame<R: Read + ?Sized>(
    reader: &mut R,
    config: &DecoderConfig,
) -> Result<Option<Frame>, DecodeError> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    match fill(reader, &mut prefix)? {
        0 => return Ok(None),
        LENGTH_PREFIX_SIZE => {}
        _ => return Err(DecodeError::truncated("length prefix")),
    }
    let header_size = header_size(prefix, config)?;

    let mut header_buf = vec![0u8; header_size];
    read_exact(reader, &mut header_buf, "blob header")?;
    let header = decode_header(&header_buf, config)?;

    let mut blob_buf = vec![0u8; header.data_size as usize];
    read_exact(reader, &mut blob_buf, "blob")?;
    finish(header, header_size, &blob_buf).map(Some)
}

/// Read until `buf` is full or the stream ends; returns bytes read.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_exact<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<(), DecodeError> {
    reader.read_exact(buf).map_err(|e| eof_as_truncated(e, what))
}

pub(crate) fn eof_as_truncated(err: io::Error, what: &str) -> DecodeError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::truncated(what)
    } else {
        DecodeError::Io(err)
    }
}

pub(crate) fn header_size(prefix: [u8; LENGTH_PREFIX_SIZE], config: &DecoderConfig) -> Result<usize, DecodeError> {
    let size = u32::from_be_bytes(prefix) as usize;
    if size > config.max_header_size {
        return Err(DecodeError::HeaderTooLarge {
            size,
            limit: config.max_header_size,
        });
    }
    Ok(size)
}

pub(crate) fn decode_header(buf: &[u8], config: &DecoderConfig) -> Result<BlobHeader, DecodeError> {
    let header = BlobHeader::decode(buf)?;
    let size = header.data_size as usize;
    if size > config.max_blob_size {
        return Err(DecodeError::BlobTooLarge {
            size,
            limit: config.max_blob_size,
        });
    }
    Ok(header)
}

pub(crate) fn finish(header: BlobHeader, header_size: usize, blob_buf: &[u8]) -> Result<Frame, DecodeError> {
    let blob = Blob::decode(blob_buf)?;
    let kind = BlockKind::from_name(&header.kind);
    debug!(
        kind = %kind,
        header_size,
        payload_size = header.data_size,
        payload = blob.data.name(),
        "read frame"
    );
    Ok(Frame {
        kind,
        header,
        blob,
        header_size,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use pbf_types::BlobData;

    use super::*;
    use crate::error::ErrorKind;

    pub(crate) fn frame_bytes(kind: &str, blob: &Blob) -> Vec<u8> {
        let blob_bytes = blob.encode();
        let header = BlobHeader {
            kind: kind.to_string(),
            index_data: None,
            data_size: blob_bytes.len() as u32,
        }
        .encode();
        let mut out = (header.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(&header);
        out.extend_from_slice(&blob_bytes);
        out
    }

    pub(crate) fn raw_blob(bytes: &[u8]) -> Blob {
        Blob {
            raw_size: Some(bytes.len() as u32),
            data: BlobData::Raw(bytes.to_vec()),
        }
    }

    #[test]
    fn reads_consecutive_frames_then_clean_eof() {
        let mut stream = frame_bytes(KIND_HEADER, &raw_blob(b"h"));
        stream.extend(frame_bytes(KIND_DATA, &raw_blob(b"data")));
        let mut cursor = Cursor::new(stream);
        let config = DecoderConfig::default();

        let first = read_frame(&mut cursor, &config).unwrap().unwrap();
        assert_eq!(first.kind, BlockKind::Header);
        let second = read_frame(&mut cursor, &config).unwrap().unwrap();
        assert_eq!(second.kind, BlockKind::Data);
        assert_eq!(second.blob.data, BlobData::Raw(b"data".to_vec()));
        assert!(read_frame(&mut cursor, &config).unwrap().is_none());
    }

    #[test]
    fn empty_stream_is_clean_end() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(read_frame(&mut cursor, &DecoderConfig::default()).unwrap().is_none());
    }

    #[test]
    fn partial_prefix_is_io_error() {
        let mut cursor = Cursor::new(vec![0u8, 0]);
        let err = read_frame(&mut cursor, &DecoderConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn truncated_blob_is_io_error() {
        let mut stream = frame_bytes(KIND_DATA, &raw_blob(b"0123456789"));
        stream.truncate(stream.len() - 3);
        let err = read_frame(&mut Cursor::new(stream), &DecoderConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("blob"));
    }

    #[test]
    fn oversized_header_rejected_before_reading() {
        let mut cursor = Cursor::new(u32::MAX.to_be_bytes().to_vec());
        let err = read_frame(&mut cursor, &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, DecodeError::HeaderTooLarge { .. }));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn oversized_blob_rejected() {
        let stream = frame_bytes(KIND_DATA, &raw_blob(&[0u8; 64]));
        let config = DecoderConfig::default().with_max_blob_size(16);
        let err = read_frame(&mut Cursor::new(stream), &config).unwrap_err();
        assert!(matches!(err, DecodeError::BlobTooLarge { limit: 16, .. }));
    }

    #[test]
    fn unknown_kind_preserved() {
        let stream = frame_bytes("OSMIndex", &raw_blob(b""));
        let frame = read_frame(&mut Cursor::new(stream), &DecoderConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(frame.kind, BlockKind::Unknown("OSMIndex".into()));
        assert_eq!(frame.kind.to_string(), "OSMIndex");
    }
}
