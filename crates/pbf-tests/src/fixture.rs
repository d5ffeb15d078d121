//! Blob compression and stream framing for test fixtures.
//!
//! ```text
//!   PbfWriter
//!     ├── header(HeaderBlock) ──encode──▶ compress ──▶ frame("OSMHeader")
//!     ├── data(PrimitiveBlock) ─encode──▶ compress ──▶ frame("OSMData")
//!     └── frame(kind, Blob) ───────────────────────────▶ frame(kind)
//! ```

use std::fmt;
use std::io::{self, Cursor, Write};

use flate2::Compression as ZlibLevel;
use flate2::write::ZlibEncoder;
use pbf_types::fileformat::{KIND_DATA, KIND_HEADER};
use pbf_types::osmformat::{HeaderBlock, PrimitiveBlock};
use pbf_types::{Blob, BlobData, BlobHeader};

/// Payload encoding used when writing a blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Codec {
    Raw,
    Zlib,
    Lz4,
    Zstd,
}

impl Codec {
    pub const ALL: [Codec; 4] = [Codec::Raw, Codec::Zlib, Codec::Lz4, Codec::Zstd];
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "raw",
            Self::Zlib => "zlib",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        };
        f.write_str(name)
    }
}

/// Wrap `bytes` in a blob, compressed with `codec`.
///
/// `raw_size` is always set to the uncompressed length.
///
/// # Errors
///
/// Propagates compressor I/O errors.
pub fn compress_blob(bytes: &[u8], codec: Codec) -> io::Result<Blob> {
    let data = match codec {
        Codec::Raw => BlobData::Raw(bytes.to_vec()),
        Codec::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), ZlibLevel::default());
            encoder.write_all(bytes)?;
            BlobData::Zlib(encoder.finish()?)
        }
        Codec::Lz4 => BlobData::Lz4(lz4_flex::block::compress(bytes)),
        Codec::Zstd => BlobData::Zstd(zstd::encode_all(Cursor::new(bytes), 3)?),
    };
    Ok(Blob {
        raw_size: Some(u32::try_from(bytes.len()).map_err(io::Error::other)?),
        data,
    })
}

/// One complete frame: length prefix, blob header, blob.
///
/// # Errors
///
/// When the encoded header or blob exceeds `u32::MAX` bytes.
pub fn frame_bytes(kind: &str, blob: &Blob) -> io::Result<Vec<u8>> {
    let blob_bytes = blob.encode();
    let header = BlobHeader {
        kind: kind.to_string(),
        index_data: None,
        data_size: u32::try_from(blob_bytes.len()).map_err(io::Error::other)?,
    }
    .encode();
    let header_len = u32::try_from(header.len()).map_err(io::Error::other)?;

    let mut out = Vec::with_capacity(4 + header.len() + blob_bytes.len());
    out.extend_from_slice(&header_len.to_be_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&blob_bytes);
    Ok(out)
}

/// Assembles a whole file in memory, one frame at a time.
///
/// ```rust
/// use pbf_tests::{Codec, PbfWriter};
/// use pbf_types::osmformat::{HeaderBlock, PrimitiveBlock};
///
/// let bytes = PbfWriter::new(Codec::Zlib)
///     .header(&HeaderBlock::default())
///     .unwrap()
///     .data(&PrimitiveBlock::default())
///     .unwrap()
///     .finish();
/// assert!(!bytes.is_empty());
/// ```
#[derive(Debug)]
pub struct PbfWriter {
    codec: Codec,
    buf: Vec<u8>,
    frames: usize,
}

impl PbfWriter {
    #[must_use]
    pub fn new(codec: Codec) -> Self {
        Self {
            codec,
            buf: Vec::new(),
            frames: 0,
        }
    }

    /// Switch the codec used for subsequent blocks.
    #[must_use]
    pub fn codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// # Errors
    ///
    /// Propagates compressor I/O errors.
    pub fn header(self, header: &HeaderBlock) -> io::Result<Self> {
        let blob = compress_blob(&header.encode(), self.codec)?;
        self.frame(KIND_HEADER, &blob)
    }

    /// # Errors
    ///
    /// Propagates compressor I/O errors.
    pub fn data(self, block: &PrimitiveBlock) -> io::Result<Self> {
        let blob = compress_blob(&block.encode(), self.codec)?;
        self.frame(KIND_DATA, &blob)
    }

    /// Append a frame with an arbitrary kind and prebuilt blob.
    ///
    /// # Errors
    ///
    /// As for [`frame_bytes`].
    pub fn frame(mut self, kind: &str, blob: &Blob) -> io::Result<Self> {
        self.buf.extend(frame_bytes(kind, blob)?);
        self.frames += 1;
        Ok(self)
    }

    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use pbf_decoder::{Compression, decompress};

    use super::*;

    #[test]
    fn every_codec_decompresses_back() {
        let payload = b"a payload long enough to be worth compressing, compressing, compressing";
        for codec in Codec::ALL {
            let blob = compress_blob(payload, codec).unwrap();
            let (bytes, _) = decompress(blob, 1024).unwrap();
            assert_eq!(bytes, payload, "{codec}");
        }
    }

    #[test]
    fn codec_maps_to_compression() {
        let blob = compress_blob(b"x", Codec::Zlib).unwrap();
        assert_eq!(decompress(blob, 16).unwrap().1, Compression::Deflate);
    }

    #[test]
    fn writer_counts_frames() {
        let writer = PbfWriter::new(Codec::Raw)
            .header(&HeaderBlock::default())
            .unwrap()
            .frame("OSMIndex", &compress_blob(b"", Codec::Raw).unwrap())
            .unwrap();
        assert_eq!(writer.frames(), 2);
    }
}
