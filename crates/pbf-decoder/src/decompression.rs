use std::fmt;

use flate2::{Decompress, FlushDecompress, Status};
use pbf_types::{Blob, BlobData};

use crate::error::DecodeError;

/// How a decompressed payload was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Deflate,
    Lz4,
    Zstd,
}

impl Compression {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Deflate => "deflate",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turn a blob into its plain message bytes.
///
/// Raw payloads are moved out without copying. Compressed payloads are
/// decompressed into a buffer of exactly `raw_size` bytes; producing
/// fewer or more bytes than declared is a [`DecodeError::SizeMismatch`].
///
/// The LZ4 path uses `lz4_flex`'s block decoder, a pure function of its
/// input and output slices, so concurrent calls from several threads
/// share nothing.
///
/// # Errors
///
/// - [`DecodeError::BlockWithoutData`] when no payload variant is set.
/// - [`DecodeError::UnsupportedCompression`] for lzma and bzip2.
/// - [`DecodeError::MissingRawSize`] / [`DecodeError::BlobTooLarge`] for a
///   compressed payload without a usable `raw_size`.
/// - [`DecodeError::Decompress`] / [`DecodeError::SizeMismatch`] when the
///   compressed stream is corrupt.
pub fn decompress(blob: Blob, max_size: usize) -> Result<(Vec<u8>, Compression), DecodeError> {
    let raw_size = blob.raw_size;
    match blob.data {
        BlobData::Raw(bytes) => Ok((bytes, Compression::None)),
        BlobData::Zlib(bytes) => {
            let size = expected_size(raw_size, "zlib", max_size)?;
            Ok((inflate(&bytes, size)?, Compression::Deflate))
        }
        BlobData::Lz4(bytes) => {
            let size = expected_size(raw_size, "lz4", max_size)?;
            Ok((lz4(&bytes, size)?, Compression::Lz4))
        }
        BlobData::Zstd(bytes) => {
            let size = expected_size(raw_size, "zstd", max_size)?;
            Ok((zstd_bulk(&bytes, size)?, Compression::Zstd))
        }
        BlobData::Lzma(_) => Err(DecodeError::UnsupportedCompression("lzma")),
        BlobData::Bzip2(_) => Err(DecodeError::UnsupportedCompression("bzip2")),
        BlobData::Missing => Err(DecodeError::BlockWithoutData),
    }
}

fn expected_size(
    raw_size: Option<u32>,
    compression: &'static str,
    max_size: usize,
) -> Result<usize, DecodeError> {
    let size = raw_size.ok_or(DecodeError::MissingRawSize { compression })? as usize;
    if size > max_size {
        return Err(DecodeError::BlobTooLarge {
            size,
            limit: max_size,
        });
    }
    Ok(size)
}

/// zlib-wrapped deflate, as written by every common encoder.
fn inflate(input: &[u8], size: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = vec![0u8; size];
    let mut inflater = Decompress::new(true);
    let status = inflater
        .decompress(input, &mut out, FlushDecompress::Finish)
        .map_err(|e| DecodeError::Decompress {
            compression: "zlib",
            message: e.to_string(),
        })?;

    #[allow(clippy::cast_possible_truncation)]
    let produced = inflater.total_out() as usize;
    match status {
        Status::StreamEnd if produced == size => Ok(out),
        _ if produced == size => Err(DecodeError::Decompress {
            compression: "zlib",
            message: format!("stream continues past declared raw_size {size}"),
        }),
        _ => Err(DecodeError::SizeMismatch {
            compression: "zlib",
            expected: size,
            actual: produced,
        }),
    }
}

fn lz4(input: &[u8], size: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = vec![0u8; size];
    let produced = lz4_flex::block::decompress_into(input, &mut out).map_err(|e| {
        DecodeError::Decompress {
            compression: "lz4",
            message: e.to_string(),
        }
    })?;
    if produced != size {
        return Err(DecodeError::SizeMismatch {
            compression: "lz4",
            expected: size,
            actual: produced,
        });
    }
    Ok(out)
}

fn zstd_bulk(input: &[u8], size: usize) -> Result<Vec<u8>, DecodeError> {
    let out = zstd::bulk::decompress(input, size).map_err(|e| DecodeError::Decompress {
        compression: "zstd",
        message: e.to_string(),
    })?;
    if out.len() != size {
        return Err(DecodeError::SizeMismatch {
            compression: "zstd",
            expected: size,
            actual: out.len(),
        });
    }
    Ok(out)
}
