use std::fmt;

use pbf_types::TypeError;
use pbf_wire::WireError;

/// Errors that can occur while framing, decompressing or decoding a block.
///
/// Every error is fatal for the block it occurs in: no partial entity
/// list is returned alongside it, and the decoder never retries. Whether
/// to skip the block or stop is the caller's decision.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── HeaderTooLarge            ← frame header length over the limit
///   ├── BlobTooLarge              ← payload or raw_size over the limit
///   ├── BlockWithoutData          ← blob carries no payload variant
///   ├── UnsupportedCompression    ← lzma / bzip2 payload
///   ├── MissingRawSize            ← compressed payload without raw_size
///   ├── StringIndexOutOfRange     ← tag, role or user index past the table
///   ├── UnsupportedFeature        ← unknown required header feature
///   ├── LengthMismatch            ← parallel arrays of different lengths
///   ├── TagCursorOutOfBounds      ← dense tag list runs off its array
///   ├── Decompress                ← malformed compressed stream
///   ├── SizeMismatch              ← decompressed size ≠ raw_size
///   ├── Type(TypeError)           ← from pbf-types message parsing
///   ├── Wire(WireError)           ← from pbf-wire field parsing
///   └── Io(std::io::Error)        ← from the underlying reader
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("blob header length {size} exceeds limit {limit}")]
    HeaderTooLarge { size: usize, limit: usize },

    /// Checked before allocating, both for the framed payload and for a
    /// compressed payload's declared `raw_size`.
    #[error("blob size {size} exceeds limit {limit}")]
    BlobTooLarge { size: usize, limit: usize },

    #[error("block without data")]
    BlockWithoutData,

    #[error("unsupported compression: {0}")]
    UnsupportedCompression(&'static str),

    #[error("{compression} payload without raw_size")]
    MissingRawSize { compression: &'static str },

    #[error("string table index {index} out of range (table has {len} entries)")]
    StringIndexOutOfRange { index: i64, len: usize },

    #[error("unsupported required feature {0:?}")]
    UnsupportedFeature(String),

    /// Two arrays that must run in parallel do not.
    #[error("{field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("dense tag list ends at {position} before its delimiter (array has {len} entries)")]
    TagCursorOutOfBounds { position: usize, len: usize },

    #[error("{compression} decompression failed: {message}")]
    Decompress {
        compression: &'static str,
        message: String,
    },

    #[error("{compression} payload decompressed to {actual} bytes, declared {expected}")]
    SizeMismatch {
        compression: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    /// Short reads included: a stream that ends inside a frame surfaces
    /// as [`std::io::ErrorKind::UnexpectedEof`].
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`DecodeError`].
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────┐
/// │ Kind          │ Raised for                                   │
/// ├───────────────┼──────────────────────────────────────────────┤
/// │ Io            │ stream read failures, truncated frames       │
/// │ Format        │ malformed messages, limits, bad indices      │
/// │ Decompression │ corrupt compressed data, size mismatches     │
/// └───────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Format,
    Decompression,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Io => "io error",
            Self::Format => "format error",
            Self::Decompression => "decompression error",
        })
    }
}

impl DecodeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Wire(WireError::Io(_)) | Self::Type(TypeError::Wire(WireError::Io(_))) => {
                ErrorKind::Io
            }
            Self::Decompress { .. } | Self::SizeMismatch { .. } => ErrorKind::Decompression,
            Self::HeaderTooLarge { .. }
            | Self::BlobTooLarge { .. }
            | Self::BlockWithoutData
            | Self::UnsupportedCompression(_)
            | Self::MissingRawSize { .. }
            | Self::StringIndexOutOfRange { .. }
            | Self::UnsupportedFeature(_)
            | Self::LengthMismatch { .. }
            | Self::TagCursorOutOfBounds { .. }
            | Self::Type(_)
            | Self::Wire(_) => ErrorKind::Format,
        }
    }

    pub(crate) fn truncated(what: &str) -> Self {
        Self::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("stream ended inside {what}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(DecodeError::BlockWithoutData.kind(), ErrorKind::Format);
        assert_eq!(DecodeError::truncated("frame").kind(), ErrorKind::Io);
        assert_eq!(
            DecodeError::SizeMismatch {
                compression: "zlib",
                expected: 10,
                actual: 9
            }
            .kind(),
            ErrorKind::Decompression
        );
        assert_eq!(
            DecodeError::from(WireError::VarintTooLong).kind(),
            ErrorKind::Format
        );
        assert_eq!(
            DecodeError::from(TypeError::MissingRequiredField {
                message: "Node",
                field: "id"
            })
            .kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn display_names_the_problem() {
        let err = DecodeError::StringIndexOutOfRange { index: 9, len: 3 };
        assert_eq!(
            err.to_string(),
            "string table index 9 out of range (table has 3 entries)"
        );
        assert_eq!(ErrorKind::Format.to_string(), "format error");
    }
}
