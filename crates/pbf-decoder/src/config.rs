/// Default upper bound on a frame's blob header length (64 KiB).
pub const DEFAULT_MAX_HEADER_SIZE: usize = 64 * 1024;

/// Default upper bound on a blob, compressed or decompressed (32 MiB).
pub const DEFAULT_MAX_BLOB_SIZE: usize = 32 * 1024 * 1024;

/// Knobs shared by the frame reader and block decoder.
///
/// Limits are checked against declared sizes before any buffer is
/// allocated, so a corrupt length prefix cannot trigger a huge
/// allocation.
///
/// ```rust
/// use pbf_decoder::DecoderConfig;
///
/// let config = DecoderConfig::default().with_metadata(false);
/// assert!(!config.fetch_metadata);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Attach [`Metadata`](pbf_types::Metadata) to entities that carry
    /// info on the wire. When off, info sub-messages are never read.
    pub fetch_metadata: bool,
    pub max_header_size: usize,
    pub max_blob_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            fetch_metadata: true,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_metadata(mut self, fetch_metadata: bool) -> Self {
        self.fetch_metadata = fetch_metadata;
        self
    }

    #[must_use]
    pub fn with_max_header_size(mut self, limit: usize) -> Self {
        self.max_header_size = limit;
        self
    }

    #[must_use]
    pub fn with_max_blob_size(mut self, limit: usize) -> Self {
        self.max_blob_size = limit;
        self
    }
}
