use pbf_types::osmformat::{HeaderBBox, HeaderBlock};

use crate::error::DecodeError;

/// Required features this decoder can honour.
///
/// A file listing any other required feature is refused, since its
/// blocks may rely on encodings this decoder would misread.
pub const SUPPORTED_FEATURES: &[&str] = &["OsmSchema-V0.6", "DenseNodes", "HistoricalInformation"];

/// Bounding box in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl From<HeaderBBox> for Bounds {
    #[allow(clippy::cast_precision_loss)]
    fn from(bbox: HeaderBBox) -> Self {
        let degrees = |nano: i64| nano as f64 * 1e-9;
        Self {
            left: degrees(bbox.left),
            right: degrees(bbox.right),
            top: degrees(bbox.top),
            bottom: degrees(bbox.bottom),
        }
    }
}

/// What a header block tells the reader about the file. Never carries
/// entities.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderInfo {
    pub bounds: Option<Bounds>,
    pub required_features: Vec<String>,
    pub optional_features: Vec<String>,
    pub writing_program: Option<String>,
    pub source: Option<String>,
    pub replication_timestamp: Option<i64>,
    pub replication_sequence_number: Option<i64>,
    pub replication_base_url: Option<String>,
}

impl HeaderInfo {
    /// Parse a decompressed header block.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnsupportedFeature`] for an unknown required
    /// feature, or any message parsing error.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        Self::try_from(HeaderBlock::decode(buf)?)
    }
}

impl TryFrom<HeaderBlock> for HeaderInfo {
    type Error = DecodeError;

    fn try_from(block: HeaderBlock) -> Result<Self, DecodeError> {
        if let Some(unknown) = block
            .required_features
            .iter()
            .find(|feature| !SUPPORTED_FEATURES.contains(&feature.as_str()))
        {
            return Err(DecodeError::UnsupportedFeature(unknown.clone()));
        }

        Ok(Self {
            bounds: block.bbox.map(Bounds::from),
            required_features: block.required_features,
            optional_features: block.optional_features,
            writing_program: block.writing_program,
            source: block.source,
            replication_timestamp: block.replication_timestamp,
            replication_sequence_number: block.replication_sequence_number,
            replication_base_url: block.replication_base_url,
        })
    }
}
