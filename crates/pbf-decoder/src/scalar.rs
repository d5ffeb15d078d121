use pbf_types::Metadata;
use pbf_types::osmformat::PrimitiveBlock;

/// Raw coordinate value meaning "not recorded".
pub const COORDINATE_ABSENT: i64 = i32::MAX as i64;

const NANO: f64 = 1e-9;

/// Per-block scaling parameters.
///
/// Captured once when a block decoder is created; every record and
/// dense batch in the block is scaled with the same values.
///
/// ```text
///   degrees = (granularity × raw + offset) × 1e-9
///   millis  = date_granularity × raw
/// ```
///
/// Integer arithmetic wraps on overflow, so hostile inputs produce
/// garbage coordinates rather than a panic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockParams {
    pub granularity: i32,
    pub lat_offset: i64,
    pub lon_offset: i64,
    pub date_granularity: i32,
}

impl Default for BlockParams {
    fn default() -> Self {
        Self::from_block(&PrimitiveBlock::default())
    }
}

impl BlockParams {
    #[must_use]
    pub fn from_block(block: &PrimitiveBlock) -> Self {
        Self {
            granularity: block.granularity,
            lat_offset: block.lat_offset,
            lon_offset: block.lon_offset,
            date_granularity: block.date_granularity,
        }
    }

    /// Latitude in degrees, or NaN for the absent sentinel.
    #[must_use]
    pub fn latitude(&self, raw: i64) -> f64 {
        self.scale(raw, self.lat_offset)
    }

    /// Longitude in degrees, or NaN for the absent sentinel.
    #[must_use]
    pub fn longitude(&self, raw: i64) -> f64 {
        self.scale(raw, self.lon_offset)
    }

    /// Milliseconds since the epoch for a timestamp in block units.
    #[must_use]
    pub fn timestamp_ms(&self, raw: i64) -> i64 {
        i64::from(self.date_granularity).wrapping_mul(raw)
    }

    /// Like [`timestamp_ms`](Self::timestamp_ms), mapping a missing value
    /// to [`Metadata::TIMESTAMP_ABSENT`].
    #[must_use]
    pub fn optional_timestamp_ms(&self, raw: Option<i64>) -> i64 {
        raw.map_or(Metadata::TIMESTAMP_ABSENT, |ts| self.timestamp_ms(ts))
    }

    #[allow(clippy::cast_precision_loss)]
    fn scale(&self, raw: i64, offset: i64) -> f64 {
        if raw == COORDINATE_ABSENT {
            return f64::NAN;
        }
        let nanodegrees = i64::from(self.granularity)
            .wrapping_mul(raw)
            .wrapping_add(offset);
        nanodegrees as f64 * NANO
    }
}
