//! Dense batch decoding.
//!
//! A dense batch packs N points column-wise. Every delta-coded column has
//! its own running total that starts at zero for the batch and is never
//! reset per entry:
//!
//! ```text
//!   column      coding     when the column is absent or empty
//!   ─────────── ────────── ──────────────────────────────────────
//!   id/lat/lon  delta      (required, length N)
//!   version     absolute   version = -1
//!   timestamp   delta      timestamp = TIMESTAMP_ABSENT
//!   changeset   delta      total frozen at its last value (0)
//!   uid         delta      total frozen at its last value (0)
//!   user_sid    delta      total frozen, username = strings[total]
//!   visible     absolute   every entry visible
//!   keys_vals   cursor     no entry has tags
//! ```
//!
//! A column that is present must hold exactly N values.
//!
//! `keys_vals` is one flat array shared by the whole batch: each entry
//! reads `(key, value)` index pairs from the cursor until it meets a `0`,
//! then steps over that `0`.

use pbf_types::osmformat::{DenseInfo, DenseNodes};
use pbf_types::{Metadata, Point, Tag};

use crate::error::DecodeError;
use crate::record::check_len;
use crate::scalar::BlockParams;
use crate::string_table::StringTable;

/// One optional dense-info column, keeping absent and empty apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column<'a, T> {
    /// The field never appeared on the wire.
    Absent,
    /// The field appeared with zero entries.
    Empty,
    /// The field holds one value per entry.
    Values(&'a [T]),
}

impl<'a, T: Copy> Column<'a, T> {
    /// # Errors
    ///
    /// [`DecodeError::LengthMismatch`] when a non-empty column does not
    /// hold exactly `len` values.
    pub fn new(field: &'static str, values: Option<&'a Vec<T>>, len: usize) -> Result<Self, DecodeError> {
        match values {
            None => Ok(Self::Absent),
            Some(v) if v.is_empty() => Ok(Self::Empty),
            Some(v) => {
                check_len(field, len, v.len())?;
                Ok(Self::Values(v))
            }
        }
    }

    /// Value at `index`, or `None` if the column carries no values.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        match self {
            Self::Values(values) => values.get(index).copied(),
            Self::Absent | Self::Empty => None,
        }
    }
}

#[derive(Debug)]
struct InfoColumns<'a> {
    version: Column<'a, i32>,
    timestamp: Column<'a, i64>,
    changeset: Column<'a, i64>,
    uid: Column<'a, i32>,
    user_sid: Column<'a, i32>,
    visible: Column<'a, bool>,
}

impl<'a> InfoColumns<'a> {
    fn new(info: &'a DenseInfo, len: usize) -> Result<Self, DecodeError> {
        Ok(Self {
            version: Column::new("dense version", info.version.as_ref(), len)?,
            timestamp: Column::new("dense timestamp", info.timestamp.as_ref(), len)?,
            changeset: Column::new("dense changeset", info.changeset.as_ref(), len)?,
            uid: Column::new("dense uid", info.uid.as_ref(), len)?,
            user_sid: Column::new("dense user_sid", info.user_sid.as_ref(), len)?,
            visible: Column::new("dense visible", info.visible.as_ref(), len)?,
        })
    }
}

/// Running totals for one batch.
#[derive(Debug, Default)]
struct Totals {
    id: i64,
    lat: i64,
    lon: i64,
    timestamp: i64,
    changeset: i64,
    uid: i32,
    user_sid: i32,
}

/// Iterator over the points of one dense batch, in wire order.
///
/// Column lengths are validated when the batch is created; string
/// indices and the tag cursor are checked as entries are produced. The
/// iterator stops after the first error.
///
/// Pushing each point to a sink and collecting them into a `Vec` both
/// go through this iterator, so the two modes cannot disagree.
#[derive(Debug)]
pub struct DenseBatch<'a> {
    dense: &'a DenseNodes,
    info: Option<InfoColumns<'a>>,
    params: &'a BlockParams,
    strings: &'a StringTable,
    index: usize,
    totals: Totals,
    cursor: usize,
    failed: bool,
}

impl<'a> DenseBatch<'a> {
    /// # Errors
    ///
    /// [`DecodeError::LengthMismatch`] when `lat`/`lon` or a present
    /// dense-info column does not match the `id` column's length.
    pub fn new(
        dense: &'a DenseNodes,
        params: &'a BlockParams,
        strings: &'a StringTable,
        fetch_metadata: bool,
    ) -> Result<Self, DecodeError> {
        let len = dense.id.len();
        check_len("dense lat", len, dense.lat.len())?;
        check_len("dense lon", len, dense.lon.len())?;

        let info = match &dense.dense_info {
            Some(info) if fetch_metadata => Some(InfoColumns::new(info, len)?),
            _ => None,
        };

        Ok(Self {
            dense,
            info,
            params,
            strings,
            index: 0,
            totals: Totals::default(),
            cursor: 0,
            failed: false,
        })
    }

    fn decode_entry(&mut self, i: usize) -> Result<Point, DecodeError> {
        let totals = &mut self.totals;
        totals.id = totals.id.wrapping_add(self.dense.id[i]);
        totals.lat = totals.lat.wrapping_add(self.dense.lat[i]);
        totals.lon = totals.lon.wrapping_add(self.dense.lon[i]);
        let (id, lat, lon) = (totals.id, totals.lat, totals.lon);

        let metadata = match &self.info {
            Some(columns) => Some(self.metadata(columns, i)?),
            None => None,
        };

        Ok(Point {
            id,
            lat: self.params.latitude(lat),
            lon: self.params.longitude(lon),
            tags: self.next_tags()?,
            metadata,
        })
    }

    fn metadata(&self, columns: &InfoColumns<'_>, i: usize) -> Result<Metadata, DecodeError> {
        let totals = &self.totals;
        let username = self.strings.user(i64::from(totals.user_sid))?.to_owned();
        Ok(Metadata {
            version: columns.version.get(i).unwrap_or(-1),
            timestamp: if columns.timestamp.get(i).is_some() {
                self.params.timestamp_ms(totals.timestamp)
            } else {
                Metadata::TIMESTAMP_ABSENT
            },
            uid: totals.uid,
            username,
            changeset: totals.changeset,
            visible: columns.visible.get(i).unwrap_or(true),
        })
    }

    fn advance_info_totals(&mut self, i: usize) {
        let Some(columns) = &self.info else {
            return;
        };
        let totals = &mut self.totals;
        if let Some(delta) = columns.timestamp.get(i) {
            totals.timestamp = totals.timestamp.wrapping_add(delta);
        }
        if let Some(delta) = columns.changeset.get(i) {
            totals.changeset = totals.changeset.wrapping_add(delta);
        }
        if let Some(delta) = columns.uid.get(i) {
            totals.uid = totals.uid.wrapping_add(delta);
        }
        if let Some(delta) = columns.user_sid.get(i) {
            totals.user_sid = totals.user_sid.wrapping_add(delta);
        }
    }

    fn next_tags(&mut self) -> Result<Vec<Tag>, DecodeError> {
        let dense = self.dense;
        let keys_vals = &dense.keys_vals;
        if keys_vals.is_empty() {
            return Ok(Vec::new());
        }

        let at = |position: usize| {
            keys_vals
                .get(position)
                .copied()
                .ok_or(DecodeError::TagCursorOutOfBounds {
                    position,
                    len: keys_vals.len(),
                })
        };

        let mut tags = Vec::new();
        loop {
            let key = at(self.cursor)?;
            if key == 0 {
                self.cursor += 1;
                return Ok(tags);
            }
            let value = at(self.cursor + 1)?;
            tags.push(Tag::new(
                self.strings.get(i64::from(key))?,
                self.strings.get(i64::from(value))?,
            ));
            self.cursor += 2;
        }
    }
}

impl Iterator for DenseBatch<'_> {
    type Item = Result<Point, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.dense.id.len() {
            return None;
        }
        let i = self.index;
        self.index += 1;
        self.advance_info_totals(i);

        let result = self.decode_entry(i);
        self.failed = result.is_err();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.failed {
            0
        } else {
            self.dense.id.len() - self.index
        };
        (0, Some(remaining))
    }
}
