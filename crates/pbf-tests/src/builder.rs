//! Encode domain entities back into primitive-block wire messages.
//!
//! The builder is the decoder run backwards: coordinates are divided by
//! the block granularity, ids and refs are delta-coded, and every string
//! lands in one interned table. Decoding a block built from a set of
//! entities yields those entities again (up to coordinate rounding).

use std::collections::HashMap;

use pbf_decoder::BlockParams;
use pbf_decoder::scalar::COORDINATE_ABSENT;
use pbf_types::osmformat::{
    DenseInfo, DenseNodes, Info, Node, PrimitiveBlock, PrimitiveGroup, Relation, StringTable, Way,
};
use pbf_types::{Group, Metadata, Path, Point, Tag};

/// Builds one [`PrimitiveBlock`], group by group.
///
/// ```rust
/// use pbf_tests::BlockBuilder;
/// use pbf_types::{Path, Tag};
///
/// let path = Path {
///     id: 7,
///     refs: vec![1, 2, 3],
///     tags: vec![Tag::new("highway", "residential")],
///     metadata: None,
/// };
/// let block = BlockBuilder::new().paths(&[path]).build();
/// assert_eq!(block.groups[0].ways[0].refs, vec![1, 1, 1]);
/// ```
#[derive(Debug)]
pub struct BlockBuilder {
    params: BlockParams,
    strings: Vec<Vec<u8>>,
    index: HashMap<String, u32>,
    groups: Vec<PrimitiveGroup>,
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(BlockParams::default())
    }

    /// Start a block with non-default scaling.
    #[must_use]
    pub fn with_params(params: BlockParams) -> Self {
        let mut builder = Self {
            params,
            strings: Vec::new(),
            index: HashMap::new(),
            groups: Vec::new(),
        };
        // Index 0 is reserved as the dense tag delimiter.
        builder.intern("");
        builder
    }

    /// Index of `s` in the string table, adding it on first use.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&i) = self.index.get(s) {
            return i;
        }
        let i = u32::try_from(self.strings.len()).unwrap_or(u32::MAX);
        self.strings.push(s.as_bytes().to_vec());
        self.index.insert(s.to_owned(), i);
        i
    }

    /// Raw latitude for `degrees` in this block's units; NaN maps to the
    /// absent sentinel.
    #[must_use]
    pub fn raw_lat(&self, degrees: f64) -> i64 {
        to_raw(degrees, self.params.granularity, self.params.lat_offset)
    }

    #[must_use]
    pub fn raw_lon(&self, degrees: f64) -> i64 {
        to_raw(degrees, self.params.granularity, self.params.lon_offset)
    }

    /// One stand-alone point record.
    pub fn node(&mut self, point: &Point) -> Node {
        let (keys, vals) = self.tag_indices(&point.tags);
        Node {
            id: point.id,
            keys,
            vals,
            info: point.metadata.as_ref().map(|m| self.info(m)),
            lat: self.raw_lat(point.lat),
            lon: self.raw_lon(point.lon),
        }
    }

    pub fn way(&mut self, path: &Path) -> Way {
        let (keys, vals) = self.tag_indices(&path.tags);
        Way {
            id: path.id,
            keys,
            vals,
            info: path.metadata.as_ref().map(|m| self.info(m)),
            refs: deltas(path.refs.iter().copied()),
        }
    }

    pub fn relation(&mut self, group: &Group) -> Relation {
        let (keys, vals) = self.tag_indices(&group.tags);
        let roles_sid = group
            .members
            .iter()
            .map(|m| sid(self.intern(&m.role)))
            .collect();
        Relation {
            id: group.id,
            keys,
            vals,
            info: group.metadata.as_ref().map(|m| self.info(m)),
            roles_sid,
            memids: deltas(group.members.iter().map(|m| m.id)),
            types: group.members.iter().map(|m| m.member_type.code()).collect(),
        }
    }

    /// A dense batch holding `points` in order.
    ///
    /// Metadata columns are written when the first point carries
    /// metadata; a timestamp column only when it has a timestamp. Points
    /// without tags share an empty `keys_vals` when no point is tagged.
    ///
    /// # Panics
    ///
    /// When some points carry metadata and others do not; a dense batch
    /// cannot express that.
    pub fn dense(&mut self, points: &[Point]) -> DenseNodes {
        let id = deltas(points.iter().map(|p| p.id));
        let lat = deltas(points.iter().map(|p| self.raw_lat(p.lat)));
        let lon = deltas(points.iter().map(|p| self.raw_lon(p.lon)));

        let mut keys_vals = Vec::new();
        if points.iter().any(|p| !p.tags.is_empty()) {
            for point in points {
                for tag in &point.tags {
                    keys_vals.push(sid(self.intern(&tag.key)));
                    keys_vals.push(sid(self.intern(&tag.value)));
                }
                keys_vals.push(0);
            }
        }

        let with_metadata = points.first().is_some_and(|p| p.metadata.is_some());
        assert!(
            points.iter().all(|p| p.metadata.is_some() == with_metadata),
            "dense batch needs metadata on all points or none"
        );
        let dense_info = with_metadata.then(|| {
            let metas: Vec<&Metadata> = points.iter().filter_map(|p| p.metadata.as_ref()).collect();
            self.dense_info(&metas)
        });

        DenseNodes {
            id,
            dense_info,
            lat,
            lon,
            keys_vals,
        }
    }

    /// Append a group of stand-alone point records.
    #[must_use]
    pub fn points(mut self, points: &[Point]) -> Self {
        let nodes = points.iter().map(|p| self.node(p)).collect();
        self.groups.push(PrimitiveGroup {
            nodes,
            ..PrimitiveGroup::default()
        });
        self
    }

    /// Append a group holding one dense batch.
    #[must_use]
    pub fn dense_points(mut self, points: &[Point]) -> Self {
        let dense = self.dense(points);
        self.groups.push(PrimitiveGroup {
            dense: Some(dense),
            ..PrimitiveGroup::default()
        });
        self
    }

    #[must_use]
    pub fn paths(mut self, paths: &[Path]) -> Self {
        let ways = paths.iter().map(|p| self.way(p)).collect();
        self.groups.push(PrimitiveGroup {
            ways,
            ..PrimitiveGroup::default()
        });
        self
    }

    #[must_use]
    pub fn groups(mut self, groups: &[Group]) -> Self {
        let relations = groups.iter().map(|g| self.relation(g)).collect();
        self.groups.push(PrimitiveGroup {
            relations,
            ..PrimitiveGroup::default()
        });
        self
    }

    /// Append a hand-built group as is.
    #[must_use]
    pub fn raw_group(mut self, group: PrimitiveGroup) -> Self {
        self.groups.push(group);
        self
    }

    #[must_use]
    pub fn build(self) -> PrimitiveBlock {
        PrimitiveBlock {
            string_table: StringTable { s: self.strings },
            groups: self.groups,
            granularity: self.params.granularity,
            lat_offset: self.params.lat_offset,
            lon_offset: self.params.lon_offset,
            date_granularity: self.params.date_granularity,
        }
    }

    fn tag_indices(&mut self, tags: &[Tag]) -> (Vec<u32>, Vec<u32>) {
        tags.iter()
            .map(|t| (self.intern(&t.key), self.intern(&t.value)))
            .unzip()
    }

    fn raw_timestamp(&self, meta: &Metadata) -> Option<i64> {
        meta.has_timestamp()
            .then(|| meta.timestamp / i64::from(self.params.date_granularity))
    }

    fn info(&mut self, meta: &Metadata) -> Info {
        Info {
            version: Some(meta.version),
            timestamp: self.raw_timestamp(meta),
            changeset: Some(meta.changeset),
            uid: Some(meta.uid),
            user_sid: Some(self.intern(&meta.username)),
            visible: Some(meta.visible),
        }
    }

    fn dense_info(&mut self, metas: &[&Metadata]) -> DenseInfo {
        let timestamps: Option<Vec<i64>> = metas.iter().map(|m| self.raw_timestamp(m)).collect();
        let user_sids: Vec<i64> = metas
            .iter()
            .map(|m| i64::from(self.intern(&m.username)))
            .collect();
        DenseInfo {
            version: Some(metas.iter().map(|m| m.version).collect()),
            timestamp: timestamps.map(deltas),
            changeset: Some(deltas(metas.iter().map(|m| m.changeset))),
            uid: Some(narrow(deltas(metas.iter().map(|m| i64::from(m.uid))))),
            user_sid: Some(narrow(deltas(user_sids))),
            visible: Some(metas.iter().map(|m| m.visible).collect()),
        }
    }
}

/// Raw coordinate for `degrees` at the given scaling.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_raw(degrees: f64, granularity: i32, offset: i64) -> i64 {
    if degrees.is_nan() {
        return COORDINATE_ABSENT;
    }
    #[allow(clippy::cast_precision_loss)]
    let nanodegrees = degrees * 1e9 - offset as f64;
    (nanodegrees / f64::from(granularity)).round() as i64
}

/// Delta-code a sequence: each output is the difference from the
/// previous input, the first relative to zero.
pub fn deltas(values: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut prev = 0i64;
    values
        .into_iter()
        .map(|v| {
            let d = v.wrapping_sub(prev);
            prev = v;
            d
        })
        .collect()
}

fn sid(index: u32) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(values: Vec<i64>) -> Vec<i32> {
    values.into_iter().map(|v| v as i32).collect()
}
