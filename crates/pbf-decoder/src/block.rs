use pbf_types::osmformat::{DenseNodes, PrimitiveBlock, PrimitiveGroup};
use pbf_types::{Entity, Point};
use tracing::trace;

use crate::config::DecoderConfig;
use crate::dense::DenseBatch;
use crate::error::DecodeError;
use crate::record::RecordDecoder;
use crate::scalar::BlockParams;
use crate::sink::EntitySink;
use crate::string_table::StringTable;

/// Number of entities of each type produced from a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub points: usize,
    pub paths: usize,
    pub groups: usize,
}

impl EntityCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.points + self.paths + self.groups
    }

    fn count(&mut self, entity: &Entity) {
        match entity {
            Entity::Point(_) => self.points += 1,
            Entity::Path(_) => self.paths += 1,
            Entity::Group(_) => self.groups += 1,
        }
    }
}

/// Decodes the entities of one data block.
///
/// Created per block: it captures the block's scaling parameters and
/// decodes its string table once, then walks the groups. Within a group
/// entities come out as points, dense points, paths, then groups, each in
/// wire order.
///
/// A decoder owns no state shared with other blocks, so separate blocks
/// can be decoded on separate threads, each with its own decoder.
///
/// ```rust
/// use pbf_decoder::{BlockDecoder, DecoderConfig};
/// use pbf_types::osmformat::{PrimitiveBlock, PrimitiveGroup, StringTable, Way};
///
/// let block = PrimitiveBlock {
///     string_table: StringTable { s: vec![b"".to_vec()] },
///     groups: vec![PrimitiveGroup {
///         ways: vec![Way { id: 1, refs: vec![5, -2, 10], ..Way::default() }],
///         ..PrimitiveGroup::default()
///     }],
///     ..PrimitiveBlock::default()
/// };
/// let entities = BlockDecoder::new(&block, &DecoderConfig::default()).decode().unwrap();
/// assert_eq!(entities.len(), 1);
/// ```
#[derive(Debug)]
pub struct BlockDecoder<'b> {
    block: &'b PrimitiveBlock,
    params: BlockParams,
    strings: StringTable,
    fetch_metadata: bool,
}

impl<'b> BlockDecoder<'b> {
    #[must_use]
    pub fn new(block: &'b PrimitiveBlock, config: &DecoderConfig) -> Self {
        Self {
            block,
            params: BlockParams::from_block(block),
            strings: StringTable::new(&block.string_table),
            fetch_metadata: config.fetch_metadata,
        }
    }

    #[must_use]
    pub fn params(&self) -> &BlockParams {
        &self.params
    }

    #[must_use]
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Decoder for individual records of this block.
    #[must_use]
    pub fn records(&self) -> RecordDecoder<'_> {
        RecordDecoder::new(&self.params, &self.strings, self.fetch_metadata)
    }

    /// Iterator over one dense batch of this block.
    ///
    /// # Errors
    ///
    /// [`DecodeError::LengthMismatch`] for misaligned columns.
    pub fn dense<'a>(&'a self, dense: &'a DenseNodes) -> Result<DenseBatch<'a>, DecodeError> {
        DenseBatch::new(dense, &self.params, &self.strings, self.fetch_metadata)
    }

    /// Materialize every point of a dense batch, in order.
    ///
    /// # Errors
    ///
    /// As for [`DenseBatch`]; nothing is returned on failure.
    pub fn dense_points(&self, dense: &DenseNodes) -> Result<Vec<Point>, DecodeError> {
        self.dense(dense)?.collect()
    }

    /// Push every point of a dense batch to `sink` as it is decoded.
    ///
    /// # Errors
    ///
    /// As for [`DenseBatch`]. Points decoded before the failure have
    /// already reached the sink.
    pub fn dense_into<S: EntitySink + ?Sized>(
        &self,
        dense: &DenseNodes,
        sink: &mut S,
    ) -> Result<usize, DecodeError> {
        let mut count = 0;
        for point in self.dense(dense)? {
            sink.handle(Entity::Point(point?));
            count += 1;
        }
        Ok(count)
    }

    /// Decode every group, pushing entities to `sink` as they are produced.
    ///
    /// # Errors
    ///
    /// Stops at the first malformed record. Entities decoded before it
    /// have already reached the sink; use [`decode`](Self::decode) when a
    /// failed block must yield nothing.
    pub fn decode_into<S: EntitySink + ?Sized>(&self, sink: &mut S) -> Result<EntityCounts, DecodeError> {
        let mut counts = EntityCounts::default();
        let mut counting = |entity: Entity| {
            counts.count(&entity);
            sink.handle(entity);
        };
        for (index, group) in self.block.groups.iter().enumerate() {
            trace!(
                group = index,
                nodes = group.nodes.len(),
                dense = group.dense.as_ref().map_or(0, DenseNodes::len),
                ways = group.ways.len(),
                relations = group.relations.len(),
                "decoding group"
            );
            self.decode_group(group, &mut counting)?;
        }
        Ok(counts)
    }

    /// Decode every group into an ordered list.
    ///
    /// # Errors
    ///
    /// As for [`decode_into`](Self::decode_into); no partial list is
    /// returned.
    pub fn decode(&self) -> Result<Vec<Entity>, DecodeError> {
        let mut entities: Vec<Entity> = Vec::new();
        self.decode_into(&mut entities)?;
        Ok(entities)
    }

    fn decode_group(&self, group: &PrimitiveGroup, emit: &mut impl FnMut(Entity)) -> Result<(), DecodeError> {
        let records = self.records();
        for node in &group.nodes {
            emit(Entity::Point(records.point(node)?));
        }
        if let Some(dense) = &group.dense {
            for point in self.dense(dense)? {
                emit(Entity::Point(point?));
            }
        }
        for way in &group.ways {
            emit(Entity::Path(records.path(way)?));
        }
        for relation in &group.relations {
            emit(Entity::Group(records.group(relation)?));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pbf_types::osmformat::{DenseInfo, Info, Node, Relation, StringTable as RawStrings, Way};
    use pbf_types::{MemberType, Tag};

    use super::*;
    use crate::sink::FnSink;

    fn table() -> RawStrings {
        RawStrings {
            s: ["", "name", "Main St", "amenity", "cafe", "outer", "carol"]
                .iter()
                .map(|s| s.as_bytes().to_vec())
                .collect(),
        }
    }

    fn mixed_block() -> PrimitiveBlock {
        PrimitiveBlock {
            string_table: table(),
            groups: vec![
                PrimitiveGroup {
                    nodes: vec![Node {
                        id: 1,
                        keys: vec![3],
                        vals: vec![4],
                        info: Some(Info {
                            version: Some(2),
                            timestamp: Some(1_600_000_000),
                            user_sid: Some(6),
                            ..Info::default()
                        }),
                        lat: 515_000_000,
                        lon: -1_000_000,
                    }],
                    ..PrimitiveGroup::default()
                },
                PrimitiveGroup {
                    dense: Some(DenseNodes {
                        id: vec![10, 1],
                        dense_info: Some(DenseInfo {
                            version: Some(vec![1, 1]),
                            ..DenseInfo::default()
                        }),
                        lat: vec![0, 10],
                        lon: vec![0, 10],
                        keys_vals: vec![3, 4, 0, 0],
                    }),
                    ..PrimitiveGroup::default()
                },
                PrimitiveGroup {
                    ways: vec![Way {
                        id: 100,
                        keys: vec![1],
                        vals: vec![2],
                        refs: vec![10, 1],
                        ..Way::default()
                    }],
                    relations: vec![Relation {
                        id: 1000,
                        roles_sid: vec![5],
                        memids: vec![100],
                        types: vec![1],
                        ..Relation::default()
                    }],
                    ..PrimitiveGroup::default()
                },
            ],
            ..PrimitiveBlock::default()
        }
    }

    #[test]
    fn decodes_groups_in_order() {
        let block = mixed_block();
        let entities = BlockDecoder::new(&block, &DecoderConfig::default()).decode().unwrap();
        let ids: Vec<(MemberType, i64)> = entities.iter().map(|e| (e.entity_type(), e.id())).collect();
        assert_eq!(
            ids,
            vec![
                (MemberType::Point, 1),
                (MemberType::Point, 10),
                (MemberType::Point, 11),
                (MemberType::Path, 100),
                (MemberType::Group, 1000),
            ]
        );
        let Entity::Point(first) = &entities[0] else {
            panic!("expected a point");
        };
        let meta = first.metadata.as_ref().unwrap();
        assert_eq!(meta.timestamp, 1_600_000_000_000);
        assert_eq!(meta.username, "carol");
        assert_eq!(entities[1].tags(), &[Tag::new("amenity", "cafe")]);
        assert!(entities[2].tags().is_empty());
    }

    #[test]
    fn sink_and_vec_agree() {
        let block = mixed_block();
        let decoder = BlockDecoder::new(&block, &DecoderConfig::default());
        let collected = decoder.decode().unwrap();

        let mut pushed = Vec::new();
        let counts = decoder
            .decode_into(&mut FnSink(|e: Entity| pushed.push(e)))
            .unwrap();
        assert_eq!(collected, pushed);
        assert_eq!(
            counts,
            EntityCounts {
                points: 3,
                paths: 1,
                groups: 1
            }
        );
    }

    #[test]
    fn dense_modes_agree() {
        let block = mixed_block();
        let decoder = BlockDecoder::new(&block, &DecoderConfig::default());
        let dense = block.groups[1].dense.as_ref().unwrap();

        let listed = decoder.dense_points(dense).unwrap();
        let mut pushed: Vec<Entity> = Vec::new();
        let n = decoder.dense_into(dense, &mut pushed).unwrap();
        assert_eq!(n, 2);
        let pushed: Vec<Point> = pushed
            .into_iter()
            .map(|e| match e {
                Entity::Point(p) => p,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(listed, pushed);
    }

    #[test]
    fn metadata_off_strips_everything() {
        let block = mixed_block();
        let config = DecoderConfig::default().with_metadata(false);
        let entities = BlockDecoder::new(&block, &config).decode().unwrap();
        assert!(entities.iter().all(|e| e.metadata().is_none()));
    }

    #[test]
    fn failed_block_returns_no_entities() {
        let mut block = mixed_block();
        block.groups[2].relations[0].roles_sid = vec![77];
        let result = BlockDecoder::new(&block, &DecoderConfig::default()).decode();
        assert!(matches!(result, Err(DecodeError::StringIndexOutOfRange { index: 77, .. })));
    }
}
