use pbf_types::osmformat::{Info, Node, Relation, Way};
use pbf_types::{Group, Member, MemberType, Metadata, Path, Point, Tag};

use crate::error::DecodeError;
use crate::scalar::BlockParams;
use crate::string_table::StringTable;

/// Decodes individual (non-batched) point, path and group records.
///
/// Holds only borrowed, block-scoped state. Every delta accumulator lives
/// in a local of the method that needs it, so decoding one record never
/// affects another.
#[derive(Clone, Copy, Debug)]
pub struct RecordDecoder<'a> {
    params: &'a BlockParams,
    strings: &'a StringTable,
    fetch_metadata: bool,
}

impl<'a> RecordDecoder<'a> {
    #[must_use]
    pub fn new(params: &'a BlockParams, strings: &'a StringTable, fetch_metadata: bool) -> Self {
        Self {
            params,
            strings,
            fetch_metadata,
        }
    }

    /// # Errors
    ///
    /// Fails on mismatched key/value arrays or unresolvable string indices.
    pub fn point(&self, node: &Node) -> Result<Point, DecodeError> {
        Ok(Point {
            id: node.id,
            lat: self.params.latitude(node.lat),
            lon: self.params.longitude(node.lon),
            tags: self.tags(&node.keys, &node.vals)?,
            metadata: self.metadata(node.info.as_ref())?,
        })
    }

    /// Ref deltas are summed from zero for each path on its own.
    ///
    /// # Errors
    ///
    /// Fails on mismatched key/value arrays or unresolvable string indices.
    pub fn path(&self, way: &Way) -> Result<Path, DecodeError> {
        let mut node_id = 0i64;
        let refs = way
            .refs
            .iter()
            .map(|delta| {
                node_id = node_id.wrapping_add(*delta);
                node_id
            })
            .collect();

        Ok(Path {
            id: way.id,
            refs,
            tags: self.tags(&way.keys, &way.vals)?,
            metadata: self.metadata(way.info.as_ref())?,
        })
    }

    /// Member id deltas accumulate across the whole member list of this
    /// group.
    ///
    /// # Errors
    ///
    /// [`DecodeError::LengthMismatch`] unless `memids`, `roles_sid` and
    /// `types` have equal lengths; otherwise as for [`point`](Self::point).
    pub fn group(&self, relation: &Relation) -> Result<Group, DecodeError> {
        let count = relation.memids.len();
        check_len("roles_sid", count, relation.roles_sid.len())?;
        check_len("types", count, relation.types.len())?;

        let mut member_id = 0i64;
        let mut members = Vec::with_capacity(count);
        for ((delta, role), code) in relation
            .memids
            .iter()
            .zip(&relation.roles_sid)
            .zip(&relation.types)
        {
            member_id = member_id.wrapping_add(*delta);
            members.push(Member {
                id: member_id,
                member_type: MemberType::from_code(*code),
                role: self.strings.get(i64::from(*role))?.to_owned(),
            });
        }

        Ok(Group {
            id: relation.id,
            members,
            tags: self.tags(&relation.keys, &relation.vals)?,
            metadata: self.metadata(relation.info.as_ref())?,
        })
    }

    fn tags(&self, keys: &[u32], vals: &[u32]) -> Result<Vec<Tag>, DecodeError> {
        check_len("vals", keys.len(), vals.len())?;
        keys.iter()
            .zip(vals)
            .map(|(k, v)| {
                Ok(Tag::new(
                    self.strings.get(i64::from(*k))?,
                    self.strings.get(i64::from(*v))?,
                ))
            })
            .collect()
    }

    fn metadata(&self, info: Option<&Info>) -> Result<Option<Metadata>, DecodeError> {
        let Some(info) = info.filter(|_| self.fetch_metadata) else {
            return Ok(None);
        };
        let username = self.strings.user(i64::from(info.user_sid.unwrap_or(0)))?.to_owned();
        Ok(Some(Metadata {
            version: info.version.unwrap_or(-1),
            timestamp: self.params.optional_timestamp_ms(info.timestamp),
            uid: info.uid.unwrap_or(0),
            username,
            changeset: info.changeset.unwrap_or(0),
            visible: info.visible.unwrap_or(true),
        }))
    }
}

pub(crate) fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), DecodeError> {
    if expected == found {
        Ok(())
    } else {
        Err(DecodeError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}
