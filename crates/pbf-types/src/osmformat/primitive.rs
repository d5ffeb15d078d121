use pbf_wire::FieldReader;
use pbf_wire::fields::encode_bytes_field;

use super::encode_int_field;
use crate::error::TypeError;
use crate::osmformat::{DenseNodes, Node, Relation, Way};

/// Default nanodegrees per coordinate unit.
pub const DEFAULT_GRANULARITY: i32 = 100;

/// Default milliseconds per timestamp unit.
pub const DEFAULT_DATE_GRANULARITY: i32 = 1000;

/// Raw string table of one block: index-addressable byte strings.
///
/// Entry 0 is conventionally empty; dense tag lists use index 0 as their
/// delimiter, so it never names a real key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringTable {
    pub s: Vec<Vec<u8>>,
}

impl StringTable {
    /// # Errors
    ///
    /// [`TypeError::Wire`] on malformed bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut table = Self::default();
        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            if field.number == 1 {
                table.s.push(field.as_bytes()?.to_vec());
            }
        }
        Ok(table)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for entry in &self.s {
            encode_bytes_field(&mut buf, 1, entry);
        }
        buf
    }
}

/// One group inside a primitive block.
///
/// Writers put exactly one kind of entity in a group, but the message
/// allows all four; the decoder handles whatever is present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimitiveGroup {
    pub nodes: Vec<Node>,
    pub dense: Option<DenseNodes>,
    pub ways: Vec<Way>,
    pub relations: Vec<Relation>,
}

impl PrimitiveGroup {
    /// # Errors
    ///
    /// Propagates any error of the nested messages.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut group = Self::default();
        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => group.nodes.push(Node::decode(field.as_bytes()?)?),
                2 => group.dense = Some(DenseNodes::decode(field.as_bytes()?)?),
                3 => group.ways.push(Way::decode(field.as_bytes()?)?),
                4 => group.relations.push(Relation::decode(field.as_bytes()?)?),
                // 5 = changesets, not decoded
                _ => {}
            }
        }
        Ok(group)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for node in &self.nodes {
            encode_bytes_field(&mut buf, 1, &node.encode());
        }
        if let Some(dense) = &self.dense {
            encode_bytes_field(&mut buf, 2, &dense.encode());
        }
        for way in &self.ways {
            encode_bytes_field(&mut buf, 3, &way.encode());
        }
        for relation in &self.relations {
            encode_bytes_field(&mut buf, 4, &relation.encode());
        }
        buf
    }
}

/// Decompressed body of a data block.
///
/// ```text
/// ┌──────────┬───────────┬──────────────────┬───────────────────────┐
/// │ Field    │ Wire Type │ Name             │ Default               │
/// ├──────────┼───────────┼──────────────────┼───────────────────────┤
/// │ 1        │ Len       │ stringtable      │ required              │
/// │ 2        │ Len       │ primitivegroup   │ repeated              │
/// │ 17       │ Varint    │ granularity      │ 100                   │
/// │ 18       │ Varint    │ date_granularity │ 1000                  │
/// │ 19       │ Varint    │ lat_offset       │ 0                     │
/// │ 20       │ Varint    │ lon_offset       │ 0                     │
/// └──────────┴───────────┴──────────────────┴───────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveBlock {
    pub string_table: StringTable,
    pub groups: Vec<PrimitiveGroup>,
    pub granularity: i32,
    pub lat_offset: i64,
    pub lon_offset: i64,
    pub date_granularity: i32,
}

impl Default for PrimitiveBlock {
    fn default() -> Self {
        Self {
            string_table: StringTable::default(),
            groups: Vec::new(),
            granularity: DEFAULT_GRANULARITY,
            lat_offset: 0,
            lon_offset: 0,
            date_granularity: DEFAULT_DATE_GRANULARITY,
        }
    }
}

impl PrimitiveBlock {
    /// # Errors
    ///
    /// [`TypeError::MissingRequiredField`] without a string table;
    /// otherwise propagates errors of the nested messages.
    pub fn decode(buf: &[u8]) -> Result<Self, TypeError> {
        let mut string_table = None;
        let mut block = Self::default();

        let mut reader = FieldReader::new(buf);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => string_table = Some(StringTable::decode(field.as_bytes()?)?),
                2 => block.groups.push(PrimitiveGroup::decode(field.as_bytes()?)?),
                17 => block.granularity = field.as_i32()?,
                18 => block.date_granularity = field.as_i32()?,
                19 => block.lat_offset = field.as_i64()?,
                20 => block.lon_offset = field.as_i64()?,
                _ => {}
            }
        }

        block.string_table = string_table.ok_or(TypeError::MissingRequiredField {
            message: "PrimitiveBlock",
            field: "stringtable",
        })?;
        Ok(block)
    }

    /// Scalar parameters equal to their defaults are omitted.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_bytes_field(&mut buf, 1, &self.string_table.encode());
        for group in &self.groups {
            encode_bytes_field(&mut buf, 2, &group.encode());
        }
        if self.granularity != DEFAULT_GRANULARITY {
            encode_int_field(&mut buf, 17, i64::from(self.granularity));
        }
        if self.date_granularity != DEFAULT_DATE_GRANULARITY {
            encode_int_field(&mut buf, 18, i64::from(self.date_granularity));
        }
        if self.lat_offset != 0 {
            encode_int_field(&mut buf, 19, self.lat_offset);
        }
        if self.lon_offset != 0 {
            encode_int_field(&mut buf, 20, self.lon_offset);
        }
        buf
    }
}
