//! The canonical sample dataset: a small neighbourhood with a cafe, a
//! footpath and a multipolygon, shared by the conformance tests, the
//! benchmarks and `generate_fixtures`.

use std::io;

use pbf_types::osmformat::{HeaderBBox, HeaderBlock};
use pbf_types::{Group, Member, MemberType, Metadata, Path, Point, Tag};

use crate::builder::BlockBuilder;
use crate::fixture::{Codec, PbfWriter};

pub const WRITING_PROGRAM: &str = "pbf-tests";

#[must_use]
pub fn metadata(version: i32, timestamp: i64, uid: i32, username: &str, changeset: i64) -> Metadata {
    Metadata {
        version,
        timestamp,
        uid,
        username: username.to_string(),
        changeset,
        visible: true,
    }
}

#[must_use]
pub fn points() -> Vec<Point> {
    vec![
        Point {
            id: 100,
            lat: 51.5,
            lon: -0.1,
            tags: vec![Tag::new("amenity", "cafe"), Tag::new("name", "Corner")],
            metadata: Some(metadata(1, 1_600_000_000_000, 7, "alice", 500)),
        },
        Point {
            id: 101,
            lat: 51.5001,
            lon: -0.1002,
            tags: Vec::new(),
            metadata: Some(metadata(3, 1_600_000_060_000, 7, "alice", 501)),
        },
        Point {
            id: 105,
            lat: 51.4999,
            lon: -0.0998,
            tags: vec![Tag::new("highway", "crossing")],
            metadata: Some(metadata(1, 1_600_000_120_000, 9, "bob", 640)),
        },
    ]
}

#[must_use]
pub fn paths() -> Vec<Path> {
    vec![Path {
        id: 200,
        refs: vec![100, 101, 105, 100],
        tags: vec![Tag::new("highway", "footway")],
        metadata: Some(metadata(2, 1_600_000_180_000, 9, "bob", 640)),
    }]
}

#[must_use]
pub fn groups() -> Vec<Group> {
    vec![Group {
        id: 300,
        members: vec![
            Member {
                id: 200,
                member_type: MemberType::Path,
                role: "outer".into(),
            },
            Member {
                id: 105,
                member_type: MemberType::Point,
                role: String::new(),
            },
        ],
        tags: vec![Tag::new("type", "multipolygon")],
        metadata: None,
    }]
}

#[must_use]
pub fn header() -> HeaderBlock {
    HeaderBlock {
        bbox: Some(HeaderBBox {
            left: -200_000_000,
            right: 0,
            top: 51_600_000_000,
            bottom: 51_400_000_000,
        }),
        required_features: vec!["OsmSchema-V0.6".into(), "DenseNodes".into()],
        optional_features: vec!["Sort.Type_then_ID".into()],
        writing_program: Some(WRITING_PROGRAM.into()),
        ..HeaderBlock::default()
    }
}

/// Header block, then one block of dense points, then one block holding
/// the path and the group.
///
/// # Errors
///
/// Propagates compressor I/O errors.
pub fn file(codec: Codec) -> io::Result<Vec<u8>> {
    let dense = BlockBuilder::new().dense_points(&points()).build();
    let records = BlockBuilder::new().paths(&paths()).groups(&groups()).build();
    Ok(PbfWriter::new(codec)
        .header(&header())?
        .data(&dense)?
        .data(&records)?
        .finish())
}

/// A larger synthetic extract for benchmarks: `blocks` data blocks of
/// `per_block` dense points each, every tenth point tagged.
///
/// # Errors
///
/// Propagates compressor I/O errors.
pub fn grid(codec: Codec, blocks: usize, per_block: usize) -> io::Result<Vec<u8>> {
    let mut writer = PbfWriter::new(codec).header(&header())?;
    let mut next_id = 1i64;
    for _ in 0..blocks {
        let batch: Vec<Point> = (0..per_block)
            .map(|i| {
                let id = next_id;
                next_id += 1;
                #[allow(clippy::cast_precision_loss)]
                let step = (id % 1000) as f64 * 1e-4;
                Point {
                    id,
                    lat: 51.4 + step,
                    lon: -0.2 + step,
                    tags: if i % 10 == 0 {
                        vec![Tag::new("amenity", "bench")]
                    } else {
                        Vec::new()
                    },
                    metadata: Some(metadata(1, 1_600_000_000_000 + id * 1000, 7, "alice", 500)),
                }
            })
            .collect();
        writer = writer.data(&BlockBuilder::new().dense_points(&batch).build())?;
    }
    Ok(writer.finish())
}
