//! Edge case integration tests for the PBF decoder.
//!
//! Four families of inputs that real files (or hostile ones) produce:
//!
//! - **Stream shape**: unknown block kinds, empty streams, truncation and
//!   oversized frames. Unknown kinds are skipped; a broken frame ends the
//!   stream with an I/O or format error.
//!
//! - **Payloads**: unsupported or corrupt compression and lying `raw_size`
//!   values. These fail the one block and leave the reader usable.
//!
//! - **Dense columns**: the coordinate sentinel, absent info columns and
//!   a tag cursor that runs off the end.
//!
//! - **Records**: bad string indices, misaligned member arrays, unknown
//!   member type codes and non-UTF-8 strings.

use pbf_decoder::{BlockDecoder, DecodeError, DecodedBlock, DecoderConfig, ErrorKind, FnSink, PbfReader};
use pbf_tests::{BlockBuilder, Codec, PbfWriter, compress_blob, samples};
use pbf_types::osmformat::{DenseInfo, DenseNodes, PrimitiveBlock, PrimitiveGroup, Relation, StringTable, Way};
use pbf_types::{Blob, BlobData, Entity, MemberType, Point};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn dense_block(dense: DenseNodes, strings: &[&str]) -> PrimitiveBlock {
    PrimitiveBlock {
        string_table: StringTable {
            s: strings.iter().map(|s| s.as_bytes().to_vec()).collect(),
        },
        groups: vec![PrimitiveGroup {
            dense: Some(dense),
            ..PrimitiveGroup::default()
        }],
        ..PrimitiveBlock::default()
    }
}

fn decode(block: &PrimitiveBlock) -> Result<Vec<Entity>, DecodeError> {
    BlockDecoder::new(block, &DecoderConfig::default()).decode()
}

fn single_point(block: &PrimitiveBlock) -> Point {
    match decode(block).unwrap().remove(0) {
        Entity::Point(p) => p,
        other => panic!("expected a point, got {other:?}"),
    }
}

fn data_frame_with(blob: &Blob) -> Vec<u8> {
    PbfWriter::new(Codec::Raw)
        .frame("OSMData", blob)
        .unwrap()
        .finish()
}

fn first_error(bytes: &[u8]) -> DecodeError {
    PbfReader::new(bytes, DecoderConfig::default())
        .find_map(Result::err)
        .expect("stream should contain an error")
}

// ── Stream shape ──────────────────────────────────────────────────────────────

#[test]
fn empty_stream_has_no_blocks() {
    assert_eq!(PbfReader::new(std::io::empty(), DecoderConfig::default()).count(), 0);
}

#[test]
fn unknown_block_kind_between_data_blocks() {
    let block = BlockBuilder::new().paths(&samples::paths()).build();
    let bytes = PbfWriter::new(Codec::Zlib)
        .data(&block)
        .unwrap()
        .frame("OSMIndex", &compress_blob(b"\x01\x02\x03", Codec::Raw).unwrap())
        .unwrap()
        .data(&block)
        .unwrap()
        .finish();

    let blocks: Vec<DecodedBlock> = PbfReader::new(bytes.as_slice(), DecoderConfig::default())
        .map(Result::unwrap)
        .collect();
    assert_eq!(blocks.len(), 3);
    assert_eq!(
        blocks[1],
        DecodedBlock::Skipped {
            kind: "OSMIndex".into()
        }
    );
    assert!(matches!(blocks[2], DecodedBlock::Data { ref entities, .. } if entities.len() == 1));
}

#[test]
fn truncated_file_ends_with_io_error() {
    let mut bytes = samples::file(Codec::Zlib).unwrap();
    bytes.truncate(bytes.len() - 5);

    let results: Vec<_> = PbfReader::new(bytes.as_slice(), DecoderConfig::default()).collect();
    assert_eq!(results.len(), 3);
    assert!(results[..2].iter().all(Result::is_ok));
    assert_eq!(results[2].as_ref().unwrap_err().kind(), ErrorKind::Io);
}

#[test]
fn oversized_frame_refused() {
    let bytes = samples::file(Codec::Raw).unwrap();
    let config = DecoderConfig::default().with_max_blob_size(8);
    let err = PbfReader::new(bytes.as_slice(), config).next().unwrap().unwrap_err();
    assert!(matches!(err, DecodeError::BlobTooLarge { limit: 8, .. }));
}

#[test]
fn declared_raw_size_over_limit_refused() {
    let mut blob = compress_blob(&vec![7u8; 4096], Codec::Zstd).unwrap();
    blob.raw_size = Some(u32::MAX);
    let err = first_error(&data_frame_with(&blob));
    assert!(matches!(err, DecodeError::BlobTooLarge { .. }));
}

#[test]
fn unsupported_required_feature_fails_only_the_header() {
    let mut header = samples::header();
    header.required_features.push("LocationsOnWays".into());
    let bytes = PbfWriter::new(Codec::Raw)
        .header(&header)
        .unwrap()
        .data(&BlockBuilder::new().paths(&samples::paths()).build())
        .unwrap()
        .finish();

    let mut reader = PbfReader::new(bytes.as_slice(), DecoderConfig::default());
    let err = reader.next().unwrap().unwrap_err();
    assert!(matches!(&err, DecodeError::UnsupportedFeature(f) if f == "LocationsOnWays"));
    assert!(matches!(reader.next(), Some(Ok(DecodedBlock::Data { .. }))));
}

// ── Payloads ──────────────────────────────────────────────────────────────────

#[test]
fn lzma_and_bzip2_are_unsupported() {
    for data in [BlobData::Lzma(vec![1, 2, 3]), BlobData::Bzip2(vec![1, 2, 3])] {
        let blob = Blob {
            raw_size: Some(3),
            data,
        };
        let err = first_error(&data_frame_with(&blob));
        assert!(matches!(err, DecodeError::UnsupportedCompression(_)));
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}

#[test]
fn compressed_payload_needs_raw_size() {
    let mut blob = compress_blob(b"payload", Codec::Lz4).unwrap();
    blob.raw_size = None;
    let err = first_error(&data_frame_with(&blob));
    assert!(matches!(err, DecodeError::MissingRawSize { compression: "lz4" }));
}

#[test]
fn raw_size_larger_than_payload() {
    let block = BlockBuilder::new().paths(&samples::paths()).build().encode();
    for codec in [Codec::Zlib, Codec::Lz4, Codec::Zstd] {
        let mut blob = compress_blob(&block, codec).unwrap();
        blob.raw_size = blob.raw_size.map(|n| n + 10);
        let err = first_error(&data_frame_with(&blob));
        assert_eq!(err.kind(), ErrorKind::Decompression, "{codec}: {err}");
    }
}

#[test]
fn raw_size_smaller_than_payload() {
    let block = BlockBuilder::new().paths(&samples::paths()).build().encode();
    for codec in [Codec::Zlib, Codec::Lz4, Codec::Zstd] {
        let mut blob = compress_blob(&block, codec).unwrap();
        blob.raw_size = blob.raw_size.map(|n| n - 4);
        let err = first_error(&data_frame_with(&blob));
        assert_eq!(err.kind(), ErrorKind::Decompression, "{codec}: {err}");
    }
}

#[test]
fn corrupt_zlib_stream() {
    let blob = Blob {
        raw_size: Some(64),
        data: BlobData::Zlib(vec![0x78, 0x9c, 0xff, 0xff, 0xff, 0xff]),
    };
    let err = first_error(&data_frame_with(&blob));
    assert_eq!(err.kind(), ErrorKind::Decompression);
}

#[test]
fn corrupt_block_does_not_stop_the_reader() {
    let bad = Blob {
        raw_size: Some(16),
        data: BlobData::Zstd(vec![0u8; 16]),
    };
    let bytes = PbfWriter::new(Codec::Zstd)
        .frame("OSMData", &bad)
        .unwrap()
        .data(&BlockBuilder::new().paths(&samples::paths()).build())
        .unwrap()
        .finish();

    let results: Vec<_> = PbfReader::new(bytes.as_slice(), DecoderConfig::default()).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    assert!(results[1].is_ok());
}

// ── Dense columns ─────────────────────────────────────────────────────────────

#[test]
fn sentinel_latitude_is_nan_and_longitude_kept() {
    let dense = DenseNodes {
        id: vec![1],
        lat: vec![i64::from(i32::MAX)],
        lon: vec![1_000],
        ..DenseNodes::default()
    };
    let point = single_point(&dense_block(dense, &[""]));
    assert!(point.lat.is_nan());
    assert!((point.lon - 1e-4).abs() < 1e-12);
}

#[test]
fn sentinel_reached_through_deltas() {
    let dense = DenseNodes {
        id: vec![1, 1],
        lat: vec![10, i64::from(i32::MAX) - 10],
        lon: vec![0, 0],
        ..DenseNodes::default()
    };
    let points = decode(&dense_block(dense, &[""])).unwrap();
    let Entity::Point(second) = &points[1] else {
        panic!("expected a point");
    };
    assert!(second.lat.is_nan());
    assert_eq!(second.lon, 0.0);
}

#[test]
fn absent_uid_column_with_moving_changesets() {
    let dense = DenseNodes {
        id: vec![1, 1, 1],
        dense_info: Some(DenseInfo {
            version: Some(vec![1, 2, 3]),
            changeset: Some(vec![100, 5, 5]),
            ..DenseInfo::default()
        }),
        lat: vec![0, 0, 0],
        lon: vec![0, 0, 0],
        keys_vals: Vec::new(),
    };
    let entities = decode(&dense_block(dense, &[""])).unwrap();
    let metas: Vec<_> = entities.iter().map(|e| e.metadata().unwrap().clone()).collect();

    assert_eq!(metas.iter().map(|m| m.changeset).collect::<Vec<_>>(), vec![100, 105, 110]);
    assert!(metas.iter().all(|m| m.uid == 0 && m.username.is_empty()));
    assert!(metas.iter().all(|m| !m.has_timestamp() && m.visible));
}

#[test]
fn tag_cursor_running_off_the_end() {
    let dense = DenseNodes {
        id: vec![1, 1],
        lat: vec![0, 0],
        lon: vec![0, 0],
        keys_vals: vec![1, 2, 0, 1],
        ..DenseNodes::default()
    };
    let block = dense_block(dense, &["", "k", "v"]);

    let mut delivered = Vec::new();
    let err = BlockDecoder::new(&block, &DecoderConfig::default())
        .decode_into(&mut FnSink(|e: Entity| delivered.push(e.id())))
        .unwrap_err();
    assert!(matches!(err, DecodeError::TagCursorOutOfBounds { .. }));
    assert_eq!(delivered, vec![1]);
    assert!(decode(&block).is_err());
}

#[test]
fn misaligned_dense_column() {
    let dense = DenseNodes {
        id: vec![1, 1],
        dense_info: Some(DenseInfo {
            timestamp: Some(vec![5]),
            ..DenseInfo::default()
        }),
        lat: vec![0, 0],
        lon: vec![0, 0],
        keys_vals: Vec::new(),
    };
    let err = decode(&dense_block(dense, &[""])).unwrap_err();
    assert!(matches!(err, DecodeError::LengthMismatch { expected: 2, found: 1, .. }));
}

// ── Records ───────────────────────────────────────────────────────────────────

#[test]
fn bad_string_index_fails_block_but_sink_keeps_earlier_entities() {
    let block = BlockBuilder::new()
        .paths(&samples::paths())
        .raw_group(PrimitiveGroup {
            ways: vec![Way {
                id: 2,
                keys: vec![999],
                vals: vec![0],
                ..Way::default()
            }],
            ..PrimitiveGroup::default()
        })
        .build();

    let mut delivered: Vec<Entity> = Vec::new();
    let err = BlockDecoder::new(&block, &DecoderConfig::default())
        .decode_into(&mut delivered)
        .unwrap_err();
    assert!(matches!(err, DecodeError::StringIndexOutOfRange { index: 999, .. }));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(delivered.len(), 1);

    assert!(decode(&block).is_err());
}

#[test]
fn member_arrays_must_align() {
    let block = BlockBuilder::new()
        .raw_group(PrimitiveGroup {
            relations: vec![Relation {
                id: 1,
                roles_sid: vec![0, 0],
                memids: vec![1, 1],
                types: vec![0],
                ..Relation::default()
            }],
            ..PrimitiveGroup::default()
        })
        .build();
    assert!(matches!(decode(&block), Err(DecodeError::LengthMismatch { .. })));
}

#[test]
fn unknown_member_type_code_reads_as_point() {
    let block = BlockBuilder::new()
        .raw_group(PrimitiveGroup {
            relations: vec![Relation {
                id: 1,
                roles_sid: vec![0],
                memids: vec![50],
                types: vec![9],
                ..Relation::default()
            }],
            ..PrimitiveGroup::default()
        })
        .build();
    let entities = decode(&block).unwrap();
    let Entity::Group(group) = &entities[0] else {
        panic!("expected a group");
    };
    assert_eq!(group.members[0].member_type, MemberType::Point);
    assert_eq!(group.members[0].id, 50);
}

#[test]
fn invalid_utf8_strings_are_replaced() {
    let block = PrimitiveBlock {
        string_table: StringTable {
            s: vec![Vec::new(), b"name".to_vec(), vec![0xff, b'x']],
        },
        groups: vec![PrimitiveGroup {
            ways: vec![Way {
                id: 1,
                keys: vec![1],
                vals: vec![2],
                ..Way::default()
            }],
            ..PrimitiveGroup::default()
        }],
        ..PrimitiveBlock::default()
    };
    let entities = decode(&block).unwrap();
    assert_eq!(entities[0].tags()[0].value, "\u{fffd}x");
}
