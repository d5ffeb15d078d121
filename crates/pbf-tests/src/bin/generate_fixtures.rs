//! Fixture file generator for manual testing of the `pbf` CLI.
//!
//! Writes the sample dataset once per payload codec, plus a few broken
//! files, under `fixtures/` in this crate (or the directory given as the
//! first argument).
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_fixtures -p pbf-tests
//! pbf validate crates/pbf-tests/fixtures/*.osm.pbf
//! ```
//!
//! # Generated fixtures
//!
//! | File                        | Contents                                 |
//! |-----------------------------|------------------------------------------|
//! | sample-{codec}.osm.pbf      | Header + dense block + path/group block  |
//! | grid-zlib.osm.pbf           | Header + 16 blocks of 8000 dense points  |
//! | unknown-kind.osm.pbf        | Sample file with an OSMIndex frame added |
//! | truncated.osm.pbf           | Sample file cut inside its last frame    |
//! | lzma.osm.pbf                | One data block with an lzma payload      |

#![allow(clippy::pedantic)]

use std::path::{Path, PathBuf};

use pbf_tests::{BlockBuilder, Codec, PbfWriter, compress_blob, samples};
use pbf_types::{Blob, BlobData};

fn main() {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures"));

    for codec in Codec::ALL {
        let bytes = samples::file(codec).expect("encode sample");
        write_file(&dir.join(format!("sample-{codec}.osm.pbf")), &bytes);
    }

    let grid = samples::grid(Codec::Zlib, 16, 8000).expect("encode grid");
    write_file(&dir.join("grid-zlib.osm.pbf"), &grid);

    generate_unknown_kind(&dir);
    generate_truncated(&dir);
    generate_lzma(&dir);

    println!("All fixtures written to {}", dir.display());
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create_dir_all");
    }
    std::fs::write(path, data).expect("write_file");
    println!("  wrote {}", path.display());
}

// ── Broken and unusual files ─────────────────────────────────────────────────

fn generate_unknown_kind(dir: &Path) {
    let index = compress_blob(b"opaque index payload", Codec::Raw).expect("blob");
    let bytes = PbfWriter::new(Codec::Zlib)
        .header(&samples::header())
        .and_then(|w| w.frame("OSMIndex", &index))
        .and_then(|w| w.data(&BlockBuilder::new().dense_points(&samples::points()).build()))
        .expect("encode unknown-kind")
        .finish();
    write_file(&dir.join("unknown-kind.osm.pbf"), &bytes);
}

fn generate_truncated(dir: &Path) {
    let mut bytes = samples::file(Codec::Zlib).expect("encode sample");
    bytes.truncate(bytes.len() - 7);
    write_file(&dir.join("truncated.osm.pbf"), &bytes);
}

fn generate_lzma(dir: &Path) {
    let blob = Blob {
        raw_size: Some(16),
        data: BlobData::Lzma(vec![0x5d, 0, 0, 0x80, 0]),
    };
    let bytes = PbfWriter::new(Codec::Raw)
        .header(&samples::header())
        .and_then(|w| w.frame("OSMData", &blob))
        .expect("encode lzma")
        .finish();
    write_file(&dir.join("lzma.osm.pbf"), &bytes);
}
