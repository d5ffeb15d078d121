/// Implementation of `pbf stats`.
///
/// Decodes the whole file and prints entity totals, tag counts, the
/// extent actually covered by points, and which payload compressions the
/// file uses.
///
/// # Example output
///
/// ```text
/// File:    extract.osm.pbf  (1834 bytes)
/// Header:  OsmSchema-V0.6, DenseNodes  (pbf-tests)
/// Blocks:  3 total, 2 data
///
/// Type         Count    Tags
/// ────────────────────────────
/// point            3       3
/// path             1       1
/// group            1       1
/// ────────────────────────────
/// Total            5       5
///
/// Bounds:  declared  lon -0.2000000..0.0000000  lat 51.4000000..51.6000000
///          observed  lon -0.1002000..-0.0998000  lat 51.4999000..51.5001000
/// Compression:  deflate ×2
/// ```
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result};
use pbf_decoder::{Bounds, DecodedBlock, DecoderConfig, EntityCounts, HeaderInfo};
use pbf_types::Entity;

use crate::StatsArgs;

/// Aggregated figures for one file.
#[derive(Debug, Default)]
struct Stats {
    header: Option<HeaderInfo>,
    blocks: usize,
    data_blocks: usize,
    counts: EntityCounts,
    tags: EntityCounts,
    observed: Option<Bounds>,
    compression: BTreeMap<&'static str, usize>,
}

impl Stats {
    fn add_block(&mut self, block: DecodedBlock) {
        self.blocks += 1;
        match block {
            DecodedBlock::Header(info) => {
                self.header.get_or_insert(info);
            }
            DecodedBlock::Data {
                entities,
                compression,
            } => {
                self.data_blocks += 1;
                *self.compression.entry(compression.name()).or_default() += 1;
                for entity in &entities {
                    self.add_entity(entity);
                }
            }
            DecodedBlock::Skipped { .. } => {}
        }
    }

    fn add_entity(&mut self, entity: &Entity) {
        let tags = entity.tags().len();
        match entity {
            Entity::Point(p) => {
                self.counts.points += 1;
                self.tags.points += tags;
                self.extend_bounds(p.lat, p.lon);
            }
            Entity::Path(_) => {
                self.counts.paths += 1;
                self.tags.paths += tags;
            }
            Entity::Group(_) => {
                self.counts.groups += 1;
                self.tags.groups += tags;
            }
        }
    }

    fn extend_bounds(&mut self, lat: f64, lon: f64) {
        if lat.is_nan() || lon.is_nan() {
            return;
        }
        let b = self.observed.get_or_insert(Bounds {
            left: lon,
            right: lon,
            top: lat,
            bottom: lat,
        });
        b.left = b.left.min(lon);
        b.right = b.right.max(lon);
        b.top = b.top.max(lat);
        b.bottom = b.bottom.min(lat);
    }

    fn report(&self) -> String {
        let mut out = String::new();
        let header = self.header.as_ref().map_or_else(
            || "none".to_string(),
            |h| {
                let program = h.writing_program.as_deref().unwrap_or("unknown writer");
                format!("{}  ({program})", h.required_features.join(", "))
            },
        );
        let _ = writeln!(out, "Header:  {header}");
        let _ = writeln!(out, "Blocks:  {} total, {} data", self.blocks, self.data_blocks);
        let _ = writeln!(out);

        let rule = "─".repeat(28);
        let _ = writeln!(out, "{:<10} {:>7} {:>7}", "Type", "Count", "Tags");
        let _ = writeln!(out, "{rule}");
        for (label, count, tags) in [
            ("point", self.counts.points, self.tags.points),
            ("path", self.counts.paths, self.tags.paths),
            ("group", self.counts.groups, self.tags.groups),
        ] {
            let _ = writeln!(out, "{label:<10} {count:>7} {tags:>7}");
        }
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "{:<10} {:>7} {:>7}",
            "Total",
            self.counts.total(),
            self.tags.total()
        );
        let _ = writeln!(out);

        let declared = self.header.as_ref().and_then(|h| h.bounds);
        let _ = writeln!(out, "Bounds:  declared  {}", format_bounds(declared));
        let _ = writeln!(out, "         observed  {}", format_bounds(self.observed));

        let mix: Vec<String> = self
            .compression
            .iter()
            .map(|(name, n)| format!("{name} ×{n}"))
            .collect();
        let mix = if mix.is_empty() { "-".to_string() } else { mix.join(", ") };
        let _ = write!(out, "Compression:  {mix}");
        out
    }
}

fn format_bounds(bounds: Option<Bounds>) -> String {
    match bounds {
        Some(b) => format!(
            "lon {:.7}..{:.7}  lat {:.7}..{:.7}",
            b.left, b.right, b.bottom, b.top
        ),
        None => "-".to_string(),
    }
}

/// Run the `pbf stats` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any block fails to
/// decode.
pub fn run(args: &StatsArgs) -> Result<()> {
    let file_size = fs::metadata(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?
        .len();
    let config = DecoderConfig::default().with_metadata(!args.no_metadata);
    let reader = crate::open_reader(&args.file, config)?;

    let mut stats = Stats::default();
    for (index, block) in reader.enumerate() {
        let block = block.with_context(|| format!("failed to decode frame {index} of {}", args.file.display()))?;
        stats.add_block(block);
    }

    println!("File:    {}  ({file_size} bytes)", args.file.display());
    println!("{}", stats.report());
    Ok(())
}
