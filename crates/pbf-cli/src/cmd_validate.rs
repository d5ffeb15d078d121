/// Implementation of `pbf validate`.
///
/// Decodes every frame and block of the file and reports either a series
/// of success checkmarks (`✓`) or one diagnostic line (`✗`) per failing
/// block. The command exits with code 0 on a valid file and code 1 on any
/// error (the main dispatcher in `main.rs` converts `Err` to exit code 1).
///
/// # Success output
///
/// ```text
/// ✓ Header: OsmSchema-V0.6, DenseNodes
/// ✓ Blocks: 3 frames read (1 header, 2 data, 0 skipped)
/// ✓ Entities: 5 decoded (3 points, 1 path, 1 group)
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Frame 1: decompression error: zlib payload decompressed to 40 bytes, declared 50
/// ✗ Frame 3: io error: stream ended inside blob
/// ```
///
/// A block that fails to decode does not stop validation; a framing error
/// does, since the reader can no longer find the next frame.
use anyhow::{Result, anyhow};
use pbf_decoder::{DecodeError, DecodedBlock, DecoderConfig, EntityCounts};
use pbf_types::Entity;

use crate::ValidateArgs;

/// Outcome of validating one file.
#[derive(Debug, Default)]
struct Report {
    header: Option<Vec<String>>,
    headers: usize,
    data: usize,
    skipped: usize,
    counts: EntityCounts,
    failures: Vec<(usize, DecodeError)>,
}

impl Report {
    fn record(&mut self, index: usize, block: Result<DecodedBlock, DecodeError>) {
        match block {
            Ok(DecodedBlock::Header(info)) => {
                self.headers += 1;
                self.header.get_or_insert(info.required_features);
            }
            Ok(DecodedBlock::Data { entities, .. }) => {
                self.data += 1;
                for entity in &entities {
                    match entity {
                        Entity::Point(_) => self.counts.points += 1,
                        Entity::Path(_) => self.counts.paths += 1,
                        Entity::Group(_) => self.counts.groups += 1,
                    }
                }
            }
            Ok(DecodedBlock::Skipped { .. }) => self.skipped += 1,
            Err(e) => self.failures.push((index, e)),
        }
    }

    fn frames(&self) -> usize {
        self.headers + self.data + self.skipped + self.failures.len()
    }

    fn lines(&self) -> Vec<String> {
        if !self.failures.is_empty() {
            return self
                .failures
                .iter()
                .map(|(index, e)| format!("✗ Frame {index}: {}: {e}", e.kind()))
                .collect();
        }
        let header = match &self.header {
            Some(features) => format!("✓ Header: {}", features.join(", ")),
            None => "✓ Header: none (file has no header block)".to_string(),
        };
        vec![
            header,
            format!(
                "✓ Blocks: {} frame{} read ({} header, {} data, {} skipped)",
                self.frames(),
                plural(self.frames()),
                self.headers,
                self.data,
                self.skipped
            ),
            format!(
                "✓ Entities: {} decoded ({} point{}, {} path{}, {} group{})",
                self.counts.total(),
                self.counts.points,
                plural(self.counts.points),
                self.counts.paths,
                plural(self.counts.paths),
                self.counts.groups,
                plural(self.counts.groups)
            ),
        ]
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Run the `pbf validate` command.
///
/// Prints a validation report to stdout and returns `Ok(())` on success.
/// On any error, prints `✗` diagnostics to stdout and returns `Err`, which
/// the main dispatcher converts to exit code 1.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or any frame or block
/// fails to decode.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let reader = crate::open_reader(&args.file, DecoderConfig::default())?;

    let mut report = Report::default();
    for (index, block) in reader.enumerate() {
        report.record(index, block);
    }

    for line in report.lines() {
        println!("{line}");
    }
    if report.failures.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "validation failed: {} of {} frames had errors",
            report.failures.len(),
            report.frames()
        ))
    }
}
