/// Implementation of `pbf inspect`.
///
/// Walks the frames of a file without building entities. Each frame is
/// decompressed so its plain size can be shown; header blocks list their
/// features and data blocks (with `--groups`) their group contents.
///
/// # Output format
///
/// ```text
/// Frame 0: OSMHeader header=14 payload=112 zlib → 131 bytes
///          required: OsmSchema-V0.6, DenseNodes
///          program:  osmium/1.16
/// Frame 1: OSMData header=13 payload=221 zlib → 342 bytes, 1 group
///          group 0: nodes=0 dense=3 ways=0 relations=0
/// ---
/// 2 frames, 380 bytes
/// ```
///
/// A frame whose payload cannot be decompressed or parsed is reported on
/// its own line and inspection moves on; a framing error stops it.
use anyhow::{Context, Result};
use pbf_decoder::{BlockKind, DecoderConfig, Frame, HeaderInfo, decompress};
use pbf_types::osmformat::{PrimitiveBlock, PrimitiveGroup};

use crate::InspectArgs;

/// Run the `pbf inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its framing is broken
/// (truncated frame, oversized header).
pub fn run(args: &InspectArgs) -> Result<()> {
    let config = DecoderConfig::default();
    let mut reader = crate::open_reader(&args.file, config.clone())?;

    let mut frames = 0usize;
    let mut bytes = 0usize;
    while let Some(frame) = reader
        .next_frame()
        .with_context(|| format!("failed to read frame {frames} of {}", args.file.display()))?
    {
        let index = frames;
        frames += 1;
        bytes += frame.encoded_len();

        if let Some(target) = args.frame
            && index != target
        {
            continue;
        }
        for line in describe_frame(index, frame, &config, args.groups) {
            println!("{line}");
        }
    }

    println!("---");
    println!("{frames} frame{}, {bytes} bytes", if frames == 1 { "" } else { "s" });
    Ok(())
}

// ── Frame formatting ──────────────────────────────────────────────────────────

/// Lines describing one frame: a summary line, then indented details.
fn describe_frame(index: usize, frame: Frame, config: &DecoderConfig, groups: bool) -> Vec<String> {
    let prefix = format!(
        "Frame {index}: {} header={} payload={}",
        frame.kind,
        frame.header_size,
        frame.payload_size()
    );
    if let BlockKind::Unknown(_) = frame.kind {
        return vec![format!("{prefix} (skipped)")];
    }

    let kind = frame.kind.clone();
    let (plain, compression) = match decompress(frame.blob, config.max_blob_size) {
        Ok(result) => result,
        Err(e) => return vec![format!("{prefix} ✗ {}: {e}", e.kind())],
    };
    let summary = format!("{prefix} {compression} → {} bytes", plain.len());

    match kind {
        BlockKind::Header => match HeaderInfo::decode(&plain) {
            Ok(info) => {
                let mut lines = vec![summary];
                lines.extend(header_details(&info));
                lines
            }
            Err(e) => vec![format!("{summary} ✗ {}: {e}", e.kind())],
        },
        BlockKind::Data => match PrimitiveBlock::decode(&plain) {
            Ok(block) => {
                let n = block.groups.len();
                let mut lines = vec![format!("{summary}, {n} group{}", if n == 1 { "" } else { "s" })];
                if groups {
                    lines.extend(
                        block
                            .groups
                            .iter()
                            .enumerate()
                            .map(|(i, g)| format!("         group {i}: {}", group_counts(g))),
                    );
                }
                lines
            }
            Err(e) => vec![format!("{summary} ✗ format error: {e}")],
        },
        BlockKind::Unknown(_) => vec![summary],
    }
}

fn header_details(info: &HeaderInfo) -> Vec<String> {
    let mut lines = vec![format!(
        "         required: {}",
        info.required_features.join(", ")
    )];
    if !info.optional_features.is_empty() {
        lines.push(format!("         optional: {}", info.optional_features.join(", ")));
    }
    if let Some(program) = &info.writing_program {
        lines.push(format!("         program:  {program}"));
    }
    if let Some(b) = info.bounds {
        lines.push(format!(
            "         bounds:   left={:.7} right={:.7} top={:.7} bottom={:.7}",
            b.left, b.right, b.top, b.bottom
        ));
    }
    if let Some(seq) = info.replication_sequence_number {
        lines.push(format!("         replication sequence: {seq}"));
    }
    lines
}

fn group_counts(group: &PrimitiveGroup) -> String {
    format!(
        "nodes={} dense={} ways={} relations={}",
        group.nodes.len(),
        group.dense.as_ref().map_or(0, pbf_types::osmformat::DenseNodes::len),
        group.ways.len(),
        group.relations.len()
    )
}

#[cfg(test)]
mod tests {
    use pbf_decoder::read_frame;
    use pbf_tests::{Codec, samples};

    use super::*;

    fn frames(codec: Codec) -> Vec<Frame> {
        let bytes = samples::file(codec).unwrap();
        let mut cursor = bytes.as_slice();
        let mut out = Vec::new();
        while let Some(frame) = read_frame(&mut cursor, &DecoderConfig::default()).unwrap() {
            out.push(frame);
        }
        out
    }

    #[test]
    fn header_frame_lists_features() {
        let frame = frames(Codec::Zlib).remove(0);
        let lines = describe_frame(0, frame, &DecoderConfig::default(), false);
        assert!(lines[0].starts_with("Frame 0: OSMHeader"));
        assert!(lines[0].contains("deflate"));
        assert_eq!(lines[1], "         required: OsmSchema-V0.6, DenseNodes");
        assert!(lines.iter().any(|l| l.contains("program:  pbf-tests")));
    }

    #[test]
    fn data_frame_lists_groups() {
        let frame = frames(Codec::Lz4).remove(2);
        let lines = describe_frame(2, frame, &DecoderConfig::default(), true);
        assert!(lines[0].ends_with("2 groups"));
        assert_eq!(lines[1], "         group 0: nodes=0 dense=0 ways=1 relations=0");
        assert_eq!(lines[2], "         group 1: nodes=0 dense=0 ways=0 relations=1");
    }

    #[test]
    fn broken_payload_reported_inline() {
        let mut frame = frames(Codec::Zstd).remove(1);
        frame.blob.raw_size = None;
        let lines = describe_frame(1, frame, &DecoderConfig::default(), false);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("✗ format error"));
    }
}
