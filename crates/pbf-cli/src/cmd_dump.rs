/// Implementation of `pbf dump`.
///
/// Decodes the file and prints one JSON object per entity, in file order:
///
/// ```text
/// {"type":"point","id":100,"lat":51.5,"lon":-0.1,"tags":{"amenity":"cafe"},"meta":{...}}
/// {"type":"path","id":200,"refs":[100,101,105,100],"tags":{"highway":"footway"}}
/// {"type":"group","id":300,"members":[{"type":"path","id":200,"role":"outer"}],"tags":{}}
/// ```
///
/// Missing coordinates serialize as `null`; `meta` is omitted when the
/// entity carries none or `--no-metadata` is set. A block that fails to
/// decode aborts the dump.
use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use pbf_decoder::{DecodedBlock, DecoderConfig};
use pbf_types::{Entity, Member, Metadata, Tag};
use serde::Serialize;

use crate::DumpArgs;

// ── Output records ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct EntityRecord<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refs: Option<&'a [i64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    members: Option<Vec<MemberRecord<'a>>>,
    tags: BTreeMap<&'a str, &'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<MetaRecord<'a>>,
}

#[derive(Serialize)]
struct MemberRecord<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: i64,
    role: &'a str,
}

#[derive(Serialize)]
struct MetaRecord<'a> {
    version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    uid: i32,
    user: &'a str,
    changeset: i64,
    visible: bool,
}

impl<'a> EntityRecord<'a> {
    fn new(entity: &'a Entity) -> Self {
        let mut record = Self {
            kind: entity.entity_type().name(),
            id: entity.id(),
            lat: None,
            lon: None,
            refs: None,
            members: None,
            tags: tag_map(entity.tags()),
            meta: entity.metadata().map(MetaRecord::new),
        };
        match entity {
            Entity::Point(p) => {
                // NaN serializes as null.
                record.lat = Some(p.lat);
                record.lon = Some(p.lon);
            }
            Entity::Path(p) => record.refs = Some(&p.refs),
            Entity::Group(g) => record.members = Some(g.members.iter().map(MemberRecord::new).collect()),
        }
        record
    }
}

impl<'a> MemberRecord<'a> {
    fn new(member: &'a Member) -> Self {
        Self {
            kind: member.member_type.name(),
            id: member.id,
            role: &member.role,
        }
    }
}

impl<'a> MetaRecord<'a> {
    fn new(meta: &'a Metadata) -> Self {
        Self {
            version: meta.version,
            timestamp: meta.has_timestamp().then_some(meta.timestamp),
            uid: meta.uid,
            user: &meta.username,
            changeset: meta.changeset,
            visible: meta.visible,
        }
    }
}

fn tag_map(tags: &[Tag]) -> BTreeMap<&str, &str> {
    tags.iter().map(|t| (t.key.as_str(), t.value.as_str())).collect()
}

// ── Command ───────────────────────────────────────────────────────────────────

/// Run the `pbf dump` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, a block fails to decode,
/// or stdout is closed.
pub fn run(args: &DumpArgs) -> Result<()> {
    let config = DecoderConfig::default().with_metadata(!args.no_metadata);
    let reader = crate::open_reader(&args.file, config)?;
    let limit = args.limit.unwrap_or(usize::MAX);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0usize;

    'blocks: for (index, block) in reader.enumerate() {
        let block = block.with_context(|| format!("failed to decode frame {index} of {}", args.file.display()))?;
        let DecodedBlock::Data { entities, .. } = block else {
            continue;
        };
        for entity in &entities {
            if written == limit {
                break 'blocks;
            }
            write_entity(&mut out, entity)?;
            written += 1;
        }
    }

    out.flush().context("failed to flush stdout")?;
    tracing::debug!(entities = written, "dump finished");
    Ok(())
}

fn write_entity(out: &mut impl Write, entity: &Entity) -> Result<()> {
    serde_json::to_writer(&mut *out, &EntityRecord::new(entity))?;
    out.write_all(b"\n")?;
    Ok(())
}
