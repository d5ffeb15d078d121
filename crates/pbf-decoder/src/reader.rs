use std::io::Read;

use pbf_types::Entity;
use pbf_types::osmformat::PrimitiveBlock;
use tracing::{debug, warn};

use crate::block::BlockDecoder;
use crate::config::DecoderConfig;
use crate::decompression::{Compression, decompress};
use crate::error::DecodeError;
use crate::frame::{BlockKind, Frame, read_frame};
use crate::header::HeaderInfo;

/// The result of decoding one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedBlock {
    Header(HeaderInfo),
    Data {
        entities: Vec<Entity>,
        compression: Compression,
    },
    /// A block of a kind this decoder does not know; its payload is left
    /// untouched.
    Skipped { kind: String },
}

/// Decompress and decode one frame.
///
/// # Errors
///
/// Any decompression or decoding error. A failed data block yields no
/// entities at all.
pub fn decode_frame(frame: Frame, config: &DecoderConfig) -> Result<DecodedBlock, DecodeError> {
    match frame.kind {
        BlockKind::Unknown(kind) => {
            warn!(kind = %kind, "skipping block of unknown kind");
            Ok(DecodedBlock::Skipped { kind })
        }
        BlockKind::Header => {
            let (bytes, compression) = decompress(frame.blob, config.max_blob_size)?;
            let info = HeaderInfo::decode(&bytes)?;
            debug!(
                %compression,
                size = bytes.len(),
                required_features = ?info.required_features,
                "decoded header block"
            );
            Ok(DecodedBlock::Header(info))
        }
        BlockKind::Data => {
            let (bytes, compression) = decompress(frame.blob, config.max_blob_size)?;
            let block = PrimitiveBlock::decode(&bytes)?;
            let entities = BlockDecoder::new(&block, config).decode()?;
            debug!(
                %compression,
                size = bytes.len(),
                groups = block.groups.len(),
                strings = block.string_table.s.len(),
                entities = entities.len(),
                "decoded data block"
            );
            Ok(DecodedBlock::Data {
                entities,
                compression,
            })
        }
    }
}

/// Blocking reader yielding one [`DecodedBlock`] per frame.
///
/// ```rust,no_run
/// use std::fs::File;
/// use std::io::BufReader;
///
/// use pbf_decoder::{DecodedBlock, DecoderConfig, PbfReader};
///
/// let file = BufReader::new(File::open("extract.osm.pbf").unwrap());
/// for block in PbfReader::new(file, DecoderConfig::default()) {
///     if let DecodedBlock::Data { entities, .. } = block.unwrap() {
///         println!("{} entities", entities.len());
///     }
/// }
/// ```
///
/// There are no retries. A block that fails to decode is reported once
/// and iteration can continue with the next frame; a framing or I/O
/// error ends the iteration, since the stream position is then unknown.
pub struct PbfReader<R> {
    reader: R,
    config: DecoderConfig,
    frames: usize,
    done: bool,
}

impl<R: Read> PbfReader<R> {
    #[must_use]
    pub fn new(reader: R, config: DecoderConfig) -> Self {
        Self {
            reader,
            config,
            frames: 0,
            done: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Number of frames read so far.
    #[must_use]
    pub fn frames_read(&self) -> usize {
        self.frames
    }

    /// Read the next frame without decompressing it.
    ///
    /// # Errors
    ///
    /// As for [`read_frame`]; the reader is finished afterwards.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, DecodeError> {
        if self.done {
            return Ok(None);
        }
        match read_frame(&mut self.reader, &self.config) {
            Ok(Some(frame)) => {
                self.frames += 1;
                Ok(Some(frame))
            }
            Ok(None) => {
                self.done = true;
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for PbfReader<R> {
    type Item = Result<DecodedBlock, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_frame() {
            Ok(Some(frame)) => Some(decode_frame(frame, &self.config)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
