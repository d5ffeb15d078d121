#![warn(clippy::pedantic)]

pub mod block;
pub mod config;
pub mod dense;
pub mod error;
pub mod frame;
pub mod header;
pub mod reader;
pub mod record;
pub mod scalar;
pub mod sink;
pub mod streaming;
pub mod string_table;

mod decompression;

pub use block::{BlockDecoder, EntityCounts};
pub use config::DecoderConfig;
pub use decompression::{Compression, decompress};
pub use error::{DecodeError, ErrorKind};
pub use frame::{BlockKind, Frame, read_frame};
pub use header::{Bounds, HeaderInfo};
pub use reader::{DecodedBlock, PbfReader, decode_frame};
pub use scalar::BlockParams;
pub use sink::{EntitySink, FnSink};
pub use streaming::{FrameStream, read_frame_async};
pub use string_table::StringTable;
