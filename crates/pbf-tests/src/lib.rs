//! Fixture writer for the PBF integration tests and benchmarks.
//!
//! [`BlockBuilder`] turns domain entities back into wire messages (record
//! or dense encoding), and [`PbfWriter`] compresses and frames the
//! resulting blocks into a byte stream the decoder can read. [`samples`]
//! holds the dataset the conformance tests snapshot.

pub mod builder;
pub mod fixture;
pub mod samples;

pub use builder::BlockBuilder;
pub use fixture::{Codec, PbfWriter, compress_blob, frame_bytes};
