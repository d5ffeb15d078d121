#![warn(clippy::pedantic)]

pub mod error;
pub mod fields;
pub mod reader;
pub mod varint;

pub use error::WireError;
pub use fields::WireType;
pub use reader::{FieldReader, RawField};
