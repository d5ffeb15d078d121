#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod fileformat;
pub mod osmformat;

pub use entity::{Entity, Group, Member, MemberType, Metadata, Path, Point, Tag};
pub use error::TypeError;
pub use fileformat::{Blob, BlobData, BlobHeader};
