//! Decoded domain entities.
//!
//! These are what the decoder hands to callers: string indices are
//! resolved, deltas are summed and coordinates are scaled to degrees.
//! Entities own their data and hold no reference to the block they came
//! from.

/// A key/value pair. Duplicate keys are kept as they appear on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Edit metadata attached to an entity when metadata decoding is enabled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub version: i32,
    /// Milliseconds since the epoch, or [`Metadata::TIMESTAMP_ABSENT`].
    pub timestamp: i64,
    pub uid: i32,
    pub username: String,
    pub changeset: i64,
    pub visible: bool,
}

impl Metadata {
    /// Timestamp value used when the source records none.
    pub const TIMESTAMP_ABSENT: i64 = -1;

    #[must_use]
    pub fn has_timestamp(&self) -> bool {
        self.timestamp != Self::TIMESTAMP_ABSENT
    }
}

/// A located point.
///
/// `lat`/`lon` are degrees. Either may be NaN independently when the
/// source marks that coordinate as not recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: Vec<Tag>,
    pub metadata: Option<Metadata>,
}

/// An ordered list of point references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    pub id: i64,
    pub refs: Vec<i64>,
    pub tags: Vec<Tag>,
    pub metadata: Option<Metadata>,
}

/// What a [`Member`] refers to.
///
/// ```text
/// ┌──────┬────────┐
/// │ Wire │ Type   │
/// ├──────┼────────┤
/// │ 0    │ Point  │
/// │ 1    │ Path   │
/// │ 2    │ Group  │
/// └──────┴────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberType {
    Point,
    Path,
    Group,
}

impl MemberType {
    /// Map a wire code to a member type. Unknown codes fall back to
    /// `Point` rather than failing.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Path,
            2 => Self::Group,
            _ => Self::Point,
        }
    }

    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Point => 0,
            Self::Path => 1,
            Self::Group => 2,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Path => "path",
            Self::Group => "group",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub member_type: MemberType,
    pub role: String,
}

/// An ordered collection of typed, role-annotated members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub members: Vec<Member>,
    pub tags: Vec<Tag>,
    pub metadata: Option<Metadata>,
}

/// Any decoded entity.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Point(Point),
    Path(Path),
    Group(Group),
}

impl Entity {
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::Point(p) => p.id,
            Self::Path(p) => p.id,
            Self::Group(g) => g.id,
        }
    }

    /// The entity's type, expressed with the same enum members use.
    #[must_use]
    pub fn entity_type(&self) -> MemberType {
        match self {
            Self::Point(_) => MemberType::Point,
            Self::Path(_) => MemberType::Path,
            Self::Group(_) => MemberType::Group,
        }
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        match self {
            Self::Point(p) => &p.tags,
            Self::Path(p) => &p.tags,
            Self::Group(g) => &g.tags,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            Self::Point(p) => p.metadata.as_ref(),
            Self::Path(p) => p.metadata.as_ref(),
            Self::Group(g) => g.metadata.as_ref(),
        }
    }
}
