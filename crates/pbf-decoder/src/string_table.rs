use pbf_types::osmformat;

use crate::error::DecodeError;

/// A block's string table with every entry decoded to UTF-8.
///
/// Built once per block and dropped with it. Invalid UTF-8 sequences are
/// replaced rather than rejected, so a single bad byte in a tag value
/// does not cost the whole block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    #[must_use]
    pub fn new(raw: &osmformat::StringTable) -> Self {
        Self {
            strings: raw
                .s
                .iter()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .collect(),
        }
    }

    /// Resolve an index as found on the wire.
    ///
    /// Indices arrive as unsigned or signed 32-bit values depending on the
    /// field; both widen losslessly into `i64`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::StringIndexOutOfRange`] for negative or too-large
    /// indices.
    pub fn get(&self, index: i64) -> Result<&str, DecodeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
            .ok_or(DecodeError::StringIndexOutOfRange {
                index,
                len: self.strings.len(),
            })
    }

    /// Resolve a user name index.
    ///
    /// Same as [`get`](Self::get), except that index 0 of an empty table
    /// reads as `""`: blocks written without any strings still decode
    /// metadata that names no user.
    ///
    /// # Errors
    ///
    /// As for [`get`](Self::get).
    pub fn user(&self, index: i64) -> Result<&str, DecodeError> {
        if index == 0 && self.strings.is_empty() {
            return Ok("");
        }
        self.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl From<Vec<String>> for StringTable {
    fn from(strings: Vec<String>) -> Self {
        Self { strings }
    }
}
