/// Low-level failures while walking protobuf-encoded bytes.
///
/// Every variant that points into a buffer carries the offset where the
/// read failed, relative to the slice handed to the failing call.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Varint encoding exceeded 10 bytes without terminating.
    #[error("varint too long: exceeded 10-byte limit")]
    VarintTooLong,

    /// Input ended before a complete varint, fixed-width value or
    /// length-delimited payload could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The low three bits of a field key named a wire type this codec does
    /// not accept (3 and 4 are the deprecated group markers, 6 and 7 are
    /// unassigned).
    #[error("unknown wire type {value} in field key")]
    UnknownWireType { value: u64 },

    /// A known field arrived with a wire type its schema does not allow,
    /// e.g. a length-delimited payload where a varint was expected.
    #[error("field {number} has wire type {found:?}, expected {expected:?}")]
    WireTypeMismatch {
        number: u32,
        expected: crate::fields::WireType,
        found: crate::fields::WireType,
    },

    /// I/O error during read or write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
