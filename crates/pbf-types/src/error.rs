use pbf_wire::WireError;

/// Errors raised while turning message bytes into typed messages.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── MissingRequiredField for incomplete messages  │
/// │   └── wraps WireError for low-level parse failures  │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// A `required` field of the schema never appeared in the body.
    #[error("missing required field {field} in {message}")]
    MissingRequiredField {
        message: &'static str,
        field: &'static str,
    },

    /// A key, varint or length prefix inside the body was malformed.
    #[error(transparent)]
    Wire(#[from] WireError),
}
