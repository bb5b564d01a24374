/// Errors raised while encoding or decoding the wire format
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Header bytes are truncated or structurally invalid
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Message kind byte is not a known kind
    #[error("unknown message kind: {0:#04x}")]
    UnknownKind(u8),

    /// Schema contains a data type outside the supported set
    #[error("unsupported data type: {0}")]
    UnsupportedType(String),

    /// Schema descriptor is structurally invalid (e.g. a list without a child)
    #[error("malformed schema descriptor: {0}")]
    MalformedSchema(String),

    /// JSON (de)serialization of the schema descriptor failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
