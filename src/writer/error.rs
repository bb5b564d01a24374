/// Errors that can occur during stream writing
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error while writing to the sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record batch could not be encoded into a payload
    #[error("encode error: {0}")]
    Encode(#[from] crate::encoder::EncodeError),

    /// Wire format error while serializing the schema
    #[error("format error: {0}")]
    Format(#[from] crate::format::FormatError),

    /// Record batch schema differs from the schema the stream is bound to
    #[error("record batch schema does not match the stream schema")]
    InconsistentSchema,

    /// The writer was used after `close`
    #[error("write after close")]
    WriteAfterClose,
}
