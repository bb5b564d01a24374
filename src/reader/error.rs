/// Errors that can occur while reading a stream
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error while reading from the source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error while reassembling arrays
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Wire format error in a message header
    #[error("format error: {0}")]
    Format(#[from] crate::format::FormatError),

    /// Stream bytes violate the framing or metadata contract
    #[error("invalid stream: {0}")]
    InvalidStream(String),
}
