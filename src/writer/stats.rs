use std::fmt;

/// Statistics accumulated by a stream writer
#[derive(Debug, Clone, Default)]
pub struct WriterStats {
    /// Number of record batches written to the stream.
    pub batches_written: usize,
    /// Total rows across all written batches.
    pub rows_written: usize,
    /// Total bytes emitted to the sink, including framing and padding.
    pub bytes_written: usize,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} batches ({} rows, {} bytes)",
            self.batches_written, self.rows_written, self.bytes_written
        )
    }
}
