use std::io::Write;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use log::{debug, warn};

use crate::encoder::{Payload, RecordEncoder};
use crate::format::{
    encode_schema_header, MessageKind, SchemaDescriptor, CONTINUATION_MARKER, MAX_NESTING_DEPTH,
};

use super::error::WriterError;
use super::stats::WriterStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    Started,
    Closed,
}

/// Streaming writer for record batches.
///
/// Bound to one schema at construction; every written batch must carry a
/// structurally equal schema. The schema message is emitted lazily on the
/// first write (or on close, so a batch-less stream is still well-formed).
#[derive(Debug)]
pub struct StreamWriter<W: Write> {
    sink: W,
    schema: SchemaRef,
    descriptor: SchemaDescriptor,
    state: State,
    stats: WriterStats,
}

impl<W: Write> StreamWriter<W> {
    /// Create a writer bound to `schema`. No bytes are written until the
    /// first [`write`](Self::write) or [`close`](Self::close).
    ///
    /// Fails if the schema uses a data type outside the supported set.
    pub fn new(sink: W, schema: SchemaRef) -> Result<Self, WriterError> {
        let descriptor = SchemaDescriptor::from_schema(schema.as_ref())?;
        Ok(Self {
            sink,
            schema,
            descriptor,
            state: State::NotStarted,
            stats: WriterStats::default(),
        })
    }

    /// Schema the stream is bound to.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Encode `batch` and write it to the sink.
    ///
    /// A batch whose schema differs from the stream schema is rejected
    /// before any bytes reach the sink; the stream stays usable for
    /// correctly-schemaed batches. I/O and encode failures are fatal to the
    /// stream: the caller must not keep writing after one.
    pub fn write(&mut self, batch: &RecordBatch) -> Result<(), WriterError> {
        if self.state == State::Closed {
            return Err(WriterError::WriteAfterClose);
        }
        if batch.schema().as_ref() != self.schema.as_ref() {
            return Err(WriterError::InconsistentSchema);
        }
        if self.state == State::NotStarted {
            self.start()?;
        }

        let mut payload = Payload::new(MessageKind::RecordBatch);
        let mut encoder = RecordEncoder::new(0, MAX_NESTING_DEPTH, true);
        encoder.encode(&mut payload, batch)?;

        let written = payload.write_to(&mut self.sink)?;
        self.stats.batches_written += 1;
        self.stats.rows_written += batch.num_rows();
        self.stats.bytes_written += written;
        debug!(
            "wrote record batch: {} rows, {} body bytes",
            batch.num_rows(),
            payload.body_size()
        );
        Ok(())
    }

    /// Write the end-of-stream marker and seal the writer.
    ///
    /// Idempotent: calling `close` again is a no-op. Closing a stream that
    /// never saw a write still emits the schema message first.
    pub fn close(&mut self) -> Result<(), WriterError> {
        if self.state == State::Closed {
            return Ok(());
        }
        if self.state == State::NotStarted {
            self.start()?;
        }

        self.sink.write_all(&CONTINUATION_MARKER)?;
        self.sink.write_all(&0u32.to_le_bytes())?;
        self.sink.flush()?;
        self.stats.bytes_written += CONTINUATION_MARKER.len() + 4;
        self.state = State::Closed;
        debug!("closed stream: {}", self.stats);
        Ok(())
    }

    fn start(&mut self) -> Result<(), WriterError> {
        let header = encode_schema_header(&self.descriptor)?;
        let payload = Payload::with_header(MessageKind::Schema, header);
        let written = payload.write_to(&mut self.sink)?;
        self.stats.bytes_written += written;
        self.state = State::Started;
        debug!("wrote schema message: {} fields", self.descriptor.fields.len());
        Ok(())
    }
}

impl<W: Write> Drop for StreamWriter<W> {
    fn drop(&mut self) {
        if self.state == State::Started {
            warn!("StreamWriter dropped without close(); stream has no end-of-stream marker");
        }
    }
}
