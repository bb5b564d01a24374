//! # Stream Writer Module
//!
//! Sequences encoded record batches onto an output sink: one schema message
//! when the stream starts, one record batch message per write, and an
//! end-of-stream marker on close.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::Int32Array;
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use colstream::writer::StreamWriter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int32, false)]));
//! let batch = RecordBatch::try_new(
//!     schema.clone(),
//!     vec![Arc::new(Int32Array::from(vec![1, 2, 3]))],
//! )?;
//!
//! let mut sink = Vec::new();
//! let mut writer = StreamWriter::new(&mut sink, schema)?;
//! writer.write(&batch)?;
//! writer.close()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod stats;
mod stream;

#[cfg(test)]
mod tests;

pub use error::WriterError;
pub use stats::WriterStats;
pub use stream::StreamWriter;
