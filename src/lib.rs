//! # colstream - A Columnar Record-Batch Streaming Format
//!
//! `colstream` encodes in-memory Arrow record batches into a compact,
//! self-describing byte stream: a schema message, zero or more record batch
//! messages, and an end-of-stream marker.
//!
//! ## Key Features
//!
//! - **Zero-copy encoding**: buffers of unsliced arrays are shared into the
//!   output payload by reference; only sliced or bit-shifted views are
//!   repacked.
//!
//! - **Nested types**: struct, list and fixed-size-list columns are
//!   flattened by a depth-first traversal with a configurable depth budget.
//!
//! - **Aligned buffers**: every body buffer is zero-padded to an 8-byte
//!   boundary, so a reader can map values in place.
//!
//! - **Inspectable schema**: the schema message is JSON, readable with
//!   nothing but a JSON parser.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{Int32Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use colstream::reader::StreamReader;
//! use colstream::writer::StreamWriter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("id", DataType::Int32, false),
//!     Field::new("name", DataType::Utf8, true),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema.clone(),
//!     vec![
//!         Arc::new(Int32Array::from(vec![1, 2, 3])),
//!         Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
//!     ],
//! )?;
//!
//! // Write a stream into any `io::Write` sink
//! let mut sink = Vec::new();
//! let mut writer = StreamWriter::new(&mut sink, schema)?;
//! writer.write(&batch)?;
//! writer.close()?;
//! drop(writer);
//!
//! // Read it back
//! let reader = StreamReader::new(sink.as_slice())?;
//! let decoded: Vec<_> = reader.collect::<Result<_, _>>()?;
//! assert_eq!(decoded, vec![batch]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported Types
//!
//! | Logical type | Arrow types |
//! |--------------|-------------|
//! | Null | `Null` |
//! | Boolean | `Boolean` |
//! | Fixed width | `Int8`..`Int64`, `UInt8`..`UInt64`, `Float32`, `Float64` |
//! | Variable length | `Binary`, `Utf8` |
//! | Nested | `Struct`, `List`, `FixedSizeList` |
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`encoder`]: the record-to-payload encoder, the core of the crate
//! - [`format`]: message framing, header codec and the schema descriptor
//! - [`writer`]: stream sequencing onto an output sink
//! - [`reader`]: stream decoding back into record batches
//! - [`alignment`]: byte-alignment math shared by all of the above

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod alignment;
pub mod encoder;
pub mod format;
pub mod reader;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::encoder::{EncodeError, Payload, RecordEncoder};
    pub use crate::format::{
        BufferMetadata, FieldMetadata, FormatError, MessageKind, SchemaDescriptor,
        MAX_NESTING_DEPTH,
    };
    pub use crate::reader::{ReaderError, StreamReader};
    pub use crate::writer::{StreamWriter, WriterError, WriterStats};
}
