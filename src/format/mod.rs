//! # Wire Format Module
//!
//! Defines the on-the-wire layout of a colstream stream: message framing,
//! header encoding, and the JSON schema descriptor.
//!
//! ## Stream layout
//!
//! ```text
//! [schema message] [record batch message]* [end-of-stream]
//! ```
//!
//! Every message is framed as:
//!
//! ```text
//! +--------------+----------------+------------------+------------+
//! | continuation | header length  | header (padded   | body bytes |
//! | 0xFFFFFFFF   | u32 LE, padded | to 8 with zeros) | (batches)  |
//! +--------------+----------------+------------------+------------+
//! ```
//!
//! The end-of-stream marker is the continuation sentinel followed by a zero
//! header length. Schema messages carry no body; record batch messages are
//! followed by `body_size` bytes of buffer data, each buffer zero-padded to
//! an 8-byte boundary.

mod error;
mod header;
mod schema;

pub use error::FormatError;
pub use header::{
    decode_record_batch_header, decode_schema_header, encode_record_batch_header,
    encode_schema_header, message_kind, RecordBatchHeader,
};
pub use schema::{FieldDescriptor, SchemaDescriptor, TypeDescriptor};

/// Sentinel preceding every framed message and the end-of-stream marker.
pub const CONTINUATION_MARKER: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

/// Maximum nesting depth the stream writer accepts before rejecting a batch.
pub const MAX_NESTING_DEPTH: i64 = 64;

/// Kind tag carried in the first header byte of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Stream-opening schema descriptor message.
    Schema,
    /// Encoded record batch message.
    RecordBatch,
}

impl MessageKind {
    pub(crate) fn as_byte(self) -> u8 {
        match self {
            MessageKind::Schema => 0,
            MessageKind::RecordBatch => 1,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Result<Self, FormatError> {
        match byte {
            0 => Ok(MessageKind::Schema),
            1 => Ok(MessageKind::RecordBatch),
            other => Err(FormatError::UnknownKind(other)),
        }
    }
}

/// Per-node metadata recorded for every array visited, in pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMetadata {
    /// Row count of the node.
    pub length: i64,
    /// Number of null slots in the node.
    pub null_count: i64,
}

/// Location of one body buffer within the payload body.
///
/// Entries are positionally aligned with the body buffer list; absent
/// buffers contribute a zero length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMetadata {
    /// Byte offset of the buffer from the start of the body.
    pub offset: i64,
    /// Padded byte length of the buffer.
    pub length: i64,
}
