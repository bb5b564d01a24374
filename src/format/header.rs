//! Little-endian header codec for schema and record batch messages.
//!
//! Record batch header layout:
//!
//! ```text
//! u8  kind (1)
//! i64 row count
//! i64 body size
//! u32 field count,  then per field:  i64 length, i64 null count, i64 reserved
//! u32 buffer count, then per buffer: i64 offset, i64 padded length
//! ```
//!
//! Schema header layout: `u8 kind (0)`, `u32` JSON length, JSON bytes of the
//! [`SchemaDescriptor`].

use super::error::FormatError;
use super::schema::SchemaDescriptor;
use super::{BufferMetadata, FieldMetadata, MessageKind};

/// Decoded record batch header.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatchHeader {
    /// Row count of the batch.
    pub num_rows: i64,
    /// Total padded size of the body in bytes.
    pub body_size: i64,
    /// Pre-order field metadata, one entry per array node.
    pub fields: Vec<FieldMetadata>,
    /// Buffer locations, one entry per body buffer slot.
    pub buffers: Vec<BufferMetadata>,
}

/// Peek the message kind from the first header byte.
pub fn message_kind(header: &[u8]) -> Result<MessageKind, FormatError> {
    let byte = header
        .first()
        .ok_or_else(|| FormatError::InvalidHeader("empty header".to_string()))?;
    MessageKind::from_byte(*byte)
}

/// Serialize a record batch header.
pub fn encode_record_batch_header(
    num_rows: i64,
    body_size: i64,
    fields: &[FieldMetadata],
    buffers: &[BufferMetadata],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 16 + 8 + fields.len() * 24 + buffers.len() * 16);
    out.push(MessageKind::RecordBatch.as_byte());
    out.extend_from_slice(&num_rows.to_le_bytes());
    out.extend_from_slice(&body_size.to_le_bytes());

    out.extend_from_slice(&(fields.len() as u32).to_le_bytes());
    for field in fields {
        out.extend_from_slice(&field.length.to_le_bytes());
        out.extend_from_slice(&field.null_count.to_le_bytes());
        // reserved slot, always zero
        out.extend_from_slice(&0i64.to_le_bytes());
    }

    out.extend_from_slice(&(buffers.len() as u32).to_le_bytes());
    for buffer in buffers {
        out.extend_from_slice(&buffer.offset.to_le_bytes());
        out.extend_from_slice(&buffer.length.to_le_bytes());
    }

    out
}

/// Parse a record batch header. Trailing padding bytes are ignored.
pub fn decode_record_batch_header(header: &[u8]) -> Result<RecordBatchHeader, FormatError> {
    let mut cursor = HeaderCursor::new(header);
    let kind = MessageKind::from_byte(cursor.read_u8()?)?;
    if kind != MessageKind::RecordBatch {
        return Err(FormatError::InvalidHeader(
            "expected a record batch header".to_string(),
        ));
    }

    let num_rows = cursor.read_i64()?;
    let body_size = cursor.read_i64()?;

    let field_count = cursor.read_count(24)?;
    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        let length = cursor.read_i64()?;
        let null_count = cursor.read_i64()?;
        cursor.read_i64()?; // reserved
        fields.push(FieldMetadata { length, null_count });
    }

    let buffer_count = cursor.read_count(16)?;
    let mut buffers = Vec::with_capacity(buffer_count);
    for _ in 0..buffer_count {
        let offset = cursor.read_i64()?;
        let length = cursor.read_i64()?;
        buffers.push(BufferMetadata { offset, length });
    }

    Ok(RecordBatchHeader {
        num_rows,
        body_size,
        fields,
        buffers,
    })
}

/// Serialize a schema header.
pub fn encode_schema_header(descriptor: &SchemaDescriptor) -> Result<Vec<u8>, FormatError> {
    let json = serde_json::to_vec(descriptor)?;
    let mut out = Vec::with_capacity(1 + 4 + json.len());
    out.push(MessageKind::Schema.as_byte());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&json);
    Ok(out)
}

/// Parse a schema header. Trailing padding bytes are ignored.
pub fn decode_schema_header(header: &[u8]) -> Result<SchemaDescriptor, FormatError> {
    let mut cursor = HeaderCursor::new(header);
    let kind = MessageKind::from_byte(cursor.read_u8()?)?;
    if kind != MessageKind::Schema {
        return Err(FormatError::InvalidHeader(
            "expected a schema header".to_string(),
        ));
    }
    let json_len = cursor.read_count(1)?;
    let json = cursor.read_bytes(json_len)?;
    Ok(serde_json::from_slice(json)?)
}

struct HeaderCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> HeaderCursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.buf.len());
        match end {
            Some(end) => {
                let bytes = &self.buf[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(FormatError::InvalidHeader(format!(
                "truncated header: wanted {len} bytes at offset {}",
                self.pos
            ))),
        }
    }

    fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, FormatError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i64(&mut self) -> Result<i64, FormatError> {
        let bytes = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(raw))
    }

    /// Read a `u32` element count, bounding it by the bytes actually left in
    /// the header so a corrupt count cannot trigger a huge allocation.
    fn read_count(&mut self, element_size: usize) -> Result<usize, FormatError> {
        let count = self.read_u32()? as usize;
        let remaining = self.buf.len() - self.pos;
        if count.saturating_mul(element_size) > remaining {
            return Err(FormatError::InvalidHeader(format!(
                "count {count} exceeds remaining header bytes ({remaining})"
            )));
        }
        Ok(count)
    }
}
