use std::io::Read;
use std::sync::Arc;

use arrow::array::{make_array, ArrayData, ArrayRef};
use arrow::buffer::{BooleanBuffer, Buffer, MutableBuffer, NullBuffer};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use log::trace;

use crate::alignment;
use crate::format::{
    decode_record_batch_header, decode_schema_header, BufferMetadata, FieldMetadata,
    RecordBatchHeader, CONTINUATION_MARKER,
};

use super::error::ReaderError;

/// Upper bound on a single message header, guarding against corrupt length
/// prefixes triggering huge allocations.
const MAX_HEADER_BYTES: u64 = 1 << 26;

/// Streaming reader for colstream byte streams.
///
/// Reads the schema message at construction, then yields record batches via
/// [`Iterator`] until the end-of-stream marker.
#[derive(Debug)]
pub struct StreamReader<R: Read> {
    source: R,
    schema: SchemaRef,
    finished: bool,
}

impl<R: Read> StreamReader<R> {
    /// Open a stream, reading and validating its schema message.
    pub fn new(mut source: R) -> Result<Self, ReaderError> {
        let header = read_frame(&mut source)?.ok_or_else(|| {
            ReaderError::InvalidStream("stream ended before the schema message".to_string())
        })?;
        let descriptor = decode_schema_header(&header)?;
        let schema = Arc::new(descriptor.to_schema()?);
        trace!("read schema message: {} fields", schema.fields().len());
        Ok(Self {
            source,
            schema,
            finished: false,
        })
    }

    /// Schema carried by the stream's opening message.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ReaderError> {
        if self.finished {
            return Ok(None);
        }
        let header = match read_frame(&mut self.source)? {
            Some(header) => header,
            None => {
                self.finished = true;
                return Ok(None);
            }
        };
        let header = decode_record_batch_header(&header)?;
        if header.body_size < 0 || !alignment::is_aligned(header.body_size) {
            return Err(ReaderError::InvalidStream(format!(
                "record batch body size {} is not 8-byte aligned",
                header.body_size
            )));
        }
        let num_rows = usize::try_from(header.num_rows).map_err(|_| {
            ReaderError::InvalidStream(format!("negative row count {}", header.num_rows))
        })?;

        let mut raw = Vec::new();
        self.source
            .by_ref()
            .take(header.body_size as u64)
            .read_to_end(&mut raw)?;
        if raw.len() as i64 != header.body_size {
            return Err(ReaderError::InvalidStream(format!(
                "body truncated: wanted {} bytes, got {}",
                header.body_size,
                raw.len()
            )));
        }
        // Typed views over body slices need natural alignment, which a plain
        // Vec allocation does not guarantee.
        let mut aligned = MutableBuffer::with_capacity(raw.len());
        aligned.extend_from_slice(&raw);
        let body = Buffer::from(aligned);

        let mut assembler = BatchAssembler::new(&header, &body);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.schema.fields().len());
        for field in self.schema.fields() {
            let data = assembler.read_array(field.data_type())?;
            columns.push(make_array(data));
        }

        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        let batch = RecordBatch::try_new_with_options(self.schema.clone(), columns, &options)?;
        trace!("read record batch: {} rows", batch.num_rows());
        Ok(Some(batch))
    }
}

impl<R: Read> Iterator for StreamReader<R> {
    type Item = Result<RecordBatch, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}

/// Read one framed message header; `None` at the end-of-stream marker.
fn read_frame<R: Read>(source: &mut R) -> Result<Option<Vec<u8>>, ReaderError> {
    let mut marker = [0u8; 4];
    source.read_exact(&mut marker)?;
    if marker != CONTINUATION_MARKER {
        return Err(ReaderError::InvalidStream(
            "missing continuation marker".to_string(),
        ));
    }

    let mut len = [0u8; 4];
    source.read_exact(&mut len)?;
    let len = u32::from_le_bytes(len) as u64;
    if len == 0 {
        return Ok(None);
    }
    if len > MAX_HEADER_BYTES {
        return Err(ReaderError::InvalidStream(format!(
            "header length {len} exceeds the {MAX_HEADER_BYTES} byte limit"
        )));
    }

    let mut header = Vec::new();
    source.by_ref().take(len).read_to_end(&mut header)?;
    if header.len() as u64 != len {
        return Err(ReaderError::InvalidStream(format!(
            "header truncated: wanted {len} bytes, got {}",
            header.len()
        )));
    }
    Ok(Some(header))
}

/// Walks the schema type tree in the encoder's pre-order, consuming field
/// and buffer metadata while slicing arrays back out of the body.
struct BatchAssembler<'a> {
    fields: std::slice::Iter<'a, FieldMetadata>,
    buffers: std::slice::Iter<'a, BufferMetadata>,
    body: &'a Buffer,
}

impl<'a> BatchAssembler<'a> {
    fn new(header: &'a RecordBatchHeader, body: &'a Buffer) -> Self {
        Self {
            fields: header.fields.iter(),
            buffers: header.buffers.iter(),
            body,
        }
    }

    fn read_array(&mut self, data_type: &DataType) -> Result<ArrayData, ReaderError> {
        let field = self.next_field()?;
        let len = usize::try_from(field.length).map_err(|_| {
            ReaderError::InvalidStream(format!("negative field length {}", field.length))
        })?;
        let null_count = usize::try_from(field.null_count).map_err(|_| {
            ReaderError::InvalidStream(format!("negative null count {}", field.null_count))
        })?;

        // validity slot is present for every node
        let nulls = if null_count == 0 || matches!(data_type, DataType::Null) {
            self.skip_buffer()?;
            None
        } else {
            let bitmap = self.next_buffer(alignment::bytes_for_bits(len))?;
            let nulls = NullBuffer::new(BooleanBuffer::new(bitmap, 0, len));
            if nulls.null_count() != null_count {
                return Err(ReaderError::InvalidStream(format!(
                    "validity bitmap has {} nulls, header claims {}",
                    nulls.null_count(),
                    null_count
                )));
            }
            Some(nulls)
        };

        let data = match data_type {
            DataType::Null => {
                self.skip_buffer()?;
                ArrayData::new_null(data_type, len)
            }

            DataType::Boolean => {
                let values = self.next_buffer(alignment::bytes_for_bits(len))?;
                ArrayData::builder(DataType::Boolean)
                    .len(len)
                    .nulls(nulls)
                    .add_buffer(values)
                    .build()?
            }

            DataType::Binary | DataType::Utf8 => {
                let offsets = self.read_offsets(len)?;
                let value_len = offsets_extent(&offsets, len)?;
                let values = self.next_buffer(value_len)?;
                ArrayData::builder(data_type.clone())
                    .len(len)
                    .nulls(nulls)
                    .add_buffer(offsets)
                    .add_buffer(values)
                    .build()?
            }

            DataType::Struct(members) => {
                let mut builder = ArrayData::builder(data_type.clone()).len(len).nulls(nulls);
                for member in members {
                    builder = builder.add_child_data(self.read_array(member.data_type())?);
                }
                builder.build()?
            }

            DataType::List(element) => {
                let offsets = self.read_offsets(len)?;
                let child = self.read_array(element.data_type())?;
                ArrayData::builder(data_type.clone())
                    .len(len)
                    .nulls(nulls)
                    .add_buffer(offsets)
                    .add_child_data(child)
                    .build()?
            }

            DataType::FixedSizeList(element, _) => {
                // unused offsets slot
                self.skip_buffer()?;
                let child = self.read_array(element.data_type())?;
                ArrayData::builder(data_type.clone())
                    .len(len)
                    .nulls(nulls)
                    .add_child_data(child)
                    .build()?
            }

            other => match other.primitive_width() {
                Some(width) => {
                    let values = self.next_buffer(len * width)?;
                    ArrayData::builder(other.clone())
                        .len(len)
                        .nulls(nulls)
                        .add_buffer(values)
                        .build()?
                }
                None => {
                    return Err(ReaderError::Format(
                        crate::format::FormatError::UnsupportedType(other.to_string()),
                    ))
                }
            },
        };

        Ok(data)
    }

    fn next_field(&mut self) -> Result<FieldMetadata, ReaderError> {
        self.fields.next().copied().ok_or_else(|| {
            ReaderError::InvalidStream("header is missing a field metadata entry".to_string())
        })
    }

    /// Consume the next buffer slot and slice `logical_len` bytes out of
    /// the body at the slot's offset.
    fn next_buffer(&mut self, logical_len: usize) -> Result<Buffer, ReaderError> {
        let meta = self.next_meta()?;
        if logical_len == 0 {
            return Ok(Buffer::from(Vec::<u8>::new()));
        }
        let offset = usize::try_from(meta.offset).map_err(|_| {
            ReaderError::InvalidStream(format!("negative buffer offset {}", meta.offset))
        })?;
        let in_bounds = offset
            .checked_add(logical_len)
            .is_some_and(|end| end <= self.body.len());
        if !in_bounds {
            return Err(ReaderError::InvalidStream(format!(
                "buffer at offset {offset} with length {logical_len} exceeds the body"
            )));
        }
        Ok(self.body.slice_with_length(offset, logical_len))
    }

    fn skip_buffer(&mut self) -> Result<(), ReaderError> {
        self.next_meta().map(|_| ())
    }

    fn next_meta(&mut self) -> Result<BufferMetadata, ReaderError> {
        self.buffers.next().copied().ok_or_else(|| {
            ReaderError::InvalidStream("header is missing a buffer metadata entry".to_string())
        })
    }

    /// Offsets buffer for a variable-size type. A zero-length array stores
    /// an empty buffer, which maps back to the canonical single-zero
    /// offsets.
    fn read_offsets(&mut self, len: usize) -> Result<Buffer, ReaderError> {
        if len == 0 {
            self.skip_buffer()?;
            return Ok(Buffer::from_vec(vec![0i32]));
        }
        self.next_buffer((len + 1) * std::mem::size_of::<i32>())
    }
}

/// Total values extent selected by a zero-based offsets buffer.
///
/// Reads the last entry byte-wise: body slices carry no alignment
/// guarantee for a corrupt stream, so a typed view could trap.
fn offsets_extent(offsets: &Buffer, len: usize) -> Result<usize, ReaderError> {
    let bytes = offsets.as_slice();
    let start = len * std::mem::size_of::<i32>();
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[start..start + 4]);
    let last = i32::from_le_bytes(raw);
    usize::try_from(last)
        .map_err(|_| ReaderError::InvalidStream(format!("negative value offset {last}")))
}
