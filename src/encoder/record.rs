use arrow::array::ArrayData;
use arrow::buffer::{Buffer, MutableBuffer};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::alignment;
use crate::format::{encode_record_batch_header, BufferMetadata, FieldMetadata};

use super::error::EncodeError;
use super::payload::Payload;
use super::truncate;

/// Depth-first encoder turning one record batch into a payload.
///
/// An encoder is single-use: construct one per batch, call
/// [`encode`](RecordEncoder::encode) once. The traversal appends field
/// metadata (pre-order over the whole column tree) and body buffers; a
/// second pass folds the body list into byte offsets and padded lengths
/// before the header is serialized.
pub struct RecordEncoder {
    fields: Vec<FieldMetadata>,
    buffers: Vec<BufferMetadata>,
    start: i64,
    depth: i64,
    max_depth: i64,
    allow_64bit: bool,
}

impl RecordEncoder {
    /// Create an encoder.
    ///
    /// `start_offset` is the frame of reference for body buffer offsets,
    /// normally 0. `max_depth` bounds nesting recursion. When `allow_64bit`
    /// is false, arrays longer than `i32::MAX` are rejected.
    pub fn new(start_offset: i64, max_depth: i64, allow_64bit: bool) -> Self {
        Self {
            fields: Vec::new(),
            buffers: Vec::new(),
            start: start_offset,
            depth: max_depth,
            max_depth,
            allow_64bit,
        }
    }

    /// Encode `batch` into `payload`.
    ///
    /// On error the payload may hold buffers already appended; dropping it
    /// releases them.
    pub fn encode(&mut self, payload: &mut Payload, batch: &RecordBatch) -> Result<(), EncodeError> {
        let schema = batch.schema();
        for (index, column) in batch.columns().iter().enumerate() {
            let data = column.to_data();
            self.visit(payload, &data)
                .map_err(|source| EncodeError::Column {
                    index,
                    name: schema.field(index).name().clone(),
                    source: Box::new(source),
                })?;
        }

        // Second pass: fold the body list into offsets and padded lengths.
        // Absent buffers keep their metadata slot and contribute size 0.
        let mut offset = self.start;
        for entry in payload.body() {
            let size = entry.as_ref().map_or(0, |buffer| buffer.len() as i64);
            let padded = alignment::padded_length(size);
            self.buffers.push(BufferMetadata {
                offset,
                length: padded,
            });
            offset += padded;
        }

        let body_size = offset - self.start;
        assert!(
            alignment::is_aligned(body_size),
            "payload body size {body_size} is not 8-byte aligned"
        );
        payload.set_body_size(body_size);
        payload.set_header(encode_record_batch_header(
            batch.num_rows() as i64,
            body_size,
            &self.fields,
            &self.buffers,
        ));
        Ok(())
    }

    fn visit(&mut self, payload: &mut Payload, data: &ArrayData) -> Result<(), EncodeError> {
        if self.depth <= 0 {
            return Err(EncodeError::MaxRecursionExceeded {
                max_depth: self.max_depth,
            });
        }
        if !self.allow_64bit && data.len() > i32::MAX as usize {
            return Err(EncodeError::ArrayTooLarge { length: data.len() });
        }

        let null_count = match data.data_type() {
            // a Null array is all null but carries no validity bitmap
            DataType::Null => data.len(),
            _ => data.null_count(),
        };
        self.fields.push(FieldMetadata {
            length: data.len() as i64,
            null_count: null_count as i64,
        });

        // Validity bitmap, omitted entirely when every slot is valid.
        match data.nulls() {
            Some(nulls) if data.null_count() > 0 => {
                let bits = nulls.inner();
                payload.push_buffer(Some(truncate::truncated_bitmap(
                    bits.inner(),
                    bits.offset(),
                    bits.len(),
                )));
            }
            _ => payload.push_buffer(None),
        }

        match data.data_type() {
            DataType::Null => payload.push_buffer(None),

            DataType::Boolean => {
                let values =
                    truncate::truncated_bitmap(&data.buffers()[0], data.offset(), data.len());
                payload.push_buffer(Some(values));
            }

            DataType::Binary | DataType::Utf8 => {
                let (offsets, start, length) = zero_based_offsets(data);
                let values = truncate::truncated_values(&data.buffers()[1], start, length);
                payload.push_buffer(Some(offsets));
                payload.push_buffer(Some(values));
            }

            DataType::Struct(_) => {
                self.depth -= 1;
                for (index, child) in data.child_data().iter().enumerate() {
                    let child = child_window(child, data.offset(), data.len());
                    self.visit(payload, &child)
                        .map_err(|source| EncodeError::StructChild {
                            index,
                            source: Box::new(source),
                        })?;
                }
                self.depth += 1;
            }

            DataType::List(_) => {
                let (offsets, start, length) = zero_based_offsets(data);
                payload.push_buffer(Some(offsets));
                let values = sliced_values(&data.child_data()[0], start, length);
                self.depth -= 1;
                self.visit(payload, &values)
                    .map_err(|source| EncodeError::ListValues {
                        source: Box::new(source),
                    })?;
                self.depth += 1;
            }

            DataType::FixedSizeList(_, list_size) => {
                // Fixed-size lists have no offsets buffer; the slot keeps the
                // buffer layout uniform with variable-size lists.
                payload.push_buffer(None);
                let size = *list_size as usize;
                let values = sliced_values(
                    &data.child_data()[0],
                    data.offset() * size,
                    data.len() * size,
                );
                self.depth -= 1;
                self.visit(payload, &values)
                    .map_err(|source| EncodeError::ListValues {
                        source: Box::new(source),
                    })?;
                self.depth += 1;
            }

            other => match other.primitive_width() {
                Some(width) => {
                    let values = truncate::truncated_values(
                        &data.buffers()[0],
                        data.offset() * width,
                        data.len() * width,
                    );
                    payload.push_buffer(Some(values));
                }
                None => return Err(EncodeError::UnsupportedType(other.clone())),
            },
        }

        Ok(())
    }
}

/// Compute the wire offsets buffer for an offsets-bearing array, plus the
/// `(start, length)` window it selects in the values extent.
///
/// The existing buffer is retained when the array is unsliced and already
/// zero-based; otherwise a rebased copy is materialized with its first
/// entry at zero.
fn zero_based_offsets(data: &ArrayData) -> (Buffer, usize, usize) {
    if data.is_empty() {
        return (MutableBuffer::new(0).into(), 0, 0);
    }

    let offsets = &data.buffers()[0];
    let window: &[i32] =
        &offsets.typed_data::<i32>()[data.offset()..data.offset() + data.len() + 1];
    let first = window[0];
    let last = window[window.len() - 1];

    let rebased = if data.offset() == 0 && first == 0 {
        let needed = (data.len() + 1) * std::mem::size_of::<i32>();
        truncate::truncated_values(offsets, 0, needed)
    } else {
        let shifted: Vec<i32> = window.iter().map(|value| value - first).collect();
        Buffer::from_vec(shifted)
    };

    (rebased, first as usize, (last - first) as usize)
}

/// Narrow a list's child values to the window the offsets select.
fn sliced_values(values: &ArrayData, start: usize, length: usize) -> ArrayData {
    if start != 0 || length != values.len() {
        values.slice(start, length)
    } else {
        values.clone()
    }
}

/// Narrow a struct child to the parent's logical window. Children already
/// windowed to the parent length are kept as-is.
fn child_window(child: &ArrayData, offset: usize, length: usize) -> ArrayData {
    if child.len() != length {
        child.slice(offset, length)
    } else {
        child.clone()
    }
}
