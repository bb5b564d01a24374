use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::format::CONTINUATION_MARKER;
use crate::reader::StreamReader;

use super::error::WriterError;
use super::stream::StreamWriter;

fn test_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, true),
    ]))
}

fn test_batch(schema: &SchemaRef, rows: i32) -> RecordBatch {
    let ids: ArrayRef = Arc::new(Int32Array::from_iter_values(0..rows));
    let names: ArrayRef = Arc::new(StringArray::from_iter_values(
        (0..rows).map(|i| format!("row-{i}")),
    ));
    RecordBatch::try_new(schema.clone(), vec![ids, names]).unwrap()
}

fn write_stream(batches: &[RecordBatch]) -> Vec<u8> {
    let mut sink = Vec::new();
    let mut writer = StreamWriter::new(&mut sink, batches[0].schema()).unwrap();
    for batch in batches {
        writer.write(batch).unwrap();
    }
    writer.close().unwrap();
    drop(writer);
    sink
}

#[test]
fn test_stream_is_framed_and_readable() {
    let schema = test_schema();
    let bytes = write_stream(&[test_batch(&schema, 4)]);

    assert_eq!(&bytes[..4], &CONTINUATION_MARKER);
    // stream tail is the end-of-stream marker
    assert_eq!(&bytes[bytes.len() - 8..bytes.len() - 4], &CONTINUATION_MARKER);
    assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 0]);

    let reader = StreamReader::new(bytes.as_slice()).unwrap();
    assert_eq!(reader.schema().as_ref(), schema.as_ref());
    let batches: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].num_rows(), 4);
}

#[test]
fn test_inconsistent_schema_writes_no_bytes() {
    let schema = test_schema();
    let other_schema: SchemaRef =
        Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
    let other_batch = RecordBatch::try_new(
        other_schema,
        vec![Arc::new(arrow::array::Int64Array::from(vec![1i64])) as ArrayRef],
    )
    .unwrap();

    let clean = write_stream(&[test_batch(&schema, 3)]);

    let batch = test_batch(&schema, 3);
    let mut sink = Vec::new();
    let mut writer = StreamWriter::new(&mut sink, schema).unwrap();
    writer.write(&batch).unwrap();
    let err = writer.write(&other_batch).unwrap_err();
    assert!(matches!(err, WriterError::InconsistentSchema));
    writer.close().unwrap();
    drop(writer);

    // the rejected write contributed nothing
    assert_eq!(sink.len(), clean.len());
    let batches: Vec<_> = StreamReader::new(sink.as_slice())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(batches.len(), 1);
}

#[test]
fn test_first_write_schema_mismatch_leaves_sink_empty() {
    let schema = test_schema();
    let other_schema: SchemaRef =
        Arc::new(Schema::new(vec![Field::new("x", DataType::Int32, false)]));
    let other_batch = RecordBatch::try_new(
        other_schema,
        vec![Arc::new(Int32Array::from(vec![1])) as ArrayRef],
    )
    .unwrap();

    let mut sink = Vec::new();
    let mut writer = StreamWriter::new(&mut sink, schema).unwrap();
    let err = writer.write(&other_batch).unwrap_err();
    assert!(matches!(err, WriterError::InconsistentSchema));
    assert_eq!(writer.stats().bytes_written, 0);
    drop(writer);
    assert!(sink.is_empty());
}

#[test]
fn test_write_after_close_rejected() {
    let schema = test_schema();
    let batch = test_batch(&schema, 2);

    let mut sink = Vec::new();
    let mut writer = StreamWriter::new(&mut sink, schema).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    let err = writer.write(&batch).unwrap_err();
    assert!(matches!(err, WriterError::WriteAfterClose));
}

#[test]
fn test_close_is_idempotent() {
    let schema = test_schema();
    let batch = test_batch(&schema, 1);
    let mut sink = Vec::new();
    let mut writer = StreamWriter::new(&mut sink, schema).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    let bytes_after_first_close = writer.stats().bytes_written;
    writer.close().unwrap();
    assert_eq!(writer.stats().bytes_written, bytes_after_first_close);
    drop(writer);
    assert_eq!(sink.len(), bytes_after_first_close);
}

#[test]
fn test_schema_only_stream() {
    let schema = test_schema();
    let mut sink = Vec::new();
    let mut writer = StreamWriter::new(&mut sink, schema.clone()).unwrap();
    writer.close().unwrap();
    drop(writer);

    let reader = StreamReader::new(sink.as_slice()).unwrap();
    assert_eq!(reader.schema().as_ref(), schema.as_ref());
    assert_eq!(reader.count(), 0);
}

#[test]
fn test_stats_track_sink_bytes() {
    let schema = test_schema();
    let first = test_batch(&schema, 5);
    let second = test_batch(&schema, 2);
    let mut sink = Vec::new();
    let mut writer = StreamWriter::new(&mut sink, schema).unwrap();
    writer.write(&first).unwrap();
    writer.write(&second).unwrap();
    writer.close().unwrap();

    let stats = writer.stats().clone();
    assert_eq!(stats.batches_written, 2);
    assert_eq!(stats.rows_written, 7);
    drop(writer);
    assert_eq!(stats.bytes_written, sink.len());
    assert!(stats.to_string().contains("2 batches"));
}

#[test]
fn test_unsupported_schema_rejected_at_construction() {
    let schema: SchemaRef = Arc::new(Schema::new(vec![Field::new(
        "big",
        DataType::LargeUtf8,
        true,
    )]));
    let err = StreamWriter::new(Vec::new(), schema).unwrap_err();
    assert!(matches!(err, WriterError::Format(_)));
}
