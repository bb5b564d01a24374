//! End-to-end round-trip tests: every batch written by the stream writer
//! must come back from the stream reader with the same schema, row count,
//! values and null positions.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BinaryArray, BooleanArray, FixedSizeListArray, Float64Array, Int32Array,
    Int64Array, ListArray, ListBuilder, NullArray, StringArray, StringBuilder, StructArray,
    UInt8Array,
};
use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Field, Fields, Int32Type, Schema};
use arrow::record_batch::RecordBatch;
use tempfile::tempdir;

use colstream::reader::StreamReader;
use colstream::writer::StreamWriter;

fn batch_of(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

fn round_trip(batches: &[RecordBatch]) -> Vec<RecordBatch> {
    let _ = env_logger::builder().is_test(true).try_init();
    let schema = batches
        .first()
        .map(|batch| batch.schema())
        .expect("at least one batch");

    let mut sink = Vec::new();
    let mut writer = StreamWriter::new(&mut sink, schema.clone()).unwrap();
    for batch in batches {
        writer.write(batch).unwrap();
    }
    writer.close().unwrap();
    drop(writer);

    let reader = StreamReader::new(sink.as_slice()).unwrap();
    assert_eq!(reader.schema().as_ref(), schema.as_ref());
    reader.collect::<Result<_, _>>().unwrap()
}

fn assert_round_trip(batch: RecordBatch) {
    let decoded = round_trip(std::slice::from_ref(&batch));
    assert_eq!(decoded, vec![batch]);
}

#[test]
fn test_primitive_columns() {
    assert_round_trip(batch_of(vec![
        (
            "i32",
            Arc::new(Int32Array::from(vec![Some(1), None, Some(-3), Some(4)])) as ArrayRef,
        ),
        (
            "i64",
            Arc::new(Int64Array::from(vec![10i64, 20, 30, 40])) as ArrayRef,
        ),
        (
            "u8",
            Arc::new(UInt8Array::from(vec![Some(255u8), Some(0), None, Some(7)])) as ArrayRef,
        ),
        (
            "f64",
            Arc::new(Float64Array::from(vec![0.5, -1.25, f64::MAX, 0.0])) as ArrayRef,
        ),
    ]));
}

#[test]
fn test_boolean_column() {
    assert_round_trip(batch_of(vec![(
        "flags",
        Arc::new(BooleanArray::from(vec![
            Some(true),
            None,
            Some(false),
            Some(true),
            None,
            Some(false),
            Some(true),
            Some(true),
            Some(false),
        ])) as ArrayRef,
    )]));
}

#[test]
fn test_string_and_binary_columns() {
    assert_round_trip(batch_of(vec![
        (
            "names",
            Arc::new(StringArray::from(vec![Some("ada"), None, Some(""), Some("grace")]))
                as ArrayRef,
        ),
        (
            "blobs",
            Arc::new(BinaryArray::from_opt_vec(vec![
                Some(b"\x00\x01".as_ref()),
                Some(b"".as_ref()),
                None,
                Some(b"\xff\xfe\xfd".as_ref()),
            ])) as ArrayRef,
        ),
    ]));
}

#[test]
fn test_null_column() {
    assert_round_trip(batch_of(vec![(
        "nothing",
        Arc::new(NullArray::new(5)) as ArrayRef,
    )]));
}

#[test]
fn test_struct_column_with_nulls() {
    let fields = Fields::from(vec![
        Field::new("x", DataType::Float64, true),
        Field::new("label", DataType::Utf8, true),
    ]);
    let x: ArrayRef = Arc::new(Float64Array::from(vec![Some(1.0), Some(2.0), None]));
    let label: ArrayRef = Arc::new(StringArray::from(vec![Some("a"), None, Some("c")]));
    let points = StructArray::try_new(
        fields,
        vec![x, label],
        Some(NullBuffer::from(vec![true, false, true])),
    )
    .unwrap();

    assert_round_trip(batch_of(vec![("point", Arc::new(points) as ArrayRef)]));
}

#[test]
fn test_nested_struct_of_struct() {
    let inner_fields = Fields::from(vec![Field::new("v", DataType::Int32, true)]);
    let inner = StructArray::try_new(
        inner_fields,
        vec![Arc::new(Int32Array::from(vec![Some(1), None])) as ArrayRef],
        None,
    )
    .unwrap();

    let outer_fields = Fields::from(vec![Field::new(
        "inner",
        inner.data_type().clone(),
        true,
    )]);
    let outer = StructArray::try_new(outer_fields, vec![Arc::new(inner) as ArrayRef], None).unwrap();

    assert_round_trip(batch_of(vec![("nested", Arc::new(outer) as ArrayRef)]));
}

#[test]
fn test_list_column_with_nulls() {
    let lists = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![
        Some(vec![Some(1), Some(2), None]),
        None,
        Some(vec![]),
        Some(vec![Some(9)]),
    ]);
    assert_round_trip(batch_of(vec![("xs", Arc::new(lists) as ArrayRef)]));
}

#[test]
fn test_list_of_strings() {
    let mut builder = ListBuilder::new(StringBuilder::new());
    builder.append_value([Some("a"), Some("bb")]);
    builder.append_null();
    builder.append_value([None, Some("ccc")]);
    builder.append_value([] as [Option<&str>; 0]);
    let lists = builder.finish();

    assert_round_trip(batch_of(vec![("tags", Arc::new(lists) as ArrayRef)]));
}

#[test]
fn test_fixed_size_list_column() {
    let values: ArrayRef = Arc::new(Int32Array::from(vec![1, 2, 3, 4, 5, 6]));
    let pairs = FixedSizeListArray::try_new(
        Arc::new(Field::new("item", DataType::Int32, false)),
        2,
        values,
        Some(NullBuffer::from(vec![true, false, true])),
    )
    .unwrap();

    assert_round_trip(batch_of(vec![("pairs", Arc::new(pairs) as ArrayRef)]));
}

#[test]
fn test_sliced_batch() {
    let batch = batch_of(vec![
        (
            "i",
            Arc::new(Int32Array::from(vec![
                Some(0),
                Some(1),
                None,
                Some(3),
                Some(4),
                None,
                Some(6),
            ])) as ArrayRef,
        ),
        (
            "s",
            Arc::new(StringArray::from(vec![
                Some("zero"),
                Some("one"),
                None,
                Some("three"),
                Some("four"),
                Some("five"),
                None,
            ])) as ArrayRef,
        ),
    ]);

    let sliced = batch.slice(2, 4);
    let decoded = round_trip(std::slice::from_ref(&sliced));
    assert_eq!(decoded, vec![sliced]);
}

#[test]
fn test_sliced_list_batch() {
    let lists = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![
        Some(vec![Some(1), Some(2)]),
        Some(vec![Some(3)]),
        None,
        Some(vec![Some(4), Some(5), Some(6)]),
    ]);
    let batch = batch_of(vec![("xs", Arc::new(lists) as ArrayRef)]);

    let sliced = batch.slice(1, 3);
    let decoded = round_trip(std::slice::from_ref(&sliced));
    assert_eq!(decoded, vec![sliced]);
}

#[test]
fn test_sliced_struct_batch() {
    let fields = Fields::from(vec![Field::new("v", DataType::Int32, true)]);
    let inner: ArrayRef = Arc::new(Int32Array::from(vec![
        Some(1),
        None,
        Some(3),
        Some(4),
        Some(5),
    ]));
    let structs = StructArray::try_new(
        fields,
        vec![inner],
        Some(NullBuffer::from(vec![true, true, false, true, true])),
    )
    .unwrap();
    let batch = batch_of(vec![("s", Arc::new(structs) as ArrayRef)]);

    let sliced = batch.slice(1, 3);
    let decoded = round_trip(std::slice::from_ref(&sliced));
    assert_eq!(decoded, vec![sliced]);
}

#[test]
fn test_sliced_boolean_batch() {
    let flags = BooleanArray::from(vec![
        Some(true),
        Some(false),
        None,
        Some(true),
        Some(true),
        None,
        Some(false),
        Some(true),
        Some(false),
        Some(true),
    ]);
    let batch = batch_of(vec![("flags", Arc::new(flags) as ArrayRef)]);

    // offset 3 lands mid-byte, forcing the bit-repack path
    let sliced = batch.slice(3, 5);
    let decoded = round_trip(std::slice::from_ref(&sliced));
    assert_eq!(decoded, vec![sliced]);
}

#[test]
fn test_multiple_batches() {
    let make = |base: i32| {
        batch_of(vec![(
            "v",
            Arc::new(Int32Array::from_iter_values(base..base + 4)) as ArrayRef,
        )])
    };
    let batches = vec![make(0), make(100), make(200)];
    let decoded = round_trip(&batches);
    assert_eq!(decoded, batches);
}

#[test]
fn test_zero_row_batch() {
    assert_round_trip(batch_of(vec![
        ("i", Arc::new(Int32Array::from(Vec::<i32>::new())) as ArrayRef),
        (
            "s",
            Arc::new(StringArray::from(Vec::<&str>::new())) as ArrayRef,
        ),
    ]));
}

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("batches.colstream");

    let batch = batch_of(vec![
        (
            "id",
            Arc::new(Int64Array::from_iter_values(0..1000)) as ArrayRef,
        ),
        (
            "name",
            Arc::new(StringArray::from_iter_values(
                (0..1000).map(|i| format!("name-{i}")),
            )) as ArrayRef,
        ),
    ]);

    let file = File::create(&path).unwrap();
    let mut writer = StreamWriter::new(file, batch.schema()).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    drop(writer);

    let reader = StreamReader::new(BufReader::new(File::open(&path).unwrap())).unwrap();
    let decoded: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(decoded, vec![batch]);
}
