use std::sync::Arc;

use quiver_array::{
    DataType, Field, Fields, MaterializeForm, Record, RecordBatch, Scalar, StructArray,
    build_struct_array,
};
use quiver_bytes::Buffer;
use quiver_testkit::data_gen::{archer_fields, archer_records};

fn archers() -> StructArray {
    build_struct_array(&archer_records(), &archer_fields()).unwrap()
}

#[test]
fn test_build_and_flatten_archers() {
    let archers = archers();
    assert_eq!(
        archers.data_type().to_string(),
        "struct<archer: string, location: string, year: int16>"
    );
    assert_eq!(archers.len(), 5);

    let batch = archers.flatten().unwrap();
    assert_eq!(batch.num_rows(), 5);
    assert_eq!(batch.num_columns(), 3);
    assert_eq!(
        batch.schema().to_string(),
        "archer: string\nlocation: string\nyear: int16"
    );

    let slice = batch.slice(1, 3).unwrap();
    assert_eq!(slice.num_rows(), 3);
    assert_eq!(
        batch.column(0).unwrap().get(0).unwrap(),
        Scalar::Utf8("Legolas".into())
    );
    assert_eq!(
        slice.column(0).unwrap().get(0).unwrap(),
        Scalar::Utf8("Oliver".into())
    );
}

#[test]
fn test_flatten_from_arrays_matches_flatten() {
    // The tutorial flow: `RecordBatch.from_arrays(archers.flatten(), names)`.
    let archers = archers();
    let batch =
        RecordBatch::from_arrays(archers.fields_as_arrays(), &["archer", "location", "year"])
            .unwrap();
    let flattened = archers.flatten().unwrap();
    assert_eq!(batch.num_rows(), flattened.num_rows());
    for (a, b) in batch.columns().iter().zip(flattened.columns()) {
        assert!(a.shares_buffers_with(b));
    }
}

#[test]
fn test_flatten_and_slice_never_copy_buffers() {
    let archers = archers();
    let before = archers
        .children()
        .iter()
        .map(|child| child.buffers()[0].ref_count())
        .collect::<Vec<_>>();

    let batch = archers.flatten().unwrap();
    let slice = batch.slice(2, 2).unwrap();
    for (i, child) in archers.children().iter().enumerate() {
        let column = batch.column(i).unwrap();
        assert!(column.shares_buffers_with(child));
        assert!(slice.column(i).unwrap().shares_buffers_with(child));
        for (a, b) in column.buffers().iter().zip(child.buffers()) {
            assert!(Buffer::ptr_eq(a, b));
            assert_eq!(a.as_ptr(), b.as_ptr());
        }
        // One more handle for the batch column, one more for the slice column.
        assert_eq!(child.buffers()[0].ref_count(), before[i] + 2);
    }
}

#[test]
fn test_struct_slice_views_rows_one_and_two() {
    let archers = archers();
    let slice = archers.slice(1, 2).unwrap();
    assert_eq!(slice.len(), 2);
    assert!(slice.as_array().shares_buffers_with(archers.as_array()));
    let records = slice.to_records().unwrap();
    assert_eq!(records, archer_records()[1..3].to_vec());
}

#[test]
fn test_materialize_roundtrip() {
    let records = archer_records();
    let archers = build_struct_array(&records, &archer_fields()).unwrap();
    assert_eq!(archers.to_records().unwrap(), records);
    assert_eq!(archers.flatten().unwrap().to_records().unwrap(), records);

    let columns = archers.flatten().unwrap().to_columns().unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0].0, "archer");
    assert_eq!(
        columns[2].1,
        vec![1954, 1941, 2012, 1996, -600]
            .into_iter()
            .map(Scalar::Int)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_unsigned_and_float_fields_roundtrip() {
    let fields = Fields::from(vec![
        Field::new("arrows", DataType::UInt8, false),
        Field::new("draw", DataType::UInt64, true),
        Field::new("range", DataType::Float64, false),
        Field::new("weight", DataType::Float32, true),
    ]);
    let records = vec![
        Record::new()
            .with("arrows", 5i64)
            .with("draw", 40i64)
            .with("range", 3i64)
            .with("weight", 0.5),
        Record::new()
            .with("arrows", 12u64)
            .with("draw", Scalar::Null)
            .with("range", 250.25)
            .with("weight", 2i64),
    ];
    let array = build_struct_array(&records, &fields).unwrap();
    let back = array.flatten().unwrap().to_records().unwrap();
    assert_eq!(back, records);
    assert_eq!(back[0].get("arrows"), Some(&Scalar::UInt(5)));
    assert_eq!(back[0].get("range"), Some(&Scalar::Float(3.0)));
    assert_eq!(array.slice(1, 1).unwrap().to_records().unwrap(), records[1..].to_vec());

    let json = serde_json::json!([{"arrows": 7, "draw": 30, "range": 1, "weight": null}]);
    let from_json = json
        .as_array()
        .unwrap()
        .iter()
        .map(|value| Record::from_json(value).unwrap())
        .collect::<Vec<_>>();
    let array = build_struct_array(&from_json, &fields).unwrap();
    assert_eq!(array.to_records().unwrap(), from_json);
}

#[test]
fn test_materialize_json_forms() {
    let batch = archers().flatten().unwrap();
    let columns = batch.to_json(MaterializeForm::Columns).unwrap();
    assert_eq!(
        columns,
        serde_json::json!({
            "archer": ["Legolas", "Oliver", "Merida", "Lara", "Artemis"],
            "location": ["Murkwood", "Star City", "Scotland", "London", "Greece"],
            "year": [1954, 1941, 2012, 1996, -600],
        })
    );
    let rows = batch.slice(4, 1).unwrap().to_json(MaterializeForm::Rows).unwrap();
    assert_eq!(
        serde_json::to_string(&rows).unwrap(),
        r#"[{"archer":"Artemis","location":"Greece","year":-600}]"#
    );
}

#[test]
fn test_errors() {
    let batch = archers().flatten().unwrap();
    let column = batch.column(0).unwrap();
    assert!(column.get(5).unwrap_err().is_index_out_of_range());
    assert!(batch.slice(3, 3).unwrap_err().is_out_of_range());
    assert!(batch.slice(6, 0).unwrap_err().is_out_of_range());
    assert_eq!(batch.slice(5, 0).unwrap().num_rows(), 0);

    let empty = StructArray::try_new(Fields::empty(), vec![], 0).unwrap();
    assert!(empty.flatten().unwrap_err().is_empty_struct());

    let mut records = archer_records();
    records[2] = Record::new()
        .with("archer", "Merida")
        .with("location", "Scotland")
        .with("year", "2012");
    let err = build_struct_array(&records, &archer_fields()).unwrap_err();
    assert!(err.is_type_mismatch());
}

#[test]
fn test_nullable_fields_roundtrip() {
    let fields = Fields::from(vec![
        Field::new("archer", DataType::Utf8, false),
        Field::new("location", DataType::Utf8, true),
        Field::new("year", DataType::Int16, true),
    ]);
    let records = vec![
        Record::new()
            .with("archer", "Robin")
            .with("location", Scalar::Null)
            .with("year", 1377i64),
        Record::new()
            .with("archer", "Hawkeye")
            .with("location", "New York")
            .with("year", Scalar::Null),
        Record::new()
            .with("archer", "Katniss")
            .with("location", "District 12")
            .with("year", 2008i64),
    ];
    let array = build_struct_array(&records, &fields).unwrap();
    assert_eq!(array.child(1).unwrap().null_count(), 1);
    assert_eq!(array.child(2).unwrap().null_count(), 1);
    assert_eq!(array.to_records().unwrap(), records);

    let batch = array.flatten().unwrap();
    let tail = batch.slice(2, 1).unwrap();
    assert_eq!(tail.column(1).unwrap().null_count(), 0);
    assert_eq!(tail.column(2).unwrap().null_count(), 0);
    assert_eq!(tail.to_records().unwrap(), records[2..].to_vec());

    let mut with_null_name = records.clone();
    with_null_name.push(
        Record::new()
            .with("archer", Scalar::Null)
            .with("location", "x")
            .with("year", 1i64),
    );
    assert!(
        build_struct_array(&with_null_name, &fields)
            .unwrap_err()
            .is_type_mismatch()
    );
}

#[test]
fn test_batch_roundtrips_through_struct_array() {
    let batch = archers().flatten().unwrap().slice(1, 3).unwrap();
    let array = batch.to_struct_array().unwrap();
    assert_eq!(array.len(), 3);
    let again = array.flatten().unwrap();
    assert_eq!(again.to_records().unwrap(), batch.to_records().unwrap());
    assert!(Arc::ptr_eq(batch.schema(), batch.slice(0, 1).unwrap().schema()));
}

#[test]
fn test_arrays_can_be_shared_across_threads() {
    let batch = archers().flatten().unwrap();
    let handles = (0..4)
        .map(|i| {
            let batch = batch.clone();
            std::thread::spawn(move || {
                let slice = batch.slice(i, 1).unwrap();
                slice.column(0).unwrap().get(0).unwrap()
            })
        })
        .collect::<Vec<_>>();
    let names = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        ["Legolas", "Oliver", "Merida", "Lara"]
            .into_iter()
            .map(Scalar::from)
            .collect::<Vec<_>>()
    );
}
