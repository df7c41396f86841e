//! Parquet input goes through the same cleaning rules as CSV.

use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use covid_dashboard::data::loader::load_file;
use covid_dashboard::DataError;
use parquet::arrow::ArrowWriter;

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (date - epoch).num_days() as i32
}

#[test]
fn typed_parquet_columns_are_cleaned_like_text() {
    let d = |day| NaiveDate::from_ymd_opt(2021, 3, day).unwrap();

    let schema = Arc::new(Schema::new(vec![
        Field::new("Date Reported", DataType::Date32, true),
        Field::new("Country", DataType::Utf8, false),
        Field::new("New_Cases", DataType::Int64, true),
        Field::new("Cumulative_Cases", DataType::Int64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(vec![
            Some(days_since_epoch(d(6))),
            None,
            Some(days_since_epoch(d(5))),
        ])),
        Arc::new(StringArray::from(vec!["India", "India", "India"])),
        Arc::new(Int64Array::from(vec![Some(600), Some(1), None])),
        Arc::new(Int64Array::from(vec![Some(10600), Some(1), Some(10000)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covid_data.parquet");
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(ds.columns(), ["date", "location", "new_cases", "total_cases"]);
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.load_report().rows_dropped, 1);

    let view = ds.view("India");
    assert_eq!(view.dates(), vec![d(5), d(6)]);
    assert_eq!(view.series("new_cases"), vec![None, Some(600.0)]);
    assert_eq!(view.max_value("total_cases"), Some(10600.0));
}

#[test]
fn unreadable_parquet_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.parquet");
    std::fs::write(&path, b"Date_reported,Country\n2021-03-05,India\n").unwrap();

    let err = load_file(&path).unwrap_err();
    assert!(!matches!(err, DataError::DataSource { .. }));
    assert!(matches!(err, DataError::Schema(_)), "{err}");
    assert!(err.to_string().contains("x.parquet"), "{err}");
}
