use std::fs::File;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Date32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use onboard_dash::schema::adapters::date_to_days;
use onboard_dash::{DashboardError, DatasetCache, LoadOptions, read_onboarding_file};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use crate::utils::{SAMPLE_CSV, date, sample_dataset, write_file};

#[test]
fn test_csv_dates_are_coerced_and_bad_dates_kept() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();

    assert_eq!(dataset.num_rows(), 6);
    let dates = dataset.dates()?;
    assert_eq!(dates[0], Some(date(2023, 6, 1)));
    assert_eq!(dates[4], None, "unparsable date becomes null, row retained");
    assert_eq!(dataset.date_bounds()?, Some((date(2023, 6, 1), date(2023, 7, 3))));
    Ok(())
}

#[test]
fn test_null_filled_columns_use_placeholder() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();

    let partner = dataset.string_column("type_of_partner")?.expect("partner column");
    let onboarder = dataset.string_column("onboarder")?.expect("onboarder column");
    let comment = dataset.string_column("comment")?.expect("comment column");

    assert_eq!(partner.value(2), "N/A");
    assert_eq!(onboarder.value(3), "N/A");
    assert_eq!(comment.value(4), "N/A");
    assert_eq!(partner.null_count() + onboarder.null_count() + comment.null_count(), 0);
    Ok(())
}

#[test]
fn test_cache_reads_each_path_once() -> onboard_dash::Result<()> {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "june_data2.csv", SAMPLE_CSV);
    let cache = DatasetCache::new(LoadOptions::default());

    let first = cache.load(&path)?;
    let second = cache.load(&path)?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.disk_reads(), 1);
    assert_eq!(cache.len(), 1);
    Ok(())
}

#[test]
fn test_cache_serves_stale_data_after_file_changes() -> onboard_dash::Result<()> {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "june_data2.csv", SAMPLE_CSV);
    let cache = DatasetCache::new(LoadOptions::default());

    let before = cache.load(&path)?;
    let _ = write_file(&dir, "june_data2.csv", "date,names\n2023-01-01,Only One\n");
    let after = cache.load(&path)?;

    assert_eq!(after.num_rows(), before.num_rows());
    assert_eq!(cache.disk_reads(), 1);
    Ok(())
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("temp dir");
    let cache = DatasetCache::new(LoadOptions::default());

    let result = cache.load(dir.path().join("absent.csv"));
    assert!(matches!(result, Err(DashboardError::Io { .. })));
    assert!(cache.is_empty());
}

#[test]
fn test_extra_and_missing_columns() -> onboard_dash::Result<()> {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(
        &dir,
        "partial.csv",
        "date,names,phone\n2023-06-01,Driver A,0801\n2023-06-02,Driver B,\n",
    );

    let dataset = read_onboarding_file(&path, &LoadOptions::default())?;
    assert_eq!(dataset.column_names(), vec!["date", "names", "phone"]);
    assert!(!dataset.has_column("city"));
    assert!(dataset.string_column("city")?.is_none());
    Ok(())
}

#[test]
fn test_short_rows_are_padded() -> onboard_dash::Result<()> {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(
        &dir,
        "short.csv",
        "date,city,names,comment\n2023-06-01,Lagos,A,driving\n2023-06-02,Abuja\n",
    );

    let dataset = read_onboarding_file(&path, &LoadOptions::default())?;
    assert_eq!(dataset.num_rows(), 2);

    let names = dataset.string_column("names")?.expect("names column");
    assert!(names.is_null(1));
    let cities = dataset.string_column("city")?.expect("city column");
    assert_eq!(cities.value(1), "Abuja");
    let comments = dataset.string_column("comment")?.expect("comment column");
    assert_eq!(comments.value(1), "N/A");
    Ok(())
}

#[test]
fn test_small_batches_are_concatenated() -> onboard_dash::Result<()> {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "june_data2.csv", SAMPLE_CSV);
    let options = LoadOptions {
        batch_size: 2,
        ..LoadOptions::default()
    };

    let dataset = read_onboarding_file(&path, &options)?;
    assert_eq!(dataset.num_rows(), 6);
    Ok(())
}

#[test]
fn test_parquet_export_is_normalized() -> onboard_dash::Result<()> {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("june_data2.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, true),
        Field::new("comment", DataType::Utf8, true),
        Field::new("new_week", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(vec![Some(date_to_days(date(2023, 6, 1))), None]))
                as ArrayRef,
            Arc::new(StringArray::from(vec![Some("driving"), None])) as ArrayRef,
            Arc::new(Int64Array::from(vec![22, 23])) as ArrayRef,
        ],
    )?;

    let file = File::create(&path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    let dataset = read_onboarding_file(&path, &LoadOptions::default())?;
    assert_eq!(dataset.num_rows(), 2);
    assert_eq!(dataset.dates()?, vec![Some(date(2023, 6, 1)), None]);

    let weeks = dataset.string_column("new_week")?.expect("week column");
    assert_eq!(weeks.value(0), "22");
    let comments = dataset.string_column("comment")?.expect("comment column");
    assert_eq!(comments.value(1), "N/A");
    Ok(())
}
