//! Adapting raw export columns to the in-memory layout.
//!
//! After adaptation the `date` column is `Date32` (unparsable values are null)
//! and every other column is `Utf8`. The null-filled columns never contain
//! nulls.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Date32Array, StringArray};
use arrow::compute::kernels::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use log::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::schema::{DATE, NULL_FILL_VALUE, NULL_FILLED_COLUMNS};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Configuration for string-to-date conversions
#[derive(Debug, Clone)]
pub struct DateFormatConfig {
    /// List of date format strings to try when parsing dates
    pub date_formats: Vec<String>,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            date_formats: vec!["%Y-%m-%d".to_string()],
        }
    }
}

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    let s = s.trim();
    config
        .date_formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Convert a date to Arrow `Date32` days since the epoch
#[must_use]
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Convert Arrow `Date32` days since the epoch back to a date
#[must_use]
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Coerce any column to `Date32`, turning unparsable values into nulls
pub fn coerce_date_column(array: &ArrayRef, config: &DateFormatConfig) -> Result<ArrayRef> {
    match array.data_type() {
        DataType::Date32 => Ok(array.clone()),
        DataType::Utf8 => convert_string_to_date32(array, config),
        DataType::Date64 | DataType::Timestamp(_, _) => {
            Ok(cast::cast(array, &DataType::Date32)?)
        }
        _ => {
            let text = cast::cast(array, &DataType::Utf8)?;
            convert_string_to_date32(&text, config)
        }
    }
}

/// Convert a string array to a Date32 array
fn convert_string_to_date32(array: &ArrayRef, config: &DateFormatConfig) -> Result<ArrayRef> {
    let string_array = array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DashboardError::schema("Expected a string array for date coercion"))?;

    let dates: Date32Array = string_array
        .iter()
        .map(|value| value.and_then(|s| parse_date_string(s, config)).map(date_to_days))
        .collect();

    let unparsed = dates.null_count() - string_array.null_count();
    if unparsed > 0 {
        debug!("{unparsed} date values could not be parsed and were set to null");
    }

    Ok(Arc::new(dates) as ArrayRef)
}

/// Cast any column to `Utf8`
pub fn to_text_column(array: &ArrayRef) -> Result<ArrayRef> {
    if array.data_type() == &DataType::Utf8 {
        return Ok(array.clone());
    }
    Ok(cast::cast(array, &DataType::Utf8)?)
}

/// Replace null and empty values of a string column with `fill`
pub fn fill_missing(array: &ArrayRef, fill: &str) -> Result<ArrayRef> {
    let string_array = array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DashboardError::schema("Expected a string array for null fill"))?;

    let filled: StringArray = string_array
        .iter()
        .map(|value| match value {
            Some(s) if !s.is_empty() => Some(s),
            _ => Some(fill),
        })
        .collect();

    Ok(Arc::new(filled) as ArrayRef)
}

/// Adapt a freshly read batch to the dashboard layout
///
/// * `date` is coerced to `Date32`
/// * every other column is cast to `Utf8`
/// * nulls in `type_of_partner`, `onboarder` and `comment` become `"N/A"`
///
/// Columns that are absent stay absent.
pub fn normalize_batch(batch: &RecordBatch, config: &DateFormatConfig) -> Result<RecordBatch> {
    let source_schema = batch.schema();
    let mut fields = Vec::with_capacity(source_schema.fields().len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(source_schema.fields().len());

    for (field, column) in source_schema.fields().iter().zip(batch.columns()) {
        let name = field.name().as_str();

        if name == DATE {
            fields.push(Field::new(name, DataType::Date32, true));
            columns.push(coerce_date_column(column, config)?);
            continue;
        }

        let text = to_text_column(column)?;
        if NULL_FILLED_COLUMNS.contains(&name) {
            columns.push(fill_missing(&text, NULL_FILL_VALUE)?);
        } else {
            columns.push(text);
        }
        fields.push(Field::new(name, DataType::Utf8, true));
    }

    if source_schema.index_of(DATE).is_err() {
        warn!("Column '{DATE}' not found; date filtering and date charts will be empty");
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
