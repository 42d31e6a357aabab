//! Read-only view over the loaded onboarding table.

use std::collections::BTreeSet;

use arrow::array::{Array, Date32Array, StringArray};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::NaiveDate;

use crate::error::{DashboardError, Result};
use crate::filter::core::BatchFilter;
use crate::schema::adapters::days_to_date;
use crate::schema::{self, OnboardingRecord};

/// A table of onboarding records, either the full export or a filtered view
///
/// Wraps a single Arrow [`RecordBatch`] in the layout produced by
/// [`normalize_batch`](crate::schema::adapters::normalize_batch). Cloning is
/// cheap since columns are reference counted.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Wrap a normalized record batch
    #[must_use]
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// The underlying record batch
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Whether a column is present in the source
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    /// Column names in source order
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// A text column, or `None` when the column is absent
    pub fn string_column(&self, name: &str) -> Result<Option<&StringArray>> {
        let Ok(idx) = self.batch.schema().index_of(name) else {
            return Ok(None);
        };
        self.batch
            .column(idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .map(Some)
            .ok_or_else(|| DashboardError::schema(format!("Column '{name}' is not a string array")))
    }

    /// The `date` column, or `None` when the column is absent
    pub fn date_column(&self) -> Result<Option<&Date32Array>> {
        let Ok(idx) = self.batch.schema().index_of(schema::DATE) else {
            return Ok(None);
        };
        self.batch
            .column(idx)
            .as_any()
            .downcast_ref::<Date32Array>()
            .map(Some)
            .ok_or_else(|| {
                DashboardError::schema(format!("Column '{}' is not a Date32 array", schema::DATE))
            })
    }

    /// Row dates, `None` for rows whose date was missing or unparsable
    pub fn dates(&self) -> Result<Vec<Option<NaiveDate>>> {
        Ok(match self.date_column()? {
            Some(dates) => dates.iter().map(|d| d.and_then(days_to_date)).collect(),
            None => Vec::new(),
        })
    }

    /// Earliest and latest non-null date
    pub fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let dates = self.dates()?;
        let mut valid = dates.into_iter().flatten();
        let Some(first) = valid.next() else {
            return Ok(None);
        };
        Ok(Some(valid.fold((first, first), |(min, max), d| {
            (min.min(d), max.max(d))
        })))
    }

    /// Sorted distinct non-null values of a column, `None` when absent
    pub fn distinct_values(&self, name: &str) -> Result<Option<Vec<String>>> {
        Ok(self.string_column(name)?.map(|column| {
            column
                .iter()
                .flatten()
                .collect::<BTreeSet<&str>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        }))
    }

    /// Apply a filter, producing a new view
    pub fn filter(&self, filter: &dyn BatchFilter) -> Result<Self> {
        Ok(Self::new(filter.filter(&self.batch)?))
    }

    /// Every cell formatted as display text, row by row
    ///
    /// Nulls render as the empty string. Columns follow [`Self::column_names`].
    pub fn formatted_rows(&self) -> Result<Vec<Vec<String>>> {
        let options = FormatOptions::default().with_null("");
        let formatters = self
            .batch
            .columns()
            .iter()
            .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok((0..self.batch.num_rows())
            .map(|row| {
                formatters
                    .iter()
                    .map(|f| f.value(row).to_string())
                    .collect()
            })
            .collect())
    }

    /// Typed records for the known columns; absent columns yield `None`
    pub fn records(&self) -> Result<Vec<OnboardingRecord>> {
        let dates = self.dates()?;
        let city = self.string_column(schema::CITY)?;
        let partner = self.string_column(schema::TYPE_OF_PARTNER)?;
        let onboarder = self.string_column(schema::ONBOARDER)?;
        let comment = self.string_column(schema::COMMENT)?;
        let names = self.string_column(schema::NAMES)?;
        let week = self.string_column(schema::NEW_WEEK)?;

        let text = |column: Option<&StringArray>, row: usize| {
            column
                .filter(|c| c.is_valid(row))
                .map(|c| c.value(row).to_string())
        };

        Ok((0..self.num_rows())
            .map(|row| OnboardingRecord {
                date: dates.get(row).copied().flatten(),
                city: text(city, row),
                type_of_partner: text(partner, row),
                onboarder: text(onboarder, row),
                comment: text(comment, row),
                names: text(names, row),
                new_week: text(week, row),
            })
            .collect())
    }
}

impl From<RecordBatch> for Dataset {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}
