//! Date range filtering
//!
//! Rows whose date is null never fall inside a range.

use std::collections::HashSet;

use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::Result;
use crate::filter::core::BatchFilter;
use crate::filter::expr::{Expr, ExpressionFilter, LiteralValue};
use crate::schema::adapters::date_to_days;

/// A filter that includes only rows with dates in an inclusive range
#[derive(Debug, Clone)]
pub struct DateRangeFilter {
    /// The name of the date column
    date_column: String,

    /// The start date (inclusive)
    start_date: NaiveDate,

    /// The end date (inclusive)
    end_date: NaiveDate,
}

impl DateRangeFilter {
    /// Create a new date range filter
    ///
    /// An inverted range (`start_date > end_date`) is valid and matches nothing.
    #[must_use]
    pub fn new(date_column: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            date_column: date_column.into(),
            start_date,
            end_date,
        }
    }

    /// The range as a filter expression
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        if self.start_date > self.end_date {
            return Expr::AlwaysFalse;
        }

        Expr::And(vec![
            Expr::GtEq(
                self.date_column.clone(),
                LiteralValue::Date(date_to_days(self.start_date)),
            ),
            Expr::LtEq(
                self.date_column.clone(),
                LiteralValue::Date(date_to_days(self.end_date)),
            ),
        ])
    }
}

impl BatchFilter for DateRangeFilter {
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        ExpressionFilter::new(self.to_expr()).filter(batch)
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.date_column.clone()])
    }
}
