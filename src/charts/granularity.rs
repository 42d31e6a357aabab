//! Bucketing of the date distribution chart

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::charts::AggregateKey;
use crate::charts::spec::FieldType;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar unit the date distribution is bucketed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Year,
    Month,
    Day,
}

impl Granularity {
    /// Pick the unit for a selected range
    ///
    /// Only the endpoints matter: a range crossing a year boundary is bucketed
    /// by year, a range inside one year but across months by month, anything
    /// else by day of month.
    #[must_use]
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        if start.year() != end.year() {
            Self::Year
        } else if start.month() != end.month() {
            Self::Month
        } else {
            Self::Day
        }
    }

    /// Field name of the bucket in the aggregated table
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        }
    }

    #[must_use]
    pub const fn axis_title(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Month => "Month",
            Self::Day => "Day",
        }
    }

    #[must_use]
    pub const fn chart_title(self) -> &'static str {
        match self {
            Self::Year => "Yearly Distribution",
            Self::Month => "Monthly Distribution",
            Self::Day => "Daily Distribution",
        }
    }

    /// Month names are nominal; years and days are ordinal
    #[must_use]
    pub const fn field_type(self) -> FieldType {
        match self {
            Self::Month => FieldType::Nominal,
            Self::Year | Self::Day => FieldType::Ordinal,
        }
    }

    /// Numeric bucket of a date, used for ordering
    #[must_use]
    pub fn bucket(self, date: NaiveDate) -> u32 {
        match self {
            // Years before 0 CE do not occur in onboarding exports
            Self::Year => u32::try_from(date.year()).unwrap_or(0),
            Self::Month => date.month(),
            Self::Day => date.day(),
        }
    }

    /// Display key of a bucket
    #[must_use]
    pub fn key(self, bucket: u32) -> AggregateKey {
        match self {
            Self::Month => AggregateKey::Text(month_name(bucket).to_string()),
            Self::Year | Self::Day => AggregateKey::Integer(i64::from(bucket)),
        }
    }
}

/// English name of a month number (1 = January)
#[must_use]
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("Unknown")
}

/// Month names in calendar order, used as an explicit axis sort
#[must_use]
pub fn month_order() -> Vec<String> {
    MONTH_NAMES.iter().map(|m| (*m).to_string()).collect()
}
