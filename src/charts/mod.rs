//! Chart builders over a filtered onboarding table
//!
//! Each builder aggregates one column of the table and pairs the aggregated
//! rows with a declarative [`ChartSpec`]. Builders never fail on an empty table
//! or a missing column; they produce an empty aggregation instead.

pub mod granularity;
pub mod spec;

use std::cmp::Reverse;
use std::fmt;

use chrono::NaiveDate;
use itertools::Itertools;
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::schema::{CITY, COMMENT, NEW_WEEK, ONBOARDER, TYPE_OF_PARTNER};

pub use self::granularity::Granularity;
pub use self::spec::{Channel, ChartSpec, FieldEncoding, FieldType, Mark};

/// Name of the count field in every aggregation
pub const COUNT_FIELD: &str = "count";
/// Name of the percentage field in the partner aggregation
pub const PERCENTAGE_FIELD: &str = "percentage";

const DATE_COUNT_TITLE: &str = "Total Drivers Onboarded";

/// Size and font settings shared by all charts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Stretch to the width of the enclosing element
    pub use_container_width: bool,
    pub axis_label_font_size: u32,
    pub axis_title_font_size: u32,
    pub title_font_size: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            use_container_width: true,
            axis_label_font_size: 12,
            axis_title_font_size: 14,
            title_font_size: 16,
        }
    }
}

/// The six charts of the dashboard, in page order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Comment,
    City,
    Onboarder,
    Partner,
    WeeklyTrend,
    DateDistribution,
}

impl ChartKind {
    pub const ALL: [Self; 6] = [
        Self::Comment,
        Self::City,
        Self::Onboarder,
        Self::Partner,
        Self::WeeklyTrend,
        Self::DateDistribution,
    ];

    /// Section heading shown above the chart
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Comment => "Comment Distribution",
            Self::City => "City Distribution",
            Self::Onboarder => "Onboarder Distribution",
            Self::Partner => "Partner Distribution",
            Self::WeeklyTrend => "Weekly Trends",
            Self::DateDistribution => "Date Distribution",
        }
    }
}

/// Group key of an aggregated row
///
/// Integers sort numerically and before any text key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum AggregateKey {
    Integer(i64),
    Text(String),
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One group of an aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: AggregateKey,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl AggregateRow {
    fn new(key: AggregateKey, count: usize) -> Self {
        Self {
            key,
            count,
            percentage: None,
        }
    }
}

/// Rows grouped by one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    /// Name of the grouped field in chart data
    pub field: String,
    pub rows: Vec<AggregateRow>,
}

impl Aggregation {
    fn new(field: impl Into<String>, rows: Vec<AggregateRow>) -> Self {
        Self {
            field: field.into(),
            rows,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all group counts
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Count of one group
    #[must_use]
    pub fn count_of(&self, key: &AggregateKey) -> Option<usize> {
        self.rows.iter().find(|r| &r.key == key).map(|r| r.count)
    }

    /// Rows as inline chart data, keyed by [`Self::field`]
    #[must_use]
    pub fn to_values(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                object.insert(self.field.clone(), json!(row.key));
                object.insert(COUNT_FIELD.to_string(), json!(row.count));
                if let Some(percentage) = row.percentage {
                    object.insert(PERCENTAGE_FIELD.to_string(), json!(percentage));
                }
                Value::Object(object)
            })
            .collect()
    }
}

/// An aggregated table with its chart specification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub aggregation: Aggregation,
    pub spec: ChartSpec,
}

/// Row counts per distinct non-null value, largest group first
fn value_counts(dataset: &Dataset, column: &str) -> Result<Vec<AggregateRow>> {
    let Some(values) = dataset.string_column(column)? else {
        debug!("Column '{column}' not present, chart will be empty");
        return Ok(Vec::new());
    };

    Ok(values
        .iter()
        .flatten()
        .counts()
        .into_iter()
        .sorted_by_key(|(value, count)| (Reverse(*count), *value))
        .map(|(value, count)| AggregateRow::new(AggregateKey::Text(value.to_string()), count))
        .collect())
}

fn count_axis() -> FieldEncoding {
    FieldEncoding::new(COUNT_FIELD, FieldType::Quantitative).title("Count")
}

fn bar_distribution(
    kind: ChartKind,
    dataset: &Dataset,
    column: &str,
    axis_title: &str,
    config: &ChartConfig,
) -> Result<Chart> {
    let aggregation = Aggregation::new(column, value_counts(dataset, column)?);
    let spec = ChartSpec::new(Mark::Bar, config)
        .encode(
            Channel::X,
            FieldEncoding::new(column, FieldType::Nominal).title(axis_title),
        )
        .encode(Channel::Y, count_axis())
        .tooltip(vec![
            FieldEncoding::new(column, FieldType::Nominal),
            FieldEncoding::new(COUNT_FIELD, FieldType::Quantitative),
        ])
        .values(aggregation.to_values());

    Ok(Chart {
        kind,
        aggregation,
        spec,
    })
}

/// Rows per `comment` value
pub fn comment_chart(dataset: &Dataset, config: &ChartConfig) -> Result<Chart> {
    bar_distribution(ChartKind::Comment, dataset, COMMENT, "Comment", config)
}

/// Rows per `city` value
pub fn city_chart(dataset: &Dataset, config: &ChartConfig) -> Result<Chart> {
    bar_distribution(ChartKind::City, dataset, CITY, "City", config)
}

/// Rows per `onboarder` value
pub fn onboarder_chart(dataset: &Dataset, config: &ChartConfig) -> Result<Chart> {
    bar_distribution(ChartKind::Onboarder, dataset, ONBOARDER, "Onboarder", config)
}

/// Share of rows per `type_of_partner`, as a pie
pub fn partner_chart(dataset: &Dataset, config: &ChartConfig) -> Result<Chart> {
    let mut rows = value_counts(dataset, TYPE_OF_PARTNER)?;
    let total = rows.iter().map(|r| r.count).sum::<usize>();
    if total > 0 {
        for row in &mut rows {
            row.percentage = Some(row.count as f64 / total as f64 * 100.0);
        }
    }
    let aggregation = Aggregation::new(TYPE_OF_PARTNER, rows);

    let spec = ChartSpec::new(Mark::Arc, config)
        .encode(
            Channel::Theta,
            FieldEncoding::new(COUNT_FIELD, FieldType::Quantitative),
        )
        .encode(
            Channel::Color,
            FieldEncoding::new(TYPE_OF_PARTNER, FieldType::Nominal),
        )
        .tooltip(vec![
            FieldEncoding::new(TYPE_OF_PARTNER, FieldType::Nominal).title("Type of Partner"),
            FieldEncoding::new(COUNT_FIELD, FieldType::Quantitative).title("Count"),
            FieldEncoding::new(PERCENTAGE_FIELD, FieldType::Quantitative)
                .title("Percentage")
                .format(".1f"),
        ])
        .values(aggregation.to_values());

    Ok(Chart {
        kind: ChartKind::Partner,
        aggregation,
        spec,
    })
}

/// Week buckets are numbers in most exports; keep them numeric when they are
fn week_key(raw: &str) -> AggregateKey {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return AggregateKey::Integer(n);
    }
    match trimmed.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(f) if f.is_finite() && f.fract() == 0.0 => AggregateKey::Integer(f as i64),
        _ => AggregateKey::Text(trimmed.to_string()),
    }
}

/// Rows per `new_week`, in week order
pub fn weekly_trend_chart(dataset: &Dataset, config: &ChartConfig) -> Result<Chart> {
    let rows = match dataset.string_column(NEW_WEEK)? {
        Some(weeks) => weeks
            .iter()
            .flatten()
            .map(week_key)
            .counts()
            .into_iter()
            .sorted()
            .map(|(key, count)| AggregateRow::new(key, count))
            .collect(),
        None => Vec::new(),
    };
    let aggregation = Aggregation::new(NEW_WEEK, rows);

    let spec = ChartSpec::new(Mark::Line { point: true }, config)
        .encode(
            Channel::X,
            FieldEncoding::new(NEW_WEEK, FieldType::Ordinal).title("Week"),
        )
        .encode(Channel::Y, count_axis())
        .tooltip(vec![
            FieldEncoding::new(NEW_WEEK, FieldType::Ordinal),
            FieldEncoding::new(COUNT_FIELD, FieldType::Quantitative),
        ])
        .values(aggregation.to_values());

    Ok(Chart {
        kind: ChartKind::WeeklyTrend,
        aggregation,
        spec,
    })
}

/// Rows per year, month or day, depending on the selected range
///
/// Rows without a date are not counted.
pub fn date_distribution_chart(
    dataset: &Dataset,
    start: NaiveDate,
    end: NaiveDate,
    config: &ChartConfig,
) -> Result<Chart> {
    let granularity = Granularity::for_range(start, end);

    let rows = dataset
        .dates()?
        .into_iter()
        .flatten()
        .map(|date| granularity.bucket(date))
        .counts()
        .into_iter()
        .sorted()
        .map(|(bucket, count)| AggregateRow::new(granularity.key(bucket), count))
        .collect();
    let aggregation = Aggregation::new(granularity.field(), rows);

    let mut x_axis = FieldEncoding::new(granularity.field(), granularity.field_type())
        .title(granularity.axis_title());
    if granularity == Granularity::Month {
        x_axis = x_axis.sort(granularity::month_order());
    }

    let spec = ChartSpec::new(Mark::Bar, config)
        .title(granularity.chart_title())
        .encode(Channel::X, x_axis)
        .encode(
            Channel::Y,
            FieldEncoding::new(COUNT_FIELD, FieldType::Quantitative).title(DATE_COUNT_TITLE),
        )
        .tooltip(vec![
            FieldEncoding::new(granularity.field(), granularity.field_type()),
            FieldEncoding::new(COUNT_FIELD, FieldType::Quantitative),
        ])
        .values(aggregation.to_values());

    Ok(Chart {
        kind: ChartKind::DateDistribution,
        aggregation,
        spec,
    })
}

/// All six charts in page order
pub fn build_charts(
    dataset: &Dataset,
    start: NaiveDate,
    end: NaiveDate,
    config: &ChartConfig,
) -> Result<Vec<Chart>> {
    Ok(vec![
        comment_chart(dataset, config)?,
        city_chart(dataset, config)?,
        onboarder_chart(dataset, config)?,
        partner_chart(dataset, config)?,
        weekly_trend_chart(dataset, config)?,
        date_distribution_chart(dataset, start, end, config)?,
    ])
}
