//! Sidebar filter state and its translation into batch filters.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::core::{AndFilter, BatchFilter};
use crate::filter::date::DateRangeFilter;
use crate::filter::expr::{Expr, ExpressionFilter, in_filter};
use crate::schema::{DATE, Dimension};

/// Widget value meaning "no restriction on this dimension"
pub const ALL_SENTINEL: &str = "All";

/// Query key for the start date
pub const START_KEY: &str = "start";
/// Query key for the end date
pub const END_KEY: &str = "end";

const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Selected values of one categorical dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// The "All" sentinel
    #[default]
    All,
    /// Only rows whose value is a member
    Only(BTreeSet<String>),
}

static ALL: Selection = Selection::All;

impl Selection {
    /// Build a selection from widget values
    ///
    /// Any occurrence of the "All" sentinel, or no values at all, selects All.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() || values.contains(ALL_SENTINEL) {
            Self::All
        } else {
            Self::Only(values)
        }
    }

    /// Whether this is the "All" sentinel
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether a widget option should render as selected
    #[must_use]
    pub fn is_selected(&self, value: &str) -> bool {
        match self {
            Self::All => value == ALL_SENTINEL,
            Self::Only(values) => values.contains(value),
        }
    }

    /// The membership set, when this selection restricts rows
    fn restriction(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Only(values) if !values.is_empty() => Some(values),
            _ => None,
        }
    }
}

/// Values offered by the sidebar widgets
///
/// Always computed from the unfiltered table, so menus never shrink as
/// filters are applied.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    /// Earliest and latest date in the table
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    /// Sorted distinct values per dimension whose column is present
    pub dimensions: BTreeMap<Dimension, Vec<String>>,
}

impl FilterOptions {
    /// Collect options from the full table
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let mut dimensions = BTreeMap::new();
        for dimension in Dimension::ALL {
            match dataset.distinct_values(dimension.column())? {
                Some(values) => {
                    dimensions.insert(dimension, values);
                }
                None => debug!(
                    "Column '{}' not present, skipping its filter",
                    dimension.column()
                ),
            }
        }

        Ok(Self {
            date_bounds: dataset.date_bounds()?,
            dimensions,
        })
    }

    /// Options for one dimension, `None` when its column is absent
    #[must_use]
    pub fn values(&self, dimension: Dimension) -> Option<&[String]> {
        self.dimensions.get(&dimension).map(Vec::as_slice)
    }

    fn clamp(&self, date: NaiveDate) -> NaiveDate {
        match self.date_bounds {
            Some((min, max)) => date.clamp(min, max),
            None => date,
        }
    }
}

/// Complete state of the sidebar widgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    /// Inclusive start of the date range
    pub start_date: NaiveDate,
    /// Inclusive end of the date range
    pub end_date: NaiveDate,
    selections: BTreeMap<Dimension, Selection>,
}

impl FilterState {
    /// A state over the given range with every dimension set to All
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            selections: Dimension::ALL
                .into_iter()
                .map(|d| (d, Selection::All))
                .collect(),
        }
    }

    /// The initial widget state: full observed date range, everything All
    ///
    /// A table without any parseable date falls back to the epoch for both
    /// bounds; no row can match a date range in that case anyway.
    #[must_use]
    pub fn defaults(options: &FilterOptions) -> Self {
        let (start, end) = options.date_bounds.unwrap_or_default();
        Self::new(start, end)
    }

    /// Replace the selection of one dimension
    #[must_use]
    pub fn with_selection(mut self, dimension: Dimension, selection: Selection) -> Self {
        self.selections.insert(dimension, selection);
        self
    }

    /// Selection of one dimension
    #[must_use]
    pub fn selection(&self, dimension: Dimension) -> &Selection {
        self.selections.get(&dimension).unwrap_or(&ALL)
    }

    /// Parse the widget state from URL query pairs
    ///
    /// Missing or malformed dates fall back to the defaults; dates outside the
    /// observed bounds are clamped to them. Dimensions may repeat their key to
    /// select several values.
    pub fn from_query_pairs<I, K, V>(pairs: I, options: &FilterOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let defaults = Self::defaults(options);
        let mut start_date = None;
        let mut end_date = None;
        let mut values: BTreeMap<Dimension, Vec<String>> = BTreeMap::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                START_KEY => start_date = parse_query_date(value),
                END_KEY => end_date = parse_query_date(value),
                _ => {
                    if let Some(dimension) = Dimension::ALL.into_iter().find(|d| d.column() == key) {
                        values.entry(dimension).or_default().push(value.to_string());
                    }
                }
            }
        }

        let mut state = Self::new(
            options.clamp(start_date.unwrap_or(defaults.start_date)),
            options.clamp(end_date.unwrap_or(defaults.end_date)),
        );
        for (dimension, picked) in values {
            state = state.with_selection(dimension, Selection::from_values(picked));
        }
        state
    }

    /// Query pairs reproducing this state
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            (START_KEY.to_string(), self.start_date.format(QUERY_DATE_FORMAT).to_string()),
            (END_KEY.to_string(), self.end_date.format(QUERY_DATE_FORMAT).to_string()),
        ];
        for (dimension, selection) in &self.selections {
            if let Selection::Only(values) = selection {
                pairs.extend(
                    values
                        .iter()
                        .map(|v| (dimension.column().to_string(), v.clone())),
                );
            }
        }
        pairs
    }

    /// URL-encoded query string for a link back to this state
    #[must_use]
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }

    /// One mask filter per active dimension, date range first
    ///
    /// Dimensions whose column is missing from `dataset` are skipped. A table
    /// without a date column is not restricted by date unless the range is
    /// inverted.
    #[must_use]
    pub fn build_filter(&self, dataset: &Dataset) -> AndFilter {
        let mut filters: Vec<Arc<dyn BatchFilter + Send + Sync>> = Vec::new();

        if dataset.has_column(DATE) {
            filters.push(Arc::new(DateRangeFilter::new(
                DATE,
                self.start_date,
                self.end_date,
            )));
        } else if self.start_date > self.end_date {
            filters.push(Arc::new(ExpressionFilter::new(Expr::AlwaysFalse)));
        }

        for dimension in Dimension::ALL {
            let Some(values) = self.selection(dimension).restriction() else {
                continue;
            };
            if !dataset.has_column(dimension.column()) {
                debug!(
                    "Ignoring selection on missing column '{}'",
                    dimension.column()
                );
                continue;
            }
            filters.push(Arc::new(ExpressionFilter::new(in_filter(
                dimension.column(),
                values.iter().cloned(),
            ))));
        }

        AndFilter::new(filters)
    }
}

fn parse_query_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), QUERY_DATE_FORMAT).ok()
}

/// Apply the widget state to the full table
pub fn apply_filters(dataset: &Dataset, state: &FilterState) -> Result<Dataset> {
    let filter = state.build_filter(dataset);
    debug!(
        "Applying {} filters over columns {:?}",
        filter.len(),
        filter.required_columns()
    );
    dataset.filter(&filter)
}
