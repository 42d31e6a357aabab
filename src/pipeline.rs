//! The per-interaction pipeline: filter, count, chart.

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::charts::{Chart, ChartConfig, build_charts};
use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::{FilterOptions, FilterState, apply_filters};
use crate::metrics::{KeywordMatching, Metrics, calculate_metrics};
use crate::schema::OnboardingRecord;

/// A loaded table together with everything needed to render views of it
///
/// Widget options are computed once from the full table.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    options: FilterOptions,
    chart_config: ChartConfig,
    matching: KeywordMatching,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>, config: &DashboardConfig) -> Result<Self> {
        let options = FilterOptions::from_dataset(&dataset)?;
        Ok(Self {
            dataset,
            options,
            chart_config: config.chart_config(),
            matching: config.keyword_matching,
        })
    }

    /// The full, unfiltered table
    #[must_use]
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    #[must_use]
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Widget state on first page load
    #[must_use]
    pub fn default_filters(&self) -> FilterState {
        FilterState::defaults(&self.options)
    }

    /// Recompute every derived view for one widget state
    pub fn run(&self, filters: &FilterState) -> Result<DashboardView> {
        let start = Instant::now();

        let table = apply_filters(&self.dataset, filters)?;
        let metrics = calculate_metrics(&table, self.matching)?;
        let charts = build_charts(
            &table,
            filters.start_date,
            filters.end_date,
            &self.chart_config,
        )?;

        debug!(
            "Pipeline kept {} of {} rows in {:?}",
            table.num_rows(),
            self.dataset.num_rows(),
            start.elapsed()
        );

        Ok(DashboardView {
            filters: filters.clone(),
            metrics,
            charts,
            table,
        })
    }
}

/// Everything the page shows for one widget state
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub filters: FilterState,
    pub metrics: Metrics,
    pub charts: Vec<Chart>,
    /// The filtered rows
    pub table: Dataset,
}

#[derive(Serialize)]
struct ViewDocument<'a> {
    filters: &'a FilterState,
    metrics: &'a Metrics,
    charts: &'a [Chart],
    rows: usize,
    records: Vec<OnboardingRecord>,
}

impl DashboardView {
    /// The view as a JSON document
    pub fn to_json(&self) -> Result<Value> {
        let document = ViewDocument {
            filters: &self.filters,
            metrics: &self.metrics,
            charts: &self.charts,
            rows: self.table.num_rows(),
            records: self.table.records()?,
        };
        Ok(serde_json::to_value(document)?)
    }
}
