//! Configuration for the onboarding dashboard.

use std::path::PathBuf;

use crate::charts::ChartConfig;
use crate::error::{DashboardError, Result};
use crate::loader::LoadOptions;
use crate::metrics::KeywordMatching;
use crate::schema::adapters::DateFormatConfig;

/// Environment variable overriding the data file path
pub const ENV_DATA_PATH: &str = "ONBOARD_DATA_PATH";
/// Environment variable overriding the listen address
pub const ENV_BIND_ADDR: &str = "ONBOARD_BIND_ADDR";
/// Environment variable overriding the page title
pub const ENV_TITLE: &str = "ONBOARD_TITLE";
/// Environment variable overriding the CSV batch size
pub const ENV_BATCH_SIZE: &str = "ONBOARD_BATCH_SIZE";
/// Environment variable selecting the status keyword matching mode
pub const ENV_STATUS_MATCHING: &str = "ONBOARD_STATUS_MATCHING";

/// Configuration for the dashboard binary and pipeline
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Path to the onboarding export (CSV or Parquet)
    pub data_path: PathBuf,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Title shown at the top of the page
    pub page_title: String,
    /// Rows per record batch when decoding CSV
    pub batch_size: usize,
    /// Date format configuration for the `date` column
    pub date_format_config: DateFormatConfig,
    /// Width of each chart in pixels, when not stretched to its container
    pub chart_width: u32,
    /// Height of each chart in pixels
    pub chart_height: u32,
    /// Stretch charts to the width of their grid column
    pub use_container_width: bool,
    /// How status keywords are matched against comments
    pub keyword_matching: KeywordMatching,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("june_data2.csv"),
            bind_addr: "127.0.0.1:8501".to_string(),
            page_title: "Uber Onboarding Analysis".to_string(),
            batch_size: 8192,
            date_format_config: DateFormatConfig::default(),
            chart_width: 600,
            chart_height: 400,
            use_container_width: true,
            keyword_matching: KeywordMatching::default(),
        }
    }
}

impl DashboardConfig {
    /// Build a configuration from defaults overridden by `ONBOARD_*` variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATA_PATH) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        if let Some(title) = lookup(ENV_TITLE) {
            config.page_title = title;
        }
        if let Some(raw) = lookup(ENV_BATCH_SIZE) {
            let batch_size = raw.trim().parse::<usize>().map_err(|e| {
                DashboardError::Config(format!("{ENV_BATCH_SIZE}={raw:?} is not a size: {e}"))
            })?;
            if batch_size == 0 {
                return Err(DashboardError::Config(format!(
                    "{ENV_BATCH_SIZE} must be greater than zero"
                )));
            }
            config.batch_size = batch_size;
        }
        if let Some(raw) = lookup(ENV_STATUS_MATCHING) {
            config.keyword_matching = raw.parse()?;
        }

        Ok(config)
    }

    /// Options used by the loader
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            batch_size: self.batch_size,
            date_format_config: self.date_format_config.clone(),
        }
    }

    /// Options used by the chart builders
    #[must_use]
    pub fn chart_config(&self) -> ChartConfig {
        ChartConfig {
            width: self.chart_width,
            height: self.chart_height,
            use_container_width: self.use_container_width,
            ..ChartConfig::default()
        }
    }
}
