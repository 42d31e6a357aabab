//! An analytics dashboard over driver-onboarding exports.
//!
//! The export is loaded once into an Arrow record batch, filtered per
//! interaction with boolean masks, summarized into metric counts and chart
//! aggregations, and served as a single HTML page.

pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod server;

// Re-export the most common types for easier use
// Core types
pub use config::DashboardConfig;
pub use dataset::Dataset;
pub use error::{DashboardError, Result};
pub use schema::{Dimension, OnboardingRecord};

// Loading
pub use loader::{DatasetCache, LoadOptions, load_data, read_onboarding_file};

// Filtering capabilities
pub use filter::{FilterOptions, FilterState, Selection, apply_filters};

// Metrics and charts
pub use charts::{Chart, ChartConfig, ChartKind, build_charts};
pub use metrics::{KeywordMatching, MetricKind, Metrics, calculate_metrics};

// Pipeline and presentation
pub use pipeline::{Dashboard, DashboardView};
pub use server::serve;

// Arrow types
pub use arrow::record_batch::RecordBatch;
