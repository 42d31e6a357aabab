use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use log::info;
use onboard_dash::{Dashboard, DashboardConfig, DatasetCache, serve};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.data_path = PathBuf::from(path);
    }

    info!("Loading onboarding data from: {}", config.data_path.display());
    let start = Instant::now();

    let cache = DatasetCache::install_global(config.load_options());
    let dataset = cache
        .load(&config.data_path)
        .with_context(|| format!("Failed to load {}", config.data_path.display()))?;

    let dashboard = Dashboard::new(dataset, &config).context("Failed to prepare dashboard")?;
    info!(
        "Dashboard ready with {} rows in {:?}",
        dashboard.dataset().num_rows(),
        start.elapsed()
    );

    serve(dashboard, &config).await?;
    Ok(())
}
