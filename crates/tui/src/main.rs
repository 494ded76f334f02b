mod app;
mod browse;
mod format;
mod input;
mod owner;
mod theme;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use rentour_core::{
    catalog::CatalogSync,
    config::{self, AppConfig},
    session::SessionContext,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    let session = SessionContext::from_config(&config);
    let sync = CatalogSync::new(&config.catalog)?;

    let mut app = app::RentourApp::new(config, session);
    if let Some(sync) = sync {
        info!(url = %sync.base_url(), "Fetching catalog");
        let (catalog_tx, catalog_rx) = mpsc::channel(4);
        tokio::spawn(async move {
            if let Err(err) = sync.run(catalog_tx).await {
                tracing::error!("Catalog sync task error: {err:#}");
            }
        });
        app.attach_catalog(catalog_rx);
    }
    app.run().await
}

// The terminal owns stdout while the UI runs, so logs only go to a file.
fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("rentour.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
