mod ai;
mod app;
mod config;
mod domain;
mod http;
mod infrastructure;
mod limiter;
mod monitor;
mod security;
mod tasks;

use anyhow::Result;
use infrastructure::{directories, logging, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config.logging.level, &paths.logs_dir)?;

    let (shutdown, _) = shutdown::Shutdown::new();
    shutdown::install_signal_handlers(shutdown.clone());

    let app = app::ContactGuardApp::initialize(config, paths, shutdown.clone()).await?;
    app.run().await
}
