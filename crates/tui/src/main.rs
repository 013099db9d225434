mod app;
mod client;
mod config;
mod error;
mod render;
mod source;
mod ui;

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use engine::storage::LocalState;
use tracing_subscriber::EnvFilter;

use crate::{client::Client, error::Result, source::DataSource};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_logging(&config.log_file)?;

    let remote = if config.local_only {
        None
    } else {
        Some(Client::new(&config.base_url)?)
    };
    let local = LocalState::open(&config.data_file)?;
    tracing::info!(
        data_file = %config.data_file,
        local_only = config.local_only,
        "starting tracker"
    );

    let base_url = if config.local_only {
        "-".to_string()
    } else {
        config.base_url.clone()
    };
    let mut app = app::App::new(DataSource::new(remote, local), base_url);
    app.load().await;
    app.run().await?;
    Ok(())
}

/// Logs go to a file: stdout belongs to the terminal UI.
fn init_logging(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("celengan_tui=info,engine=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
