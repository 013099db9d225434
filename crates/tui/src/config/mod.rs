use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// JSON file backing the local tier.
    pub data_file: String,
    pub log_file: String,
    /// Skip the remote service entirely.
    pub local_only: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            data_file: engine::storage::DEFAULT_DATA_PATH.to_string(),
            log_file: "celengan_tui.log".to_string(),
            local_only: false,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "celengan_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override the local data file.
    #[arg(long)]
    data_file: Option<String>,
    /// Override the log file (stdout belongs to the terminal UI).
    #[arg(long)]
    log_file: Option<String>,
    /// Never contact the remote service.
    #[arg(long)]
    local_only: bool,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("CELENGAN_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(data_file) = args.data_file {
        settings.data_file = data_file;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }
    if args.local_only {
        settings.local_only = true;
    }

    Ok(settings)
}
