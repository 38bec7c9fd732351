use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::SentinelConfig;

/// Default filter: quiet dependencies, `log_level` for our own targets.
fn default_directive(log_level: &str) -> String {
    format!("warn,sentinel={}", log_level.trim())
}

/// Route `tracing` output to the log file. The terminal belongs to the TUI.
pub fn init(config: &SentinelConfig) -> Result<()> {
    let path = SentinelConfig::log_path()?;
    init_to_file(&path, &config.log_level)
}

fn init_to_file(path: &Path, log_level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
