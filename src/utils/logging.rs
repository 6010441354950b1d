//! Tracing subscriber setup
//!
//! One-shot commands log to stderr. While the TUI owns the terminal, logs go
//! to `space-explorer.log` in the data directory instead.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "space-explorer.log";

/// Filter directive for a `-v` count; `RUST_LOG` wins when set
fn filter_for(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    })
}

/// Log to stderr
pub fn init_stderr(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to `<data_dir>/space-explorer.log`
pub fn init_file(verbosity: u8, data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    let path = data_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
