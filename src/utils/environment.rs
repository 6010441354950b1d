use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "SPACE_EXPLORER_API_URL";
/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "SPACE_EXPLORER_DATA_DIR";
/// Backend used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

const APP_DIR_NAME: &str = "space-explorer";

/// Backend base URL from `--api-url`/the environment, or the local default
///
/// Blank values fall back to the default; a trailing slash is dropped so paths concatenate cleanly
pub(crate) fn resolve_api_base_url(value: Option<String>) -> String {
    value
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Directory holding the history file and the TUI log
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir().context("Failed to get platform data directory")?;
    Ok(base.join(APP_DIR_NAME))
}
