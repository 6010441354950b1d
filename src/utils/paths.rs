use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};

// Maximum size of a storage file: 10MB
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Validates that an open file is within the storage size limit (10MB)
///
/// Takes the open handle so the check applies to the file that is then read.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read or the file is larger than 10MB.
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Display `path` with the home directory shown as `~`
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, dirs::home_dir().as_deref())
}

/// Prefix match is per component, so `/home/astronaut` is not under `/home/astro`
pub(crate) fn format_path_with_tilde_internal(path: &Path, home: Option<&Path>) -> String {
    match home.filter(|h| !h.as_os_str().is_empty()).and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}
