use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Return `configured` if it exists, otherwise ask the user to pick the
/// table. Only used once, before the window opens.
pub fn resolve_data_file(configured: &Path, title: &str) -> Result<PathBuf> {
    if configured.exists() {
        return Ok(configured.to_path_buf());
    }
    log::warn!("{} not found, asking for the file", configured.display());

    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "ods", "csv", "parquet", "pq", "json"])
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file()
        .with_context(|| format!("{} not found and no file was selected", configured.display()))
}
