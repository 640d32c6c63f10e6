//! JSON snapshot writer.
//!
//! The file is overwritten wholesale on every successful run. A run that
//! fails before this point leaves the previous snapshot in place.

use std::path::Path;

use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::BoardError;
use crate::models::OutputDocument;

/// Write an [`OutputDocument`] as pretty-printed JSON to `path`.
///
/// Creates the parent directory if it does not exist.
///
/// # Arguments
///
/// * `document` - The snapshot to serialize
/// * `path` - Destination file, overwritten if present
///
/// # Returns
///
/// `Ok(())` on success.
///
/// # Errors
///
/// Returns [`BoardError::Json`] if serialization fails or [`BoardError::Io`]
/// if the directory or file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_document(document: &OutputDocument, path: &Path) -> Result<(), BoardError> {
    let json = serde_json::to_string_pretty(document)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(
        government = document.government.len(),
        nonprofit = document.nonprofit.len(),
        "Wrote JSON snapshot"
    );
    Ok(())
}
