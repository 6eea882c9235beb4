//! Output directory management.
//!
//! Each run starts from an empty output directory: whatever a previous run
//! left behind is removed, then `index.html` is written fresh.

use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;

pub const INDEX_FILENAME: &str = "index.html";

/// Remove `path` if it exists, then create it again, empty.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn recreate_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => info!("Removed previous output directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(path).await?;
    Ok(())
}

/// Write the rendered page to `{output_dir}/index.html`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_index(output_dir: &Path, html: &str) -> Result<()> {
    let path = output_dir.join(INDEX_FILENAME);
    fs::write(&path, html).await?;
    info!(path = %path.display(), bytes = html.len(), "Wrote HTML page");
    Ok(())
}
