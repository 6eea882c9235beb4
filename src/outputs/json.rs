//! JSON output of the rendered edition.
//!
//! The same [`Edition`] that backs `index.html` is written to
//! `articles.json`, so other tools can consume a run without scraping the
//! page.

use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::Edition;

pub const JSON_FILENAME: &str = "articles.json";

/// Write `edition` as pretty-printed JSON into `output_dir`.
///
/// The directory must already exist (see [`super::site::recreate_dir`]).
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_edition(edition: &Edition, output_dir: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(edition)?;
    let path = output_dir.join(JSON_FILENAME);
    fs::write(&path, json).await?;
    info!(path = %path.display(), items = edition.items.len(), "Wrote JSON edition");
    Ok(())
}
