//! Output generation for the static site.
//!
//! # Submodules
//!
//! - [`html`]: Renders an [`Edition`] to a single self-contained page
//! - [`json`]: Writes the same [`Edition`] as JSON next to the page
//! - [`site`]: Recreates the output directory and writes files into it
//!
//! # Output Structure
//!
//! ```text
//! site/
//! ├── index.html
//! └── articles.json
//! ```

pub mod html;
pub mod json;
pub mod site;

use chrono::{DateTime, Utc};

use crate::classifier::CurationPath;
use crate::models::{Edition, PageItem};
use crate::timeline::{BoundaryPolicy, TimelineEntry};
use crate::utils::{display_timestamp, machine_timestamp};

impl From<TimelineEntry> for PageItem {
    fn from(entry: TimelineEntry) -> Self {
        let TimelineEntry {
            article: resolved,
            boundary_before,
        } = entry;
        let published_display = display_timestamp(resolved.published_at_parsed);
        let published_machine = machine_timestamp(resolved.published_at_parsed);
        let article = resolved.article;

        PageItem {
            title: article
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| article.url.clone()),
            description: article.description.filter(|d| !d.trim().is_empty()),
            image_url: article.url_to_image.filter(|u| !u.trim().is_empty()),
            source_name: article.source.name,
            url: article.url,
            full_text: resolved.full_text,
            published_display,
            published_machine,
            boundary_before,
        }
    }
}

/// Assemble the render-ready edition for one run.
pub fn build_edition(
    title: &str,
    entries: Vec<TimelineEntry>,
    curation: CurationPath,
    policy: BoundaryPolicy,
    generated_at: DateTime<Utc>,
) -> Edition {
    Edition {
        title: title.to_string(),
        generated_at,
        curation,
        boundary_policy: policy,
        items: entries.into_iter().map(PageItem::from).collect(),
    }
}
