//! Command-line interface definitions for the AI news digest.
//!
//! Flags override values from the optional YAML config file (see
//! [`crate::config`]). The NewsAPI key is normally taken from the
//! `NEWS_API_KEY` environment variable.

use clap::Parser;

use crate::classifier::FilterPolicy;
use crate::config::Config;
use crate::timeline::BoundaryPolicy;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Defaults: ./site, strict filtering, inactivity-gap boundaries
/// NEWS_API_KEY=... ai_news_digest
///
/// # Technology sources only, never an empty page, last-seen divider
/// ai_news_digest --category technology --filter-policy fallback-on-empty \
///     --boundary-policy watermark
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory, wiped and recreated on every run
    #[arg(short, long, default_value = "site")]
    pub output_dir: String,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Narrow the search to sources of this category (e.g. "technology")
    #[arg(long)]
    pub category: Option<String>,

    /// What to show when no article passes the relevance filter
    #[arg(long, value_enum)]
    pub filter_policy: Option<FilterPolicy>,

    /// How to mark the boundary between new and already seen articles
    #[arg(long, value_enum)]
    pub boundary_policy: Option<BoundaryPolicy>,

    /// File holding the last-seen timestamp for the watermark policy
    #[arg(long, default_value = ".news_watermark")]
    pub watermark_file: String,
}

impl Cli {
    /// Apply flag overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(category) = &self.category {
            config.category = Some(category.clone());
        }
        if let Some(policy) = self.filter_policy {
            config.filter_policy = policy;
        }
        if let Some(policy) = self.boundary_policy {
            config.boundary_policy = policy;
        }
    }
}
