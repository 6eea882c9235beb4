//! # AI News Digest
//!
//! Builds a static page of recent AI articles pulled from NewsAPI.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... ai_news_digest -o ./site
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: One page of newest-first articles from NewsAPI, optionally
//!    narrowed to the sources of a category
//! 2. **Classification**: Blocklist, aggregator bypass and whole-word keyword
//!    rules keep only on-topic articles
//! 3. **Resolution**: Each kept article gets a full-text body, following
//!    aggregator pages through to the original publisher
//! 4. **Partitioning**: Boundaries between new and already seen articles,
//!    by persisted watermark or by inactivity gap
//! 5. **Output**: `index.html` and `articles.json` in a freshly recreated
//!    output directory
//!
//! Everything runs on a single thread, one network call at a time.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::error::Error as StdError;
use std::path::Path;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod classifier;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod scrapers;
mod timeline;
mod utils;

use api::NewsApiClient;
use classifier::{Classifier, CurationPath};
use cli::Cli;
use config::Config;
use error::{Error, Result};
use models::Article;
use outputs::{build_edition, html, json, site};
use scrapers::resolver::ContentResolver;
use scrapers::{HttpFetcher, PageFetcher};
use timeline::{
    BoundaryPolicy, FileWatermark, TimelineEntry, WatermarkStore, newest_timestamp, partition,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn StdError>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_news_digest starting up");

    let args = Cli::parse();
    debug!(output_dir = %args.output_dir, config = ?args.config, "Parsed CLI arguments");

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Cannot load configuration");
            return Err(e.into());
        }
    };
    args.apply_overrides(&mut config);
    info!(
        filter_policy = ?config.filter_policy,
        boundary_policy = %config.boundary_policy,
        category = ?config.category,
        "Configuration ready"
    );

    // ---- Fetch ----
    let articles = match fetch_candidates(args.news_api_key.clone(), &config).await {
        Ok(articles) => articles,
        Err(e @ Error::Configuration(_)) => {
            error!(error = %e, "Missing credential; rendering an empty page");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Fetching articles failed; rendering an empty page");
            Vec::new()
        }
    };

    // ---- Curate, resolve, partition ----
    let fetcher = HttpFetcher::new(
        StdDuration::from_secs(config.scrape_timeout_secs),
        &config.user_agent,
    )?;
    let resolver = ContentResolver::from_config(fetcher, &config);
    let mut watermark_store = FileWatermark::new(&args.watermark_file);
    let watermark = match config.boundary_policy {
        BoundaryPolicy::Watermark => watermark_store.load(),
        BoundaryPolicy::InactivityGap => None,
    };
    info!(?watermark, "Last-seen watermark");

    let (curation, entries) = curate_and_partition(articles, &config, &resolver, watermark).await;
    let newest = newest_timestamp(&entries);

    // ---- Render ----
    let edition = build_edition(
        &config.page_title,
        entries,
        curation,
        config.boundary_policy,
        Utc::now(),
    );
    let page = html::render_page(&edition);
    let output_dir = Path::new(&args.output_dir);

    if let Err(e) = site::recreate_dir(output_dir).await {
        error!(path = %args.output_dir, error = %e, "Cannot recreate output directory");
        return Err(e.into());
    }
    if let Err(e) = site::write_index(output_dir, &page).await {
        error!(path = %args.output_dir, error = %e, "Failed writing HTML page");
        return Err(e.into());
    }
    if let Err(e) = json::write_edition(&edition, output_dir).await {
        error!(error = %e, "Failed to write JSON edition");
    }

    // The watermark only moves after a successful render.
    if config.boundary_policy == BoundaryPolicy::Watermark {
        store_watermark(&mut watermark_store, newest);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = edition.items.len(),
        curation = %edition.curation,
        path = %output_dir.join(site::INDEX_FILENAME).display(),
        "Site generated"
    );
    Ok(())
}

/// Query NewsAPI, narrowing by category sources when one is configured.
#[instrument(level = "info", skip_all)]
async fn fetch_candidates(api_key: Option<String>, config: &Config) -> Result<Vec<Article>> {
    let client = NewsApiClient::new(api_key, config)?;
    let sources = match config.category.as_deref() {
        Some(category) => client.lookup_sources(category).await?,
        None => None,
    };
    client.fetch_articles(sources.as_deref()).await
}

/// Classify, resolve and partition one batch of fetched articles.
///
/// Never fails: per-article problems degrade inside the resolver and the
/// partitioner.
async fn curate_and_partition<F: PageFetcher>(
    articles: Vec<Article>,
    config: &Config,
    resolver: &ContentResolver<F>,
    watermark: Option<DateTime<Utc>>,
) -> (CurationPath, Vec<TimelineEntry>) {
    let classifier = Classifier::from_config(config);
    let curation = classifier.curate(articles);
    let resolved = resolver.resolve_all(curation.articles).await;
    let entries = partition(
        resolved,
        config.boundary_policy,
        watermark,
        config.gap_threshold(),
    );
    (curation.path, entries)
}

fn store_watermark(store: &mut impl WatermarkStore, newest: Option<DateTime<Utc>>) {
    let Some(newest) = newest else {
        debug!("No parsed timestamps; watermark unchanged");
        return;
    };
    match store.store(newest) {
        Ok(()) => info!(%newest, "Updated watermark"),
        Err(e) => warn!(error = %e, "Failed to persist watermark"),
    }
}
