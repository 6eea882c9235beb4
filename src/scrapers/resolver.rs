//! The content resolver: one full-text body per accepted article.
//!
//! [`ContentResolver::resolve`] never fails. Every error is logged and scoped
//! to the article that caused it, and the body degrades to
//! [`PLACEHOLDER`] (direct path) or an attribution line (aggregator path).

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::PageFetcher;
use super::aggregator::{attribution, find_original_link};
use super::extract::extract_main_text;
use crate::classifier::host_matches;
use crate::config::Config;
use crate::error::Result;
use crate::models::{Article, ResolvedArticle};

pub const PLACEHOLDER: &str = "full article not available";

#[derive(Debug)]
pub struct ContentResolver<F> {
    fetcher: F,
    aggregator_domains: Vec<String>,
    link_phrases: Vec<String>,
}

impl<F: PageFetcher> ContentResolver<F> {
    pub fn new(fetcher: F, aggregator_domains: &[String], link_phrases: &[String]) -> Self {
        Self {
            fetcher,
            aggregator_domains: aggregator_domains
                .iter()
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            link_phrases: link_phrases.to_vec(),
        }
    }

    pub fn from_config(fetcher: F, config: &Config) -> Self {
        Self::new(
            fetcher,
            &config.aggregator_domains,
            &config.aggregator_link_phrases,
        )
    }

    /// Resolve the full text behind `url`. Always returns a non-empty string.
    #[instrument(level = "info", skip(self))]
    pub async fn resolve(&self, url: &str) -> String {
        if self.is_aggregator(url) {
            self.resolve_via_aggregator(url).await
        } else {
            self.resolve_direct(url).await
        }
    }

    /// Resolve every article in order, one at a time.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn resolve_all(&self, articles: Vec<Article>) -> Vec<ResolvedArticle> {
        let resolved: Vec<ResolvedArticle> = stream::iter(articles)
            .then(|article| async move {
                let full_text = self.resolve(&article.url).await;
                ResolvedArticle::new(article, full_text)
            })
            .collect()
            .await;

        let unavailable = resolved
            .iter()
            .filter(|r| r.full_text == PLACEHOLDER)
            .count();
        info!(
            count = resolved.len(),
            unavailable, "Resolved article full text"
        );
        resolved
    }

    async fn resolve_direct(&self, url: &str) -> String {
        match self.fetch_text(url).await {
            Ok(text) => {
                debug!(bytes = text.len(), "Extracted article text");
                text
            }
            Err(e) => {
                warn!(error = %e, "Full text unavailable; using placeholder");
                PLACEHOLDER.to_string()
            }
        }
    }

    async fn resolve_via_aggregator(&self, url: &str) -> String {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Aggregator page unavailable; using attribution");
                return attribution(url);
            }
        };

        match find_original_link(&page, url, &self.link_phrases) {
            Some(original) => {
                info!(%original, "Following aggregator link to original publisher");
                self.resolve_direct(&original).await
            }
            None => {
                warn!("No original-publisher link on aggregator page; using attribution");
                attribution(url)
            }
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let html = self.fetcher.fetch(url).await?;
        extract_main_text(&html, url)
    }

    fn is_aggregator(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        parsed.host_str().is_some_and(|host| {
            let host = host.to_ascii_lowercase();
            self.aggregator_domains
                .iter()
                .any(|d| host_matches(&host, d))
        })
    }
}
