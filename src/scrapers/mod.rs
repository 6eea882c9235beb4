//! Full-text resolution for accepted articles.
//!
//! NewsAPI only ships a truncated `content` snippet, so every accepted article
//! is resolved to a full body by scraping its page. Resolution follows one of
//! two paths:
//!
//! 1. **Direct**: download the article URL and extract its main text
//! 2. **Aggregator**: for preview-only aggregator hosts, scan the landing page
//!    for the link back to the original publisher and take the direct path on
//!    that link, or fall back to a short attribution line
//!
//! # Submodules
//!
//! - [`extract`]: main-text extraction from article markup
//! - [`aggregator`]: original-publisher link discovery on aggregator pages
//! - [`resolver`]: the [`resolver::ContentResolver`] tying both paths together
//!
//! Page downloads go through the [`PageFetcher`] trait so tests can serve
//! canned markup instead of touching the network.

pub mod aggregator;
pub mod extract;
pub mod resolver;

use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Something that can download the markup behind a URL.
pub trait PageFetcher {
    /// Download `url` and return the response body.
    ///
    /// Any failure (transport, timeout, non-2xx status) is reported as
    /// [`Error::Resolution`].
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`PageFetcher`] over HTTP with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent.to_string())
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::resolution(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::resolution(url, format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolution(url, e.to_string()))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Downloaded page"
        );
        Ok(body)
    }
}
