//! NewsAPI client: article search and category source lookup.
//!
//! Two endpoints are used:
//! - `GET {base}/everything`: the article search, newest first, one page
//! - `GET {base}/top-headlines/sources`: source ids for a category, used to
//!   narrow the search
//!
//! The search call targets one trusted endpoint and runs without a timeout.
//! A missing credential is rejected when the client is built, before any
//! request goes out.

use itertools::Itertools;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::Article;

/// Title NewsAPI substitutes for articles that were taken down.
const REMOVED_MARKER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct SourcesResponse {
    #[serde(default)]
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    id: Option<String>,
}

pub struct NewsApiClient {
    http: Client,
    api_key: String,
    base_url: String,
    query: String,
    search_in_title: bool,
    page_size: u32,
    language: String,
}

impl std::fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.base_url)
            .field("query", &self.query)
            .field("page_size", &self.page_size)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl NewsApiClient {
    /// Build a client from the configured credential.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the key is absent or blank.
    pub fn new(api_key: Option<String>, config: &Config) -> Result<Self> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Configuration("NEWS_API_KEY is not set; cannot query NewsAPI".to_string())
            })?;

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            query: config.query.clone(),
            search_in_title: config.search_in_title,
            page_size: config.page_size,
            language: config.language.clone(),
        })
    }

    /// Look up source ids for `category` and join them with commas.
    ///
    /// Returns `None` when the category has no sources, so the caller can
    /// search without a source restriction.
    #[instrument(level = "info", skip(self))]
    pub async fn lookup_sources(&self, category: &str) -> Result<Option<String>> {
        let endpoint = format!("{}/top-headlines/sources", self.base_url);
        let params = [
            ("category", category),
            ("language", self.language.as_str()),
            ("apiKey", self.api_key.as_str()),
        ];

        let body = self.get(&endpoint, &params).await?;
        let parsed: SourcesResponse = serde_json::from_str(&body)?;
        let joined = join_source_ids(&parsed.sources);
        info!(category, found = joined.is_some(), "Resolved category sources");
        debug!(sources = ?joined, "Category source ids");
        Ok(joined)
    }

    /// Fetch one page of articles, newest first.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_articles(&self, sources: Option<&str>) -> Result<Vec<Article>> {
        let endpoint = format!("{}/everything", self.base_url);
        let page_size = self.page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("q", self.query.as_str()),
            ("sortBy", "publishedAt"),
            ("pageSize", page_size.as_str()),
            ("language", self.language.as_str()),
            ("apiKey", self.api_key.as_str()),
        ];
        if self.search_in_title {
            params.push(("searchIn", "title"));
        }
        if let Some(sources) = sources {
            params.push(("sources", sources));
        }

        let body = self.get(&endpoint, &params).await?;
        let articles = parse_articles(&body)?;
        info!(count = articles.len(), "Fetched articles from NewsAPI");
        Ok(articles)
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let t0 = Instant::now();
        let response = self.http.get(endpoint).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis();

        if !status.is_success() {
            warn!(
                endpoint,
                status = status.as_u16(),
                elapsed_ms,
                body = %crate::utils::truncate_for_log(&body, 300),
                "NewsAPI request failed"
            );
            return Err(Error::Upstream {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(endpoint, elapsed_ms, bytes = body.len(), "NewsAPI request succeeded");
        Ok(body)
    }
}

/// Parse an `everything` response body, dropping upstream placeholders.
pub fn parse_articles(body: &str) -> Result<Vec<Article>> {
    let parsed: EverythingResponse = serde_json::from_str(body)?;
    let total = parsed.articles.len();
    let articles = parsed
        .articles
        .into_iter()
        .filter(|a| !a.url.trim().is_empty())
        .filter(|a| a.title.as_deref() != Some(REMOVED_MARKER))
        .collect::<Vec<_>>();
    if articles.len() < total {
        debug!(dropped = total - articles.len(), "Dropped removed or URL-less articles");
    }
    Ok(articles)
}

fn join_source_ids(sources: &[SourceEntry]) -> Option<String> {
    let joined = sources
        .iter()
        .filter_map(|s| s.id.as_deref())
        .filter(|id| !id.is_empty())
        .join(",");
    if joined.is_empty() { None } else { Some(joined) }
}
