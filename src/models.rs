//! Data models for fetched, resolved and rendered articles.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`Article`]: A raw record as returned by the NewsAPI `everything` endpoint
//! - [`ResolvedArticle`]: An article plus its resolved full text and parsed timestamp
//! - [`PageItem`]: A render-ready article with formatted timestamps and boundary flag
//! - [`Edition`]: The complete output of one run, written as HTML and JSON
//!
//! Raw articles use camelCase field names to match the upstream JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classifier::CurationPath;
use crate::error::{Error, Result};
use crate::timeline::BoundaryPolicy;

/// The publisher block attached to every upstream article.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Source {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// A raw news article as received from the search API.
///
/// Treated as immutable once fetched. Derived data lives in
/// [`ResolvedArticle`] instead of being written back here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Often truncated by the upstream API (`"... [+1234 chars]"`).
    pub content: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    /// ISO-8601 UTC string, parsed lazily with [`parse_published_at`].
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub source: Source,
}

impl Article {
    /// Lowercased host of the article URL, if the URL parses.
    ///
    /// For example: `"https://www.BizToc.com/x/1"` -> `"www.biztoc.com"`.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    }

    /// Title, description and content joined by spaces, missing fields as empty.
    pub fn searchable_text(&self) -> String {
        [&self.title, &self.description, &self.content]
            .iter()
            .map(|field| field.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An accepted article after the content resolver has run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArticle {
    pub article: Article,
    /// Best-effort body text; never empty.
    pub full_text: String,
    /// `None` when `publishedAt` failed to parse.
    pub published_at_parsed: Option<DateTime<Utc>>,
}

impl ResolvedArticle {
    pub fn new(article: Article, full_text: String) -> Self {
        let published_at_parsed = match parse_published_at(&article.published_at) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(url = %article.url, error = %e, "Treating publication time as unknown");
                None
            }
        };
        Self {
            article,
            full_text,
            published_at_parsed,
        }
    }
}

/// Parse an upstream `publishedAt` value into a UTC timestamp.
///
/// Accepts RFC 3339 with any offset (`Z`, `+00:00`, fractional seconds).
pub fn parse_published_at(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::TimestampParse("empty publishedAt".to_string()));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::TimestampParse(format!("{trimmed:?}: {e}")))
}

/// One article as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PageItem {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub url: String,
    pub source_name: String,
    pub full_text: String,
    /// Human readable, e.g. `"January 1, 2024 at 10:00 UTC"`.
    pub published_display: String,
    /// RFC 3339, or empty when the upstream timestamp was unparsable.
    pub published_machine: String,
    /// A "new vs. already seen" divider goes right before this item.
    pub boundary_before: bool,
}

/// The complete output of one run.
///
/// Serialized to `articles.json` and rendered to `index.html`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Edition {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub curation: CurationPath,
    pub boundary_policy: BoundaryPolicy,
    pub items: Vec<PageItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_article_deserialization() {
        let json = r#"{
            "source": {"id": null, "name": "Example News"},
            "author": "Someone",
            "title": "New AI model released",
            "description": null,
            "url": "https://x.com/a",
            "urlToImage": "https://x.com/a.png",
            "publishedAt": "2024-01-01T10:00:00Z",
            "content": "Truncated body… [+1200 chars]"
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.title.as_deref(), Some("New AI model released"));
        assert_eq!(article.description, None);
        assert_eq!(article.url_to_image.as_deref(), Some("https://x.com/a.png"));
        assert_eq!(article.source.name, "Example News");
        assert_eq!(article.source.id, None);
    }

    #[test]
    fn test_article_missing_optional_fields() {
        let json = r#"{"url": "https://x.com/b", "source": {"name": "X"}}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.title, None);
        assert_eq!(article.published_at, "");
    }

    #[test]
    fn test_host() {
        let article = Article {
            url: "https://www.BizToc.com/x/123".to_string(),
            ..Default::default()
        };
        assert_eq!(article.host(), Some("www.biztoc.com".to_string()));

        let broken = Article {
            url: "not a url".to_string(),
            ..Default::default()
        };
        assert_eq!(broken.host(), None);
    }

    #[test]
    fn test_searchable_text_treats_missing_fields_as_empty() {
        let article = Article {
            title: Some("Title".to_string()),
            content: Some("Body".to_string()),
            ..Default::default()
        };
        assert_eq!(article.searchable_text(), "Title  Body");
    }

    #[test]
    fn test_parse_published_at() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_published_at("2024-01-01T10:00:00Z").unwrap(), expected);
        assert_eq!(
            parse_published_at("2024-01-01T12:00:00+02:00").unwrap(),
            expected
        );
        assert!(parse_published_at("yesterday").is_err());
        assert!(parse_published_at("").is_err());
    }

    #[test]
    fn test_resolved_article_with_bad_timestamp() {
        let article = Article {
            url: "https://x.com/a".to_string(),
            published_at: "not-a-date".to_string(),
            ..Default::default()
        };
        let resolved = ResolvedArticle::new(article, "body".to_string());
        assert_eq!(resolved.published_at_parsed, None);
        assert_eq!(resolved.full_text, "body");
    }

    #[test]
    fn test_edition_serialization() {
        let edition = Edition {
            title: "Latest AI News".to_string(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            curation: CurationPath::Filtered,
            boundary_policy: BoundaryPolicy::InactivityGap,
            items: vec![],
        };

        let json = serde_json::to_string(&edition).unwrap();
        assert!(json.contains("2024-01-01T12:00:00Z"));
        assert!(json.contains("inactivity-gap"));
    }
}
