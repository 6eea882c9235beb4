//! Relevance classification.
//!
//! Every article runs through a short rule chain, first match wins:
//!
//! 1. **Blocklist**: the URL host is on the denylist -> rejected
//! 2. **Bypass**: the URL host is a preview-only aggregator -> accepted
//! 3. **Keywords**: title + description + content contain a whole-word
//!    keyword match -> accepted, otherwise rejected
//!
//! Classification only looks at the static text fields of the [`Article`].
//! Resolved full text is never fed back in.

use clap::ValueEnum;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::models::Article;

/// What to do when the keyword chain rejects every fetched article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPolicy {
    /// Show only accepted articles, even if that leaves the page empty.
    #[default]
    Strict,
    /// Show the unfiltered set rather than an empty page.
    FallbackOnEmpty,
}

/// Why an article was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Blocked,
    Bypassed,
    KeywordMatch,
    NoKeyword,
}

impl Verdict {
    pub fn accepted(self) -> bool {
        matches!(self, Verdict::Bypassed | Verdict::KeywordMatch)
    }
}

/// Which path produced the curated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurationPath {
    Filtered,
    FallbackUnfiltered,
}

impl fmt::Display for CurationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurationPath::Filtered => f.write_str("filtered"),
            CurationPath::FallbackUnfiltered => f.write_str("fallback-unfiltered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Curation {
    pub articles: Vec<Article>,
    pub path: CurationPath,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Option<Regex>,
    blocklist: Vec<String>,
    bypass_domains: Vec<String>,
    policy: FilterPolicy,
}

impl Classifier {
    pub fn new(
        keywords: &[String],
        blocklist: &[String],
        bypass_domains: &[String],
        policy: FilterPolicy,
    ) -> Self {
        Self {
            keywords: keyword_regex(keywords),
            blocklist: normalize_domains(blocklist),
            bypass_domains: normalize_domains(bypass_domains),
            policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.keywords,
            &config.blocklist,
            &config.bypass_domains,
            config.filter_policy,
        )
    }

    pub fn classify(&self, article: &Article) -> Verdict {
        let host = article.host();
        if let Some(host) = host.as_deref() {
            if matches_any(host, &self.blocklist) {
                return Verdict::Blocked;
            }
            if matches_any(host, &self.bypass_domains) {
                return Verdict::Bypassed;
            }
        }

        let text = article.searchable_text();
        match &self.keywords {
            Some(re) if re.is_match(&text) => Verdict::KeywordMatch,
            _ => Verdict::NoKeyword,
        }
    }

    /// Keep accepted articles in input order, applying the empty-result policy.
    #[instrument(level = "info", skip_all, fields(input = articles.len(), policy = ?self.policy))]
    pub fn curate(&self, articles: Vec<Article>) -> Curation {
        let mut kept = Vec::with_capacity(articles.len());
        for article in &articles {
            let verdict = self.classify(article);
            debug!(url = %article.url, ?verdict, "Classified article");
            if verdict.accepted() {
                kept.push(article.clone());
            }
        }

        if kept.is_empty() && !articles.is_empty() && self.policy == FilterPolicy::FallbackOnEmpty {
            warn!(
                curation = %CurationPath::FallbackUnfiltered,
                count = articles.len(),
                "No article passed the relevance filter; showing the unfiltered set"
            );
            return Curation {
                articles,
                path: CurationPath::FallbackUnfiltered,
            };
        }

        info!(
            curation = %CurationPath::Filtered,
            kept = kept.len(),
            rejected = articles.len() - kept.len(),
            "Relevance filter applied"
        );
        Curation {
            articles: kept,
            path: CurationPath::Filtered,
        }
    }
}

/// True if `host` is `domain` itself or one of its subdomains.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.');
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn matches_any(host: &str, domains: &[String]) -> bool {
    domains.iter().any(|d| host_matches(host, d))
}

fn normalize_domains(domains: &[String]) -> Vec<String> {
    domains
        .iter()
        .map(|d| d.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

fn keyword_regex(keywords: &[String]) -> Option<Regex> {
    let alternatives = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>();
    if alternatives.is_empty() {
        return None;
    }
    let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "Keyword pattern failed to compile; nothing will match");
            None
        }
    }
}
