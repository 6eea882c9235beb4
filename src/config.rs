//! Run configuration.
//!
//! Values come from three layers, later ones winning:
//! 1. Built-in defaults ([`Config::default`])
//! 2. An optional YAML file passed with `--config`
//! 3. Command-line flags (see [`crate::cli::Cli`])
//!
//! Every key in the YAML file is optional, so a file only needs to name the
//! settings it changes:
//!
//! ```yaml
//! category: technology
//! filter_policy: fallback-on-empty
//! boundary_policy: watermark
//! blocklist:
//!   - pypi.org
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

use crate::classifier::FilterPolicy;
use crate::error::{Error, Result};
use crate::timeline::BoundaryPolicy;

/// Upper bound for `gap_threshold_minutes`: one week.
pub const MAX_GAP_THRESHOLD_MINUTES: i64 = 7 * 24 * 60;

const DEFAULT_TERMS: [&str; 5] = [
    "Artificial Intelligence",
    "machine learning",
    "deep learning",
    "neural network",
    "AI",
];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the NewsAPI v2 endpoints.
    pub api_base_url: String,
    /// Boolean query sent as `q`.
    pub query: String,
    /// Restrict the query to article titles (`searchIn=title`).
    pub search_in_title: bool,
    pub page_size: u32,
    pub language: String,
    /// When set, narrow the search to sources of this category.
    pub category: Option<String>,
    /// Whole-word, case-insensitive relevance keywords.
    pub keywords: Vec<String>,
    /// Hosts rejected before any text check.
    pub blocklist: Vec<String>,
    /// Preview-only hosts accepted without a text check. Empty disables the bypass.
    pub bypass_domains: Vec<String>,
    /// Hosts whose pages are resolved through to the original publisher.
    pub aggregator_domains: Vec<String>,
    /// Anchor text fragments that mark the original-publisher link.
    pub aggregator_link_phrases: Vec<String>,
    pub filter_policy: FilterPolicy,
    pub boundary_policy: BoundaryPolicy,
    pub gap_threshold_minutes: i64,
    /// Timeout for full-text and aggregator fetches. The search call has none.
    pub scrape_timeout_secs: u64,
    pub user_agent: String,
    pub page_title: String,
}

impl Default for Config {
    fn default() -> Self {
        let query = format!(
            "({})",
            DEFAULT_TERMS
                .iter()
                .map(|t| format!("\"{t}\""))
                .collect::<Vec<_>>()
                .join(" OR ")
        );
        Self {
            api_base_url: "https://newsapi.org/v2".to_string(),
            query,
            search_in_title: false,
            page_size: 20,
            language: "en".to_string(),
            category: None,
            keywords: DEFAULT_TERMS.iter().map(|t| t.to_lowercase()).collect(),
            blocklist: vec!["pypi.org".to_string()],
            bypass_domains: vec!["biztoc.com".to_string()],
            aggregator_domains: vec!["biztoc.com".to_string()],
            aggregator_link_phrases: vec![
                "this story appeared on".to_string(),
                "original article".to_string(),
                "read the full story".to_string(),
                "read more at".to_string(),
            ],
            filter_policy: FilterPolicy::Strict,
            boundary_policy: BoundaryPolicy::InactivityGap,
            gap_threshold_minutes: 60,
            scrape_timeout_secs: 10,
            user_agent: concat!("ai_news_digest/", env!("CARGO_PKG_VERSION")).to_string(),
            page_title: "Latest AI News".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an optional YAML file.
    ///
    /// With no path the built-in defaults are returned. A path that cannot be
    /// read or parsed is a configuration error.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(Path::new(path))
            .map_err(|e| Error::Configuration(format!("cannot read {path}: {e}")))?;
        let config = Self::from_yaml(&raw)?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_GAP_THRESHOLD_MINUTES).contains(&self.gap_threshold_minutes) {
            return Err(Error::Configuration(format!(
                "gap_threshold_minutes must be between 1 and {MAX_GAP_THRESHOLD_MINUTES}, got {}",
                self.gap_threshold_minutes
            )));
        }
        Ok(())
    }

    /// Inactivity gap as a duration, clamped to the accepted range.
    pub fn gap_threshold(&self) -> Duration {
        Duration::minutes(
            self.gap_threshold_minutes
                .clamp(1, MAX_GAP_THRESHOLD_MINUTES),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_query_is_boolean_or() {
        let config = Config::default();
        assert_eq!(
            config.query,
            r#"("Artificial Intelligence" OR "machine learning" OR "deep learning" OR "neural network" OR "AI")"#
        );
        assert_eq!(config.page_size, 20);
        assert_eq!(config.language, "en");
        assert_eq!(config.gap_threshold_minutes, 60);
        assert!(config.keywords.contains(&"ai".to_string()));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "category: technology\nfilter_policy: fallback-on-empty\nboundary_policy: watermark\n",
        )
        .unwrap();
        assert_eq!(config.category.as_deref(), Some("technology"));
        assert_eq!(config.filter_policy, FilterPolicy::FallbackOnEmpty);
        assert_eq!(config.boundary_policy, BoundaryPolicy::Watermark);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.bypass_domains, vec!["biztoc.com".to_string()]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(Config::from_yaml("filter_policy: sometimes\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gap_threshold_minutes: 15").unwrap();
        writeln!(file, "blocklist: [pypi.org]").unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.gap_threshold_minutes, 15);
        assert_eq!(config.blocklist, vec!["pypi.org".to_string()]);
    }

    #[test]
    fn test_non_positive_gap_threshold_is_rejected() {
        for raw in ["gap_threshold_minutes: 0\n", "gap_threshold_minutes: -5\n"] {
            let err = Config::from_yaml(raw).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)));
        }
    }

    #[test]
    fn test_huge_gap_threshold_is_rejected() {
        let err = Config::from_yaml("gap_threshold_minutes: 9223372036854775807\n").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let ok = Config::from_yaml(&format!("gap_threshold_minutes: {MAX_GAP_THRESHOLD_MINUTES}\n"));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_gap_threshold_never_panics() {
        let mut config = Config::default();
        assert_eq!(config.gap_threshold(), Duration::minutes(60));

        config.gap_threshold_minutes = i64::MAX;
        assert_eq!(
            config.gap_threshold(),
            Duration::minutes(MAX_GAP_THRESHOLD_MINUTES)
        );

        config.gap_threshold_minutes = -5;
        assert_eq!(config.gap_threshold(), Duration::minutes(1));
    }

    #[test]
    fn test_default_blocklist_is_not_empty() {
        assert_eq!(Config::default().blocklist, vec!["pypi.org".to_string()]);
    }

    #[test]
    fn test_load_missing_file_is_configuration_error() {
        let err = Config::load(Some("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
