//! Timeline partitioning: where "new" ends and "already seen" begins.
//!
//! Articles arrive newest first. Two interchangeable policies place
//! boundary markers in that sequence:
//!
//! - **Watermark**: one marker before the first article strictly older than
//!   the last-seen timestamp read from a [`WatermarkStore`]
//! - **Inactivity gap**: a marker before every article published more than
//!   a threshold before its predecessor, i.e. wherever the feed went quiet
//!   for longer than the threshold
//!
//! Articles with unknown timestamps are rendered but never compared: they
//! neither receive a marker nor cause one on their neighbour.

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::models::ResolvedArticle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPolicy {
    /// Mark the first article older than the persisted last-seen time.
    Watermark,
    /// Mark every gap between consecutive articles above the threshold.
    #[default]
    InactivityGap,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Watermark => f.write_str("watermark"),
            BoundaryPolicy::InactivityGap => f.write_str("inactivity-gap"),
        }
    }
}

/// A resolved article and whether a boundary marker precedes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub article: ResolvedArticle,
    pub boundary_before: bool,
}

/// Read/write port for the single "last seen" timestamp.
pub trait WatermarkStore {
    fn load(&self) -> Option<DateTime<Utc>>;
    fn store(&mut self, newest: DateTime<Utc>) -> Result<()>;
}

/// Watermark kept in memory. Useful for tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryWatermark(pub Option<DateTime<Utc>>);

impl WatermarkStore for MemoryWatermark {
    fn load(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    fn store(&mut self, newest: DateTime<Utc>) -> Result<()> {
        self.0 = Some(newest);
        Ok(())
    }
}

/// Watermark persisted as an RFC 3339 line in a text file.
///
/// A missing or unreadable file reads as "no watermark" (first run).
#[derive(Debug, Clone)]
pub struct FileWatermark {
    path: PathBuf,
}

impl FileWatermark {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WatermarkStore for FileWatermark {
    fn load(&self) -> Option<DateTime<Utc>> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable watermark");
                None
            }
        }
    }

    fn store(&mut self, newest: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, format!("{}\n", newest.to_rfc3339()))?;
        debug!(path = %self.path.display(), %newest, "Stored watermark");
        Ok(())
    }
}

/// Partition a newest-first sequence under the chosen policy.
///
/// `watermark` is only consulted by [`BoundaryPolicy::Watermark`]. The result
/// has the same length and order as the input.
#[instrument(level = "info", skip(articles), fields(count = articles.len()))]
pub fn partition(
    articles: Vec<ResolvedArticle>,
    policy: BoundaryPolicy,
    watermark: Option<DateTime<Utc>>,
    gap_threshold: Duration,
) -> Vec<TimelineEntry> {
    let flags = match policy {
        BoundaryPolicy::Watermark => watermark_boundaries(&articles, watermark),
        BoundaryPolicy::InactivityGap => gap_boundaries(&articles, gap_threshold),
    };

    let boundaries = flags.iter().filter(|b| **b).count();
    info!(%policy, boundaries, "Partitioned timeline");

    articles
        .into_iter()
        .zip(flags)
        .map(|(article, boundary_before)| TimelineEntry {
            article,
            boundary_before,
        })
        .collect()
}

/// At most one marker: the first article strictly older than `watermark`.
fn watermark_boundaries(
    articles: &[ResolvedArticle],
    watermark: Option<DateTime<Utc>>,
) -> Vec<bool> {
    let mut flags = vec![false; articles.len()];
    let Some(watermark) = watermark else {
        debug!("No watermark; everything is new");
        return flags;
    };

    let crossing = articles
        .iter()
        .position(|a| a.published_at_parsed.is_some_and(|ts| ts < watermark));
    if let Some(i) = crossing {
        flags[i] = true;
    }
    flags
}

/// A marker before every article more than `threshold` older than its predecessor.
fn gap_boundaries(articles: &[ResolvedArticle], threshold: Duration) -> Vec<bool> {
    let threshold = threshold.max(Duration::zero());
    let mut flags = vec![false; articles.len()];
    for (i, pair) in articles.windows(2).enumerate() {
        let (Some(newer), Some(older)) = (pair[0].published_at_parsed, pair[1].published_at_parsed)
        else {
            continue;
        };
        if newer - older > threshold {
            flags[i + 1] = true;
        }
    }
    flags
}

/// Newest parsed timestamp in the sequence, the next watermark value.
pub fn newest_timestamp(articles: &[TimelineEntry]) -> Option<DateTime<Utc>> {
    articles
        .iter()
        .filter_map(|e| e.article.published_at_parsed)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;

    fn resolved(url: &str, published_at: &str) -> ResolvedArticle {
        ResolvedArticle::new(
            Article {
                url: url.to_string(),
                published_at: published_at.to_string(),
                ..Default::default()
            },
            "body".to_string(),
        )
    }

    fn ts(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn flags(entries: &[TimelineEntry]) -> Vec<bool> {
        entries.iter().map(|e| e.boundary_before).collect()
    }

    fn hour() -> Duration {
        Duration::minutes(60)
    }

    #[test]
    fn test_gap_below_threshold_inserts_nothing() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T10:00:00Z"),
            resolved("https://x.com/b", "2024-01-01T09:50:00Z"),
        ];
        let entries = partition(articles, BoundaryPolicy::InactivityGap, None, hour());
        assert_eq!(flags(&entries), vec![false, false]);
    }

    #[test]
    fn test_gap_policy_marks_every_long_gap() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T12:00:00Z"),
            resolved("https://x.com/b", "2024-01-01T10:30:00Z"),
            resolved("https://x.com/c", "2024-01-01T10:00:00Z"),
            resolved("https://x.com/d", "2024-01-01T08:00:00Z"),
        ];
        let entries = partition(articles, BoundaryPolicy::InactivityGap, None, hour());
        assert_eq!(flags(&entries), vec![false, true, false, true]);
    }

    #[test]
    fn test_gap_exactly_at_threshold_is_not_a_boundary() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T10:00:00Z"),
            resolved("https://x.com/b", "2024-01-01T09:00:00Z"),
        ];
        let entries = partition(articles, BoundaryPolicy::InactivityGap, None, hour());
        assert_eq!(flags(&entries), vec![false, false]);
    }

    #[test]
    fn test_gap_policy_skips_unparsable_timestamps() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T12:00:00Z"),
            resolved("https://x.com/b", "garbage"),
            resolved("https://x.com/c", "2024-01-01T08:00:00Z"),
        ];
        let entries = partition(articles, BoundaryPolicy::InactivityGap, None, hour());
        assert_eq!(flags(&entries), vec![false, false, false]);
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_negative_threshold_does_not_split_equal_timestamps() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T10:00:00Z"),
            resolved("https://x.com/b", "2024-01-01T10:00:00Z"),
        ];
        let entries = partition(
            articles,
            BoundaryPolicy::InactivityGap,
            None,
            Duration::minutes(-5),
        );
        assert_eq!(flags(&entries), vec![false, false]);
    }

    #[test]
    fn test_gap_policy_tolerates_out_of_order_input() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T08:00:00Z"),
            resolved("https://x.com/b", "2024-01-01T12:00:00Z"),
        ];
        let entries = partition(articles, BoundaryPolicy::InactivityGap, None, hour());
        assert_eq!(flags(&entries), vec![false, false]);
    }

    #[test]
    fn test_watermark_marks_first_crossing_only() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T10:00:00Z"),
            resolved("https://x.com/b", "2024-01-01T08:00:00Z"),
            resolved("https://x.com/c", "2024-01-01T07:00:00Z"),
        ];
        let entries = partition(
            articles,
            BoundaryPolicy::Watermark,
            Some(ts("2024-01-01T09:00:00Z")),
            hour(),
        );
        assert_eq!(flags(&entries), vec![false, true, false]);
    }

    #[test]
    fn test_watermark_single_old_article() {
        let articles = vec![resolved("https://x.com/a", "2024-01-01T08:00:00Z")];
        let entries = partition(
            articles,
            BoundaryPolicy::Watermark,
            Some(ts("2024-01-01T09:00:00Z")),
            hour(),
        );
        assert_eq!(flags(&entries), vec![true]);
    }

    #[test]
    fn test_watermark_equal_timestamp_is_not_older() {
        let articles = vec![resolved("https://x.com/a", "2024-01-01T09:00:00Z")];
        let entries = partition(
            articles,
            BoundaryPolicy::Watermark,
            Some(ts("2024-01-01T09:00:00Z")),
            hour(),
        );
        assert_eq!(flags(&entries), vec![false]);
    }

    #[test]
    fn test_watermark_absent_marks_nothing() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T10:00:00Z"),
            resolved("https://x.com/b", "2020-01-01T10:00:00Z"),
        ];
        let entries = partition(articles, BoundaryPolicy::Watermark, None, hour());
        assert_eq!(flags(&entries), vec![false, false]);
    }

    #[test]
    fn test_watermark_skips_unparsable_timestamps() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T10:00:00Z"),
            resolved("https://x.com/b", ""),
            resolved("https://x.com/c", "2024-01-01T08:00:00Z"),
        ];
        let entries = partition(
            articles,
            BoundaryPolicy::Watermark,
            Some(ts("2024-01-01T09:00:00Z")),
            hour(),
        );
        assert_eq!(flags(&entries), vec![false, false, true]);
    }

    #[test]
    fn test_partition_is_idempotent() {
        let articles = vec![
            resolved("https://x.com/a", "2024-01-01T12:00:00Z"),
            resolved("https://x.com/b", "2024-01-01T08:00:00Z"),
        ];
        let watermark = Some(ts("2024-01-01T09:00:00Z"));
        for policy in [BoundaryPolicy::Watermark, BoundaryPolicy::InactivityGap] {
            let first = partition(articles.clone(), policy, watermark, hour());
            let second = partition(articles.clone(), policy, watermark, hour());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_newest_timestamp() {
        let articles = vec![
            resolved("https://x.com/a", "bad"),
            resolved("https://x.com/b", "2024-01-01T08:00:00Z"),
            resolved("https://x.com/c", "2024-01-01T11:00:00Z"),
        ];
        let entries = partition(articles, BoundaryPolicy::InactivityGap, None, hour());
        assert_eq!(newest_timestamp(&entries), Some(ts("2024-01-01T11:00:00Z")));
        assert_eq!(newest_timestamp(&[]), None);
    }

    #[test]
    fn test_memory_watermark_round_trip() {
        let mut store = MemoryWatermark::default();
        assert_eq!(store.load(), None);
        store.store(ts("2024-01-01T10:00:00Z")).unwrap();
        assert_eq!(store.load(), Some(ts("2024-01-01T10:00:00Z")));
    }

    #[test]
    fn test_file_watermark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("watermark");
        let mut store = FileWatermark::new(&path);
        assert_eq!(store.load(), None);

        store.store(ts("2024-01-01T10:00:00Z")).unwrap();
        assert_eq!(store.load(), Some(ts("2024-01-01T10:00:00Z")));

        std::fs::write(&path, "not a timestamp").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_boundary_policy_display() {
        assert_eq!(BoundaryPolicy::Watermark.to_string(), "watermark");
        assert_eq!(BoundaryPolicy::InactivityGap.to_string(), "inactivity-gap");
    }
}
