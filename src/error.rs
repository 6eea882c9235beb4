//! Error taxonomy for the digest pipeline.
//!
//! Only `main` decides how to recover from these. Fetch errors turn into an
//! empty article list, resolution errors into a placeholder body, and
//! timestamp errors into an unknown publication time.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error: {endpoint} returned HTTP {status}")]
    Upstream { endpoint: String, status: u16 },

    #[error("Resolution error for {url}: {reason}")]
    Resolution { url: String, reason: String },

    #[error("Timestamp parse error: {0}")]
    TimestampParse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn resolution(url: &str, reason: impl Into<String>) -> Self {
        Error::Resolution {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
