// src/config.rs
// =============================================================================
// This module loads the crawl configuration from a TOML file.
//
// The file supplies everything the crawl needs at process start:
// - start_urls: category pages the pagination discoverers begin from
// - user_agent and extra request headers
// - workers: how many product consumers run side by side
// - max_delay_ms: upper bound of the random pause before every request
// - request_timeout_secs / max_retries: how failed fetches are bounded
// - [stop_lists]: disqualifying ingredient terms, one list per alphabet
//
// Once loaded the config is never mutated; the crawler shares it read-only.
// =============================================================================

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::checker::StopLists;

/// Errors raised while reading or validating a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// Category listing pages to start from
    pub start_urls: Vec<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Size of the product consumer pool
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Every request waits a random 0..=max_delay_ms first
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How many times a single URL may be rescheduled after a failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub stop_lists: StopLists,
}

fn default_user_agent() -> String {
    concat!("composition-crawler/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_workers() -> usize {
    3
}

// The catalog throttles aggressive clients, so the default pause is long
fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

impl CrawlConfig {
    // Reads, parses and validates a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: CrawlConfig = toml::from_str(raw)?;
        config.stop_lists = config.stop_lists.normalized();
        config.validate()?;
        Ok(config)
    }

    // Checks the things serde can't: non-empty lists, sane numbers, real URLs
    //
    // Called again by the CLI after command-line overrides are applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_urls.is_empty() {
            return Err(ConfigError::Invalid("start_urls must not be empty".into()));
        }

        for start_url in &self.start_urls {
            let parsed = Url::parse(start_url).map_err(|e| {
                ConfigError::Invalid(format!("start url '{}' is not valid: {}", start_url, e))
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ConfigError::Invalid(format!(
                    "start url '{}' must use http or https",
                    start_url
                )));
            }
        }

        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be greater than 0".into()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        HeaderValue::from_str(&self.user_agent)
            .map_err(|_| ConfigError::Invalid(format!("bad user_agent '{}'", self.user_agent)))?;

        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::Invalid(format!("bad header name '{}'", name)))?;
            HeaderValue::from_str(value)
                .map_err(|_| ConfigError::Invalid(format!("bad value for header '{}'", name)))?;
        }

        Ok(())
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
