//! TOML configuration for the CloudSearch client.
//!
//! ```toml
//! [cloudsearch]
//! domain_id = "abc123xyz"
//! domain_name = "imdb-movies"
//! region = "us-east-1"          # default
//! api_version = "2011-02-01"    # default
//! # search_url = "http://localhost:8080/2011-02-01"
//! timeout_secs = 30             # default
//! ```
//!
//! The required keys are checked lazily by [`SearchConfig::check`], which
//! the searcher calls before rendering a URL. A file that omits them still
//! loads.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::Error;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub cloudsearch: SearchConfig,
}

/// Connection settings for one search domain.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Overrides the endpoint derived from domain, region and API version.
    #[serde(default)]
    pub search_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            domain_id: None,
            domain_name: None,
            region: default_region(),
            api_version: default_api_version(),
            search_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}
fn default_api_version() -> String {
    "2011-02-01".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl SearchConfig {
    pub fn new(domain_id: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            domain_id: Some(domain_id.into()),
            domain_name: Some(domain_name.into()),
            ..Self::default()
        }
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = Some(url.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Base URL that `/search` is appended to.
    ///
    /// Without an explicit `search_url` this is
    /// `http://search-<name>-<id>.<region>.cloudsearch.amazonaws.com/<api_version>`.
    pub fn search_url(&self) -> String {
        match self.search_url {
            Some(ref url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "http://search-{}-{}.{}.cloudsearch.amazonaws.com/{}",
                self.domain_name.as_deref().unwrap_or_default(),
                self.domain_id.as_deref().unwrap_or_default(),
                self.region,
                self.api_version
            ),
        }
    }

    /// Fail with the first missing required key. `domain_id` is checked
    /// before `domain_name`.
    pub fn check(&self) -> crate::Result<()> {
        if is_blank(&self.domain_id) {
            return Err(Error::MissingConfiguration("domain_id"));
        }
        if is_blank(&self.domain_name) {
            return Err(Error::MissingConfiguration("domain_name"));
        }
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.cloudsearch.timeout_secs == 0 {
        anyhow::bail!("cloudsearch.timeout_secs must be > 0");
    }

    if let Some(ref url) = config.cloudsearch.search_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "cloudsearch.search_url must start with http:// or https://, got '{}'",
                url
            );
        }
    }

    Ok(config)
}
