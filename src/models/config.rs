//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pages to check, probed in this order
    #[serde(default)]
    pub urls: Vec<String>,

    /// HTTP and polling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults only if the file is missing.
    ///
    /// A file that exists but cannot be read or parsed is an error, so a
    /// later `save` never replaces it with defaults.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the configuration as TOML, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.crawler.validate()?;
        for url in &self.urls {
            url::Url::parse(url)
                .map_err(|e| AppError::validation(format!("invalid site url {url:?}: {e}")))?;
        }
        Ok(())
    }

    /// Register a site. Returns false if it was already registered.
    pub fn add_url(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() || self.urls.iter().any(|u| u == url) {
            return false;
        }
        self.urls.push(url.to_string());
        true
    }

    /// Unregister a site. Returns false if it was not registered.
    pub fn remove_url(&mut self, url: &str) -> bool {
        let url = url.trim();
        match self.urls.iter().position(|u| u == url) {
            Some(index) => {
                self.urls.remove(index);
                true
            }
            None => false,
        }
    }
}

/// HTTP client and polling behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum pause between two probes, in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (defaults to five intervals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Outbound proxy, used only when requested on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            user_agent: defaults::user_agent(),
            timeout_secs: None,
            proxy: None,
        }
    }
}

impl CrawlerConfig {
    /// Pause enforced before every probe except the first.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        let secs = self
            .timeout_secs
            .unwrap_or_else(|| self.interval_secs.saturating_mul(5));
        Duration::from_secs(secs.max(1))
    }

    /// Set the polling interval in seconds.
    pub fn set_interval(&mut self, secs: i64) -> Result<()> {
        if secs < 1 {
            return Err(AppError::validation(format!(
                "interval must be greater than 0, got {secs}"
            )));
        }
        self.interval_secs = secs as u64;
        Ok(())
    }

    /// Set the proxy endpoint. An empty value clears it.
    pub fn set_proxy(&mut self, proxy: &str) -> Result<()> {
        let proxy = proxy.trim();
        if proxy.is_empty() {
            self.proxy = None;
            return Ok(());
        }
        url::Url::parse(proxy)?;
        self.proxy = Some(proxy.to_string());
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(AppError::validation("crawler.interval_secs must be > 0"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if let Some(proxy) = &self.proxy {
            url::Url::parse(proxy)
                .map_err(|e| AppError::validation(format!("invalid proxy url {proxy:?}: {e}")))?;
        }
        Ok(())
    }
}

mod defaults {
    pub fn interval() -> u64 {
        1
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; sitecheck/0.1)".into()
    }
}
