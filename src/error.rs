// src/error.rs

//! Unified error handling for the sitecheck application.

use std::fmt;

use thiserror::Error;

/// Result type alias for sitecheck operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisted records could not be parsed
    #[error("Record store parse error: {0}")]
    StoreParse(#[source] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more probes in a crawl batch failed
    #[error(transparent)]
    Batch(#[from] BatchFailure),

    /// The run was cancelled before it completed
    #[error("Cancelled")]
    Cancelled,
}

impl AppError {
    /// Create a storage backend error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Why a single probe failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeErrorKind {
    /// The request could not be completed
    Network(String),
    /// The response carried no `Last-Modified` header
    MissingHeader,
    /// The `Last-Modified` header could not be parsed
    InvalidHeader(String),
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeErrorKind::Network(message) => write!(f, "network error: {message}"),
            ProbeErrorKind::MissingHeader => write!(f, "missing Last-Modified header"),
            ProbeErrorKind::InvalidHeader(value) => {
                write!(f, "unparseable Last-Modified header {value:?}")
            }
        }
    }
}

/// Failure of one freshness probe against one URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{url}: {kind}")]
pub struct ProbeFailure {
    pub url: String,
    pub kind: ProbeErrorKind,
}

impl ProbeFailure {
    pub fn new(url: impl Into<String>, kind: ProbeErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// Create a network failure from any displayable cause.
    pub fn network(url: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::new(url, ProbeErrorKind::Network(cause.to_string()))
    }
}

/// Aggregate of every probe failure in one crawl batch.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFailure {
    /// Per-URL failures, in probe order
    pub failures: Vec<ProbeFailure>,
    /// Whether the batch was aborted by cancellation
    pub cancelled: bool,
}

impl BatchFailure {
    /// Check whether nothing went wrong.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    /// URLs whose probe failed.
    pub fn failed_urls(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.url.as_str())
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} probe(s) failed", self.failures.len())?;
        if self.cancelled {
            write!(f, ", crawl cancelled")?;
        }
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}
