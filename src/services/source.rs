// src/services/source.rs

//! Freshness probes.
//!
//! A probe is one metadata-only request against one URL that yields the
//! page's last modification time. No retries happen here.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use reqwest::header::LAST_MODIFIED;

use crate::error::{ProbeErrorKind, ProbeFailure};
use crate::models::Timestamp;

/// Layout of `Last-Modified: Wed, 21 Oct 2015 07:28:00 GMT`.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Anything able to report when a URL was last modified.
#[async_trait]
pub trait FreshnessSource: Send + Sync {
    /// Probe one URL for its modification time.
    async fn probe(&self, url: &str) -> Result<Timestamp, ProbeFailure>;
}

/// Probes pages with `HEAD` requests and reads `Last-Modified`.
#[derive(Debug, Clone)]
pub struct HeadSource {
    client: Client,
}

impl HeadSource {
    /// Create a source backed by a configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FreshnessSource for HeadSource {
    async fn probe(&self, url: &str) -> Result<Timestamp, ProbeFailure> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| ProbeFailure::network(url, e))?;

        log::debug!("HEAD {} -> {}", url, response.status());

        let header = response
            .headers()
            .get(LAST_MODIFIED)
            .ok_or_else(|| ProbeFailure::new(url, ProbeErrorKind::MissingHeader))?;
        let value = header.to_str().map_err(|_| {
            ProbeFailure::new(
                url,
                ProbeErrorKind::InvalidHeader(String::from_utf8_lossy(header.as_bytes()).into()),
            )
        })?;

        parse_last_modified(value)
            .ok_or_else(|| ProbeFailure::new(url, ProbeErrorKind::InvalidHeader(value.into())))
    }
}

/// Parse an RFC 1123 HTTP date such as `Wed, 21 Oct 2015 07:28:00 GMT`.
pub fn parse_last_modified(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc2822(value).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}
