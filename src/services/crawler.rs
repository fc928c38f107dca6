// src/services/crawler.rs

//! Interval crawler.
//!
//! Probes URLs strictly one after another, pausing for the configured
//! interval before every probe except the first. A failing URL never stops
//! the batch; its failure is collected and reported with the partial
//! observations.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::BatchFailure;
use crate::models::RecentObservation;
use crate::services::FreshnessSource;

/// Outcome of one crawl batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlReport {
    /// Timestamps of every successfully probed URL
    pub observations: RecentObservation,
    /// Collected failures, `None` when every probe succeeded
    pub failure: Option<BatchFailure>,
}

impl CrawlReport {
    /// Check if every probe succeeded.
    pub fn is_clean(&self) -> bool {
        self.failure.is_none()
    }
}

/// Sequential, rate-limited crawler over a freshness source.
pub struct IntervalCrawler<S> {
    source: S,
    interval: Duration,
}

impl<S: FreshnessSource> IntervalCrawler<S> {
    /// Create a crawler pausing `interval` between consecutive probes.
    pub fn new(source: S, interval: Duration) -> Self {
        Self { source, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Probe every URL in order and collect their modification times.
    pub async fn crawl(&self, urls: &[String], cancel: &CancellationToken) -> CrawlReport {
        let mut observations = RecentObservation::new();
        let mut batch = BatchFailure::default();

        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !self.interval.is_zero() {
                log::debug!("Waiting {:?} before probing {}", self.interval, url);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        batch.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }

            if cancel.is_cancelled() {
                batch.cancelled = true;
                break;
            }

            log::debug!("Probing {}", url);
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    batch.cancelled = true;
                    break;
                }
                result = self.source.probe(url) => result,
            };

            match result {
                Ok(modified) => {
                    observations.insert(url.clone(), modified);
                }
                Err(failure) => {
                    log::warn!("Probe failed: {}", failure);
                    batch.failures.push(failure);
                }
            }
        }

        if batch.cancelled {
            log::warn!(
                "Crawl cancelled after {} of {} URLs",
                observations.len() + batch.failures.len(),
                urls.len()
            );
        }
        log::info!(
            "Crawled {} URLs: {} succeeded, {} failed",
            urls.len(),
            observations.len(),
            batch.failures.len()
        );

        CrawlReport {
            observations,
            failure: (!batch.is_empty()).then_some(batch),
        }
    }
}
