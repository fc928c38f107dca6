// src/pipeline/check.rs

//! Update check pipeline.

use std::io::Write;

use chrono::SecondsFormat;
use tokio_util::sync::CancellationToken;

use crate::error::{BatchFailure, Result};
use crate::models::UpdateDelta;
use crate::pipeline::detect::compute_delta;
use crate::services::{FreshnessSource, IntervalCrawler};
use crate::storage::{RecordStore, StoreBackend};

/// Line reported when nothing changed.
pub const NO_UPDATES: &str = "no updates";

/// Result of one check run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
    /// Histories that grew and were saved
    pub delta: UpdateDelta,
    /// Probe failures from the crawl, if any
    pub failure: Option<BatchFailure>,
}

impl CheckOutcome {
    /// Check if any page was updated.
    pub fn has_updates(&self) -> bool {
        !self.delta.is_empty()
    }
}

/// Run one check over `urls`.
///
/// Store failures abort the run before anything is saved. Probe failures
/// do not: updates for the URLs that were probed successfully are still
/// merged and saved, and the failures are returned with the outcome.
pub async fn run_check<S: FreshnessSource>(
    urls: &[String],
    crawler: &IntervalCrawler<S>,
    backend: &dyn StoreBackend,
    cancel: &CancellationToken,
) -> Result<CheckOutcome> {
    let mut store = RecordStore::load(backend).await?;
    let known = store.query(urls);

    log::info!(
        "Checking {} URLs ({:?} between probes)",
        urls.len(),
        crawler.interval()
    );
    let report = crawler.crawl(urls, cancel).await;
    if !report.is_clean() {
        log::warn!("Some probes failed; recording updates for the rest");
    }

    let delta = compute_delta(&known, &report.observations);
    if delta.is_empty() {
        log::info!("No updates detected");
    } else {
        log::info!("{} URLs updated", delta.len());
        store.merge(delta.clone());
        store.save(backend).await?;
    }

    Ok(CheckOutcome {
        delta,
        failure: report.failure,
    })
}

/// Human-readable lines describing a delta.
pub fn render_report(delta: &UpdateDelta) -> Vec<String> {
    if delta.is_empty() {
        return vec![NO_UPDATES.to_string()];
    }
    delta
        .iter()
        .map(|(url, history)| {
            let times: Vec<String> = history
                .iter()
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .collect();
            format!("{}: {}", url, times.join(", "))
        })
        .collect()
}

/// Write the report for `delta`, one line each.
pub fn write_report(out: &mut impl Write, delta: &UpdateDelta) -> Result<()> {
    for line in render_report(delta) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::error::{AppError, ProbeFailure};
    use crate::models::Timestamp;
    use crate::storage::MemoryStorage;

    struct MapSource(HashMap<String, Timestamp>);

    #[async_trait]
    impl FreshnessSource for MapSource {
        async fn probe(&self, url: &str) -> std::result::Result<Timestamp, ProbeFailure> {
            self.0
                .get(url)
                .copied()
                .ok_or_else(|| ProbeFailure::network(url, "connection refused"))
        }
    }

    fn t1() -> Timestamp {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn crawler(entries: &[(&str, Timestamp)]) -> IntervalCrawler<MapSource> {
        let map = entries.iter().map(|(u, t)| (u.to_string(), *t)).collect();
        IntervalCrawler::new(MapSource(map), Duration::ZERO)
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_run_records_everything() {
        let backend = MemoryStorage::new();
        let crawler = crawler(&[("https://a.example", t1())]);

        let outcome = run_check(
            &urls(&["https://a.example"]),
            &crawler,
            &backend,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(outcome.has_updates());
        assert!(outcome.failure.is_none());
        let saved = RecordStore::from_bytes(&backend.bytes().unwrap().unwrap()).unwrap();
        assert_eq!(saved.get("https://a.example"), Some(&vec![t1()]));
    }

    #[tokio::test]
    async fn test_unchanged_run_does_not_save() {
        let backend =
            MemoryStorage::with_bytes(r#"{"https://a.example": ["2020-01-01T00:00:00Z"]}"#);
        let crawler = crawler(&[("https://a.example", t1())]);

        let outcome = run_check(
            &urls(&["https://a.example"]),
            &crawler,
            &backend,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(!outcome.has_updates());
        assert_eq!(
            backend.bytes().unwrap().unwrap(),
            br#"{"https://a.example": ["2020-01-01T00:00:00Z"]}"#.to_vec()
        );
    }

    #[tokio::test]
    async fn test_failed_urls_do_not_block_updates() {
        let backend = MemoryStorage::with_bytes(
            r#"{"https://old.example": ["2019-01-01T00:00:00Z"]}"#,
        );
        let crawler = crawler(&[("https://a.example", t1())]);

        let outcome = run_check(
            &urls(&["https://down.example", "https://a.example"]),
            &crawler,
            &backend,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.delta.len(), 1);
        let failure = outcome.failure.unwrap();
        assert_eq!(
            failure.failed_urls().collect::<Vec<_>>(),
            vec!["https://down.example"]
        );

        let saved = RecordStore::from_bytes(&backend.bytes().unwrap().unwrap()).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved.get("https://a.example"), Some(&vec![t1()]));
    }

    #[tokio::test]
    async fn test_corrupt_store_aborts() {
        let backend = MemoryStorage::with_bytes("not json");
        let crawler = crawler(&[("https://a.example", t1())]);

        let result = run_check(
            &urls(&["https://a.example"]),
            &crawler,
            &backend,
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(AppError::StoreParse(_))));
        assert_eq!(backend.bytes().unwrap().unwrap(), b"not json".to_vec());
    }

    #[test]
    fn test_render_no_updates() {
        assert_eq!(render_report(&UpdateDelta::new()), vec![NO_UPDATES]);
    }

    #[test]
    fn test_render_updates() {
        let later = Utc.with_ymd_and_hms(2020, 2, 1, 12, 30, 0).unwrap();
        let delta: UpdateDelta = [
            ("https://a.example".to_string(), vec![t1(), later]),
            ("https://b.example".to_string(), vec![later]),
        ]
        .into_iter()
        .collect();

        let mut out = Vec::new();
        write_report(&mut out, &delta).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "https://a.example: 2020-01-01T00:00:00Z, 2020-02-01T12:30:00Z\n\
             https://b.example: 2020-02-01T12:30:00Z\n"
        );
    }
}
