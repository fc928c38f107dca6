use std::time::Duration;

use chrono::{TimeZone, Utc};
use sitecheck::models::CrawlerConfig;
use sitecheck::pipeline::{render_report, run_check};
use sitecheck::services::{HeadSource, IntervalCrawler};
use sitecheck::storage::{LocalStorage, RecordStore};
use sitecheck::utils::http::create_async_client;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, last_modified: &str) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).insert_header("Last-Modified", last_modified))
        .mount(server)
        .await;
}

fn crawler() -> IntervalCrawler<HeadSource> {
    let client = create_async_client(&CrawlerConfig::default(), false).expect("client");
    IntervalCrawler::new(HeadSource::new(client), Duration::ZERO)
}

#[tokio::test]
async fn repeated_checks_only_report_new_modifications() {
    let tmp = TempDir::new().unwrap();
    let storage = LocalStorage::new(tmp.path().join("records.json"));
    let cancel = CancellationToken::new();

    let server = MockServer::start().await;
    mount_page(&server, "/news", "Wed, 21 Oct 2015 07:28:00 GMT").await;
    let urls = vec![format!("{}/news", server.uri())];

    // First run bootstraps the store.
    let first = run_check(&urls, &crawler(), &storage, &cancel).await.unwrap();
    assert_eq!(first.delta.len(), 1);
    assert!(tmp.path().join("records.json").exists());

    // Same timestamp again: nothing new.
    let second = run_check(&urls, &crawler(), &storage, &cancel).await.unwrap();
    assert!(second.delta.is_empty());
    assert_eq!(render_report(&second.delta), vec!["no updates"]);

    // The page changes.
    server.reset().await;
    mount_page(&server, "/news", "Thu, 22 Oct 2015 09:00:00 GMT").await;
    let third = run_check(&urls, &crawler(), &storage, &cancel).await.unwrap();
    assert_eq!(third.delta.len(), 1);

    let store = RecordStore::load(&storage).await.unwrap();
    assert_eq!(
        store.get(&urls[0]),
        Some(&vec![
            Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap(),
            Utc.with_ymd_and_hms(2015, 10, 22, 9, 0, 0).unwrap(),
        ])
    );
}

#[tokio::test]
async fn older_timestamp_is_ignored() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("records.json");
    let storage = LocalStorage::new(&path);

    let server = MockServer::start().await;
    mount_page(&server, "/page", "Wed, 21 Oct 2015 07:28:00 GMT").await;
    let url = format!("{}/page", server.uri());

    let seeded = format!(r#"{{"{url}": ["2016-01-01T00:00:00Z"]}}"#);
    std::fs::write(&path, seeded).unwrap();

    let outcome = run_check(&[url.clone()], &crawler(), &storage, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.delta.is_empty());
    assert!(outcome.failure.is_none());
    let store = RecordStore::load(&storage).await.unwrap();
    assert_eq!(store.get(&url).map(Vec::len), Some(1));
}
