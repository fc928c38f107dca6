// src/models/mod.rs

//! Domain models for the sitecheck application.
//!
//! URLs are opaque keys: they are never parsed or normalized when used
//! to look up histories.

mod config;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

pub use config::{Config, CrawlerConfig};

/// A modification instant observed for a page.
pub type Timestamp = DateTime<Utc>;

/// Every modification time recorded for one URL, in append order.
pub type History = Vec<Timestamp>;

/// URL to history mapping, as held by the record store.
pub type Records = BTreeMap<String, History>;

/// Histories that grew during one detection pass, keyed by URL.
///
/// A URL with no new modification is absent rather than mapped to an
/// empty history.
pub type UpdateDelta = BTreeMap<String, History>;

/// One freshly probed timestamp per successfully probed URL.
pub type RecentObservation = BTreeMap<String, Timestamp>;
