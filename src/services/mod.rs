//! Service layer for the sitecheck application.
//!
//! - Freshness probing (`FreshnessSource`, `HeadSource`)
//! - Rate-limited batch crawling (`IntervalCrawler`)

mod crawler;
mod source;

pub use crawler::{CrawlReport, IntervalCrawler};
pub use source::{FreshnessSource, HeadSource, parse_last_modified};
