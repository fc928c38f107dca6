//! Pipeline entry points for sitecheck operations.
//!
//! - `detect`: Pure update detection over histories
//! - `check`: One load, crawl, detect, merge and save cycle

pub mod check;
pub mod detect;

pub use check::{CheckOutcome, render_report, run_check, write_report};
pub use detect::{apply_update, compute_delta, is_newer};
