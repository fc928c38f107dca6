// src/lib.rs

//! sitecheck Library
//!
//! Polls web pages for their `Last-Modified` time and keeps a per-URL
//! history of observed modifications.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
