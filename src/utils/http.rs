// src/utils/http.rs

//! HTTP client utilities.

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// With `use_proxy` set, every request is routed through the configured
/// proxy; asking for a proxy that was never configured is an error.
pub fn create_async_client(config: &CrawlerConfig, use_proxy: bool) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout());

    if use_proxy {
        let proxy = config
            .proxy
            .as_deref()
            .ok_or_else(|| AppError::config("proxy is not registered in config"))?;
        let parsed = url::Url::parse(proxy)?;
        builder = builder.proxy(reqwest::Proxy::all(parsed.as_str())?);
        log::debug!("Routing requests through proxy {}", parsed);
    }

    Ok(builder.build()?)
}
