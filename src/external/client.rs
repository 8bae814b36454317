use std::time::Duration;

use anyhow::Context;

use crate::config::GcmConfig;
use crate::error::{AppError, AppResult};

/// Builds the pooled HTTP client used for every chunk of a dispatch.
///
/// One client is shared across all concurrent chunk requests so they reuse
/// connections to the provider.
///
/// # Features
/// - **Timeouts**: per-request and connect timeouts from `[gcm]` settings
/// - **Connection pooling**: idle connections kept for 90s
/// - **HTTP/2**: adaptive window sizing and keep-alive pings
/// - **Compression**: gzip responses
/// - **Proxy**: optional explicit proxy, otherwise the system proxy
///
/// # Example
/// ```ignore
/// let client = build_http_client(&settings.gcm)?;
/// let sender = GcmClient::new(client, &settings.gcm);
/// ```
pub fn build_http_client(config: &GcmConfig) -> AppResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        // Timeouts
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        .gzip(true)
        .user_agent(user_agent());

    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| AppError::Configuration {
            key: "gcm.proxy".to_string(),
            source: e.into(),
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .context("Failed to build HTTP client")
        .map_err(AppError::from)
}

fn user_agent() -> String {
    format!("gcm-push/{}", crate::pkg_version())
}
