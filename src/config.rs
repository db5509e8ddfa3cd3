// src/config.rs
//! Process configuration, read once at startup and passed down explicitly.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

pub const ENV_BIND_ADDR: &str = "NEWSDESK_BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

pub const ENV_FETCH_TIMEOUT_SECS: &str = "NEWSDESK_FETCH_TIMEOUT_SECS";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

pub const ENV_STORE_PATH: &str = "NEWSDESK_STORE_PATH";

pub const ENV_THENEWSAPI_KEY: &str = "THENEWSAPI_KEY";
pub const ENV_GNEWS_KEY: &str = "GNEWS_KEY";

pub const THENEWSAPI_BASE_URL: &str = "https://api.thenewsapi.com/v1/news/top";
pub const GNEWS_BASE_URL: &str = "https://gnews.io/api/v4/top-headlines";

/// One configured upstream news API. Immutable after startup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: &'static str,
    pub base_url: String,
    pub credential: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub fetch_timeout: Duration,
    pub store_path: Option<PathBuf>,
    /// Providers in declaration order; this order is the aggregation order
    /// and decides tie-breaks downstream.
    pub providers: Vec<ProviderConfig>,
}

impl AppConfig {
    /// Read configuration from the environment (after `dotenvy` has run).
    ///
    /// A provider without a credential is skipped with an info log rather
    /// than failing startup; the page then simply aggregates fewer sources.
    pub fn from_env() -> Self {
        let bind_addr =
            env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let fetch_timeout = Duration::from_secs(
            env::var(ENV_FETCH_TIMEOUT_SECS)
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
        );

        let store_path = env::var(ENV_STORE_PATH).ok().map(PathBuf::from);

        let mut providers = Vec::new();
        for (name, base_url, key_env) in [
            ("thenewsapi", THENEWSAPI_BASE_URL, ENV_THENEWSAPI_KEY),
            ("gnews", GNEWS_BASE_URL, ENV_GNEWS_KEY),
        ] {
            match env::var(key_env) {
                Ok(key) if !key.trim().is_empty() => providers.push(ProviderConfig {
                    name,
                    base_url: base_url.to_string(),
                    credential: key.trim().to_string(),
                }),
                _ => info!(provider = name, "no credential configured; provider skipped"),
            }
        }

        Self {
            bind_addr,
            fetch_timeout,
            store_path,
            providers,
        }
    }
}
