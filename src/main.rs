//! Newsdesk — binary entrypoint.
//! Boots the Axum HTTP server, wiring the news aggregation pipeline, the
//! account/favorite stores, and the metrics exporter.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsdesk::{api, auth, config, metrics, news, store};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsdesk=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the vars come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::AppConfig::from_env();
    let categories = news::query::CategoryTable::load_default()
        .context("loading category configuration")?;
    let providers = news::providers::build_providers(&cfg, &categories)?;
    info!(providers = providers.len(), "news providers configured");

    let state = api::AppState {
        news: Arc::new(news::Aggregator::new(providers, categories)),
        store: Arc::new(store::Store::open(cfg.store_path.clone())),
        sessions: Arc::new(auth::SessionStore::new()),
    };

    let metrics = metrics::Metrics::init()?;
    let app = api::create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
