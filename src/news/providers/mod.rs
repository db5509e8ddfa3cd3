// src/news/providers/mod.rs
pub mod gnews;
pub mod thenewsapi;

use anyhow::Result;
use serde_json::Value;

use crate::config::AppConfig;
use crate::news::query::CategoryTable;
use crate::news::types::NewsProvider;

/// Extract a source name from the shapes the upstream APIs actually send:
/// a bare string (TheNewsAPI returns the domain) or a nested object with a
/// `name` field (GNews). Anything else collapses to `None`.
pub(crate) fn source_name(v: &Value) -> Option<String> {
    let raw = match v {
        Value::String(s) => s.as_str(),
        Value::Object(m) => m.get("name").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Build one adapter per configured provider, in configuration order.
pub fn build_providers(
    cfg: &AppConfig,
    table: &CategoryTable,
) -> Result<Vec<Box<dyn NewsProvider>>> {
    let mut out: Vec<Box<dyn NewsProvider>> = Vec::with_capacity(cfg.providers.len());
    for pc in &cfg.providers {
        match pc.name {
            "thenewsapi" => out.push(Box::new(thenewsapi::TheNewsApiProvider::new(
                &pc.base_url,
                &pc.credential,
                table.clone(),
                cfg.fetch_timeout,
            )?)),
            "gnews" => out.push(Box::new(gnews::GNewsProvider::new(
                &pc.base_url,
                &pc.credential,
                table.clone(),
                cfg.fetch_timeout,
            )?)),
            other => {
                tracing::warn!(provider = other, "unknown provider name in config; skipped");
            }
        }
    }
    Ok(out)
}
