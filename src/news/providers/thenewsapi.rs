// src/news/providers/thenewsapi.rs
//! Adapter for TheNewsAPI (<https://www.thenewsapi.com/documentation>).
//!
//! Items arrive under a `data` key and `source` is a bare domain string.
//! The credential travels as the `api_token` query parameter.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::news::providers::source_name;
use crate::news::query::{plan_filter, CategoryTable};
use crate::news::types::{Article, NewsProvider, NormalizedQuery, ProviderParams};

const PAGE_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    image_url: Option<String>,
    source: Option<serde_json::Value>,
    #[serde(default)]
    categories: Vec<String>,
    published_at: Option<String>,
}

pub struct TheNewsApiProvider {
    base_url: String,
    api_token: String,
    categories: CategoryTable,
    client: reqwest::Client,
}

impl TheNewsApiProvider {
    pub fn new(
        base_url: &str,
        api_token: &str,
        categories: CategoryTable,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("thenewsapi http client")?;
        Ok(Self {
            base_url: base_url.to_string(),
            api_token: api_token.to_string(),
            categories,
            client,
        })
    }

    fn map_item(it: Item) -> Option<Article> {
        let url = it.url.map(|u| u.trim().to_string())?;
        if url.is_empty() {
            return None;
        }
        Some(Article {
            title: crate::news::normalize_text(it.title.as_deref().unwrap_or_default()),
            description: it
                .description
                .as_deref()
                .map(crate::news::normalize_text)
                .filter(|d| !d.is_empty()),
            url,
            image_url: it.image_url.filter(|u| !u.trim().is_empty()),
            source_name: it.source.as_ref().and_then(source_name),
            categories: it.categories,
            published_at: it.published_at,
        })
    }
}

#[async_trait]
impl NewsProvider for TheNewsApiProvider {
    fn name(&self) -> &'static str {
        "thenewsapi"
    }

    fn translate(&self, query: &NormalizedQuery) -> ProviderParams {
        // Supports category + search in one call, plus source restriction.
        let plan = plan_filter(&self.categories, self.name(), query, true);

        let mut params = ProviderParams::new();
        params.push("locale", "us");
        if let Some(token) = plan.category_token {
            params.push("categories", token);
        }
        if let Some(expr) = plan.search_expr {
            params.push("search", expr);
        }
        if let Some(source) = plan.source {
            params.push("sources", source);
        }
        params.push("limit", PAGE_LIMIT.to_string());
        params
    }

    async fn fetch(&self, params: &ProviderParams) -> Result<Vec<Article>> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(params.as_slice())
            // credential attached here so translated params stay loggable
            .query(&[("api_token", self.api_token.as_str())])
            .send()
            .await
            .context("thenewsapi http get")?
            .error_for_status()
            .context("thenewsapi response status")?;

        let body: Envelope = resp.json().await.context("thenewsapi json body")?;
        let out: Vec<Article> = body.data.into_iter().filter_map(Self::map_item).collect();
        counter!("provider_items_total").increment(out.len() as u64);
        Ok(out)
    }
}
