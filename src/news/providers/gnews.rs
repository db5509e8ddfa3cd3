// src/news/providers/gnews.rs
//! Adapter for GNews (<https://gnews.io/docs/v4>).
//!
//! Items arrive under an `articles` key and `source` is a nested object.
//! GNews has no source-restriction parameter, so a source filter is ignored
//! here and applied by whichever providers support it. The credential
//! travels as the `apikey` query parameter.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::news::providers::source_name;
use crate::news::query::{plan_filter, CategoryTable};
use crate::news::types::{Article, NewsProvider, NormalizedQuery, ProviderParams};

const PAGE_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    articles: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    image: Option<String>,
    source: Option<serde_json::Value>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

pub struct GNewsProvider {
    base_url: String,
    api_key: String,
    categories: CategoryTable,
    client: reqwest::Client,
}

impl GNewsProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        categories: CategoryTable,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("gnews http client")?;
        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
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
            image_url: it.image.filter(|u| !u.trim().is_empty()),
            source_name: it.source.as_ref().and_then(source_name),
            // GNews does not echo categories per article.
            categories: Vec::new(),
            published_at: it.published_at,
        })
    }
}

#[async_trait]
impl NewsProvider for GNewsProvider {
    fn name(&self) -> &'static str {
        "gnews"
    }

    fn translate(&self, query: &NormalizedQuery) -> ProviderParams {
        let plan = plan_filter(&self.categories, self.name(), query, true);

        let mut params = ProviderParams::new();
        params.push("lang", "en");
        params.push("country", "us");
        if let Some(token) = plan.category_token {
            params.push("topic", token);
        }
        if let Some(expr) = plan.search_expr {
            params.push("q", expr);
        }
        // plan.source intentionally dropped: no source restriction upstream.
        params.push("max", PAGE_LIMIT.to_string());
        params
    }

    async fn fetch(&self, params: &ProviderParams) -> Result<Vec<Article>> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(params.as_slice())
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .context("gnews http get")?
            .error_for_status()
            .context("gnews response status")?;

        let body: Envelope = resp.json().await.context("gnews json body")?;
        let out: Vec<Article> = body
            .articles
            .into_iter()
            .filter_map(Self::map_item)
            .collect();
        counter!("provider_items_total").increment(out.len() as u64);
        Ok(out)
    }
}
