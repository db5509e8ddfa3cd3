// src/news/types.rs
use anyhow::Result;

/// Provider-agnostic browse filter, immutable per request.
///
/// The HTTP layer maps the UI sentinels (`general` category, `all` source)
/// to `None` before the query reaches the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedQuery {
    pub category: Option<String>,
    pub search_text: Option<String>,
    pub source_filter: Option<String>,
}

/// Common article shape produced by every adapter.
///
/// `url` is the article's identity: two articles with equal `url` are the
/// same article, and the first one encountered wins.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Translated request parameters for one provider call.
///
/// Ordered key/value pairs, credential-free. The credential is attached at
/// the adapter boundary so these can be logged and asserted on in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderParams(Vec<(String, String)>);

impl ProviderParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.0.push((key.to_string(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Translate a normalized query into this provider's parameter shape.
    fn translate(&self, query: &NormalizedQuery) -> ProviderParams;

    /// Issue one GET with `params` plus the provider credential and map the
    /// native response into `Article`s. Errors stop at the aggregator, which
    /// treats them as an empty contribution.
    async fn fetch(&self, params: &ProviderParams) -> Result<Vec<Article>>;
}
