// src/news/query.rs
//! Query translation core: UI sentinel handling, the table-driven category
//! mapping, and the shared filter-planning rules the adapters build their
//! provider-specific parameter shapes from.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::news::types::NormalizedQuery;

pub const ENV_CATEGORY_CONFIG_PATH: &str = "NEWSDESK_CATEGORY_CONFIG_PATH";
pub const DEFAULT_CATEGORY_CONFIG_PATH: &str = "config/categories.toml";

/// UI sentinel meaning "no category filter".
pub const CATEGORY_ALL: &str = "general";
/// UI sentinel meaning "no source restriction".
pub const SOURCE_ALL: &str = "all";

impl NormalizedQuery {
    /// Build a query from raw request parameters. Blank values and the UI
    /// sentinels collapse to `None`.
    pub fn from_request(
        category: Option<String>,
        search_text: Option<String>,
        source: Option<String>,
    ) -> Self {
        let clean = |v: Option<String>, sentinel: &str| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(sentinel))
        };
        Self {
            category: clean(category, CATEGORY_ALL),
            search_text: search_text
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            source_filter: clean(source, SOURCE_ALL),
        }
    }
}

/// How one normalized category is expressed toward a given provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryExpr {
    /// The provider has a native token for this category.
    Token(String),
    /// No native token; fall back to a disjunctive keyword search.
    Keywords(String),
    /// No token and no keywords configured: omit the category entirely.
    None,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct CategoryEntry {
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
    /// provider name -> provider category token
    #[serde(default)]
    providers: HashMap<String, String>,
}

/// Fixed category mapping table, loaded once at startup.
///
/// Declaration order is preserved: it drives the category facet shown to
/// the UI.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CategoryTable {
    #[serde(default)]
    categories: Vec<CategoryEntry>,
}

impl CategoryTable {
    /// Parse from TOML.
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing category table toml")
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading category table from {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $NEWSDESK_CATEGORY_CONFIG_PATH
    /// 2) config/categories.toml
    /// 3) built-in seed
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CATEGORY_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!(
                "NEWSDESK_CATEGORY_CONFIG_PATH points to non-existent path"
            ));
        }
        let default_p = PathBuf::from(DEFAULT_CATEGORY_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::seed())
    }

    /// Built-in table mirroring the categories the UI has always offered.
    pub fn seed() -> Self {
        fn entry(name: &str, keywords: &[&str], providers: &[(&str, &str)]) -> CategoryEntry {
            CategoryEntry {
                name: name.to_string(),
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
                providers: providers
                    .iter()
                    .map(|(p, t)| (p.to_string(), t.to_string()))
                    .collect(),
            }
        }
        Self {
            categories: vec![
                entry(
                    "business",
                    &["business", "economy", "markets"],
                    &[("thenewsapi", "business"), ("gnews", "business")],
                ),
                entry(
                    "entertainment",
                    &["entertainment", "celebrity"],
                    &[("thenewsapi", "entertainment"), ("gnews", "entertainment")],
                ),
                entry(
                    "health",
                    &["health", "medicine"],
                    &[("thenewsapi", "health"), ("gnews", "health")],
                ),
                entry(
                    "science",
                    &["science", "research"],
                    &[("thenewsapi", "science"), ("gnews", "science")],
                ),
                entry(
                    "sports",
                    &["sports"],
                    &[("thenewsapi", "sports"), ("gnews", "sports")],
                ),
                entry(
                    "technology",
                    &["technology", "software", "ai"],
                    &[("thenewsapi", "tech"), ("gnews", "technology")],
                ),
                entry("general", &[], &[]),
            ],
        }
    }

    /// Category names in declaration order (the category facet).
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Express `category` toward `provider` per the mapping table.
    pub fn resolve(&self, category: &str, provider: &str) -> CategoryExpr {
        let Some(entry) = self
            .categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(category))
        else {
            return CategoryExpr::None;
        };
        if let Some(token) = entry.providers.get(provider) {
            return CategoryExpr::Token(token.clone());
        }
        if entry.keywords.is_empty() {
            return CategoryExpr::None;
        }
        CategoryExpr::Keywords(entry.keywords.join(" OR "))
    }
}

/// Provider-agnostic filter plan. Adapters map these onto their native
/// parameter names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPlan {
    pub category_token: Option<String>,
    pub search_expr: Option<String>,
    pub source: Option<String>,
}

/// Apply the shared translation rules for one provider.
///
/// - A mapped category becomes a native token; an unmapped one falls back to
///   a disjunctive keyword search, or disappears when no keywords exist.
/// - Explicit search text wins over a category-derived keyword expression.
///   When the provider cannot combine a category token with a search, the
///   search text also displaces the token.
pub fn plan_filter(
    table: &CategoryTable,
    provider: &str,
    query: &NormalizedQuery,
    supports_combined_search: bool,
) -> FilterPlan {
    let mut plan = FilterPlan::default();

    if let Some(cat) = query.category.as_deref() {
        match table.resolve(cat, provider) {
            CategoryExpr::Token(t) => plan.category_token = Some(t),
            CategoryExpr::Keywords(expr) => plan.search_expr = Some(expr),
            CategoryExpr::None => {}
        }
    }

    if let Some(q) = query.search_text.as_deref() {
        plan.search_expr = Some(q.to_string());
        if !supports_combined_search {
            plan.category_token = None;
        }
    }

    plan.source = query.source_filter.clone();
    plan
}
