// src/news/mod.rs
pub mod providers;
pub mod query;
pub mod types;

use std::collections::{BTreeSet, HashSet};

use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::news::query::CategoryTable;
use crate::news::types::{Article, NewsProvider, NormalizedQuery};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("aggregate_requests_total", "Browse requests aggregated.");
        describe_counter!(
            "aggregate_articles_total",
            "Articles returned after dedup + sort."
        );
        describe_counter!(
            "aggregate_dedup_total",
            "Articles dropped as duplicate URLs."
        );
        describe_counter!("provider_items_total", "Items parsed from providers.");
        describe_counter!("provider_errors_total", "Provider fetch/parse errors.");
        describe_histogram!("provider_fetch_ms", "Provider fetch time in milliseconds.");
        describe_gauge!(
            "aggregate_last_run_ts",
            "Unix ts when the aggregator last ran."
        );
    });
}

/// Normalize article text: entity decode, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Parse a provider timestamp to unix seconds. Providers send RFC 3339;
/// date-only stamps show up in older feeds and still have to order sanely.
pub fn parse_published_at(ts: &str) -> Option<i64> {
    let t = ts.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(t, &Rfc3339) {
        return Some(dt.unix_timestamp());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp());
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
    }
    None
}

/// Drop later occurrences of an already-seen URL; the first one wins.
/// Returns the kept articles and the number dropped.
pub fn dedup_by_url(articles: Vec<Article>) -> (Vec<Article>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(articles.len());
    let mut dropped = 0usize;
    for a in articles {
        if seen.insert(a.url.clone()) {
            kept.push(a);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}

/// Stable sort, newest first. Articles with a missing or unparseable
/// timestamp sort after every dated article, keeping their relative
/// concatenation order.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by_key(|a| {
        std::cmp::Reverse(
            a.published_at
                .as_deref()
                .and_then(parse_published_at)
                .unwrap_or(i64::MIN),
        )
    });
}

/// Distinct-value summaries derived from a result set, for the filter UI.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Facets {
    pub sources: BTreeSet<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AggregateResult {
    pub articles: Vec<Article>,
    pub facets: Facets,
}

/// Fans a browse query out to every configured provider and merges the
/// results into one deduplicated, ordered page.
pub struct Aggregator {
    providers: Vec<Box<dyn NewsProvider>>,
    categories: CategoryTable,
}

impl Aggregator {
    pub fn new(providers: Vec<Box<dyn NewsProvider>>, categories: CategoryTable) -> Self {
        Self {
            providers,
            categories,
        }
    }

    pub async fn aggregate(&self, query: &NormalizedQuery) -> AggregateResult {
        ensure_metrics_described();
        counter!("aggregate_requests_total").increment(1);

        let fetches = self.providers.iter().map(|p| async move {
            let params = p.translate(query);
            tracing::debug!(provider = p.name(), params = ?params.as_slice(), "provider query");
            let t0 = std::time::Instant::now();
            let res = p.fetch(&params).await;
            histogram!("provider_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
            match res {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = ?e, provider = p.name(), "provider error");
                    counter!("provider_errors_total").increment(1);
                    Vec::new()
                }
            }
        });
        // join_all keeps configuration order, so when two articles tie on
        // every sort key the earlier-listed provider's copy wins.
        let batches = join_all(fetches).await;

        let mut articles: Vec<Article> = Vec::new();
        for batch in batches {
            articles.extend(batch);
        }

        let (mut articles, dup_dropped) = dedup_by_url(articles);
        sort_newest_first(&mut articles);

        counter!("aggregate_articles_total").increment(articles.len() as u64);
        counter!("aggregate_dedup_total").increment(dup_dropped as u64);
        gauge!("aggregate_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        let sources: BTreeSet<String> = articles
            .iter()
            .filter_map(|a| a.source_name.clone())
            .filter(|s| !s.is_empty())
            .collect();

        AggregateResult {
            articles,
            facets: Facets {
                sources,
                // From configuration, not from articles: not every provider
                // echoes a category per item.
                categories: self.categories.names(),
            },
        }
    }
}
