// tests/aggregate_pipeline.rs
//
// Aggregator invariants over stub providers: URL dedup, first-wins
// tie-break, newest-first ordering with undated items last, and facet
// derivation.

use anyhow::Result;
use async_trait::async_trait;

use newsdesk::news::query::CategoryTable;
use newsdesk::{Aggregator, Article, NewsProvider, NormalizedQuery, ProviderParams};

struct StubProvider {
    name: &'static str,
    articles: Vec<Article>,
}

#[async_trait]
impl NewsProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn translate(&self, _query: &NormalizedQuery) -> ProviderParams {
        ProviderParams::new()
    }

    async fn fetch(&self, _params: &ProviderParams) -> Result<Vec<Article>> {
        Ok(self.articles.clone())
    }
}

fn art(url: &str, published_at: Option<&str>, source: Option<&str>, title: &str) -> Article {
    Article {
        title: title.to_string(),
        description: None,
        url: url.to_string(),
        image_url: None,
        source_name: source.map(|s| s.to_string()),
        categories: Vec::new(),
        published_at: published_at.map(|s| s.to_string()),
    }
}

fn aggregator(providers: Vec<Box<dyn NewsProvider>>) -> Aggregator {
    Aggregator::new(providers, CategoryTable::seed())
}

#[tokio::test]
async fn two_providers_merge_newest_first() {
    // Date-only stamps must still order: 2024-01-02 before 2024-01-01.
    let agg = aggregator(vec![
        Box::new(StubProvider {
            name: "a",
            articles: vec![art("a", Some("2024-01-02"), Some("A"), "from a")],
        }),
        Box::new(StubProvider {
            name: "b",
            articles: vec![art("b", Some("2024-01-01"), Some("B"), "from b")],
        }),
    ]);

    let query =
        NormalizedQuery::from_request(Some("technology".into()), None, Some("all".into()));
    let out = agg.aggregate(&query).await;
    let urls: Vec<&str> = out.articles.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, vec!["a", "b"]);
}

#[tokio::test]
async fn duplicate_urls_keep_the_earlier_providers_version() {
    let agg = aggregator(vec![
        Box::new(StubProvider {
            name: "a",
            articles: vec![art("https://x", Some("2024-01-01"), Some("A"), "a's title")],
        }),
        Box::new(StubProvider {
            name: "b",
            articles: vec![art("https://x", Some("2024-01-01"), Some("B"), "b's title")],
        }),
    ]);

    let out = agg.aggregate(&NormalizedQuery::default()).await;
    assert_eq!(out.articles.len(), 1);
    assert_eq!(out.articles[0].title, "a's title");
}

#[tokio::test]
async fn output_never_contains_duplicate_urls() {
    let agg = aggregator(vec![
        Box::new(StubProvider {
            name: "a",
            articles: vec![
                art("u1", Some("2024-01-03"), Some("A"), "1"),
                art("u2", Some("2024-01-02"), Some("A"), "2"),
                art("u1", Some("2024-01-01"), Some("A"), "dup within provider"),
            ],
        }),
        Box::new(StubProvider {
            name: "b",
            articles: vec![
                art("u2", Some("2024-01-02"), Some("B"), "dup across providers"),
                art("u3", None, Some("B"), "3"),
            ],
        }),
    ]);

    let out = agg.aggregate(&NormalizedQuery::default()).await;
    let mut urls: Vec<&str> = out.articles.iter().map(|a| a.url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(out.articles.len(), urls.len(), "duplicate url in output");
    assert_eq!(out.articles.len(), 3);
}

#[tokio::test]
async fn undated_articles_sort_last_in_arrival_order() {
    let agg = aggregator(vec![Box::new(StubProvider {
        name: "a",
        articles: vec![
            art("undated-1", None, None, "1"),
            art("dated", Some("2024-01-01T00:00:00Z"), None, "2"),
            art("undated-2", Some("not a timestamp"), None, "3"),
        ],
    })]);

    let out = agg.aggregate(&NormalizedQuery::default()).await;
    let urls: Vec<&str> = out.articles.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, vec!["dated", "undated-1", "undated-2"]);
}

#[tokio::test]
async fn facets_come_from_results_and_configuration() {
    let agg = aggregator(vec![
        Box::new(StubProvider {
            name: "a",
            articles: vec![
                art("u1", None, Some("Zeta Wire"), "1"),
                art("u2", None, Some("Alpha Post"), "2"),
                art("u3", None, None, "3"),
            ],
        }),
        Box::new(StubProvider {
            name: "b",
            articles: vec![art("u4", None, Some("Alpha Post"), "4")],
        }),
    ]);

    let out = agg.aggregate(&NormalizedQuery::default()).await;

    // Distinct, non-empty source names, sorted by the set ordering.
    let sources: Vec<&str> = out.facets.sources.iter().map(|s| s.as_str()).collect();
    assert_eq!(sources, vec!["Alpha Post", "Zeta Wire"]);

    // Category facet comes from configuration, not from articles.
    assert_eq!(
        out.facets.categories,
        vec![
            "business",
            "entertainment",
            "health",
            "science",
            "sports",
            "technology",
            "general"
        ]
    );
}
