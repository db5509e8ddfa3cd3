// tests/providers_gnews.rs
//
// GNews adapter against a local mock server: `articles` envelope, nested
// `source` object, publishedAt mapping, and graceful error behavior.

use std::fs;
use std::time::Duration;

use httpmock::prelude::*;

use newsdesk::news::providers::gnews::GNewsProvider;
use newsdesk::news::query::CategoryTable;
use newsdesk::{NewsProvider, NormalizedQuery};

fn provider(base_url: &str) -> GNewsProvider {
    GNewsProvider::new(
        base_url,
        "test-key",
        CategoryTable::seed(),
        Duration::from_secs(5),
    )
    .expect("build provider")
}

#[tokio::test]
async fn fetch_maps_the_articles_envelope() {
    let fixture = fs::read_to_string("tests/fixtures/gnews.json").expect("missing gnews fixture");

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v4/top-headlines")
                .query_param("apikey", "test-key")
                .query_param("lang", "en")
                .query_param("country", "us")
                .query_param("max", "10");
            then.status(200)
                .header("content-type", "application/json")
                .body(&fixture);
        })
        .await;

    let p = provider(&server.url("/v4/top-headlines"));
    let params = p.translate(&NormalizedQuery::default());
    let articles = p.fetch(&params).await.expect("fetch ok");

    mock.assert_async().await;
    assert_eq!(articles.len(), 2);

    // Nested source object collapses to its name.
    let first = &articles[0];
    assert_eq!(first.source_name.as_deref(), Some("Example Org"));
    assert_eq!(first.url, "https://example.org/quantum");
    assert_eq!(first.published_at.as_deref(), Some("2024-01-01T12:00:00Z"));
    assert!(first.categories.is_empty(), "gnews echoes no categories");

    // Blank source name and blank image collapse to None.
    let second = &articles[1];
    assert_eq!(second.source_name, None);
    assert_eq!(second.image_url, None);
    assert_eq!(second.description, None);
}

#[tokio::test]
async fn category_becomes_topic_and_source_filter_is_ignored() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v4/top-headlines")
                .query_param("topic", "science")
                .query_param("apikey", "test-key");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"totalArticles": 0, "articles": []}"#);
        })
        .await;

    let p = provider(&server.url("/v4/top-headlines"));
    let params = p.translate(&NormalizedQuery {
        category: Some("science".into()),
        search_text: None,
        source_filter: Some("bbc.com".into()),
    });
    assert!(
        params.as_slice().iter().all(|(_, v)| v != "bbc.com"),
        "source filter must not reach gnews"
    );

    let articles = p.fetch(&params).await.expect("fetch ok");
    mock.assert_async().await;
    assert!(articles.is_empty());
}

#[tokio::test]
async fn timeout_is_an_error_at_the_adapter_boundary() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v4/top-headlines");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"totalArticles": 0, "articles": []}"#)
                .delay(Duration::from_millis(500));
        })
        .await;

    let p = GNewsProvider::new(
        &server.url("/v4/top-headlines"),
        "test-key",
        CategoryTable::seed(),
        Duration::from_millis(50),
    )
    .expect("build provider");

    let params = p.translate(&NormalizedQuery::default());
    assert!(p.fetch(&params).await.is_err());
}

#[tokio::test]
async fn malformed_envelope_is_an_error_at_the_adapter_boundary() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v4/top-headlines");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"articles": "not an array"}"#);
        })
        .await;

    let p = provider(&server.url("/v4/top-headlines"));
    let params = p.translate(&NormalizedQuery::default());
    assert!(p.fetch(&params).await.is_err());
}
