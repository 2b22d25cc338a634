mod support;

use std::sync::Arc;
use std::time::Duration;

use brewcache::cache::{CacheConfig, NoopQueryCache, QueryKey};
use brewcache::query::{ContentApi, ContentQueries, QueryError, QueryState};
use futures::future::join_all;
use httpmock::MockServer;
use serde_json::json;

use support::{FakeSource, RecordingMailer, app};

fn queries(server: &MockServer, config: CacheConfig) -> ContentQueries {
    ContentQueries::new(ContentApi::new(&server.base_url()).expect("api"), config)
}

fn category(id: u64, slug: &str) -> serde_json::Value {
    json!({"id": id, "name": slug.to_uppercase(), "slug": slug, "description": ""})
}

#[tokio::test]
async fn concurrent_identical_queries_hit_proxy_once() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/wordpress")
            .query_param("action", "getCategories");
        then.status(200)
            .delay(Duration::from_millis(200))
            .json_body(json!([category(1, "ipas")]));
    });

    let queries = queries(&server, CacheConfig::default());
    let results = join_all((0..5).map(|_| queries.categories())).await;

    for result in results {
        assert_eq!(result.expect("categories").len(), 1);
    }
    mock.assert();
}

#[tokio::test]
async fn fresh_results_are_served_from_cache() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/wordpress")
            .query_param("action", "getPosts");
        then.status(200).json_body(json!([]));
    });

    let queries = queries(&server, CacheConfig::default());
    queries.posts().await.expect("first");
    queries.posts().await.expect("second");

    mock.assert();
    assert_eq!(
        queries.client().peek(&QueryKey::Posts),
        Some(QueryState::Success(json!([])))
    );
}

#[tokio::test]
async fn stale_results_are_refetched() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/wordpress")
            .query_param("action", "getAuthors");
        then.status(200).json_body(json!([{"id": 1, "name": "Mara"}]));
    });

    let queries = queries(&server, CacheConfig::with_stale_time(Duration::ZERO));
    queries.authors().await.expect("first");
    queries.authors().await.expect("second");

    mock.assert_calls(2);
}

#[tokio::test]
async fn failed_query_leaves_other_keys_cached() {
    let server = MockServer::start();
    let categories = server.mock(|when, then| {
        when.method("GET")
            .path("/api/wordpress")
            .query_param("action", "getCategories");
        then.status(200).json_body(json!([category(1, "ipas")]));
    });
    server.mock(|when, then| {
        when.method("GET")
            .path("/api/wordpress")
            .query_param("action", "getPosts");
        then.status(500)
            .json_body(json!({"error": "Internal Server Error"}));
    });

    let queries = queries(&server, CacheConfig::default());
    queries.categories().await.expect("categories");

    let err = queries.posts().await.expect_err("posts fail");
    assert_eq!(
        err,
        QueryError::Status {
            status: 500,
            message: "Internal Server Error".into()
        }
    );

    queries.categories().await.expect("still cached");
    categories.assert();
    assert!(matches!(
        queries.client().peek(&QueryKey::Posts),
        Some(QueryState::Error(QueryError::Status { status: 500, .. }))
    ));
}

#[tokio::test]
async fn category_by_slug_is_first_match_or_none() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/wordpress")
            .query_param("action", "getCategories");
        then.status(200).json_body(json!([
            category(1, "ipas"),
            category(2, "stouts"),
            category(3, "stouts")
        ]));
    });

    let queries = queries(&server, CacheConfig::default());
    let stouts = queries
        .category_by_slug("stouts")
        .await
        .expect("lookup")
        .expect("found");
    assert_eq!(stouts.id, 2);
    assert!(
        queries
            .category_by_slug("lagers")
            .await
            .expect("lookup")
            .is_none()
    );

    mock.assert();
}

#[tokio::test]
async fn noop_cache_refetches_every_time() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/wordpress")
            .query_param("action", "getPageBySlug")
            .query_param("slug", "about");
        then.status(200)
            .json_body(json!({
                "id": 5,
                "date": "2024-01-01T00:00:00",
                "slug": "about",
                "status": "publish",
                "title": {"rendered": "About"},
                "content": {"rendered": ""}
            }));
    });

    let api = ContentApi::new(&server.base_url()).expect("api");
    let queries = ContentQueries::with_cache(api, Arc::new(NoopQueryCache), CacheConfig::default());
    for _ in 0..2 {
        let page = queries.page_by_slug("about").await.expect("page");
        assert_eq!(page.map(|page| page.id), Some(5));
    }

    mock.assert_calls(2);
}

#[tokio::test]
async fn undecodable_response_is_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/wordpress");
        then.status(200).body("<html>oops</html>");
    });

    let err = queries(&server, CacheConfig::default())
        .posts()
        .await
        .expect_err("not json");
    assert!(matches!(err, QueryError::Decode(_)));
}

#[tokio::test]
async fn queries_round_trip_through_the_proxy() {
    let source = FakeSource::answering(json!([{
        "id": 11,
        "date": "2024-03-05T10:00:00",
        "slug": "ipa-review",
        "status": "publish",
        "title": {"rendered": "IPA Review"},
        "content": {"rendered": "<p>Hazy.</p>"}
    }]));
    let router = app(source.clone(), Arc::new(RecordingMailer::default()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    let queries = ContentQueries::new(
        ContentApi::new(&format!("http://{addr}")).expect("api"),
        CacheConfig::default(),
    );
    let post = queries
        .post_by_slug("ipa-review")
        .await
        .expect("query")
        .expect("post");
    assert_eq!(post.id, 11);

    let missing = queries.post_by_slug("").await.expect_err("slug required");
    assert_eq!(
        missing,
        QueryError::Status {
            status: 400,
            message: "Slug required".into()
        }
    );
    assert_eq!(source.seen().len(), 1);

    server.abort();
}
