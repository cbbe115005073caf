//! Integration tests for the catalog client and search source.
//!
//! Uses wiremock for HTTP mocking. Tests cover paging through a
//! `ListCache`, status mapping (404/429/5xx), retry behavior and
//! undecodable bodies.

use std::sync::Arc;

use serde_json::json;
use shelf_catalog::{volume_selector, CatalogClient, CatalogConfig, VolumeSearchSource};
use shelf_core::{ErrorKind, FetchOutcome, ListCache, ListConfig, ListError, SkipReason};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer, max_retries: u32) -> CatalogClient {
    let config = CatalogConfig::default()
        .with_url(mock_server.uri())
        .with_max_retries(max_retries)
        .with_backoff_base_ms(10);
    CatalogClient::new(config).expect("failed to create client")
}

fn volumes(ids: &[(&str, &str)], total: u64) -> serde_json::Value {
    let items: Vec<_> = ids
        .iter()
        .map(|(id, title)| {
            json!({
                "id": id,
                "volumeInfo": {"title": title, "authors": ["Frank Herbert"]}
            })
        })
        .collect();
    json!({"totalItems": total, "items": items})
}

async fn mount_window(mock_server: &MockServer, start: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", "dune"))
        .and(query_param("startIndex", start))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(mock_server)
        .await;
}

async fn search_cache(client: CatalogClient, page_size: usize) -> ListCache<shelf_catalog::Volume> {
    ListCache::builder(Arc::new(VolumeSearchSource::new(client, "dune")))
        .selector(volume_selector())
        .config(ListConfig::default().with_page_size(page_size))
        .build()
        .await
        .expect("failed to build cache")
}

#[tokio::test]
async fn test_search_pages_until_total_reached() {
    let mock_server = MockServer::start().await;
    mount_window(
        &mock_server,
        "0",
        volumes(&[("d1", "Dune"), ("d2", "Dune Messiah")], 3),
    )
    .await;
    mount_window(
        &mock_server,
        "2",
        volumes(&[("d2", "Dune Messiah"), ("d3", "Children of Dune")], 3),
    )
    .await;

    let cache = search_cache(create_test_client(&mock_server, 0), 2).await;

    assert_eq!(
        cache.fetch_next().await.unwrap(),
        FetchOutcome::Merged {
            fetched: 2,
            added: 2
        }
    );
    assert_eq!(
        cache.fetch_next().await.unwrap(),
        FetchOutcome::Merged {
            fetched: 2,
            added: 1
        }
    );

    // The window reached totalItems; the next fetch ends the list offline.
    assert_eq!(cache.fetch_next().await.unwrap(), FetchOutcome::Exhausted);
    assert_eq!(
        cache.fetch_next().await.unwrap(),
        FetchOutcome::Skipped(SkipReason::Exhausted)
    );

    let ids: Vec<_> = cache.accumulated().into_iter().map(|v| v.id).collect();
    assert_eq!(ids, vec!["d1", "d2", "d3"]);
}

#[tokio::test]
async fn test_search_filters_by_author() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalItems": 2,
            "items": [
                {"id": "a", "volumeInfo": {"title": "Dune", "authors": ["Frank Herbert"]}},
                {"id": "b", "volumeInfo": {"title": "Hyperion", "authors": ["Dan Simmons"]}}
            ]
        })))
        .mount(&mock_server)
        .await;

    let cache = search_cache(create_test_client(&mock_server, 0), 10).await;
    cache.fetch_next().await.unwrap();

    cache.set_search_term("SIMMONS");
    cache.flush_search().await;

    let view: Vec<_> = cache.current_view().into_iter().map(|v| v.id).collect();
    assert_eq!(view, vec!["b"]);
}

#[tokio::test]
async fn test_empty_result_exhausts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalItems": 0})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = search_cache(create_test_client(&mock_server, 0), 10).await;
    assert_eq!(cache.fetch_next().await.unwrap(), FetchOutcome::Exhausted);
    assert!(!cache.has_more());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_fetch_volume_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 0);
    let result = client.fetch_volume("missing").await;
    assert!(
        matches!(result, Err(ListError::NotFound { .. })),
        "expected NotFound, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_server_error_keeps_items_and_cursor() {
    let mock_server = MockServer::start().await;
    mount_window(&mock_server, "0", volumes(&[("d1", "Dune")], 5)).await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("startIndex", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "Backend Error"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = search_cache(create_test_client(&mock_server, 0), 1).await;
    cache.fetch_next().await.unwrap();
    let cursor = cache.cursor();

    let err = cache.fetch_next().await.unwrap_err();
    match err {
        ListError::Backend { status, message } => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "Backend Error");
        }
        other => panic!("expected Backend, got {:?}", other),
    }
    assert_eq!(cache.last_error(), Some(ErrorKind::Backend));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.cursor(), cursor);
    assert!(!cache.is_loading());
}

#[tokio::test]
async fn test_retry_on_503_then_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(volumes(&[("d1", "Dune")], 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 2);
    let page = client.search("dune", 0, 10).await.expect("retry should succeed");
    assert_eq!(page.volumes.len(), 1);
}

#[tokio::test]
async fn test_max_retries_exceeded_on_429() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 1);

    let start = std::time::Instant::now();
    let result = client.search("dune", 0, 10).await;
    let elapsed = start.elapsed();

    assert!(
        matches!(result, Err(ListError::Backend { status: Some(429), .. })),
        "expected rate limit error, got {:?}",
        result
    );
    assert!(
        elapsed.as_millis() >= 850,
        "should have waited for retry-after (with jitter), elapsed: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad query"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 3);
    let result = client.search("", 0, 10).await;
    match result {
        Err(ListError::Backend { status, message }) => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "bad query");
        }
        other => panic!("expected Backend, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_invalid_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 0);
    let err = client.search("dune", 0, 10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert_eq!(err.exit_code(), 6);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let config = CatalogConfig::default()
        .with_url("http://127.0.0.1:9")
        .with_max_retries(0);
    let client = CatalogClient::new(config).unwrap();

    let err = client.search("dune", 0, 10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_retryable());
}
