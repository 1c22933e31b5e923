// Tests for the HTTP document fetcher against a local mock server

use fabstir_web_extract::search::content::{
    ContentFetchConfig, DocumentFetcher, ExtractError, HttpDocumentFetcher,
};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_config() -> ContentFetchConfig {
    ContentFetchConfig {
        allow_private_hosts: true,
        ..ContentFetchConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_html_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><p>Hi</p></body></html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpDocumentFetcher::new(&local_config()).unwrap();
    let url = format!("{}/page", server.uri());
    let doc = fetcher.fetch(&url).await.expect("document");

    assert_eq!(doc.status, 200);
    assert_eq!(doc.url, url);
    assert_eq!(doc.content_type, "text/html; charset=utf-8");
    assert_eq!(doc.body, b"<html><body><p>Hi</p></body></html>".to_vec());
}

#[tokio::test]
async fn test_fetch_binary_document_keeps_bytes() {
    let server = MockServer::start().await;
    let bytes = vec![0x25, 0x50, 0x44, 0x46, 0x2d, 0x00, 0xff, 0x10];
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(bytes.clone()),
        )
        .mount(&server)
        .await;

    let fetcher = HttpDocumentFetcher::new(&local_config()).unwrap();
    let doc = fetcher
        .fetch(&format!("{}/doc.pdf", server.uri()))
        .await
        .expect("document");

    assert_eq!(doc.content_type, "application/pdf");
    assert_eq!(doc.body, bytes);
}

#[tokio::test]
async fn test_fetch_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let fetcher = HttpDocumentFetcher::new(&local_config()).unwrap();
    let url = format!("{}/gone", server.uri());

    let err = fetcher.try_fetch(&url).await.unwrap_err();
    assert!(matches!(err, ExtractError::HttpStatus { status: 404, .. }));
    assert_eq!(err.status(), Some(404));
    assert!(fetcher.fetch(&url).await.is_none());
}

#[tokio::test]
async fn test_fetch_body_over_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(1000)))
        .mount(&server)
        .await;

    let config = ContentFetchConfig {
        max_body_bytes: 64,
        ..local_config()
    };
    let fetcher = HttpDocumentFetcher::new(&config).unwrap();

    let err = fetcher
        .try_fetch(&format!("{}/big", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::BodyTooLarge { limit: 64, .. }));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ContentFetchConfig {
        fetch_timeout_ms: 200,
        ..local_config()
    };
    let fetcher = HttpDocumentFetcher::new(&config).unwrap();

    let started = std::time::Instant::now();
    let err = fetcher
        .try_fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Timeout { stage: "fetch", .. }));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_fetch_blocks_private_hosts_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = HttpDocumentFetcher::new(&ContentFetchConfig::default()).unwrap();
    let url = format!("{}/admin", server.uri());

    assert!(matches!(
        fetcher.try_fetch(&url).await,
        Err(ExtractError::Validation(_))
    ));
    assert!(fetcher.fetch(&url).await.is_none());
}

#[tokio::test]
async fn test_fetch_redirect_loop_is_cut_off() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;

    let fetcher = HttpDocumentFetcher::new(&local_config()).unwrap();
    let err = fetcher
        .try_fetch(&format!("{}/loop", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Network { .. }));
}

#[tokio::test]
async fn test_fetch_follows_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>Moved</p>", "text/html"))
        .mount(&server)
        .await;

    let fetcher = HttpDocumentFetcher::new(&local_config()).unwrap();
    let doc = fetcher
        .fetch(&format!("{}/old", server.uri()))
        .await
        .expect("document");
    assert_eq!(doc.body, b"<p>Moved</p>".to_vec());
}
