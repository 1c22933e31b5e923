// End-to-end tests for search result enrichment

use async_trait::async_trait;
use fabstir_web_extract::search::content::{
    ContentFetchConfig, ConverterOutput, DocumentConverter, DocumentFetcher, ExtractError,
    FetchedDocument,
};
use fabstir_web_extract::search::{ContentPipeline, SearchConfig, PARSED_CONTENT_FIELD};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_HTML: &str = r#"<html>
<head><title>Async Rust</title><script>var tracking = 1;</script></head>
<body>
  <nav>Home | Blog | About</nav>
  <article><h1>Async Rust</h1><p>Futures are lazy and do nothing unless polled.</p></article>
  <footer>Copyright</footer>
</body>
</html>"#;

struct FakeConverter;

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn convert(&self, _path: &Path) -> Result<ConverterOutput, ExtractError> {
        Ok(ConverterOutput {
            stdout: "Converted PDF text".to_string(),
            success: true,
            exit_code: Some(0),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "fake-pdf"
    }
}

/// Fetcher that misbehaves for URLs containing `panic` or `slow`
struct MisbehavingFetcher;

#[async_trait]
impl DocumentFetcher for MisbehavingFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchedDocument> {
        if url.contains("panic") {
            panic!("fetcher blew up on {}", url);
        }
        if url.contains("slow") {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        Some(FetchedDocument {
            url: url.to_string(),
            content_type: "text/html".to_string(),
            status: 200,
            body: format!("<html><body><p>Content of {}</p></body></html>", url).into_bytes(),
        })
    }
}

fn content_config() -> ContentFetchConfig {
    ContentFetchConfig {
        allow_private_hosts: true,
        ..ContentFetchConfig::default()
    }
}

async fn mount_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(ARTICLE_HTML, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/paper.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7 binary".to_vec()),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

fn pipeline_for(server: &MockServer, content: ContentFetchConfig) -> ContentPipeline {
    ContentPipeline::builder(content)
        .search_config(SearchConfig {
            base_url: server.uri(),
            ..SearchConfig::default()
        })
        .converter(Arc::new(FakeConverter))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_search_and_parse_end_to_end() {
    let server = MockServer::start().await;
    mount_pages(&server).await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "async rust",
            "results": [
                {"url": format!("{}/article", base), "title": "Article", "engine": "bing"},
                {"url": format!("{}/missing", base), "title": "Gone"},
                {"url": "ftp://files.test/x", "title": "Wrong scheme"},
                {"url": format!("{}/paper.pdf", base), "title": "Paper"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server, content_config());
    let results = pipeline.search_and_parse("async rust", "en").await;

    assert_eq!(results.len(), 2);

    assert_eq!(results[0].item["title"], "Article");
    assert_eq!(results[0].item["engine"], "bing");
    assert!(results[0].parsed_content.contains("Futures are lazy"));
    assert!(!results[0].parsed_content.contains("tracking"));

    assert_eq!(results[1].item["title"], "Paper");
    assert_eq!(results[1].parsed_content, "Converted PDF text");

    let value = results[1].clone().into_value();
    assert_eq!(value[PARSED_CONTENT_FIELD], "Converted PDF text");
    assert_eq!(value["title"], "Paper");
}

#[tokio::test]
async fn test_search_and_parse_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server, content_config());
    assert!(pipeline.search_and_parse("anything", "en").await.is_empty());
}

#[tokio::test]
async fn test_search_and_parse_missing_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answers": []})))
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server, content_config());
    assert!(pipeline.search_and_parse("anything", "en").await.is_empty());
}

#[tokio::test]
async fn test_fetch_and_parse_results_truncates() {
    let server = MockServer::start().await;
    mount_pages(&server).await;

    let content = ContentFetchConfig {
        max_content_length: 10,
        ..content_config()
    };
    let pipeline = pipeline_for(&server, content);

    let batch = json!([
        {"url": format!("{}/article", server.uri())},
        {"url": format!("{}/paper.pdf", server.uri())}
    ]);
    let results = pipeline.fetch_and_parse_results(&batch).await;

    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(!result.parsed_content.is_empty());
        assert!(result.parsed_content.chars().count() <= 10);
    }
    assert_eq!(results[1].parsed_content, "Converted ");
}

#[tokio::test]
async fn test_item_failures_are_isolated() {
    let content = ContentFetchConfig {
        item_timeout_ms: 300,
        max_workers: 2,
        ..ContentFetchConfig::default()
    };
    let pipeline = ContentPipeline::builder(content)
        .fetcher(Arc::new(MisbehavingFetcher))
        .converter(Arc::new(FakeConverter))
        .build()
        .unwrap();

    let batch: Value = json!([
        {"url": "https://panic.test/"},
        {"url": "https://one.test/"},
        {"url": "https://slow.test/"},
        {"url": "https://two.test/"}
    ]);

    let started = Instant::now();
    let results = pipeline.fetch_and_parse_results(&batch).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    let urls: Vec<_> = results.iter().filter_map(|r| r.url()).collect();
    assert_eq!(urls, vec!["https://one.test/", "https://two.test/"]);
    assert_eq!(results[0].parsed_content, "Content of https://one.test/");
}

#[tokio::test]
async fn test_order_preserved_with_single_worker() {
    let content = ContentFetchConfig {
        max_workers: 1,
        ..ContentFetchConfig::default()
    };
    let pipeline = ContentPipeline::builder(content)
        .fetcher(Arc::new(MisbehavingFetcher))
        .build()
        .unwrap();

    let batch = Value::Array(
        (0..6)
            .map(|i| json!({"url": format!("https://site{}.test/", i), "position": i}))
            .collect(),
    );
    let results = pipeline.fetch_and_parse_results(&batch).await;

    let positions: Vec<_> = results.iter().map(|r| r.item["position"].clone()).collect();
    assert_eq!(positions, (0..6).map(|i| json!(i)).collect::<Vec<_>>());
}
