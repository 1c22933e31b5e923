// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search result enrichment pipeline
//!
//! Coordinates the upstream search, document fetching, extraction and
//! caching. Per item the flow is `Fetch → Parse → Attach`, and any stage
//! may exit early to `Skip`. Items run on a bounded worker pool; output
//! keeps input order and one item's failure never affects another.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::config::SearchConfig;
use super::content::{
    validate_result_url, BinaryExtractor, CommandConverter, ContentCache, ContentCacheStats,
    ContentDispatcher, ContentFetchConfig, DocumentConverter, DocumentFetcher, ExtractedContent,
    HttpDocumentFetcher, MarkupExtractor,
};
use super::provider::SearchProvider;
use super::rate_limiter::SearchRateLimiter;
use super::searxng::SearxngProvider;
use super::types::{EnrichedResult, SearchError, SearchResultItem};

/// Main entry point: search, fetch, extract, enrich
///
/// Cheap to clone; clones share components and cache.
#[derive(Clone)]
pub struct ContentPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    provider: Option<Arc<dyn SearchProvider>>,
    fetcher: Arc<dyn DocumentFetcher>,
    dispatcher: ContentDispatcher,
    cache: ContentCache,
    rate_limiter: SearchRateLimiter,
    config: ContentFetchConfig,
}

/// Builder for [`ContentPipeline`]
///
/// Components not supplied are built from configuration: the SearXNG
/// provider (when search is enabled), the `reqwest` fetcher and the
/// command-line converter.
pub struct ContentPipelineBuilder {
    content: ContentFetchConfig,
    search: SearchConfig,
    provider: Option<Arc<dyn SearchProvider>>,
    fetcher: Option<Arc<dyn DocumentFetcher>>,
    converter: Option<Arc<dyn DocumentConverter>>,
}

impl ContentPipelineBuilder {
    pub fn search_config(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn converter(mut self, converter: Arc<dyn DocumentConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn build(self) -> anyhow::Result<ContentPipeline> {
        self.content
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid content config: {}", e))?;
        self.search
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid search config: {}", e))?;

        let provider: Option<Arc<dyn SearchProvider>> = match self.provider {
            Some(provider) => Some(provider),
            None if self.search.enabled => Some(Arc::new(SearxngProvider::new(&self.search)?)),
            None => None,
        };

        let fetcher: Arc<dyn DocumentFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpDocumentFetcher::new(&self.content)?),
        };

        let converter: Arc<dyn DocumentConverter> = match self.converter {
            Some(converter) => converter,
            None => Arc::new(CommandConverter::from_config(&self.content)),
        };

        let dispatcher = ContentDispatcher::new(
            BinaryExtractor::new(converter, self.content.binary_timeout()),
            MarkupExtractor::new(self.content.markup_timeout(), self.content.max_content_length),
            self.content.max_content_length,
        );

        debug!(
            target: "search.pipeline",
            provider = provider.as_ref().map(|p| p.name()).unwrap_or("none"),
            max_workers = self.content.max_workers,
            max_content_length = self.content.max_content_length,
            "Content pipeline configured"
        );

        Ok(ContentPipeline {
            inner: Arc::new(PipelineInner {
                provider,
                fetcher,
                dispatcher,
                cache: ContentCache::new(
                    self.content.cache_ttl_secs,
                    self.content.max_cache_entries,
                ),
                rate_limiter: SearchRateLimiter::new(self.search.rate_limit_per_minute),
                config: self.content,
            }),
        })
    }
}

impl ContentPipeline {
    /// Start building a pipeline around the given content configuration
    pub fn builder(content: ContentFetchConfig) -> ContentPipelineBuilder {
        ContentPipelineBuilder {
            content,
            search: SearchConfig::default(),
            provider: None,
            fetcher: None,
            converter: None,
        }
    }

    /// Create a pipeline with default components from configuration
    pub fn new(search: SearchConfig, content: ContentFetchConfig) -> anyhow::Result<Self> {
        Self::builder(content).search_config(search).build()
    }

    /// Create a pipeline from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(SearchConfig::from_env(), ContentFetchConfig::from_env())
    }

    /// Search upstream and enrich every result with its page content
    ///
    /// Never fails: any error in the flow is logged and yields an empty
    /// list.
    pub async fn search_and_parse(&self, query: &str, language: &str) -> Vec<EnrichedResult> {
        let response = match self.search(query, language).await {
            Ok(response) => response,
            Err(e) => {
                warn!(target: "search.pipeline", query, error = %e, "Search failed");
                return vec![];
            }
        };

        let Some(results) = response.get("results").filter(|r| r.is_array()) else {
            let error = SearchError::InvalidResponse {
                reason: "missing results list".to_string(),
            };
            warn!(target: "search.pipeline", query, %error, "Search response has unexpected shape");
            return vec![];
        };

        self.fetch_and_parse_results(results).await
    }

    /// Fetch and extract content for a list of result items
    ///
    /// `results` must be a JSON array of objects. Anything else yields an
    /// empty list; individual malformed items are skipped.
    pub async fn fetch_and_parse_results(&self, results: &Value) -> Vec<EnrichedResult> {
        let Some(items) = results.as_array() else {
            warn!(target: "search.pipeline", "Result batch is not a list, nothing to enrich");
            return vec![];
        };

        let started = Instant::now();
        let input_count = items.len();

        let enriched: Vec<EnrichedResult> = stream::iter(items.iter().cloned().enumerate())
            .map(|(index, item)| self.clone().spawn_item(index, item))
            .buffered(self.inner.config.max_workers.max(1))
            .filter_map(|result| async move { result })
            .collect()
            .await;

        info!(
            target: "search.pipeline",
            input = input_count,
            enriched = enriched.len(),
            skipped = input_count - enriched.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Result batch processed"
        );

        enriched
    }

    /// Get content cache statistics
    pub fn cache_stats(&self) -> ContentCacheStats {
        self.inner.cache.stats()
    }

    /// Clear the content cache
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Get the content configuration
    pub fn config(&self) -> &ContentFetchConfig {
        &self.inner.config
    }

    async fn search(&self, query: &str, language: &str) -> Result<Value, SearchError> {
        let provider = self
            .inner
            .provider
            .as_ref()
            .ok_or(SearchError::SearchDisabled)?;

        if !provider.is_available() {
            return Err(SearchError::SearchDisabled);
        }
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery {
                reason: "query is empty".to_string(),
            });
        }

        self.inner.rate_limiter.acquire().await;

        let start = Instant::now();
        let response = provider.search(query, language).await?;
        info!(
            target: "search.upstream",
            provider = provider.name(),
            query,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(response)
    }

    /// Run one item on its own task so a panic stays local to it
    async fn spawn_item(self, index: usize, item: Value) -> Option<EnrichedResult> {
        match tokio::spawn(async move { self.process_item(item).await }).await {
            Ok(result) => result,
            Err(e) => {
                warn!(target: "search.pipeline", index, error = %e, "Result item task failed");
                None
            }
        }
    }

    async fn process_item(&self, item: Value) -> Option<EnrichedResult> {
        let Value::Object(item) = item else {
            warn!(target: "search.pipeline", "Skipping result item that is not an object");
            return None;
        };

        let url = match validated_url(&item) {
            Ok(url) => url,
            Err(reason) => {
                warn!(target: "search.pipeline", stage = "validate", %reason, "Skipping result item");
                return None;
            }
        };

        let deadline = self.inner.config.item_timeout();
        match timeout(deadline, self.extract(&url)).await {
            Ok(Some(content)) if !content.content.is_empty() => {
                Some(EnrichedResult::new(item, content.content))
            }
            Ok(_) => {
                debug!(target: "search.pipeline", url = %url, "No content for result item");
                None
            }
            Err(_) => {
                warn!(
                    target: "search.pipeline",
                    url = %url,
                    timeout_ms = deadline.as_millis() as u64,
                    "Result item timed out"
                );
                None
            }
        }
    }

    async fn extract(&self, url: &str) -> Option<ExtractedContent> {
        if let Some(cached) = self.inner.cache.get(url) {
            debug!(target: "search.pipeline", url, "Content cache hit");
            return Some(cached);
        }

        let doc = self.inner.fetcher.fetch(url).await?;
        let content = self.inner.dispatcher.parse_document(doc).await?;
        if content.content.is_empty() {
            return None;
        }

        info!(
            target: "search.pipeline",
            url,
            chars = content.content.chars().count(),
            kind = ?content.kind,
            "Extracted content"
        );
        self.inner.cache.insert(content.clone());
        Some(content)
    }
}

fn validated_url(item: &SearchResultItem) -> Result<String, String> {
    let raw = item
        .get("url")
        .ok_or_else(|| "missing url field".to_string())?
        .as_str()
        .ok_or_else(|| "url field is not a string".to_string())?;
    validate_result_url(raw)
        .map(|url| url.to_string())
        .map_err(|e| e.to_string())
}
