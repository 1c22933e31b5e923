// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web search result enrichment
//!
//! Runs a query against a SearXNG-compatible metasearch endpoint, then
//! fetches every result URL and attaches the page's main text as
//! `parsed_content`.
//!
//! Key features:
//! - Markup extraction with a readability pass and a stripped-body fallback
//! - Binary (PDF) extraction through an external converter
//! - Deadlines on every fetch, parse and per-item stage
//! - Bounded worker pool that preserves result order
//! - TTL-based content caching and upstream rate limiting

pub mod config;
pub mod content;
pub mod pipeline;
pub mod provider;
pub mod rate_limiter;
pub mod searxng;
pub mod types;

// Re-export commonly used types
pub use config::SearchConfig;
pub use pipeline::{ContentPipeline, ContentPipelineBuilder};
pub use provider::SearchProvider;
pub use rate_limiter::SearchRateLimiter;
pub use searxng::SearxngProvider;
pub use types::{EnrichedResult, SearchError, SearchResultItem, PARSED_CONTENT_FIELD};

pub use content::{
    ContentCacheStats, ContentFetchConfig, ContentKind, DocumentConverter, DocumentFetcher,
    ExtractError, ExtractedContent, FetchedDocument,
};
