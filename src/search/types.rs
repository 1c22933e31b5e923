// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for search and result enrichment

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field added to each result item that yielded content
pub const PARSED_CONTENT_FIELD: &str = "parsed_content";

/// One entry from the upstream search response
///
/// Opaque to the pipeline apart from its `url` field; every other field is
/// passed through untouched.
pub type SearchResultItem = Map<String, Value>;

/// A search result item with the text extracted from its URL
///
/// Serializes as the original item plus a `parsed_content` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResult {
    #[serde(flatten)]
    pub item: SearchResultItem,
    /// Extracted text, never empty
    pub parsed_content: String,
}

impl EnrichedResult {
    /// Attach content to an item, replacing any stale `parsed_content`
    pub fn new(mut item: SearchResultItem, parsed_content: String) -> Self {
        item.remove(PARSED_CONTENT_FIELD);
        Self {
            item,
            parsed_content,
        }
    }

    /// URL of the originating result item
    pub fn url(&self) -> Option<&str> {
        self.item.get("url").and_then(Value::as_str)
    }

    /// Flatten back into a single JSON object
    pub fn into_value(self) -> Value {
        let mut item = self.item;
        item.insert(
            PARSED_CONTENT_FIELD.to_string(),
            Value::String(self.parsed_content),
        );
        Value::Object(item)
    }
}

/// Errors that can occur while querying the upstream search endpoint
#[derive(Debug, Error)]
pub enum SearchError {
    /// Rate limited by the search provider
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// API error from the search provider
    #[error("Search API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Search request timed out
    #[error("Search timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Credential rejected or missing
    #[error("No valid API key configured for {provider}")]
    NoApiKey {
        /// Name of the provider missing API key
        provider: String,
    },

    /// Response did not have the expected shape
    #[error("Invalid search response: {reason}")]
    InvalidResponse {
        /// What was wrong with the response
        reason: String,
    },

    /// Invalid search query
    #[error("Invalid query: {reason}")]
    InvalidQuery {
        /// Reason the query is invalid
        reason: String,
    },

    /// Provider could not be constructed
    #[error("Search provider misconfigured: {reason}")]
    Config {
        /// What is wrong with the configuration
        reason: String,
    },

    /// Search is disabled on this host
    #[error("Search disabled on this host")]
    SearchDisabled,
}
