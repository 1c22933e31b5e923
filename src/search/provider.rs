// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search provider trait definition

use async_trait::async_trait;
use serde_json::Value;

use super::types::SearchError;

/// Upstream search endpoint
///
/// Providers return the raw JSON response; checking its shape is left to
/// the pipeline so a malformed response never aborts the caller.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search
    ///
    /// # Arguments
    /// * `query` - The search query string
    /// * `language` - Language code passed through to the endpoint
    async fn search(&self, query: &str, language: &str) -> Result<Value, SearchError>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;

    /// Check if the provider is available (has endpoint, credential, etc.)
    fn is_available(&self) -> bool {
        true
    }
}
