// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! SearXNG-compatible search provider
//!
//! Queries a metasearch endpoint that answers `GET /search?format=json`
//! with `{ "results": [ { "url": ... }, ... ] }`.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::config::SearchConfig;
use super::provider::SearchProvider;
use super::types::SearchError;

/// Metasearch provider authenticated by a static header credential
pub struct SearxngProvider {
    client: Client,
    endpoint: Url,
    credential: Option<(HeaderName, HeaderValue)>,
    engines: String,
    max_results: usize,
    timeout_ms: u64,
}

impl SearxngProvider {
    /// Create a provider from search configuration
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut base = Url::parse(config.base_url.trim()).map_err(|e| SearchError::Config {
            reason: format!("invalid base URL {:?}: {}", config.base_url, e),
        })?;
        // Without a trailing slash `join` would replace the last path segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join("search").map_err(|e| SearchError::Config {
            reason: format!("cannot build search endpoint: {}", e),
        })?;

        let credential = match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                let name = HeaderName::from_bytes(config.api_key_header.trim().as_bytes())
                    .map_err(|e| SearchError::Config {
                        reason: format!("invalid credential header name: {}", e),
                    })?;
                let mut value =
                    HeaderValue::from_str(key.trim()).map_err(|e| SearchError::Config {
                        reason: format!("invalid credential value: {}", e),
                    })?;
                value.set_sensitive(true);
                Some((name, value))
            }
            _ => None,
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| SearchError::Config {
                reason: format!("HTTP client build failed: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint,
            credential,
            engines: config.engines_param(),
            max_results: config.max_results,
            timeout_ms: config.request_timeout_ms,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Query parameters for a search
    fn query_params(&self, query: &str, language: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("language", language.to_string()),
            ("max_results", self.max_results.to_string()),
        ];
        if !self.engines.is_empty() {
            params.push(("engines", self.engines.clone()));
        }
        params
    }
}

#[async_trait]
impl SearchProvider for SearxngProvider {
    async fn search(&self, query: &str, language: &str) -> Result<Value, SearchError> {
        debug!(target: "search.upstream", query, language, "Querying search endpoint");

        let mut request = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .query(&self.query_params(query, language));
        if let Some((name, value)) = &self.credential {
            request = request.header(name.clone(), value.clone());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                SearchError::ApiError {
                    status: 0,
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();

        if status == 429 {
            return Err(SearchError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if status == 401 || status == 403 {
            return Err(SearchError::NoApiKey {
                provider: self.name().to_string(),
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(
                target: "search.upstream",
                status = status.as_u16(),
                "Search endpoint returned an error"
            );
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::InvalidResponse {
                reason: format!("JSON parse error: {}", e),
            })
    }

    fn name(&self) -> &'static str {
        "searxng"
    }
}
