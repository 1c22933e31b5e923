// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the upstream search endpoint

use std::env;

/// Configuration for upstream search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Whether upstream search is enabled
    pub enabled: bool,
    /// Base URL of the search endpoint (`/search` is appended)
    pub base_url: String,
    /// Static credential sent with every search request
    pub api_key: Option<String>,
    /// Header carrying the credential
    pub api_key_header: String,
    /// Engines the endpoint should query
    pub engines: Vec<String>,
    /// Cap on results requested per search
    pub max_results: usize,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Rate limit (requests per minute)
    pub rate_limit_per_minute: u32,
}

impl SearchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            // Set SEARCH_ENABLED=false to disable
            enabled: env::var("SEARCH_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.enabled),
            base_url: env::var("SEARCH_BASE_URL").unwrap_or(defaults.base_url),
            api_key: env::var("SEARCH_API_KEY").ok().filter(|k| !k.is_empty()),
            api_key_header: env::var("SEARCH_API_KEY_HEADER").unwrap_or(defaults.api_key_header),
            engines: env::var("SEARCH_ENGINES")
                .map(|v| parse_engines(&v))
                .unwrap_or(defaults.engines),
            max_results: env::var("SEARCH_MAX_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_results),
            request_timeout_ms: env::var("SEARCH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
            rate_limit_per_minute: env::var("SEARCH_RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_per_minute),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("Search base URL must be set".to_string());
        }
        if self.api_key_header.trim().is_empty() {
            return Err("API key header name must be set".to_string());
        }
        if self.max_results == 0 {
            return Err("max_results must be greater than 0".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.rate_limit_per_minute == 0 {
            return Err("Rate limit must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Engines as the comma-joined query parameter value
    pub fn engines_param(&self) -> String {
        self.engines.join(",")
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8888".to_string(),
            api_key: None,
            api_key_header: "X-API-Key".to_string(),
            engines: vec![
                "google".to_string(),
                "bing".to_string(),
                "duckduckgo".to_string(),
            ],
            max_results: 10,
            request_timeout_ms: 10000,
            rate_limit_per_minute: 60,
        }
    }
}

fn parse_engines(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
