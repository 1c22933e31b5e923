//! Configuration for content fetching and extraction
//!
//! Defines deadlines, size caps, worker bounds and converter settings.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default converter invocation: `pdftotext -enc UTF-8 <path> -`
const DEFAULT_PDF_TOOL: &str = "pdftotext";
const DEFAULT_PDF_TOOL_ARGS: &[&str] = &["-enc", "UTF-8", "{path}", "-"];

/// Upper bound for the worker pool
const MAX_WORKERS_CAP: usize = 32;

/// Configuration for content fetching
#[derive(Debug, Clone)]
pub struct ContentFetchConfig {
    /// Timeout for a single document GET in milliseconds (default: 10000)
    pub fetch_timeout_ms: u64,
    /// Maximum response body size in bytes (default: 5 MiB)
    pub max_body_bytes: usize,
    /// Timeout for HTML extraction in milliseconds (default: 15000)
    pub markup_timeout_ms: u64,
    /// Timeout for the external converter in milliseconds (default: 30000)
    pub binary_timeout_ms: u64,
    /// Deadline for one result item end to end in milliseconds (default: 60000)
    pub item_timeout_ms: u64,
    /// Maximum characters of extracted text per URL (default: 50000)
    pub max_content_length: usize,
    /// Concurrent items in flight (default: 5)
    pub max_workers: usize,
    /// Cache TTL in seconds, 0 disables the cache (default: 1800)
    pub cache_ttl_secs: u64,
    /// Maximum cache entries (default: 500)
    pub max_cache_entries: usize,
    /// Permit fetching localhost and private network addresses (default: false)
    pub allow_private_hosts: bool,
    /// Converter program for binary documents (default: pdftotext)
    pub pdf_tool: String,
    /// Converter arguments, `{path}` is replaced by the temp file path
    pub pdf_tool_args: Vec<String>,
    /// User-Agent sent with document requests
    pub user_agent: String,
}

impl ContentFetchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fetch_timeout_ms: env_or("CONTENT_FETCH_TIMEOUT_MS", defaults.fetch_timeout_ms),
            max_body_bytes: env_or("CONTENT_FETCH_MAX_BODY_BYTES", defaults.max_body_bytes),
            markup_timeout_ms: env_or("CONTENT_FETCH_MARKUP_TIMEOUT_MS", defaults.markup_timeout_ms),
            binary_timeout_ms: env_or("CONTENT_FETCH_BINARY_TIMEOUT_MS", defaults.binary_timeout_ms),
            item_timeout_ms: env_or("CONTENT_FETCH_ITEM_TIMEOUT_MS", defaults.item_timeout_ms),
            max_content_length: env_or(
                "CONTENT_FETCH_MAX_CONTENT_LENGTH",
                defaults.max_content_length,
            ),
            max_workers: env_or("CONTENT_FETCH_MAX_WORKERS", defaults.max_workers)
                .min(MAX_WORKERS_CAP),
            cache_ttl_secs: env_or("CONTENT_FETCH_CACHE_TTL_SECS", defaults.cache_ttl_secs),
            max_cache_entries: env_or("CONTENT_FETCH_MAX_CACHE_ENTRIES", defaults.max_cache_entries),
            allow_private_hosts: env::var("CONTENT_FETCH_ALLOW_PRIVATE_HOSTS")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(defaults.allow_private_hosts),
            pdf_tool: env::var("CONTENT_FETCH_PDF_TOOL").unwrap_or(defaults.pdf_tool),
            pdf_tool_args: env::var("CONTENT_FETCH_PDF_TOOL_ARGS")
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or(defaults.pdf_tool_args),
            user_agent: env::var("CONTENT_FETCH_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout_ms == 0 {
            return Err("fetch_timeout_ms must be at least 1".to_string());
        }
        if self.markup_timeout_ms == 0 || self.binary_timeout_ms == 0 {
            return Err("extraction timeouts must be at least 1ms".to_string());
        }
        if self.item_timeout_ms == 0 {
            return Err("item_timeout_ms must be at least 1".to_string());
        }
        if self.max_body_bytes == 0 {
            return Err("max_body_bytes must be greater than 0".to_string());
        }
        if self.max_content_length == 0 {
            return Err("max_content_length must be greater than 0".to_string());
        }
        if self.max_workers == 0 || self.max_workers > MAX_WORKERS_CAP {
            return Err(format!("max_workers must be between 1 and {}", MAX_WORKERS_CAP));
        }
        if self.pdf_tool.trim().is_empty() {
            return Err("pdf_tool must not be empty".to_string());
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn markup_timeout(&self) -> Duration {
        Duration::from_millis(self.markup_timeout_ms)
    }

    pub fn binary_timeout(&self) -> Duration {
        Duration::from_millis(self.binary_timeout_ms)
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }
}

impl Default for ContentFetchConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            max_body_bytes: 5 * 1024 * 1024,
            markup_timeout_ms: 15_000,
            binary_timeout_ms: 30_000,
            item_timeout_ms: 60_000,
            max_content_length: 50_000,
            max_workers: 5,
            cache_ttl_secs: 1800,
            max_cache_entries: 500,
            allow_private_hosts: false,
            pdf_tool: DEFAULT_PDF_TOOL.to_string(),
            pdf_tool_args: DEFAULT_PDF_TOOL_ARGS.iter().map(|s| s.to_string()).collect(),
            user_agent: "Mozilla/5.0 (compatible; FabstirBot/1.0; +https://fabstir.com)"
                .to_string(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
