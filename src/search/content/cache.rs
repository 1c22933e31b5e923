//! Extracted content caching
//!
//! TTL-based cache so repeated result URLs skip the fetch and extraction
//! stages. A TTL of zero disables caching.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use url::Url;

use super::types::ExtractedContent;

/// Cached extraction result
#[derive(Debug, Clone)]
pub struct CachedContent {
    pub content: ExtractedContent,
    pub fetched_at: Instant,
}

/// Content cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCacheStats {
    pub total: usize,
    pub expired: usize,
    pub max: usize,
}

/// Content cache with TTL-based expiration
pub struct ContentCache {
    cache: RwLock<HashMap<String, CachedContent>>,
    ttl: Duration,
    max_entries: usize,
}

impl ContentCache {
    /// Create a new content cache
    ///
    /// # Arguments
    /// * `ttl_secs` - Time-to-live for cached entries in seconds, 0 disables
    /// * `max_entries` - Maximum number of entries before eviction
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero() && self.max_entries > 0
    }

    /// Get cached content if not expired
    pub fn get(&self, url: &str) -> Option<ExtractedContent> {
        if !self.is_enabled() {
            return None;
        }
        let cache = self.cache.read().ok()?;
        let entry = cache.get(&Self::normalize_url(url))?;

        if entry.fetched_at.elapsed() > self.ttl {
            return None;
        }

        Some(entry.content.clone())
    }

    /// Insert extracted content, keyed by its URL
    pub fn insert(&self, content: ExtractedContent) {
        if !self.is_enabled() {
            return;
        }
        let mut cache = match self.cache.write() {
            Ok(c) => c,
            Err(_) => return,
        };

        let key = Self::normalize_url(&content.url);
        if !cache.contains_key(&key) && cache.len() >= self.max_entries {
            Self::evict_oldest(&mut cache);
        }

        cache.insert(
            key,
            CachedContent {
                content,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> ContentCacheStats {
        let Ok(cache) = self.cache.read() else {
            return ContentCacheStats {
                total: 0,
                expired: 0,
                max: self.max_entries,
            };
        };
        ContentCacheStats {
            total: cache.len(),
            expired: cache
                .values()
                .filter(|e| e.fetched_at.elapsed() > self.ttl)
                .count(),
            max: self.max_entries,
        }
    }

    /// Cache key: parsed URL without fragment or trailing slash
    ///
    /// Scheme and host are lowercased by the parser; the path keeps its case.
    fn normalize_url(url: &str) -> String {
        match Url::parse(url) {
            Ok(mut parsed) => {
                parsed.set_fragment(None);
                parsed.as_str().trim_end_matches('/').to_string()
            }
            Err(_) => url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn evict_oldest(cache: &mut HashMap<String, CachedContent>) {
        if let Some(oldest_key) = cache
            .iter()
            .min_by_key(|(_, v)| v.fetched_at)
            .map(|(k, _)| k.clone())
        {
            cache.remove(&oldest_key);
        }
    }
}
