// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rate limiting for upstream search requests

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

use super::types::SearchError;

const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Rate limiter for search requests
#[derive(Clone)]
pub struct SearchRateLimiter {
    limiter: Arc<GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    requests_per_minute: u32,
}

impl SearchRateLimiter {
    /// Create a new rate limiter
    ///
    /// Zero falls back to the default of 60 requests per minute.
    pub fn new(requests_per_minute: u32) -> Self {
        let requests_per_minute = if requests_per_minute == 0 {
            DEFAULT_REQUESTS_PER_MINUTE
        } else {
            requests_per_minute
        };
        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(GovRateLimiter::direct(Quota::per_minute(rpm)));

        Self {
            limiter,
            requests_per_minute,
        }
    }

    /// Check if a request is allowed right now
    pub fn check(&self) -> Result<(), SearchError> {
        self.limiter
            .check()
            .map_err(|_| SearchError::RateLimited {
                retry_after_secs: 60,
            })
    }

    /// Take a permit, waiting for one when the quota is exhausted
    pub async fn acquire(&self) {
        if self.check().is_ok() {
            return;
        }
        debug!(
            target: "search.upstream",
            requests_per_minute = self.requests_per_minute,
            "Search rate limit reached, waiting for permit"
        );
        self.limiter.until_ready().await;
    }

    /// Get the configured requests per minute
    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}
