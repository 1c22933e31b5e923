// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events under the `search.*` targets;
//! installing a subscriber is left to the embedding process.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install a formatted subscriber filtered by `RUST_LOG`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install a formatted subscriber, falling back to `default_filter`
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
