// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod logging;
pub mod search;

// Re-export main types
pub use search::{
    ContentFetchConfig, ContentPipeline, EnrichedResult, ExtractError, SearchConfig, SearchError,
};
