// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for document fetching and text extraction

use thiserror::Error;

/// Raw document retrieved by a fetcher
///
/// Consumed once by the dispatcher and never retained.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL the document was requested from
    pub url: String,
    /// Declared `Content-Type` header (empty when absent)
    pub content_type: String,
    /// HTTP status code of the response
    pub status: u16,
    /// Undecoded response body
    pub body: Vec<u8>,
}

/// Which extraction path produced a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML article or stripped-markup text
    Markup,
    /// Text produced by the external document converter
    Binary,
}

/// Text extracted from a single URL, already truncated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub url: String,
    pub content: String,
    pub kind: ContentKind,
}

/// Errors raised inside the fetch/extract stages
///
/// These never leave the component that raised them: each stage logs the
/// error with its URL and turns it into an empty result.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Connection, DNS or body read failure
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Upstream answered with a non-success status
    #[error("HTTP {status} for: {url}")]
    HttpStatus { status: u16, url: String },

    /// Response body exceeded the configured cap
    #[error("body for {url} exceeds {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },

    /// Neither extraction strategy produced text
    #[error("no content extracted: {0}")]
    ExtractionFailure(String),

    /// Converter could not be launched or exited abnormally
    #[error("converter failed: {0}")]
    Subprocess(String),

    /// A deadline race was lost
    #[error("{stage} timed out after {timeout_ms}ms")]
    Timeout { stage: &'static str, timeout_ms: u64 },

    /// Malformed URL or malformed input shape
    #[error("invalid input: {0}")]
    Validation(String),

    /// HTTP client could not be constructed
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// Temp file write or cleanup failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// HTTP status attached to the error, when there is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
