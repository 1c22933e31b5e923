//! Document acquisition and text extraction
//!
//! Turns result URLs into bounded plain text for downstream consumers.
//!
//! ## Architecture
//!
//! ```text
//! URL → DocumentFetcher → FetchedDocument → ContentDispatcher ─┬→ BinaryExtractor (pdftotext) ─┐
//!                                                               └→ MarkupExtractor (readability → stripped body) ─┴→ ExtractedContent
//!                                   ContentCache (30min TTL)
//! ```
//!
//! Every stage that can run unboundedly long is raced against a deadline and
//! every failure is logged and turned into `None` at the stage where it
//! happens.
//!
//! ## Usage
//!
//! ```ignore
//! let config = ContentFetchConfig::from_env();
//! let fetcher = HttpDocumentFetcher::new(&config)?;
//! let doc = fetcher.fetch("https://example.com").await;
//! ```

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod extractor;
pub mod fetcher;
pub mod pdf;
pub mod types;

pub use cache::{CachedContent, ContentCache, ContentCacheStats};
pub use config::ContentFetchConfig;
pub use dispatcher::{is_binary_document, ContentDispatcher, PDF_MEDIA_TYPE};
pub use extractor::{extract_main_content, truncate_chars, MarkupExtractor};
pub use fetcher::{is_safe_url, validate_result_url, DocumentFetcher, HttpDocumentFetcher};
pub use pdf::{BinaryExtractor, CommandConverter, ConverterOutput, DocumentConverter};
pub use types::{ContentKind, ExtractError, ExtractedContent, FetchedDocument};
