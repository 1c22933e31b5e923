//! HTML content extraction
//!
//! Two ordered strategies turn markup into plain text:
//! 1. Readability-style article extraction scoped to the page URL
//! 2. Fallback: strip structural noise elements and flatten the `<body>` text
//!
//! Parsing runs on a blocking worker raced against a deadline. When the
//! deadline wins the parse is abandoned, never awaited again.

use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use super::types::ExtractError;

/// Elements removed before the fallback flattens the body
const NOISE_SELECTOR: &str = "script, style, noscript, nav, footer, header";

/// Extracts readable text from HTML with a deadline
#[derive(Debug, Clone)]
pub struct MarkupExtractor {
    timeout: Duration,
    max_content_length: usize,
}

impl MarkupExtractor {
    pub fn new(timeout: Duration, max_content_length: usize) -> Self {
        Self {
            timeout,
            max_content_length,
        }
    }

    /// Extract main content from `html`, truncated to the configured length
    ///
    /// Returns `None` when both strategies yield empty text, when the
    /// deadline elapses, or when the parse task dies.
    pub async fn extract_markup_text(&self, html: String, url: &str) -> Option<String> {
        let page_url = url.to_string();
        let task = tokio::task::spawn_blocking(move || extract_main_content(&html, &page_url));

        match timeout(self.timeout, task).await {
            Ok(Ok(Ok(text))) => Some(truncate_chars(&text, self.max_content_length)),
            Ok(Ok(Err(e))) => {
                warn!(target: "search.markup", url, error = %e, "Markup extraction failed");
                None
            }
            Ok(Err(join_err)) => {
                warn!(
                    target: "search.markup",
                    url,
                    error = %join_err,
                    "Markup extraction task aborted"
                );
                None
            }
            Err(_) => {
                warn!(
                    target: "search.markup",
                    url,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Markup extraction timed out"
                );
                None
            }
        }
    }
}

/// Extract main content from HTML
///
/// Tries the article extractor first and falls back to the stripped body
/// only when it yields nothing. Whitespace runs are collapsed in both cases
/// so the same bytes always give the same text.
pub fn extract_main_content(html: &str, url: &str) -> Result<String, ExtractError> {
    match readability_text(html, url) {
        Ok(text) if !text.is_empty() => return Ok(text),
        Ok(_) => debug!(target: "search.markup", url, "Article extractor found no text"),
        Err(e) => debug!(target: "search.markup", url, error = %e, "Article extractor failed"),
    }

    let text = stripped_body_text(html);
    if text.is_empty() {
        return Err(ExtractError::ExtractionFailure(
            "both extraction strategies produced empty text".to_string(),
        ));
    }
    Ok(text)
}

/// Article text from the readability heuristics
///
/// Flattens the serialized top candidate the same way as the fallback.
/// When no candidate scores, the extractor hands back the whole document;
/// that is reported as empty so the fallback runs instead.
fn readability_text(html: &str, url: &str) -> Result<String, ExtractError> {
    let base = Url::parse(url)
        .map_err(|e| ExtractError::Validation(format!("page url {:?}: {}", url, e)))?;
    let product = readability::extractor::extract(&mut html.as_bytes(), &base)
        .map_err(|e| ExtractError::ExtractionFailure(format!("readability: {:?}", e)))?;

    if is_whole_document(&product.content) {
        return Ok(String::new());
    }

    let mut fragment = Html::parse_fragment(&product.content);
    strip_noise(&mut fragment);
    Ok(element_text(fragment.root_element()))
}

/// Whether serialized markup is the document root rather than an article region
fn is_whole_document(content: &str) -> bool {
    let content = content.to_ascii_lowercase();
    content.contains("<head>")
        || content.contains("<head ")
        || content.contains("<title")
        || content.contains("<body")
}

/// Body text with script/style/nav/footer/header removed
fn stripped_body_text(html: &str) -> String {
    let mut document = Html::parse_document(html);
    strip_noise(&mut document);

    let Ok(body) = Selector::parse("body") else {
        return String::new();
    };
    document
        .select(&body)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Detach every noise element from the tree
fn strip_noise(document: &mut Html) {
    let Ok(noise) = Selector::parse(NOISE_SELECTOR) else {
        return;
    };
    let noise_ids: Vec<_> = document.select(&noise).map(|el| el.id()).collect();
    for id in noise_ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Text nodes under `element`, space separated and whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Clean text: collapse whitespace runs to single spaces and trim
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
