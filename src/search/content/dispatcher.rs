//! Content classification and dispatch
//!
//! Routes a fetched document to the binary or markup extractor based on
//! its declared content type.

use tracing::{debug, warn};

use super::extractor::{truncate_chars, MarkupExtractor};
use super::pdf::BinaryExtractor;
use super::types::{ContentKind, ExtractedContent, FetchedDocument};

/// Media type handled by the binary extractor
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Magic bytes at the start of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Decide whether a document needs the binary extractor
///
/// Matches the media type case-insensitively and ignores parameters. A
/// document with no declared type is sniffed for the PDF magic bytes.
pub fn is_binary_document(content_type: &str, body: &[u8]) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    if content_type.is_empty() {
        return body.starts_with(PDF_MAGIC);
    }
    content_type.contains(PDF_MEDIA_TYPE)
}

/// Dispatches documents to the matching extractor
#[derive(Clone)]
pub struct ContentDispatcher {
    binary: BinaryExtractor,
    markup: MarkupExtractor,
    max_content_length: usize,
}

impl ContentDispatcher {
    pub fn new(binary: BinaryExtractor, markup: MarkupExtractor, max_content_length: usize) -> Self {
        Self {
            binary,
            markup,
            max_content_length,
        }
    }

    /// Classify and extract a document
    ///
    /// Returns `None` when extraction fails or the body is empty; the reason
    /// is logged with the document URL.
    pub async fn parse_document(&self, doc: FetchedDocument) -> Option<ExtractedContent> {
        let FetchedDocument {
            url,
            content_type,
            body,
            ..
        } = doc;

        if is_binary_document(&content_type, &body) {
            debug!(target: "search.dispatch", url = %url, %content_type, "Dispatching to binary extractor");
            let Some(text) = self.binary.extract_binary_text(&body).await else {
                warn!(target: "search.dispatch", url = %url, stage = "binary", "No text from binary document");
                return None;
            };
            return Some(ExtractedContent {
                content: truncate_chars(&text, self.max_content_length),
                url,
                kind: ContentKind::Binary,
            });
        }

        let html = String::from_utf8_lossy(&body).into_owned();
        if html.trim().is_empty() {
            warn!(target: "search.dispatch", url = %url, stage = "decode", "Empty document body");
            return None;
        }

        debug!(target: "search.dispatch", url = %url, %content_type, "Dispatching to markup extractor");
        let Some(text) = self.markup.extract_markup_text(html, &url).await else {
            warn!(target: "search.dispatch", url = %url, stage = "markup", "No text from markup document");
            return None;
        };

        Some(ExtractedContent {
            content: truncate_chars(&text, self.max_content_length),
            url,
            kind: ContentKind::Markup,
        })
    }
}
