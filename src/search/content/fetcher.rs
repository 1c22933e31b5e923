//! HTTP document fetching with a hard timeout and a body size cap
//!
//! Retrieves raw bytes for result URLs so HTML and binary payloads are
//! handled the same way. A failed fetch is terminal for that URL only.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::{Host, Url};

use super::config::ContentFetchConfig;

/// Maximum redirect hops followed for one document
const MAX_REDIRECTS: usize = 5;
use super::types::{ExtractError, FetchedDocument};

/// Source of raw documents for the pipeline
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch a document, returning `None` on any failure
    ///
    /// Implementations log their own diagnostics and never panic on
    /// network errors.
    async fn fetch(&self, url: &str) -> Option<FetchedDocument>;
}

/// `reqwest`-backed fetcher: one attempt, no retries
pub struct HttpDocumentFetcher {
    client: Client,
    timeout: Duration,
    max_body_bytes: usize,
    allow_private_hosts: bool,
}

impl HttpDocumentFetcher {
    /// Create a new fetcher from content configuration
    pub fn new(config: &ContentFetchConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.as_str())
            .redirect(redirect_policy(config.allow_private_hosts))
            .build()
            .map_err(|e| ExtractError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.fetch_timeout(),
            max_body_bytes: config.max_body_bytes,
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    /// Fetch a URL, surfacing the reason for failure
    pub async fn try_fetch(&self, url: &str) -> Result<FetchedDocument, ExtractError> {
        if !self.allow_private_hosts && !is_safe_url(url) {
            return Err(ExtractError::Validation(format!(
                "private or non-http address blocked: {}",
                url
            )));
        }

        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ExtractError::Timeout {
                    stage: "fetch",
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                ExtractError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_body_bytes as u64 {
                return Err(ExtractError::BodyTooLarge {
                    url: url.to_string(),
                    limit: self.max_body_bytes,
                });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // Content-Length may be absent or wrong, so enforce the cap while streaming
        let mut body = Vec::new();
        loop {
            let chunk = response.chunk().await.map_err(|e| {
                if e.is_timeout() {
                    ExtractError::Timeout {
                        stage: "fetch",
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    ExtractError::Network {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;
            let Some(chunk) = chunk else { break };
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(ExtractError::BodyTooLarge {
                    url: url.to_string(),
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchedDocument {
            url: url.to_string(),
            content_type,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchedDocument> {
        debug!(target: "search.fetch", url, "Fetching document");

        match self.try_fetch(url).await {
            Ok(doc) => {
                debug!(
                    target: "search.fetch",
                    url,
                    bytes = doc.body.len(),
                    content_type = %doc.content_type,
                    "Fetched document"
                );
                Some(doc)
            }
            Err(e) => {
                warn!(
                    target: "search.fetch",
                    url,
                    status = ?e.status(),
                    error = %e,
                    "Document fetch failed"
                );
                None
            }
        }
    }
}

/// Redirect policy: bounded hops, each hop checked against the host guard
fn redirect_policy(allow_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        let verdict = check_redirect(attempt.url(), attempt.previous().len(), allow_private_hosts);
        match verdict {
            Ok(()) => attempt.follow(),
            Err(reason) => attempt.error(reason),
        }
    })
}

/// Decide whether the hop to `target` may be followed after `hops` redirects
fn check_redirect(target: &Url, hops: usize, allow_private_hosts: bool) -> Result<(), String> {
    if hops > MAX_REDIRECTS {
        return Err(format!("more than {} redirects", MAX_REDIRECTS));
    }
    if !allow_private_hosts && !is_safe_url(target.as_str()) {
        return Err(format!("redirect to private or non-http address blocked: {}", target));
    }
    Ok(())
}

/// Parse and check a result URL before any network call
///
/// Accepts absolute `http`/`https` URLs that carry a host.
pub fn validate_result_url(raw: &str) -> Result<Url, ExtractError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| ExtractError::Validation(format!("malformed url {:?}: {}", raw, e)))?;

    if !["http", "https"].contains(&parsed.scheme()) {
        return Err(ExtractError::Validation(format!(
            "unsupported scheme {:?} in {}",
            parsed.scheme(),
            raw
        )));
    }
    if parsed.host().is_none() {
        return Err(ExtractError::Validation(format!("missing host in {}", raw)));
    }

    Ok(parsed)
}

/// Check if URL is safe to fetch (not localhost/private IP)
pub fn is_safe_url(url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };

    // Only allow http/https
    if !["http", "https"].contains(&parsed.scheme()) {
        return false;
    }

    match parsed.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.to_lowercase();
            domain != "localhost" && !domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => {
            !(ip.is_loopback()
                || ip.is_private()
                || ip.is_link_local()
                || ip.is_unspecified()
                || ip.is_broadcast())
        }
        Some(Host::Ipv6(ip)) => !(ip.is_loopback() || ip.is_unspecified()),
        None => false,
    }
}
