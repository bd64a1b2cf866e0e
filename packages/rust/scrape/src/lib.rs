//! Scraping collaborator boundary: the DWDS dictionary client.
//!
//! The [`WordFetcher`] trait is the seam between the pipelines and the
//! dictionary website; [`DwdsClient`] is the HTTP implementation. Given a
//! canonicalized lemma it returns a structured set of optional fields
//! ([`DwdsEntry`]) or an explicit not-found — transient failures are retried
//! a bounded number of times and then surface as an `Err` that callers catch
//! and skip per word.

pub mod morph;
mod parse;

use std::future::Future;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use wortschatz_shared::{Result, ScrapeConfig, WortschatzError};

pub use parse::{ParseLimits, parse_entry};

/// User-Agent string for dictionary requests.
const USER_AGENT: &str = concat!("wortschatz/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// DwdsEntry
// ---------------------------------------------------------------------------

/// The structured fields extractable from one dictionary page. Every field
/// is optional on the page; absent sections yield empty values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DwdsEntry {
    /// Frequency indicator, rendered as `N out of M` dots.
    pub frequency: Option<String>,
    /// Etymology text, truncated for manageability.
    pub etymology: Option<String>,
    /// German example sentences.
    pub examples: Vec<String>,
    /// Compound words built from the lemma (Wortbildung).
    pub compounds: Vec<String>,
    /// Semantically related words (Bedeutungsverwandte Ausdrücke).
    pub related_words: Vec<String>,
    /// Word decomposition parts (Wortzerlegung), prefix/suffix-marked.
    pub composition: Vec<String>,
}

// ---------------------------------------------------------------------------
// WordFetcher
// ---------------------------------------------------------------------------

/// A handle to the dictionary service, injected into the pipelines so tests
/// substitute a stub.
pub trait WordFetcher: Send + Sync + 'static {
    /// Look up one word. `Ok(None)` is the explicit not-found signal;
    /// `Err` means the service stayed unreachable through the retry budget.
    fn fetch_entry(&self, word: &str) -> impl Future<Output = Result<Option<DwdsEntry>>> + Send;
}

// ---------------------------------------------------------------------------
// DwdsClient
// ---------------------------------------------------------------------------

/// HTTP client for DWDS word pages.
pub struct DwdsClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
    limits: ParseLimits,
}

impl DwdsClient {
    /// Create a client with the configured timeout and retry budget.
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| WortschatzError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            limits: ParseLimits::from(config),
        })
    }

    /// One fetch attempt. `Ok(None)` for HTTP 404, `Err` for anything else
    /// that went wrong.
    async fn try_fetch(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WortschatzError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(WortschatzError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WortschatzError::Network(format!("{url}: body read failed: {e}")))?;
        Ok(Some(body))
    }
}

impl WordFetcher for DwdsClient {
    async fn fetch_entry(&self, word: &str) -> Result<Option<DwdsEntry>> {
        let lemma = canonicalize_lemma(word);
        let url = format!("{}/{lemma}", self.base_url);

        for attempt in 1..=self.max_retries {
            match self.try_fetch(&url).await {
                Ok(Some(body)) => {
                    return Ok(Some(parse_entry(&body, &lemma, &self.limits)));
                }
                Ok(None) => {
                    debug!(%lemma, "no dictionary entry");
                    return Ok(None);
                }
                Err(e) => {
                    warn!(%lemma, attempt, max = self.max_retries, error = %e, "page fetch failed");
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(WortschatzError::Network(format!(
            "{url}: unreachable after {} attempts",
            self.max_retries
        )))
    }
}

// ---------------------------------------------------------------------------
// Lemma canonicalization
// ---------------------------------------------------------------------------

/// Canonicalize a lemma for lookup: undo URL-style escaping, drop the
/// `#1`/`#2` homonym markers, and strip a trailing article.
pub fn canonicalize_lemma(lemma: &str) -> String {
    let decoded = percent_decode_str(lemma).decode_utf8_lossy();

    let homonym = Regex::new(r"#\d+$").unwrap();
    let word = homonym.replace(decoded.trim(), "");

    let article = Regex::new(r",\s*(der|die|das)$").unwrap();
    article.replace(&word, "").trim().to_string()
}
