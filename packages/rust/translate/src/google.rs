//! HTTP translation client against a Google-Translate-style endpoint.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use wortschatz_shared::{Result, TranslationConfig, WortschatzError};

use crate::Translator;

/// User-Agent string for translation requests.
const USER_AGENT: &str = concat!("wortschatz/", env!("CARGO_PKG_VERSION"));

/// Translator backed by the public `translate_a/single` endpoint.
///
/// The endpoint URL comes from config so tests can point it at a mock
/// server. The response is a nested JSON array whose first element lists
/// translated segments; segments are concatenated in order.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    source_lang: String,
    target_lang: String,
}

impl GoogleTranslator {
    /// Build a client with the configured per-attempt timeout.
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| WortschatzError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
        })
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| WortschatzError::Network(format!("translate request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WortschatzError::Network(format!("translate: HTTP {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| WortschatzError::parse(format!("translate response body: {e}")))?;

        parse_translation(&payload)
    }
}

/// Extract the translated text from the endpoint's nested-array payload:
/// `[[["<translated>", "<source>", …], …], …]`.
fn parse_translation(payload: &Value) -> Result<String> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| WortschatzError::parse("unexpected translation payload shape"))?;

    let mut out = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            out.push_str(part);
        }
    }

    if out.is_empty() {
        Err(WortschatzError::parse("translation payload had no segments"))
    } else {
        Ok(out)
    }
}
