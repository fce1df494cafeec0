//! Client for the text translation API.
//!
//! Speaks `POST {base}/translate/{style}` with a JSON `{"text": ...}` body
//! and returns the rewritten text. Any non-OK answer is an unavailability;
//! the caller decides whether that is fatal (the enrichment pipeline treats
//! it as best-effort and keeps the original text).

use std::time::Duration;

use anyhow::Context as _;
use futures_util::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pokedex_core::{RequestContext, ServiceError, ServiceResult, TranslationStyle, Translator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_IDLE_PER_HOST: usize = 100;

/// Client for the translation API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: Client,
    base_url: String,
}

impl TranslationClient {
    /// Creates a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Fails when `base_url` is empty or the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            anyhow::bail!("translation api base url is empty");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .build()
            .context("failed to build translation api client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn translate_text(
        &self,
        ctx: &RequestContext,
        style: TranslationStyle,
        text: &str,
    ) -> ServiceResult<String> {
        let url = format!("{}/translate/{}", self.base_url, style_slug(style));
        let body = TranslationRequest { text };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ServiceError::unavailable_with_source("translation api request failed", e)
            })?;

        if response.status() != StatusCode::OK {
            return Err(ServiceError::unavailable(format!(
                "translation api answered with status {}",
                response.status()
            )));
        }

        let payload: TranslationResponse = response.json().await.map_err(|e| {
            ServiceError::unavailable_with_source("translation api payload is malformed", e)
        })?;

        debug!(
            request_id = %ctx.request_id(),
            total = payload.success.total,
            "translated text"
        );

        Ok(payload.contents.translated)
    }
}

impl Translator for TranslationClient {
    fn translate<'a>(
        &'a self,
        ctx: &'a RequestContext,
        style: TranslationStyle,
        text: &'a str,
    ) -> BoxFuture<'a, ServiceResult<String>> {
        Box::pin(self.translate_text(ctx, style, text))
    }
}

/// Provider path segment for each rewrite style.
const fn style_slug(style: TranslationStyle) -> &'static str {
    match style {
        TranslationStyle::Yoda => "yodish",
        TranslationStyle::Shakespeare => "shakespeare-english",
    }
}

#[derive(Debug, Serialize)]
struct TranslationRequest<'a> {
    text: &'a str,
}

/// Wire shape of a successful translation reply. Only the fields the
/// service reads are decoded.
#[derive(Debug, Deserialize)]
struct TranslationResponse {
    #[serde(default)]
    success: SuccessInfo,
    contents: TranslationContents,
}

#[derive(Debug, Default, Deserialize)]
struct SuccessInfo {
    #[serde(default)]
    total: i64,
}

#[derive(Debug, Deserialize)]
struct TranslationContents {
    translated: String,
}
