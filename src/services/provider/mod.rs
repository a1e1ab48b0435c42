//! Translation providers.
//!
//! A provider turns source text into target text for a language pair. The
//! concrete clients share one retry loop: transient failures (transport errors,
//! 408/429/5xx, unparseable bodies) are retried with jittered exponential
//! backoff, everything else fails on the first attempt.

pub mod auth;
pub mod google_cloud;
pub mod google_web;

use crate::model::record::LanguagePair;

use async_trait::async_trait;
use rand::{thread_rng, Rng};
use reqwest::{RequestBuilder, StatusCode};

use std::time::Duration;

pub use auth::{CloudAuth, ServiceAccountTokens, TokenSource};
pub use google_cloud::GoogleCloudProvider;
pub use google_web::GoogleWebProvider;

pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const BASE_DELAY_MS: u64 = 800;
const MAX_JITTER_MS: u64 = 200;
const ERROR_SNIPPET_LEN: usize = 400;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider misconfigured: {0}")]
    Config(String),

    #[error("failed to obtain access token: {0}")]
    Auth(String),
}

impl ProviderError {
    fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(_) | ProviderError::InvalidResponse(_) => true,
            ProviderError::Status { status, .. } => StatusCode::from_u16(*status)
                .map(should_retry_http)
                .unwrap_or(false),
            ProviderError::Config(_) | ProviderError::Auth(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.to_string())
    }
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn translate(&self, text: &str, pair: &LanguagePair) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_retries: usize,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: usize) -> Duration {
        let jitter: u64 = thread_rng().gen_range(0..MAX_JITTER_MS);
        let factor = 2_u32.saturating_pow(attempt as u32);
        self.base_delay.saturating_mul(factor) + Duration::from_millis(jitter)
    }

    pub(crate) fn client(&self) -> Result<reqwest::Client, ProviderError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))
    }
}

/// Sends the request built by `build` until `parse` accepts a successful body
/// or the policy gives up.
pub(crate) async fn execute<B, P>(
    policy: &RetryPolicy,
    provider: &'static str,
    build: B,
    parse: P,
) -> Result<String, ProviderError>
where
    B: Fn() -> RequestBuilder,
    P: Fn(&str) -> Result<String, ProviderError>,
{
    let attempts = policy.max_retries.max(1);
    let mut attempt = 0;

    loop {
        let result = match build().send().await {
            Ok(resp) => {
                let status = resp.status();
                // body as text first so error messages survive a JSON failure
                match resp.text().await {
                    Ok(body) if status.is_success() => parse(&body),
                    Ok(body) => Err(ProviderError::Status {
                        status: status.as_u16(),
                        message: extract_error_message(&body),
                    }),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                tracing::warn!(provider, attempt = attempt + 1, error = %e, "translation attempt failed, retrying");
                tokio::time::sleep(policy.backoff(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Pulls `error.message` or `message` out of an error body, falling back to a
/// trimmed snippet of the raw text.
fn extract_error_message(body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body_text.trim();
    match trimmed.char_indices().nth(ERROR_SNIPPET_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
