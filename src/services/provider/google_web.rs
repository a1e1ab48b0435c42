use super::{execute, ProviderError, RetryPolicy, TranslationProvider};
use crate::model::record::LanguagePair;

use async_trait::async_trait;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// Keyless client for the public web translation endpoint. Used when no cloud
/// credentials are configured.
pub struct GoogleWebProvider {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl GoogleWebProvider {
    pub fn new(retry: RetryPolicy, base_url: Option<&str>) -> Result<Self, ProviderError> {
        let base = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');

        Ok(Self {
            client: retry.client()?,
            endpoint: format!("{base}/translate_a/single"),
            retry,
        })
    }
}

#[async_trait]
impl TranslationProvider for GoogleWebProvider {
    fn name(&self) -> &'static str {
        "google-web"
    }

    async fn translate(&self, text: &str, pair: &LanguagePair) -> Result<String, ProviderError> {
        let build = || {
            self.client
                .get(&self.endpoint)
                .header("User-Agent", "Mozilla/5.0")
                .query(&[
                    ("client", "gtx"),
                    ("sl", pair.source.as_str()),
                    ("tl", pair.target.as_str()),
                    ("dt", "t"),
                    ("q", text),
                ])
        };

        execute(&self.retry, self.name(), build, parse_response).await
    }
}

/// The body is a nested array; the translation is the concatenation of the
/// first element of every segment in `[0]`.
fn parse_response(text: &str) -> Result<String, ProviderError> {
    let v: Value = serde_json::from_str(text)
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid JSON: {e}")))?;

    let segments = v
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| ProviderError::InvalidResponse("missing translation segments".into()))?;

    Ok(segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|t| t.as_str()))
        .collect())
}
