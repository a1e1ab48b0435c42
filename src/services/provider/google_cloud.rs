use super::{execute, CloudAuth, ProviderError, RetryPolicy, TranslationProvider};
use crate::model::record::LanguagePair;

use async_trait::async_trait;
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://translation.googleapis.com";

/// Cloud Translation v2 REST client.
pub struct GoogleCloudProvider {
    client: reqwest::Client,
    endpoint: String,
    auth: CloudAuth,
    retry: RetryPolicy,
}

impl GoogleCloudProvider {
    pub fn new(
        auth: CloudAuth,
        retry: RetryPolicy,
        base_url: Option<&str>,
    ) -> Result<Self, ProviderError> {
        let base = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');

        Ok(Self {
            client: retry.client()?,
            endpoint: format!("{base}/language/translate/v2"),
            auth,
            retry,
        })
    }
}

#[async_trait]
impl TranslationProvider for GoogleCloudProvider {
    fn name(&self) -> &'static str {
        "google-cloud"
    }

    async fn translate(&self, text: &str, pair: &LanguagePair) -> Result<String, ProviderError> {
        let body = json!({
            "q": text,
            "source": pair.source,
            "target": pair.target,
            "format": "text"
        });

        let bearer = self.auth.bearer().await?;

        let build = || {
            let req = self.client.post(&self.endpoint).json(&body);
            match (&self.auth, &bearer) {
                (CloudAuth::ApiKey(key), _) => req.query(&[("key", key.as_str())]),
                (_, Some(token)) => req.bearer_auth(token),
                (_, None) => req,
            }
        };

        execute(&self.retry, self.name(), build, parse_response).await
    }
}

fn parse_response(text: &str) -> Result<String, ProviderError> {
    let v: Value = serde_json::from_str(text)
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid JSON: {e}")))?;

    v.get("data")
        .and_then(|d| d.get("translations"))
        .and_then(|t| t.get(0))
        .and_then(|t| t.get("translatedText"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::InvalidResponse("missing data.translations[0].translatedText".into())
        })
}
