//! Credentials attached to Cloud Translation requests.

use super::ProviderError;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};

use std::fmt;
use std::sync::Arc;

pub const TRANSLATION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-translation";

/// Supplies a bearer token per request. Implementations cache and refresh.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String, ProviderError>;
}

#[derive(Clone)]
pub enum CloudAuth {
    /// Sent as the `key` query parameter.
    ApiKey(String),
    /// Sent as `Authorization: Bearer ...`.
    Bearer(String),
    /// Bearer token fetched from `TokenSource` before each translation.
    Tokens(Arc<dyn TokenSource>),
}

impl CloudAuth {
    /// Token to send as `Authorization: Bearer`, if this auth uses one.
    pub(crate) async fn bearer(&self) -> Result<Option<String>, ProviderError> {
        match self {
            CloudAuth::ApiKey(_) => Ok(None),
            CloudAuth::Bearer(token) => Ok(Some(token.clone())),
            CloudAuth::Tokens(source) => source.token().await.map(Some),
        }
    }
}

impl fmt::Debug for CloudAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudAuth::ApiKey(_) => f.write_str("ApiKey(..)"),
            CloudAuth::Bearer(_) => f.write_str("Bearer(..)"),
            CloudAuth::Tokens(_) => f.write_str("Tokens(..)"),
        }
    }
}

impl PartialEq for CloudAuth {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CloudAuth::ApiKey(a), CloudAuth::ApiKey(b)) => a == b,
            (CloudAuth::Bearer(a), CloudAuth::Bearer(b)) => a == b,
            (CloudAuth::Tokens(a), CloudAuth::Tokens(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// OAuth tokens minted from a service-account key with the JWT bearer grant.
pub struct ServiceAccountTokens {
    account: CustomServiceAccount,
}

impl ServiceAccountTokens {
    pub fn from_json(key_json: &str) -> Result<Self, gcp_auth::Error> {
        Ok(Self {
            account: CustomServiceAccount::from_json(key_json)?,
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokens {
    async fn token(&self) -> Result<String, ProviderError> {
        let token = self
            .account
            .token(&[TRANSLATION_SCOPE])
            .await
            .map_err(|e| ProviderError::Auth(e.to_string()))?;
        Ok(token.as_str().to_string())
    }
}
