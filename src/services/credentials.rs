//! Provider credential discovery.
//!
//! Sources are checked in a fixed order and the first one present wins:
//! inline JSON, base64-encoded JSON, a path from the environment, and finally
//! `./google-credentials.json`.

use crate::services::provider::{CloudAuth, ServiceAccountTokens};

use base64::Engine;
use serde::Deserialize;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CREDENTIALS_JSON_VAR: &str = "GOOGLE_CREDENTIALS_JSON";
pub const CREDENTIALS_BASE64_VAR: &str = "GOOGLE_CREDENTIALS_BASE64";
pub const CREDENTIALS_PATH_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const LOCAL_CREDENTIALS_FILE: &str = "google-credentials.json";
const SERVICE_ACCOUNT_KIND: &str = "service_account";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    InlineJson,
    Base64Json,
    PathEnv(PathBuf),
    LocalFile(PathBuf),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::InlineJson => write!(f, "{CREDENTIALS_JSON_VAR}"),
            CredentialSource::Base64Json => write!(f, "{CREDENTIALS_BASE64_VAR}"),
            CredentialSource::PathEnv(p) => write!(f, "{CREDENTIALS_PATH_VAR} ({})", p.display()),
            CredentialSource::LocalFile(p) => write!(f, "local file {}", p.display()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("GOOGLE_CREDENTIALS_BASE64 is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("GOOGLE_CREDENTIALS_BASE64 does not decode to UTF-8 text")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to read credentials file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials from {origin} are not valid JSON: {source}")]
    Parse {
        origin: CredentialSource,
        #[source]
        source: serde_json::Error,
    },

    #[error("service account key from {origin} is unusable: {source}")]
    ServiceAccount {
        origin: CredentialSource,
        #[source]
        source: gcp_auth::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleCredentials {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub client_email: Option<String>,

    #[serde(default, alias = "key")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,
}

impl GoogleCredentials {
    pub fn is_service_account(&self) -> bool {
        self.kind.as_deref() == Some(SERVICE_ACCOUNT_KIND)
    }

    /// Static credentials carried by the document. API key wins over an
    /// access token when both are present.
    pub fn auth(&self) -> Option<CloudAuth> {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        non_empty(&self.api_key)
            .map(CloudAuth::ApiKey)
            .or_else(|| non_empty(&self.access_token).map(CloudAuth::Bearer))
    }
}

/// A parsed credentials document and where it came from.
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub source: CredentialSource,
    pub credentials: GoogleCredentials,
    raw: String,
}

impl ResolvedCredentials {
    pub fn from_json(source: CredentialSource, raw: String) -> Result<Self, CredentialsError> {
        let credentials = serde_json::from_str(&raw).map_err(|err| CredentialsError::Parse {
            origin: source.clone(),
            source: err,
        })?;

        Ok(Self {
            source,
            credentials,
            raw,
        })
    }

    /// Auth for the Cloud API. Static keys and tokens come first; a
    /// service-account key without either is exchanged for OAuth tokens.
    pub fn cloud_auth(&self) -> Result<Option<CloudAuth>, CredentialsError> {
        if let Some(auth) = self.credentials.auth() {
            return Ok(Some(auth));
        }
        if !self.credentials.is_service_account() {
            return Ok(None);
        }

        let tokens =
            ServiceAccountTokens::from_json(&self.raw).map_err(|err| CredentialsError::ServiceAccount {
                origin: self.source.clone(),
                source: err,
            })?;
        Ok(Some(CloudAuth::Tokens(Arc::new(tokens))))
    }
}

// the raw document may hold a private key
impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("source", &self.source)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

pub fn resolve() -> Result<Option<ResolvedCredentials>, CredentialsError> {
    resolve_with(|k| std::env::var(k).ok(), Path::new(LOCAL_CREDENTIALS_FILE))
}

pub fn resolve_with<F>(
    env: F,
    local_file: &Path,
) -> Result<Option<ResolvedCredentials>, CredentialsError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |k: &str| env(k).filter(|v| !v.trim().is_empty());

    let (source, raw) = if let Some(json) = var(CREDENTIALS_JSON_VAR) {
        (CredentialSource::InlineJson, json)
    } else if let Some(encoded) = var(CREDENTIALS_BASE64_VAR) {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        (CredentialSource::Base64Json, String::from_utf8(bytes)?)
    } else if let Some(path) = var(CREDENTIALS_PATH_VAR) {
        let path = PathBuf::from(path);
        let raw = read_file(&path)?;
        (CredentialSource::PathEnv(path), raw)
    } else if local_file.exists() {
        let raw = read_file(local_file)?;
        (CredentialSource::LocalFile(local_file.to_path_buf()), raw)
    } else {
        return Ok(None);
    };

    ResolvedCredentials::from_json(source, raw).map(Some)
}

fn read_file(path: &Path) -> Result<String, CredentialsError> {
    fs::read_to_string(path).map_err(|source| CredentialsError::Read {
        path: path.to_path_buf(),
        source,
    })
}
