use crate::config::{ProviderKind, ServerConfig};
use crate::protocol::{self, AppState};
use crate::services::credentials::{self, ResolvedCredentials};
use crate::services::history::HistoryStore;
use crate::services::provider::{GoogleCloudProvider, GoogleWebProvider, TranslationProvider};
use crate::services::translate::TranslationService;

use anyhow::{bail, Context, Result};
use axum::Router;
use tokio::net::TcpListener;

use std::sync::Arc;

/// Picks the provider for `kind`. `auto` falls back to the keyless web
/// endpoint when no usable credentials were found; an explicit
/// `google-cloud` fails instead.
pub fn select_provider(
    config: &ServerConfig,
    creds: Option<&ResolvedCredentials>,
) -> Result<Arc<dyn TranslationProvider>> {
    let retry = config.retry_policy();
    let base_url = config.provider_base_url.as_deref();
    let creds = creds.filter(|_| config.provider != ProviderKind::GoogleWeb);
    let auth = match creds.map(ResolvedCredentials::cloud_auth).transpose() {
        Ok(auth) => auth.flatten(),
        Err(e) if config.provider == ProviderKind::Auto => {
            tracing::warn!(error = %e, "ignoring unusable Google credentials");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let provider: Arc<dyn TranslationProvider> = match (config.provider, auth) {
        (ProviderKind::GoogleWeb, _) => Arc::new(GoogleWebProvider::new(retry, base_url)?),
        (ProviderKind::GoogleCloud | ProviderKind::Auto, Some(auth)) => {
            Arc::new(GoogleCloudProvider::new(auth, retry, base_url)?)
        }
        (ProviderKind::GoogleCloud, None) => {
            bail!("google-cloud provider selected but no api_key, access_token or service account key was found")
        }
        (ProviderKind::Auto, None) => {
            tracing::warn!("no usable Google credentials configured, using the public web endpoint");
            Arc::new(GoogleWebProvider::new(retry, base_url)?)
        }
    };

    Ok(provider)
}

fn load_credentials() -> Option<ResolvedCredentials> {
    match credentials::resolve() {
        Ok(Some(resolved)) => {
            tracing::info!(
                source = %resolved.source,
                kind = resolved.credentials.kind.as_deref().unwrap_or("unknown"),
                project = resolved.credentials.project_id.as_deref().unwrap_or("-"),
                "Google credentials configured"
            );
            Some(resolved)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::error!(error = %e, "failed to load Google credentials");
            None
        }
    }
}

pub fn build_router(config: &ServerConfig, provider: Arc<dyn TranslationProvider>) -> Router {
    let store = Arc::new(HistoryStore::new(&config.history_file, config.history_limit));
    let service = TranslationService::new(provider, store);
    tracing::debug!(
        provider = service.provider_name(),
        history_file = %service.history_path().display(),
        "translation service built"
    );

    protocol::router(AppState::new(service, &config.public_dir))
}

pub async fn run(config: ServerConfig) -> Result<()> {
    let creds = load_credentials();
    let provider = select_provider(&config, creds.as_ref())?;
    tracing::info!(provider = provider.name(), "translation provider ready");

    let app = build_router(&config, provider);

    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        history_file = %config.history_file.display(),
        limit = config.history_limit,
        "Swedish-English Translator running on http://{}",
        addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}
