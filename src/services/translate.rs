use crate::error::{AppError, AppResult};
use crate::model::record::{LanguagePair, TranslationRecord};
use crate::services::history::HistoryStore;
use crate::services::provider::TranslationProvider;

use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Translation {
    pub original: String,
    pub translated: String,
}

/// Maps a translation request onto a provider call and a history entry.
pub struct TranslationService {
    provider: Arc<dyn TranslationProvider>,
    store: Arc<HistoryStore>,
    pair: LanguagePair,
}

impl TranslationService {
    pub fn new(provider: Arc<dyn TranslationProvider>, store: Arc<HistoryStore>) -> Self {
        Self {
            provider,
            store,
            pair: LanguagePair::default(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn history_path(&self) -> &std::path::Path {
        self.store.path()
    }

    /// The history entry is only written after the provider succeeded.
    pub async fn translate(&self, text: &str) -> AppResult<Translation> {
        if text.trim().is_empty() {
            return Err(AppError::text_required());
        }

        let translated = self.provider.translate(text, &self.pair).await?;
        if translated.is_empty() {
            tracing::warn!(provider = self.provider.name(), "provider returned an empty translation");
        }

        let record = TranslationRecord::new(text.to_string(), translated.clone(), &self.pair);
        let log = self.store.record(record).await?;

        if let Some(head) = log.first() {
            tracing::info!(id = head.id, history_len = log.len(), "translation recorded");
        }

        Ok(Translation {
            original: text.to_string(),
            translated,
        })
    }

    pub async fn history(&self) -> Vec<TranslationRecord> {
        self.store.load().await
    }

    pub async fn clear_history(&self) -> AppResult<()> {
        self.store.clear().await?;
        tracing::info!("history cleared");
        Ok(())
    }
}
