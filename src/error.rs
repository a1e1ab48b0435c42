use crate::services::history::StoreError;
use crate::services::provider::ProviderError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const ERR_TEXT_REQUIRED: &str = "Text is required";
pub const ERR_INVALID_BODY: &str = "Invalid request body";
pub const ERR_TRANSLATION_FAILED: &str = "Translation failed";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: &'static str,
        details: Option<String>,
    },

    #[error("translation failed: {0}")]
    Translation(#[from] ProviderError),

    #[error("history storage failed: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn text_required() -> Self {
        AppError::Validation {
            message: ERR_TEXT_REQUIRED,
            details: None,
        }
    }

    pub fn invalid_body(details: impl Into<String>) -> Self {
        AppError::Validation {
            message: ERR_INVALID_BODY,
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Translation(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders `{error, details?}`. `storage_context` is the user-facing label
    /// for storage failures, which depends on the operation that hit them.
    pub fn into_response_with(self, storage_context: &str) -> Response {
        let status = self.status();

        let (error, details) = match &self {
            AppError::Validation { message, details } => (message.to_string(), details.clone()),
            AppError::Translation(e) => (ERR_TRANSLATION_FAILED.to_string(), Some(e.to_string())),
            AppError::Storage(e) => (storage_context.to_string(), Some(e.to_string())),
        };

        let body = match details {
            Some(details) => json!({ "error": error, "details": details }),
            None => json!({ "error": error }),
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with("History storage failed")
    }
}

pub type AppResult<T> = Result<T, AppError>;
