use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::AppError;
use crate::services::translate::TranslationService;

mod assets;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TranslationService>,
    pub public_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(service: TranslationService, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            service: Arc::new(service),
            public_dir: Arc::new(public_dir.into()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/translate", post(translate))
        .route("/api/history", get(list_history).delete(clear_history))
        .route("/", get(assets::index))
        .fallback(assets::static_file)
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct TranslateBody {
    #[serde(default)]
    text: Option<Value>,
}

/// `{success: true, ...payload}`
fn ok(payload: Value) -> Response {
    let mut body = json!({ "success": true });
    if let (Some(out), Value::Object(fields)) = (body.as_object_mut(), payload) {
        out.extend(fields);
    }
    Json(body).into_response()
}

fn err(error: AppError, storage_context: &str) -> Response {
    tracing::error!(status = error.status().as_u16(), error = %error, "request failed");
    error.into_response_with(storage_context)
}

fn parse_text(body: &[u8]) -> Result<String, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::text_required());
    }

    let req: TranslateBody =
        serde_json::from_slice(body).map_err(|e| AppError::invalid_body(e.to_string()))?;

    match req.text {
        Some(Value::String(s)) => Ok(s),
        _ => Err(AppError::text_required()),
    }
}

async fn translate(State(state): State<AppState>, body: Bytes) -> Response {
    let text = match parse_text(&body) {
        Ok(t) => t,
        Err(e) => return err(e, "Failed to save history"),
    };

    match state.service.translate(&text).await {
        Ok(t) => ok(json!({ "original": t.original, "translated": t.translated })),
        Err(e) => err(e, "Failed to save history"),
    }
}

async fn list_history(State(state): State<AppState>) -> Response {
    let history = state.service.history().await;
    ok(json!({ "history": history }))
}

async fn clear_history(State(state): State<AppState>) -> Response {
    match state.service.clear_history().await {
        Ok(()) => ok(json!({ "message": "History cleared" })),
        Err(e) => err(e, "Failed to clear history"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_accepts_string() {
        assert_eq!(parse_text(br#"{"text":"Hej"}"#).unwrap(), "Hej");
        // blank strings reach the service, which rejects them
        assert_eq!(parse_text(br#"{"text":"  "}"#).unwrap(), "  ");
    }

    #[test]
    fn test_parse_text_missing_or_wrong_type() {
        for body in [&b""[..], b"  ", b"{}", br#"{"text":null}"#, br#"{"text":42}"#] {
            let e = parse_text(body).unwrap_err();
            assert!(matches!(e, AppError::Validation { message, .. } if message == "Text is required"));
        }
    }

    #[test]
    fn test_parse_text_malformed_json() {
        let e = parse_text(b"{text: Hej").unwrap_err();
        assert!(matches!(e, AppError::Validation { message, details: Some(_) } if message == "Invalid request body"));
    }
}
