use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::AppState;

pub async fn index(State(state): State<AppState>) -> Response {
    serve(&state.public_dir.join("index.html")).await
}

pub async fn static_file(State(state): State<AppState>, uri: Uri) -> Response {
    match safe_join(&state.public_dir, uri.path()) {
        Some(path) => serve(&path).await,
        None => not_found(),
    }
}

/// Percent-decodes a request path and joins it onto `base`, refusing anything
/// but plain file names.
fn safe_join(base: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;
    if decoded.contains('\0') {
        return None;
    }

    let rel = Path::new(decoded.trim_start_matches('/'));
    if rel.as_os_str().is_empty() {
        return None;
    }

    let mut out = base.to_path_buf();
    for c in rel.components() {
        match c {
            Component::Normal(part) => out.push(part),
            _ => return None,
        }
    }
    Some(out)
}

async fn serve(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(path))], bytes).into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => not_found(),
        Err(e) => {
            if path.is_dir() {
                return not_found();
            }
            tracing::warn!(path = %path.display(), error = %e, "failed to read static file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
