//! End-to-end tests: the real router on an ephemeral port, a mock provider
//! behind it, and a temporary history file.

use clap::Parser;
use serde_json::{json, Value};
use sv_translator::server::{build_router, select_provider};
use sv_translator::services::credentials::{CredentialSource, ResolvedCredentials};
use std::path::{Path, PathBuf};
use sv_translator::ServerConfig;
use tempfile::TempDir;
use tokio::net::TcpListener;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    base: String,
    client: reqwest::Client,
    dir: TempDir,
}

impl TestApp {
    async fn start(provider_uri: &str) -> Self {
        Self::start_with_history(provider_uri, |dir| dir.join("history.json")).await
    }

    async fn start_with_history(provider_uri: &str, history_in: impl FnOnce(&Path) -> PathBuf) -> Self {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir_all(&public).unwrap();
        std::fs::write(public.join("index.html"), "<h1>Svenska → English</h1>").unwrap();
        std::fs::write(public.join("app.js"), "console.log('hej');").unwrap();
        std::fs::write(public.join("my file.css"), "body { margin: 0; }").unwrap();

        let history = history_in(dir.path());
        let config = ServerConfig::try_parse_from([
            "sv-translator",
            "--history-file",
            history.to_str().unwrap(),
            "--public-dir",
            public.to_str().unwrap(),
            "--provider",
            "google-cloud",
            "--provider-base-url",
            provider_uri,
            "--provider-max-retries",
            "1",
        ])
        .unwrap();

        let creds = ResolvedCredentials::from_json(
            CredentialSource::InlineJson,
            r#"{"api_key":"test-key"}"#.to_string(),
        )
        .unwrap();
        let provider = select_provider(&config, Some(&creds)).unwrap();
        let app = build_router(&config, provider);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            dir,
        }
    }

    async fn translate(&self, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(format!("{}/api/translate", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn history(&self) -> Value {
        self.client
            .get(format!("{}/api/history", self.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

async fn mount_translation(server: &MockServer, q: &str, translated: &str) {
    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .and(body_partial_json(json!({ "q": q, "source": "sv", "target": "en" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "translations": [ { "translatedText": translated } ] }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn translate_returns_result_and_lists_it_first() {
    let provider = MockServer::start().await;
    mount_translation(&provider, "God morgon", "Good morning").await;
    mount_translation(&provider, "Hej, hur mår du?", "Hi, how are you?").await;
    let app = TestApp::start(&provider.uri()).await;

    app.translate(json!({ "text": "God morgon" })).await;
    let (status, body) = app.translate(json!({ "text": "Hej, hur mår du?" })).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "success": true, "original": "Hej, hur mår du?", "translated": "Hi, how are you?" })
    );

    let history = app.history().await;
    assert_eq!(history["success"], true);
    let entries = history["history"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["original"], "Hej, hur mår du?");
    assert_eq!(entries[0]["translated"], "Hi, how are you?");
    assert_eq!(entries[0]["from"], "sv");
    assert_eq!(entries[0]["to"], "en");
    assert!(entries[0]["id"].as_i64().unwrap() > entries[1]["id"].as_i64().unwrap());
    assert!(entries[0]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn blank_text_is_rejected_without_history() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;
    let app = TestApp::start(&provider.uri()).await;

    for body in [json!({ "text": "" }), json!({ "text": "   " }), json!({})] {
        let (status, resp) = app.translate(body).await;
        assert_eq!(status, 400);
        assert_eq!(resp["error"], "Text is required");
    }

    assert_eq!(app.history().await, json!({ "success": true, "history": [] }));
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let provider = MockServer::start().await;
    let app = TestApp::start(&provider.uri()).await;

    let resp = app
        .client
        .post(format!("{}/api/translate", app.base))
        .header("content-type", "application/json")
        .body("{text: ")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn provider_failure_is_a_server_error_without_history() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "User Rate Limit Exceeded" }
        })))
        .mount(&provider)
        .await;
    let app = TestApp::start(&provider.uri()).await;

    let (status, body) = app.translate(json!({ "text": "Hej" })).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Translation failed");
    assert!(body["details"].as_str().unwrap().contains("User Rate Limit Exceeded"));
    assert_eq!(app.history().await["history"], json!([]));
}

#[tokio::test]
async fn history_write_failure_is_a_server_error() {
    let provider = MockServer::start().await;
    mount_translation(&provider, "Hej", "Hello").await;
    // the history path is a non-empty directory, so the final rename fails
    let app = TestApp::start_with_history(&provider.uri(), |dir| {
        let blocked = dir.join("blocked");
        std::fs::create_dir_all(blocked.join("child")).unwrap();
        blocked
    })
    .await;

    let (status, body) = app.translate(json!({ "text": "Hej" })).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to save history");
    assert!(!body["details"].as_str().unwrap().is_empty());
    assert!(body.get("translated").is_none());
    assert_eq!(app.history().await, json!({ "success": true, "history": [] }));
}

#[tokio::test]
async fn history_keeps_the_latest_hundred() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "translations": [ { "translatedText": "ok" } ] }
        })))
        .mount(&provider)
        .await;
    let app = TestApp::start(&provider.uri()).await;

    for i in 1..=101 {
        let (status, _) = app.translate(json!({ "text": format!("mening {i}") })).await;
        assert_eq!(status, 200);
    }

    let history = app.history().await;
    let entries = history["history"].as_array().unwrap();
    assert_eq!(entries.len(), 100);
    assert_eq!(entries[0]["original"], "mening 101");
    assert_eq!(entries[99]["original"], "mening 2");
}

#[tokio::test]
async fn clear_history_is_idempotent() {
    let provider = MockServer::start().await;
    mount_translation(&provider, "Tack", "Thanks").await;
    let app = TestApp::start(&provider.uri()).await;
    app.translate(json!({ "text": "Tack" })).await;

    for _ in 0..2 {
        let resp = app
            .client
            .delete(format!("{}/api/history", app.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "success": true, "message": "History cleared" }));
    }

    assert_eq!(app.history().await, json!({ "success": true, "history": [] }));

    let raw = std::fs::read_to_string(app.dir.path().join("history.json")).unwrap();
    assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), json!([]));
}

#[tokio::test]
async fn serves_landing_page_and_assets() {
    let provider = MockServer::start().await;
    let app = TestApp::start(&provider.uri()).await;

    let resp = app.client.get(format!("{}/", app.base)).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(resp.text().await.unwrap().contains("Svenska"));

    let resp = app
        .client
        .get(format!("{}/app.js", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .client
        .get(format!("{}/my%20file.css", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "body { margin: 0; }");

    let resp = app
        .client
        .get(format!("{}/missing.css", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
