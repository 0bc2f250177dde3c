//! Integration tests for the gaia-chat-web server.
//!
//! These tests start a real axum server on a random port, backed by an
//! in-process agent, and exercise the REST endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use gaia_chat::prelude::*;
use gaia_chat_web::{SharedHistory, WebConfig, spawn_web};
use reqwest::multipart::{Form, Part};
use tempfile::TempDir;

struct TestServer {
    base: String,
    history: SharedHistory,
    uploads: TempDir,
    exports: TempDir,
}

/// Helper: spawn a test server on port 0 (random available port).
async fn spawn_test_server(agent: FnAgent) -> TestServer {
    let uploads = tempfile::tempdir().unwrap();
    let exports = tempfile::tempdir().unwrap();
    let session = Arc::new(ChatSession::new(Arc::new(agent), exports.path()));

    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        upload_dir: uploads.path().to_path_buf(),
        ..Default::default()
    };

    let (addr, history) = spawn_web(session, config).await.unwrap();
    TestServer {
        base: format!("http://{addr}"),
        history,
        uploads,
        exports,
    }
}

fn arithmetic_agent() -> FnAgent {
    FnAgent::answering(|prompt| match prompt {
        "2+2?" => Ok("Assistant: 4".to_string()),
        other => Ok(format!("Assistant: received {} chars", other.len())),
    })
}

/// Echoes the prompt back, so tests can see exactly what the agent received.
fn echo_agent() -> FnAgent {
    FnAgent::answering(|prompt| Ok(prompt.to_string()))
}

async fn ask_json(base: &str, question: &str, files: Vec<PathBuf>) -> serde_json::Value {
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/ask/json"))
        .json(&serde_json::json!({ "question": question, "files": files }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

// ── History ──────────────────────────────────────────────────────────

#[tokio::test]
async fn history_starts_empty() {
    let server = spawn_test_server(arithmetic_agent()).await;

    let resp = reqwest::get(format!("{}/api/history", server.base)).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json, serde_json::json!([]));
}

// ── Ask ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn ask_json_appends_turn_and_clears_input() {
    let server = spawn_test_server(arithmetic_agent()).await;

    let json = ask_json(&server.base, "2+2?", vec![]).await;
    assert_eq!(json["question"], "");
    assert_eq!(
        json["history"],
        serde_json::json!([{ "request": "2+2?", "response": "4" }])
    );

    // The shared history reflects the same turn.
    let history = server.history.lock().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history.last().unwrap().response, "4");
}

#[tokio::test]
async fn turns_accumulate_in_submission_order() {
    let server = spawn_test_server(echo_agent()).await;

    ask_json(&server.base, "first", vec![]).await;
    let json = ask_json(&server.base, "second", vec![]).await;

    let turns = json["history"].as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["request"], "first");
    assert_eq!(turns[1]["request"], "second");
}

#[tokio::test]
async fn agent_failure_is_recorded_as_error_turn() {
    let agent = FnAgent::answering(|_| Err("model unavailable".to_string()));
    let server = spawn_test_server(agent).await;

    let json = ask_json(&server.base, "hello", vec![]).await;
    let turns = json["history"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["request"], "hello");
    let response = turns[0]["response"].as_str().unwrap();
    assert!(response.starts_with("Error processing question"));
    assert!(response.contains("model unavailable"));
}

#[tokio::test]
async fn empty_submission_adds_no_turn() {
    let server = spawn_test_server(arithmetic_agent()).await;

    let json = ask_json(&server.base, "   ", vec![]).await;
    assert_eq!(json["question"], "");
    assert_eq!(json["history"], serde_json::json!([]));
}

#[tokio::test]
async fn ask_json_reads_server_side_files() {
    let server = spawn_test_server(echo_agent()).await;
    let notes = server.uploads.path().join("notes.md");
    std::fs::write(&notes, "# Notes\nhello").unwrap();

    let json = ask_json(&server.base, "Summarize", vec![notes]).await;
    assert_eq!(
        json["history"][0]["request"],
        "Summarize\n\n[UPLOADED TEXT FILE: notes.md]\nContent:\n# Notes\nhello"
    );
}

#[tokio::test]
async fn multipart_csv_upload_is_referenced_by_path() {
    let server = spawn_test_server(echo_agent()).await;

    let form = Form::new().text("question", "").part(
        "files",
        Part::bytes(b"a,b\n1,2\n".to_vec()).file_name("a.csv"),
    );
    let resp = reqwest::Client::new()
        .post(format!("{}/api/ask", server.base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    let request = json["history"][0]["request"].as_str().unwrap();
    assert!(request.starts_with("[UPLOADED CSV FILE: a.csv] - File path:"));
    assert!(request.ends_with("a.csv"));
}

#[tokio::test]
async fn multipart_text_upload_is_inlined() {
    let server = spawn_test_server(echo_agent()).await;

    let form = Form::new()
        .text("question", "What does this say?")
        .part("files", Part::text("hello world").file_name("greeting.txt"));
    let resp = reqwest::Client::new()
        .post(format!("{}/api/ask", server.base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        json["history"][0]["request"],
        "What does this say?\n\n[UPLOADED TEXT FILE: greeting.txt]\nContent:\nhello world"
    );
}

#[tokio::test]
async fn multipart_uploads_are_removed_after_processing() {
    let server = spawn_test_server(echo_agent()).await;

    let form = Form::new().part("files", Part::text("x").file_name("x.txt"));
    reqwest::Client::new()
        .post(format!("{}/api/ask", server.base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    let leftover = std::fs::read_dir(server.uploads.path()).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn ask_json_rejects_files_outside_upload_dir() {
    let server = spawn_test_server(echo_agent()).await;
    let elsewhere = tempfile::tempdir().unwrap();
    let secret = elsewhere.path().join("credentials.json");
    std::fs::write(&secret, r#"{"token":"TOPSECRET"}"#).unwrap();

    let resp = reqwest::Client::new()
        .post(format!("{}/api/ask/json", server.base))
        .json(&serde_json::json!({ "question": "", "files": [secret] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert!(!resp.text().await.unwrap().contains("TOPSECRET"));
    assert!(server.history.lock().await.is_empty());
}

#[tokio::test]
async fn truncated_multipart_leaves_no_uploads_behind() {
    let server = spawn_test_server(echo_agent()).await;

    // One complete file part, then a second part cut off before its boundary.
    let body = "--XBOUNDARY\r\n\
                Content-Disposition: form-data; name=\"files\"; filename=\"a.txt\"\r\n\r\n\
                hello\r\n\
                --XBOUNDARY\r\n\
                Content-Disposition: form-data; name=\"files\"; filename=\"b.txt\"\r\n\r\n\
                partial";
    let resp = reqwest::Client::new()
        .post(format!("{}/api/ask", server.base))
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let leftover = std::fs::read_dir(server.uploads.path()).unwrap().count();
    assert_eq!(leftover, 0);
    assert!(server.history.lock().await.is_empty());
}

// ── Clear / export ───────────────────────────────────────────────────

#[tokio::test]
async fn clear_empties_history() {
    let server = spawn_test_server(arithmetic_agent()).await;
    ask_json(&server.base, "2+2?", vec![]).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/clear", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json, serde_json::json!([]));

    assert!(server.history.lock().await.is_empty());
}

#[tokio::test]
async fn export_writes_markdown_file() {
    let server = spawn_test_server(arithmetic_agent()).await;
    ask_json(&server.base, "2+2?", vec![]).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/export", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    let path = PathBuf::from(json["path"].as_str().unwrap());
    assert!(path.starts_with(server.exports.path()));
    assert_eq!(path.extension().unwrap(), "md");

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("**User:**\n\n2+2?"));
    assert!(content.contains("**Assistant:**\n\n4"));
}

// ── Static surface ───────────────────────────────────────────────────

#[tokio::test]
async fn info_lists_extensions_and_examples() {
    let server = spawn_test_server(arithmetic_agent()).await;

    let json: serde_json::Value = reqwest::get(format!("{}/api/info", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["title"], "GAIA Agent - Q&A Chatbot");
    let extensions = json["supported_extensions"].as_array().unwrap();
    assert!(extensions.contains(&serde_json::json!(".csv")));
    assert!(extensions.contains(&serde_json::json!(".png")));
    assert_eq!(json["examples"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn cross_origin_requests_get_no_cors_headers_by_default() {
    let server = spawn_test_server(arithmetic_agent()).await;

    let resp = reqwest::Client::new()
        .get(format!("{}/api/history", server.base))
        .header("origin", "https://evil.example")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn index_page_is_served() {
    let server = spawn_test_server(arithmetic_agent()).await;

    let resp = reqwest::get(format!("{}/", server.base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("/api/ask"));
}
