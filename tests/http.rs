// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the session core's HTTP surface.
//!
//! Uses `axum_test::TestServer` — no real TCP needed.

use std::sync::Arc;

use axum_test::TestServer;
use tokio_util::sync::CancellationToken;

use sessioncore::config::SessionCoreConfig;
use sessioncore::state::AppState;
use sessioncore::transport::build_router;

fn test_config() -> SessionCoreConfig {
    SessionCoreConfig { auth_token: None, ..SessionCoreConfig::default() }
}

fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(test_config(), CancellationToken::new()))
}

fn test_server_for(state: Arc<AppState>) -> TestServer {
    let router = build_router(state);
    TestServer::new(router).expect("failed to create test server")
}

fn test_server() -> TestServer {
    test_server_for(test_state())
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let server = test_server();
    let resp = server.get("/health").await;
    resp.assert_status_ok();

    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_u64().unwrap() > 0);
    Ok(())
}

#[tokio::test]
async fn button_press_without_live_session_is_noop_success() -> anyhow::Result<()> {
    let server = test_server();
    let resp = server
        .post("/api/hardware/button-press")
        .add_header("authorization", "Bearer devtoken")
        .json(&serde_json::json!({ "buttonId": "photo", "pressType": "short", "deviceId": "d1" }))
        .await;
    resp.assert_status_ok();

    let body: serde_json::Value = resp.json();
    assert_eq!(body["success"], true);
    assert!(body.get("action").is_none());
    Ok(())
}

#[tokio::test]
async fn button_press_without_bearer_token_is_rejected() -> anyhow::Result<()> {
    let server = test_server();
    let resp = server
        .post("/api/hardware/button-press")
        .json(&serde_json::json!({ "buttonId": "photo", "pressType": "short" }))
        .await;
    resp.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn gallery_is_empty_for_unseen_user() -> anyhow::Result<()> {
    let server = test_server();
    let resp = server.get("/api/gallery").add_header("authorization", "Bearer abc123").await;
    resp.assert_status_ok();

    let body: serde_json::Value = resp.json();
    assert_eq!(body.as_array().unwrap().len(), 0);
    Ok(())
}

#[tokio::test]
async fn upload_for_unknown_request_id_is_rejected() -> anyhow::Result<()> {
    let state = test_state();
    // A live session for "user:abc123" (DevTokenVerifier derives the user id
    // from the bearer token), but no PhotoRequest was ever allocated on it.
    state
        .registry
        .attach_glasses(
            "user:abc123".to_owned(),
            Arc::clone(&state.config),
            Arc::clone(&state.collaborators),
            state.dashboard_package.clone(),
        )
        .await;

    let server = test_server_for(state);
    let resp = server
        .post("/api/upload-pov-photo")
        .add_header("authorization", "Bearer abc123")
        .multipart(
            axum_test::multipart::MultipartForm::new()
                .add_text("requestId", "not-a-real-request")
                .add_part(
                    "photo",
                    axum_test::multipart::Part::bytes(b"fake-jpeg-bytes".to_vec())
                        .file_name("photo.jpg")
                        .mime_type("image/jpeg"),
                ),
        )
        .await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn session_status_for_unknown_user_is_not_found() -> anyhow::Result<()> {
    let server = test_server();
    let resp = server.get("/api/session/no-such-user").await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
    Ok(())
}
