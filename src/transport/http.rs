// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers: the hardware button, photo upload, gallery, health, and
//! admin session-status endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::SessionError;
use crate::session::{ButtonOutcome, Inbound};
use crate::state::{epoch_ms, AppState};
use crate::transport::auth::resolve_user;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".to_owned(), timestamp: epoch_ms() })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonPressRequest {
    pub button_id: String,
    pub press_type: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonPressResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_to_gallery: Option<bool>,
}

/// `POST /api/hardware/button-press`
pub async fn button_press(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ButtonPressRequest>,
) -> impl IntoResponse {
    let user_id = match resolve_user(&headers, &state).await {
        Ok(id) => id,
        Err(code) => return code.to_http_response("invalid bearer token").into_response(),
    };

    let Some(session) = state.registry.find_by_user(&user_id).await else {
        // No live session for this user: a no-op success, per the device
        // endpoint's fire-and-forget contract.
        return Json(ButtonPressResponse { success: true, action: None, request_id: None, save_to_gallery: None })
            .into_response();
    };

    let (reply, rx) = oneshot::channel();
    session
        .send(Inbound::HardwareButtonPress {
            button_id: req.button_id,
            press_type: req.press_type,
            reply,
        })
        .await;

    let outcome = match rx.await {
        Ok(outcome) => outcome,
        Err(_) => return SessionError::InternalFault.to_http_response("session actor gone").into_response(),
    };

    let response = match outcome {
        ButtonOutcome::RoutedToApps => {
            ButtonPressResponse { success: true, action: None, request_id: None, save_to_gallery: None }
        }
        ButtonOutcome::DefaultPhoto { request_id } => ButtonPressResponse {
            success: true,
            action: Some("take_photo".to_owned()),
            request_id: Some(request_id),
            save_to_gallery: Some(true),
        },
        ButtonOutcome::NoAction => {
            ButtonPressResponse { success: true, action: None, request_id: None, save_to_gallery: None }
        }
    };
    Json(response).into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// `POST /api/upload-pov-photo` — multipart: `requestId`, `appId`,
/// `save_to_gallery`, `photo`. `save_to_gallery` here is informational only:
/// the authoritative flag was recorded on the `PhotoRequest` at allocation
/// time and the upload cannot override it.
pub async fn upload_pov_photo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let user_id = match resolve_user(&headers, &state).await {
        Ok(id) => id,
        Err(code) => return code.to_http_response("invalid bearer token").into_response(),
    };

    let mut request_id = None;
    let mut bytes = None;
    let mut content_type = "application/octet-stream".to_owned();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                return SessionError::ProtocolViolation
                    .to_http_response(format!("malformed multipart body: {e}"))
                    .into_response()
            }
        };

        match field.name() {
            Some("requestId") => {
                request_id = field.text().await.ok();
            }
            Some("photo") => {
                content_type = field.content_type().unwrap_or("application/octet-stream").to_owned();
                bytes = field.bytes().await.ok().map(|b| b.to_vec());
            }
            _ => {
                // appId / save_to_gallery and any other fields are accepted
                // but not trusted; drain them so the stream doesn't stall.
                let _ = field.bytes().await;
            }
        }
    }

    let Some(request_id) = request_id else {
        return SessionError::ProtocolViolation.to_http_response("missing requestId field").into_response();
    };
    let Some(bytes) = bytes else {
        return SessionError::ProtocolViolation.to_http_response("missing photo field").into_response();
    };

    let Some(session) = state.registry.find_by_user(&user_id).await else {
        return SessionError::UnknownSession.to_http_response("no live session for user").into_response();
    };

    match session.upload_photo(request_id, user_id, bytes, content_type).await {
        Ok(url) => Json(UploadResponse { success: true, photo_url: Some(url) }).into_response(),
        Err(code) => code.to_http_response(format!("{code} while matching upload to photo request")).into_response(),
    }
}

/// `GET /api/gallery`
pub async fn gallery(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let user_id = match resolve_user(&headers, &state).await {
        Ok(id) => id,
        Err(code) => return code.to_http_response("invalid bearer token").into_response(),
    };
    let entries = state.collaborators.gallery_store.list(&user_id).await;
    Json(entries).into_response()
}

/// `GET /api/session/{user_id}` — minimal read-only admin status endpoint,
/// gated by the operator bearer token rather than device identity.
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.find_by_user(&user_id).await {
        Some(session) => match session.get_status().await {
            Some(status) => Json(status).into_response(),
            None => SessionError::InternalFault.to_http_response("session actor gone").into_response(),
        },
        None => SessionError::UnknownSession.to_http_response("no session for user").into_response(),
    }
}
