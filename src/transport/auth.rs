// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::SessionError;
use crate::protocol::UserId;
use crate::state::AppState;

/// Constant-time string comparison to prevent timing side-channel attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization")?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Validate the operator bearer token, if the core is configured to require one.
pub fn validate_bearer(headers: &HeaderMap, expected: Option<&str>) -> Result<(), SessionError> {
    let expected = match expected {
        Some(tok) => tok,
        None => return Ok(()),
    };

    let token = bearer_token(headers).ok_or(SessionError::AuthFailed)?;
    if constant_time_eq(token, expected) {
        Ok(())
    } else {
        Err(SessionError::AuthFailed)
    }
}

/// Resolve the glasses-device bearer token on an HTTP request to a user
/// identity via the external token verifier. Distinct from `validate_bearer`,
/// which only gates the operator-wide admin token.
pub async fn resolve_user(headers: &HeaderMap, state: &AppState) -> Result<UserId, SessionError> {
    let token = bearer_token(headers).ok_or(SessionError::AuthFailed)?;
    state.collaborators.token_verifier.verify_glasses_token(token).await.ok_or(SessionError::AuthFailed)
}

/// Axum middleware that enforces the operator bearer token, when configured.
///
/// Exempt: `/health`, the two WebSocket upgrade paths (`/ws/`), and the
/// device-facing HTTP endpoints that resolve their own caller identity via
/// [`resolve_user`] against the glasses bearer token instead.
pub async fn auth_layer(
    state: State<Arc<AppState>>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if path == "/health"
        || path.starts_with("/ws/")
        || path == "/api/hardware/button-press"
        || path == "/api/upload-pov-photo"
        || path == "/api/gallery"
    {
        return next.run(req).await;
    }

    if let Err(code) = validate_bearer(req.headers(), state.config.auth_token.as_deref()) {
        let body = crate::error::ErrorResponse { error: code.to_error_body("unauthorized") };
        return (
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::UNAUTHORIZED),
            axum::Json(body),
        )
            .into_response();
    }

    next.run(req).await
}
