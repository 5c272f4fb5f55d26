// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the cloud session core.

pub mod auth;
pub mod glasses_ws;
pub mod http;
pub mod tpa_ws;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum `Router` with every route this core serves.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::health))
        .route("/api/hardware/button-press", post(http::button_press))
        .route("/api/upload-pov-photo", post(http::upload_pov_photo))
        .route("/api/gallery", get(http::gallery))
        .route("/api/session/{user_id}", get(http::session_status))
        .route("/ws/glasses", get(glasses_ws::glasses_ws_handler))
        .route("/ws/tpa", get(tpa_ws::tpa_ws_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
