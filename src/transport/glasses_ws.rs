// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket upgrade and per-connection pump for the glasses duplex link.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::protocol::GlassesInbound;
use crate::session::{GlassesWireOut, Inbound};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct GlassesWsQuery {
    pub token: String,
}

/// `GET /ws/glasses?token=<bearer>` — the glasses token is verified against
/// the external token verifier, not the operator's HTTP bearer token.
pub async fn glasses_ws_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GlassesWsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let Some(user_id) = state.collaborators.token_verifier.verify_glasses_token(&query.token).await else {
        return (StatusCode::UNAUTHORIZED, "invalid glasses token").into_response();
    };

    ws.on_upgrade(move |socket| handle_glasses_ws(socket, state, user_id)).into_response()
}

async fn handle_glasses_ws(socket: WebSocket, state: Arc<AppState>, user_id: String) {
    let session = state
        .registry
        .attach_glasses(
            user_id,
            Arc::clone(&state.config),
            Arc::clone(&state.collaborators),
            state.dashboard_package.clone(),
        )
        .await;

    let (out_tx, mut out_rx) = mpsc::channel::<GlassesWireOut>(state.config.ws_send_high_water);
    session.send(Inbound::GlassesConnected { sink: out_tx }).await;

    let (mut ws_tx, mut ws_rx) = socket.split();
    let idle_timeout = state.config.idle_timeout();

    loop {
        tokio::select! {
            outbound = out_rx.recv() => {
                match outbound {
                    Some(GlassesWireOut::Text(msg)) => {
                        let Ok(text) = serde_json::to_string(&msg) else { continue };
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(GlassesWireOut::Binary(bytes)) => {
                        if ws_tx.send(Message::Binary(bytes)).await.is_err() {
                            break;
                        }
                    }
                    Some(GlassesWireOut::Close(reason)) => {
                        let _ = ws_tx.send(Message::Close(Some(axum::extract::ws::CloseFrame {
                            code: 1000,
                            reason: reason.into(),
                        }))).await;
                        break;
                    }
                    None => break,
                }
            }

            inbound = tokio::time::timeout(idle_timeout, ws_rx.next()) => {
                match inbound {
                    Ok(Some(Ok(Message::Text(text)))) => {
                        match serde_json::from_str::<GlassesInbound>(&text) {
                            Ok(msg) => session.send(Inbound::GlassesText(msg)).await,
                            Err(e) => tracing::warn!(session_id = session.session_id(), err = %e, "malformed glasses frame"),
                        }
                    }
                    Ok(Some(Ok(Message::Binary(bytes)))) => {
                        session.send(Inbound::GlassesBinary(bytes)).await;
                    }
                    Ok(Some(Ok(Message::Close(_)))) | Ok(None) => break,
                    Ok(Some(Err(_))) => break,
                    Ok(Some(Ok(_))) => {}
                    Err(_) => {
                        tracing::info!(session_id = session.session_id(), "glasses link idle timeout");
                        break;
                    }
                }
            }
        }
    }

    session.send(Inbound::GlassesDisconnected).await;
}
