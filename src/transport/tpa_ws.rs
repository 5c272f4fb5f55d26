// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket upgrade and per-connection pump for the TPA duplex link. A TPA
//! presents its `sessionId` and `apiKey` in its first frame rather than a
//! query-string token, so the upgrade itself is unauthenticated and
//! identity is resolved once the first frame arrives.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::protocol::{TpaInbound, TpaOutbound};
use crate::session::Inbound;
use crate::state::AppState;

/// `GET /ws/tpa`
pub async fn tpa_ws_handler(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_tpa_ws(socket, state)).into_response()
}

async fn handle_tpa_ws(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let Some((package, session)) = await_connection_init(&state, &mut ws_tx, &mut ws_rx).await else {
        return;
    };

    let (out_tx, mut out_rx) = mpsc::channel::<TpaOutbound>(state.config.ws_send_high_water);
    session.send(Inbound::TpaConnected { package: package.clone(), sink: out_tx }).await;

    let idle_timeout = state.config.idle_timeout();

    loop {
        tokio::select! {
            outbound = out_rx.recv() => {
                match outbound {
                    Some(msg) => {
                        let Ok(text) = serde_json::to_string(&msg) else { continue };
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            inbound = tokio::time::timeout(idle_timeout, ws_rx.next()) => {
                match inbound {
                    Ok(Some(Ok(Message::Text(text)))) => {
                        match serde_json::from_str::<TpaInbound>(&text) {
                            Ok(msg) => session.send(Inbound::TpaText { package: package.clone(), msg }).await,
                            Err(e) => tracing::warn!(package, err = %e, "malformed tpa frame"),
                        }
                    }
                    Ok(Some(Ok(Message::Close(_)))) | Ok(None) => break,
                    Ok(Some(Err(_))) => break,
                    Ok(Some(Ok(_))) => {}
                    Err(_) => {
                        tracing::info!(package, "tpa link idle timeout");
                        break;
                    }
                }
            }
        }
    }

    session.send(Inbound::TpaDisconnected { package }).await;
}

/// Wait for the mandatory `tpa_connection_init` frame, validate the API key,
/// and resolve the target session by id. Closes the link on any failure.
async fn await_connection_init(
    state: &Arc<AppState>,
    ws_tx: &mut SplitSink<WebSocket, Message>,
    ws_rx: &mut SplitStream<WebSocket>,
) -> Option<(String, crate::session::SessionHandle)> {
    let frame = match ws_rx.next().await {
        Some(Ok(Message::Text(text))) => text,
        _ => return None,
    };

    let Ok(TpaInbound::TpaConnectionInit { package_name, api_key, session_id }) =
        serde_json::from_str::<TpaInbound>(&frame)
    else {
        let _ = ws_tx.send(Message::Close(None)).await;
        return None;
    };

    if !state.collaborators.token_verifier.verify_tpa_api_key(&package_name, &api_key).await {
        let _ = ws_tx.send(Message::Close(None)).await;
        return None;
    }

    let Some(session) = state.registry.find_by_session(&session_id).await else {
        let _ = ws_tx.send(Message::Close(None)).await;
        return None;
    };

    if !state.collaborators.install_state.is_installed(session.user_id(), &package_name).await {
        let _ = ws_tx.send(Message::Close(None)).await;
        return None;
    }

    Some((package_name, session))
}
