// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud Session Core: the server-side runtime mediating between glasses
//! clients and third-party apps (TPAs) over two persistent duplex
//! transports. See `SPEC_FULL.md` for the full component design.

pub mod config;
pub mod error;
pub mod external;
pub mod media;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod state;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::SessionCoreConfig;
use crate::session::Inbound;
use crate::state::AppState;
use crate::transport::build_router;

/// Run the session core until a shutdown signal is received.
pub async fn run(config: SessionCoreConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let state = Arc::new(AppState::new(config, shutdown.clone()));
    tokio::spawn(shutdown_on_ctrl_c(Arc::clone(&state)));

    let router = build_router(Arc::clone(&state));
    let listener = TcpListener::bind(&addr).await?;
    info!("session core listening on {addr}");

    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}

/// Drain every live session with a `session_closing` notification before the
/// listener stops accepting new connections.
async fn shutdown_on_ctrl_c(state: Arc<AppState>) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("shutdown signal received, draining sessions");
    state
        .registry
        .broadcast(|| Inbound::Shutdown { reason: "server_shutdown".to_owned() })
        .await;
    state.shutdown.cancel();
}
