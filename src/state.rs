// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide shared state handed to every HTTP and WebSocket handler.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::SessionCoreConfig;
use crate::external::Collaborators;
use crate::protocol::PackageName;
use crate::registry::SessionRegistry;

/// The well-known package name for the system dashboard TPA, the only writer
/// of dashboard mode and system sections.
pub const SYSTEM_DASHBOARD_PACKAGE: &str = "system.dashboard";

pub struct AppState {
    pub registry: SessionRegistry,
    pub config: Arc<SessionCoreConfig>,
    pub collaborators: Arc<Collaborators>,
    pub shutdown: CancellationToken,
    pub dashboard_package: PackageName,
}

impl AppState {
    pub fn new(config: SessionCoreConfig, shutdown: CancellationToken) -> Self {
        Self {
            registry: SessionRegistry::new(),
            config: Arc::new(config),
            collaborators: Arc::new(Collaborators::default()),
            shutdown,
            dashboard_package: SYSTEM_DASHBOARD_PACKAGE.to_owned(),
        }
    }
}

/// Current epoch millis, used for gallery entry timestamps.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
