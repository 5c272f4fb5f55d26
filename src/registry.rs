// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide mapping from user identity to the live `UserSession` actor.
//! Reads (`find`) are expected to be frequent; writes (create, reconnect,
//! destroy) rare. A session is looked up either by user id (glasses side,
//! resolved from a bearer token) or by session id (TPA side, which is handed
//! the session id out of band and never sees the user's token).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::info;

use crate::config::SessionCoreConfig;
use crate::external::Collaborators;
use crate::protocol::UserId;
use crate::session::{Inbound, SessionHandle, UserSessionActor};

#[derive(Clone)]
struct Entry {
    handle: SessionHandle,
    user_id: UserId,
}

#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    by_user: HashMap<UserId, String>,
    by_session: HashMap<String, Entry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(Inner::default())) }
    }

    /// Look up the live session for a user, by user identity.
    pub async fn find_by_user(&self, user_id: &str) -> Option<SessionHandle> {
        let inner = self.inner.read().await;
        let session_id = inner.by_user.get(user_id)?;
        inner.by_session.get(session_id).map(|e| e.handle.clone())
    }

    pub async fn find_by_session(&self, session_id: &str) -> Option<SessionHandle> {
        let inner = self.inner.read().await;
        inner.by_session.get(session_id).map(|e| e.handle.clone())
    }

    /// `attachGlasses`: reuse the existing session if the user already has
    /// one (reconnect), otherwise spin up a new actor task (`started`).
    pub async fn attach_glasses(
        &self,
        user_id: UserId,
        config: Arc<SessionCoreConfig>,
        collaborators: Arc<Collaborators>,
        dashboard_package: String,
    ) -> SessionHandle {
        let mut inner = self.inner.write().await;
        if let Some(session_id) = inner.by_user.get(&user_id) {
            if let Some(entry) = inner.by_session.get(session_id) {
                info!(session_id, %user_id, "glasses reattaching to existing session");
                return entry.handle.clone();
            }
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(256);
        let handle = SessionHandle { tx, session_id: session_id.clone(), user_id: user_id.clone() };
        let actor = UserSessionActor::new(
            session_id.clone(),
            user_id.clone(),
            config,
            collaborators,
            self.clone(),
            dashboard_package,
            handle.clone(),
        );
        tokio::spawn(actor.run(rx));

        inner.by_user.insert(user_id.clone(), session_id.clone());
        inner.by_session.insert(session_id.clone(), Entry { handle: handle.clone(), user_id });
        info!(session_id, "session started");
        handle
    }

    /// Remove a destroyed session from the registry. Called by the actor
    /// itself once it has torn down its links and is about to exit.
    pub async fn remove(&self, session_id: &str, user_id: &str) {
        let mut inner = self.inner.write().await;
        inner.by_session.remove(session_id);
        if inner.by_user.get(user_id).map(String::as_str) == Some(session_id) {
            inner.by_user.remove(user_id);
        }
        info!(session_id, "session destroyed");
    }

    /// Broadcast a message to every live session (used at server shutdown).
    pub async fn broadcast(&self, msg: impl Fn() -> Inbound) {
        let inner = self.inner.read().await;
        for entry in inner.by_session.values() {
            let _ = entry.handle.tx.send(msg()).await;
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
