// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Narrow async trait boundaries for the external collaborators this crate
//! treats as out of scope and interfaces-only: the persistent store, auth
//! token verification, object storage for captured media, and the
//! speech/transcription provider. Each trait is deliberately small — the
//! core only calls the handful of operations it actually needs.
//!
//! In-memory reference implementations are provided for tests and for
//! running the crate standalone without a production backend wired in.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::protocol::{PackageName, UserId};

/// Verifies bearer tokens (glasses) and API keys (TPAs) against the
/// external auth collaborator.
#[async_trait::async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_glasses_token(&self, token: &str) -> Option<UserId>;
    async fn verify_tpa_api_key(&self, package: &PackageName, api_key: &str) -> bool;
}

/// Object storage for captured photo media uploaded via the photo endpoint.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<String>;
}

/// Gallery entries recorded for uploads with `save_to_gallery`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GalleryEntry {
    pub request_id: String,
    pub url: String,
    pub created_at_ms: u64,
}

#[async_trait::async_trait]
pub trait GalleryStore: Send + Sync {
    async fn record(&self, user: &UserId, request_id: &str, url: &str);
    async fn list(&self, user: &UserId) -> Vec<GalleryEntry>;
}

/// A (source, target) language pair for transcription/translation control.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LangPair {
    pub from: String,
    pub to: Option<String>,
}

/// The pluggable speech/transcription provider. The Subscription Manager
/// calls this whenever the union of transcription/translation subscriptions
/// changes for a session.
#[async_trait::async_trait]
pub trait TranscriptionControl: Send + Sync {
    async fn set_languages(&self, session_id: &str, langs: Vec<LangPair>);
    async fn set_active(&self, session_id: &str, active: bool);
}

/// Consulted by `UserSession` to reject TPAs the user has uninstalled.
#[async_trait::async_trait]
pub trait InstallState: Send + Sync {
    async fn is_installed(&self, user: &UserId, package: &PackageName) -> bool;
}

/// Generic KV/document interface standing in for the persistent store. The
/// core's own session state is in-memory; this trait exists only as a
/// boundary a real adapter can fill in without touching session logic.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: String);
}

// -- In-memory reference implementations -------------------------------------

/// Default dev/test token verifier: any non-empty token is accepted, and the
/// user id is derived from it deterministically (not for production use).
pub struct DevTokenVerifier;

#[async_trait::async_trait]
impl TokenVerifier for DevTokenVerifier {
    async fn verify_glasses_token(&self, token: &str) -> Option<UserId> {
        if token.is_empty() {
            None
        } else {
            Some(format!("user:{token}"))
        }
    }

    async fn verify_tpa_api_key(&self, _package: &PackageName, api_key: &str) -> bool {
        !api_key.is_empty()
    }
}

/// In-memory object store, addresses media by a generated opaque path.
#[derive(Default)]
pub struct InMemoryObjectStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        let id = uuid::Uuid::new_v4();
        let path = format!("mem://photos/{id}");
        let _ = content_type;
        self.blobs.write().await.insert(path.clone(), bytes);
        Ok(path)
    }
}

/// In-memory gallery, keyed by user id.
#[derive(Default)]
pub struct InMemoryGalleryStore {
    entries: RwLock<HashMap<UserId, Vec<GalleryEntry>>>,
}

#[async_trait::async_trait]
impl GalleryStore for InMemoryGalleryStore {
    async fn record(&self, user: &UserId, request_id: &str, url: &str) {
        let entry = GalleryEntry {
            request_id: request_id.to_owned(),
            url: url.to_owned(),
            created_at_ms: crate::state::epoch_ms(),
        };
        self.entries.write().await.entry(user.clone()).or_default().push(entry);
    }

    async fn list(&self, user: &UserId) -> Vec<GalleryEntry> {
        self.entries.read().await.get(user).cloned().unwrap_or_default()
    }
}

/// No-op transcription control; logs what it would have done. A real
/// adapter opens/closes provider streams in response to these calls.
#[derive(Default)]
pub struct NoopTranscriptionControl;

#[async_trait::async_trait]
impl TranscriptionControl for NoopTranscriptionControl {
    async fn set_languages(&self, session_id: &str, langs: Vec<LangPair>) {
        tracing::debug!(session_id, count = langs.len(), "transcription languages updated");
    }

    async fn set_active(&self, session_id: &str, active: bool) {
        tracing::debug!(session_id, active, "transcription active state updated");
    }
}

/// Permissive install-state: every package is considered installed. Useful
/// for tests and local dev; a production adapter consults the app catalog.
#[derive(Default)]
pub struct PermissiveInstallState;

#[async_trait::async_trait]
impl InstallState for PermissiveInstallState {
    async fn is_installed(&self, _user: &UserId, _package: &PackageName) -> bool {
        true
    }
}

/// In-memory KV store.
#[derive(Default)]
pub struct InMemoryStore {
    data: RwLock<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.data.read().await.get(key).cloned()
    }

    async fn put(&self, key: &str, value: String) {
        self.data.write().await.insert(key.to_owned(), value);
    }
}

/// Bundle of collaborator implementations injected into the session core.
pub struct Collaborators {
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub object_store: Arc<dyn ObjectStore>,
    pub gallery_store: Arc<dyn GalleryStore>,
    pub transcription: Arc<dyn TranscriptionControl>,
    pub install_state: Arc<dyn InstallState>,
    pub store: Arc<dyn Store>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            token_verifier: Arc::new(DevTokenVerifier),
            object_store: Arc::new(InMemoryObjectStore::default()),
            gallery_store: Arc::new(InMemoryGalleryStore::default()),
            transcription: Arc::new(NoopTranscriptionControl),
            install_state: Arc::new(PermissiveInstallState),
            store: Arc::new(InMemoryStore::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dev_verifier_rejects_empty_token() {
        let v = DevTokenVerifier;
        assert!(v.verify_glasses_token("").await.is_none());
        assert_eq!(v.verify_glasses_token("abc").await, Some("user:abc".to_owned()));
    }

    #[tokio::test]
    async fn gallery_records_and_lists_per_user() {
        let gallery = InMemoryGalleryStore::default();
        gallery.record(&"u1".to_owned(), "r1", "mem://x").await;
        let entries = gallery.list(&"u1".to_owned()).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].request_id, "r1");
        assert!(gallery.list(&"u2".to_owned()).await.is_empty());
    }
}
