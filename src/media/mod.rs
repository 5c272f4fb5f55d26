// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Media & Button Flow: the `PhotoRequest` table matching a device upload to
//! the request that triggered it. Session-local, like the rest of a user's
//! live session state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::SessionError;
use crate::protocol::{PackageName, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoStatus {
    Pending,
    Completed,
    Expired,
}

/// The originating package for a `PhotoRequest`: either the system default
/// action (hardware button with no subscriber) or a specific TPA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requester {
    System,
    Tpa(PackageName),
}

#[derive(Debug, Clone)]
pub struct PhotoRequest {
    pub id: String,
    pub user_id: UserId,
    pub requester: Requester,
    pub save_to_gallery: bool,
    pub created_at: Instant,
    pub status: PhotoStatus,
}

/// Outcome of a successful upload match.
pub struct UploadMatch {
    pub requester: Requester,
    pub save_to_gallery: bool,
}

#[derive(Debug, Default)]
pub struct PhotoRequestTable {
    requests: HashMap<String, PhotoRequest>,
}

impl PhotoRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh opaque id and record a pending request.
    pub fn allocate(&mut self, user_id: UserId, requester: Requester, save_to_gallery: bool) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.requests.insert(
            id.clone(),
            PhotoRequest {
                id: id.clone(),
                user_id,
                requester,
                save_to_gallery,
                created_at: Instant::now(),
                status: PhotoStatus::Pending,
            },
        );
        id
    }

    /// Match an upload to its request: validates existence, user match,
    /// pending status, and TTL. A request is matched **at most once**.
    pub fn complete(
        &mut self,
        id: &str,
        user_id: &UserId,
        ttl: Duration,
        now: Instant,
    ) -> Result<UploadMatch, SessionError> {
        let Some(req) = self.requests.get_mut(id) else {
            return Err(SessionError::UnknownSession);
        };

        if now.duration_since(req.created_at) > ttl {
            req.status = PhotoStatus::Expired;
            return Err(SessionError::ResourceExpired);
        }

        if &req.user_id != user_id {
            return Err(SessionError::AuthFailed);
        }

        if req.status != PhotoStatus::Pending {
            return Err(SessionError::ResourceExpired);
        }

        req.status = PhotoStatus::Completed;
        Ok(UploadMatch { requester: req.requester.clone(), save_to_gallery: req.save_to_gallery })
    }

    /// Sweep expired pending requests (called from a periodic timer tick).
    pub fn expire_stale(&mut self, ttl: Duration, now: Instant) {
        for req in self.requests.values_mut() {
            if req.status == PhotoStatus::Pending && now.duration_since(req.created_at) > ttl {
                req.status = PhotoStatus::Expired;
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&PhotoRequest> {
        self.requests.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_matches_exactly_once() {
        let mut table = PhotoRequestTable::new();
        let user = "u1".to_owned();
        let id = table.allocate(user.clone(), Requester::System, true);

        let first = table.complete(&id, &user, Duration::from_secs(120), Instant::now());
        assert!(first.is_ok());

        let second = table.complete(&id, &user, Duration::from_secs(120), Instant::now());
        assert!(second.is_err());
    }

    #[test]
    fn expired_upload_is_rejected() {
        let mut table = PhotoRequestTable::new();
        let user = "u1".to_owned();
        let created = Instant::now();
        let id = table.allocate(user.clone(), Requester::System, true);

        let later = created + Duration::from_secs(200);
        let result = table.complete(&id, &user, Duration::from_secs(120), later);
        assert!(matches!(result, Err(SessionError::ResourceExpired)));
    }

    #[test]
    fn upload_for_different_user_is_rejected() {
        let mut table = PhotoRequestTable::new();
        let id = table.allocate("u1".to_owned(), Requester::System, false);
        let result = table.complete(&id, &"u2".to_owned(), Duration::from_secs(120), Instant::now());
        assert!(matches!(result, Err(SessionError::AuthFailed)));
    }
}
