// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed error taxonomy shared by the HTTP handlers in `transport::http`
//! and the two duplex WebSocket protocols in `protocol`, with a single HTTP
//! status mapping and wire-format error envelope.

use std::fmt;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// The closed set of error kinds the core can surface. Each variant names a *kind*, not a specific
/// occurrence; callers attach a human-readable message at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionError {
    /// Token/API key invalid or expired.
    AuthFailed,
    /// TPA targets a non-existent session id.
    UnknownSession,
    /// Malformed envelope or forbidden operation (e.g. non-system TPA
    /// writing a system dashboard section).
    ProtocolViolation,
    /// Requested stream requires a permission the app lacks.
    SubscriptionRejected,
    /// Abrupt transport close; link cleaned up, session stays alive in grace.
    TransportDropped,
    /// Outbound queue saturated and a control frame could not be delivered.
    BackpressureOverflow,
    /// Resource (most commonly a `PhotoRequest`) has passed its TTL.
    ResourceExpired,
    /// Caught unexpected error; logged with context, handling continues.
    InternalFault,
}

impl SessionError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::AuthFailed => 401,
            Self::UnknownSession => 404,
            Self::ProtocolViolation => 400,
            Self::SubscriptionRejected => 403,
            Self::TransportDropped => 409,
            Self::BackpressureOverflow => 429,
            Self::ResourceExpired => 409,
            Self::InternalFault => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthFailed => "AUTH_FAILED",
            Self::UnknownSession => "UNKNOWN_SESSION",
            Self::ProtocolViolation => "PROTOCOL_VIOLATION",
            Self::SubscriptionRejected => "SUBSCRIPTION_REJECTED",
            Self::TransportDropped => "TRANSPORT_DROPPED",
            Self::BackpressureOverflow => "BACKPRESSURE_OVERFLOW",
            Self::ResourceExpired => "RESOURCE_EXPIRED",
            Self::InternalFault => "INTERNAL_FAULT",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_taxonomy() {
        assert_eq!(SessionError::AuthFailed.http_status(), 401);
        assert_eq!(SessionError::UnknownSession.http_status(), 404);
        assert_eq!(SessionError::ResourceExpired.http_status(), 409);
        assert_eq!(SessionError::BackpressureOverflow.http_status(), 429);
    }

    #[test]
    fn display_matches_code() {
        assert_eq!(SessionError::ProtocolViolation.to_string(), "PROTOCOL_VIOLATION");
    }
}
