// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud ↔ TPA duplex envelopes.

use serde::{Deserialize, Serialize};

use super::layout::{DisplayLayout, Priority, View};

/// Inbound text-frame envelopes from a TPA.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TpaInbound {
    #[serde(rename_all = "camelCase")]
    TpaConnectionInit {
        package_name: String,
        api_key: String,
        session_id: String,
    },
    #[serde(rename_all = "camelCase")]
    SubscriptionUpdate {
        subscriptions: Vec<super::StreamKind>,
    },
    #[serde(rename_all = "camelCase")]
    DisplayRequest {
        view: View,
        layout: DisplayLayout,
        #[serde(default)]
        duration_ms: Option<u64>,
        #[serde(default)]
        priority: Priority,
    },
    #[serde(rename_all = "camelCase")]
    DashboardContentUpdate {
        content: DisplayLayout,
        modes: Vec<String>,
        timestamp: u64,
    },
    /// System dashboard package only.
    #[serde(rename_all = "camelCase")]
    DashboardModeChange {
        mode: String,
    },
    /// System dashboard package only.
    #[serde(rename_all = "camelCase")]
    DashboardSystemUpdate {
        section: String,
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    PhotoRequest {
        #[serde(default)]
        save_to_gallery: bool,
    },
    Heartbeat,
}

/// Outbound text-frame envelopes to a TPA.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TpaOutbound {
    #[serde(rename_all = "camelCase")]
    ConnectionAck {
        session_id: String,
    },
    #[serde(rename_all = "camelCase")]
    DataStream {
        stream_kind: String,
        payload: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    DisplayRequestStatus {
        status: DisplayStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    DashboardModeChanged {
        mode: String,
    },
    #[serde(rename_all = "camelCase")]
    DashboardAlwaysOnChanged {
        enabled: bool,
    },
    #[serde(rename_all = "camelCase")]
    PhotoTaken {
        request_id: String,
        url: String,
    },
    SessionClosing {
        reason: String,
    },
}

/// Status values for `display_request_status`. Every accepted display
/// request resolves to exactly one of these, reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Displayed,
    Throttled,
    QueuedBoot,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_update_decodes_closed_kinds() {
        let raw = r#"{"type":"subscription_update","subscriptions":[
            {"kind":"audio_chunk"},
            {"kind":"button_press","buttonId":"photo"},
            {"kind":"transcription","lang":"en-US"}
        ]}"#;
        let msg: TpaInbound = serde_json::from_str(raw).unwrap();
        let TpaInbound::SubscriptionUpdate { subscriptions } = msg else {
            panic!("wrong variant");
        };
        assert_eq!(subscriptions.len(), 3);
    }

    #[test]
    fn display_request_status_tags_snake_case() {
        let msg = TpaOutbound::DisplayRequestStatus {
            status: DisplayStatus::QueuedBoot,
            reason: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["status"], "queued_boot");
    }
}
