// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Glasses ↔ cloud duplex envelopes.

use serde::{Deserialize, Serialize};

use super::layout::DisplayLayout;

/// Inbound text-frame envelopes from a glasses device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GlassesInbound {
    #[serde(rename_all = "camelCase")]
    ConnectionInit {
        core_token: String,
    },
    #[serde(rename = "VAD")]
    Vad {
        status: bool,
    },
    #[serde(rename_all = "camelCase")]
    ButtonPress {
        button_id: String,
        press_type: String,
    },
    HeadPosition {
        position: String,
    },
    #[serde(rename_all = "camelCase")]
    GlassesBatteryUpdate {
        level: u8,
        charging: bool,
        #[serde(default)]
        time_remaining: Option<u64>,
    },
    LocationUpdate {
        lat: f64,
        lng: f64,
    },
    #[serde(rename_all = "camelCase")]
    CalendarEvent {
        title: String,
        event_id: String,
        dt_start: String,
        dt_end: String,
        time_zone: String,
    },
    CoreStatus {
        status: String,
    },
    #[serde(rename_all = "camelCase")]
    StartApp {
        package_name: String,
    },
    #[serde(rename_all = "camelCase")]
    StopApp {
        package_name: String,
    },
}

/// Outbound text-frame envelopes to a glasses device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GlassesOutbound {
    #[serde(rename_all = "camelCase")]
    ConnectionAck {
        installed_apps: Vec<String>,
        active_app_package_names: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    AppStateChange {
        package_name: String,
        state: String,
    },
    #[serde(rename_all = "camelCase")]
    DisplayEvent {
        package_name: String,
        view: super::layout::View,
        layout: DisplayLayout,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    MicrophoneStateChange {
        is_microphone_enabled: bool,
    },
    ConnectionError {
        message: String,
    },
    AuthError,
    #[serde(rename_all = "camelCase")]
    RequestSingle {
        data_type: String,
    },
    #[serde(rename_all = "camelCase")]
    TakePhoto {
        request_id: String,
    },
    Reconnect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_button_press_decodes() {
        let raw = r#"{"type":"button_press","buttonId":"photo","pressType":"short"}"#;
        let msg: GlassesInbound = serde_json::from_str(raw).unwrap();
        match msg {
            GlassesInbound::ButtonPress { button_id, press_type } => {
                assert_eq!(button_id, "photo");
                assert_eq!(press_type, "short");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn outbound_display_event_tags_view_uppercase_and_camel_fields() {
        let msg = GlassesOutbound::DisplayEvent {
            package_name: "com.x".into(),
            view: super::super::layout::View::Main,
            layout: DisplayLayout::text_wall("hi"),
            duration_ms: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["view"], "MAIN");
        assert_eq!(json["packageName"], "com.x");
        assert!(json.get("durationMs").is_none());
    }
}
