// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-format envelopes for the two duplex protocols (glasses and TPA), plus
//! the shared discriminated types (`StreamKind`, `View`, `Priority`,
//! `DisplayLayout`) both protocols and the display/dashboard managers share.
//!
//! Every envelope kind is a closed, versioned, internally-tagged `serde` enum
//! — no free-form string dispatch — tagged with
//! `#[serde(tag = "type", rename_all = "snake_case")]` or similar.

pub mod glasses;
pub mod layout;
pub mod tpa;

pub use glasses::{GlassesInbound, GlassesOutbound};
pub use layout::{DisplayLayout, Priority, View};
pub use tpa::{DisplayStatus, TpaInbound, TpaOutbound};

/// A TPA's package name, e.g. `com.example.notifier`.
pub type PackageName = String;

/// A user identity, as resolved by the external token verifier.
pub type UserId = String;

/// The closed set of stream kinds a TPA may subscribe to. The kind set is
/// closed and versioned: adding a new kind requires a new variant here, not
/// a free-form string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamKind {
    AudioChunk,
    Transcription { lang: String },
    #[serde(rename_all = "camelCase")]
    Translation { from: String, to: String },
    PhoneNotification,
    HeadPosition,
    #[serde(rename_all = "camelCase")]
    ButtonPress { button_id: String },
    GlassesBattery,
    Location,
    CalendarEvent,
    PhotoTaken,
}

impl StreamKind {
    /// A stable string key used for map lookups and log fields. Two
    /// `StreamKind`s with the same discriminant but different params (e.g.
    /// two different `lang`s) intentionally collide here — only one
    /// subscription of a given base kind is meaningful per TPA at a time.
    pub fn family(&self) -> &'static str {
        match self {
            Self::AudioChunk => "audio_chunk",
            Self::Transcription { .. } => "transcription",
            Self::Translation { .. } => "translation",
            Self::PhoneNotification => "phone_notification",
            Self::HeadPosition => "head_position",
            Self::ButtonPress { .. } => "button_press",
            Self::GlassesBattery => "glasses_battery",
            Self::Location => "location",
            Self::CalendarEvent => "calendar_event",
            Self::PhotoTaken => "photo_taken",
        }
    }

    pub fn is_transcription_family(&self) -> bool {
        matches!(self, Self::Transcription { .. } | Self::Translation { .. })
    }
}
