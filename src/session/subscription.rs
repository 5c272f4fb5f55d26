// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription Manager: maps `(TPA, stream kind)` to
//! interest, answers fan-out queries, and emits the downstream reactor
//! decisions (transcription control, microphone control) as a computed
//! delta the session actor applies.

use std::collections::HashMap;

use crate::external::LangPair;
use crate::protocol::{PackageName, StreamKind};

/// What changed as a result of a `set()` call, for the actor to act on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionChange {
    pub package: PackageName,
    pub added: Vec<StreamKind>,
    pub removed: Vec<StreamKind>,
}

/// Effect the manager wants the session actor to apply after a change,
/// because the microphone/transcription state may have flipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactorEffects {
    /// `Some(bool)` when the audio-interest union flipped state.
    pub mic_enabled: Option<bool>,
    /// `Some(langs)` when the transcription/translation language set changed.
    pub transcription_langs: Option<Vec<LangPair>>,
    /// `Some(active)` when the transcription active/inactive state flipped.
    pub transcription_active: Option<bool>,
}

/// Per-user subscription index. Session-local: rebuilt on reconnect from the
/// TPAs that reattach, never persisted.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    subscriptions: HashMap<PackageName, Vec<StreamKind>>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full subscription set for `package`, atomically, and
    /// return the delta plus any reactor effects that must be applied.
    pub fn set(
        &mut self,
        package: PackageName,
        list: Vec<StreamKind>,
    ) -> (SubscriptionChange, ReactorEffects) {
        let was_mic_active = self.audio_interest_active();
        let was_transcribing = self.transcription_active();

        let previous = self.subscriptions.insert(package.clone(), list.clone()).unwrap_or_default();

        let added: Vec<StreamKind> =
            list.iter().filter(|k| !previous.contains(k)).cloned().collect();
        let removed: Vec<StreamKind> =
            previous.iter().filter(|k| !list.contains(k)).cloned().collect();

        let mut effects = ReactorEffects::default();

        let is_mic_active = self.audio_interest_active();
        if is_mic_active != was_mic_active {
            effects.mic_enabled = Some(is_mic_active);
        }

        let is_transcribing = self.transcription_active();
        if is_transcribing != was_transcribing || !added.is_empty() || !removed.is_empty() {
            if is_transcribing != was_transcribing {
                effects.transcription_active = Some(is_transcribing);
            }
            effects.transcription_langs = Some(self.language_pairs());
        }

        (SubscriptionChange { package, added, removed }, effects)
    }

    /// Clear all subscriptions for a package on TPA disconnect, so a
    /// departed TPA never leaves a zombie subscription behind.
    pub fn clear(&mut self, package: &str) -> (SubscriptionChange, ReactorEffects) {
        self.set(package.to_owned(), Vec::new())
    }

    /// Packages subscribed to a given stream *family* (ignores params).
    pub fn get(&self, family: &str) -> Vec<PackageName> {
        self.subscriptions
            .iter()
            .filter(|(_, kinds)| kinds.iter().any(|k| k.family() == family))
            .map(|(pkg, _)| pkg.clone())
            .collect()
    }

    /// Whether anyone subscribes to `kind`'s family, optionally narrowed by
    /// an exact-match predicate (used by button dispatch for a specific
    /// `button_id`).
    pub fn has_subscribers(&self, family: &str, filter: impl Fn(&StreamKind) -> bool) -> bool {
        self.subscriptions.values().any(|kinds| {
            kinds.iter().any(|k| k.family() == family && filter(k))
        })
    }

    /// Packages subscribed to `family`, narrowed by an exact-match predicate
    /// — the fan-out counterpart to `has_subscribers`, so a TPA subscribed to
    /// one `button_press(id)` never receives another id's event.
    pub fn get_filtered(&self, family: &str, filter: impl Fn(&StreamKind) -> bool) -> Vec<PackageName> {
        self.subscriptions
            .iter()
            .filter(|(_, kinds)| kinds.iter().any(|k| k.family() == family && filter(k)))
            .map(|(pkg, _)| pkg.clone())
            .collect()
    }

    fn audio_interest_active(&self) -> bool {
        self.subscriptions.values().any(|kinds| {
            kinds.iter().any(|k| {
                matches!(k, StreamKind::AudioChunk) || k.is_transcription_family()
            })
        })
    }

    fn transcription_active(&self) -> bool {
        self.subscriptions.values().any(|kinds| kinds.iter().any(|k| k.is_transcription_family()))
    }

    fn language_pairs(&self) -> Vec<LangPair> {
        let mut pairs = Vec::new();
        for kinds in self.subscriptions.values() {
            for k in kinds {
                match k {
                    StreamKind::Transcription { lang } => {
                        pairs.push(LangPair { from: lang.clone(), to: None })
                    }
                    StreamKind::Translation { from, to } => {
                        pairs.push(LangPair { from: from.clone(), to: Some(to.clone()) })
                    }
                    _ => {}
                }
            }
        }
        pairs.sort_by(|a, b| (a.from.as_str(), a.to.as_deref()).cmp(&(b.from.as_str(), b.to.as_deref())));
        pairs.dedup();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_tracks_added_and_removed() {
        let mut mgr = SubscriptionManager::new();
        let (change, _) = mgr.set(
            "com.x".to_owned(),
            vec![StreamKind::AudioChunk, StreamKind::GlassesBattery],
        );
        assert_eq!(change.added.len(), 2);
        assert!(change.removed.is_empty());

        let (change2, _) = mgr.set("com.x".to_owned(), vec![StreamKind::GlassesBattery]);
        assert_eq!(change2.removed, vec![StreamKind::AudioChunk]);
        assert!(change2.added.is_empty());
    }

    #[test]
    fn clear_removes_zombie_subscriptions() {
        let mut mgr = SubscriptionManager::new();
        mgr.set("com.x".to_owned(), vec![StreamKind::AudioChunk]);
        assert_eq!(mgr.get("audio_chunk"), vec!["com.x".to_owned()]);

        mgr.clear("com.x");
        assert!(mgr.get("audio_chunk").is_empty());
    }

    #[test]
    fn mic_reactor_flips_on_first_subscriber_and_last_unsubscribe() {
        let mut mgr = SubscriptionManager::new();
        let (_, effects) = mgr.set("com.x".to_owned(), vec![StreamKind::AudioChunk]);
        assert_eq!(effects.mic_enabled, Some(true));

        let (_, effects2) = mgr.set("com.x".to_owned(), vec![]);
        assert_eq!(effects2.mic_enabled, Some(false));
    }

    #[test]
    fn button_press_dispatch_matches_exact_button_id() {
        let mut mgr = SubscriptionManager::new();
        mgr.set(
            "com.x".to_owned(),
            vec![StreamKind::ButtonPress { button_id: "photo".to_owned() }],
        );
        assert!(mgr.has_subscribers("button_press", |k| matches!(
            k,
            StreamKind::ButtonPress { button_id } if button_id == "photo"
        )));
        assert!(!mgr.has_subscribers("button_press", |k| matches!(
            k,
            StreamKind::ButtonPress { button_id } if button_id == "volume_up"
        )));
    }

    #[test]
    fn button_press_fan_out_excludes_other_button_ids() {
        let mut mgr = SubscriptionManager::new();
        mgr.set("com.photo".to_owned(), vec![StreamKind::ButtonPress { button_id: "photo".to_owned() }]);
        mgr.set("com.volume".to_owned(), vec![StreamKind::ButtonPress { button_id: "volume_up".to_owned() }]);

        let subscribers = mgr.get_filtered("button_press", |k| matches!(
            k,
            StreamKind::ButtonPress { button_id } if button_id == "photo"
        ));
        assert_eq!(subscribers, vec!["com.photo".to_owned()]);
    }
}
