// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard Manager: owns dashboard mode and per-mode
//! content queues, composes the rendered layout, and submits it to the
//! Display Manager on the `DASHBOARD` view. The designated system dashboard
//! package is the only writer of `mode` and system sections; other TPAs may
//! only push content into the queues.

use std::collections::HashMap;

use crate::protocol::{DisplayLayout, PackageName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardMode {
    Main,
    Expanded,
    AlwaysOn,
    #[default]
    None,
}

impl DashboardMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "MAIN" | "main" => Some(Self::Main),
            "EXPANDED" | "expanded" => Some(Self::Expanded),
            "ALWAYS_ON" | "always_on" => Some(Self::AlwaysOn),
            "NONE" | "none" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemSections {
    pub top_left: String,
    pub top_right: String,
    pub bottom_left: String,
    pub bottom_right: String,
}

impl SystemSections {
    fn set(&mut self, section: &str, content: String) -> bool {
        match section {
            "topLeft" | "top_left" => self.top_left = content,
            "topRight" | "top_right" => self.top_right = content,
            "bottomLeft" | "bottom_left" => self.bottom_left = content,
            "bottomRight" | "bottom_right" => self.bottom_right = content,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone)]
struct QueueEntry {
    content: DisplayLayout,
    timestamp: u64,
}

/// One independent `{pkg -> (content, timestamp)}` map per mode.
#[derive(Debug, Default)]
struct ContentQueue {
    entries: HashMap<PackageName, QueueEntry>,
}

impl ContentQueue {
    fn push(&mut self, package: PackageName, content: DisplayLayout, timestamp: u64) {
        self.entries.insert(package, QueueEntry { content, timestamp });
    }

    fn remove(&mut self, package: &str) {
        self.entries.remove(package);
    }

    /// The single newest entry, chosen by timestamp descending.
    fn latest(&self) -> Option<&QueueEntry> {
        self.entries.values().max_by_key(|e| e.timestamp)
    }
}

fn layout_text(layout: &DisplayLayout) -> String {
    match layout {
        DisplayLayout::TextWall { text } => text.clone(),
        DisplayLayout::DoubleTextWall { top, bottom } => format!("{top}\n{bottom}"),
        DisplayLayout::DashboardCard { top, bottom } => format!("{top}\n{bottom}"),
        DisplayLayout::ReferenceCard { title, body } => format!("{title}\n{body}"),
    }
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => String::new(),
        (true, false) => b.to_owned(),
        (false, true) => a.to_owned(),
        (false, false) => format!("{a}\n{b}"),
    }
}

pub struct DashboardManager {
    system_package: PackageName,
    mode: DashboardMode,
    always_on: bool,
    sections: SystemSections,
    main_queue: ContentQueue,
    expanded_queue: ContentQueue,
    always_on_queue: ContentQueue,
}

/// Broadcast notifications the session actor must fan out to every
/// connected TPA after a mutation.
#[derive(Debug, Clone, Default)]
pub struct DashboardBroadcast {
    pub mode_changed: Option<DashboardMode>,
    pub always_on_changed: Option<bool>,
}

impl DashboardManager {
    pub fn new(system_package: PackageName) -> Self {
        Self {
            system_package,
            mode: DashboardMode::default(),
            always_on: false,
            sections: SystemSections::default(),
            main_queue: ContentQueue::default(),
            expanded_queue: ContentQueue::default(),
            always_on_queue: ContentQueue::default(),
        }
    }

    pub fn is_system_package(&self, package: &str) -> bool {
        package == self.system_package
    }

    pub fn mode(&self) -> DashboardMode {
        self.mode
    }

    pub fn always_on(&self) -> bool {
        self.always_on
    }

    /// System package only. Returns `Err` (protocol_violation) if called by
    /// anyone else — callers must check `is_system_package` first; this is
    /// a defense-in-depth assertion, not the primary gate.
    pub fn set_mode(&mut self, package: &str, mode: DashboardMode) -> Result<DashboardBroadcast, ()> {
        if !self.is_system_package(package) {
            return Err(());
        }
        let mut broadcast = DashboardBroadcast::default();
        if mode != self.mode {
            self.mode = mode;
            broadcast.mode_changed = Some(mode);
        }
        let always_on = mode == DashboardMode::AlwaysOn;
        if always_on != self.always_on {
            self.always_on = always_on;
            broadcast.always_on_changed = Some(always_on);
        }
        Ok(broadcast)
    }

    pub fn set_system_section(&mut self, package: &str, section: &str, content: String) -> Result<(), ()> {
        if !self.is_system_package(package) {
            return Err(());
        }
        self.sections.set(section, content);
        Ok(())
    }

    /// Any TPA may push content; its entry is overwritten on resubmission.
    pub fn push_content(
        &mut self,
        package: PackageName,
        content: DisplayLayout,
        modes: &[String],
        timestamp: u64,
    ) {
        for raw_mode in modes {
            match raw_mode.as_str() {
                "MAIN" => self.main_queue.push(package.clone(), content.clone(), timestamp),
                "EXPANDED" => self.expanded_queue.push(package.clone(), content.clone(), timestamp),
                "ALWAYS_ON" => self.always_on_queue.push(package.clone(), content.clone(), timestamp),
                _ => {}
            }
        }
    }

    /// Stale entries are removed on TPA disconnect.
    pub fn on_package_disconnected(&mut self, package: &str) {
        self.main_queue.remove(package);
        self.expanded_queue.remove(package);
        self.always_on_queue.remove(package);
    }

    /// Compose the layout for the current mode. Returns `None` when mode is
    /// `none` (nothing to show).
    pub fn compose(&self) -> Option<DisplayLayout> {
        match self.mode {
            DashboardMode::None => None,
            DashboardMode::Main => {
                let top = join_nonempty(&self.sections.top_left, &self.sections.bottom_left);
                let latest = self.main_queue.latest().map(|e| layout_text(&e.content));
                let mut bottom = join_nonempty(&self.sections.top_right, &self.sections.bottom_right);
                if let Some(latest) = latest {
                    bottom = if bottom.is_empty() {
                        latest
                    } else {
                        format!("{bottom}\n\n{latest}")
                    };
                }
                Some(DisplayLayout::double_text_wall(top, bottom))
            }
            DashboardMode::Expanded => {
                let header = format!("{} | {}", self.sections.top_left, self.sections.top_right);
                let latest = self.expanded_queue.latest().map(|e| layout_text(&e.content)).unwrap_or_default();
                Some(DisplayLayout::text_wall(format!("{header}\n{latest}")))
            }
            DashboardMode::AlwaysOn => {
                let latest = self.always_on_queue.latest().map(|e| layout_text(&e.content));
                let mut bottom = self.sections.top_right.clone();
                if let Some(latest) = latest {
                    bottom = join_nonempty(&bottom, &latest);
                }
                Some(DisplayLayout::dashboard_card(self.sections.top_left.clone(), bottom))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYS: &str = "system.dashboard";

    #[test]
    fn only_system_package_changes_mode() {
        let mut mgr = DashboardManager::new(SYS.to_owned());
        assert!(mgr.set_mode("com.rogue", DashboardMode::Main).is_err());
        assert_eq!(mgr.mode(), DashboardMode::None);

        assert!(mgr.set_mode(SYS, DashboardMode::Main).is_ok());
        assert_eq!(mgr.mode(), DashboardMode::Main);
    }

    #[test]
    fn only_system_package_writes_sections() {
        let mut mgr = DashboardManager::new(SYS.to_owned());
        assert!(mgr.set_system_section("com.rogue", "topLeft", "x".into()).is_err());
        assert!(mgr.set_system_section(SYS, "topLeft", "12:34".into()).is_ok());
    }

    #[test]
    fn compose_main_joins_sections_and_latest_content() {
        let mut mgr = DashboardManager::new(SYS.to_owned());
        mgr.set_mode(SYS, DashboardMode::Main).unwrap();
        mgr.set_system_section(SYS, "topLeft", "12:34".into()).unwrap();
        mgr.set_system_section(SYS, "topRight", "85%".into()).unwrap();
        mgr.set_system_section(SYS, "bottomLeft", "N:3".into()).unwrap();
        mgr.set_system_section(SYS, "bottomRight", "OK".into()).unwrap();
        mgr.push_content("com.x".to_owned(), DisplayLayout::text_wall("steps 5280"), &["MAIN".to_owned()], 1);

        let layout = mgr.compose().unwrap();
        assert_eq!(
            layout,
            DisplayLayout::double_text_wall("12:34\nN:3", "85%\nOK\n\nsteps 5280")
        );
    }

    #[test]
    fn always_on_flag_tracks_mode() {
        let mut mgr = DashboardManager::new(SYS.to_owned());
        let broadcast = mgr.set_mode(SYS, DashboardMode::AlwaysOn).unwrap();
        assert_eq!(broadcast.always_on_changed, Some(true));
        assert!(mgr.always_on());
    }

    #[test]
    fn disconnect_clears_stale_queue_entries() {
        let mut mgr = DashboardManager::new(SYS.to_owned());
        mgr.set_mode(SYS, DashboardMode::Main).unwrap();
        mgr.push_content("com.x".to_owned(), DisplayLayout::text_wall("hi"), &["MAIN".to_owned()], 1);
        mgr.on_package_disconnected("com.x");
        let layout = mgr.compose().unwrap();
        assert_eq!(layout, DisplayLayout::double_text_wall("", ""));
    }
}
