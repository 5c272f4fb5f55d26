// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Display views, priorities, and the discriminated layout shapes a TPA or
//! the Dashboard Manager may submit.

use serde::{Deserialize, Serialize};

/// Which glasses surface a `DisplayRequest` targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum View {
    Main,
    Dashboard,
}

/// Display request priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    Critical,
}

/// The closed set of layout shapes a display request may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layoutType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayLayout {
    TextWall { text: String },
    DoubleTextWall { top: String, bottom: String },
    DashboardCard { top: String, bottom: String },
    ReferenceCard { title: String, body: String },
}

impl DisplayLayout {
    pub fn text_wall(text: impl Into<String>) -> Self {
        Self::TextWall { text: text.into() }
    }

    pub fn double_text_wall(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self::DoubleTextWall { top: top.into(), bottom: bottom.into() }
    }

    pub fn dashboard_card(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self::DashboardCard { top: top.into(), bottom: bottom.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_tag_round_trips() {
        let layout = DisplayLayout::double_text_wall("a", "b");
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["layoutType"], "DOUBLE_TEXT_WALL");
        let back: DisplayLayout = serde_json::from_value(json).unwrap();
        assert_eq!(back, layout);
    }
}
