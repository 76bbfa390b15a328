//! Badge classification for device rows

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label fragment that marks a relay/switch device
pub const SWITCH_MARKER: &str = "Switch";

/// Visual category of a device row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    #[default]
    Sensor,
    Switch,
}

impl BadgeCategory {
    /// Case-sensitive substring match on [`SWITCH_MARKER`]
    pub fn classify(label: &str) -> Self {
        if label.contains(SWITCH_MARKER) {
            BadgeCategory::Switch
        } else {
            BadgeCategory::Sensor
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            BadgeCategory::Sensor => "bg-warning",
            BadgeCategory::Switch => "bg-dark rounded-pill",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            BadgeCategory::Sensor => "ti-router",
            BadgeCategory::Switch => "ti-settings-automation",
        }
    }
}

impl fmt::Display for BadgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeCategory::Sensor => write!(f, "sensor"),
            BadgeCategory::Switch => write!(f, "switch"),
        }
    }
}
