//! Tunables for the editor, snapping, drag sessions and autosave.
//!
//! Every struct has a `Default` with the stock editor values and can be
//! loaded from JSON; missing keys fall back to the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::{DEFAULT_ELEMENT_HEIGHT, DEFAULT_ELEMENT_WIDTH};

/// Reducer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo depth. Oldest snapshots are evicted first.
    pub history_limit: usize,
    /// Collapse every edit between `BeginGesture` and `EndGesture` into one
    /// undo step.
    pub coalesce_gestures: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            coalesce_gestures: true,
        }
    }
}

impl EditorConfig {
    /// Builder-style history limit.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Builder-style gesture coalescing switch.
    #[must_use]
    pub fn with_coalesce_gestures(mut self, coalesce: bool) -> Self {
        self.coalesce_gestures = coalesce;
        self
    }
}

/// Smart guide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Maximum distance, in slide units, at which an edge snaps to a line.
    pub threshold: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self { threshold: 5.0 }
    }
}

/// Drag/resize session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Screen pixels the pointer must travel on either axis before a press
    /// becomes a drag.
    pub activation_threshold: f64,
    /// Smallest width a resize may produce.
    pub min_width: f64,
    /// Smallest height a resize may produce.
    pub min_height: f64,
    /// Width assumed for an element without one.
    pub default_width: f64,
    /// Height assumed for an element without one.
    pub default_height: f64,
    /// Snapping used while moving.
    pub snap: SnapConfig,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 4.0,
            min_width: 100.0,
            min_height: 50.0,
            default_width: DEFAULT_ELEMENT_WIDTH,
            default_height: DEFAULT_ELEMENT_HEIGHT,
            snap: SnapConfig::default(),
        }
    }
}

impl DragConfig {
    /// Builder-style snap threshold.
    #[must_use]
    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap.threshold = threshold;
        self
    }

    /// Builder-style activation threshold.
    #[must_use]
    pub fn with_activation_threshold(mut self, threshold: f64) -> Self {
        self.activation_threshold = threshold;
        self
    }
}

/// Autosave configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Quiet period after the last edit before a save fires, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self { debounce_ms: 2000 }
    }
}

impl AutoSaveConfig {
    /// The debounce period.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Builder-style debounce.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let editor = EditorConfig::default();
        assert_eq!(editor.history_limit, 50);
        assert!(editor.coalesce_gestures);

        let drag = DragConfig::default();
        assert_eq!(drag.activation_threshold, 4.0);
        assert_eq!(drag.snap.threshold, 5.0);
        assert_eq!(AutoSaveConfig::default().debounce(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: DragConfig =
            serde_json::from_str(r#"{"min_width": 64, "snap": {}}"#).expect("parse");
        assert_eq!(config.min_width, 64.0);
        assert_eq!(config.min_height, 50.0);
        assert_eq!(config.snap.threshold, 5.0);
    }

    #[test]
    fn test_builders() {
        let editor = EditorConfig::default()
            .with_history_limit(5)
            .with_coalesce_gestures(false);
        assert_eq!(editor.history_limit, 5);
        assert!(!editor.coalesce_gestures);
        let autosave = AutoSaveConfig::default().with_debounce(Duration::from_millis(250));
        assert_eq!(autosave.debounce_ms, 250);
    }
}
