//! Tree view configuration.
//!
//! Every field has a default matching the stock widget, so a configuration
//! file only needs to name the values it changes:
//!
//! ```
//! use horizon_treeview::TreeViewConfig;
//!
//! let config = TreeViewConfig::from_toml_str("enable_drag_drop = false").unwrap();
//! assert!(!config.enable_drag_drop);
//! assert_eq!(config.mask_bound_height, 24.0);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TreeViewResult;

/// Behaviour and timing knobs for a [`TreeView`](crate::TreeView).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeViewConfig {
    /// Allow shift/ctrl modifiers and drag-to-select to build multi-row selections.
    pub enable_multiple_select: bool,
    /// Allow dragging selected rows to reorder them.
    pub enable_drag_drop: bool,
    /// Slack in pixels around the viewport inside which a drop is still accepted.
    pub start_drag_offset: f32,
    /// Height of the faded bands at the top and bottom of the viewport.
    pub mask_bound_height: f32,
    /// Pixels scrolled per auto-scroll tick. The auto-scroll band is twice this.
    pub auto_scroll_step: f32,
    /// Interval between auto-scroll ticks in milliseconds.
    pub auto_scroll_delay_ms: u64,
    /// Interval between coalesced redraw flushes in milliseconds.
    pub redraw_delay_ms: u64,
    /// Worker threads for background sorting. `None` uses one per CPU.
    pub sort_threads: Option<usize>,
}

impl Default for TreeViewConfig {
    fn default() -> Self {
        Self {
            enable_multiple_select: true,
            enable_drag_drop: true,
            start_drag_offset: 50.0,
            mask_bound_height: 24.0,
            auto_scroll_step: 24.0,
            auto_scroll_delay_ms: 70,
            redraw_delay_ms: 100,
            sort_threads: None,
        }
    }
}

impl TreeViewConfig {
    /// Parse a configuration from TOML, filling unspecified fields with defaults.
    pub fn from_toml_str(source: &str) -> TreeViewResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_multiple_select(mut self, enabled: bool) -> Self {
        self.enable_multiple_select = enabled;
        self
    }

    pub fn with_drag_drop(mut self, enabled: bool) -> Self {
        self.enable_drag_drop = enabled;
        self
    }

    pub fn with_mask_bound_height(mut self, height: f32) -> Self {
        self.mask_bound_height = height;
        self
    }

    pub fn with_sort_threads(mut self, threads: usize) -> Self {
        self.sort_threads = Some(threads);
        self
    }

    /// Height of the edge band that triggers auto-scroll.
    pub fn auto_scroll_band(&self) -> f32 {
        self.auto_scroll_step * 2.0
    }

    pub fn auto_scroll_delay(&self) -> Duration {
        Duration::from_millis(self.auto_scroll_delay_ms)
    }

    pub fn redraw_delay(&self) -> Duration {
        Duration::from_millis(self.redraw_delay_ms)
    }
}
