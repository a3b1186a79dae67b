//! Editor session configuration.

use mc_core::align::DEFAULT_SNAP_THRESHOLD;
use mc_core::model::{CARD_SIZE, IMAGE_CARD_SIZE, Size};
use serde::Deserialize;

/// Configuration for `EditorSession`.
///
/// Every field has a default, so a host may pass a partial JSON object
/// (`{"historyLimit": 50}`) and keep the rest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// World-space distance under which a dragged card snaps. Default: **5**.
    pub snap_threshold: f32,

    /// Maximum undo depth; the oldest entry is dropped beyond it.
    /// Default: **unbounded** (`None`).
    pub history_limit: Option<usize>,

    /// Quiet period after the last change before autosave fires.
    /// Default: **1000 ms**.
    pub autosave_quiet_ms: u64,

    /// Size of cards created by double-click and connect. Default: **300×150**.
    pub card_size: Size,

    /// Size of cards created from a pasted image. Default: **300×250**.
    pub image_card_size: Size,

    /// Start with the "Welcome" card instead of an empty canvas.
    /// Default: **true**.
    pub seed_welcome_node: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            history_limit: None,
            autosave_quiet_ms: 1000,
            card_size: CARD_SIZE,
            image_card_size: IMAGE_CARD_SIZE,
            seed_welcome_node: true,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON override.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid editor config: {e}"))
    }
}
