use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Tunables for the flag layer.
///
/// Hosts usually deserialize this from their UI settings file; any field left
/// out falls back to the defaults in [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagSettings {
    pub stack_spacing_px: f32,
    pub anchor_height: f32,
    pub medium_health_threshold: f32,
    pub low_health_threshold: f32,
    pub max_world_anchors: usize,
}

impl Default for FlagSettings {
    fn default() -> Self {
        Self {
            stack_spacing_px: FLAG_STACK_SPACING_PX,
            anchor_height: FLAG_ANCHOR_HEIGHT,
            medium_health_threshold: MEDIUM_HEALTH_THRESHOLD,
            low_health_threshold: LOW_HEALTH_THRESHOLD,
            max_world_anchors: MAX_WORLD_ANCHORS,
        }
    }
}
