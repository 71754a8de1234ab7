//! Flag layout constants and configuration defaults
//!
//! This module centralizes the magic numbers used by the unit flags.

use bevy::prelude::*;

// ============================================================================
// HEALTH BAR
// ============================================================================

/// At or below this remaining-health fraction the bar turns to the medium band.
/// Keep in sync with the unit info panel.
pub const MEDIUM_HEALTH_THRESHOLD: f32 = 0.75;

/// Below this remaining-health fraction the bar turns to the low band.
pub const LOW_HEALTH_THRESHOLD: f32 = 0.5;

// ============================================================================
// LAYOUT
// ============================================================================

/// Vertical pixels between two flags stacked in the same cell.
/// Flags grow upwards, so the applied offset is negative.
pub const FLAG_STACK_SPACING_PX: f32 = 16.0;

/// Height above the unit model where the world anchor is placed.
pub const FLAG_ANCHOR_HEIGHT: f32 = 40.0;

/// Number of world anchors the projection layer can hold at once.
pub const MAX_WORLD_ANCHORS: usize = 4096;

// ============================================================================
// COLORS
// ============================================================================

/// Used when the owning player cannot be resolved
pub const FALLBACK_PRIMARY_COLOR: Color = Color::BLACK;
pub const FALLBACK_SECONDARY_COLOR: Color = Color::WHITE;

// ============================================================================
// ASSETS
// ============================================================================

/// Chevron image for a unit tier, e.g. `unit_chevron-02.png`
pub fn tier_chevron_path(tier: u8) -> String {
    format!("fs://game/unit_chevron-0{}.png", tier)
}
