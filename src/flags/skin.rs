use bevy::prelude::*;

use crate::health::HealthBand;
use crate::snapshot::Relationship;

/// Icon frame style. At most one applies to a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconCategory {
    ArmyCommander,
    Combat,
    Civilian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerShape {
    Inner,
    Outer,
}

/// Decorative shape drawn behind a commander flag, one pair per army slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackLayer {
    pub shape: LayerShape,
    pub stack_offset: u32,
    pub tint: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthBar {
    pub band: HealthBand,
    pub fill_percent: f32,
}

impl Default for HealthBar {
    fn default() -> Self {
        Self {
            band: HealthBand::Healthy,
            fill_percent: 100.0,
        }
    }
}

/// Visual state of one flag, handed to the renderer as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSkin {
    pub primary: Color,
    pub secondary: Color,
    /// Selection highlight, only built for the viewer's own units.
    pub highlight: bool,
    /// Independent-power flags draw a hostile outline ring.
    pub hostile_outline: bool,
    pub icon: Option<String>,
    pub icon_category: Option<IconCategory>,
    pub owned: bool,
    pub tier_chevron: Option<String>,
    pub health: HealthBar,
    pub with_healthbar: bool,
    pub promotion_badge: Option<u32>,
    pub has_promotions: bool,
    pub tooltip: Vec<String>,
    pub hidden: bool,
    pub disabled: bool,
    pub no_movement: bool,
    /// Vertical offset of the container in pixels.
    pub top_px: f32,
    /// Army overlay in draw order; the first layer is drawn furthest back.
    pub stack_layers: Vec<StackLayer>,
    pub army_stats: Option<String>,
    pub affinity: Option<Relationship>,
}

impl FlagSkin {
    pub fn new(primary: Color, secondary: Color) -> Self {
        Self {
            primary,
            secondary,
            highlight: false,
            hostile_outline: false,
            icon: None,
            icon_category: None,
            owned: false,
            tier_chevron: None,
            health: HealthBar::default(),
            with_healthbar: false,
            promotion_badge: None,
            has_promotions: false,
            tooltip: Vec::new(),
            hidden: false,
            disabled: false,
            no_movement: false,
            top_px: 0.0,
            stack_layers: Vec::new(),
            army_stats: None,
            affinity: None,
        }
    }
}
