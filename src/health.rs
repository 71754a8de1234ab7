use crate::settings::FlagSettings;

/// Damage state of a unit as reported by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub damage: u32,
    pub max_damage: u32,
}

/// Color band of the flag health bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthBand {
    #[default]
    Healthy,
    Medium,
    Low,
}

impl HealthSnapshot {
    pub fn new(damage: u32, max_damage: u32) -> Self {
        Self { damage, max_damage }
    }

    pub fn is_damaged(&self) -> bool {
        self.damage > 0
    }

    /// Remaining health in `[0, 1]`. A unit without a usable maximum counts
    /// as fully healthy, and overkill damage clamps to zero.
    pub fn fraction(&self) -> f32 {
        if self.max_damage == 0 {
            return 1.0;
        }
        let remaining = self.max_damage as f32 - self.damage as f32;
        (remaining / self.max_damage as f32).clamp(0.0, 1.0)
    }
}

/// Remaining health fraction, treating units without health as full.
pub fn health_fraction(health: Option<HealthSnapshot>) -> f32 {
    health.map_or(1.0, |h| h.fraction())
}

impl HealthBand {
    pub fn from_fraction(fraction: f32, settings: &FlagSettings) -> Self {
        if fraction > settings.medium_health_threshold {
            HealthBand::Healthy
        } else if fraction >= settings.low_health_threshold {
            HealthBand::Medium
        } else {
            HealthBand::Low
        }
    }
}

/// Width of the bar fill in percent.
pub fn fill_percent(fraction: f32) -> f32 {
    (fraction.clamp(0.0, 1.0) * 100.0).clamp(0.0, 100.0)
}
