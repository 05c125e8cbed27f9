//! Resolved override configuration.
//!
//! These are the values the override units read on every call. Raw TOML
//! structs (with `Option` fields) stay private in `splice-config`; the loader
//! resolves them into these types at the parse boundary.

use crate::targets::{ExclusiveTargets, TargetGroups};

pub const LINEAR_COST_PER_MINE_RANGE: (i32, i32) = (1, 15);
pub const DEFAULT_LINEAR_COST_PER_MINE: i32 = 6;
pub const MINE_COST_MULTIPLIER_RANGE: (f32, f32) = (0.0, 2.0);
pub const PRODUCTION_MULTIPLIER_RANGE: (f32, f32) = (0.0, 10.0);
pub const REST_STATE_OFFSET_RANGE: (f32, f32) = (-10.0, 10.0);

/// Read-only view of the override configuration for the duration of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationSnapshot {
    /// Master switch. When off, every routine behaves as if unmodified.
    pub enabled: bool,
    pub mining: MiningSettings,
    pub nation: NationSettings,
}

impl Default for ConfigurationSnapshot {
    fn default() -> Self {
        Self {
            enabled: true,
            mining: MiningSettings::default(),
            nation: NationSettings::default(),
        }
    }
}

impl ConfigurationSnapshot {
    /// Clamp every numeric field into the range the settings surface offers.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            enabled: self.enabled,
            mining: self.mining.normalized(),
            nation: self.nation.normalized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiningSettings {
    /// Replace the host's mine upkeep formula with a linear one above the free allowance.
    pub linear_cost_enabled: bool,
    pub linear_cost_per_mine: i32,
    /// Applied to the final mine upkeep; 1.0 disables it.
    pub mine_cost_multiplier: f32,
    /// Applied to mining productivity of the selected groups; 1.0 disables it.
    pub production_multiplier: f32,
    pub production_targets: TargetGroups,
}

impl Default for MiningSettings {
    fn default() -> Self {
        Self {
            linear_cost_enabled: false,
            linear_cost_per_mine: DEFAULT_LINEAR_COST_PER_MINE,
            mine_cost_multiplier: 1.0,
            production_multiplier: 1.0,
            production_targets: TargetGroups::NONE,
        }
    }
}

impl MiningSettings {
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            linear_cost_per_mine: self
                .linear_cost_per_mine
                .clamp(LINEAR_COST_PER_MINE_RANGE.0, LINEAR_COST_PER_MINE_RANGE.1),
            mine_cost_multiplier: clamp_finite(
                self.mine_cost_multiplier,
                MINE_COST_MULTIPLIER_RANGE,
                1.0,
            ),
            production_multiplier: clamp_finite(
                self.production_multiplier,
                PRODUCTION_MULTIPLIER_RANGE,
                1.0,
            ),
            ..self
        }
    }

    /// The fields a cached per-entity income depends on.
    #[must_use]
    pub fn production_inputs(&self) -> ProductionInputs {
        ProductionInputs {
            multiplier: self.production_multiplier,
            targets: self.production_targets,
        }
    }
}

/// Inputs to the host's cached mining income; a change invalidates every
/// entity's cached value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionInputs {
    pub multiplier: f32,
    pub targets: TargetGroups,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NationSettings {
    pub unrest_offset: f32,
    pub cohesion_offset: f32,
    pub ignore_hostile_claims: ExclusiveTargets,
    pub ignore_diplomatic_cooldowns: ExclusiveTargets,
    pub claim_all_capitals: ExclusiveTargets,
}

impl NationSettings {
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            unrest_offset: clamp_finite(self.unrest_offset, REST_STATE_OFFSET_RANGE, 0.0),
            cohesion_offset: clamp_finite(self.cohesion_offset, REST_STATE_OFFSET_RANGE, 0.0),
            ..self
        }
    }
}

fn clamp_finite(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
