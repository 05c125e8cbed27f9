//! Mining and income overrides on factions.

use std::cell::RefCell;
use std::rc::Rc;

use splice_core::policy::{apply_multiplier, linear_cost};
use splice_core::{Before, Call, Completion, DirtyRecompute, OverrideUnit, UnitFault};

use crate::host::FactionRoster;
use crate::routines::{MiningMultiplier, MissionControlCost, YearlyIncome};

/// Replaces the host's mission control cost with a flat per-mine cost above
/// the free allowance.
///
/// The host decrements its own network size parameter while computing, so the
/// entry value is captured in the before phase.
pub struct LinearMineCost;

impl OverrideUnit<MissionControlCost> for LinearMineCost {
    type State = i32;

    fn name(&self) -> &'static str {
        "linear_mine_cost"
    }

    fn before(
        &self,
        call: &Call<'_, MissionControlCost>,
    ) -> Result<Before<i32, i32>, UnitFault> {
        Ok(Before::Capture(*call.args))
    }

    fn after(
        &self,
        done: &Completion<'_, MissionControlCost>,
        result: &mut i32,
        state: Option<i32>,
    ) -> Result<(), UnitFault> {
        let mining = &done.config.mining;
        if !mining.linear_cost_enabled {
            return Ok(());
        }
        let Some(size) = state else {
            return Err(UnitFault::failed("network size was not captured"));
        };
        *result = linear_cost(
            size,
            done.entity.free_mine_allowance(),
            mining.linear_cost_per_mine,
        );
        Ok(())
    }
}

/// Global multiplier on whatever mission control cost is present by now.
pub struct MineCostMultiplier;

impl OverrideUnit<MissionControlCost> for MineCostMultiplier {
    type State = ();

    fn name(&self) -> &'static str {
        "mine_cost_multiplier"
    }

    fn after(
        &self,
        done: &Completion<'_, MissionControlCost>,
        result: &mut i32,
        _state: Option<()>,
    ) -> Result<(), UnitFault> {
        let multiplier = done.config.mining.mine_cost_multiplier;
        if !is_identity(multiplier) {
            *result = apply_multiplier(*result, multiplier);
        }
        Ok(())
    }
}

/// Scales mining productivity for factions in the configured target groups.
pub struct MineProductivity;

impl OverrideUnit<MiningMultiplier> for MineProductivity {
    type State = ();

    fn name(&self) -> &'static str {
        "mine_productivity"
    }

    fn after(
        &self,
        done: &Completion<'_, MiningMultiplier>,
        result: &mut f32,
        _state: Option<()>,
    ) -> Result<(), UnitFault> {
        let mining = &done.config.mining;
        if is_identity(mining.production_multiplier) {
            return Ok(());
        }
        if mining.production_targets.matches(done.entity.class()) {
            *result *= mining.production_multiplier;
        }
        Ok(())
    }
}

/// Refreshes a faction's cached income once after a production commit.
///
/// Rides on the yearly income read, which the host performs for every
/// faction on a regular cadence. The income value itself is left alone. Runs
/// with the master switch off too, since switching off is itself a commit.
pub struct IncomeRecalc {
    dirty: Rc<RefCell<DirtyRecompute>>,
    roster: Rc<dyn FactionRoster>,
}

impl IncomeRecalc {
    pub fn new(dirty: Rc<RefCell<DirtyRecompute>>, roster: Rc<dyn FactionRoster>) -> Self {
        Self { dirty, roster }
    }
}

impl OverrideUnit<YearlyIncome> for IncomeRecalc {
    type State = ();

    fn name(&self) -> &'static str {
        "income_recalc"
    }

    fn runs_when_disabled(&self) -> bool {
        true
    }

    fn after(
        &self,
        done: &Completion<'_, YearlyIncome>,
        _result: &mut f32,
        _state: Option<()>,
    ) -> Result<(), UnitFault> {
        let faction = done.entity;
        let Ok(mut dirty) = self.dirty.try_borrow_mut() else {
            return Err(UnitFault::failed("dirty set is already borrowed"));
        };
        let recomputed = dirty.check_and_clear(
            faction.id(),
            || self.roster.faction_ids(),
            || faction.refresh_resource_income(),
        );
        if recomputed {
            tracing::debug!(faction = %faction.id(), "Resource income refreshed");
        }
        Ok(())
    }
}

/// Exactly 1.0. The settings surface produces exact slider values.
#[allow(clippy::float_cmp)]
fn is_identity(multiplier: f32) -> bool {
    multiplier == 1.0
}
