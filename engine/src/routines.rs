//! The host routines Splice intercepts.

use splice_core::Routine;
use splice_types::EntityId;

use crate::host::{FactionState, NationState};

/// Mission control required by a faction's mine network.
///
/// The argument is the network size; a negative value means "the faction's
/// current size" and is resolved before any override unit sees it.
pub struct MissionControlCost;

/// Sentinel for [`MissionControlCost`]'s defaulted argument.
pub const CURRENT_NETWORK_SIZE: i32 = -1;

impl Routine for MissionControlCost {
    type Entity = dyn FactionState;
    type Args = i32;
    type Output = i32;

    const NAME: &'static str = "FactionState.MissionControlCost(int)";

    fn resolve_args(entity: &Self::Entity, size: i32) -> i32 {
        if size < 0 { entity.mine_network_size() } else { size }
    }
}

/// A faction's mining productivity multiplier from orgs and effects.
pub struct MiningMultiplier;

impl Routine for MiningMultiplier {
    type Entity = dyn FactionState;
    type Args = ();
    type Output = f32;

    const NAME: &'static str = "FactionState.MiningMultiplier()";
}

/// Yearly income, read for every faction on a regular cadence.
pub struct YearlyIncome;

impl Routine for YearlyIncome {
    type Entity = dyn FactionState;
    type Args = ();
    type Output = f32;

    const NAME: &'static str = "FactionState.YearlyIncome()";
}

/// The unrest level a nation drifts towards, clamped by the host.
pub struct UnrestRestState;

impl Routine for UnrestRestState {
    type Entity = dyn NationState;
    type Args = ();
    type Output = f32;

    const NAME: &'static str = "NationState.UnrestRestState()";
}

/// The unrest rest state before the host's own clamp.
pub struct UnrestRestStateUnclamped;

impl Routine for UnrestRestStateUnclamped {
    type Entity = dyn NationState;
    type Args = ();
    type Output = f32;

    const NAME: &'static str = "NationState.UnrestRestStateUnclamped()";
}

pub struct CohesionRestState;

impl Routine for CohesionRestState {
    type Entity = dyn NationState;
    type Args = ();
    type Output = f32;

    const NAME: &'static str = "NationState.CohesionRestState()";
}

/// Whether claiming `target`'s territory would anger it. Argument: the
/// claimed nation.
pub struct ClaimWillBeHostile;

impl Routine for ClaimWillBeHostile {
    type Entity = dyn NationState;
    type Args = EntityId;
    type Output = bool;

    const NAME: &'static str = "NationState.ClaimWillBeHostile(NationState)";
}

pub struct CanImproveRelationsYet;

impl Routine for CanImproveRelationsYet {
    type Entity = dyn NationState;
    type Args = EntityId;
    type Output = bool;

    const NAME: &'static str = "NationState.CanImproveRelationsYet(NationState)";
}

pub struct ClaimOnOtherCapital;

impl Routine for ClaimOnOtherCapital {
    type Entity = dyn NationState;
    type Args = EntityId;
    type Output = bool;

    const NAME: &'static str = "NationState.ClaimOnOtherCapital(NationState)";
}

/// Every intercepted routine with its built-in fingerprint pin.
///
/// An empty pin means "not pinned yet".
pub const TARGETS: &[(&str, &str)] = &[
    (
        MissionControlCost::NAME,
        "A9B38584F8457697061D08116BFB03B113492B6A1C39AB1B950A21C13F425943",
    ),
    (MiningMultiplier::NAME, ""),
    (YearlyIncome::NAME, ""),
    (UnrestRestState::NAME, ""),
    (UnrestRestStateUnclamped::NAME, ""),
    (CohesionRestState::NAME, ""),
    (ClaimWillBeHostile::NAME, ""),
    (CanImproveRelationsYet::NAME, ""),
    (ClaimOnOtherCapital::NAME, ""),
];
