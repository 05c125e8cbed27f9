//! The installed override layer, driven the way host hooks drive it.

use splice_core::Routine;
use splice_engine::routines::{
    CURRENT_NETWORK_SIZE, ClaimOnOtherCapital, ClaimWillBeHostile, MiningMultiplier,
    MissionControlCost, UnrestRestState, UnrestRestStateUnclamped,
};
use splice_engine::{OverrideLayer, PatchError, PinTable};
use splice_types::{
    ActorClass, ConfigurationSnapshot, EntityId, ExclusiveTargets, TargetGroup, TargetGroups,
};

use crate::common::{FakeHost, Faction, Nation, Population, installed_layer};

/// Host formula with a default parameter it consumes while computing.
fn host_mission_control(faction: &(dyn splice_engine::FactionState + 'static), mut size: i32) -> i32 {
    if size < 0 {
        size = faction.mine_network_size();
    }
    size -= 1;
    size.max(0) * 2
}

#[test]
fn linear_cost_then_global_multiplier() {
    let faction = Faction::new(1, ActorClass::Controlling).with_mines(14, 4);
    let (_host, layer) = installed_layer(&Population::of(&[&faction]));

    let mut config = ConfigurationSnapshot::default();
    config.mining.linear_cost_enabled = true;
    config.mining.linear_cost_per_mine = 3;
    config.mining.mine_cost_multiplier = 1.5;

    // (14 - 4) * 3 = 30, then round(45.0).
    let cost = layer.invoke::<MissionControlCost, _>(
        &faction,
        CURRENT_NETWORK_SIZE,
        &config,
        host_mission_control,
    );
    assert_eq!(cost, 45);
}

#[test]
fn master_switch_off_runs_host_formula() {
    let faction = Faction::new(1, ActorClass::Controlling).with_mines(14, 4);
    let (_host, layer) = installed_layer(&Population::of(&[&faction]));

    let mut config = ConfigurationSnapshot::default();
    config.enabled = false;
    config.mining.linear_cost_enabled = true;
    config.mining.mine_cost_multiplier = 2.0;

    let cost = layer.invoke::<MissionControlCost, _>(
        &faction,
        CURRENT_NETWORK_SIZE,
        &config,
        host_mission_control,
    );
    assert_eq!(cost, host_mission_control(&faction, CURRENT_NETWORK_SIZE));
}

#[test]
fn productivity_follows_classification_at_call_time() {
    let mut faction = Faction::new(1, ActorClass::Controlling);
    let (_host, layer) = installed_layer(&Population::of(&[&faction]));

    let mut config = ConfigurationSnapshot::default();
    config.mining.production_multiplier = 2.0;
    config.mining.production_targets = TargetGroups::NONE.with(TargetGroup::Player);

    let boosted = layer.invoke::<MiningMultiplier, _>(&faction, (), &config, |_, ()| 1.5);
    assert!((boosted - 3.0).abs() < f32::EPSILON);

    faction.class = ActorClass::Peer;
    let plain = layer.invoke::<MiningMultiplier, _>(&faction, (), &config, |_, ()| 1.5);
    assert!((plain - 1.5).abs() < f32::EPSILON);
}

#[test]
fn nation_overrides_compose_with_host_values() {
    let (_host, layer) = installed_layer(&Population::default());
    let player = Nation {
        id: EntityId::new(10),
        extant: true,
        player: true,
    };
    let rival = Nation {
        id: EntityId::new(11),
        extant: true,
        player: false,
    };

    let mut config = ConfigurationSnapshot::default();
    config.nation.unrest_offset = 4.0;
    config.nation.ignore_hostile_claims = ExclusiveTargets::PlayerOnly;
    config.nation.claim_all_capitals = ExclusiveTargets::All;

    let unrest = layer.invoke::<UnrestRestState, _>(&player, (), &config, |_, ()| 8.0);
    assert!((unrest - 10.0).abs() < f32::EPSILON);
    let raw = layer.invoke::<UnrestRestStateUnclamped, _>(&player, (), &config, |_, ()| 8.0);
    assert!((raw - 12.0).abs() < f32::EPSILON);

    assert!(!layer.invoke::<ClaimWillBeHostile, _>(&player, rival.id, &config, |_, _| true));
    assert!(layer.invoke::<ClaimWillBeHostile, _>(&rival, player.id, &config, |_, _| true));
    assert!(layer.invoke::<ClaimOnOtherCapital, _>(&rival, player.id, &config, |_, _| false));
}

#[test]
fn refused_install_leaves_host_unmodified() {
    let mut host = FakeHost::with_all_routines();
    host.refuse.insert(UnrestRestState::NAME.to_string());

    let result = OverrideLayer::install(
        &mut host,
        &PinTable::builtin(),
        Population::default().roster(),
    );

    assert!(matches!(result, Err(PatchError::Install { .. })));
    assert!(host.installed.is_empty());
}

#[test]
fn missing_routine_is_skipped_not_fatal() {
    let mut host = FakeHost::with_all_routines();
    host.bodies.remove(MiningMultiplier::NAME);

    let layer = OverrideLayer::install(
        &mut host,
        &PinTable::builtin(),
        Population::default().roster(),
    )
    .unwrap();

    assert!(!layer.is_installed(MiningMultiplier::NAME));
    assert!(layer.is_installed(MissionControlCost::NAME));
    assert_eq!(layer.verification().unverifiable().count(), 1);
}
