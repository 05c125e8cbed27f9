//! Settings commits reaching cached incomes through the yearly income read.

use splice_engine::SettingsPanel;
use splice_engine::routines::YearlyIncome;
use splice_types::{ActorClass, ConfigurationSnapshot, EntityId};

use crate::common::{Faction, Population, installed_layer};

fn read_income(layer: &splice_engine::OverrideLayer, faction: &Faction, config: &ConfigurationSnapshot) {
    let income = layer.invoke::<YearlyIncome, _>(faction, (), config, |_, ()| 250.0);
    assert!((income - 250.0).abs() < f32::EPSILON);
}

#[test]
fn committed_change_refreshes_each_faction_once() {
    let a = Faction::new(1, ActorClass::Controlling);
    let b = Faction::new(2, ActorClass::Peer);
    let c = Faction::new(3, ActorClass::Adversarial);
    let (_host, layer) = installed_layer(&Population::of(&[&a, &b, &c]));
    let mut config = ConfigurationSnapshot::default();
    let mut panel = SettingsPanel::new();

    panel.open(&config);
    config.mining.production_multiplier = 1.5;
    assert!(panel.close(&config, &mut layer.dirty().borrow_mut()));

    for faction in [&a, &b, &c, &a] {
        read_income(&layer, faction, &config);
    }

    assert_eq!(a.refreshes.get(), 1);
    assert_eq!(b.refreshes.get(), 1);
    assert_eq!(c.refreshes.get(), 1);
}

#[test]
fn closing_without_relevant_change_refreshes_nothing() {
    let a = Faction::new(1, ActorClass::Controlling);
    let (_host, layer) = installed_layer(&Population::of(&[&a]));
    let mut config = ConfigurationSnapshot::default();
    let mut panel = SettingsPanel::new();

    panel.open(&config);
    config.nation.cohesion_offset = 2.0;
    assert!(!panel.close(&config, &mut layer.dirty().borrow_mut()));

    read_income(&layer, &a, &config);
    assert_eq!(a.refreshes.get(), 0);
}

#[test]
fn faction_founded_after_expansion_is_not_refreshed() {
    let a = Faction::new(1, ActorClass::Controlling);
    let population = Population::of(&[&a]);
    let (_host, layer) = installed_layer(&population);
    let config = ConfigurationSnapshot::default();

    layer.dirty().borrow_mut().mark_all_dirty();
    read_income(&layer, &a, &config);

    let newcomer = Faction::new(2, ActorClass::Peer);
    population.add(&newcomer);
    read_income(&layer, &newcomer, &config);

    assert_eq!(a.refreshes.get(), 1);
    assert_eq!(newcomer.refreshes.get(), 0);
}

#[test]
fn two_commits_before_any_read_refresh_once() {
    let a = Faction::new(1, ActorClass::Controlling);
    let (_host, layer) = installed_layer(&Population::of(&[&a]));
    let config = ConfigurationSnapshot::default();

    layer.dirty().borrow_mut().mark_all_dirty();
    layer.dirty().borrow_mut().mark_all_dirty();
    for _ in 0..4 {
        read_income(&layer, &a, &config);
    }

    assert_eq!(a.refreshes.get(), 1);
    assert!(!layer.dirty().borrow().is_dirty(EntityId::new(1)));
}

#[test]
fn switching_off_still_refreshes_cached_incomes() {
    let a = Faction::new(1, ActorClass::Controlling);
    let (_host, layer) = installed_layer(&Population::of(&[&a]));
    let mut config = ConfigurationSnapshot::default();
    config.mining.production_multiplier = 2.0;
    let mut panel = SettingsPanel::new();

    panel.open(&config);
    config.enabled = false;
    assert!(panel.close(&config, &mut layer.dirty().borrow_mut()));

    for _ in 0..3 {
        read_income(&layer, &a, &config);
    }

    assert_eq!(a.refreshes.get(), 1);
    assert!(!layer.dirty().borrow().is_pending());
}
