//! Shared test utilities and fixtures
//!
//! A scripted host: routine bodies keyed by name, factions and nations with
//! observable side effects.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use splice_core::{RoutineBody, TargetRoutine};
use splice_engine::routines::TARGETS;
use splice_engine::{
    FactionRoster, FactionState, InstallError, Interceptor, NationState, OverrideLayer, PinTable,
};
use splice_types::{ActorClass, EntityId, RoutineName};

/// Host whose routines all resolve to a distinct body.
#[derive(Default)]
pub struct FakeHost {
    pub bodies: HashMap<String, Vec<u8>>,
    pub refuse: HashSet<String>,
    pub installed: Vec<String>,
}

impl FakeHost {
    pub fn with_all_routines() -> Self {
        let bodies = TARGETS
            .iter()
            .map(|(name, _)| ((*name).to_string(), format!("IL of {name}").into_bytes()))
            .collect();
        Self {
            bodies,
            ..Self::default()
        }
    }
}

impl Interceptor for FakeHost {
    fn resolve(&self, routine: &RoutineName) -> Option<Arc<dyn RoutineBody>> {
        self.bodies
            .get(routine.as_str())
            .map(|body| Arc::new(body.clone()) as Arc<dyn RoutineBody>)
    }

    fn install(&mut self, routine: &TargetRoutine) -> Result<(), InstallError> {
        if self.refuse.contains(routine.name().as_str()) {
            return Err(InstallError::new("routine is inlined"));
        }
        self.installed.push(routine.name().as_str().to_string());
        Ok(())
    }

    fn uninstall(&mut self, routine: &RoutineName) {
        self.installed.retain(|name| name != routine.as_str());
    }
}

pub struct Faction {
    pub id: EntityId,
    pub class: ActorClass,
    pub mines: i32,
    pub free: i32,
    pub refreshes: Cell<u32>,
}

impl Faction {
    pub fn new(id: u64, class: ActorClass) -> Self {
        Self {
            id: EntityId::new(id),
            class,
            mines: 0,
            free: 0,
            refreshes: Cell::new(0),
        }
    }

    pub fn with_mines(mut self, mines: i32, free: i32) -> Self {
        self.mines = mines;
        self.free = free;
        self
    }
}

impl FactionState for Faction {
    fn id(&self) -> EntityId {
        self.id
    }
    fn class(&self) -> ActorClass {
        self.class
    }
    fn mine_network_size(&self) -> i32 {
        self.mines
    }
    fn free_mine_allowance(&self) -> i32 {
        self.free
    }
    fn refresh_resource_income(&self) {
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

pub struct Nation {
    pub id: EntityId,
    pub extant: bool,
    pub player: bool,
}

impl NationState for Nation {
    fn id(&self) -> EntityId {
        self.id
    }
    fn is_extant(&self) -> bool {
        self.extant
    }
    fn executive_is_player(&self) -> bool {
        self.player
    }
}

/// A faction population that tests can grow after installation.
#[derive(Clone, Default)]
pub struct Population(Rc<RefCell<Vec<EntityId>>>);

impl Population {
    pub fn of(factions: &[&Faction]) -> Self {
        Self(Rc::new(RefCell::new(
            factions.iter().map(|faction| faction.id).collect(),
        )))
    }

    pub fn add(&self, faction: &Faction) {
        self.0.borrow_mut().push(faction.id);
    }

    pub fn roster(&self) -> Rc<dyn FactionRoster> {
        let ids = Rc::clone(&self.0);
        Rc::new(move || ids.borrow().clone())
    }
}

/// Install with built-in pins on a host that has every routine.
pub fn installed_layer(population: &Population) -> (FakeHost, OverrideLayer) {
    let mut host = FakeHost::with_all_routines();
    let layer = OverrideLayer::install(&mut host, &PinTable::builtin(), population.roster())
        .expect("install on a cooperative host");
    (host, layer)
}
