//! What the host has to provide.
//!
//! The engine never reaches into host internals. Entities are seen through
//! these traits, and installing an override on a host routine goes through
//! [`Interceptor`].

use std::sync::Arc;

use splice_core::{RoutineBody, TargetRoutine};
use splice_types::{ActorClass, EntityId, RoutineName};
use thiserror::Error;

/// A faction as seen by the mining and income overrides.
pub trait FactionState {
    fn id(&self) -> EntityId;

    /// Classification at the moment of the call. Re-read on every invocation.
    fn class(&self) -> ActorClass;

    fn mine_network_size(&self) -> i32;

    /// Mines that carry no mission control cost.
    fn free_mine_allowance(&self) -> i32;

    /// Invalidate the cached resource income and recompute it, including
    /// every owned habitat's annual net income.
    fn refresh_resource_income(&self);
}

/// A nation as seen by the stability and diplomacy overrides.
pub trait NationState {
    fn id(&self) -> EntityId;

    /// False once the nation has been absorbed or destroyed.
    fn is_extant(&self) -> bool;

    /// Whether the nation's executive faction is the local player.
    fn executive_is_player(&self) -> bool;
}

/// The current faction population, read when a pending commit is expanded.
pub trait FactionRoster {
    fn faction_ids(&self) -> Vec<EntityId>;
}

impl<F> FactionRoster for F
where
    F: Fn() -> Vec<EntityId>,
{
    fn faction_ids(&self) -> Vec<EntityId> {
        self()
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InstallError {
    pub message: String,
}

impl InstallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The host's interception mechanism.
pub trait Interceptor {
    /// Find a routine by name. `None` when this host build doesn't have it.
    fn resolve(&self, routine: &RoutineName) -> Option<Arc<dyn RoutineBody>>;

    /// Route calls of `routine` through its interception chain.
    fn install(&mut self, routine: &TargetRoutine) -> Result<(), InstallError>;

    fn uninstall(&mut self, routine: &RoutineName);
}
