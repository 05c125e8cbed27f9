//! Core domain types for Splice.
//!
//! This crate contains pure domain types with no IO and minimal dependencies:
//! identifiers for host entities and routines, content digests, target-group
//! selection and the resolved configuration snapshot.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod digest;
mod ids;
mod settings;
mod targets;

pub use digest::{ContentDigest, DigestComparison, ExpectedDigest};
pub use ids::{EntityId, RoutineName, RoutineNameError};
pub use settings::{
    ConfigurationSnapshot, DEFAULT_LINEAR_COST_PER_MINE, LINEAR_COST_PER_MINE_RANGE,
    MINE_COST_MULTIPLIER_RANGE, MiningSettings, NationSettings, PRODUCTION_MULTIPLIER_RANGE,
    ProductionInputs, REST_STATE_OFFSET_RANGE,
};
pub use targets::{ActorClass, ExclusiveTargets, TargetGroup, TargetGroups};
