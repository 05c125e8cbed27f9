//! Splice's override units and the layer that installs them.
//!
//! This crate knows the host routines by name and shape, and nothing about how
//! the host hooks them: that is behind [`Interceptor`]. Entities are reached
//! through [`FactionState`] and [`NationState`].

mod host;
mod layer;
mod mining;
mod nation;
mod panel;
pub mod routines;

pub use host::{FactionRoster, FactionState, InstallError, Interceptor, NationState};
pub use layer::{Intercepts, OverrideLayer, PatchError, PinTable};
pub use mining::{IncomeRecalc, LinearMineCost, MineCostMultiplier, MineProductivity};
pub use nation::{ForcedVerdict, RestStateOffset};
pub use panel::SettingsPanel;
