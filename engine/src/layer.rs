//! The override layer: every interception chain, installed as one unit.
//!
//! Construction IS installation. [`OverrideLayer::install`] verifies
//! fingerprints, then routes each resolvable routine through its chain. If the
//! host refuses any routine, everything already installed is rolled back and
//! the host runs unmodified.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use splice_core::{
    ChainError, DirtyRecompute, FingerprintError, FingerprintRecord, FingerprintRegistry,
    InterceptionChain, Routine, TargetRoutine, VerificationReport,
};
use splice_types::{ConfigurationSnapshot, ExpectedDigest, RoutineName, RoutineNameError};
use thiserror::Error;

use crate::host::{FactionRoster, InstallError, Interceptor};
use crate::mining::{IncomeRecalc, LinearMineCost, MineCostMultiplier, MineProductivity};
use crate::nation::{ForcedVerdict, RestStateOffset};
use crate::routines::{
    CanImproveRelationsYet, ClaimOnOtherCapital, ClaimWillBeHostile, CohesionRestState,
    MiningMultiplier, MissionControlCost, TARGETS, UnrestRestState, UnrestRestStateUnclamped,
    YearlyIncome,
};

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Failed to install override on {routine}: {source}")]
    Install {
        routine: RoutineName,
        #[source]
        source: InstallError,
    },
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    #[error("Invalid target routine: {0}")]
    Target(#[from] RoutineNameError),
}

/// Expected fingerprints per routine name.
#[derive(Debug, Clone, Default)]
pub struct PinTable {
    pins: BTreeMap<String, ExpectedDigest>,
}

impl PinTable {
    /// The pins shipped with Splice.
    #[must_use]
    pub fn builtin() -> Self {
        let pins = TARGETS
            .iter()
            .map(|(name, pin)| ((*name).to_string(), ExpectedDigest::parse(pin)))
            .collect();
        Self { pins }
    }

    /// Replace the pin for `routine`. An empty digest unpins it.
    pub fn pin(&mut self, routine: &str, expected: ExpectedDigest) {
        self.pins.insert(routine.to_string(), expected);
    }

    #[must_use]
    pub fn expected(&self, routine: &str) -> ExpectedDigest {
        self.pins
            .get(routine)
            .cloned()
            .unwrap_or(ExpectedDigest::Unpinned)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExpectedDigest)> {
        self.pins.iter().map(|(name, pin)| (name.as_str(), pin))
    }
}

/// Typed access to the chain for routine `R`.
pub trait Intercepts<R: Routine> {
    fn chain(&self) -> &InterceptionChain<R>;
}

pub struct OverrideLayer {
    mission_control_cost: InterceptionChain<MissionControlCost>,
    mining_multiplier: InterceptionChain<MiningMultiplier>,
    yearly_income: InterceptionChain<YearlyIncome>,
    unrest_rest_state: InterceptionChain<UnrestRestState>,
    unrest_rest_state_unclamped: InterceptionChain<UnrestRestStateUnclamped>,
    cohesion_rest_state: InterceptionChain<CohesionRestState>,
    claim_will_be_hostile: InterceptionChain<ClaimWillBeHostile>,
    can_improve_relations_yet: InterceptionChain<CanImproveRelationsYet>,
    claim_on_other_capital: InterceptionChain<ClaimOnOtherCapital>,
    /// Routines currently routed through their chain, in install order.
    installed: Vec<RoutineName>,
    dirty: Rc<RefCell<DirtyRecompute>>,
    verification: VerificationReport,
}

macro_rules! intercepts {
    ($($routine:ty => $field:ident),* $(,)?) => {
        $(
            impl Intercepts<$routine> for OverrideLayer {
                fn chain(&self) -> &InterceptionChain<$routine> {
                    &self.$field
                }
            }
        )*
    };
}

intercepts! {
    MissionControlCost => mission_control_cost,
    MiningMultiplier => mining_multiplier,
    YearlyIncome => yearly_income,
    UnrestRestState => unrest_rest_state,
    UnrestRestStateUnclamped => unrest_rest_state_unclamped,
    CohesionRestState => cohesion_rest_state,
    ClaimWillBeHostile => claim_will_be_hostile,
    CanImproveRelationsYet => can_improve_relations_yet,
    ClaimOnOtherCapital => claim_on_other_capital,
}

impl OverrideLayer {
    /// Verify, then install every resolvable routine.
    ///
    /// Fingerprint mismatches and unresolved routines are logged and never
    /// fatal. An install failure rolls back and returns the error.
    pub fn install(
        interceptor: &mut dyn Interceptor,
        pins: &PinTable,
        roster: Rc<dyn FactionRoster>,
    ) -> Result<Self, PatchError> {
        let dirty = Rc::new(RefCell::new(DirtyRecompute::new()));
        let mission_control_cost = InterceptionChain::new()
            .with(LinearMineCost)?
            .with(MineCostMultiplier)?;
        let mining_multiplier = InterceptionChain::new().with(MineProductivity)?;
        let yearly_income =
            InterceptionChain::new().with(IncomeRecalc::new(Rc::clone(&dirty), roster))?;
        let unrest_rest_state = InterceptionChain::new().with(RestStateOffset::unrest())?;
        let unrest_rest_state_unclamped =
            InterceptionChain::new().with(RestStateOffset::unrest_unclamped())?;
        let cohesion_rest_state = InterceptionChain::new().with(RestStateOffset::cohesion())?;
        let claim_will_be_hostile =
            InterceptionChain::new().with(ForcedVerdict::hostile_claims())?;
        let can_improve_relations_yet =
            InterceptionChain::new().with(ForcedVerdict::diplomatic_cooldowns())?;
        let claim_on_other_capital =
            InterceptionChain::new().with(ForcedVerdict::capital_claims())?;

        let mut registry = FingerprintRegistry::new();
        for (name, _) in TARGETS {
            let name = RoutineName::new(*name)?;
            let target = match interceptor.resolve(&name) {
                Some(handle) => TargetRoutine::resolved(name, handle),
                None => TargetRoutine::unresolved(name),
            };
            let expected = pins.expected(target.name().as_str());
            registry.register(FingerprintRecord::new(target, expected))?;
        }
        let verification = registry.verify_all();
        if let Some(actual) = verification.first_mismatch_digest() {
            tracing::warn!(
                "Host routines changed since these overrides were written; results may be wrong (first actual fingerprint: {actual})"
            );
        }

        let mut installed: Vec<RoutineName> = Vec::new();
        for record in registry.records() {
            let target = &record.target;
            if !target.is_resolved() {
                tracing::warn!("Routine '{}' not found; running it unmodified", target.name());
                continue;
            }
            if let Err(source) = interceptor.install(target) {
                tracing::error!(
                    "Failed to install override on '{}': {source}. Rolling back; the host runs unmodified.",
                    target.name()
                );
                for name in installed.iter().rev() {
                    interceptor.uninstall(name);
                }
                return Err(PatchError::Install {
                    routine: target.name().clone(),
                    source,
                });
            }
            installed.push(target.name().clone());
        }

        tracing::info!(
            "Override layer installed on {} of {} routines",
            installed.len(),
            TARGETS.len()
        );

        Ok(Self {
            mission_control_cost,
            mining_multiplier,
            yearly_income,
            unrest_rest_state,
            unrest_rest_state_unclamped,
            cohesion_rest_state,
            claim_will_be_hostile,
            can_improve_relations_yet,
            claim_on_other_capital,
            installed,
            dirty,
            verification,
        })
    }

    /// Route one host call of `R` through its chain.
    ///
    /// A routine that isn't installed runs `original` directly.
    pub fn invoke<R, F>(
        &self,
        entity: &R::Entity,
        args: R::Args,
        config: &ConfigurationSnapshot,
        original: F,
    ) -> R::Output
    where
        R: Routine,
        Self: Intercepts<R>,
        F: FnOnce(&R::Entity, R::Args) -> R::Output,
    {
        if !self.is_installed(R::NAME) {
            return original(entity, args);
        }
        <Self as Intercepts<R>>::chain(self).invoke(entity, args, config, original)
    }

    #[must_use]
    pub fn is_installed(&self, routine: &str) -> bool {
        self.installed.iter().any(|name| name.as_str() == routine)
    }

    #[must_use]
    pub fn installed(&self) -> &[RoutineName] {
        &self.installed
    }

    #[must_use]
    pub fn verification(&self) -> &VerificationReport {
        &self.verification
    }

    /// Shared with the settings surface, which marks everything dirty on commit.
    #[must_use]
    pub fn dirty(&self) -> Rc<RefCell<DirtyRecompute>> {
        Rc::clone(&self.dirty)
    }

    /// Remove every override, newest first.
    pub fn uninstall(self, interceptor: &mut dyn Interceptor) {
        for name in self.installed.iter().rev() {
            interceptor.uninstall(name);
        }
        tracing::info!("Override layer uninstalled");
    }
}
