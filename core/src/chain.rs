//! Interception chains: ordered override units around one host routine.
//!
//! ```text
//! invoke(entity, args)
//!   -> resolve defaults
//!   -> before(U1) -> before(U2) -> ...     first Skip wins, later befores don't run
//!   -> original(entity, args)              only if nobody skipped
//!   -> after(U1, state1) -> after(U2, state2) -> ...
//! ```
//!
//! Each unit's captured state is handed back to that unit only. A unit that
//! fails (returns `Err` or panics) is contained: its after phase works on a
//! scratch copy of the result that is discarded, and a unit that fails in its
//! before phase does not run an after phase for that invocation.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use splice_types::ConfigurationSnapshot;
use thiserror::Error;

/// A host routine that can be intercepted.
pub trait Routine: 'static {
    /// The instance the routine runs on.
    type Entity: ?Sized;
    /// Input parameters. Cloned before the original runs, so captures
    /// survive the original mutating its own copy.
    type Args: Clone;
    type Output: Clone;

    const NAME: &'static str;

    /// Replace unresolved parameter defaults with concrete values.
    fn resolve_args(_entity: &Self::Entity, args: Self::Args) -> Self::Args {
        args
    }
}

/// Decision of one before phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Before<O, S> {
    Continue,
    /// Continue, keeping `S` for this unit's after phase.
    Capture(S),
    /// Skip the original and every later before phase, with this result.
    Skip(O),
}

/// One invocation as seen by override units.
pub struct Call<'a, R: Routine> {
    pub entity: &'a R::Entity,
    /// Arguments with defaults resolved, as they were at entry.
    pub args: &'a R::Args,
    pub config: &'a ConfigurationSnapshot,
}

impl<R: Routine> Clone for Call<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Routine> Copy for Call<'_, R> {}

/// What an after phase sees: the entity and configuration, but not the
/// arguments. Entry values reach the after phase only through the unit's own
/// captured state.
pub struct Completion<'a, R: Routine> {
    pub entity: &'a R::Entity,
    pub config: &'a ConfigurationSnapshot,
}

impl<R: Routine> Clone for Completion<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Routine> Copy for Completion<'_, R> {}

#[derive(Debug, Clone, Error)]
pub enum UnitFault {
    #[error("{message}")]
    Failed { message: String },
    #[error("panicked: {message}")]
    Panicked { message: String },
}

impl UnitFault {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Duplicate override unit {unit} on {routine}")]
    DuplicateUnit {
        routine: &'static str,
        unit: &'static str,
    },
}

/// One independently authored before/after pair.
pub trait OverrideUnit<R: Routine>: 'static {
    /// Value captured in the before phase and handed back to this unit's after phase.
    type State: 'static;

    fn name(&self) -> &'static str;

    fn before(&self, _call: &Call<'_, R>) -> Result<Before<R::Output, Self::State>, UnitFault> {
        Ok(Before::Continue)
    }

    /// Units that only act in the before phase can opt out of the after phase.
    fn observes_after(&self) -> bool {
        true
    }

    /// Keep running with the master switch off. For bookkeeping units that
    /// must see every call, such as recomputing values cached under the
    /// previous configuration.
    fn runs_when_disabled(&self) -> bool {
        false
    }

    /// `state` is `None` when the before phase captured nothing or never ran
    /// because an earlier unit skipped.
    fn after(
        &self,
        _done: &Completion<'_, R>,
        _result: &mut R::Output,
        _state: Option<Self::State>,
    ) -> Result<(), UnitFault> {
        Ok(())
    }
}

type BoxedState = Box<dyn Any>;

/// Object-safe view of an [`OverrideUnit`]; state crosses it boxed.
trait ErasedUnit<R: Routine> {
    fn name(&self) -> &'static str;
    fn observes_after(&self) -> bool;
    fn runs_when_disabled(&self) -> bool;
    fn before(&self, call: &Call<'_, R>) -> Result<Before<R::Output, BoxedState>, UnitFault>;
    fn after(
        &self,
        done: &Completion<'_, R>,
        result: &mut R::Output,
        state: Option<BoxedState>,
    ) -> Result<(), UnitFault>;
}

impl<R: Routine, U: OverrideUnit<R>> ErasedUnit<R> for U {
    fn name(&self) -> &'static str {
        <U as OverrideUnit<R>>::name(self)
    }

    fn observes_after(&self) -> bool {
        <U as OverrideUnit<R>>::observes_after(self)
    }

    fn runs_when_disabled(&self) -> bool {
        <U as OverrideUnit<R>>::runs_when_disabled(self)
    }

    fn before(&self, call: &Call<'_, R>) -> Result<Before<R::Output, BoxedState>, UnitFault> {
        Ok(match <U as OverrideUnit<R>>::before(self, call)? {
            Before::Continue => Before::Continue,
            Before::Capture(state) => Before::Capture(Box::new(state)),
            Before::Skip(output) => Before::Skip(output),
        })
    }

    fn after(
        &self,
        done: &Completion<'_, R>,
        result: &mut R::Output,
        state: Option<BoxedState>,
    ) -> Result<(), UnitFault> {
        // The box was produced by this same unit's before phase.
        let state = state
            .and_then(|boxed| boxed.downcast::<<U as OverrideUnit<R>>::State>().ok())
            .map(|boxed| *boxed);
        <U as OverrideUnit<R>>::after(self, done, result, state)
    }
}

/// Where a unit stands after the before phase of one invocation.
enum Slot {
    Ran(Option<BoxedState>),
    NotRun,
    Faulted,
    /// Switched off with the rest of the layer; no after phase either.
    Inactive,
}

/// Ordered override units for one routine.
pub struct InterceptionChain<R: Routine> {
    units: Vec<Box<dyn ErasedUnit<R>>>,
}

impl<R: Routine> Default for InterceptionChain<R> {
    fn default() -> Self {
        Self { units: Vec::new() }
    }
}

impl<R: Routine> fmt::Debug for InterceptionChain<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionChain")
            .field("routine", &R::NAME)
            .field("units", &self.unit_names())
            .finish()
    }
}

impl<R: Routine> InterceptionChain<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit. Registration order is execution order in both phases.
    pub fn register<U: OverrideUnit<R>>(&mut self, unit: U) -> Result<(), ChainError> {
        let name = <U as OverrideUnit<R>>::name(&unit);
        if self.units.iter().any(|existing| existing.name() == name) {
            return Err(ChainError::DuplicateUnit {
                routine: R::NAME,
                unit: name,
            });
        }
        self.units.push(Box::new(unit));
        Ok(())
    }

    pub fn with<U: OverrideUnit<R>>(mut self, unit: U) -> Result<Self, ChainError> {
        self.register(unit)?;
        Ok(self)
    }

    #[must_use]
    pub fn unit_names(&self) -> Vec<&'static str> {
        self.units.iter().map(|unit| unit.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Run the chain around `original`.
    ///
    /// With no units registered, this is exactly `original(entity, args)`. So
    /// it is with the master switch off, unless some unit
    /// [runs when disabled](OverrideUnit::runs_when_disabled).
    pub fn invoke<F>(
        &self,
        entity: &R::Entity,
        args: R::Args,
        config: &ConfigurationSnapshot,
        original: F,
    ) -> R::Output
    where
        F: FnOnce(&R::Entity, R::Args) -> R::Output,
    {
        let any_active =
            config.enabled || self.units.iter().any(|unit| unit.runs_when_disabled());
        if !any_active {
            return original(entity, args);
        }

        let raw_args = args.clone();
        let resolved = R::resolve_args(entity, args);
        let call = Call::<R> {
            entity,
            args: &resolved,
            config,
        };

        let mut slots = Vec::with_capacity(self.units.len());
        let mut replacement = None;
        for unit in &self.units {
            if !config.enabled && !unit.runs_when_disabled() {
                slots.push(Slot::Inactive);
                continue;
            }
            if replacement.is_some() {
                slots.push(Slot::NotRun);
                continue;
            }
            match contained(|| unit.before(&call)) {
                Ok(Before::Continue) => slots.push(Slot::Ran(None)),
                Ok(Before::Capture(state)) => slots.push(Slot::Ran(Some(state))),
                Ok(Before::Skip(output)) => {
                    tracing::debug!(routine = R::NAME, unit = unit.name(), "Original skipped");
                    slots.push(Slot::Ran(None));
                    replacement = Some(output);
                }
                Err(fault) => {
                    tracing::warn!(
                        "Override unit '{}' failed before {}: {fault}",
                        unit.name(),
                        R::NAME
                    );
                    slots.push(Slot::Faulted);
                }
            }
        }

        let done = Completion::<R> { entity, config };
        let mut result = match replacement {
            Some(output) => output,
            None => original(entity, raw_args),
        };

        for (unit, slot) in self.units.iter().zip(slots) {
            if !unit.observes_after() {
                continue;
            }
            let state = match slot {
                Slot::Ran(state) => state,
                Slot::NotRun => None,
                Slot::Faulted | Slot::Inactive => continue,
            };
            let mut scratch = result.clone();
            match contained(|| unit.after(&done, &mut scratch, state)) {
                Ok(()) => result = scratch,
                Err(fault) => {
                    tracing::warn!(
                        "Override unit '{}' failed after {}: {fault}",
                        unit.name(),
                        R::NAME
                    );
                }
            }
        }

        result
    }
}

/// Run one unit phase inside its own fault boundary.
fn contained<T>(phase: impl FnOnce() -> Result<T, UnitFault>) -> Result<T, UnitFault> {
    match catch_unwind(AssertUnwindSafe(phase)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(UnitFault::Panicked {
            message: panic_payload_to_string(&payload),
        }),
    }
}

fn panic_payload_to_string(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
