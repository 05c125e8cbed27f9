//! Stability and diplomacy overrides on nations.

use splice_core::policy::offset_clamped;
use splice_core::{Completion, OverrideUnit, Routine, UnitFault};
use splice_types::{ExclusiveTargets, NationSettings};

use crate::host::NationState;

/// Bounds the host keeps rest states in.
const REST_STATE_BOUNDS: (f32, f32) = (0.0, 10.0);

/// Shifts a rest state by a configured offset.
///
/// Absorbed nations are left alone. The unclamped variant exists for the
/// host's own pre-clamp read, which must not be bounded early.
pub struct RestStateOffset {
    name: &'static str,
    offset: fn(&NationSettings) -> f32,
    clamped: bool,
}

impl RestStateOffset {
    #[must_use]
    pub fn unrest() -> Self {
        Self {
            name: "unrest_offset",
            offset: |nation| nation.unrest_offset,
            clamped: true,
        }
    }

    #[must_use]
    pub fn unrest_unclamped() -> Self {
        Self {
            name: "unrest_offset_unclamped",
            offset: |nation| nation.unrest_offset,
            clamped: false,
        }
    }

    #[must_use]
    pub fn cohesion() -> Self {
        Self {
            name: "cohesion_offset",
            offset: |nation| nation.cohesion_offset,
            clamped: true,
        }
    }
}

impl<R> OverrideUnit<R> for RestStateOffset
where
    R: Routine<Entity = dyn NationState, Output = f32>,
{
    type State = ();

    fn name(&self) -> &'static str {
        self.name
    }

    fn after(
        &self,
        done: &Completion<'_, R>,
        result: &mut f32,
        _state: Option<()>,
    ) -> Result<(), UnitFault> {
        let offset = (self.offset)(&done.config.nation);
        if offset.abs() < f32::EPSILON || !done.entity.is_extant() {
            return Ok(());
        }
        *result = if self.clamped {
            let (min, max) = REST_STATE_BOUNDS;
            offset_clamped(*result, offset, min, max)
        } else {
            *result + offset
        };
        Ok(())
    }
}

/// Forces a yes/no diplomacy check to a fixed answer for the configured scope.
pub struct ForcedVerdict {
    name: &'static str,
    scope: fn(&NationSettings) -> ExclusiveTargets,
    verdict: bool,
}

impl ForcedVerdict {
    /// Claims never anger the claimed nation.
    #[must_use]
    pub fn hostile_claims() -> Self {
        Self {
            name: "ignore_hostile_claims",
            scope: |nation| nation.ignore_hostile_claims,
            verdict: false,
        }
    }

    /// Relations can always be improved again.
    #[must_use]
    pub fn diplomatic_cooldowns() -> Self {
        Self {
            name: "ignore_diplomatic_cooldowns",
            scope: |nation| nation.ignore_diplomatic_cooldowns,
            verdict: true,
        }
    }

    /// Every other capital counts as claimed.
    #[must_use]
    pub fn capital_claims() -> Self {
        Self {
            name: "claim_all_capitals",
            scope: |nation| nation.claim_all_capitals,
            verdict: true,
        }
    }
}

impl<R> OverrideUnit<R> for ForcedVerdict
where
    R: Routine<Entity = dyn NationState, Output = bool>,
{
    type State = ();

    fn name(&self) -> &'static str {
        self.name
    }

    fn after(
        &self,
        done: &Completion<'_, R>,
        result: &mut bool,
        _state: Option<()>,
    ) -> Result<(), UnitFault> {
        let scope = (self.scope)(&done.config.nation);
        if scope.applies(done.entity.executive_is_player()) {
            *result = self.verdict;
        }
        Ok(())
    }
}
