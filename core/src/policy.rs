//! Numeric policies shared by override units.
//!
//! All rounding is half away from zero (`f64::round`), applied once per
//! multiplier in chain order.

/// Linear cost above a free allowance: `max(0, raw_size - free_allowance) * per_unit_cost`.
///
/// Never negative; a non-positive `per_unit_cost` yields zero.
#[must_use]
pub fn linear_cost(raw_size: i32, free_allowance: i32, per_unit_cost: i32) -> i32 {
    let chargeable = raw_size.saturating_sub(free_allowance).max(0);
    chargeable.saturating_mul(per_unit_cost.max(0))
}

/// `round(value * multiplier)`, rounding half away from zero.
///
/// Saturates at the `i32` bounds; a NaN multiplier leaves the value unchanged.
#[must_use]
pub fn apply_multiplier(value: i32, multiplier: f32) -> i32 {
    if multiplier.is_nan() {
        return value;
    }
    (f64::from(value) * f64::from(multiplier)).round() as i32
}

/// Apply each multiplier in order, rounding after every step.
#[must_use]
pub fn apply_multipliers(value: i32, multipliers: &[f32]) -> i32 {
    multipliers
        .iter()
        .fold(value, |acc, &multiplier| apply_multiplier(acc, multiplier))
}

/// Shift `value` by `offset` and clamp to `[min, max]`.
#[must_use]
pub fn offset_clamped(value: f32, offset: f32, min: f32, max: f32) -> f32 {
    (value + offset).clamp(min, max)
}
