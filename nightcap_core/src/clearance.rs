//! Clearance model: when is breastmilk presumed alcohol-free?
//!
//! Clearance is treated as starting at the end of the drinking window and
//! accruing linearly per standard drink (10 g alcohol) at a weight-adjusted
//! rate, then padded by an explicit safety buffer. This is a deliberately
//! conservative simplification of first-order elimination kinetics, not a
//! pharmacokinetic simulation.

use crate::{DrinkPlan, Error, Profile, Result};
use chrono::{DateTime, Duration, Utc};

/// Hours to clear one standard drink when body weight is unknown
pub const DEFAULT_HOURS_PER_DRINK: f64 = 2.0;

// Nomogram endpoints; weights outside this range are clamped.
const MIN_WEIGHT_KG: f64 = 40.0;
const MAX_WEIGHT_KG: f64 = 150.0;
const HOURS_AT_MIN_WEIGHT: f64 = 2.6;
const HOURS_AT_MAX_WEIGHT: f64 = 1.6;

/// Hours needed to clear one standard drink from breastmilk.
///
/// Linear nomogram, non-increasing in body weight over the plausible adult
/// range. Unknown weight falls back to [`DEFAULT_HOURS_PER_DRINK`].
pub fn hours_per_standard_drink(weight_kg: Option<f64>) -> f64 {
    let Some(weight) = weight_kg else {
        return DEFAULT_HOURS_PER_DRINK;
    };

    let clamped = weight.clamp(MIN_WEIGHT_KG, MAX_WEIGHT_KG);
    let t = (clamped - MIN_WEIGHT_KG) / (MAX_WEIGHT_KG - MIN_WEIGHT_KG);
    HOURS_AT_MIN_WEIGHT + t * (HOURS_AT_MAX_WEIGHT - HOURS_AT_MIN_WEIGHT)
}

/// Apply the profile's conservative multiplier; factors below 1.0 never
/// shorten the estimate.
pub fn apply_conservative_factor(hours: f64, factor: f64) -> f64 {
    hours * factor.max(1.0)
}

/// Earliest timestamp at which feeding is presumed safe for the given plan.
///
/// `window_end + drinks * per_drink_hours + safety_buffer`. Monotonically
/// non-decreasing in drink count and pace duration for a fixed profile.
pub fn compute_safe_feed_at(plan: &DrinkPlan, profile: &Profile) -> Result<DateTime<Utc>> {
    plan.validate()?;
    profile.validate()?;

    let per_drink_hours = apply_conservative_factor(
        hours_per_standard_drink(profile.weight_kg),
        profile.conservative_factor,
    );
    let clearance_secs = (plan.drinks as f64 * per_drink_hours * 3600.0).round() as i64;

    // Checked arithmetic: a start time near the edge of the representable
    // range must surface as invalid input, not a panic.
    let out_of_range = || Error::InvalidPlan("plan extends beyond the supported time range".into());
    let window_end = plan
        .start_at
        .checked_add_signed(plan.pace.duration())
        .ok_or_else(out_of_range)?;
    let safe_feed_at = window_end
        .checked_add_signed(Duration::seconds(clearance_secs))
        .and_then(|t| t.checked_add_signed(Duration::minutes(plan.safety_buffer_min as i64)))
        .ok_or_else(out_of_range)?;

    tracing::debug!(
        "Safe feed at {} (window end {}, {:.2} h/drink x {} drinks, {} min buffer)",
        safe_feed_at,
        window_end,
        per_drink_hours,
        plan.drinks,
        plan.safety_buffer_min
    );

    Ok(safe_feed_at)
}
