//! What-if scenarios and tipping-point search.
//!
//! The +1 scenario re-runs the clearance and classification path with one
//! extra drink, once; it never recurses further. Tipping points are found
//! with a bounded binary search over candidate start shifts against the
//! pure classifier, rather than fixed offsets: an earlier start moves the
//! safe-feed time earlier by the same amount while the predicted feeds stay
//! put, so the verdict is monotone in the shift and the search is sound.

use crate::{clearance, feasibility, prediction};
use crate::{
    DrinkPlan, Feasibility, FeedHistoryPoint, PatternContext, Profile, Result, TippingPoint,
};
use chrono::{DateTime, Duration, Utc};

/// Coarse stored-milk estimate when the +1 scenario is not Green
pub const PLUS_ONE_FREEZER_FALLBACK_ML: f64 = 120.0;

// Tipping-point search bounds: 5 min granularity, at most 4 h earlier.
const SHIFT_STEP_MIN: i64 = 5;
const MAX_SHIFT_STEPS: i64 = 48;

/// Outcome of re-running the plan with one extra drink
#[derive(Clone, Debug, PartialEq)]
pub struct PlusOneOutcome {
    pub feasibility: Feasibility,
    pub freezer_estimate_ml: f64,
}

/// Re-assess the plan with `drinks + 1`.
///
/// The freezer estimate is deliberately coarse: zero when the bumped plan
/// is still Green, a fixed fallback otherwise.
pub fn plus_one_scenario(
    plan: &DrinkPlan,
    profile: &Profile,
    history: &[FeedHistoryPoint],
    pattern: &PatternContext,
) -> Result<PlusOneOutcome> {
    plan.validate()?;
    profile.validate()?;

    let mut bumped = plan.clone();
    bumped.drinks = bumped.drinks.saturating_add(1);

    // One drink past the supported maximum never fits.
    let Ok(safe_feed_at) = clearance::compute_safe_feed_at(&bumped, profile) else {
        return Ok(PlusOneOutcome {
            feasibility: Feasibility::Red,
            freezer_estimate_ml: PLUS_ONE_FREEZER_FALLBACK_ML,
        });
    };
    let next_feed = prediction::predict_next_feeds(history, 1, pattern.evening_cluster)
        .first()
        .copied();
    let verdict = feasibility::classify(safe_feed_at, next_feed);

    let freezer_estimate_ml = if verdict == Feasibility::Green {
        0.0
    } else {
        PLUS_ONE_FREEZER_FALLBACK_ML
    };

    Ok(PlusOneOutcome {
        feasibility: verdict,
        freezer_estimate_ml,
    })
}

/// Could one more drink still avoid a Red verdict, possibly by starting
/// earlier?
pub fn plus_one_tipping(
    plan: &DrinkPlan,
    profile: &Profile,
    next_feed: Option<DateTime<Utc>>,
) -> TippingPoint {
    let mut bumped = plan.clone();
    bumped.drinks = bumped.drinks.saturating_add(1);

    let safe_feed_at = match clearance::compute_safe_feed_at(&bumped, profile) {
        Ok(t) => t,
        Err(_) => return TippingPoint::impossible(),
    };

    match earliest_shift_min(safe_feed_at, next_feed, |v| v != Feasibility::Red) {
        Some(0) => TippingPoint {
            possible: true,
            condition: None,
        },
        Some(shift) => TippingPoint {
            possible: true,
            condition: Some(format!("start about {} minutes earlier", shift)),
        },
        None => TippingPoint::impossible(),
    }
}

/// Could the plan work without stored milk, possibly by starting earlier?
///
/// A Green verdict never needs stored milk, so the search target is Green.
pub fn no_freezer_tipping(
    plan: &DrinkPlan,
    profile: &Profile,
    next_feed: Option<DateTime<Utc>>,
    freezer_needed_ml: f64,
) -> TippingPoint {
    if freezer_needed_ml <= 0.0 {
        return TippingPoint {
            possible: true,
            condition: None,
        };
    }

    let safe_feed_at = match clearance::compute_safe_feed_at(plan, profile) {
        Ok(t) => t,
        Err(_) => return TippingPoint::impossible(),
    };

    match earliest_shift_min(safe_feed_at, next_feed, |v| v == Feasibility::Green) {
        Some(0) => TippingPoint {
            possible: true,
            condition: None,
        },
        Some(shift) => TippingPoint {
            possible: true,
            condition: Some(format!("shift the start about {} minutes earlier", shift)),
        },
        None => TippingPoint::impossible(),
    }
}

/// Smallest start shift (in minutes, multiples of [`SHIFT_STEP_MIN`], at
/// most `MAX_SHIFT_STEPS` steps) whose shifted safe-feed time satisfies
/// `ok` against the fixed next feed. Returns `None` when even the maximum
/// shift does not help.
fn earliest_shift_min(
    safe_feed_at: DateTime<Utc>,
    next_feed: Option<DateTime<Utc>>,
    ok: impl Fn(Feasibility) -> bool,
) -> Option<i64> {
    let verdict_at = |steps: i64| {
        feasibility::classify(
            safe_feed_at - Duration::minutes(steps * SHIFT_STEP_MIN),
            next_feed,
        )
    };

    if ok(verdict_at(0)) {
        return Some(0);
    }
    if !ok(verdict_at(MAX_SHIFT_STEPS)) {
        return None;
    }

    // Invariant: ok fails at lo, holds at hi.
    let (mut lo, mut hi) = (0, MAX_SHIFT_STEPS);
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if ok(verdict_at(mid)) {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    Some(hi * SHIFT_STEP_MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrinkType, Pace, PlanGoal};
    use chrono::TimeZone;

    fn plan_at_2000(drinks: u32) -> DrinkPlan {
        DrinkPlan {
            start_at: Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap(),
            drinks,
            pace: Pace::TwoHours,
            drink_type: DrinkType::Wine,
            safety_buffer_min: 30,
            goal: PlanGoal::MinFreezer,
            can_pre_feed: true,
            can_micro_pump: false,
            micro_pump_target_ml: None,
        }
    }

    fn feeds_ending_2130() -> Vec<FeedHistoryPoint> {
        // 17:30, 19:30, 21:30 at a steady 120 min cadence -> next at 23:30
        [(17, 30), (19, 30), (21, 30)]
            .iter()
            .map(|&(h, m)| FeedHistoryPoint {
                at: Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap(),
                amount_ml: None,
            })
            .collect()
    }

    #[test]
    fn test_plus_one_scenario_worsens_verdict() {
        // Base plan is already Red (safe at 02:30 vs feed at 23:30); one
        // more drink stays Red and recommends the fallback volume.
        let outcome = plus_one_scenario(
            &plan_at_2000(2),
            &Profile::default(),
            &feeds_ending_2130(),
            &PatternContext::default(),
        )
        .unwrap();
        assert_eq!(outcome.feasibility, Feasibility::Red);
        assert_eq!(outcome.freezer_estimate_ml, PLUS_ONE_FREEZER_FALLBACK_ML);
    }

    #[test]
    fn test_plus_one_scenario_green_needs_no_milk() {
        // No history: permissive Green even with the extra drink.
        let outcome = plus_one_scenario(
            &plan_at_2000(1),
            &Profile::default(),
            &[],
            &PatternContext::default(),
        )
        .unwrap();
        assert_eq!(outcome.feasibility, Feasibility::Green);
        assert_eq!(outcome.freezer_estimate_ml, 0.0);
    }

    #[test]
    fn test_plus_one_at_supported_maximum_is_red() {
        // A plan already at the drink cap cannot be bumped; the scenario
        // reports Red with the fallback volume instead of an error.
        let outcome = plus_one_scenario(
            &plan_at_2000(DrinkPlan::MAX_DRINKS),
            &Profile::default(),
            &[],
            &PatternContext::default(),
        )
        .unwrap();
        assert_eq!(outcome.feasibility, Feasibility::Red);
        assert_eq!(outcome.freezer_estimate_ml, PLUS_ONE_FREEZER_FALLBACK_ML);
    }

    #[test]
    fn test_earliest_shift_finds_exact_boundary() {
        // Safe at 02:30, next feed 23:30: non-Red needs safe <= 00:00,
        // i.e. a shift of exactly 150 minutes.
        let safe = Utc.with_ymd_and_hms(2024, 6, 2, 2, 30, 0).unwrap();
        let next = Some(Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap());
        assert_eq!(
            earliest_shift_min(safe, next, |v| v != Feasibility::Red),
            Some(150)
        );
        // Green needs safe <= 23:20, a 190 minute shift.
        assert_eq!(
            earliest_shift_min(safe, next, |v| v == Feasibility::Green),
            Some(190)
        );
    }

    #[test]
    fn test_plus_one_tipping_beyond_search_bound() {
        // Three drinks would put the safe time at 04:30; even a 4 h shift
        // cannot rescue that against a 23:30 feed.
        let tp = plus_one_tipping(
            &plan_at_2000(2),
            &Profile::default(),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap()),
        );
        assert!(!tp.possible);
        assert!(tp.condition.is_none());
    }

    #[test]
    fn test_plus_one_tipping_fits_as_planned() {
        let tp = plus_one_tipping(&plan_at_2000(1), &Profile::default(), None);
        assert!(tp.possible);
        assert!(tp.condition.is_none());
    }

    #[test]
    fn test_plus_one_tipping_with_shift() {
        // One drink, safe at 00:30 against a feed at 01:30: already Green.
        // With a second drink safe moves to 02:30, needing a shift to get
        // back under 02:00 (Yellow bound): 30 minutes.
        let next = Some(Utc.with_ymd_and_hms(2024, 6, 2, 1, 30, 0).unwrap());
        let tp = plus_one_tipping(&plan_at_2000(1), &Profile::default(), next);
        assert!(tp.possible);
        assert_eq!(
            tp.condition.as_deref(),
            Some("start about 30 minutes earlier")
        );
    }

    #[test]
    fn test_no_freezer_trivial_when_no_milk_needed() {
        let tp = no_freezer_tipping(&plan_at_2000(2), &Profile::default(), None, 0.0);
        assert!(tp.possible);
        assert!(tp.condition.is_none());
    }

    #[test]
    fn test_no_freezer_requires_green() {
        // Safe at 02:30, next feed 23:30, 120 ml recommended: Green needs a
        // 190 minute shift.
        let next = Some(Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap());
        let tp = no_freezer_tipping(&plan_at_2000(2), &Profile::default(), next, 120.0);
        assert!(tp.possible);
        assert_eq!(
            tp.condition.as_deref(),
            Some("shift the start about 190 minutes earlier")
        );
    }
}
