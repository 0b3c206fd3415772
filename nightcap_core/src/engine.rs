//! Plan assessment boundary.
//!
//! `assess_plan` wires the clearance model, interval predictor, classifier,
//! advice rules and scenario search together behind a single call. Input
//! validation errors bubble to the caller; anything that fails past
//! validation degrades to a neutral assessment instead of surfacing a raw
//! error, matching the "never block the user, never hide bad input" stance.

use crate::{advice, clearance, feasibility, prediction, scenario};
use crate::{
    DrinkPlan, FeedHistoryPoint, PatternContext, PlanAssessment, Profile, Result, TippingPoint,
};
use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// How many upcoming feeds an assessment reports
pub const PREDICTED_FEED_COUNT: usize = 3;

/// Assess a drink plan against the feeding schedule.
///
/// Pure in its arguments: no clock reads, no I/O, so identical inputs
/// always produce identical assessments.
pub fn assess_plan(
    plan: &DrinkPlan,
    profile: &Profile,
    history: &[FeedHistoryPoint],
    pattern: &PatternContext,
) -> Result<PlanAssessment> {
    plan.validate()?;
    profile.validate()?;
    pattern.validate()?;

    let safe_feed_at = clearance::compute_safe_feed_at(plan, profile)?;

    Ok(run_guarded(safe_feed_at, || {
        assess_validated(plan, profile, history, pattern, safe_feed_at)
    }))
}

/// Run the post-validation computation, degrading any panic to the neutral
/// assessment for the already-computed safe-feed time.
fn run_guarded(
    safe_feed_at: DateTime<Utc>,
    compute: impl FnOnce() -> PlanAssessment,
) -> PlanAssessment {
    match catch_unwind(AssertUnwindSafe(compute)) {
        Ok(assessment) => assessment,
        Err(panic) => {
            tracing::error!(
                "Plan assessment failed unexpectedly ({}); returning neutral assessment",
                panic_message(&panic)
            );
            neutral_assessment(safe_feed_at)
        }
    }
}

fn assess_validated(
    plan: &DrinkPlan,
    profile: &Profile,
    history: &[FeedHistoryPoint],
    pattern: &PatternContext,
    safe_feed_at: DateTime<Utc>,
) -> PlanAssessment {
    let next_feeds =
        prediction::predict_next_feeds(history, PREDICTED_FEED_COUNT, pattern.evening_cluster);
    let next_feed = next_feeds.first().copied();

    let verdict = feasibility::classify(safe_feed_at, next_feed);
    tracing::info!(
        "Assessed plan: {} (safe at {}, next feed {:?})",
        verdict,
        safe_feed_at,
        next_feed
    );

    let advice = advice::generate_tips(verdict, plan, pattern);
    let freezer_needed_ml = advice.freezer_needed_ml;
    let mut tips = advice.tips;
    if next_feeds.is_empty() {
        tips.push(
            "Not enough feeding history to predict the next feed; log a few feeds for a \
             sharper verdict."
                .to_string(),
        );
    }

    let plus_one = scenario::plus_one_tipping(plan, profile, next_feed);
    let no_freezer = scenario::no_freezer_tipping(plan, profile, next_feed, freezer_needed_ml);

    PlanAssessment {
        feasibility: verdict,
        safe_feed_at,
        next_feeds,
        freezer_needed_ml,
        tips,
        plus_one,
        no_freezer,
    }
}

/// Conservative fallback when computation fails past validation
fn neutral_assessment(safe_feed_at: DateTime<Utc>) -> PlanAssessment {
    PlanAssessment {
        feasibility: crate::Feasibility::Green,
        safe_feed_at,
        next_feeds: Vec::new(),
        freezer_needed_ml: 0.0,
        tips: Vec::new(),
        plus_one: TippingPoint::impossible(),
        no_freezer: TippingPoint::impossible(),
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrinkType, Error, Feasibility, Pace, PlanGoal};
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

    fn feeds(times: &[(u32, u32)]) -> Vec<FeedHistoryPoint> {
        times
            .iter()
            .map(|&(h, m)| FeedHistoryPoint {
                at: Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap(),
                amount_ml: Some(110.0),
            })
            .collect()
    }

    #[test]
    fn test_worked_red_example() {
        // Flat 2 h/drink fallback: safe at 02:30, next feed 23:30 -> Red.
        let history = feeds(&[(17, 30), (19, 30), (21, 30)]);
        let assessment = assess_plan(
            &plan_at_2000(2),
            &Profile::default(),
            &history,
            &PatternContext::default(),
        )
        .unwrap();

        assert_eq!(assessment.feasibility, Feasibility::Red);
        assert_eq!(
            assessment.safe_feed_at,
            Utc.with_ymd_and_hms(2024, 6, 2, 2, 30, 0).unwrap()
        );
        assert_eq!(
            assessment.next_feeds[0],
            Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap()
        );
        assert_eq!(assessment.next_feeds.len(), PREDICTED_FEED_COUNT);
    }

    #[test]
    fn test_empty_history_is_green_with_caveat() {
        let assessment = assess_plan(
            &plan_at_2000(2),
            &Profile::default(),
            &[],
            &PatternContext::default(),
        )
        .unwrap();

        assert_eq!(assessment.feasibility, Feasibility::Green);
        assert!(assessment.next_feeds.is_empty());
        assert_eq!(assessment.freezer_needed_ml, 0.0);
        assert!(assessment.tips[0].contains("fits comfortably"));
        assert!(assessment
            .tips
            .last()
            .unwrap()
            .contains("Not enough feeding history"));
    }

    #[test]
    fn test_green_always_zero_freezer() {
        // Early afternoon plan with the next feed far away.
        let mut plan = plan_at_2000(1);
        plan.start_at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        plan.goal = PlanGoal::MaxRelax;
        let history = feeds(&[(4, 0), (9, 0)]); // 300 min interval -> next 14:00

        let assessment = assess_plan(
            &plan,
            &Profile::default(),
            &history,
            &PatternContext::default(),
        )
        .unwrap();
        // Window ends 11:00, safe at 11:00 + 2h + 30min = 13:30, feed at
        // 14:00 -> Green.
        assert_eq!(assessment.feasibility, Feasibility::Green);
        assert_eq!(assessment.freezer_needed_ml, 0.0);
        assert!(assessment.tips[0].contains("fits comfortably"));
    }

    #[test]
    fn test_invalid_input_bubbles() {
        let result = assess_plan(
            &plan_at_2000(0),
            &Profile::default(),
            &[],
            &PatternContext::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_extreme_drink_count_rejected_without_panic() {
        let result = assess_plan(
            &plan_at_2000(u32::MAX),
            &Profile::default(),
            &[],
            &PatternContext::default(),
        );
        assert!(matches!(result, Err(Error::InvalidPlan(_))));
    }

    #[test]
    fn test_internal_panic_degrades_to_neutral_assessment() {
        let safe_feed_at = Utc.with_ymd_and_hms(2024, 6, 2, 2, 30, 0).unwrap();
        let assessment = run_guarded(safe_feed_at, || panic!("synthetic failure"));

        assert_eq!(assessment.feasibility, Feasibility::Green);
        assert_eq!(assessment.safe_feed_at, safe_feed_at);
        assert!(assessment.next_feeds.is_empty());
        assert!(assessment.tips.is_empty());
        assert_eq!(assessment.freezer_needed_ml, 0.0);
        assert!(!assessment.plus_one.possible);
        assert!(!assessment.no_freezer.possible);
    }

    #[test]
    fn test_assessment_is_idempotent() {
        let history = feeds(&[(17, 30), (19, 30), (21, 30)]);
        let plan = plan_at_2000(2);
        let profile = Profile {
            weight_kg: Some(62.0),
            conservative_factor: 1.15,
        };
        let pattern = PatternContext {
            typical_ml_per_feed: 130.0,
            evening_cluster: true,
        };

        let first = assess_plan(&plan, &profile, &history, &pattern).unwrap();
        let second = assess_plan(&plan, &profile, &history, &pattern).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tipping_points_present_on_red_plan() {
        let history = feeds(&[(17, 30), (19, 30), (21, 30)]);
        let assessment = assess_plan(
            &plan_at_2000(2),
            &Profile::default(),
            &history,
            &PatternContext::default(),
        )
        .unwrap();

        // 2 -> 3 drinks cannot be rescued within the search bound.
        assert!(!assessment.plus_one.possible);
        // No stored milk was recommended (cannot micro-pump), so skipping
        // the freezer is trivially possible.
        assert!(assessment.no_freezer.possible);
    }

    #[test]
    fn test_assessment_serializes_to_json() {
        let assessment = assess_plan(
            &plan_at_2000(1),
            &Profile::default(),
            &feeds(&[(17, 30), (19, 30)]),
            &PatternContext::default(),
        )
        .unwrap();

        let json = serde_json::to_string(&assessment).unwrap();
        let parsed: PlanAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(assessment, parsed);
    }
}
