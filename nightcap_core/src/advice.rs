//! Advice generation: verdict and plan goal into ordered, actionable tips.
//!
//! Rules fire additively in a fixed order with no backtracking. The stored
//! milk volume is derived from the typical feed volume minus whatever a
//! micro-pump session is expected to cover.

use crate::{DrinkPlan, Feasibility, PatternContext, PlanGoal};

/// Ordered tips plus the recommended stored-milk volume
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Advice {
    pub tips: Vec<String>,
    pub freezer_needed_ml: f64,
}

/// Stored milk needed to cover one feed, net of the micro-pump target
pub fn freezer_volume_ml(plan: &DrinkPlan, pattern: &PatternContext) -> f64 {
    (pattern.typical_ml_per_feed - plan.micro_pump_target_ml.unwrap_or(0.0)).max(0.0)
}

/// Generate tips for a classified plan.
///
/// Green plans always get the affirmative tip first and need no stored
/// milk. A `MinFreezer` goal prepends the avoid-stored-milk tip whenever a
/// volume was recommended.
pub fn generate_tips(
    feasibility: Feasibility,
    plan: &DrinkPlan,
    pattern: &PatternContext,
) -> Advice {
    let mut tips = Vec::new();
    let mut freezer_needed_ml = 0.0;

    match feasibility {
        Feasibility::Green => {
            tips.push(
                "Your plan fits comfortably before the next expected feed. Enjoy!".to_string(),
            );
        }

        Feasibility::Yellow => {
            tips.push("Feed 30-45 minutes before your first drink to widen the gap.".to_string());
            tips.push(
                "Delaying your first drink by 20-30 minutes makes the timing more comfortable."
                    .to_string(),
            );
            tips.push(
                "Compressing the pace shortens the window and moves the safe moment earlier."
                    .to_string(),
            );
            if plan.goal == PlanGoal::MaxRelax || plan.can_micro_pump {
                freezer_needed_ml = freezer_volume_ml(plan, pattern);
                tips.push(format!(
                    "Have about {:.0} ml of stored milk ready in case the next feed comes early.",
                    freezer_needed_ml
                ));
            }
        }

        Feasibility::Red => {
            tips.push(
                "This plan does not comfortably fit before the next expected feed.".to_string(),
            );
            tips.push(
                "Feed right before you start and shift the first drink later, or drop one drink \
                 from the plan."
                    .to_string(),
            );
            if plan.can_micro_pump {
                freezer_needed_ml = freezer_volume_ml(plan, pattern);
                tips.push(format!(
                    "With about {:.0} ml of stored milk the plan is possible with a small margin.",
                    freezer_needed_ml
                ));
            }
        }
    }

    if plan.goal == PlanGoal::MinFreezer && freezer_needed_ml > 0.0 {
        tips.insert(
            0,
            "Try feeding just before the start, shifting the start, or bundling drinks before \
             relying on stored milk."
                .to_string(),
        );
    }

    Advice {
        tips,
        freezer_needed_ml,
    }
}
