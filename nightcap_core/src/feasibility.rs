//! Feasibility classification.
//!
//! A pure function of the safe-feed time and the first predicted feed.
//! Later predictions are informational only and never affect the verdict.

use crate::Feasibility;
use chrono::{DateTime, Duration, Utc};

// Safe-feed must land this far before the next feed to count as comfortable.
const GREEN_MARGIN_MIN: i64 = 10;
// Up to this much past the next feed still counts as workable.
const YELLOW_SLACK_MIN: i64 = 30;

/// Classify a plan against the next predicted feed.
///
/// - Green: `safe_feed_at <= next - 10 min`
/// - Yellow: `safe_feed_at <= next + 30 min`
/// - Red: otherwise
///
/// With no predicted feed at all (no usable history) the verdict is Green.
/// That is a deliberate, permissive policy choice: the engine refuses to
/// block a user over missing data and instead surfaces the data gap as a
/// tip at the assessment boundary.
pub fn classify(safe_feed_at: DateTime<Utc>, next_feed: Option<DateTime<Utc>>) -> Feasibility {
    let Some(next) = next_feed else {
        return Feasibility::Green;
    };

    if safe_feed_at <= next - Duration::minutes(GREEN_MARGIN_MIN) {
        Feasibility::Green
    } else if safe_feed_at <= next + Duration::minutes(YELLOW_SLACK_MIN) {
        Feasibility::Yellow
    } else {
        Feasibility::Red
    }
}
