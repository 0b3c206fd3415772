//! Feed interval prediction from recent history.
//!
//! Uses the median interval over at most the last 6 feeds (5 intervals) and
//! extrapolates forward from the most recent feed. Evening clustering
//! shortens the interval by 0.85x, floored at 90 minutes.

use crate::FeedHistoryPoint;
use chrono::{DateTime, Duration, Utc};

/// Prediction never looks further back than this many feeds
pub const MAX_HISTORY_POINTS: usize = 6;

/// Interval assumed when only a single feed is on record
pub const DEFAULT_INTERVAL_MIN: f64 = 180.0;

const EVENING_FACTOR: f64 = 0.85;
const EVENING_FLOOR_MIN: f64 = 90.0;

/// Predict the next `count` feed timestamps.
///
/// Pure and deterministic; history is expected oldest-first. Empty history
/// yields an empty prediction, a single feed falls back to
/// [`DEFAULT_INTERVAL_MIN`].
pub fn predict_next_feeds(
    history: &[FeedHistoryPoint],
    count: usize,
    evening_cluster: bool,
) -> Vec<DateTime<Utc>> {
    let Some(last) = history.last() else {
        return Vec::new();
    };

    let recent = &history[history.len().saturating_sub(MAX_HISTORY_POINTS)..];
    let mut intervals: Vec<f64> = recent
        .windows(2)
        .map(|pair| (pair[1].at - pair[0].at).num_seconds() as f64 / 60.0)
        .collect();

    let base_min = if intervals.is_empty() {
        DEFAULT_INTERVAL_MIN
    } else {
        median(&mut intervals)
    };

    let adjusted_min = if evening_cluster {
        (base_min * EVENING_FACTOR).max(EVENING_FLOOR_MIN)
    } else {
        base_min
    };

    tracing::debug!(
        "Predicting {} feeds at {:.1} min intervals from {}",
        count,
        adjusted_min,
        last.at
    );

    let step = Duration::seconds((adjusted_min * 60.0).round() as i64);
    (1..=count as i32).map(|i| last.at + step * i).collect()
}

/// Median of the values; mean of the two middle values on even counts
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
