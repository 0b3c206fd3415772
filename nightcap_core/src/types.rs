//! Core domain types for the Nightcap planning engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Nursing parent profile
//! - Drink plans and their parameters
//! - Feeding history and observed patterns
//! - Assessment output (feasibility, tips, tipping points)
//! - Host-side stored plans

use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Profile
// ============================================================================

/// Nursing parent profile supplied by the host application.
///
/// Read-only to the engine; `weight_kg` may be unknown.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub weight_kg: Option<f64>,
    /// Multiplier >= 1.0 applied to the clearance estimate (1.0 = normal,
    /// 1.15 = cautious by convention).
    pub conservative_factor: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            weight_kg: None,
            conservative_factor: 1.0,
        }
    }
}

impl Profile {
    /// Largest accepted caution multiplier; beyond this the estimate stops
    /// being an estimate.
    pub const MAX_CONSERVATIVE_FACTOR: f64 = 5.0;

    pub fn validate(&self) -> Result<()> {
        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(Error::InvalidPlan(format!(
                    "weight must be a positive number, got {}",
                    weight
                )));
            }
        }
        if !self.conservative_factor.is_finite()
            || !(1.0..=Self::MAX_CONSERVATIVE_FACTOR).contains(&self.conservative_factor)
        {
            return Err(Error::InvalidPlan(format!(
                "conservative factor must be between 1.0 and {}, got {}",
                Self::MAX_CONSERVATIVE_FACTOR,
                self.conservative_factor
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Drink Plan
// ============================================================================

/// Total span over which the planned drinks are spread
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    OneHour,
    TwoHours,
    ThreeHours,
}

impl Pace {
    pub fn hours(&self) -> i64 {
        match self {
            Pace::OneHour => 1,
            Pace::TwoHours => 2,
            Pace::ThreeHours => 3,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::hours(self.hours())
    }
}

impl FromStr for Pace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1h" | "1" | "one_hour" => Ok(Pace::OneHour),
            "2h" | "2" | "two_hours" => Ok(Pace::TwoHours),
            "3h" | "3" | "three_hours" => Ok(Pace::ThreeHours),
            other => Err(Error::InvalidPlan(format!(
                "unrecognized pace: {} (expected 1h, 2h or 3h)",
                other
            ))),
        }
    }
}

/// Cosmetic drink category; does not affect any computation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrinkType {
    Beer,
    Wine,
    Spirits,
    Cocktail,
    Other,
}

impl FromStr for DrinkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beer" => Ok(DrinkType::Beer),
            "wine" => Ok(DrinkType::Wine),
            "spirits" => Ok(DrinkType::Spirits),
            "cocktail" => Ok(DrinkType::Cocktail),
            "other" => Ok(DrinkType::Other),
            other => Err(Error::InvalidPlan(format!(
                "unrecognized drink type: {}",
                other
            ))),
        }
    }
}

/// What the plan optimizes for; biases the ordering of advice
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanGoal {
    MinFreezer,
    MaxRelax,
}

impl FromStr for PlanGoal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "min_freezer" | "freezer" => Ok(PlanGoal::MinFreezer),
            "max_relax" | "relax" => Ok(PlanGoal::MaxRelax),
            other => Err(Error::InvalidPlan(format!(
                "unrecognized goal: {} (expected min_freezer or max_relax)",
                other
            ))),
        }
    }
}

/// A planned drinking session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrinkPlan {
    pub start_at: DateTime<Utc>,
    pub drinks: u32,
    pub pace: Pace,
    pub drink_type: DrinkType,
    pub safety_buffer_min: u32,
    pub goal: PlanGoal,
    pub can_pre_feed: bool,
    pub can_micro_pump: bool,
    pub micro_pump_target_ml: Option<f64>,
}

impl DrinkPlan {
    /// Largest drink count a plan may carry; keeps the clearance arithmetic
    /// well inside the representable timestamp range.
    pub const MAX_DRINKS: u32 = 24;

    pub fn validate(&self) -> Result<()> {
        if self.drinks < 1 {
            return Err(Error::InvalidPlan(
                "plan must include at least one drink".into(),
            ));
        }
        if self.drinks > Self::MAX_DRINKS {
            return Err(Error::InvalidPlan(format!(
                "plan exceeds the supported maximum of {} drinks, got {}",
                Self::MAX_DRINKS,
                self.drinks
            )));
        }
        if let Some(target) = self.micro_pump_target_ml {
            if !target.is_finite() || target < 0.0 {
                return Err(Error::InvalidPlan(format!(
                    "micro-pump target must be non-negative, got {}",
                    target
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Feeding History and Patterns
// ============================================================================

/// One observed feed, oldest-first in a history sequence
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedHistoryPoint {
    pub at: DateTime<Utc>,
    pub amount_ml: Option<f64>,
}

/// Observed feeding pattern supplied by the host
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatternContext {
    pub typical_ml_per_feed: f64,
    /// Feeds run tighter together in the evening
    pub evening_cluster: bool,
}

impl Default for PatternContext {
    fn default() -> Self {
        Self {
            typical_ml_per_feed: 120.0,
            evening_cluster: false,
        }
    }
}

impl PatternContext {
    pub fn validate(&self) -> Result<()> {
        if !self.typical_ml_per_feed.is_finite() || self.typical_ml_per_feed <= 0.0 {
            return Err(Error::InvalidPlan(format!(
                "typical feed volume must be positive, got {}",
                self.typical_ml_per_feed
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Assessment Output
// ============================================================================

/// Tri-state verdict on whether the safe-feed time fits before the next feed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feasibility::Green => write!(f, "GREEN"),
            Feasibility::Yellow => write!(f, "YELLOW"),
            Feasibility::Red => write!(f, "RED"),
        }
    }
}

/// Whether a one-parameter change would make the plan work, and how
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TippingPoint {
    pub possible: bool,
    pub condition: Option<String>,
}

impl TippingPoint {
    pub fn impossible() -> Self {
        Self {
            possible: false,
            condition: None,
        }
    }
}

/// Full assessment of a drink plan.
///
/// Transient value with no identity of its own: recomputed fresh on every
/// call and never persisted by the engine itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanAssessment {
    pub feasibility: Feasibility,
    pub safe_feed_at: DateTime<Utc>,
    pub next_feeds: Vec<DateTime<Utc>>,
    pub freezer_needed_ml: f64,
    pub tips: Vec<String>,
    /// Could one more drink still work?
    pub plus_one: TippingPoint,
    /// Could the plan work without stored milk?
    pub no_freezer: TippingPoint,
}

// ============================================================================
// Stored Plans (host-side)
// ============================================================================

/// Lifecycle status of a saved plan
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Scheduled => write!(f, "scheduled"),
            PlanStatus::Completed => write!(f, "completed"),
            PlanStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for PlanStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(PlanStatus::Scheduled),
            "completed" => Ok(PlanStatus::Completed),
            "cancelled" => Ok(PlanStatus::Cancelled),
            other => Err(Error::InvalidPlan(format!(
                "unrecognized status: {} (expected scheduled, completed or cancelled)",
                other
            ))),
        }
    }
}

/// A saved plan/assessment pair.
///
/// Purely host-side: the engine never reads these back into a computation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredPlan {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: PlanStatus,
    pub plan: DrinkPlan,
    pub assessment: PlanAssessment,
}

impl StoredPlan {
    /// Wrap a plan and its assessment as a newly scheduled stored plan
    pub fn scheduled(plan: DrinkPlan, assessment: PlanAssessment, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at,
            status: PlanStatus::Scheduled,
            plan,
            assessment,
        }
    }
}
