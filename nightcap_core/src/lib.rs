#![forbid(unsafe_code)]

//! Core domain model and planning logic for Nightcap.
//!
//! Nightcap answers one question for a nursing parent planning a drink:
//! does the moment breastmilk is presumed alcohol-free land comfortably
//! before the baby's next expected feed?
//!
//! This crate provides:
//! - Domain types (profile, drink plans, feed history, assessments)
//! - Clearance model (weight-adjusted hours per standard drink)
//! - Feed interval prediction (median over recent history)
//! - Feasibility classification and advice generation
//! - What-if scenarios and tipping-point search
//! - Host-side helpers (feed log, plan store, config)
//!
//! The engine itself is pure and stateless: every assessment is a function
//! of its explicit arguments only, cheap enough to re-run on each change.

pub mod types;
pub mod error;
pub mod logging;
pub mod config;
pub mod clearance;
pub mod prediction;
pub mod feasibility;
pub mod advice;
pub mod scenario;
pub mod engine;
pub mod history;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use clearance::compute_safe_feed_at;
pub use prediction::predict_next_feeds;
pub use feasibility::classify;
pub use advice::{generate_tips, Advice};
pub use scenario::{plus_one_scenario, PlusOneOutcome};
pub use engine::assess_plan;
pub use history::{append_feed, load_feed_history};
pub use store::PlanStore;
