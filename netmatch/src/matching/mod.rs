//! Match generation, ranking and lifecycle.

mod config;
mod engine;
pub mod signals;
mod status;

pub use config::{MatchConfig, PriorityThresholds, PriorityWeights, TimingConfig, WeightPolicy};
pub use engine::{rank_order, MatchingEngine};
pub use status::{MatchStatus, StatusChange, StatusListener};
