//! Goal-aware re-scoring of base matches.

mod adjuster;
mod dealbreaker;
mod goal;

pub use adjuster::{ContextualAdjuster, ContextualMatchScore, DEAL_BREAKER_PENALTY};
pub use dealbreaker::{parse_deal_breakers, DealBreaker};
pub use goal::{ContextualGoal, GoalConstraints, GoalContext, GoalPreferences, Timeframe};
