//! Network path discovery and multi-objective matching.
//!
//! Request flow:
//! `GraphStore` -> `PathFinder` -> `CompatibilityScorer` -> `MatchingEngine`
//! -> optional `ContextualAdjuster` -> optional `optimize`.
//!
//! Everything here is pure computation over an in-memory snapshot. Loading
//! records and persisting results belong to the caller.

pub mod attributes;
pub mod cancel;
pub mod context;
pub mod errors;
pub mod graph;
pub mod matching;
pub mod models;
pub mod optimize;
pub mod scoring;

pub use attributes::{CommunicationStyle, ExtensionAttributes, Seniority, WorkingStyle};
pub use cancel::CancelToken;
pub use context::{ContextualAdjuster, ContextualGoal, ContextualMatchScore, GoalContext, Timeframe};
pub use errors::{MatchError, MatchResult};
pub use graph::{GraphStats, GraphStore, IntroPath, NetworkGraph, PathFinder, PathMap};
pub use matching::{
    MatchConfig, MatchStatus, MatchingEngine, PriorityThresholds, PriorityWeights, StatusChange,
    StatusListener,
};
pub use models::{Connection, Contact, Match, MatchReason, MatchType, Priority, RelationshipType};
pub use optimize::{optimize, Diversified, Objective, OptimizationResult, Selection};
pub use scoring::{CompatibilityScorer, ScoringWeights, Vocabulary, VocabularyConfig};
