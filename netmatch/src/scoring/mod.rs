//! Compatibility Scorer
//!
//! Feature scores for a (source, target) pair, computed against an injected
//! [`Vocabulary`] of synonyms and keyword tables.
//!
//! # Features
//!
//! - **Complementarity** (40%): needs met by offerings, both directions
//! - **Skills** (20%): fuzzy Dice overlap
//! - **Industry** (15%): same, related, or unrelated
//! - **Experience** (15%): seniority gap fit
//! - **Interests** (10%): fuzzy Dice overlap

mod compatibility;
mod vocabulary;

pub use compatibility::{
    CompatibilityBreakdown, CompatibilityScorer, ScoringWeights, STRONG_SIGNAL,
};
pub use vocabulary::{normalize, TypeTriggers, Vocabulary, VocabularyConfig};
