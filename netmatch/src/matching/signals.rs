//! Per-candidate signals feeding the overall score.
//!
//! - which match types apply to a pair
//! - value potential (seniority lift + a type-specific signal)
//! - success probability (path trust, relationship priors, hop decay)
//! - timing (recency and frequency of the first-hop relationship)

use super::config::TimingConfig;
use crate::graph::IntroPath;
use crate::models::{Contact, MatchType};
use crate::scoring::{CompatibilityBreakdown, CompatibilityScorer};
use chrono::{DateTime, Utc};

/// Hop decay applied per intermediary
const HOP_DECAY: f64 = 0.9;

/// Neighbor count at which an introducer's reach saturates
const REACH_SATURATION: f64 = 20.0;

/// log10 of a budget treated as maximal (1M)
const BUDGET_SATURATION_LOG: f64 = 6.0;

/// Success probability component weights
const SUCCESS_TRUST_SHARE: f64 = 0.5;
const SUCCESS_PRIOR_SHARE: f64 = 0.3;
const SUCCESS_COMPAT_SHARE: f64 = 0.2;

/// Everything the signal functions look at for one candidate
pub struct PairContext<'a> {
    pub source: &'a Contact,
    pub target: &'a Contact,
    pub path: &'a IntroPath,
    pub breakdown: &'a CompatibilityBreakdown,
    /// Distinct neighbors of the target in the network
    pub target_reach: usize,
}

/// Does `source` need something this type is about and `target` offer it
/// (or the other way round)?
fn keyword_trigger(scorer: &CompatibilityScorer, ctx: &PairContext<'_>, match_type: MatchType) -> bool {
    let vocab = scorer.vocabulary();
    let Some(triggers) = vocab.triggers(match_type) else {
        return false;
    };
    let forward = vocab.mentions_any(&ctx.source.needs, &triggers.need_keywords)
        && vocab.mentions_any(&ctx.target.offerings, &triggers.offer_keywords);
    let reverse = vocab.mentions_any(&ctx.target.needs, &triggers.need_keywords)
        && vocab.mentions_any(&ctx.source.offerings, &triggers.offer_keywords);
    forward || reverse
}

fn source_needs_type(scorer: &CompatibilityScorer, ctx: &PairContext<'_>, match_type: MatchType) -> bool {
    let vocab = scorer.vocabulary();
    vocab
        .triggers(match_type)
        .map(|t| vocab.mentions_any(&ctx.source.needs, &t.need_keywords))
        .unwrap_or(false)
}

fn same_location(a: &Contact, b: &Contact) -> bool {
    let a = crate::scoring::normalize(&a.location);
    !a.is_empty() && a == crate::scoring::normalize(&b.location)
}

/// Match types worth evaluating for this pair, in enum order
pub fn applicable_types(scorer: &CompatibilityScorer, ctx: &PairContext<'_>) -> Vec<MatchType> {
    MatchType::ALL
        .into_iter()
        .filter(|&t| {
            keyword_trigger(scorer, ctx, t)
                || match t {
                    MatchType::Collaboration => {
                        ctx.breakdown.complementarity > 0.0 || ctx.breakdown.skills > 0.0
                    }
                    MatchType::Introduction => ctx.path.hops() >= 2,
                    MatchType::Hiring => {
                        source_needs_type(scorer, ctx, t)
                            && !scorer.covered(&ctx.source.needs, &ctx.target.skills).is_empty()
                    }
                    MatchType::Investment => {
                        source_needs_type(scorer, ctx, t) && ctx.target.metadata.funding() > 0.0
                    }
                    MatchType::KnowledgeExchange => {
                        source_needs_type(scorer, ctx, t)
                            && !scorer.covered(&ctx.source.needs, &ctx.target.skills).is_empty()
                    }
                    MatchType::Event => {
                        !ctx.breakdown.shared_interests.is_empty()
                            && same_location(ctx.source, ctx.target)
                    }
                }
        })
        .collect()
}

/// Type for a reachable pair no trigger fired on: COLLABORATION for direct
/// contacts, INTRODUCTION past one hop, else whichever of the two is enabled.
pub fn fallback_type(path: &IntroPath, enabled: impl Fn(MatchType) -> bool) -> Option<MatchType> {
    let order = if path.hops() >= 2 {
        [MatchType::Introduction, MatchType::Collaboration]
    } else {
        [MatchType::Collaboration, MatchType::Introduction]
    };
    order.into_iter().find(|&t| enabled(t))
}

/// How far above the source the target sits, mapped to [0, 1]; 0.5 if unknown
pub fn seniority_lift(scorer: &CompatibilityScorer, source: &Contact, target: &Contact) -> f64 {
    match (scorer.resolve_seniority(source), scorer.resolve_seniority(target)) {
        (Some(s), Some(t)) => {
            let max = crate::attributes::Seniority::MAX_LEVEL as f64;
            ((t.level() as f64 - s.level() as f64) + max) / (2.0 * max)
        }
        _ => 0.5,
    }
}

fn budget_signal(contact: &Contact) -> f64 {
    contact
        .metadata
        .budget
        .map(|b| ((b.max(0.0) + 1.0).log10() / BUDGET_SATURATION_LOG).min(1.0))
        .unwrap_or(0.0)
}

/// Type-specific value driver
fn type_signal(scorer: &CompatibilityScorer, ctx: &PairContext<'_>, match_type: MatchType) -> f64 {
    let b = ctx.breakdown;
    match match_type {
        MatchType::Investment => {
            let declared = ctx.target.metadata.funding();
            if declared > 0.0 {
                declared
            } else if b.needs_met.is_empty() {
                0.0
            } else {
                0.5
            }
        }
        MatchType::Hiring => {
            let covered = scorer.covered(&ctx.source.needs, &ctx.target.skills).len();
            let coverage = if ctx.source.needs.is_empty() {
                0.0
            } else {
                covered as f64 / ctx.source.needs.len() as f64
            };
            coverage.max(b.skills).max(budget_signal(ctx.target))
        }
        MatchType::KnowledgeExchange => seniority_lift(scorer, ctx.source, ctx.target).max(b.skills),
        MatchType::Collaboration => b.complementarity.max(budget_signal(ctx.target)),
        MatchType::Event => b.interests,
        MatchType::Introduction => (ctx.target_reach as f64 / REACH_SATURATION).min(1.0),
    }
}

/// Value of landing this match, in [0, 1]
pub fn value_potential(scorer: &CompatibilityScorer, ctx: &PairContext<'_>, match_type: MatchType) -> f64 {
    let lift = seniority_lift(scorer, ctx.source, ctx.target);
    let signal = type_signal(scorer, ctx, match_type);
    (0.4 * lift + 0.4 * signal + 0.2 * ctx.breakdown.complementarity).clamp(0.0, 1.0)
}

/// Mean relationship prior over the path's edges
pub fn relationship_prior(path: &IntroPath) -> f64 {
    if path.connections.is_empty() {
        return 0.0;
    }
    let total: f64 = path
        .connections
        .iter()
        .map(|c| c.relationship_type.success_prior())
        .sum();
    total / path.connections.len() as f64
}

/// Odds the introduction lands, in [0, 1]
pub fn success_probability(path: &IntroPath, compatibility: f64) -> f64 {
    let hops = path.hops().max(1);
    let decay = HOP_DECAY.powi(hops as i32 - 1);
    let raw = SUCCESS_TRUST_SHARE * path.trust_score
        + SUCCESS_PRIOR_SHARE * relationship_prior(path)
        + SUCCESS_COMPAT_SHARE * compatibility;
    (raw * decay).clamp(0.0, 1.0)
}

/// Recency and frequency of the source's own relationship on the path
pub fn timing_factor(path: &IntroPath, as_of: DateTime<Utc>, config: &TimingConfig) -> f64 {
    let Some(first_hop) = path.connections.first() else {
        return 0.0;
    };
    let recency = match first_hop.last_interaction_at {
        Some(at) => {
            let days = ((as_of - at).num_seconds() as f64 / 86_400.0).max(0.0);
            0.5_f64.powf(days / config.recency_half_life_days)
        }
        None => config.unknown_recency,
    };
    let frequency = if config.frequency_saturation == 0 {
        1.0
    } else {
        (first_hop.interaction_frequency as f64 / config.frequency_saturation as f64).min(1.0)
    };
    (0.7 * recency + 0.3 * frequency).clamp(0.0, 1.0)
}
