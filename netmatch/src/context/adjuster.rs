//! Contextual re-scoring of a base match.
//!
//! 1. Deal-breakers are checked first. A violated one pulls the score down
//!    by [`DEAL_BREAKER_PENALTY`] (floored at 0) and says why; the match is
//!    never dropped here.
//! 2. Context alignment is a weighted sum of factors, with weights that
//!    depend on the goal's context.
//! 3. Preference compatibility compares styles, channels and geography.
//! 4. `adjusted = clamp(base + (preference * urgency - 0.5) * 0.4, 0, 1)`
//!    where `preference` blends alignment and preference compatibility.

use super::dealbreaker::parse_deal_breakers;
use super::goal::{ContextualGoal, GoalContext};
use crate::errors::MatchResult;
use crate::matching::signals::seniority_lift;
use crate::models::{Contact, Match, MatchReason, MatchType};
use crate::scoring::{normalize, CompatibilityScorer, STRONG_SIGNAL};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Subtracted from the base score when a deal-breaker fails
pub const DEAL_BREAKER_PENALTY: f64 = 0.5;

/// Scale of the contextual shift around the base score
const ADJUSTMENT_SCALE: f64 = 0.4;

/// Share of context alignment in the preference score
const ALIGNMENT_SHARE: f64 = 0.7;

/// Weight of each goal constraint that is present
const CONSTRAINT_WEIGHT: f64 = 0.15;

/// Preference score when nothing can be compared
const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Factor {
    FundingCapacity,
    NeedsAlignment,
    SkillsMatch,
    Seniority,
    IndustryFit,
    Relationship,
    Compatibility,
    Budget,
    LocationFit,
}

impl Factor {
    fn key(&self) -> &'static str {
        match self {
            Factor::FundingCapacity => "funding_capacity",
            Factor::NeedsAlignment => "needs_alignment",
            Factor::SkillsMatch => "skills_match",
            Factor::Seniority => "seniority",
            Factor::IndustryFit => "industry_fit",
            Factor::Relationship => "relationship",
            Factor::Compatibility => "compatibility",
            Factor::Budget => "budget",
            Factor::LocationFit => "location_fit",
        }
    }

    fn strong_reason(&self, target: &Contact) -> String {
        let who = target.label();
        match self {
            Factor::FundingCapacity => format!("{} has strong funding capacity", who),
            Factor::NeedsAlignment => format!("{} covers the needs of this goal", who),
            Factor::SkillsMatch => format!("{} has the skills this goal calls for", who),
            Factor::Seniority => format!("{} is well placed to help", who),
            Factor::IndustryFit => format!("{} works in a target industry", who),
            Factor::Relationship => format!("Your path to {} is strong", who),
            Factor::Compatibility => format!("You and {} are highly compatible", who),
            Factor::Budget => format!("{} has the budget", who),
            Factor::LocationFit => format!("{} is in a preferred location", who),
        }
    }
}

/// Factor weights per context; each row sums to 1.0
fn context_weights(context: GoalContext) -> &'static [(Factor, f64)] {
    use Factor::*;
    match context {
        GoalContext::Fundraising => &[
            (FundingCapacity, 0.35),
            (NeedsAlignment, 0.25),
            (IndustryFit, 0.15),
            (Seniority, 0.15),
            (Relationship, 0.10),
        ],
        GoalContext::Hiring => &[
            (SkillsMatch, 0.40),
            (NeedsAlignment, 0.20),
            (Seniority, 0.15),
            (IndustryFit, 0.15),
            (Relationship, 0.10),
        ],
        GoalContext::JobSearch => &[
            (Seniority, 0.30),
            (IndustryFit, 0.25),
            (Relationship, 0.25),
            (NeedsAlignment, 0.20),
        ],
        GoalContext::Partnership => &[
            (NeedsAlignment, 0.30),
            (IndustryFit, 0.25),
            (Compatibility, 0.25),
            (Relationship, 0.20),
        ],
        GoalContext::Mentorship => &[
            (Seniority, 0.35),
            (SkillsMatch, 0.30),
            (Relationship, 0.20),
            (Compatibility, 0.15),
        ],
        GoalContext::Sales => &[
            (Budget, 0.35),
            (IndustryFit, 0.25),
            (Seniority, 0.20),
            (Relationship, 0.20),
        ],
        GoalContext::Learning => &[
            (SkillsMatch, 0.40),
            (Seniority, 0.25),
            (Compatibility, 0.20),
            (Relationship, 0.15),
        ],
        GoalContext::Networking => &[
            (Compatibility, 0.30),
            (Relationship, 0.30),
            (IndustryFit, 0.20),
            (NeedsAlignment, 0.20),
        ],
    }
}

/// Contextual score for one match and goal.
#[derive(Debug, Clone, Serialize)]
pub struct ContextualMatchScore {
    pub match_id: String,
    pub target_id: String,
    pub base_score: f64,
    pub context_alignment: f64,
    pub preference_compatibility: f64,
    /// Blend of alignment and preference compatibility
    pub preference_score: f64,
    pub urgency_factor: f64,
    pub adjusted_score: f64,
    pub deal_breaker_violated: bool,
    pub factors: BTreeMap<String, f64>,
    pub reasons: Vec<MatchReason>,
}

/// Re-weights base matches against a goal.
#[derive(Debug, Clone, Default)]
pub struct ContextualAdjuster {
    scorer: CompatibilityScorer,
}

impl ContextualAdjuster {
    pub fn new(scorer: CompatibilityScorer) -> Self {
        Self { scorer }
    }

    /// Fraction of `wanted` covered by the target's skills and offerings
    fn coverage(&self, wanted: &[String], target: &Contact) -> f64 {
        if wanted.is_empty() {
            return 0.0;
        }
        let available: Vec<String> = target
            .skills
            .iter()
            .chain(target.offerings.iter())
            .cloned()
            .collect();
        self.scorer.covered(wanted, &available).len() as f64 / wanted.len() as f64
    }

    fn factor(
        &self,
        factor: Factor,
        m: &Match,
        goal: &ContextualGoal,
        source: &Contact,
        target: &Contact,
    ) -> f64 {
        let vocab = self.scorer.vocabulary();
        let needs = if goal.specific_needs.is_empty() {
            &source.needs
        } else {
            &goal.specific_needs
        };
        match factor {
            Factor::FundingCapacity => {
                let declared = target.metadata.funding();
                let offers_capital = vocab
                    .triggers(MatchType::Investment)
                    .is_some_and(|t| vocab.mentions_any(&target.offerings, &t.offer_keywords));
                if declared > 0.0 {
                    declared
                } else if offers_capital {
                    NEUTRAL
                } else {
                    0.0
                }
            }
            Factor::NeedsAlignment => self.coverage(needs, target),
            Factor::SkillsMatch => {
                if needs.is_empty() {
                    0.0
                } else {
                    self.scorer.covered(needs, &target.skills).len() as f64 / needs.len() as f64
                }
            }
            Factor::Seniority => seniority_lift(&self.scorer, source, target),
            Factor::IndustryFit => {
                if goal.constraints.industries.is_empty() {
                    vocab.industry_similarity(&source.industry, &target.industry)
                } else {
                    goal.constraints
                        .industries
                        .iter()
                        .map(|i| vocab.industry_similarity(i, &target.industry))
                        .fold(0.0, f64::max)
                }
            }
            Factor::Relationship => m.success_probability,
            Factor::Compatibility => m.compatibility_score,
            Factor::Budget => match (target.metadata.budget, goal.constraints.min_budget) {
                (Some(budget), Some(min)) if min > 0.0 => (budget / min).min(1.0),
                (Some(budget), _) => ((budget + 1.0).log10() / 6.0).min(1.0),
                (None, _) => 0.0,
            },
            Factor::LocationFit => {
                let here = normalize(&target.location);
                let hit = goal
                    .constraints
                    .locations
                    .iter()
                    .any(|l| !here.is_empty() && vocab.terms_match(&target.location, l));
                if hit {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Mean of the comparable preference signals, or neutral
    fn preference_compatibility(&self, goal: &ContextualGoal, target: &Contact) -> f64 {
        let prefs = &goal.preferences;
        let attrs = &target.metadata;
        let mut parts: Vec<f64> = Vec::new();

        if let (Some(want), Some(have)) = (prefs.communication_style, attrs.communication_style) {
            parts.push(want.compatibility(&have));
        }
        if let (Some(want), Some(have)) = (prefs.working_style, attrs.working_style) {
            parts.push(want.compatibility(&have));
        }
        if !prefs.channels.is_empty() && !attrs.preferred_channels.is_empty() {
            let vocab = self.scorer.vocabulary();
            let theirs: Vec<String> = attrs
                .preferred_channels
                .iter()
                .map(|c| vocab.canonical_channel(c))
                .collect();
            let shared = prefs
                .channels
                .iter()
                .filter(|c| theirs.contains(&vocab.canonical_channel(c)))
                .count();
            parts.push(shared as f64 / prefs.channels.len() as f64);
        }
        if !goal.constraints.locations.is_empty() && !target.location.is_empty() {
            let vocab = self.scorer.vocabulary();
            let near = goal
                .constraints
                .locations
                .iter()
                .any(|l| vocab.terms_match(&target.location, l));
            parts.push(if near { 1.0 } else { 0.0 });
        }

        if parts.is_empty() {
            NEUTRAL
        } else {
            parts.iter().sum::<f64>() / parts.len() as f64
        }
    }

    /// Score `m` against `goal`.
    ///
    /// # Errors
    /// - `InvalidConfig` if the goal does not validate
    pub fn adjust(
        &self,
        m: &Match,
        goal: &ContextualGoal,
        source: &Contact,
        target: &Contact,
    ) -> MatchResult<ContextualMatchScore> {
        goal.validate()?;
        let base = m.overall_score;
        let mut reasons = Vec::new();

        let (rules, unparsed) = parse_deal_breakers(&goal.deal_breakers);
        let violated: Vec<_> = rules
            .iter()
            .filter(|r| !r.is_satisfied_by(target, &self.scorer))
            .collect();
        for rule in &violated {
            reasons.push(MatchReason::new(
                format!("Deal-breaker: {} {}", target.label(), rule),
                0.0,
            ));
        }
        for rule in &unparsed {
            reasons.push(MatchReason::new(
                format!("Deal-breaker not evaluated: '{}'", rule),
                0.0,
            ));
        }

        let mut weighted: Vec<(Factor, f64)> = context_weights(goal.context).to_vec();
        if !goal.constraints.locations.is_empty() {
            weighted.push((Factor::LocationFit, CONSTRAINT_WEIGHT));
        }
        if !goal.constraints.industries.is_empty()
            && !weighted.iter().any(|(f, _)| *f == Factor::IndustryFit)
        {
            weighted.push((Factor::IndustryFit, CONSTRAINT_WEIGHT));
        }
        if goal.constraints.min_budget.is_some()
            && !weighted.iter().any(|(f, _)| *f == Factor::Budget)
        {
            weighted.push((Factor::Budget, CONSTRAINT_WEIGHT));
        }

        let mut factors = BTreeMap::new();
        let mut total = 0.0;
        let mut weight_sum = 0.0;
        for &(factor, weight) in &weighted {
            let score = self.factor(factor, m, goal, source, target).clamp(0.0, 1.0);
            factors.insert(factor.key().to_string(), score);
            total += weight * score;
            weight_sum += weight;
            if score >= STRONG_SIGNAL {
                reasons.push(MatchReason::new(factor.strong_reason(target), score));
            }
        }
        let context_alignment = if weight_sum > 0.0 { total / weight_sum } else { 0.0 };

        if !goal.constraints.locations.is_empty()
            && factors.get(Factor::LocationFit.key()) == Some(&0.0)
        {
            reasons.push(
                MatchReason::new(format!("{} is outside preferred locations", target.label()), 0.0)
                    .with_evidence(goal.constraints.locations.clone()),
            );
        }
        if let (Some(min), Some(score)) =
            (goal.constraints.min_budget, factors.get(Factor::Budget.key()))
        {
            if *score < 1.0 {
                reasons.push(MatchReason::new(
                    format!("{} may not meet the minimum budget of {}", target.label(), min),
                    *score,
                ));
            }
        }

        let preference_compatibility = self.preference_compatibility(goal, target);
        let preference_score = ALIGNMENT_SHARE * context_alignment
            + (1.0 - ALIGNMENT_SHARE) * preference_compatibility;
        let urgency = goal.urgency();

        let adjusted = if violated.is_empty() {
            (base + (preference_score * urgency - 0.5) * ADJUSTMENT_SCALE).clamp(0.0, 1.0)
        } else {
            (base - DEAL_BREAKER_PENALTY).max(0.0)
        };

        debug!(
            "Contextual score for {}: base {:.3} -> {:.3} (alignment {:.3}, urgency {:.3})",
            m.id, base, adjusted, context_alignment, urgency
        );

        Ok(ContextualMatchScore {
            match_id: m.id.clone(),
            target_id: target.id.clone(),
            base_score: base,
            context_alignment,
            preference_compatibility,
            preference_score,
            urgency_factor: urgency,
            adjusted_score: adjusted,
            deal_breaker_violated: !violated.is_empty(),
            factors,
            reasons,
        })
    }

    /// Score every match and sort by adjusted score, best first
    pub fn rerank(
        &self,
        matches: &[Match],
        goal: &ContextualGoal,
    ) -> MatchResult<Vec<ContextualMatchScore>> {
        let mut scored = matches
            .iter()
            .map(|m| self.adjust(m, goal, &m.source_contact, &m.target_contact))
            .collect::<MatchResult<Vec<_>>>()?;
        scored.sort_by(|a, b| {
            b.adjusted_score
                .partial_cmp(&a.adjusted_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.match_id.cmp(&b.match_id))
        });
        Ok(scored)
    }
}
