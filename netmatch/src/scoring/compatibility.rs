//! Pairwise compatibility features between two contact profiles.
//!
//! ```text
//! compatibility = complementarity × W₁ + skills × W₂ + industry × W₃
//!               + experience × W₄ + interests × W₅
//! ```
//!
//! Complementarity (what one side needs, the other offers) carries the most
//! weight; experience fit favors peers and slightly more senior targets.

use super::vocabulary::Vocabulary;
use crate::attributes::Seniority;
use crate::errors::{MatchError, MatchResult};
use crate::matching::WeightPolicy;
use crate::models::{Contact, MatchReason};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Feature score at or above which a reason is emitted
pub const STRONG_SIGNAL: f64 = 0.8;

/// Neutral experience fit when either seniority is unknown
const UNKNOWN_EXPERIENCE_FIT: f64 = 0.5;

/// Share of complementarity coming from the source's own needs
const FORWARD_NEED_SHARE: f64 = 0.7;

/// Weights of the compatibility features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_complementarity")]
    pub complementarity: f64,
    #[serde(default = "default_skills")]
    pub skills: f64,
    #[serde(default = "default_industry")]
    pub industry: f64,
    #[serde(default = "default_experience")]
    pub experience: f64,
    #[serde(default = "default_interests")]
    pub interests: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            complementarity: default_complementarity(),
            skills: default_skills(),
            industry: default_industry(),
            experience: default_experience(),
            interests: default_interests(),
        }
    }
}

fn default_complementarity() -> f64 {
    0.40
}
fn default_skills() -> f64 {
    0.20
}
fn default_industry() -> f64 {
    0.15
}
fn default_experience() -> f64 {
    0.15
}
fn default_interests() -> f64 {
    0.10
}

impl ScoringWeights {
    fn values(&self) -> [f64; 5] {
        [
            self.complementarity,
            self.skills,
            self.industry,
            self.experience,
            self.interests,
        ]
    }

    /// Validate that weights sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        let sum: f64 = self.values().iter().sum();
        (sum - 1.0).abs() < 0.001
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum: f64 = self.values().iter().sum();
        if sum > 0.0 {
            self.complementarity /= sum;
            self.skills /= sum;
            self.industry /= sum;
            self.experience /= sum;
            self.interests /= sum;
        }
    }
}

/// Per-feature scores for one (source, target) pair
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompatibilityBreakdown {
    pub complementarity: f64,
    pub skills: f64,
    pub industry: f64,
    pub experience: f64,
    pub interests: f64,
    pub total: f64,
    /// Source needs the target can cover
    pub needs_met: Vec<String>,
    /// Target needs the source can cover
    pub needs_offered: Vec<String>,
    pub shared_skills: Vec<String>,
    pub shared_interests: Vec<String>,
    pub reasons: Vec<MatchReason>,
}

/// Compatibility scorer with injected vocabulary and weights.
#[derive(Debug, Clone)]
pub struct CompatibilityScorer {
    vocabulary: Arc<Vocabulary>,
    weights: ScoringWeights,
}

impl Default for CompatibilityScorer {
    fn default() -> Self {
        Self {
            vocabulary: Arc::new(Vocabulary::default()),
            weights: ScoringWeights::default(),
        }
    }
}

impl CompatibilityScorer {
    /// Weights that do not sum to 1.0 are handled per `policy`.
    ///
    /// # Errors
    /// - `InvalidConfig` if any weight is negative/NaN or all weights are zero
    /// - `InvalidConfig` under `WeightPolicy::Reject` if the sum is not 1.0
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        mut weights: ScoringWeights,
        policy: WeightPolicy,
    ) -> MatchResult<Self> {
        if weights.values().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MatchError::InvalidConfig(
                "compatibility weights must be finite and non-negative".into(),
            ));
        }
        let sum: f64 = weights.values().iter().sum();
        if sum <= 0.0 {
            return Err(MatchError::InvalidConfig(
                "compatibility weights must not all be zero".into(),
            ));
        }
        if !weights.is_valid() {
            match policy {
                WeightPolicy::Reject => {
                    return Err(MatchError::InvalidConfig(format!(
                        "compatibility weights must sum to 1.0, got {:.4}",
                        sum
                    )));
                }
                WeightPolicy::Normalize => {
                    warn!("Compatibility weights sum to {:.4}, normalizing to 1.0", sum);
                    weights.normalize();
                }
            }
        }
        Ok(Self { vocabulary, weights })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Declared seniority, else inferred from years, else from the title
    pub fn resolve_seniority(&self, contact: &Contact) -> Option<Seniority> {
        contact
            .metadata
            .seniority
            .or_else(|| contact.metadata.years_experience.map(Seniority::from_years))
            .or_else(|| self.vocabulary.infer_seniority(&contact.title))
    }

    /// Items of `wanted` that some item of `available` satisfies
    pub fn covered(&self, wanted: &[String], available: &[String]) -> Vec<String> {
        wanted
            .iter()
            .filter(|w| available.iter().any(|a| self.vocabulary.terms_match(w, a)))
            .cloned()
            .collect()
    }

    /// Dice coefficient over fuzzy-matched term sets
    fn overlap(&self, a: &[String], b: &[String]) -> (f64, Vec<String>) {
        if a.is_empty() || b.is_empty() {
            return (0.0, Vec::new());
        }
        let shared = self.covered(a, b);
        let matched = shared.len().min(b.len()) as f64;
        let score = (2.0 * matched / (a.len() + b.len()) as f64).min(1.0);
        (score, shared)
    }

    fn complementarity(&self, source: &Contact, target: &Contact) -> (f64, Vec<String>, Vec<String>) {
        let needs_met = self.covered(&source.needs, &target.offerings);
        let needs_offered = self.covered(&target.needs, &source.offerings);

        let mut weighted = 0.0;
        let mut weight_sum = 0.0;
        if !source.needs.is_empty() {
            weighted += FORWARD_NEED_SHARE * needs_met.len() as f64 / source.needs.len() as f64;
            weight_sum += FORWARD_NEED_SHARE;
        }
        if !target.needs.is_empty() {
            weighted += (1.0 - FORWARD_NEED_SHARE) * needs_offered.len() as f64
                / target.needs.len() as f64;
            weight_sum += 1.0 - FORWARD_NEED_SHARE;
        }
        let score = if weight_sum > 0.0 { weighted / weight_sum } else { 0.0 };
        (score, needs_met, needs_offered)
    }

    /// Fit of the target's seniority relative to the source
    pub fn experience_fit(&self, source: &Contact, target: &Contact) -> f64 {
        match (self.resolve_seniority(source), self.resolve_seniority(target)) {
            (Some(s), Some(t)) => seniority_gap_fit(t.level() as i32 - s.level() as i32),
            _ => UNKNOWN_EXPERIENCE_FIT,
        }
    }

    /// Score every feature for `source` looking at `target`
    pub fn score(&self, source: &Contact, target: &Contact) -> CompatibilityBreakdown {
        let (complementarity, needs_met, needs_offered) = self.complementarity(source, target);
        let (skills, shared_skills) = self.overlap(&source.skills, &target.skills);
        let (interests, shared_interests) = self.overlap(&source.interests, &target.interests);
        let industry = self
            .vocabulary
            .industry_similarity(&source.industry, &target.industry);
        let experience = self.experience_fit(source, target);

        let w = &self.weights;
        let total = (complementarity * w.complementarity
            + skills * w.skills
            + industry * w.industry
            + experience * w.experience
            + interests * w.interests)
            .clamp(0.0, 1.0);

        let mut reasons = Vec::new();
        if !needs_met.is_empty() {
            reasons.push(
                MatchReason::new(
                    format!("{} offers what you need", target.label()),
                    complementarity,
                )
                .with_evidence(needs_met.clone()),
            );
        }
        if !needs_offered.is_empty() {
            reasons.push(
                MatchReason::new(
                    format!("You can help {} with their needs", target.label()),
                    complementarity,
                )
                .with_evidence(needs_offered.clone()),
            );
        }
        if skills >= STRONG_SIGNAL {
            reasons.push(
                MatchReason::new("Strong skill overlap", skills).with_evidence(shared_skills.clone()),
            );
        }
        if industry >= STRONG_SIGNAL {
            reasons.push(
                MatchReason::new("Same industry", industry)
                    .with_evidence(vec![target.industry.clone()]),
            );
        }
        if experience >= STRONG_SIGNAL && self.resolve_seniority(target).is_some() {
            reasons.push(MatchReason::new("Good seniority fit", experience));
        }
        if interests >= STRONG_SIGNAL {
            reasons.push(
                MatchReason::new("Shared interests", interests)
                    .with_evidence(shared_interests.clone()),
            );
        }

        CompatibilityBreakdown {
            complementarity,
            skills,
            industry,
            experience,
            interests,
            total,
            needs_met,
            needs_offered,
            shared_skills,
            shared_interests,
            reasons,
        }
    }
}

/// Peers and up to two levels more senior fit best
fn seniority_gap_fit(gap: i32) -> f64 {
    match gap {
        0..=2 => 1.0,
        -1 => 0.8,
        3 => 0.7,
        g => (1.0 - 0.15 * g.abs() as f64).max(0.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ExtensionAttributes;

    fn founder() -> Contact {
        Contact::new("founder", "Fay")
            .with_title("Founder")
            .with_industry("SaaS")
            .with_skills(&["product management", "python", "sales"])
            .with_interests(&["climate", "running"])
            .with_needs(&["seed funding", "ML engineer"])
            .with_offerings(&["product advice"])
    }

    #[test]
    fn test_complementarity_dominates() {
        let scorer = CompatibilityScorer::default();
        let investor = Contact::new("inv", "Ivan")
            .with_title("Partner")
            .with_industry("venture capital")
            .with_offerings(&["capital", "board experience"])
            .with_needs(&["product advice"]);
        let stranger = Contact::new("x", "Xena")
            .with_industry("retail")
            .with_skills(&["merchandising"]);

        let with_investor = scorer.score(&founder(), &investor);
        let with_stranger = scorer.score(&founder(), &stranger);

        assert_eq!(with_investor.needs_met, vec!["seed funding"]);
        assert_eq!(with_investor.needs_offered, vec!["product advice"]);
        // 0.7 * 1/2 + 0.3 * 1/1
        assert!((with_investor.complementarity - 0.65).abs() < 1e-9);
        assert!(with_investor.total > with_stranger.total);
        assert!(with_investor
            .reasons
            .iter()
            .any(|r| r.description.contains("offers what you need")));
    }

    #[test]
    fn test_skill_and_interest_overlap() {
        let scorer = CompatibilityScorer::default();
        let peer = Contact::new("p", "Pat")
            .with_industry("software")
            .with_skills(&["Python", "sales", "PM"])
            .with_interests(&["climate", "running"]);
        let breakdown = scorer.score(&founder(), &peer);
        assert!((breakdown.skills - 1.0).abs() < 1e-9);
        assert!((breakdown.interests - 1.0).abs() < 1e-9);
        assert_eq!(breakdown.industry, 1.0);
        assert!(breakdown.total <= 1.0);
    }

    #[test]
    fn test_empty_profiles_score_neutral_experience_only() {
        let scorer = CompatibilityScorer::default();
        let a = Contact::new("a", "A");
        let b = Contact::new("b", "B");
        let breakdown = scorer.score(&a, &b);
        assert_eq!(breakdown.complementarity, 0.0);
        assert!((breakdown.total - UNKNOWN_EXPERIENCE_FIT * 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_seniority_resolution_order() {
        let scorer = CompatibilityScorer::default();
        let declared = Contact::new("d", "D")
            .with_title("Intern")
            .with_metadata(ExtensionAttributes::default().with_seniority(Seniority::Lead));
        assert_eq!(scorer.resolve_seniority(&declared), Some(Seniority::Lead));

        let by_years = Contact::new("y", "Y")
            .with_title("CEO")
            .with_metadata(ExtensionAttributes::default().with_years(4));
        assert_eq!(scorer.resolve_seniority(&by_years), Some(Seniority::Mid));

        let by_title = Contact::new("t", "T").with_title("Director of Sales");
        assert_eq!(scorer.resolve_seniority(&by_title), Some(Seniority::Director));
    }

    #[test]
    fn test_seniority_gap_fit() {
        assert_eq!(seniority_gap_fit(0), 1.0);
        assert_eq!(seniority_gap_fit(2), 1.0);
        assert_eq!(seniority_gap_fit(-1), 0.8);
        assert!((seniority_gap_fit(-3) - 0.55).abs() < 1e-9);
        assert_eq!(seniority_gap_fit(-6), 0.1);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let vocab = Arc::new(Vocabulary::default());
        let mut weights = ScoringWeights::default();
        weights.skills = -0.1;
        assert!(CompatibilityScorer::new(vocab.clone(), weights, WeightPolicy::Normalize).is_err());

        let zero = ScoringWeights {
            complementarity: 0.0,
            skills: 0.0,
            industry: 0.0,
            experience: 0.0,
            interests: 0.0,
        };
        assert!(CompatibilityScorer::new(vocab.clone(), zero, WeightPolicy::Normalize).is_err());
    }

    #[test]
    fn test_unnormalized_weights_follow_policy() {
        let vocab = Arc::new(Vocabulary::default());
        let unnormalized = ScoringWeights {
            complementarity: 4.0,
            skills: 2.0,
            industry: 2.0,
            experience: 1.0,
            interests: 1.0,
        };
        assert!(matches!(
            CompatibilityScorer::new(vocab.clone(), unnormalized.clone(), WeightPolicy::Reject),
            Err(MatchError::InvalidConfig(_))
        ));

        let scorer =
            CompatibilityScorer::new(vocab.clone(), unnormalized, WeightPolicy::Normalize).unwrap();
        assert!(scorer.weights().is_valid());
        assert!((scorer.weights().complementarity - 0.4).abs() < 1e-9);

        assert!(
            CompatibilityScorer::new(vocab, ScoringWeights::default(), WeightPolicy::Reject).is_ok()
        );
    }
}
