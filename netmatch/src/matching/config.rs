//! Matching configuration
//!
//! ```toml
//! [matching]
//! min_compatibility_score = 0.3
//! min_success_probability = 0.2
//! max_degree_of_separation = 3
//! enabled_match_types = ["INVESTMENT", "HIRING"]
//! weight_policy = "normalize"
//! priority_weights = { value_potential = 0.35, success_probability = 0.30, trust_level = 0.20, timing = 0.15 }
//! priority_thresholds = { critical = 0.85, high = 0.70, medium = 0.50 }
//! ```

use crate::errors::{MatchError, MatchResult};
use crate::models::{MatchType, Priority};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tolerance when checking that weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Weights of the overall score components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    #[serde(default = "default_value_weight")]
    pub value_potential: f64,
    #[serde(default = "default_success_weight")]
    pub success_probability: f64,
    #[serde(default = "default_trust_weight")]
    pub trust_level: f64,
    #[serde(default = "default_timing_weight")]
    pub timing: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            value_potential: default_value_weight(),
            success_probability: default_success_weight(),
            trust_level: default_trust_weight(),
            timing: default_timing_weight(),
        }
    }
}

fn default_value_weight() -> f64 {
    0.35
}
fn default_success_weight() -> f64 {
    0.30
}
fn default_trust_weight() -> f64 {
    0.20
}
fn default_timing_weight() -> f64 {
    0.15
}

impl PriorityWeights {
    pub fn sum(&self) -> f64 {
        self.value_potential + self.success_probability + self.trust_level + self.timing
    }

    /// Validate that weights sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        (self.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum > 0.0 {
            self.value_potential /= sum;
            self.success_probability /= sum;
            self.trust_level /= sum;
            self.timing /= sum;
        }
    }

    fn all_finite_non_negative(&self) -> bool {
        [
            self.value_potential,
            self.success_probability,
            self.trust_level,
            self.timing,
        ]
        .iter()
        .all(|w| w.is_finite() && *w >= 0.0)
    }

    /// Weighted combination, clamped to [0, 1]
    pub fn combine(&self, value: f64, success: f64, trust: f64, timing: f64) -> f64 {
        (self.value_potential * value
            + self.success_probability * success
            + self.trust_level * trust
            + self.timing * timing)
            .clamp(0.0, 1.0)
    }
}

/// Overall-score cut-offs for each priority bucket (inclusive lower bounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityThresholds {
    #[serde(default = "default_critical")]
    pub critical: f64,
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            critical: default_critical(),
            high: default_high(),
            medium: default_medium(),
        }
    }
}

fn default_critical() -> f64 {
    0.85
}
fn default_high() -> f64 {
    0.70
}
fn default_medium() -> f64 {
    0.50
}

impl PriorityThresholds {
    /// Pure function of the score; equal to a threshold lands in that bucket
    pub fn classify(&self, overall_score: f64) -> Priority {
        if overall_score >= self.critical {
            Priority::Critical
        } else if overall_score >= self.high {
            Priority::High
        } else if overall_score >= self.medium {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

/// What to do with priority weights that do not sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPolicy {
    #[default]
    Reject,
    Normalize,
}

/// Recency and frequency parameters for the timing factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Days after which recency counts half
    #[serde(default = "default_half_life")]
    pub recency_half_life_days: f64,
    /// Interactions per period at which frequency saturates
    #[serde(default = "default_frequency_saturation")]
    pub frequency_saturation: u32,
    /// Recency assumed for edges with no recorded interaction
    #[serde(default = "default_unknown_recency")]
    pub unknown_recency: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            recency_half_life_days: default_half_life(),
            frequency_saturation: default_frequency_saturation(),
            unknown_recency: default_unknown_recency(),
        }
    }
}

fn default_half_life() -> f64 {
    90.0
}
fn default_frequency_saturation() -> u32 {
    12
}
fn default_unknown_recency() -> f64 {
    0.3
}

/// Configuration for one `find_matches` run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_min_compatibility")]
    pub min_compatibility_score: f64,

    #[serde(default = "default_min_success")]
    pub min_success_probability: f64,

    #[serde(default = "default_enabled_types")]
    pub enabled_match_types: Vec<MatchType>,

    #[serde(default = "default_max_degree")]
    pub max_degree_of_separation: usize,

    #[serde(default)]
    pub priority_weights: PriorityWeights,

    #[serde(default)]
    pub priority_thresholds: PriorityThresholds,

    #[serde(default)]
    pub weight_policy: WeightPolicy,

    #[serde(default)]
    pub timing: TimingConfig,

    /// Keep at most this many matches per match type
    #[serde(default)]
    pub max_results_per_type: Option<usize>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_compatibility_score: default_min_compatibility(),
            min_success_probability: default_min_success(),
            enabled_match_types: default_enabled_types(),
            max_degree_of_separation: default_max_degree(),
            priority_weights: PriorityWeights::default(),
            priority_thresholds: PriorityThresholds::default(),
            weight_policy: WeightPolicy::default(),
            timing: TimingConfig::default(),
            max_results_per_type: None,
        }
    }
}

fn default_min_compatibility() -> f64 {
    0.3
}
fn default_min_success() -> f64 {
    0.2
}
fn default_enabled_types() -> Vec<MatchType> {
    MatchType::ALL.to_vec()
}
fn default_max_degree() -> usize {
    3
}

fn unit_interval(name: &str, value: f64) -> MatchResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MatchError::InvalidConfig(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )))
    }
}

impl MatchConfig {
    /// Replace the enabled types from their names.
    ///
    /// # Errors
    /// - `InvalidConfig` on an unknown match type name
    pub fn with_enabled_types(mut self, names: &[&str]) -> MatchResult<Self> {
        self.enabled_match_types = names
            .iter()
            .map(|n| n.parse::<MatchType>())
            .collect::<MatchResult<Vec<_>>>()?;
        Ok(self)
    }

    pub fn is_enabled(&self, match_type: MatchType) -> bool {
        self.enabled_match_types.contains(&match_type)
    }

    /// Check the configuration and return the copy a run should use.
    ///
    /// Under `WeightPolicy::Normalize` weights that do not sum to 1.0 are
    /// rescaled with a warning; under `Reject` they are an error.
    ///
    /// # Errors
    /// - `InvalidConfig` for any out-of-range or inconsistent setting
    pub fn validated(&self) -> MatchResult<MatchConfig> {
        let mut config = self.clone();

        unit_interval("min_compatibility_score", config.min_compatibility_score)?;
        unit_interval("min_success_probability", config.min_success_probability)?;

        if config.enabled_match_types.is_empty() {
            return Err(MatchError::InvalidConfig(
                "at least one match type must be enabled".into(),
            ));
        }
        config.enabled_match_types.sort();
        config.enabled_match_types.dedup();

        if config.max_degree_of_separation == 0 {
            return Err(MatchError::InvalidConfig(
                "max_degree_of_separation must be at least 1".into(),
            ));
        }

        let weights = &mut config.priority_weights;
        if !weights.all_finite_non_negative() {
            return Err(MatchError::InvalidConfig(
                "priority weights must be finite and non-negative".into(),
            ));
        }
        if weights.sum() <= 0.0 {
            return Err(MatchError::InvalidConfig(
                "priority weights must not all be zero".into(),
            ));
        }
        if !weights.is_valid() {
            match config.weight_policy {
                WeightPolicy::Reject => {
                    return Err(MatchError::InvalidConfig(format!(
                        "priority weights must sum to 1.0, got {:.4}",
                        weights.sum()
                    )));
                }
                WeightPolicy::Normalize => {
                    warn!(
                        "Priority weights sum to {:.4}, normalizing to 1.0",
                        weights.sum()
                    );
                    weights.normalize();
                }
            }
        }

        let t = &config.priority_thresholds;
        for (name, value) in [("critical", t.critical), ("high", t.high), ("medium", t.medium)] {
            unit_interval(name, value)?;
        }
        if !(t.critical >= t.high && t.high >= t.medium) {
            return Err(MatchError::InvalidConfig(format!(
                "priority thresholds must satisfy critical >= high >= medium, got {} / {} / {}",
                t.critical, t.high, t.medium
            )));
        }

        if !(config.timing.recency_half_life_days > 0.0) {
            return Err(MatchError::InvalidConfig(
                "recency_half_life_days must be positive".into(),
            ));
        }
        unit_interval("unknown_recency", config.timing.unknown_recency)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MatchConfig::default().validated().unwrap();
        assert!(config.priority_weights.is_valid());
        assert_eq!(config.enabled_match_types.len(), MatchType::ALL.len());
    }

    #[test]
    fn test_priority_boundaries() {
        let t = PriorityThresholds::default();
        assert_eq!(t.classify(0.85), Priority::Critical);
        assert_eq!(t.classify(0.8499999), Priority::High);
        assert_eq!(t.classify(0.70), Priority::High);
        assert_eq!(t.classify(0.50), Priority::Medium);
        assert_eq!(t.classify(0.4999), Priority::Low);
        assert_eq!(t.classify(0.0), Priority::Low);
    }

    #[test]
    fn test_unnormalized_weights_rejected_by_default() {
        let mut config = MatchConfig::default();
        config.priority_weights.trust_level = 0.5;
        assert!(matches!(
            config.validated(),
            Err(MatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unnormalized_weights_normalized_on_request() {
        let config = MatchConfig {
            weight_policy: WeightPolicy::Normalize,
            priority_weights: PriorityWeights {
                value_potential: 2.0,
                success_probability: 1.0,
                trust_level: 1.0,
                timing: 0.0,
            },
            ..Default::default()
        };
        let validated = config.validated().unwrap();
        assert!(validated.priority_weights.is_valid());
        assert!((validated.priority_weights.value_potential - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_match_type_rejected() {
        let err = MatchConfig::default()
            .with_enabled_types(&["HIRING", "TELEPATHY"])
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidConfig(_)));

        let ok = MatchConfig::default()
            .with_enabled_types(&["hiring", "investment"])
            .unwrap();
        assert!(ok.is_enabled(MatchType::Hiring));
        assert!(!ok.is_enabled(MatchType::Event));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad_thresholds = MatchConfig {
            priority_thresholds: PriorityThresholds {
                critical: 0.6,
                high: 0.7,
                medium: 0.5,
            },
            ..Default::default()
        };
        assert!(bad_thresholds.validated().is_err());

        let no_types = MatchConfig {
            enabled_match_types: vec![],
            ..Default::default()
        };
        assert!(no_types.validated().is_err());

        let zero_degree = MatchConfig {
            max_degree_of_separation: 0,
            ..Default::default()
        };
        assert!(zero_degree.validated().is_err());

        let floor = MatchConfig {
            min_success_probability: 1.5,
            ..Default::default()
        };
        assert!(floor.validated().is_err());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
min_compatibility_score = 0.4
enabled_match_types = ["INVESTMENT", "KNOWLEDGE_EXCHANGE"]
weight_policy = "normalize"
priority_weights = { value_potential = 0.5, success_probability = 0.5 }
"#;
        let config: MatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.min_compatibility_score, 0.4);
        assert_eq!(config.weight_policy, WeightPolicy::Normalize);
        // unspecified weights keep their defaults
        assert_eq!(config.priority_weights.trust_level, 0.20);
        assert_eq!(config.max_degree_of_separation, 3);
    }
}
