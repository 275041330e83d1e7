//! `netmatch.toml` configuration
//!
//! ```toml
//! [matching]
//! min_compatibility_score = 0.3
//! max_degree_of_separation = 3
//! priority_weights = { value_potential = 0.35, success_probability = 0.30, trust_level = 0.20, timing = 0.15 }
//!
//! [scoring]
//! complementarity = 0.40
//!
//! [timing]
//! recency_half_life_days = 90
//!
//! [vocabulary.skill_synonyms]
//! kubernetes = ["k8s"]
//!
//! [optimizer]
//! diversity_weight = 0.3
//! objectives = [{ name = "overall", weight = 0.6 }, { name = "hops", weight = 0.4 }]
//! ```
//!
//! A missing file means defaults. A malformed implicit file is logged and
//! ignored; an explicit `--config` file must parse.

use anyhow::{Context, Result};
use netmatch::matching::TimingConfig;
use netmatch::{
    CompatibilityScorer, MatchConfig, MatchingEngine, ScoringWeights, Vocabulary,
    VocabularyConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "netmatch.toml";

/// One optimizer objective by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSetting {
    pub name: String,
    #[serde(default = "default_objective_weight")]
    pub weight: f64,
}

fn default_objective_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_diversity_weight")]
    pub diversity_weight: f64,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_objectives")]
    pub objectives: Vec<ObjectiveSetting>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            diversity_weight: default_diversity_weight(),
            max_results: default_max_results(),
            objectives: default_objectives(),
        }
    }
}

fn default_diversity_weight() -> f64 {
    0.3
}
fn default_max_results() -> usize {
    10
}
fn default_objectives() -> Vec<ObjectiveSetting> {
    vec![
        ObjectiveSetting {
            name: "overall".into(),
            weight: 0.5,
        },
        ObjectiveSetting {
            name: "trust".into(),
            weight: 0.3,
        },
        ObjectiveSetting {
            name: "hops".into(),
            weight: 0.2,
        },
    ]
}

/// Everything `netmatch.toml` can set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetmatchConfig {
    #[serde(default)]
    pub matching: MatchConfig,

    #[serde(default)]
    pub scoring: ScoringWeights,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl NetmatchConfig {
    /// Matching config with the top-level `[timing]` section applied
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            timing: self.timing.clone(),
            ..self.matching.clone()
        }
    }

    pub fn scorer(&self) -> Result<CompatibilityScorer> {
        let vocabulary = Arc::new(Vocabulary::new(&self.vocabulary));
        CompatibilityScorer::new(
            vocabulary,
            self.scoring.clone(),
            self.matching.weight_policy,
        )
            .context("Invalid [scoring] weights")
    }

    pub fn engine(&self) -> Result<MatchingEngine> {
        Ok(MatchingEngine::new(self.scorer()?))
    }
}

/// Load `netmatch.toml` from `dir`, falling back to defaults
pub fn load_config(dir: &Path) -> NetmatchConfig {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
        return NetmatchConfig::default();
    }
    match load_config_file(&path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {:#}", path.display(), e);
            NetmatchConfig::default()
        }
    }
}

/// Load a specific config file
pub fn load_config_file(path: &Path) -> Result<NetmatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: NetmatchConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Written by `netmatch init`
pub const EXAMPLE_CONFIG: &str = r#"# netmatch configuration

[matching]
# Candidates below either floor are left out entirely
min_compatibility_score = 0.3
min_success_probability = 0.2

# Hops searched from the source contact
max_degree_of_separation = 3

# COLLABORATION, INTRODUCTION, HIRING, INVESTMENT, KNOWLEDGE_EXCHANGE, EVENT
enabled_match_types = ["COLLABORATION", "INTRODUCTION", "HIRING", "INVESTMENT", "KNOWLEDGE_EXCHANGE", "EVENT"]

# "reject" weights that do not sum to 1.0, or "normalize" them with a warning
weight_policy = "reject"

# max_results_per_type = 5

[matching.priority_weights]
value_potential = 0.35
success_probability = 0.30
trust_level = 0.20
timing = 0.15

[matching.priority_thresholds]
critical = 0.85
high = 0.70
medium = 0.50

[scoring]
complementarity = 0.40
skills = 0.20
industry = 0.15
experience = 0.15
interests = 0.10

[timing]
recency_half_life_days = 90.0
frequency_saturation = 12
unknown_recency = 0.3

[vocabulary]
related_industries = [["climate", "energy"]]

[vocabulary.skill_synonyms]
kubernetes = ["k8s"]

[optimizer]
diversity_weight = 0.3
max_results = 10
objectives = [
    { name = "overall", weight = 0.5 },
    { name = "trust", weight = 0.3 },
    { name = "hops", weight = 0.2 },
]
"#;
