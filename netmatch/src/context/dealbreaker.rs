//! Hard requirements parsed from free-text deal-breakers.
//!
//! Each entry is `key: value`:
//!
//! | key              | the target must...                      |
//! |------------------|-----------------------------------------|
//! | `location`       | be located there                        |
//! | `industry`       | work in that industry (synonyms apply)  |
//! | `not-industry`   | not work in that industry               |
//! | `skill`          | list the skill                          |
//! | `offers`         | offer it                                |
//! | `min-seniority`  | be at least that senior                 |
//! | `min-budget`     | declare at least that budget            |
//! | `communication`  | declare that communication style        |
//!
//! Attributes the target has not declared do not satisfy a requirement.

use crate::attributes::{CommunicationStyle, Seniority};
use crate::models::Contact;
use crate::scoring::CompatibilityScorer;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum DealBreaker {
    Location(String),
    Industry(String),
    NotIndustry(String),
    Skill(String),
    Offers(String),
    MinSeniority(Seniority),
    MinBudget(f64),
    Communication(CommunicationStyle),
}

impl FromStr for DealBreaker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once(':')
            .ok_or_else(|| format!("expected 'key: value', got '{}'", s.trim()))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("missing value in '{}'", s.trim()));
        }
        match key.trim().to_lowercase().replace('_', "-").as_str() {
            "location" => Ok(DealBreaker::Location(value.to_string())),
            "industry" => Ok(DealBreaker::Industry(value.to_string())),
            "not-industry" => Ok(DealBreaker::NotIndustry(value.to_string())),
            "skill" => Ok(DealBreaker::Skill(value.to_string())),
            "offers" => Ok(DealBreaker::Offers(value.to_string())),
            "min-seniority" => value.parse().map(DealBreaker::MinSeniority),
            "min-budget" => value
                .parse::<f64>()
                .ok()
                .filter(|b| b.is_finite())
                .map(DealBreaker::MinBudget)
                .ok_or_else(|| format!("invalid budget '{}'", value)),
            "communication" => value.parse().map(DealBreaker::Communication),
            other => Err(format!("unknown deal-breaker '{}'", other)),
        }
    }
}

impl fmt::Display for DealBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealBreaker::Location(v) => write!(f, "must be located in {}", v),
            DealBreaker::Industry(v) => write!(f, "must work in {}", v),
            DealBreaker::NotIndustry(v) => write!(f, "must not work in {}", v),
            DealBreaker::Skill(v) => write!(f, "must have skill {}", v),
            DealBreaker::Offers(v) => write!(f, "must offer {}", v),
            DealBreaker::MinSeniority(v) => write!(f, "must be at least {}", v),
            DealBreaker::MinBudget(v) => write!(f, "must have a budget of at least {}", v),
            DealBreaker::Communication(v) => write!(f, "must prefer {:?} communication", v),
        }
    }
}

impl DealBreaker {
    pub fn is_satisfied_by(&self, target: &Contact, scorer: &CompatibilityScorer) -> bool {
        let vocab = scorer.vocabulary();
        match self {
            DealBreaker::Location(place) => {
                !target.location.is_empty() && vocab.terms_match(&target.location, place)
            }
            DealBreaker::Industry(industry) => {
                vocab.industry_similarity(&target.industry, industry) >= 1.0
            }
            DealBreaker::NotIndustry(industry) => {
                vocab.industry_similarity(&target.industry, industry) < 1.0
            }
            DealBreaker::Skill(skill) => target.skills.iter().any(|s| vocab.terms_match(s, skill)),
            DealBreaker::Offers(offer) => target
                .offerings
                .iter()
                .any(|o| vocab.terms_match(o, offer)),
            DealBreaker::MinSeniority(min) => scorer
                .resolve_seniority(target)
                .is_some_and(|s| s.level() >= min.level()),
            DealBreaker::MinBudget(min) => target.metadata.budget.is_some_and(|b| b >= *min),
            DealBreaker::Communication(style) => {
                target.metadata.communication_style == Some(*style)
            }
        }
    }
}

/// Parse every rule; unparseable ones are returned verbatim
pub fn parse_deal_breakers(rules: &[String]) -> (Vec<DealBreaker>, Vec<String>) {
    let mut parsed = Vec::new();
    let mut unparsed = Vec::new();
    for rule in rules {
        if rule.trim().is_empty() {
            continue;
        }
        match rule.parse::<DealBreaker>() {
            Ok(db) => parsed.push(db),
            Err(e) => {
                warn!("Ignoring deal-breaker: {}", e);
                unparsed.push(rule.clone());
            }
        }
    }
    (parsed, unparsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ExtensionAttributes;

    #[test]
    fn test_parse() {
        assert_eq!(
            "Location: Berlin".parse::<DealBreaker>(),
            Ok(DealBreaker::Location("Berlin".into()))
        );
        assert_eq!(
            "min_seniority: senior".parse::<DealBreaker>(),
            Ok(DealBreaker::MinSeniority(Seniority::Senior))
        );
        assert_eq!(
            "min-budget: 50000".parse::<DealBreaker>(),
            Ok(DealBreaker::MinBudget(50000.0))
        );
        assert!("no smokers".parse::<DealBreaker>().is_err());
        assert!("skill:".parse::<DealBreaker>().is_err());
        assert!("vibe: good".parse::<DealBreaker>().is_err());
    }

    #[test]
    fn test_parse_all_keeps_unparsed() {
        let rules = vec![
            "industry: fintech".to_string(),
            "must be nice".to_string(),
            " ".to_string(),
        ];
        let (parsed, unparsed) = parse_deal_breakers(&rules);
        assert_eq!(parsed, vec![DealBreaker::Industry("fintech".into())]);
        assert_eq!(unparsed, vec!["must be nice".to_string()]);
    }

    #[test]
    fn test_evaluation() {
        let scorer = CompatibilityScorer::default();
        let target = Contact::new("t", "T")
            .with_location("Berlin")
            .with_industry("tobacco")
            .with_skills(&["rust"])
            .with_metadata(
                ExtensionAttributes::default()
                    .with_seniority(Seniority::Lead)
                    .with_budget(10_000.0),
            );

        let ok = |rule: &str| rule.parse::<DealBreaker>().unwrap().is_satisfied_by(&target, &scorer);
        assert!(ok("location: berlin"));
        assert!(!ok("location: Paris"));
        assert!(!ok("not-industry: tobacco"));
        assert!(ok("industry: tobacco"));
        assert!(ok("skill: Rust"));
        assert!(!ok("offers: mentoring"));
        assert!(ok("min-seniority: senior"));
        assert!(!ok("min-seniority: director"));
        assert!(!ok("min-budget: 20000"));
        // undeclared style does not satisfy
        assert!(!ok("communication: direct"));
    }
}
