//! Core data models for the matching engine
//!
//! Contacts and connections are the raw network snapshot; matches are what
//! the engine produces from them.

use crate::attributes::ExtensionAttributes;
use crate::errors::MatchError;
use crate::graph::IntroPath;
use crate::matching::MatchStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A person in the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub offerings: Vec<String>,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default)]
    pub metadata: ExtensionAttributes,
}

impl Contact {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_company(mut self, company: &str) -> Self {
        self.company = company.to_string();
        self
    }

    pub fn with_industry(mut self, industry: &str) -> Self {
        self.industry = industry.to_string();
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_interests(mut self, interests: &[&str]) -> Self {
        self.interests = interests.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_offerings(mut self, offerings: &[&str]) -> Self {
        self.offerings = offerings.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_needs(mut self, needs: &[&str]) -> Self {
        self.needs = needs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_metadata(mut self, metadata: ExtensionAttributes) -> Self {
        self.metadata = metadata;
        self
    }

    /// Short label for logs and text output
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Kind of relationship an edge represents. Display only; never restricts
/// traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Mentor,
    Partner,
    Friend,
    Colleague,
    Investor,
    Client,
    Alumni,
    Family,
    #[default]
    Acquaintance,
}

impl RelationshipType {
    /// Prior probability that an introduction across this edge succeeds
    pub fn success_prior(&self) -> f64 {
        match self {
            RelationshipType::Mentor => 0.85,
            RelationshipType::Family => 0.80,
            RelationshipType::Partner => 0.80,
            RelationshipType::Friend => 0.75,
            RelationshipType::Investor => 0.70,
            RelationshipType::Colleague => 0.65,
            RelationshipType::Client => 0.60,
            RelationshipType::Alumni => 0.50,
            RelationshipType::Acquaintance => 0.35,
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelationshipType::Mentor => "mentor",
            RelationshipType::Partner => "partner",
            RelationshipType::Friend => "friend",
            RelationshipType::Colleague => "colleague",
            RelationshipType::Investor => "investor",
            RelationshipType::Client => "client",
            RelationshipType::Alumni => "alumni",
            RelationshipType::Family => "family",
            RelationshipType::Acquaintance => "acquaintance",
        };
        f.write_str(s)
    }
}

/// A directed relationship edge. Traversable both ways for reachability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from_contact_id: String,
    pub to_contact_id: String,
    #[serde(default)]
    pub relationship_type: RelationshipType,
    pub strength: f64,
    pub trust_level: f64,
    /// Interactions per period
    #[serde(default)]
    pub interaction_frequency: u32,
    #[serde(default)]
    pub last_interaction_at: Option<DateTime<Utc>>,
}

impl Connection {
    pub fn new(
        from: &str,
        to: &str,
        relationship_type: RelationshipType,
        strength: f64,
        trust_level: f64,
    ) -> Self {
        Self {
            from_contact_id: from.to_string(),
            to_contact_id: to.to_string(),
            relationship_type,
            strength,
            trust_level,
            interaction_frequency: 0,
            last_interaction_at: None,
        }
    }

    pub fn with_frequency(mut self, per_period: u32) -> Self {
        self.interaction_frequency = per_period;
        self
    }

    pub fn with_last_interaction(mut self, at: DateTime<Utc>) -> Self {
        self.last_interaction_at = Some(at);
        self
    }

    /// Tie-break weight used when two parents can extend a path equally far
    pub fn tie_break_weight(&self) -> f64 {
        self.trust_level * self.strength
    }

    /// The endpoint opposite `id`, if `id` is one of the endpoints
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.from_contact_id == id {
            Some(&self.to_contact_id)
        } else if self.to_contact_id == id {
            Some(&self.from_contact_id)
        } else {
            None
        }
    }
}

/// Kinds of opportunity the engine evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Collaboration,
    Introduction,
    Hiring,
    Investment,
    KnowledgeExchange,
    Event,
}

impl MatchType {
    pub const ALL: [MatchType; 6] = [
        MatchType::Collaboration,
        MatchType::Introduction,
        MatchType::Hiring,
        MatchType::Investment,
        MatchType::KnowledgeExchange,
        MatchType::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Collaboration => "COLLABORATION",
            MatchType::Introduction => "INTRODUCTION",
            MatchType::Hiring => "HIRING",
            MatchType::Investment => "INVESTMENT",
            MatchType::KnowledgeExchange => "KNOWLEDGE_EXCHANGE",
            MatchType::Event => "EVENT",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchType {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        MatchType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| MatchError::InvalidConfig(format!("unknown match type '{}'", s)))
    }
}

/// Priority bucket derived from the overall score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

/// One explanation line attached to a match or contextual score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReason {
    pub description: String,
    pub score: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl MatchReason {
    pub fn new(description: impl Into<String>, score: f64) -> Self {
        Self {
            description: description.into(),
            score,
            evidence: Vec::new(),
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Generate a deterministic match id from its identity triple.
///
/// Stable across runs so callers can persist status against it.
pub fn deterministic_match_id(source: &str, target: &str, match_type: MatchType) -> String {
    let input = format!("{source}\n{target}\n{}", match_type.as_str());
    let digest = md5::compute(input.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// A ranked candidate produced by the matching engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub source_contact: Arc<Contact>,
    pub target_contact: Arc<Contact>,
    pub match_type: MatchType,
    pub compatibility_score: f64,
    pub value_potential: f64,
    pub success_probability: f64,
    pub timing_factor: f64,
    pub overall_score: f64,
    pub shortest_path: IntroPath,
    pub priority: Priority,
    pub(crate) status: MatchStatus,
    pub reasons: Vec<MatchReason>,
}

impl Match {
    /// Current lifecycle status. Changed only through the engine.
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Hop count of the introduction path
    pub fn degree(&self) -> usize {
        self.shortest_path.hops()
    }

    pub fn path_trust_score(&self) -> f64 {
        self.shortest_path.trust_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_from_str() {
        assert_eq!("hiring".parse::<MatchType>(), Ok(MatchType::Hiring));
        assert_eq!(
            "knowledge-exchange".parse::<MatchType>(),
            Ok(MatchType::KnowledgeExchange)
        );
        assert!(matches!(
            "speed_dating".parse::<MatchType>(),
            Err(MatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deterministic_match_id_stable() {
        let a = deterministic_match_id("root", "x", MatchType::Hiring);
        let b = deterministic_match_id("root", "x", MatchType::Hiring);
        let c = deterministic_match_id("root", "x", MatchType::Investment);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_connection_other_end() {
        let edge = Connection::new("a", "b", RelationshipType::Friend, 0.5, 0.5);
        assert_eq!(edge.other_end("a"), Some("b"));
        assert_eq!(edge.other_end("b"), Some("a"));
        assert_eq!(edge.other_end("c"), None);
    }

    #[test]
    fn test_relationship_priors_ordered() {
        assert!(
            RelationshipType::Mentor.success_prior()
                > RelationshipType::Acquaintance.success_prior()
        );
    }

    #[test]
    fn test_contact_deserializes_with_defaults() {
        let c: Contact = serde_json::from_str(r#"{"id": "c1", "name": "Ada"}"#).unwrap();
        assert_eq!(c.id, "c1");
        assert!(c.skills.is_empty());
        assert!(c.metadata.seniority.is_none());
    }
}
