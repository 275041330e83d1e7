//! Typed extension attributes attached to a contact.
//!
//! Profiles arrive with an open-ended metadata object. Known keys are lifted
//! into typed fields so scoring never does dynamic lookups; everything else
//! lands in `extra`, survives a round trip, and is ignored by the core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current layout version of [`ExtensionAttributes`].
pub const ATTRIBUTES_VERSION: u32 = 1;

/// Career seniority, ordered from least to most senior.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Intern,
    Junior,
    Mid,
    Senior,
    Lead,
    Director,
    Executive,
}

impl Seniority {
    /// Numeric level, 0 (intern) through 6 (executive)
    pub fn level(&self) -> u8 {
        match self {
            Seniority::Intern => 0,
            Seniority::Junior => 1,
            Seniority::Mid => 2,
            Seniority::Senior => 3,
            Seniority::Lead => 4,
            Seniority::Director => 5,
            Seniority::Executive => 6,
        }
    }

    pub const MAX_LEVEL: u8 = 6;

    /// Rough seniority for a number of years in the workforce
    pub fn from_years(years: u32) -> Self {
        match years {
            0 => Seniority::Intern,
            1..=2 => Seniority::Junior,
            3..=5 => Seniority::Mid,
            6..=9 => Seniority::Senior,
            10..=14 => Seniority::Lead,
            15..=19 => Seniority::Director,
            _ => Seniority::Executive,
        }
    }
}

impl std::fmt::Display for Seniority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Seniority::Intern => "intern",
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
            Seniority::Lead => "lead",
            Seniority::Director => "director",
            Seniority::Executive => "executive",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Seniority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intern" => Ok(Seniority::Intern),
            "junior" | "entry" => Ok(Seniority::Junior),
            "mid" | "intermediate" => Ok(Seniority::Mid),
            "senior" => Ok(Seniority::Senior),
            "lead" | "principal" | "staff" => Ok(Seniority::Lead),
            "director" | "vp" => Ok(Seniority::Director),
            "executive" | "c-level" | "founder" => Ok(Seniority::Executive),
            other => Err(format!("unknown seniority '{}'", other)),
        }
    }
}

/// Preferred communication register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    Direct,
    Diplomatic,
    Analytical,
    Expressive,
}

impl CommunicationStyle {
    /// Pairwise fit in [0, 1]; symmetric
    pub fn compatibility(&self, other: &CommunicationStyle) -> f64 {
        use CommunicationStyle::*;
        match (self, other) {
            (a, b) if a == b => 1.0,
            (Direct, Analytical) | (Analytical, Direct) => 0.7,
            (Diplomatic, Expressive) | (Expressive, Diplomatic) => 0.7,
            (Diplomatic, Analytical) | (Analytical, Diplomatic) => 0.5,
            _ => 0.4,
        }
    }
}

impl std::str::FromStr for CommunicationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(CommunicationStyle::Direct),
            "diplomatic" => Ok(CommunicationStyle::Diplomatic),
            "analytical" => Ok(CommunicationStyle::Analytical),
            "expressive" => Ok(CommunicationStyle::Expressive),
            other => Err(format!("unknown communication style '{}'", other)),
        }
    }
}

/// Preferred way of working with others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingStyle {
    Independent,
    Collaborative,
    Structured,
    Flexible,
}

impl WorkingStyle {
    /// Pairwise fit in [0, 1]; symmetric
    pub fn compatibility(&self, other: &WorkingStyle) -> f64 {
        use WorkingStyle::*;
        match (self, other) {
            (a, b) if a == b => 1.0,
            (Collaborative, Flexible) | (Flexible, Collaborative) => 0.7,
            (Structured, Independent) | (Independent, Structured) => 0.6,
            _ => 0.4,
        }
    }
}

/// Typed view over a contact's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionAttributes {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<Seniority>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_style: Option<CommunicationStyle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_style: Option<WorkingStyle>,

    /// Ability to deploy capital, 0 (none) to 1 (institutional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_capacity: Option<f64>,

    /// Spending authority in whole currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,

    /// Channels the contact answers on ("email", "linkedin", ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_channels: Vec<String>,

    /// Unknown keys, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> u32 {
    ATTRIBUTES_VERSION
}

impl Default for ExtensionAttributes {
    fn default() -> Self {
        Self {
            version: ATTRIBUTES_VERSION,
            seniority: None,
            years_experience: None,
            communication_style: None,
            working_style: None,
            funding_capacity: None,
            budget: None,
            preferred_channels: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl ExtensionAttributes {
    pub fn with_seniority(mut self, seniority: Seniority) -> Self {
        self.seniority = Some(seniority);
        self
    }

    pub fn with_years(mut self, years: u32) -> Self {
        self.years_experience = Some(years);
        self
    }

    pub fn with_communication(mut self, style: CommunicationStyle) -> Self {
        self.communication_style = Some(style);
        self
    }

    pub fn with_working_style(mut self, style: WorkingStyle) -> Self {
        self.working_style = Some(style);
        self
    }

    pub fn with_funding_capacity(mut self, capacity: f64) -> Self {
        self.funding_capacity = Some(capacity.clamp(0.0, 1.0));
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget.max(0.0));
        self
    }

    pub fn with_channels(mut self, channels: &[&str]) -> Self {
        self.preferred_channels = channels.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Funding capacity clamped to [0, 1], or 0 when undeclared
    pub fn funding(&self) -> f64 {
        self.funding_capacity.map(|f| f.clamp(0.0, 1.0)).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_preserved() {
        let json = r#"{
            "seniority": "director",
            "communication_style": "direct",
            "favorite_color": "teal",
            "board_seats": 2
        }"#;
        let attrs: ExtensionAttributes = serde_json::from_str(json).unwrap();
        assert_eq!(attrs.version, ATTRIBUTES_VERSION);
        assert_eq!(attrs.seniority, Some(Seniority::Director));
        assert_eq!(attrs.communication_style, Some(CommunicationStyle::Direct));
        assert_eq!(attrs.extra.len(), 2);
        assert_eq!(attrs.extra["favorite_color"], serde_json::json!("teal"));

        let back = serde_json::to_value(&attrs).unwrap();
        assert_eq!(back["board_seats"], serde_json::json!(2));
    }

    #[test]
    fn test_seniority_ordering() {
        assert!(Seniority::Executive > Seniority::Senior);
        assert_eq!(Seniority::from_years(7), Seniority::Senior);
        assert_eq!("VP".parse::<Seniority>(), Ok(Seniority::Director));
        assert!("wizard".parse::<Seniority>().is_err());
    }

    #[test]
    fn test_style_compatibility_symmetric() {
        use CommunicationStyle::*;
        for a in [Direct, Diplomatic, Analytical, Expressive] {
            for b in [Direct, Diplomatic, Analytical, Expressive] {
                assert_eq!(a.compatibility(&b), b.compatibility(&a));
            }
        }
        assert_eq!(WorkingStyle::Flexible.compatibility(&WorkingStyle::Flexible), 1.0);
    }
}
