//! Situational goals used to re-weight a base match score.

use crate::attributes::{CommunicationStyle, WorkingStyle};
use crate::errors::{MatchError, MatchResult};
use serde::{Deserialize, Serialize};

/// What the user is trying to get done right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalContext {
    Fundraising,
    Hiring,
    JobSearch,
    Partnership,
    Mentorship,
    Sales,
    Learning,
    Networking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Timeframe {
    Immediate,
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl Timeframe {
    pub fn weight(&self) -> f64 {
        match self {
            Timeframe::Immediate => 1.0,
            Timeframe::ShortTerm => 0.8,
            Timeframe::MediumTerm => 0.6,
            Timeframe::LongTerm => 0.4,
        }
    }
}

/// Soft geographic, industry and budget requirements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalConstraints {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub min_budget: Option<f64>,
}

impl GoalConstraints {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.industries.is_empty() && self.min_budget.is_none()
    }
}

/// How the user likes to work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalPreferences {
    #[serde(default)]
    pub communication_style: Option<CommunicationStyle>,
    #[serde(default)]
    pub working_style: Option<WorkingStyle>,
    #[serde(default)]
    pub channels: Vec<String>,
}

/// A transient objective for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualGoal {
    pub context: GoalContext,

    /// How much the goal matters, 0 to 1
    #[serde(default = "default_goal_priority")]
    pub priority: f64,

    #[serde(default)]
    pub timeframe: Timeframe,

    #[serde(default)]
    pub specific_needs: Vec<String>,

    #[serde(default)]
    pub constraints: GoalConstraints,

    #[serde(default)]
    pub preferences: GoalPreferences,

    /// e.g. "location: Berlin", "not-industry: tobacco"
    #[serde(default)]
    pub deal_breakers: Vec<String>,
}

fn default_goal_priority() -> f64 {
    0.5
}

impl ContextualGoal {
    pub fn new(context: GoalContext) -> Self {
        Self {
            context,
            priority: default_goal_priority(),
            timeframe: Timeframe::default(),
            specific_needs: Vec::new(),
            constraints: GoalConstraints::default(),
            preferences: GoalPreferences::default(),
            deal_breakers: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn with_needs(mut self, needs: &[&str]) -> Self {
        self.specific_needs = needs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_deal_breakers(mut self, rules: &[&str]) -> Self {
        self.deal_breakers = rules.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_constraints(mut self, constraints: GoalConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_preferences(mut self, preferences: GoalPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// `timeframe weight * priority`
    pub fn urgency(&self) -> f64 {
        self.timeframe.weight() * self.priority.clamp(0.0, 1.0)
    }

    /// # Errors
    /// - `InvalidConfig` if `priority` is outside [0, 1]
    pub fn validate(&self) -> MatchResult<()> {
        if !(0.0..=1.0).contains(&self.priority) {
            return Err(MatchError::InvalidConfig(format!(
                "goal priority must be in [0, 1], got {}",
                self.priority
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency() {
        let goal = ContextualGoal::new(GoalContext::Hiring)
            .with_priority(0.5)
            .with_timeframe(Timeframe::ShortTerm);
        assert!((goal.urgency() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_goal_from_json() {
        let json = r#"{
            "context": "FUNDRAISING",
            "priority": 0.9,
            "timeframe": "IMMEDIATE",
            "specific_needs": ["seed round"],
            "constraints": { "locations": ["Berlin"] },
            "deal_breakers": ["not-industry: tobacco"]
        }"#;
        let goal: ContextualGoal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.context, GoalContext::Fundraising);
        assert_eq!(goal.timeframe, Timeframe::Immediate);
        assert_eq!(goal.constraints.locations, vec!["Berlin"]);
        assert!(goal.preferences.communication_style.is_none());
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn test_priority_out_of_range() {
        let goal = ContextualGoal::new(GoalContext::Sales).with_priority(1.5);
        assert!(matches!(goal.validate(), Err(MatchError::InvalidConfig(_))));
    }
}
