//! Output reporters
//!
//! - `text` - terminal output with colors
//! - `json` - machine-readable JSON

mod json;
mod text;

use anyhow::{anyhow, Result};
use netmatch::{Contact, ContextualMatchScore, GraphStats, IntroPath, Match, OptimizationResult};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

/// Degrees of separation from one root
pub struct PathsReport<'a> {
    pub root: &'a Contact,
    pub stats: GraphStats,
    /// Sorted by degree, then contact id
    pub paths: Vec<&'a IntroPath>,
}

/// Ranked matches, optionally re-scored against a goal
pub struct MatchesReport<'a> {
    pub source: &'a Contact,
    pub matches: &'a [Match],
    /// Already sorted best first
    pub contextual: Option<&'a [ContextualMatchScore]>,
}

pub struct OptimizeReport<'a> {
    pub source: &'a Contact,
    pub matches: &'a [Match],
    pub objectives: Vec<String>,
    pub result: &'a OptimizationResult,
}

pub fn render_paths(report: &PathsReport<'_>, format: &str) -> Result<String> {
    match OutputFormat::from_str(format)? {
        OutputFormat::Text => Ok(text::paths(report)),
        OutputFormat::Json => json::paths(report),
    }
}

pub fn render_matches(report: &MatchesReport<'_>, format: &str) -> Result<String> {
    match OutputFormat::from_str(format)? {
        OutputFormat::Text => Ok(text::matches(report)),
        OutputFormat::Json => json::matches(report),
    }
}

pub fn render_optimize(report: &OptimizeReport<'_>, format: &str) -> Result<String> {
    match OutputFormat::from_str(format)? {
        OutputFormat::Text => Ok(text::optimize(report)),
        OutputFormat::Json => json::optimize(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use netmatch::{Connection, GraphStore, MatchConfig, MatchingEngine, RelationshipType};

    fn sample() -> (GraphStore, Vec<Match>) {
        let store = GraphStore::from_records(
            vec![
                Contact::new("me", "Morgan").with_needs(&["seed funding"]),
                Contact::new("ivan", "Ivan").with_offerings(&["seed funding"]),
            ],
            vec![Connection::new("me", "ivan", RelationshipType::Investor, 0.8, 0.9)],
        )
        .unwrap();
        let config = MatchConfig {
            min_compatibility_score: 0.0,
            min_success_probability: 0.0,
            ..Default::default()
        };
        let matches = MatchingEngine::default()
            .with_as_of(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
            .find_matches_in_network(store.graph(), "me", &config)
            .unwrap();
        (store, matches)
    }

    #[test]
    fn test_unknown_format() {
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_matches_json_is_valid() {
        let (store, matches) = sample();
        let report = MatchesReport {
            source: store.graph().contact("me").unwrap(),
            matches: &matches,
            contextual: None,
        };
        let out = render_matches(&report, "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["source"], "me");
        assert_eq!(
            value["matches"].as_array().unwrap().len(),
            matches.len()
        );
        assert_eq!(value["matches"][0]["target"], "ivan");
    }

    #[test]
    fn test_matches_text_mentions_target() {
        let (store, matches) = sample();
        let report = MatchesReport {
            source: store.graph().contact("me").unwrap(),
            matches: &matches,
            contextual: None,
        };
        let out = render_matches(&report, "text").unwrap();
        assert!(out.contains("Ivan"));
        assert!(out.contains("INVESTMENT"));
    }
}
