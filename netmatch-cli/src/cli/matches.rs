//! Matches command - ranked matches, optionally re-scored against a goal

use crate::config::NetmatchConfig;
use crate::network::{load_json, load_network};
use crate::reporters::{render_matches, MatchesReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use netmatch::{ContextualAdjuster, ContextualGoal, MatchConfig};
use std::path::Path;
use tracing::info;

/// Config with `--types` applied, if any
pub(super) fn effective_match_config(
    config: &NetmatchConfig,
    types: &[String],
) -> Result<MatchConfig> {
    let match_config = config.match_config();
    if types.is_empty() {
        return Ok(match_config);
    }
    let names: Vec<&str> = types.iter().map(String::as_str).collect();
    match_config
        .with_enabled_types(&names)
        .context("Invalid --types")
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    network: &Path,
    source: &str,
    goal: Option<&Path>,
    types: &[String],
    top: usize,
    as_of: Option<DateTime<Utc>>,
    config: &NetmatchConfig,
    format: &str,
) -> Result<()> {
    let store = load_network(network)?;
    let graph = store.snapshot();
    let source_contact = graph
        .contact(source)
        .with_context(|| format!("Unknown contact '{}'", source))?;

    let match_config = effective_match_config(config, types)?;
    let mut engine = config.engine()?;
    if let Some(t) = as_of {
        engine = engine.with_as_of(t);
    }
    let mut matches = engine.find_matches_in_network(&graph, source, &match_config)?;

    let contextual = match goal {
        Some(path) => {
            let goal: ContextualGoal = load_json(path)?;
            let adjuster = ContextualAdjuster::new(config.scorer()?);
            let mut scores = adjuster.rerank(&matches, &goal)?;
            info!("Re-scored {} matches for goal {:?}", scores.len(), goal.context);
            if top > 0 {
                scores.truncate(top);
                matches.retain(|m| scores.iter().any(|s| s.match_id == m.id));
            }
            Some(scores)
        }
        None => {
            if top > 0 {
                matches.truncate(top);
            }
            None
        }
    };

    let report = MatchesReport {
        source: source_contact,
        matches: &matches,
        contextual: contextual.as_deref(),
    };
    print!("{}", render_matches(&report, format)?);
    Ok(())
}
