//! Optimize command - Pareto front and diversified selection

use super::matches::effective_match_config;
use crate::config::NetmatchConfig;
use crate::network::load_network;
use crate::reporters::{render_optimize, OptimizeReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use netmatch::{optimize, Match, Objective};
use std::path::Path;

pub fn run(
    network: &Path,
    source: &str,
    as_of: Option<DateTime<Utc>>,
    config: &NetmatchConfig,
    format: &str,
) -> Result<()> {
    let store = load_network(network)?;
    let graph = store.snapshot();
    let source_contact = graph
        .contact(source)
        .with_context(|| format!("Unknown contact '{}'", source))?;

    let objectives = config
        .optimizer
        .objectives
        .iter()
        .map(|o| Objective::<Match>::by_name(&o.name, o.weight))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid objectives")?;

    let mut engine = config.engine()?;
    if let Some(t) = as_of {
        engine = engine.with_as_of(t);
    }
    let match_config = effective_match_config(config, &[])?;
    let matches = engine.find_matches_in_network(&graph, source, &match_config)?;

    let result = optimize(
        &matches,
        &objectives,
        config.optimizer.diversity_weight,
        config.optimizer.max_results,
    )?;

    let report = OptimizeReport {
        source: source_contact,
        matches: &matches,
        objectives: objectives
            .iter()
            .map(|o| format!("{}={}", o.name, o.weight))
            .collect(),
        result: &result,
    };
    print!("{}", render_optimize(&report, format)?);
    Ok(())
}
