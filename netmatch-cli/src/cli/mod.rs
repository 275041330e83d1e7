//! CLI command definitions and handlers

mod init;
mod matches;
mod optimize;
mod paths;

use crate::config::{load_config, load_config_file, NetmatchConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Parse `name=weight`, e.g. `trust=0.3`
fn parse_objective(s: &str) -> Result<(String, f64), String> {
    let (name, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=weight, got '{}'", s))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid weight", weight))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight must be non-negative, got {}", weight));
    }
    Ok((name.trim().to_string(), weight))
}

/// Parse an RFC 3339 timestamp
fn parse_as_of(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e))
}

/// netmatch - find the best introductions in your network
#[derive(Parser, Debug)]
#[command(name = "netmatch")]
#[command(
    version,
    about = "Rank introduction candidates across a professional network",
    after_help = "\
Examples:
  netmatch init                                         Write an example netmatch.toml
  netmatch paths network.json --root me                 Degrees of separation from me
  netmatch matches network.json --source me             Ranked matches
  netmatch matches network.json --source me --goal goal.json
  netmatch optimize network.json --source me --objective overall=0.6 --objective hops=0.4"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: ./netmatch.toml if present)
    #[arg(long, short = 'c', global = true, env = "NETMATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example netmatch.toml
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show degrees of separation and introduction paths from a root contact
    Paths {
        /// Network snapshot (JSON with `contacts` and `connections`)
        network: PathBuf,

        /// Root contact id
        #[arg(long)]
        root: String,

        /// Maximum hops (default: matching.max_degree_of_separation)
        #[arg(long)]
        max_degree: Option<usize>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Rank matches for a source contact
    Matches {
        network: PathBuf,

        /// Source contact id
        #[arg(long)]
        source: String,

        /// Re-score against a goal (JSON)
        #[arg(long)]
        goal: Option<PathBuf>,

        /// Only evaluate these match types (comma separated)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Maximum matches to show (0 = all)
        #[arg(long, default_value = "20")]
        top: usize,

        /// Reference time for recency (RFC 3339, default: now)
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<DateTime<Utc>>,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Pareto-optimal, diversity-aware selection of matches
    Optimize {
        network: PathBuf,

        #[arg(long)]
        source: String,

        /// Objective as name=weight; repeatable (overall, compatibility, trust,
        /// value, success, hops)
        #[arg(long = "objective", value_parser = parse_objective)]
        objectives: Vec<(String, f64)>,

        /// Penalty weight for near-duplicate picks
        #[arg(long)]
        diversity: Option<f64>,

        /// Number of matches to select
        #[arg(long)]
        max_results: Option<usize>,

        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<DateTime<Utc>>,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

/// Explicit `--config` must load; the implicit one falls back to defaults
fn resolve_config(explicit: Option<&Path>) -> Result<NetmatchConfig> {
    match explicit {
        Some(path) => load_config_file(path),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Ok(load_config(&cwd))
        }
    }
}

/// Run the selected command
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { dir, force } => init::run(&dir, force),

        Commands::Paths {
            network,
            root,
            max_degree,
            format,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            paths::run(&network, &root, max_degree, &config, &format)
        }

        Commands::Matches {
            network,
            source,
            goal,
            types,
            top,
            as_of,
            format,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            matches::run(
                &network,
                &source,
                goal.as_deref(),
                &types,
                top,
                as_of,
                &config,
                &format,
            )
        }

        Commands::Optimize {
            network,
            source,
            objectives,
            diversity,
            max_results,
            as_of,
            format,
        } => {
            let mut config = resolve_config(cli.config.as_deref())?;
            if !objectives.is_empty() {
                config.optimizer.objectives = objectives
                    .into_iter()
                    .map(|(name, weight)| crate::config::ObjectiveSetting { name, weight })
                    .collect();
            }
            if let Some(d) = diversity {
                config.optimizer.diversity_weight = d;
            }
            if let Some(n) = max_results {
                config.optimizer.max_results = n;
            }
            optimize::run(&network, &source, as_of, &config, &format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_objective() {
        assert_eq!(parse_objective("trust=0.3"), Ok(("trust".to_string(), 0.3)));
        assert!(parse_objective("trust").is_err());
        assert!(parse_objective("trust=-1").is_err());
        assert!(parse_objective("trust=abc").is_err());
    }

    #[test]
    fn test_parse_as_of() {
        let t = parse_as_of("2026-03-01T09:00:00Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-03-01T09:00:00+00:00");
        assert!(parse_as_of("yesterday").is_err());
    }

    #[test]
    fn test_cli_parses_matches() {
        let cli = Cli::try_parse_from([
            "netmatch",
            "matches",
            "net.json",
            "--source",
            "me",
            "--types",
            "hiring,investment",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Matches { source, types, .. } => {
                assert_eq!(source, "me");
                assert_eq!(types, vec!["hiring", "investment"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
