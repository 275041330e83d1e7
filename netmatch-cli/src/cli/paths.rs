//! Paths command - degrees of separation from a root contact

use crate::config::NetmatchConfig;
use crate::network::load_network;
use crate::reporters::{render_paths, PathsReport};
use anyhow::{Context, Result};
use netmatch::IntroPath;
use std::path::Path;

pub fn run(
    network: &Path,
    root: &str,
    max_degree: Option<usize>,
    config: &NetmatchConfig,
    format: &str,
) -> Result<()> {
    let mut store = load_network(network)?;
    let max_degree = max_degree.unwrap_or(config.matching.max_degree_of_separation);
    store
        .build_graph(root, max_degree)
        .with_context(|| format!("Failed to build network from '{}'", root))?;

    let graph = store.snapshot();
    let root_contact = graph
        .contact(root)
        .with_context(|| format!("Unknown contact '{}'", root))?;

    let mut paths: Vec<&IntroPath> = Vec::new();
    for degree in 0..=max_degree {
        paths.extend(
            graph
                .contacts_by_degree(degree)
                .iter()
                .filter_map(|c| graph.path_to(&c.id)),
        );
    }

    let report = PathsReport {
        root: root_contact,
        stats: graph.stats(),
        paths,
    };
    print!("{}", render_paths(&report, format)?);
    Ok(())
}
