//! JSON reporter

use super::{MatchesReport, OptimizeReport, PathsReport};
use anyhow::Result;
use netmatch::{IntroPath, Match};
use serde_json::{json, Value};

fn path_ids(path: &IntroPath) -> Vec<&str> {
    path.contacts.iter().map(|c| c.id.as_str()).collect()
}

fn match_json(m: &Match) -> Value {
    json!({
        "id": m.id,
        "target": m.target_contact.id,
        "target_name": m.target_contact.name,
        "match_type": m.match_type,
        "priority": m.priority,
        "status": m.status(),
        "overall_score": m.overall_score,
        "compatibility_score": m.compatibility_score,
        "value_potential": m.value_potential,
        "success_probability": m.success_probability,
        "timing_factor": m.timing_factor,
        "path_trust_score": m.path_trust_score(),
        "degree": m.degree(),
        "path": path_ids(&m.shortest_path),
        "reasons": m.reasons,
    })
}

pub fn paths(report: &PathsReport<'_>) -> Result<String> {
    let paths: Vec<Value> = report
        .paths
        .iter()
        .map(|p| {
            json!({
                "target": p.target().id,
                "degree": p.hops(),
                "trust_score": p.trust_score,
                "path": path_ids(p),
            })
        })
        .collect();
    let value = json!({
        "root": report.root.id,
        "stats": report.stats,
        "paths": paths,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn matches(report: &MatchesReport<'_>) -> Result<String> {
    let value = json!({
        "source": report.source.id,
        "matches": report.matches.iter().map(match_json).collect::<Vec<_>>(),
        "contextual": report.contextual,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn optimize(report: &OptimizeReport<'_>) -> Result<String> {
    let ids = |indices: &[usize]| -> Vec<String> {
        indices
            .iter()
            .map(|&i| report.matches[i].id.clone())
            .collect()
    };
    let selected: Vec<Value> = report
        .result
        .selected
        .iter()
        .map(|s| {
            let mut entry = match_json(&report.matches[s.index]);
            entry["weighted_score"] = json!(s.weighted_score);
            entry["diversity_penalty"] = json!(s.diversity_penalty);
            entry
        })
        .collect();
    let value = json!({
        "source": report.source.id,
        "objectives": report.objectives,
        "candidates": report.matches.len(),
        "pareto_set": ids(&report.result.pareto_set),
        "selected": selected,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
