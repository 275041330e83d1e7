//! Text (terminal) reporter

use super::{MatchesReport, OptimizeReport, PathsReport};
use console::style;
use netmatch::{ContextualMatchScore, Match, Priority};
use std::fmt::Write;

const RULE: &str = "──────────────────────────────────────";

fn priority_tag(priority: Priority) -> String {
    let tag = format!("[{}]", priority.to_string().to_uppercase());
    match priority {
        Priority::Critical => style(tag).red().bold().to_string(),
        Priority::High => style(tag).yellow().bold().to_string(),
        Priority::Medium => style(tag).cyan().to_string(),
        Priority::Low => style(tag).dim().to_string(),
    }
}

fn write_match(out: &mut String, rank: usize, m: &Match, contextual: Option<&ContextualMatchScore>) {
    let _ = writeln!(
        out,
        "{:>3}. {} {}  {}  overall {:.2}  compat {:.2}  trust {:.2}  {} hop{}",
        rank,
        priority_tag(m.priority),
        style(m.target_contact.label()).bold(),
        style(m.match_type).cyan(),
        m.overall_score,
        m.compatibility_score,
        m.path_trust_score(),
        m.degree(),
        if m.degree() == 1 { "" } else { "s" }
    );
    if let Some(ctx) = contextual {
        let flag = if ctx.deal_breaker_violated {
            style(" deal-breaker").red().to_string()
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "       contextual {:.2} (alignment {:.2}, urgency {:.2}){}",
            ctx.adjusted_score, ctx.context_alignment, ctx.urgency_factor, flag
        );
    }
    let _ = writeln!(out, "       {}", style(m.shortest_path.describe()).dim());
    let reasons = contextual
        .map(|c| c.reasons.iter().chain(m.reasons.iter()).collect::<Vec<_>>())
        .unwrap_or_else(|| m.reasons.iter().collect());
    for reason in reasons {
        if reason.evidence.is_empty() {
            let _ = writeln!(out, "       - {}", reason.description);
        } else {
            let _ = writeln!(
                out,
                "       - {}: {}",
                reason.description,
                reason.evidence.join(", ")
            );
        }
    }
}

pub fn paths(report: &PathsReport<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{}",
        style(format!("Network of {}", report.root.label())).bold()
    );
    let _ = writeln!(out, "{}", style(RULE).dim());
    let _ = writeln!(
        out,
        "Contacts: {}  Connections: {}  Reachable within {} hops: {}",
        report.stats.contacts,
        report.stats.connections,
        report.stats.max_degree,
        report.stats.reachable.saturating_sub(1)
    );
    for (degree, count) in report.stats.per_degree.iter().enumerate().skip(1) {
        let _ = writeln!(out, "  degree {}: {}", degree, count);
    }
    let _ = writeln!(out);
    for path in &report.paths {
        if path.hops() == 0 {
            continue;
        }
        let _ = writeln!(
            out,
            "  {} {}  trust {:.3}",
            style(format!("[{}]", path.hops())).cyan(),
            path.describe(),
            path.trust_score
        );
    }
    out
}

pub fn matches(report: &MatchesReport<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{}",
        style(format!("Matches for {}", report.source.label())).bold()
    );
    let _ = writeln!(out, "{}", style(RULE).dim());
    if report.matches.is_empty() {
        let _ = writeln!(out, "No matches above the configured thresholds.");
        return out;
    }

    match report.contextual {
        Some(scores) => {
            for (rank, score) in scores.iter().enumerate() {
                if let Some(m) = report.matches.iter().find(|m| m.id == score.match_id) {
                    write_match(&mut out, rank + 1, m, Some(score));
                }
            }
        }
        None => {
            for (rank, m) in report.matches.iter().enumerate() {
                write_match(&mut out, rank + 1, m, None);
            }
        }
    }
    out
}

pub fn optimize(report: &OptimizeReport<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{}",
        style(format!("Selection for {}", report.source.label())).bold()
    );
    let _ = writeln!(out, "{}", style(RULE).dim());
    let _ = writeln!(
        out,
        "Objectives: {}  Candidates: {}  Pareto front: {}",
        report.objectives.join(", "),
        report.matches.len(),
        report.result.pareto_set.len()
    );
    let _ = writeln!(out);
    for (rank, selection) in report.result.selected.iter().enumerate() {
        let m = &report.matches[selection.index];
        write_match(&mut out, rank + 1, m, None);
        let _ = writeln!(
            out,
            "       score {:.3}, diversity penalty {:.3}",
            selection.weighted_score, selection.diversity_penalty
        );
    }
    out
}
