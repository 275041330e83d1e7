//! Multi-criteria selection over scored candidates.
//!
//! Candidates are compared on a set of weighted objectives, each either
//! maximized or minimized. The Pareto set holds every candidate no other
//! candidate dominates (pairwise, O(n^2); candidate sets are small). The
//! final selection is greedy over the Pareto set: weighted sum of min-max
//! normalized objectives, minus a penalty for repeating features of what
//! has already been picked.

use crate::errors::{MatchError, MatchResult};
use crate::models::Match;
use crate::scoring::normalize;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Objective values closer than this compare as equal
const EPSILON: f64 = 1e-9;

/// A named, weighted criterion evaluated per candidate.
pub struct Objective<T> {
    pub name: String,
    pub weight: f64,
    pub minimize: bool,
    evaluator: Box<dyn Fn(&T) -> f64 + Send + Sync>,
}

impl<T> Objective<T> {
    pub fn maximize(
        name: &str,
        weight: f64,
        evaluator: impl Fn(&T) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            weight,
            minimize: false,
            evaluator: Box::new(evaluator),
        }
    }

    pub fn minimize(
        name: &str,
        weight: f64,
        evaluator: impl Fn(&T) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            minimize: true,
            ..Self::maximize(name, weight, evaluator)
        }
    }

    pub fn evaluate(&self, item: &T) -> f64 {
        (self.evaluator)(item)
    }

    /// Value oriented so that larger is always better
    fn oriented(&self, item: &T) -> f64 {
        let v = self.evaluate(item);
        if self.minimize {
            -v
        } else {
            v
        }
    }
}

impl<T> std::fmt::Debug for Objective<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Objective")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("minimize", &self.minimize)
            .finish()
    }
}

impl Objective<Match> {
    pub fn overall_score(weight: f64) -> Self {
        Self::maximize("overall_score", weight, |m: &Match| m.overall_score)
    }

    pub fn compatibility(weight: f64) -> Self {
        Self::maximize("compatibility", weight, |m: &Match| m.compatibility_score)
    }

    pub fn trust(weight: f64) -> Self {
        Self::maximize("trust", weight, |m: &Match| m.path_trust_score())
    }

    pub fn value_potential(weight: f64) -> Self {
        Self::maximize("value_potential", weight, |m: &Match| m.value_potential)
    }

    pub fn success_probability(weight: f64) -> Self {
        Self::maximize("success_probability", weight, |m: &Match| {
            m.success_probability
        })
    }

    /// Fewer intermediaries is better
    pub fn hops(weight: f64) -> Self {
        Self::minimize("hops", weight, |m: &Match| m.degree() as f64)
    }

    /// Parse a CLI-style name into one of the built-in objectives
    pub fn by_name(name: &str, weight: f64) -> MatchResult<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "overall" | "overall_score" => Ok(Self::overall_score(weight)),
            "compatibility" => Ok(Self::compatibility(weight)),
            "trust" => Ok(Self::trust(weight)),
            "value" | "value_potential" => Ok(Self::value_potential(weight)),
            "success" | "success_probability" => Ok(Self::success_probability(weight)),
            "hops" | "degree" => Ok(Self::hops(weight)),
            other => Err(MatchError::InvalidConfig(format!(
                "unknown objective '{}'",
                other
            ))),
        }
    }
}

/// Categorical features used to keep selections varied
pub trait Diversified {
    /// `(feature name, value)` pairs; empty values are not compared
    fn features(&self) -> Vec<(&'static str, String)>;
}

impl Diversified for Match {
    fn features(&self) -> Vec<(&'static str, String)> {
        let t = &self.target_contact;
        vec![
            ("industry", normalize(&t.industry)),
            ("location", normalize(&t.location)),
            ("company", normalize(&t.company)),
            ("match_type", self.match_type.as_str().to_string()),
        ]
    }
}

/// One picked candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Index into the candidate slice
    pub index: usize,
    pub weighted_score: f64,
    pub diversity_penalty: f64,
}

impl Selection {
    pub fn final_score(&self) -> f64 {
        self.weighted_score - self.diversity_penalty
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizationResult {
    /// Indices of non-dominated candidates, ascending
    pub pareto_set: Vec<usize>,
    /// Picked candidates in pick order
    pub selected: Vec<Selection>,
}

impl OptimizationResult {
    pub fn pareto_items<'a, T>(&self, candidates: &'a [T]) -> Vec<&'a T> {
        self.pareto_set.iter().map(|&i| &candidates[i]).collect()
    }

    pub fn selected_items<'a, T>(&self, candidates: &'a [T]) -> Vec<&'a T> {
        self.selected.iter().map(|s| &candidates[s.index]).collect()
    }
}

/// `a` is at least as good everywhere and strictly better somewhere
fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if *x < *y - EPSILON {
            return false;
        }
        if *x > *y + EPSILON {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Share of comparable features two candidates have in common
fn similarity(a: &[(&'static str, String)], b: &[(&'static str, String)]) -> f64 {
    let mut compared = 0usize;
    let mut shared = 0usize;
    for (name, value) in a {
        if value.is_empty() {
            continue;
        }
        if let Some((_, other)) = b.iter().find(|(n, v)| n == name && !v.is_empty()) {
            compared += 1;
            if other == value {
                shared += 1;
            }
        }
    }
    if compared == 0 {
        0.0
    } else {
        shared as f64 / compared as f64
    }
}

fn quantize(score: f64) -> i64 {
    (score / EPSILON).round() as i64
}

/// Pareto set plus a diversity-aware top-`max_results` selection.
///
/// # Errors
/// - `InvalidConfig` without objectives, or with a negative or non-finite
///   weight or diversity weight, unless there are no candidates
pub fn optimize<T: Diversified + Sync>(
    candidates: &[T],
    objectives: &[Objective<T>],
    diversity_weight: f64,
    max_results: usize,
) -> MatchResult<OptimizationResult> {
    if candidates.is_empty() {
        return Ok(OptimizationResult::default());
    }
    if objectives.is_empty() {
        return Err(MatchError::InvalidConfig(
            "at least one objective is required".into(),
        ));
    }
    if let Some(bad) = objectives
        .iter()
        .find(|o| !o.weight.is_finite() || o.weight < 0.0)
    {
        return Err(MatchError::InvalidConfig(format!(
            "objective '{}' has invalid weight {}",
            bad.name, bad.weight
        )));
    }
    if !diversity_weight.is_finite() || diversity_weight < 0.0 {
        return Err(MatchError::InvalidConfig(format!(
            "diversity weight must be non-negative, got {}",
            diversity_weight
        )));
    }
    let values: Vec<Vec<f64>> = candidates
        .par_iter()
        .map(|c| objectives.iter().map(|o| o.oriented(c)).collect())
        .collect();

    let pareto_set: Vec<usize> = (0..candidates.len())
        .into_par_iter()
        .filter(|&i| {
            !(0..candidates.len()).any(|j| j != i && dominates(&values[j], &values[i]))
        })
        .collect();

    // min-max normalize over the Pareto set
    let mut lo = vec![f64::INFINITY; objectives.len()];
    let mut hi = vec![f64::NEG_INFINITY; objectives.len()];
    for &i in &pareto_set {
        for (k, v) in values[i].iter().enumerate() {
            lo[k] = lo[k].min(*v);
            hi[k] = hi[k].max(*v);
        }
    }
    let total_weight: f64 = objectives.iter().map(|o| o.weight).sum();
    let weighted = |i: usize| -> f64 {
        let mut score = 0.0;
        for (k, o) in objectives.iter().enumerate() {
            let range = hi[k] - lo[k];
            let norm = if range < EPSILON {
                1.0
            } else {
                (values[i][k] - lo[k]) / range
            };
            let w = if total_weight > 0.0 {
                o.weight / total_weight
            } else {
                1.0 / objectives.len() as f64
            };
            score += w * norm;
        }
        score
    };

    let features: Vec<Vec<(&'static str, String)>> =
        pareto_set.iter().map(|&i| candidates[i].features()).collect();
    let base_scores: Vec<f64> = pareto_set.iter().map(|&i| weighted(i)).collect();

    let mut remaining: Vec<usize> = (0..pareto_set.len()).collect();
    let mut picked: Vec<usize> = Vec::new();
    let mut selected = Vec::new();
    while selected.len() < max_results && !remaining.is_empty() {
        let mut best: Option<(usize, Selection)> = None;
        for (slot, &p) in remaining.iter().enumerate() {
            let penalty = diversity_weight
                * picked
                    .iter()
                    .map(|&q| similarity(&features[p], &features[q]))
                    .fold(0.0, f64::max);
            let candidate = Selection {
                index: pareto_set[p],
                weighted_score: base_scores[p],
                diversity_penalty: penalty,
            };
            // remaining stays in index order, so the first best wins ties
            let better = match &best {
                None => true,
                Some((_, b)) => quantize(candidate.final_score()) > quantize(b.final_score()),
            };
            if better {
                best = Some((slot, candidate));
            }
        }
        let Some((slot, choice)) = best else {
            break;
        };
        picked.push(remaining.remove(slot));
        selected.push(choice);
    }

    debug!(
        "Optimized {} candidates: {} on the Pareto front, {} selected",
        candidates.len(),
        pareto_set.len(),
        selected.len()
    );
    Ok(OptimizationResult {
        pareto_set,
        selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Offer {
        score: f64,
        cost: f64,
        industry: &'static str,
    }

    impl Diversified for Offer {
        fn features(&self) -> Vec<(&'static str, String)> {
            vec![("industry", self.industry.to_string())]
        }
    }

    fn objectives() -> Vec<Objective<Offer>> {
        vec![
            Objective::maximize("score", 0.5, |o: &Offer| o.score),
            Objective::minimize("cost", 0.5, |o: &Offer| o.cost),
        ]
    }

    fn opt(score: f64, cost: f64, industry: &'static str) -> Offer {
        Offer {
            score,
            cost,
            industry,
        }
    }

    #[test]
    fn test_dominance() {
        assert!(dominates(&[0.9, -0.1], &[0.5, -0.5]));
        assert!(!dominates(&[0.9, -0.1], &[0.9, -0.1]));
        assert!(!dominates(&[0.9, -0.9], &[0.3, -0.1]));
        // epsilon drift is not an improvement
        assert!(!dominates(&[0.5 + 1e-12, -0.5], &[0.5, -0.5]));
    }

    #[test]
    fn test_pareto_manual() {
        let candidates = vec![opt(0.9, 0.1, "a"), opt(0.5, 0.5, "b"), opt(0.3, 0.9, "c")];
        let result = optimize(&candidates, &objectives(), 0.0, 3).unwrap();
        assert_eq!(result.pareto_set, vec![0]);

        // cheapest option survives even with the lowest score
        let candidates = vec![opt(0.9, 0.1, "a"), opt(0.5, 0.5, "b"), opt(0.3, 0.05, "c")];
        let result = optimize(&candidates, &objectives(), 0.0, 3).unwrap();
        assert_eq!(result.pareto_set, vec![0, 2]);
    }

    #[test]
    fn test_empty_candidates() {
        let result = optimize::<Offer>(&[], &objectives(), 0.5, 5).unwrap();
        assert!(result.pareto_set.is_empty());
        assert!(result.selected.is_empty());

        let result = optimize::<Offer>(&[], &[], 0.5, 5).unwrap();
        assert!(result.pareto_set.is_empty());
        assert!(result.selected.is_empty());
    }

    #[test]
    fn test_diversity_penalty_changes_pick() {
        // all three on the front: score up, cost up
        let candidates = vec![
            opt(0.90, 0.50, "fintech"),
            opt(0.89, 0.49, "fintech"),
            opt(0.50, 0.30, "health"),
        ];
        let plain = optimize(&candidates, &objectives(), 0.0, 2).unwrap();
        assert_eq!(plain.pareto_set, vec![0, 1, 2]);

        let diverse = optimize(&candidates, &objectives(), 1.0, 2).unwrap();
        let picked: Vec<usize> = diverse.selected.iter().map(|s| s.index).collect();
        assert!(picked.contains(&2));
        assert!(diverse.selected[1].diversity_penalty == 0.0);
    }

    #[test]
    fn test_deterministic_ties() {
        let candidates = vec![opt(0.5, 0.5, "x"), opt(0.5, 0.5, "y")];
        let result = optimize(&candidates, &objectives(), 0.0, 1).unwrap();
        assert_eq!(result.pareto_set, vec![0, 1]);
        assert_eq!(result.selected[0].index, 0);
    }

    #[test]
    fn test_invalid_objectives() {
        let bad = vec![Objective::maximize("score", -1.0, |o: &Offer| o.score)];
        assert!(optimize(&[opt(0.1, 0.1, "x")], &bad, 0.0, 1).is_err());
        assert!(optimize::<Offer>(&[opt(0.1, 0.1, "x")], &[], 0.0, 1).is_err());
        assert!(Objective::<Match>::by_name("vibes", 1.0).is_err());
        assert!(Objective::<Match>::by_name("hops", 1.0).unwrap().minimize);
    }
}
