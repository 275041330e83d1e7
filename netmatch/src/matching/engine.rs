//! Matching engine: paths + compatibility -> ranked matches.
//!
//! For every candidate reachable from the source within the configured
//! bound, the engine scores compatibility once, derives one `Match` per
//! applicable and enabled match type, then merges everything into a single
//! deterministic ranking.
//!
//! Candidates are scored in parallel over a read-only graph snapshot. The
//! final sort is the only synchronization point.

use super::config::MatchConfig;
use super::signals::{self, PairContext};
use super::status::{MatchStatus, StatusChange, StatusListener};
use crate::cancel::CancelToken;
use crate::errors::{MatchError, MatchResult};
use crate::graph::{IntroPath, NetworkGraph, PathFinder};
use crate::models::{deterministic_match_id, Contact, Match, MatchReason, MatchType};
use crate::scoring::CompatibilityScorer;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// Scores closer than this rank as equal
const SCORE_EPSILON: f64 = 1e-9;

/// Quantize a score so that ranking is a total order.
///
/// Scores are rounded to the nearest multiple of `SCORE_EPSILON`. Two scores
/// closer than that but on either side of a rounding edge still land in
/// adjacent buckets, so the compatibility tie-break only applies within one
/// bucket. An epsilon window is not transitive and cannot drive a sort.
fn rank_key(score: f64) -> i64 {
    (score / SCORE_EPSILON).round() as i64
}

/// Ranking order: overall score desc, compatibility desc, target id asc,
/// match type asc.
pub fn rank_order(a: &Match, b: &Match) -> Ordering {
    rank_key(b.overall_score)
        .cmp(&rank_key(a.overall_score))
        .then_with(|| rank_key(b.compatibility_score).cmp(&rank_key(a.compatibility_score)))
        .then_with(|| a.target_contact.id.cmp(&b.target_contact.id))
        .then_with(|| a.match_type.cmp(&b.match_type))
}

fn type_reason(match_type: MatchType, target: &Contact, value: f64) -> MatchReason {
    let description = match match_type {
        MatchType::Investment => format!("{} could fund your work", target.label()),
        MatchType::Hiring => format!("{} has skills you are hiring for", target.label()),
        MatchType::KnowledgeExchange => format!("{} can share expertise", target.label()),
        MatchType::Collaboration => format!("{} complements what you do", target.label()),
        MatchType::Event => format!("You and {} share interests nearby", target.label()),
        MatchType::Introduction => format!("{} widens your network", target.label()),
    };
    MatchReason::new(description, value)
}

fn path_reason(path: &IntroPath) -> MatchReason {
    let description = if path.hops() <= 1 {
        "Direct connection".to_string()
    } else {
        let via: Vec<&str> = path.intermediaries().iter().map(|c| c.label()).collect();
        format!("Reachable via {}", via.join(", "))
    };
    MatchReason::new(description, path.trust_score).with_evidence(vec![path.describe()])
}

/// Produces ranked matches and owns their status transitions.
pub struct MatchingEngine {
    scorer: CompatibilityScorer,
    /// Reference time for recency
    as_of: DateTime<Utc>,
    listeners: Vec<Arc<dyn StatusListener>>,
    cancel: Option<CancelToken>,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(CompatibilityScorer::default())
    }
}

impl MatchingEngine {
    pub fn new(scorer: CompatibilityScorer) -> Self {
        Self {
            scorer,
            as_of: Utc::now(),
            listeners: Vec::new(),
            cancel: None,
        }
    }

    /// Fix the reference time so timing factors are reproducible
    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn StatusListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn scorer(&self) -> &CompatibilityScorer {
        &self.scorer
    }

    fn check_cancel(&self) -> MatchResult<()> {
        match &self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    /// Rank `candidates` for `source` over `graph`.
    ///
    /// Paths are computed from `source.id` on the given snapshot, so the
    /// graph does not need to be built from that root. Candidates that are
    /// unreachable within `max_degree_of_separation`, or that fall below
    /// either minimum score, are left out.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration does not validate
    /// - `UnknownContact` if `source` is not in the graph
    /// - `Cancelled` if the engine's token fires
    pub fn find_matches(
        &self,
        graph: &NetworkGraph,
        source: &Contact,
        candidates: &[Arc<Contact>],
        config: &MatchConfig,
    ) -> MatchResult<Vec<Match>> {
        let config = config.validated()?;

        let finder = PathFinder::new(graph);
        let finder = match &self.cancel {
            Some(token) => finder.with_cancel(token),
            None => finder,
        };
        let paths = finder.find_paths(&source.id, config.max_degree_of_separation)?;
        let source_arc = Arc::new(source.clone());

        let per_candidate: Vec<Vec<Match>> = candidates
            .par_iter()
            .filter(|c| c.id != source.id)
            .map(|candidate| {
                self.check_cancel()?;
                let Some(path) = paths.get(&candidate.id) else {
                    return Ok(Vec::new());
                };
                Ok(self.score_candidate(&source_arc, candidate, path, graph, &config))
            })
            .collect::<MatchResult<_>>()?;

        let mut matches: Vec<Match> = per_candidate.into_iter().flatten().collect();
        matches.sort_by(rank_order);

        if let Some(cap) = config.max_results_per_type {
            let mut seen: FxHashMap<MatchType, usize> = FxHashMap::default();
            matches.retain(|m| {
                let count = seen.entry(m.match_type).or_insert(0);
                *count += 1;
                *count <= cap
            });
        }

        info!(
            "Found {} matches for {} among {} candidates ({} reachable)",
            matches.len(),
            source.id,
            candidates.len(),
            paths.len().saturating_sub(1)
        );
        Ok(matches)
    }

    /// Rank every other contact in the graph for `source_id`.
    ///
    /// # Errors
    /// Same as [`MatchingEngine::find_matches`].
    pub fn find_matches_in_network(
        &self,
        graph: &NetworkGraph,
        source_id: &str,
        config: &MatchConfig,
    ) -> MatchResult<Vec<Match>> {
        let source = graph
            .contact(source_id)
            .ok_or_else(|| MatchError::UnknownContact(source_id.to_string()))?;
        let candidates: Vec<Arc<Contact>> = graph.contacts().cloned().collect();
        self.find_matches(graph, source, &candidates, config)
    }

    fn score_candidate(
        &self,
        source: &Arc<Contact>,
        target: &Arc<Contact>,
        path: &IntroPath,
        graph: &NetworkGraph,
        config: &MatchConfig,
    ) -> Vec<Match> {
        let breakdown = self.scorer.score(source, target);
        if breakdown.total < config.min_compatibility_score {
            debug!(
                "Dropping {}: compatibility {:.3} below {}",
                target.id, breakdown.total, config.min_compatibility_score
            );
            return Vec::new();
        }

        let success = signals::success_probability(path, breakdown.total);
        if success < config.min_success_probability {
            debug!(
                "Dropping {}: success probability {:.3} below {}",
                target.id, success, config.min_success_probability
            );
            return Vec::new();
        }

        let timing = signals::timing_factor(path, self.as_of, &config.timing);
        let ctx = PairContext {
            source,
            target,
            path,
            breakdown: &breakdown,
            target_reach: graph.neighbor_count(&target.id),
        };

        let mut types: Vec<MatchType> = signals::applicable_types(&self.scorer, &ctx)
            .into_iter()
            .filter(|t| config.is_enabled(*t))
            .collect();
        if types.is_empty() {
            match signals::fallback_type(path, |t| config.is_enabled(t)) {
                Some(t) => {
                    debug!("No trigger for {}, falling back to {}", target.id, t);
                    types.push(t);
                }
                None => {
                    debug!("Dropping {}: no enabled match type applies", target.id);
                    return Vec::new();
                }
            }
        }

        types
            .into_iter()
            .map(|match_type| {
                let value = signals::value_potential(&self.scorer, &ctx, match_type);
                let overall =
                    config
                        .priority_weights
                        .combine(value, success, path.trust_score, timing);

                let mut reasons = breakdown.reasons.clone();
                reasons.push(type_reason(match_type, target, value));
                reasons.push(path_reason(path));

                Match {
                    id: deterministic_match_id(&source.id, &target.id, match_type),
                    source_contact: Arc::clone(source),
                    target_contact: Arc::clone(target),
                    match_type,
                    compatibility_score: breakdown.total,
                    value_potential: value,
                    success_probability: success,
                    timing_factor: timing,
                    overall_score: overall,
                    shortest_path: path.clone(),
                    priority: config.priority_thresholds.classify(overall),
                    status: MatchStatus::New,
                    reasons,
                }
            })
            .collect()
    }

    /// Move a match to `next` and notify listeners.
    ///
    /// # Errors
    /// - `InvalidTransition` unless `next` is a forward step or a dismissal
    ///   from a non-terminal status
    pub fn transition(&self, m: &mut Match, next: MatchStatus) -> MatchResult<StatusChange> {
        let from = m.status;
        if !from.can_transition_to(next) {
            return Err(MatchError::InvalidTransition {
                match_id: m.id.clone(),
                from: from.to_string(),
                to: next.to_string(),
            });
        }
        m.status = next;

        let change = StatusChange {
            match_id: m.id.clone(),
            source_id: m.source_contact.id.clone(),
            target_id: m.target_contact.id.clone(),
            match_type: m.match_type,
            from,
            to: next,
        };
        debug!("Match {} moved {} -> {}", change.match_id, from, next);
        for listener in &self.listeners {
            listener.on_status_change(&change);
        }
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;
    use crate::matching::config::PriorityWeights;
    use crate::models::{Connection, RelationshipType};
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn permissive() -> MatchConfig {
        MatchConfig {
            min_compatibility_score: 0.0,
            min_success_probability: 0.0,
            ..Default::default()
        }
    }

    /// me -> ana (friend) -> bo (colleague) -> cy (acquaintance), me -> dee
    fn network() -> GraphStore {
        let contacts = vec![
            Contact::new("me", "Me")
                .with_industry("software")
                .with_skills(&["rust", "python"])
                .with_needs(&["seed funding", "rust developer"])
                .with_offerings(&["product advice"]),
            Contact::new("ana", "Ana")
                .with_industry("software")
                .with_skills(&["rust", "distributed systems"])
                .with_offerings(&["code review"]),
            Contact::new("bo", "Bo")
                .with_industry("venture capital")
                .with_offerings(&["seed funding", "angel investing"])
                .with_needs(&["product advice"]),
            Contact::new("cy", "Cy").with_industry("retail"),
            Contact::new("dee", "Dee")
                .with_industry("software")
                .with_skills(&["rust"])
                .with_needs(&["product advice"]),
        ];
        let edges = vec![
            Connection::new("me", "ana", RelationshipType::Friend, 0.9, 0.9),
            Connection::new("ana", "bo", RelationshipType::Colleague, 0.8, 0.8),
            Connection::new("bo", "cy", RelationshipType::Acquaintance, 0.3, 0.3),
            Connection::new("dee", "me", RelationshipType::Colleague, 0.6, 0.7),
        ];
        GraphStore::from_records(contacts, edges).unwrap()
    }

    #[test]
    fn test_find_matches_excludes_source_and_unreachable() {
        let store = network();
        let engine = MatchingEngine::default().with_as_of(as_of());
        let config = MatchConfig {
            max_degree_of_separation: 2,
            ..permissive()
        };
        let matches = engine
            .find_matches_in_network(store.graph(), "me", &config)
            .unwrap();

        assert!(!matches.is_empty());
        assert!(matches.iter().all(|m| m.target_contact.id != "me"));
        // cy is three hops away
        assert!(matches.iter().all(|m| m.target_contact.id != "cy"));
        assert!(matches.iter().all(|m| m.degree() <= 2));
        assert!(matches
            .iter()
            .any(|m| m.target_contact.id == "bo" && m.match_type == MatchType::Investment));
    }

    #[test]
    fn test_untriggered_pair_still_matched() {
        let contacts = vec![
            Contact::new("kai", "Kai")
                .with_title("CTO")
                .with_industry("software")
                .with_location("Berlin")
                .with_interests(&["climate"]),
            Contact::new("lou", "Lou")
                .with_title("CTO")
                .with_industry("software")
                .with_location("Paris")
                .with_interests(&["climate"]),
        ];
        let edges = vec![Connection::new("kai", "lou", RelationshipType::Friend, 0.9, 0.9)];
        let store = GraphStore::from_records(contacts, edges).unwrap();
        let engine = MatchingEngine::default().with_as_of(as_of());
        let matches = engine
            .find_matches_in_network(store.graph(), "kai", &MatchConfig::default())
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].target_contact.id, "lou");
        assert_eq!(matches[0].match_type, MatchType::Collaboration);
    }

    #[test]
    fn test_every_candidate_above_floors_appears() {
        let store = network();
        let engine = MatchingEngine::default().with_as_of(as_of());
        let config = MatchConfig {
            max_degree_of_separation: 3,
            min_compatibility_score: 0.1,
            min_success_probability: 0.1,
            ..Default::default()
        };
        let matches = engine
            .find_matches_in_network(store.graph(), "me", &config)
            .unwrap();

        let paths = PathFinder::new(store.graph()).find_paths("me", 3).unwrap();
        let me = store.graph().contact("me").unwrap();
        for contact in store.graph().contacts().filter(|c| c.id != "me") {
            let Some(path) = paths.get(&contact.id) else {
                continue;
            };
            let compat = engine.scorer().score(me, contact).total;
            let success = signals::success_probability(path, compat);
            let expected = compat >= config.min_compatibility_score
                && success >= config.min_success_probability;
            let found = matches.iter().any(|m| m.target_contact.id == contact.id);
            assert_eq!(found, expected, "candidate {}", contact.id);
        }
    }

    #[test]
    fn test_rank_key_buckets() {
        assert_eq!(rank_key(0.5), rank_key(0.5 + 1e-12));
        assert_eq!(rank_key(0.5), rank_key(0.5 - 4e-10));
        assert!(rank_key(0.5 + 2e-9) > rank_key(0.5));
        // neighbours across a rounding edge split into adjacent buckets
        let edge = 0.5 + 0.5 * SCORE_EPSILON;
        assert_eq!(rank_key(edge + 1e-13) - rank_key(edge - 1e-13), 1);
    }

    #[test]
    fn test_ranking_sorted_and_deterministic() {
        let store = network();
        let engine = MatchingEngine::default().with_as_of(as_of());
        let first = engine
            .find_matches_in_network(store.graph(), "me", &permissive())
            .unwrap();
        let second = engine
            .find_matches_in_network(store.graph(), "me", &permissive())
            .unwrap();

        let ids = |ms: &[Match]| ms.iter().map(|m| m.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        for pair in first.windows(2) {
            assert_ne!(rank_order(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_thresholds_filter_not_penalize() {
        let store = network();
        let engine = MatchingEngine::default().with_as_of(as_of());
        let strict = MatchConfig {
            min_compatibility_score: 0.99,
            ..permissive()
        };
        let matches = engine
            .find_matches_in_network(store.graph(), "me", &strict)
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_enabled_types_respected() {
        let store = network();
        let engine = MatchingEngine::default().with_as_of(as_of());
        let config = permissive().with_enabled_types(&["INVESTMENT"]).unwrap();
        let matches = engine
            .find_matches_in_network(store.graph(), "me", &config)
            .unwrap();
        assert!(!matches.is_empty());
        assert!(matches.iter().all(|m| m.match_type == MatchType::Investment));
    }

    #[test]
    fn test_per_type_cap() {
        let store = network();
        let engine = MatchingEngine::default().with_as_of(as_of());
        let config = MatchConfig {
            max_results_per_type: Some(1),
            ..permissive()
        };
        let matches = engine
            .find_matches_in_network(store.graph(), "me", &config)
            .unwrap();
        let mut types: Vec<MatchType> = matches.iter().map(|m| m.match_type).collect();
        let total = types.len();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), total);
    }

    #[test]
    fn test_overall_uses_priority_weights() {
        let store = network();
        let engine = MatchingEngine::default().with_as_of(as_of());
        let matches = engine
            .find_matches_in_network(store.graph(), "me", &permissive())
            .unwrap();
        let weights = PriorityWeights::default();
        for m in &matches {
            let expected = weights.combine(
                m.value_potential,
                m.success_probability,
                m.path_trust_score(),
                m.timing_factor,
            );
            assert!((m.overall_score - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let store = network();
        let engine = MatchingEngine::default();
        let config = MatchConfig {
            priority_weights: PriorityWeights {
                value_potential: 0.5,
                success_probability: 0.5,
                trust_level: 0.5,
                timing: 0.5,
            },
            ..permissive()
        };
        let err = engine
            .find_matches_in_network(store.graph(), "me", &config)
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_source() {
        let store = network();
        let engine = MatchingEngine::default();
        let err = engine
            .find_matches_in_network(store.graph(), "ghost", &permissive())
            .unwrap_err();
        assert_eq!(err, MatchError::UnknownContact("ghost".into()));
    }

    #[test]
    fn test_cancelled_run() {
        let store = network();
        let token = CancelToken::new();
        token.cancel();
        let engine = MatchingEngine::default().with_cancel(token);
        let err = engine
            .find_matches_in_network(store.graph(), "me", &permissive())
            .unwrap_err();
        assert_eq!(err, MatchError::Cancelled);
    }

    #[derive(Default)]
    struct Recorder {
        changes: Mutex<Vec<StatusChange>>,
    }

    impl StatusListener for Recorder {
        fn on_status_change(&self, change: &StatusChange) {
            self.changes.lock().unwrap().push(change.clone());
        }
    }

    #[test]
    fn test_transitions_notify_listeners() {
        let store = network();
        let recorder = Arc::new(Recorder::default());
        let engine = MatchingEngine::default()
            .with_as_of(as_of())
            .with_listener(recorder.clone());
        let mut m = engine
            .find_matches_in_network(store.graph(), "me", &permissive())
            .unwrap()
            .remove(0);
        assert_eq!(m.status(), MatchStatus::New);

        engine.transition(&mut m, MatchStatus::Reviewed).unwrap();
        let change = engine
            .transition(&mut m, MatchStatus::IntroductionRequested)
            .unwrap();
        assert!(change.requests_introduction());
        assert_eq!(m.status(), MatchStatus::IntroductionRequested);

        let err = engine.transition(&mut m, MatchStatus::New).unwrap_err();
        assert!(matches!(err, MatchError::InvalidTransition { .. }));
        assert_eq!(m.status(), MatchStatus::IntroductionRequested);

        engine.transition(&mut m, MatchStatus::Dismissed).unwrap();
        assert!(engine.transition(&mut m, MatchStatus::Completed).is_err());

        let changes = recorder.changes.lock().unwrap();
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[2].to, MatchStatus::Dismissed);
    }
}
