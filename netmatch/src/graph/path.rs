//! Bounded breadth-first introduction path discovery.
//!
//! Expands one frontier per hop from the root, so the first path recorded
//! for a contact always has the minimum hop count. When several contacts on
//! the current frontier can reach the same new contact, the edge with the
//! larger `trust_level * strength` wins, then the lexicographically smaller
//! parent id.
//!
//! Trust compounds: a path's trust score is the product of `trust_level`
//! over every edge traversed, so one weak intermediary collapses the whole
//! chain.
//!
//! Time complexity: O(V + E) within the hop bound, plus sorting each frontier.

use super::store::NetworkGraph;
use crate::cancel::CancelToken;
use crate::errors::{MatchError, MatchResult};
use crate::models::{Connection, Contact};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::debug;

/// Two edge weights closer than this are considered tied
const WEIGHT_EPSILON: f64 = 1e-12;

/// An ordered introduction chain from the root to a target, inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroPath {
    pub contacts: Vec<Arc<Contact>>,
    /// Edges traversed, `connections[i]` joins `contacts[i]` and `contacts[i + 1]`
    pub connections: Vec<Connection>,
    pub trust_score: f64,
}

impl IntroPath {
    fn origin(root: Arc<Contact>) -> Self {
        Self {
            contacts: vec![root],
            connections: Vec::new(),
            trust_score: 1.0,
        }
    }

    fn extend(&self, edge: &Connection, next: Arc<Contact>) -> Self {
        let mut contacts = self.contacts.clone();
        contacts.push(next);
        let mut connections = self.connections.clone();
        connections.push(edge.clone());
        Self {
            contacts,
            connections,
            trust_score: self.trust_score * edge.trust_level,
        }
    }

    /// Number of edges on the path
    pub fn hops(&self) -> usize {
        self.connections.len()
    }

    pub fn target(&self) -> &Contact {
        // a path always holds at least the root
        &self.contacts[self.contacts.len() - 1]
    }

    /// Contacts strictly between root and target
    pub fn intermediaries(&self) -> &[Arc<Contact>] {
        if self.contacts.len() <= 2 {
            &[]
        } else {
            &self.contacts[1..self.contacts.len() - 1]
        }
    }

    /// Display form, e.g. "Ada -> Grace -> Linus"
    pub fn describe(&self) -> String {
        self.contacts
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Result of a bounded search: every reachable contact with its best path.
#[derive(Debug, Clone, Default)]
pub struct PathMap {
    pub root: String,
    pub max_degree: usize,
    paths: FxHashMap<String, IntroPath>,
}

impl PathMap {
    pub fn get(&self, id: &str) -> Option<&IntroPath> {
        self.paths.get(id)
    }

    pub fn degree(&self, id: &str) -> Option<usize> {
        self.paths.get(id).map(|p| p.hops())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.paths.contains_key(id)
    }

    /// Reachable contacts including the root
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IntroPath)> {
        self.paths.iter()
    }

    /// Ids at exactly `degree` hops, sorted
    pub fn ids_at_degree(&self, degree: usize) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .paths
            .iter()
            .filter(|(_, p)| p.hops() == degree)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Candidate parent for a contact discovered on the next frontier
#[derive(Clone, Copy)]
struct Discovery<'a> {
    parent: &'a str,
    edge: usize,
    weight: f64,
}

impl Discovery<'_> {
    fn beats(&self, other: &Discovery<'_>) -> bool {
        if self.weight > other.weight + WEIGHT_EPSILON {
            return true;
        }
        if (self.weight - other.weight).abs() <= WEIGHT_EPSILON {
            return (self.parent, self.edge) < (other.parent, other.edge);
        }
        false
    }
}

/// Breadth-first path finder over an immutable graph snapshot.
pub struct PathFinder<'a> {
    graph: &'a NetworkGraph,
    cancel: Option<&'a CancelToken>,
}

impl<'a> PathFinder<'a> {
    pub fn new(graph: &'a NetworkGraph) -> Self {
        Self {
            graph,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Find the best path to every contact within `max_degree` hops of `root`.
    ///
    /// # Errors
    /// - `UnknownContact` if `root` is not in the graph
    /// - `Cancelled` if the token fires between frontiers
    pub fn find_paths(&self, root: &str, max_degree: usize) -> MatchResult<PathMap> {
        let root_contact = self
            .graph
            .contact(root)
            .ok_or_else(|| MatchError::UnknownContact(root.to_string()))?;

        let mut paths: FxHashMap<String, IntroPath> = FxHashMap::default();
        paths.insert(root.to_string(), IntroPath::origin(Arc::clone(root_contact)));

        let mut frontier: Vec<&str> = vec![root_contact.id.as_str()];

        for hop in 1..=max_degree {
            if let Some(token) = self.cancel {
                token.check()?;
            }

            let mut discovered: FxHashMap<&str, Discovery<'_>> = FxHashMap::default();
            for &node in &frontier {
                for (edge_idx, edge, neighbor) in self.graph.neighbors(node) {
                    if paths.contains_key(neighbor) {
                        continue;
                    }
                    let candidate = Discovery {
                        parent: node,
                        edge: edge_idx,
                        weight: edge.tie_break_weight(),
                    };
                    match discovered.entry(neighbor) {
                        Entry::Vacant(slot) => {
                            slot.insert(candidate);
                        }
                        Entry::Occupied(mut slot) => {
                            if candidate.beats(slot.get()) {
                                slot.insert(candidate);
                            }
                        }
                    }
                }
            }

            if discovered.is_empty() {
                break;
            }

            let mut next: Vec<&str> = discovered.keys().copied().collect();
            next.sort_unstable();

            for &id in &next {
                let found = discovered[id];
                let edge = self.graph.connection(found.edge);
                let Some(contact) = self.graph.contact(id) else {
                    continue;
                };
                let path = paths[found.parent].extend(edge, Arc::clone(contact));
                paths.insert(id.to_string(), path);
            }

            debug!("Hop {}: {} new contacts reached", hop, next.len());
            frontier = next;
        }

        Ok(PathMap {
            root: root.to_string(),
            max_degree,
            paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelationshipType;

    fn graph_with(ids: &[&str], edges: Vec<Connection>) -> NetworkGraph {
        let mut graph = NetworkGraph::default();
        for id in ids {
            graph.insert_contact(Contact::new(id, id)).unwrap();
        }
        for edge in edges {
            graph.insert_connection(edge).unwrap();
        }
        graph
    }

    fn edge(from: &str, to: &str, strength: f64, trust: f64) -> Connection {
        Connection::new(from, to, RelationshipType::Friend, strength, trust)
    }

    #[test]
    fn test_trust_compounds_multiplicatively() {
        let graph = graph_with(
            &["root", "a", "b"],
            vec![edge("root", "a", 1.0, 0.9), edge("a", "b", 1.0, 0.5)],
        );
        let paths = PathFinder::new(&graph).find_paths("root", 3).unwrap();
        let path = paths.get("b").unwrap();
        assert_eq!(path.hops(), 2);
        assert!((path.trust_score - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_bound_excludes_far_contacts() {
        let graph = graph_with(
            &["root", "a", "b", "c"],
            vec![
                edge("root", "a", 1.0, 1.0),
                edge("a", "b", 1.0, 1.0),
                edge("b", "c", 1.0, 1.0),
            ],
        );
        let paths = PathFinder::new(&graph).find_paths("root", 2).unwrap();
        assert!(paths.contains("b"));
        assert!(!paths.contains("c"));
        assert_eq!(paths.degree("root"), Some(0));
    }

    #[test]
    fn test_edges_traversed_in_reverse() {
        // every edge points toward the root
        let graph = graph_with(
            &["root", "a", "b"],
            vec![edge("a", "root", 1.0, 0.8), edge("b", "a", 1.0, 0.8)],
        );
        let paths = PathFinder::new(&graph).find_paths("root", 2).unwrap();
        assert_eq!(paths.degree("b"), Some(2));
    }

    #[test]
    fn test_tie_break_prefers_stronger_edge() {
        // diamond: root -> {m1, m2} -> target
        let graph = graph_with(
            &["root", "m1", "m2", "target"],
            vec![
                edge("root", "m1", 1.0, 1.0),
                edge("root", "m2", 1.0, 1.0),
                edge("m1", "target", 0.5, 0.5),
                edge("m2", "target", 0.9, 0.9),
            ],
        );
        let paths = PathFinder::new(&graph).find_paths("root", 2).unwrap();
        let path = paths.get("target").unwrap();
        assert_eq!(path.contacts[1].id, "m2");
    }

    #[test]
    fn test_tie_break_prefers_smaller_parent_id() {
        let graph = graph_with(
            &["root", "zed", "amy", "target"],
            vec![
                edge("root", "zed", 1.0, 1.0),
                edge("root", "amy", 1.0, 1.0),
                edge("zed", "target", 0.6, 0.6),
                edge("amy", "target", 0.6, 0.6),
            ],
        );
        let paths = PathFinder::new(&graph).find_paths("root", 2).unwrap();
        assert_eq!(paths.get("target").unwrap().contacts[1].id, "amy");
    }

    #[test]
    fn test_path_length_equals_degree() {
        let graph = graph_with(
            &["root", "a", "b", "c", "d"],
            vec![
                edge("root", "a", 1.0, 1.0),
                edge("a", "b", 1.0, 1.0),
                edge("b", "c", 1.0, 1.0),
                edge("root", "c", 0.1, 0.1),
                edge("c", "d", 1.0, 1.0),
            ],
        );
        let paths = PathFinder::new(&graph).find_paths("root", 4).unwrap();
        for (id, path) in paths.iter() {
            assert_eq!(path.contacts.len(), path.hops() + 1, "{}", id);
            assert_eq!(path.target().id, *id);
        }
        // the weak direct edge still wins on hop count
        assert_eq!(paths.degree("c"), Some(1));
        assert_eq!(paths.degree("d"), Some(2));
    }

    #[test]
    fn test_unknown_root() {
        let graph = graph_with(&["a"], vec![]);
        assert_eq!(
            PathFinder::new(&graph).find_paths("nobody", 2).unwrap_err(),
            MatchError::UnknownContact("nobody".into())
        );
    }

    #[test]
    fn test_cancelled_search() {
        let graph = graph_with(&["root", "a"], vec![edge("root", "a", 1.0, 1.0)]);
        let token = CancelToken::new();
        token.cancel();
        let result = PathFinder::new(&graph).with_cancel(&token).find_paths("root", 2);
        assert_eq!(result.unwrap_err(), MatchError::Cancelled);
    }
}
