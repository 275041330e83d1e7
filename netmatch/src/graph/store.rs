//! In-memory network snapshot with copy-on-write versions.
//!
//! `NetworkGraph` owns every contact and connection for one user's network.
//! `GraphStore` wraps it in an `Arc`: readers take a `snapshot()` and keep an
//! immutable version for as long as they need it, while mutations clone the
//! graph only when a snapshot is still alive (`Arc::make_mut`).
//!
//! The adjacency index stores every edge under both endpoints. Introductions
//! can flow either way, so `relationship_type` is kept for display only.

use super::path::{IntroPath, PathFinder, PathMap};
use crate::cancel::CancelToken;
use crate::errors::{MatchError, MatchResult};
use crate::models::{Connection, Contact};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Degrees of separation computed by the last build
#[derive(Debug, Clone)]
pub struct DegreeIndex {
    pub root: String,
    pub max_degree: usize,
    /// Graph version this index was computed against
    pub version: u64,
    pub paths: PathMap,
}

/// Summary counts for logs and CLI output
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub contacts: usize,
    pub connections: usize,
    pub reachable: usize,
    pub max_degree: usize,
    pub per_degree: Vec<usize>,
}

/// All contacts and connections of one network, plus the derived degree index.
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    contacts: IndexMap<String, Arc<Contact>>,
    connections: Vec<Connection>,
    /// contact id -> indices into `connections`, both directions
    adjacency: FxHashMap<String, Vec<usize>>,
    index: Option<DegreeIndex>,
    version: u64,
}

fn check_weight(edge: &Connection, field: &'static str, value: f64) -> MatchResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MatchError::InvalidWeight {
            from: edge.from_contact_id.clone(),
            to: edge.to_contact_id.clone(),
            field,
            value,
        })
    }
}

impl NetworkGraph {
    /// Add a contact.
    ///
    /// # Errors
    /// - `DuplicateId` if a contact with the same id exists
    pub fn insert_contact(&mut self, contact: Contact) -> MatchResult<()> {
        if self.contacts.contains_key(&contact.id) {
            return Err(MatchError::DuplicateId(contact.id));
        }
        self.contacts.insert(contact.id.clone(), Arc::new(contact));
        self.invalidate();
        Ok(())
    }

    /// Replace an existing contact's profile.
    ///
    /// # Errors
    /// - `UnknownContact` if no contact has this id
    pub fn replace_contact(&mut self, contact: Contact) -> MatchResult<()> {
        match self.contacts.get_mut(&contact.id) {
            Some(slot) => {
                *slot = Arc::new(contact);
                self.invalidate();
                Ok(())
            }
            None => Err(MatchError::UnknownContact(contact.id)),
        }
    }

    /// Add a connection between two known contacts.
    ///
    /// # Errors
    /// - `UnknownContact` if either endpoint is missing
    /// - `InvalidWeight` if strength or trust is outside [0, 1]
    pub fn insert_connection(&mut self, edge: Connection) -> MatchResult<()> {
        for id in [&edge.from_contact_id, &edge.to_contact_id] {
            if !self.contacts.contains_key(id) {
                return Err(MatchError::UnknownContact(id.clone()));
            }
        }
        check_weight(&edge, "strength", edge.strength)?;
        check_weight(&edge, "trust_level", edge.trust_level)?;

        let idx = self.connections.len();
        self.adjacency
            .entry(edge.from_contact_id.clone())
            .or_default()
            .push(idx);
        if edge.to_contact_id != edge.from_contact_id {
            self.adjacency
                .entry(edge.to_contact_id.clone())
                .or_default()
                .push(idx);
        }
        self.connections.push(edge);
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.index = None;
        self.version += 1;
    }

    /// Recompute degrees of separation from `root` within `max_degree` hops.
    ///
    /// Replaces any previously built index. A failed build leaves the
    /// graph unbuilt.
    pub fn build(
        &mut self,
        root: &str,
        max_degree: usize,
        cancel: Option<&CancelToken>,
    ) -> MatchResult<()> {
        self.invalidate();
        let finder = PathFinder::new(self);
        let finder = match cancel {
            Some(token) => finder.with_cancel(token),
            None => finder,
        };
        let paths = finder.find_paths(root, max_degree)?;

        info!(
            "Built network index from {}: {} of {} contacts within {} hops",
            root,
            paths.len(),
            self.contacts.len(),
            max_degree
        );
        self.index = Some(DegreeIndex {
            root: root.to_string(),
            max_degree,
            version: self.version,
            paths,
        });
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&DegreeIndex> {
        self.index.as_ref()
    }

    /// Monotonic counter bumped by every mutation and build
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contact(&self, id: &str) -> Option<&Arc<Contact>> {
        self.contacts.get(id)
    }

    /// Contacts in insertion order
    pub fn contacts(&self) -> impl Iterator<Item = &Arc<Contact>> {
        self.contacts.values()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, idx: usize) -> &Connection {
        &self.connections[idx]
    }

    /// Edges touching `id` as `(edge index, edge, neighbor id)`, either direction
    pub fn neighbors<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = (usize, &'a Connection, &'a str)> + 'a {
        let id = id.to_string();
        self.adjacency
            .get(id.as_str())
            .into_iter()
            .flatten()
            .filter_map(move |&idx| {
                let edge = &self.connections[idx];
                edge.other_end(&id).map(|other| (idx, edge, other))
            })
    }

    /// Number of distinct neighbors of `id`
    pub fn neighbor_count(&self, id: &str) -> usize {
        let mut ids: Vec<&str> = self.neighbors(id).map(|(_, _, n)| n).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Contacts whose degree equals exactly `degree`, sorted by id.
    /// Empty when the graph has not been built.
    pub fn contacts_by_degree(&self, degree: usize) -> Vec<Arc<Contact>> {
        let Some(index) = &self.index else {
            return Vec::new();
        };
        if degree > index.max_degree {
            return Vec::new();
        }
        index
            .paths
            .ids_at_degree(degree)
            .into_iter()
            .filter_map(|id| self.contacts.get(id).cloned())
            .collect()
    }

    pub fn degree_of(&self, id: &str) -> Option<usize> {
        self.index.as_ref().and_then(|i| i.paths.degree(id))
    }

    pub fn path_to(&self, id: &str) -> Option<&IntroPath> {
        self.index.as_ref().and_then(|i| i.paths.get(id))
    }

    /// Contacts within the built bound, root included; 0 before a build
    pub fn reachable_count(&self) -> usize {
        self.index.as_ref().map_or(0, |i| i.paths.len())
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            contacts: self.contacts.len(),
            connections: self.connections.len(),
            ..Default::default()
        };
        if let Some(index) = &self.index {
            stats.reachable = index.paths.len();
            stats.max_degree = index.max_degree;
            stats.per_degree = (0..=index.max_degree)
                .map(|d| index.paths.ids_at_degree(d).len())
                .collect();
        }
        stats
    }
}

/// Owner of the current graph version.
///
/// Mutations are serialized through `&mut self`; in-flight readers keep the
/// snapshot they were handed.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    current: Arc<NetworkGraph>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a full snapshot, stopping at the first invalid record
    pub fn from_records(
        contacts: impl IntoIterator<Item = Contact>,
        connections: impl IntoIterator<Item = Connection>,
    ) -> MatchResult<Self> {
        let mut store = Self::new();
        for contact in contacts {
            store.add_contact(contact)?;
        }
        for edge in connections {
            store.add_connection(edge)?;
        }
        debug!(
            "Loaded {} contacts and {} connections",
            store.current.contact_count(),
            store.current.connections().len()
        );
        Ok(store)
    }

    pub fn add_contact(&mut self, contact: Contact) -> MatchResult<()> {
        Arc::make_mut(&mut self.current).insert_contact(contact)
    }

    pub fn update_contact(&mut self, contact: Contact) -> MatchResult<()> {
        Arc::make_mut(&mut self.current).replace_contact(contact)
    }

    pub fn add_connection(&mut self, edge: Connection) -> MatchResult<()> {
        Arc::make_mut(&mut self.current).insert_connection(edge)
    }

    /// Build degrees of separation from `root_id` and publish a new version.
    pub fn build_graph(&mut self, root_id: &str, max_degree: usize) -> MatchResult<()> {
        Arc::make_mut(&mut self.current).build(root_id, max_degree, None)
    }

    pub fn build_graph_cancellable(
        &mut self,
        root_id: &str,
        max_degree: usize,
        cancel: &CancelToken,
    ) -> MatchResult<()> {
        Arc::make_mut(&mut self.current).build(root_id, max_degree, Some(cancel))
    }

    pub fn get_contacts_by_degree(&self, degree: usize) -> Vec<Arc<Contact>> {
        self.current.contacts_by_degree(degree)
    }

    /// Immutable handle to the current version
    pub fn snapshot(&self) -> Arc<NetworkGraph> {
        Arc::clone(&self.current)
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.current
    }
}
