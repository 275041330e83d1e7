//! Network snapshot files
//!
//! ```json
//! {
//!   "contacts": [{ "id": "me", "name": "Morgan", "needs": ["seed funding"] }],
//!   "connections": [{ "from_contact_id": "me", "to_contact_id": "mia",
//!                     "relationship_type": "MENTOR", "strength": 0.9, "trust_level": 0.95 }]
//! }
//! ```

use anyhow::{Context, Result};
use netmatch::{Connection, Contact, GraphStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkFile {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Read a snapshot and load it into a graph store
pub fn load_network(path: &Path) -> Result<GraphStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read network file {}", path.display()))?;
    let file: NetworkFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse network file {}", path.display()))?;

    let (contacts, connections) = (file.contacts.len(), file.connections.len());
    let store = GraphStore::from_records(file.contacts, file.connections)
        .with_context(|| format!("Invalid network in {}", path.display()))?;
    info!(
        "Loaded {} contacts and {} connections from {}",
        contacts,
        connections,
        path.display()
    );
    Ok(store)
}

/// Read a JSON document such as a goal
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
