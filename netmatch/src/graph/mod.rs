//! Graph Store and Path Finder
//!
//! - `store`: contacts, connections and the copy-on-write snapshot handle
//! - `path`: bounded BFS producing minimum-hop, trust-tie-broken paths

mod path;
mod store;

pub use path::{IntroPath, PathFinder, PathMap};
pub use store::{DegreeIndex, GraphStats, GraphStore, NetworkGraph};
