//! Graph Nodes
//!
//! This module defines the node type that lives in the dependency graph.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use super::edge::EdgeId;

/// Identifier for a node in the dependency graph.
///
/// Ids are handed out sequentially by the owning graph, starting at zero, and
/// double as the node's index in the graph's arena. Nodes are never removed,
/// so an id stays valid for the lifetime of its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node-{}", self.0)
    }
}

/// A node in the dependency graph.
///
/// `K` is the key the node was registered under; it is also the node's
/// payload. `R` is the region key type.
#[derive(Debug, Clone)]
pub struct Node<K, R> {
    /// Identifier, equal to the node count when the node was created.
    id: NodeId,

    /// The key this node is registered under.
    data: K,

    /// Incident edges, both inbound and outbound, in insertion order.
    edges: SmallVec<[EdgeId; 4]>,

    /// Region this node was last put into.
    region: Option<R>,

    /// Free-form slot for callers. `Null` until set.
    metadata: Value,
}

impl<K, R> Node<K, R> {
    pub(crate) fn new(id: NodeId, data: K) -> Self {
        Self {
            id,
            data,
            edges: SmallVec::new(),
            region: None,
            metadata: Value::Null,
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the key the node is registered under.
    pub fn data(&self) -> &K {
        &self.data
    }

    /// All incident edges. Direction has to be checked against the edge.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of incident edges, inbound and outbound.
    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    /// Region the node belongs to, if any.
    pub fn region(&self) -> Option<&R> {
        self.region.as_ref()
    }

    /// Caller metadata.
    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    /// Mutable access to caller metadata.
    pub fn metadata_mut(&mut self) -> &mut Value {
        &mut self.metadata
    }

    /// Replace caller metadata, returning the previous value.
    pub fn set_metadata(&mut self, metadata: Value) -> Value {
        std::mem::replace(&mut self.metadata, metadata)
    }

    pub(crate) fn set_region(&mut self, region: R) {
        self.region = Some(region);
    }

    pub(crate) fn attach_edge(&mut self, edge: EdgeId) {
        self.edges.push(edge);
    }

    /// Drop `edge` from this side only. The other endpoint still lists it
    /// afterwards, so the registry always calls this in pairs.
    pub(crate) fn detach_edge(&mut self, edge: EdgeId) {
        self.edges.retain(|e| *e != edge);
    }
}
