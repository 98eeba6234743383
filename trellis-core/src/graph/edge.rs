//! Graph Edges

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::node::NodeId;

/// Identifier for an edge. Ids of removed edges are never reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for EdgeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge-{}", self.0)
    }
}

/// A directed "depends on" edge: `source` depends on `destination`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,

    /// The dependent.
    source: NodeId,

    /// The dependency.
    destination: NodeId,

    /// Opaque caller data.
    pub data: Value,

    /// Whether the endpoints were in different regions when last checked.
    pub cross_region: bool,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, source: NodeId, destination: NodeId) -> Self {
        Self {
            id,
            source,
            destination,
            data: Value::Null,
            cross_region: false,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// True if `node` is the dependent end.
    pub fn is_outgoing_from(&self, node: NodeId) -> bool {
        self.source == node
    }

    /// True if `node` is the dependency end.
    pub fn is_incoming_to(&self, node: NodeId) -> bool {
        self.destination == node
    }

    /// The endpoint opposite `node`.
    ///
    /// For a node that is not an endpoint this returns the source.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.destination
        } else {
            self.source
        }
    }
}
