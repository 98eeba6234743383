//! Error types for graph operations.

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors reported by the graph.
///
/// Absence is not an error: lookups return `Option` and reachability
/// returns `bool`. Only conditions that make an answer impossible end up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A topological sort met a node that was still on the active path.
    #[error("graph is not a DAG: cycle through {node}")]
    NotADag {
        /// Node that was found again while in progress.
        node: NodeId,
    },

    /// A path-enumerating query walked into a cycle.
    #[error("cyclic dependency through {node}")]
    CyclicDependency {
        /// First node seen twice on the same path.
        node: NodeId,
    },

    /// The id does not belong to this graph.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The edge id was never issued or the edge has been removed.
    #[error("unknown edge: {0}")]
    UnknownEdge(EdgeId),

    /// Every `u32` id of this kind has been issued.
    #[error("{kind} id space exhausted")]
    IdSpaceExhausted {
        /// `"node"` or `"edge"`.
        kind: &'static str,
    },

    /// Configuration could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
