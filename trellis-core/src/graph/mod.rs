//! Dependency Graph
//!
//! This module implements the directed dependency graph: nodes registered
//! under a key, linked by "depends on" edges, and the algorithms that read
//! the structure back.
//!
//! # Overview
//!
//! - Nodes are identified by their key. Registering a key twice returns the
//!   node created the first time.
//! - An edge from A to B means A depends on B. There is at most one edge per
//!   ordered pair and never an edge from a node to itself.
//! - Nodes can be grouped into regions and sorted one region at a time.
//!
//! # Design Decisions
//!
//! 1. Nodes and edges live in arenas owned by the [`Graph`] and refer to
//!    each other by [`NodeId`] and [`EdgeId`], so there are no reference
//!    cycles and the whole graph is `Clone`.
//!
//! 2. Each node keeps a single adjacency list with both inbound and
//!    outbound edges. Direction is read off the edge.
//!
//! 3. Algorithms that need per-node scratch state (sorting, cycle search)
//!    allocate it per call. The graph itself only changes through the
//!    registry methods.

mod edge;
mod events;
mod node;
mod query;
mod registry;
mod topological;
mod walk;

pub use edge::{Edge, EdgeId};
pub use events::{GraphEvent, GraphListener, TracingListener};
pub use node::{Node, NodeId};
pub use query::Closure;
pub use registry::Graph;
pub use topological::{follow_dependencies, DefaultCriteria, Mark, SortStep, TopologicalSort};
pub use walk::{is_dependency_edge, is_dependency_edge_within_region, Walker};
