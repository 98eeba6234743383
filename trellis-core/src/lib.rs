//! Trellis Core
//!
//! This crate provides an in-memory dependency graph for build systems,
//! package resolvers and schedulers that need to answer "what has to happen
//! before X" and "is there a valid order at all". It implements:
//!
//! - A node registry keyed by caller-chosen values, with idempotent edges
//! - Reachability, transitive closure and hop-distance queries
//! - Proactive cycle detection
//! - Topological sorting, optionally scoped to a region of nodes
//! - A single-hop walker for building custom traversals
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: nodes, edges, the registry and the algorithms over it
//! - `config`: construction-time switches
//! - `error`: the crate error type
//! - `shared`: a lock-protected handle for multi-threaded use
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{Closure, Graph};
//!
//! let mut graph: Graph<&str> = Graph::new();
//! let app = graph.new_node("app").unwrap();
//! let net = graph.new_node("net").unwrap();
//! let io = graph.new_node("io").unwrap();
//!
//! graph.depend_on(app, net).unwrap();
//! graph.depend_on(net, io).unwrap();
//!
//! assert!(graph.depends_on(app, io));
//! assert_eq!(graph.distance_to(app, io), Some(2));
//! assert_eq!(graph.dependencies(app, Closure::transitive()).unwrap(), vec![net, io]);
//!
//! // Dependencies come first.
//! assert_eq!(graph.topological_sort(None).unwrap(), vec![io, net, app]);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod shared;

pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use graph::{
    Closure, Edge, EdgeId, Graph, GraphEvent, GraphListener, Node, NodeId, SortStep,
    TopologicalSort, TracingListener, Walker,
};
pub use shared::SharedGraph;
