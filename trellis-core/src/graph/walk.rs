//! Single-hop walker.
//!
//! A [`Walker`] pairs a policy (which edges count as "forward") with a
//! visitor. One call to [`Walker::walk`] looks at the incident edges of a
//! single node and hands every accepted edge to the visitor. Deeper or
//! breadth-first traversals are built by the caller, typically by collecting
//! far endpoints in the visitor and walking them next.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::collections::VecDeque;
//! use trellis_core::{Edge, Graph, Walker};
//!
//! let mut graph: Graph<&str> = Graph::new();
//! let app = graph.new_node("app").unwrap();
//! let lib = graph.new_node("lib").unwrap();
//! let core = graph.new_node("core").unwrap();
//! graph.depend_on(app, lib).unwrap();
//! graph.depend_on(lib, core).unwrap();
//!
//! let queue = RefCell::new(VecDeque::from([app]));
//! let mut walker = Walker::forward(|_, _, edge: &Edge| {
//!     queue.borrow_mut().push_back(edge.destination());
//! });
//!
//! let mut order = Vec::new();
//! loop {
//!     let Some(node) = queue.borrow_mut().pop_front() else { break };
//!     order.push(node);
//!     walker.walk(&graph, node);
//! }
//! assert_eq!(order, vec![app, lib, core]);
//! ```

use std::hash::Hash;

use super::edge::Edge;
use super::node::NodeId;
use super::registry::Graph;

/// Visits the edges of one node that a policy accepts.
pub struct Walker<P, C> {
    follow: P,
    visit: C,
}

impl<P, C> Walker<P, C> {
    /// A walker with an explicit policy and visitor.
    pub fn new(follow: P, visit: C) -> Self {
        Self { follow, visit }
    }

    /// Walk `node`: call the visitor with every incident edge the policy
    /// accepts, in adjacency order.
    pub fn walk<K, R>(&mut self, graph: &Graph<K, R>, node: NodeId)
    where
        K: Hash + Eq + Clone,
        R: Hash + Eq + Clone,
        P: FnMut(&Graph<K, R>, NodeId, &Edge) -> bool,
        C: FnMut(&Graph<K, R>, NodeId, &Edge),
    {
        for edge in graph.incident(node) {
            if (self.follow)(graph, node, edge) {
                (self.visit)(graph, node, edge);
            }
        }
    }

    /// Give back the visitor, e.g. to drop its borrows.
    pub fn into_visitor(self) -> C {
        self.visit
    }
}

/// Policy of [`Walker::forward`].
pub fn is_dependency_edge<K, R>(_: &Graph<K, R>, node: NodeId, edge: &Edge) -> bool {
    edge.is_outgoing_from(node)
}

/// Policy of [`Walker::within_region`].
pub fn is_dependency_edge_within_region<K, R>(graph: &Graph<K, R>, node: NodeId, edge: &Edge) -> bool
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    if !edge.is_outgoing_from(node) {
        return false;
    }
    let region_of = |id: NodeId| graph.find_by_id(id).and_then(|n| n.region());
    region_of(node) == region_of(edge.destination())
}

impl<K, R, C> Walker<fn(&Graph<K, R>, NodeId, &Edge) -> bool, C>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
    C: FnMut(&Graph<K, R>, NodeId, &Edge),
{
    /// Follow edges from a node to its dependencies.
    pub fn forward(visit: C) -> Self {
        Self::new(is_dependency_edge::<K, R>, visit)
    }

    /// Follow edges to dependencies that share the node's region.
    pub fn within_region(visit: C) -> Self {
        Self::new(is_dependency_edge_within_region::<K, R>, visit)
    }
}
