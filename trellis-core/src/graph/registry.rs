//! Graph Registry
//!
//! The registry owns every node and edge and is the only place that mutates
//! adjacency. Nodes live in an arena indexed by [`NodeId`]; edges live in a
//! second arena indexed by [`EdgeId`], where removal leaves a hole so that
//! ids are never reused. A removed edge therefore keeps costing one empty
//! slot for the lifetime of the graph.
//!
//! Both id spaces are `u32`: a graph holds at most `u32::MAX + 1` nodes and
//! issues at most `u32::MAX + 1` edge ids, removed ones included. Going past
//! either limit fails with [`GraphError::IdSpaceExhausted`].
//!
//! # Edge Direction
//!
//! An edge from `a` to `b` means "`a` depends on `b`". Both endpoints list
//! the edge in their adjacency, so every node sees its inbound and outbound
//! edges in one list.

use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::edge::{Edge, EdgeId};
use super::events::{GraphEvent, GraphListener, Listeners, TracingListener};
use super::node::{Node, NodeId};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};

/// An in-memory dependency graph.
///
/// `K` is the node key: registering the same key twice yields the same node.
/// `R` is the region key used to partition nodes for scoped sorts.
#[derive(Debug, Clone)]
pub struct Graph<K, R = String> {
    /// All nodes, indexed by ID.
    nodes: Vec<Node<K, R>>,

    /// Key to ID, in registration order.
    index: IndexMap<K, NodeId>,

    /// All edges ever created; `None` once removed.
    edges: Vec<Option<Edge>>,

    /// Number of live edges.
    live_edges: usize,

    /// Region members in the order they were added.
    regions: IndexMap<R, Vec<NodeId>>,

    listeners: Listeners,

    config: GraphConfig,
}

impl<K, R> Graph<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        let mut listeners = Listeners::default();
        if config.log_events {
            listeners.push(Arc::new(TracingListener));
        }

        Self {
            nodes: Vec::new(),
            index: IndexMap::new(),
            edges: Vec::new(),
            live_edges: 0,
            regions: IndexMap::new(),
            listeners,
            config,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Register a listener for lifecycle events.
    ///
    /// Listeners are called in registration order.
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: GraphListener + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Get or create the node registered under `key`.
    ///
    /// A new node gets the next sequential ID and fires
    /// [`GraphEvent::NodeCreated`]; an existing one is returned silently.
    pub fn new_node(&mut self, key: K) -> Result<NodeId> {
        if let Some(&id) = self.index.get(&key) {
            return Ok(id);
        }

        let id = NodeId::from(next_id(self.nodes.len(), "node")?);
        self.nodes.push(Node::new(id, key.clone()));
        self.index.insert(key, id);
        self.listeners.emit(GraphEvent::NodeCreated { node: id });
        Ok(id)
    }

    /// Look up a node by key.
    pub fn find(&self, key: &K) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Look up a node by ID.
    pub fn find_by_id(&self, id: NodeId) -> Option<&Node<K, R>> {
        self.nodes.get(id.index())
    }

    /// Like [`find_by_id`](Self::find_by_id) but an unknown ID is an error.
    pub fn node(&self, id: NodeId) -> Result<&Node<K, R>> {
        self.nodes.get(id.index()).ok_or(GraphError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<K, R>> {
        self.nodes.get_mut(id.index()).ok_or(GraphError::UnknownNode(id))
    }

    /// Get a live edge.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a live edge for updating its data.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in ID order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<K, R>> + '_ {
        self.nodes.iter()
    }

    /// All node IDs in ID order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(Node::id)
    }

    /// All live edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter_map(Option::as_ref)
    }

    /// Edges incident to `node`, both directions.
    ///
    /// Unknown nodes have no edges.
    pub fn incident(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.nodes
            .get(node.index())
            .map(|n| n.edges())
            .unwrap_or_default()
            .iter()
            .filter_map(move |id| self.edge(*id))
    }

    /// Edges where `node` is the dependent.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incident(node).filter(move |e| e.is_outgoing_from(node))
    }

    /// Edges where `node` is the dependency.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incident(node).filter(move |e| e.is_incoming_to(node))
    }

    /// The edge from `dependent` to `dependency`, if one exists.
    pub fn direct_edge(&self, dependent: NodeId, dependency: NodeId) -> Option<EdgeId> {
        self.outgoing(dependent)
            .find(|e| e.destination() == dependency)
            .map(Edge::id)
    }

    /// Make `dependent` depend on `dependency`.
    ///
    /// - Same node: nothing is created, [`GraphEvent::SelfLoopRejected`]
    ///   fires and `None` is returned.
    /// - Edge already present: [`GraphEvent::DuplicateEdge`] fires and the
    ///   existing edge is returned.
    /// - Otherwise the edge is created, attached to both endpoints and
    ///   [`GraphEvent::EdgeCreated`] fires.
    pub fn depend_on(&mut self, dependent: NodeId, dependency: NodeId) -> Result<Option<EdgeId>> {
        self.node(dependent)?;
        self.node(dependency)?;

        if dependent == dependency {
            self.listeners
                .emit(GraphEvent::SelfLoopRejected { node: dependent });
            return Ok(None);
        }

        if let Some(edge) = self.direct_edge(dependent, dependency) {
            self.listeners.emit(GraphEvent::DuplicateEdge {
                edge,
                source: dependent,
                destination: dependency,
            });
            return Ok(Some(edge));
        }

        self.insert_edge(dependent, dependency).map(Some)
    }

    /// Make `dependent` depend on `dependency` unless it already does,
    /// directly or transitively.
    ///
    /// When the dependency is already reachable nothing is created and the
    /// direct edge is returned if there is one. A transitive-only dependency
    /// returns `None`.
    pub fn depend_on_unless_reachable(
        &mut self,
        dependent: NodeId,
        dependency: NodeId,
    ) -> Result<Option<EdgeId>> {
        self.node(dependent)?;
        self.node(dependency)?;

        if dependent == dependency {
            return Ok(None);
        }
        if self.depends_on(dependent, dependency) {
            return Ok(self.direct_edge(dependent, dependency));
        }

        self.insert_edge(dependent, dependency).map(Some)
    }

    fn insert_edge(&mut self, source: NodeId, destination: NodeId) -> Result<EdgeId> {
        let id = EdgeId::from(next_id(self.edges.len(), "edge")?);
        let mut edge = Edge::new(id, source, destination);
        edge.cross_region = self.config.mark_cross_region_edges
            && self.crosses_regions(source, destination);

        self.edges.push(Some(edge));
        self.live_edges += 1;
        self.nodes[source.index()].attach_edge(id);
        self.nodes[destination.index()].attach_edge(id);

        self.listeners.emit(GraphEvent::EdgeCreated {
            edge: id,
            source,
            destination,
        });
        Ok(id)
    }

    /// Remove the edge from `dependent` to `dependency`, if present.
    pub fn remove_dependency(&mut self, dependent: NodeId, dependency: NodeId) -> Option<Edge> {
        let id = self.direct_edge(dependent, dependency)?;
        self.remove_edge(id)
    }

    /// Detach an edge from both endpoints and retire its ID.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.get_mut(id.index())?.take()?;
        self.nodes[edge.source().index()].detach_edge(id);
        self.nodes[edge.destination().index()].detach_edge(id);
        self.live_edges -= 1;

        trace!(edge = %id, source = %edge.source(), destination = %edge.destination(), "edge removed");
        Some(edge)
    }

    /// Put `node` into `region`.
    ///
    /// The node's region becomes `region` and the node is appended to the
    /// region's member list. Earlier memberships are kept.
    pub fn put_into_region(&mut self, node: NodeId, region: R) -> Result<NodeId> {
        self.node(node)?;

        let members = self.regions.entry(region.clone()).or_default();
        if !(self.config.dedupe_region_members && members.contains(&node)) {
            members.push(node);
        }
        self.nodes[node.index()].set_region(region);

        if self.config.mark_cross_region_edges {
            self.refresh_cross_region(node);
        }

        debug!(%node, "node put into region");
        Ok(node)
    }

    /// Members of `region`, in the order they were added.
    ///
    /// An unknown region has no members.
    pub fn region(&self, region: &R) -> &[NodeId] {
        self.regions.get(region).map(Vec::as_slice).unwrap_or_default()
    }

    /// All regions with their members.
    pub fn regions(&self) -> impl Iterator<Item = (&R, &[NodeId])> + '_ {
        self.regions.iter().map(|(r, m)| (r, m.as_slice()))
    }

    /// Whether `a` and `b` both have regions and they differ.
    pub fn crosses_regions(&self, a: NodeId, b: NodeId) -> bool {
        let region_of = |id: NodeId| self.nodes.get(id.index()).and_then(Node::region);
        match (region_of(a), region_of(b)) {
            (Some(ra), Some(rb)) => ra != rb,
            _ => false,
        }
    }

    fn refresh_cross_region(&mut self, node: NodeId) {
        let incident: Vec<EdgeId> = self.nodes[node.index()].edges().to_vec();
        for id in incident {
            let Some((source, destination)) = self.edge(id).map(|e| (e.source(), e.destination())) else {
                continue;
            };
            let crosses = self.crosses_regions(source, destination);
            if let Some(edge) = self.edge_mut(id) {
                edge.cross_region = crosses;
            }
        }
    }
}

impl<K, R> Default for Graph<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The id for the next slot of an arena currently holding `len` slots.
fn next_id(len: usize, kind: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| GraphError::IdSpaceExhausted { kind })
}
