//! Topological Sorting
//!
//! Orders nodes so that every dependency comes before the nodes that depend
//! on it.
//!
//! # Algorithm
//!
//! Depth-first, one pass per call:
//!
//! 1. Every requested node starts `Unmarked`; nodes outside the request are
//!    not part of the pass and are never visited.
//! 2. Pick the next `Unmarked` node in request order and mark it `InProgress`.
//! 3. For each incident edge the criteria accept, descend into the far
//!    endpoint if it is part of the pass.
//! 4. When all accepted edges are exhausted, mark the node `Done` and append
//!    it to the output.
//! 5. Reaching a node that is still `InProgress` means it lies on the active
//!    path: the graph is not a DAG and the sort fails.
//!
//! Marks live in a table owned by the call, so the graph is only borrowed
//! immutably and any number of sorts can run over it at the same time.
//!
//! The result is *a* valid order. Which one depends on the request order.

use std::hash::Hash;
use std::marker::PhantomData;

use tracing::debug;

use super::edge::Edge;
use super::node::NodeId;
use super::registry::Graph;
use crate::error::{GraphError, Result};

/// Per-pass state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Unmarked,
    InProgress,
    Done,
}

/// What the edge criteria get to look at.
pub struct SortStep<'a, K, R> {
    graph: &'a Graph<K, R>,
    node: NodeId,
    edge: &'a Edge,
    region_scoped: bool,
}

impl<'a, K, R> SortStep<'a, K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    pub fn graph(&self) -> &'a Graph<K, R> {
        self.graph
    }

    /// The node being expanded.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn edge(&self) -> &'a Edge {
        self.edge
    }

    /// The endpoint the sort would descend into.
    pub fn far_end(&self) -> NodeId {
        self.edge.other(self.node)
    }

    /// True when the pass was restricted to one region.
    pub fn is_region_scoped(&self) -> bool {
        self.region_scoped
    }

    /// True if the current node is the dependent end of the edge.
    pub fn is_dependency_edge(&self) -> bool {
        self.edge.is_outgoing_from(self.node)
    }

    /// True if both endpoints report the same region (or both have none).
    pub fn same_region(&self) -> bool {
        let region_of = |id: NodeId| self.graph.find_by_id(id).and_then(|n| n.region());
        region_of(self.node) == region_of(self.far_end())
    }
}

/// Criteria used by [`TopologicalSort::new`].
pub type DefaultCriteria<K, R> = fn(&SortStep<'_, K, R>) -> bool;

/// Follow dependency edges only, and stay inside the region when the pass
/// is region-scoped.
pub fn follow_dependencies<K, R>(step: &SortStep<'_, K, R>) -> bool
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    if !step.is_dependency_edge() {
        return false;
    }
    !step.is_region_scoped() || step.same_region()
}

/// A topological sorter parameterised by which edges it follows.
pub struct TopologicalSort<K, R, F = DefaultCriteria<K, R>> {
    criteria: F,
    _graph: PhantomData<fn(&K, &R)>,
}

impl<K, R> TopologicalSort<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    /// A sorter that follows dependency edges (see [`follow_dependencies`]).
    pub fn new() -> Self {
        Self::with_criteria(follow_dependencies::<K, R> as DefaultCriteria<K, R>)
    }
}

impl<K, R> Default for TopologicalSort<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, R, F> TopologicalSort<K, R, F>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
    F: Fn(&SortStep<'_, K, R>) -> bool,
{
    /// A sorter that follows exactly the edges `criteria` accepts.
    pub fn with_criteria(criteria: F) -> Self {
        Self {
            criteria,
            _graph: PhantomData,
        }
    }

    /// Sort `nodes`. Edges leading outside `nodes` are ignored.
    pub fn sort(&self, graph: &Graph<K, R>, nodes: &[NodeId]) -> Result<Vec<NodeId>> {
        self.run(graph, nodes, false)
    }

    /// Sort the members of `region`. An unknown region sorts to nothing.
    pub fn sort_region(&self, graph: &Graph<K, R>, region: &R) -> Result<Vec<NodeId>> {
        self.run(graph, graph.region(region), true)
    }

    fn run(&self, graph: &Graph<K, R>, nodes: &[NodeId], region_scoped: bool) -> Result<Vec<NodeId>> {
        let mut marks: Vec<Option<Mark>> = vec![None; graph.node_count()];
        for &id in nodes {
            graph.node(id)?;
            marks[id.index()] = Some(Mark::Unmarked);
        }

        let mut sorted = Vec::with_capacity(nodes.len());
        for &root in nodes {
            if marks[root.index()] == Some(Mark::Unmarked) {
                self.visit(graph, root, region_scoped, &mut marks, &mut sorted)?;
            }
        }

        debug!(nodes = sorted.len(), region_scoped, "topological sort complete");
        Ok(sorted)
    }

    fn visit(
        &self,
        graph: &Graph<K, R>,
        root: NodeId,
        region_scoped: bool,
        marks: &mut [Option<Mark>],
        sorted: &mut Vec<NodeId>,
    ) -> Result<()> {
        marks[root.index()] = Some(Mark::InProgress);
        let mut stack = vec![(root, self.successors(graph, root, region_scoped).into_iter())];

        while let Some((_, pending)) = stack.last_mut() {
            let Some(next) = pending.next() else {
                if let Some((done, _)) = stack.pop() {
                    marks[done.index()] = Some(Mark::Done);
                    sorted.push(done);
                }
                continue;
            };

            match marks[next.index()] {
                None | Some(Mark::Done) => {}
                Some(Mark::InProgress) => {
                    debug!(node = %next, "cycle found during topological sort");
                    return Err(GraphError::NotADag { node: next });
                }
                Some(Mark::Unmarked) => {
                    marks[next.index()] = Some(Mark::InProgress);
                    stack.push((next, self.successors(graph, next, region_scoped).into_iter()));
                }
            }
        }

        Ok(())
    }

    fn successors(&self, graph: &Graph<K, R>, node: NodeId, region_scoped: bool) -> Vec<NodeId> {
        graph
            .incident(node)
            .filter(|&edge| {
                (self.criteria)(&SortStep {
                    graph,
                    node,
                    edge,
                    region_scoped,
                })
            })
            .map(|edge| edge.other(node))
            .collect()
    }
}

impl<K, R> Graph<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    /// Sort the whole graph, or only the members of `region`.
    pub fn topological_sort(&self, region: Option<&R>) -> Result<Vec<NodeId>> {
        let sorter = TopologicalSort::new();
        match region {
            Some(region) => sorter.sort_region(self, region),
            None => {
                let all: Vec<NodeId> = self.node_ids().collect();
                sorter.sort(self, &all)
            }
        }
    }

    /// Sort the given nodes with the default criteria.
    pub fn sort_nodes(&self, nodes: &[NodeId]) -> Result<Vec<NodeId>> {
        TopologicalSort::new().sort(self, nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(n: u32, edges: &[(u32, u32)]) -> (Graph<u32, u32>, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (1..=n).map(|k| graph.new_node(k).unwrap()).collect();
        for &(a, b) in edges {
            graph.depend_on(ids[a as usize - 1], ids[b as usize - 1]).unwrap();
        }
        (graph, ids)
    }

    /// No dependency may appear after its dependent.
    fn assert_dependencies_first(graph: &Graph<u32, u32>, sorted: &[NodeId]) {
        let position = |id: NodeId| sorted.iter().position(|n| *n == id);
        for (i, &node) in sorted.iter().enumerate() {
            for edge in graph.outgoing(node) {
                if let Some(j) = position(edge.destination()) {
                    assert!(j <= i, "{} at {} depends on {} at {}", node, i, edge.destination(), j);
                }
            }
        }
    }

    #[test]
    fn chain_is_reversed() {
        let (graph, n) = graph_with(3, &[(1, 2), (2, 3)]);
        let sorted = graph.topological_sort(None).unwrap();
        assert_eq!(sorted, vec![n[2], n[1], n[0]]);
    }

    #[test]
    fn diamond_sorts() {
        let (graph, _) = graph_with(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let sorted = graph.topological_sort(None).unwrap();
        assert_eq!(sorted.len(), 4);
        assert_dependencies_first(&graph, &sorted);
    }

    #[test]
    fn subset_in_arbitrary_order() {
        let mut graph: Graph<u32, u32> = Graph::new();
        let n: Vec<NodeId> = (0..10).map(|k| graph.new_node(k).unwrap()).collect();
        for (a, b) in [(9, 8), (7, 6), (6, 5), (5, 4), (4, 1), (3, 0), (5, 3), (5, 2), (8, 6)] {
            graph.depend_on(n[a], n[b]).unwrap();
        }

        let request = [n[1], n[3], n[5], n[2], n[8], n[7], n[0], n[4], n[9], n[6]];
        let sorted = graph.sort_nodes(&request).unwrap();
        assert_eq!(sorted.len(), 10);
        assert_dependencies_first(&graph, &sorted);
    }

    #[test]
    fn edges_leaving_the_request_are_ignored() {
        let (graph, n) = graph_with(3, &[(1, 2), (2, 3)]);
        let sorted = graph.sort_nodes(&[n[0], n[2]]).unwrap();
        assert_eq!(sorted, vec![n[0], n[2]]);
    }

    #[test]
    fn cycle_is_not_a_dag() {
        let (graph, _) = graph_with(3, &[(1, 2), (2, 3), (3, 1)]);
        let err = graph.topological_sort(None).unwrap_err();
        assert!(matches!(err, GraphError::NotADag { .. }));
    }

    #[test]
    fn region_sort_ignores_other_regions() {
        let (mut graph, n) = graph_with(
            8,
            &[(1, 2), (2, 4), (2, 3), (4, 3), (5, 1), (6, 5), (7, 6), (8, 7)],
        );
        for (i, id) in n.iter().enumerate() {
            graph.put_into_region(*id, if i < 4 { 1 } else { 2 }).unwrap();
        }

        let sorted = graph.topological_sort(Some(&1)).unwrap();
        let mut members = sorted.clone();
        members.sort();
        assert_eq!(members, n[..4].to_vec());
        assert_dependencies_first(&graph, &sorted);

        let second = graph.topological_sort(Some(&2)).unwrap();
        assert_eq!(second, vec![n[4], n[5], n[6], n[7]]);

        assert!(graph.topological_sort(Some(&3)).unwrap().is_empty());
    }

    #[test]
    fn region_sort_skips_cross_region_cycles() {
        let (mut graph, n) = graph_with(2, &[(1, 2), (2, 1)]);
        graph.put_into_region(n[0], 1).unwrap();
        graph.put_into_region(n[1], 2).unwrap();

        assert_eq!(graph.topological_sort(Some(&1)).unwrap(), vec![n[0]]);
        assert!(graph.topological_sort(None).is_err());
    }

    #[test]
    fn custom_criteria_can_follow_dependents() {
        let (graph, n) = graph_with(3, &[(1, 2), (2, 3)]);
        let sorter = TopologicalSort::with_criteria(|step: &SortStep<'_, u32, u32>| {
            step.edge().is_incoming_to(step.node())
        });

        let sorted = sorter.sort(&graph, &[n[0], n[1], n[2]]).unwrap();
        assert_eq!(sorted, vec![n[0], n[1], n[2]]);
    }

    #[test]
    fn unknown_node_is_rejected() {
        let (graph, _) = graph_with(1, &[]);
        let ghost = NodeId::from(3);
        assert_eq!(
            graph.sort_nodes(&[ghost]).unwrap_err(),
            GraphError::UnknownNode(ghost)
        );
    }

    #[test]
    fn repeated_requests_sort_once() {
        let (graph, n) = graph_with(2, &[(1, 2)]);
        let sorted = graph.sort_nodes(&[n[0], n[0], n[1]]).unwrap();
        assert_eq!(sorted, vec![n[1], n[0]]);
    }
}
