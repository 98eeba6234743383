//! Dependency Queries
//!
//! Read-only questions about the graph: reachability, transitive closure,
//! hop distance and cycles. They only follow adjacency and never mutate.
//!
//! Every traversal here runs on an explicit stack or queue guarded by a
//! visited table, so a cyclic graph cannot exhaust the call stack. The one
//! query that has no finite answer on a cycle (enumerating every path with
//! [`Closure::paths`]) reports [`GraphError::CyclicDependency`] instead.

use std::collections::VecDeque;
use std::hash::Hash;

use super::node::NodeId;
use super::registry::Graph;
use crate::error::{GraphError, Result};

/// Which nodes a closure query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closure {
    /// Report every node at most once.
    pub unique: bool,

    /// Follow neighbours of neighbours, not just direct ones.
    pub all: bool,
}

impl Closure {
    /// Direct neighbours only.
    pub fn direct() -> Self {
        Self {
            unique: true,
            all: false,
        }
    }

    /// Every reachable node, once each.
    pub fn transitive() -> Self {
        Self {
            unique: true,
            all: true,
        }
    }

    /// One entry per path: a node reached along several paths is listed
    /// once for each. Fails on cyclic input.
    pub fn paths() -> Self {
        Self {
            unique: false,
            all: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// From dependent to dependency.
    Dependencies,
    /// From dependency to dependent.
    Dependents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Finished,
}

impl<K, R> Graph<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    fn neighbours(&self, node: NodeId, direction: Direction) -> Vec<NodeId> {
        match direction {
            Direction::Dependencies => self.outgoing(node).map(|e| e.destination()).collect(),
            Direction::Dependents => self.incoming(node).map(|e| e.source()).collect(),
        }
    }

    /// True if `dependency` can be reached from `dependent` by following
    /// one or more dependency edges.
    ///
    /// Unknown nodes depend on nothing.
    pub fn depends_on(&self, dependent: NodeId, dependency: NodeId) -> bool {
        if self.find_by_id(dependent).is_none() || self.find_by_id(dependency).is_none() {
            return false;
        }

        let mut seen = vec![false; self.node_count()];
        let mut stack = self.neighbours(dependent, Direction::Dependencies);

        while let Some(current) = stack.pop() {
            if current == dependency {
                return true;
            }
            if std::mem::replace(&mut seen[current.index()], true) {
                continue;
            }
            stack.extend(self.neighbours(current, Direction::Dependencies));
        }

        false
    }

    /// Nodes `node` depends on.
    ///
    /// A unique closure keeps each node at its first preorder position, so
    /// a diamond `1 -> {2, 3} -> 4` yields `[2, 4, 3]`.
    pub fn dependencies(&self, node: NodeId, closure: Closure) -> Result<Vec<NodeId>> {
        self.closure(node, closure, Direction::Dependencies)
    }

    /// Nodes that depend on `node`.
    pub fn dependents(&self, node: NodeId, closure: Closure) -> Result<Vec<NodeId>> {
        self.closure(node, closure, Direction::Dependents)
    }

    /// Number of dependency paths starting at `node`, i.e. the length of
    /// `dependencies(node, Closure::paths())`.
    pub fn dependency_length(&self, node: NodeId) -> Result<usize> {
        Ok(self.dependencies(node, Closure::paths())?.len())
    }

    /// True if anything depends on `node`.
    pub fn is_dependency(&self, node: NodeId) -> bool {
        self.incoming(node).next().is_some()
    }

    fn closure(&self, start: NodeId, closure: Closure, direction: Direction) -> Result<Vec<NodeId>> {
        self.node(start)?;

        if !closure.all {
            let mut direct = self.neighbours(start, direction);
            if closure.unique {
                let mut seen = vec![false; self.node_count()];
                direct.retain(|n| !std::mem::replace(&mut seen[n.index()], true));
            }
            return Ok(direct);
        }

        // Preorder: each neighbour is reported, then its own closure.
        let mut out = Vec::new();
        let mut seen = vec![false; self.node_count()];
        let mut on_path = vec![false; self.node_count()];
        on_path[start.index()] = true;
        let mut stack = vec![(start, self.neighbours(start, direction).into_iter())];

        while let Some((_, pending)) = stack.last_mut() {
            let Some(next) = pending.next() else {
                if let Some((done, _)) = stack.pop() {
                    on_path[done.index()] = false;
                }
                continue;
            };

            if closure.unique {
                if std::mem::replace(&mut seen[next.index()], true) {
                    continue;
                }
            } else if on_path[next.index()] {
                return Err(GraphError::CyclicDependency { node: next });
            }

            out.push(next);
            on_path[next.index()] = true;
            stack.push((next, self.neighbours(next, direction).into_iter()));
        }

        Ok(out)
    }

    /// Shortest number of dependency edges from `from` to `to`.
    ///
    /// `None` if `to` is unreachable. A node only has a distance to itself
    /// when it lies on a cycle.
    pub fn distance_to(&self, from: NodeId, to: NodeId) -> Option<usize> {
        self.find_by_id(from)?;
        self.find_by_id(to)?;

        let mut seen = vec![false; self.node_count()];
        let mut queue: VecDeque<(NodeId, usize)> = self
            .neighbours(from, Direction::Dependencies)
            .into_iter()
            .map(|n| (n, 1))
            .collect();

        while let Some((current, distance)) = queue.pop_front() {
            if current == to {
                return Some(distance);
            }
            if std::mem::replace(&mut seen[current.index()], true) {
                continue;
            }
            for next in self.neighbours(current, Direction::Dependencies) {
                if !seen[next.index()] {
                    queue.push_back((next, distance + 1));
                }
            }
        }

        None
    }

    /// True if some chain of dependencies leads back to where it started.
    pub fn has_cyclic_dependencies(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// One dependency cycle, if the graph has any.
    ///
    /// The returned path is closed: it starts and ends with the same node,
    /// and each node depends on the one after it.
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        let mut state = vec![Visit::New; self.node_count()];

        for root in self.node_ids() {
            if state[root.index()] != Visit::New {
                continue;
            }

            state[root.index()] = Visit::Active;
            let mut stack = vec![(root, self.neighbours(root, Direction::Dependencies).into_iter())];

            while let Some((_, pending)) = stack.last_mut() {
                let Some(next) = pending.next() else {
                    if let Some((done, _)) = stack.pop() {
                        state[done.index()] = Visit::Finished;
                    }
                    continue;
                };

                match state[next.index()] {
                    Visit::Finished => {}
                    Visit::Active => {
                        let start = stack.iter().position(|(n, _)| *n == next).unwrap_or(0);
                        let mut cycle: Vec<NodeId> = stack[start..].iter().map(|(n, _)| *n).collect();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Visit::New => {
                        state[next.index()] = Visit::Active;
                        stack.push((next, self.neighbours(next, Direction::Dependencies).into_iter()));
                    }
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a graph over keys `1..=n` with the given `(dependent, dependency)` pairs.
    fn graph_with(n: u32, edges: &[(u32, u32)]) -> (Graph<u32, u32>, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (1..=n).map(|k| graph.new_node(k).unwrap()).collect();
        for &(a, b) in edges {
            graph.depend_on(ids[a as usize - 1], ids[b as usize - 1]).unwrap();
        }
        (graph, ids)
    }

    fn keys(graph: &Graph<u32, u32>, ids: &[NodeId]) -> Vec<u32> {
        ids.iter().map(|id| *graph.find_by_id(*id).unwrap().data()).collect()
    }

    #[test]
    fn depends_on_follows_chains() {
        let (graph, n) = graph_with(6, &[(1, 2), (1, 6), (2, 3), (2, 5), (2, 4), (4, 5)]);

        assert!(graph.depends_on(n[0], n[5]));
        assert!(graph.depends_on(n[0], n[4]));
        assert!(graph.depends_on(n[3], n[4]));
        assert!(!graph.depends_on(n[5], n[0]));
        assert!(!graph.depends_on(n[4], n[3]));
        assert!(!graph.depends_on(n[0], n[0]));
    }

    #[test]
    fn depends_on_terminates_on_cycles() {
        let (graph, n) = graph_with(4, &[(1, 2), (2, 3), (3, 1)]);

        assert!(graph.depends_on(n[0], n[2]));
        assert!(graph.depends_on(n[0], n[0]));
        assert!(!graph.depends_on(n[0], n[3]));
    }

    #[test]
    fn closure_of_a_chain() {
        let (graph, n) = graph_with(4, &[(1, 2), (2, 3), (3, 4)]);

        assert_eq!(graph.dependencies(n[0], Closure::transitive()).unwrap().len(), 3);
        assert_eq!(graph.dependencies(n[1], Closure::transitive()).unwrap().len(), 2);
        assert_eq!(graph.dependencies(n[2], Closure::transitive()).unwrap().len(), 1);
        assert!(graph.dependencies(n[3], Closure::transitive()).unwrap().is_empty());
    }

    #[test]
    fn diamond_closure_counts_paths_unless_unique() {
        let (graph, n) = graph_with(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);

        let unique = graph.dependencies(n[0], Closure::transitive()).unwrap();
        assert_eq!(keys(&graph, &unique), vec![2, 4, 3]);

        let paths = graph.dependencies(n[0], Closure::paths()).unwrap();
        assert_eq!(keys(&graph, &paths), vec![2, 4, 3, 4]);

        let direct = graph.dependencies(n[0], Closure::direct()).unwrap();
        assert_eq!(keys(&graph, &direct), vec![2, 3]);
    }

    #[test]
    fn double_diamond_closure() {
        let (graph, n) = graph_with(
            7,
            &[(1, 2), (1, 3), (2, 4), (3, 4), (4, 5), (4, 6), (5, 7), (6, 7)],
        );

        assert_eq!(graph.dependencies(n[0], Closure::transitive()).unwrap().len(), 6);
        assert_eq!(graph.dependencies(n[0], Closure::paths()).unwrap().len(), 12);
        assert_eq!(graph.dependency_length(n[0]).unwrap(), 12);
        assert_eq!(graph.dependencies(n[0], Closure::direct()).unwrap().len(), 2);
    }

    #[test]
    fn dependents_walk_backwards() {
        let (graph, n) = graph_with(6, &[(1, 2), (1, 6), (2, 3), (2, 5), (2, 4), (4, 5)]);

        let direct = graph.dependents(n[4], Closure::direct()).unwrap();
        assert_eq!(keys(&graph, &direct), vec![2, 4]);

        let all = graph.dependents(n[4], Closure::transitive()).unwrap();
        let mut all = keys(&graph, &all);
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 4]);

        assert!(graph.is_dependency(n[4]));
        assert!(!graph.is_dependency(n[0]));
    }

    #[test]
    fn path_closure_reports_cycles() {
        let (graph, n) = graph_with(3, &[(1, 2), (2, 3), (3, 2)]);

        let err = graph.dependencies(n[0], Closure::paths()).unwrap_err();
        assert!(matches!(err, GraphError::CyclicDependency { .. }));

        // The unique closure still has an answer.
        let unique = graph.dependencies(n[0], Closure::transitive()).unwrap();
        assert_eq!(keys(&graph, &unique), vec![2, 3]);
    }

    #[test]
    fn closure_of_unknown_node_fails() {
        let (graph, _) = graph_with(1, &[]);
        let ghost = NodeId::from(5);
        assert_eq!(
            graph.dependencies(ghost, Closure::direct()).unwrap_err(),
            GraphError::UnknownNode(ghost)
        );
    }

    #[test]
    fn distance_is_shortest_hop_count() {
        let (graph, n) = graph_with(5, &[(1, 2), (2, 3), (3, 4), (1, 4), (4, 5)]);

        assert_eq!(graph.distance_to(n[0], n[1]), Some(1));
        assert_eq!(graph.distance_to(n[0], n[3]), Some(1));
        assert_eq!(graph.distance_to(n[0], n[4]), Some(2));
        assert_eq!(graph.distance_to(n[1], n[4]), Some(3));
        assert_eq!(graph.distance_to(n[4], n[0]), None);
        assert_eq!(graph.distance_to(n[0], n[0]), None);
    }

    #[test]
    fn distance_around_a_cycle() {
        let (graph, n) = graph_with(3, &[(1, 2), (2, 3), (3, 1)]);
        assert_eq!(graph.distance_to(n[0], n[0]), Some(3));
        assert_eq!(graph.distance_to(n[2], n[1]), Some(2));
    }

    #[test]
    fn detects_cycles() {
        let (triangle, _) = graph_with(3, &[(1, 2), (2, 3), (3, 1)]);
        assert!(triangle.has_cyclic_dependencies());

        let (tail, _) = graph_with(4, &[(1, 2), (2, 3), (3, 4), (4, 2)]);
        assert!(tail.has_cyclic_dependencies());

        let (diamond, _) = graph_with(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        assert!(!diamond.has_cyclic_dependencies());
        assert!(diamond.find_cycle().is_none());
    }

    #[test]
    fn found_cycle_is_closed_and_follows_edges() {
        let (graph, n) = graph_with(4, &[(1, 2), (2, 3), (3, 4), (4, 2)]);

        let cycle = graph.find_cycle().unwrap();
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 4);
        assert!(!cycle.contains(&n[0]));
        for pair in cycle.windows(2) {
            assert!(graph.direct_edge(pair[0], pair[1]).is_some());
        }
    }
}
