//! Lifecycle events and listeners.
//!
//! A graph notifies its listeners whenever a mutation creates something or
//! is turned away. Listeners see ids only; they run while the graph is being
//! mutated and cannot call back into it.

use std::sync::Arc;

use super::edge::EdgeId;
use super::node::NodeId;

/// Something that happened to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEvent {
    /// A key was registered for the first time.
    NodeCreated { node: NodeId },

    /// A new dependency edge was inserted.
    EdgeCreated {
        edge: EdgeId,
        source: NodeId,
        destination: NodeId,
    },

    /// A node was asked to depend on itself. No edge exists afterwards.
    SelfLoopRejected { node: NodeId },

    /// The requested dependency already existed and was returned as is.
    DuplicateEdge {
        edge: EdgeId,
        source: NodeId,
        destination: NodeId,
    },
}

/// Receiver of [`GraphEvent`]s.
///
/// Implemented for any `Fn(&GraphEvent) + Send + Sync` closure.
pub trait GraphListener: Send + Sync {
    fn on_event(&self, event: &GraphEvent);
}

impl<F> GraphListener for F
where
    F: Fn(&GraphEvent) + Send + Sync,
{
    fn on_event(&self, event: &GraphEvent) {
        self(event)
    }
}

/// Forwards every event to `tracing`.
///
/// Creations are logged at `trace`, rejections at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl GraphListener for TracingListener {
    fn on_event(&self, event: &GraphEvent) {
        match *event {
            GraphEvent::NodeCreated { node } => {
                tracing::trace!(%node, "node created");
            }
            GraphEvent::EdgeCreated {
                edge,
                source,
                destination,
            } => {
                tracing::trace!(%edge, %source, %destination, "edge created");
            }
            GraphEvent::SelfLoopRejected { node } => {
                tracing::debug!(%node, "self-dependency rejected");
            }
            GraphEvent::DuplicateEdge {
                edge,
                source,
                destination,
            } => {
                tracing::debug!(%edge, %source, %destination, "dependency already present");
            }
        }
    }
}

/// Ordered set of listeners owned by a graph.
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    inner: Vec<Arc<dyn GraphListener>>,
}

impl Listeners {
    pub(crate) fn push(&mut self, listener: Arc<dyn GraphListener>) {
        self.inner.push(listener);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    pub(crate) fn emit(&self, event: GraphEvent) {
        for listener in &self.inner {
            listener.on_event(&event);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.inner.len())
            .finish()
    }
}
