//! Shared Graph Handle
//!
//! [`Graph`] has no internal synchronisation. `SharedGraph` puts it behind a
//! reader-writer lock so that several threads can query and sort it while
//! mutations are serialised.
//!
//! # Thread Safety
//!
//! Queries and sorts only need a read guard; their scratch state is per
//! call, so any number of them can run at once. Mutations take the write
//! guard and wait for readers to finish.

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::graph::Graph;

/// A cloneable, lock-protected handle to a [`Graph`].
pub struct SharedGraph<K, R = String> {
    inner: Arc<RwLock<Graph<K, R>>>,
}

impl<K, R> SharedGraph<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    pub fn new(graph: Graph<K, R>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Lock for reading. Blocks while a writer holds the lock.
    pub fn read(&self) -> RwLockReadGuard<'_, Graph<K, R>> {
        self.inner.read()
    }

    /// Lock for writing. Blocks until all readers are gone.
    pub fn write(&self) -> RwLockWriteGuard<'_, Graph<K, R>> {
        self.inner.write()
    }

    /// Run `f` with a read guard held.
    pub fn with<T>(&self, f: impl FnOnce(&Graph<K, R>) -> T) -> T {
        f(&self.inner.read())
    }

    /// Run `f` with the write guard held.
    pub fn update<T>(&self, f: impl FnOnce(&mut Graph<K, R>) -> T) -> T {
        f(&mut self.inner.write())
    }

    /// Copy the current graph out of the lock.
    pub fn snapshot(&self) -> Graph<K, R> {
        self.inner.read().clone()
    }
}

impl<K, R> Clone for SharedGraph<K, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, R> Default for SharedGraph<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new(Graph::new())
    }
}

impl<K, R> From<Graph<K, R>> for SharedGraph<K, R>
where
    K: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    fn from(graph: Graph<K, R>) -> Self {
        Self::new(graph)
    }
}
