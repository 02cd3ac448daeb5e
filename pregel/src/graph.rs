/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The vertex store.
//!
//! A [`GraphStore`] owns the vertex set, the outgoing edges of each vertex,
//! the vertex values and the halted flags. Vertices are addressed by an
//! opaque identifier of type `I`; internally each identifier is assigned a
//! dense index, in order of first appearance, and all per-vertex state lives
//! in index-addressed vectors. The index order is the iteration order of
//! [`all_vertices`](GraphStore::all_vertices), and it never changes once the
//! graph is built.
//!
//! Graphs are built once, before the computation starts, using a
//! [`GraphBuilder`] or one of the `from_edges` constructors.
//!
//! # Examples
//!
//! ```
//! use pregel::graph::GraphStore;
//!
//! let graph = GraphStore::from_edges([("a", "b", ()), ("b", "c", ())], |_| 0.0);
//! assert_eq!(graph.num_vertices(), 3);
//! assert_eq!(graph.out_degree(&"a")?, 1);
//! assert_eq!(graph.out_degree(&"c")?, 0);
//! # Ok::<(), pregel::Error>(())
//! ```

use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// An outgoing edge: a target identifier and an (optional) edge value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<I, E = ()> {
    target: I,
    value: E,
}

impl<I, E> Edge<I, E> {
    pub fn new(target: I, value: E) -> Self {
        Self { target, value }
    }

    /// Returns the identifier of the target vertex.
    pub fn target(&self) -> &I {
        &self.target
    }

    /// Returns the value attached to the edge.
    pub fn value(&self) -> &E {
        &self.value
    }
}

/// Collects vertices and edges before a [`GraphStore`] is built.
///
/// Both endpoints of an edge become vertices of the graph. Duplicate edges
/// are kept, and the edges of a vertex are stored in insertion order.
#[derive(Debug, Clone)]
pub struct GraphBuilder<I, E = ()> {
    ids: Vec<I>,
    index: HashMap<I, usize>,
    edges: Vec<Vec<Edge<I, E>>>,
    num_edges: usize,
}

impl<I: Clone + Eq + Hash + Debug, E> Default for GraphBuilder<I, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Clone + Eq + Hash + Debug, E> GraphBuilder<I, E> {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            num_edges: 0,
        }
    }

    /// Adds a vertex, if not already present, and returns its index.
    pub fn add_vertex(&mut self, id: I) -> usize {
        if let Some(&index) = self.index.get(&id) {
            return index;
        }
        let index = self.ids.len();
        self.index.insert(id.clone(), index);
        self.ids.push(id);
        self.edges.push(Vec::new());
        index
    }

    /// Adds an edge, adding its endpoints as vertices if necessary.
    pub fn add_edge(&mut self, source: I, target: I, value: E) -> &mut Self {
        let source = self.add_vertex(source);
        self.add_vertex(target.clone());
        self.edges[source].push(Edge::new(target, value));
        self.num_edges += 1;
        self
    }

    /// Returns the number of vertices added so far.
    pub fn num_vertices(&self) -> usize {
        self.ids.len()
    }

    /// Returns the number of edges added so far.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Builds the graph, computing the initial value of each vertex with
    /// `init`.
    ///
    /// All vertices start active.
    pub fn build<V>(self, mut init: impl FnMut(&I) -> V) -> GraphStore<I, V, E> {
        let values = self.ids.iter().map(&mut init).collect();
        let halted = vec![false; self.ids.len()];
        GraphStore {
            ids: self.ids,
            index: self.index,
            edges: self.edges,
            values,
            halted,
            num_halted: 0,
            num_edges: self.num_edges,
        }
    }
}

/// The vertex set of a computation, with edges, values and halted flags.
#[derive(Debug, Clone)]
pub struct GraphStore<I, V, E = ()> {
    ids: Vec<I>,
    index: HashMap<I, usize>,
    edges: Vec<Vec<Edge<I, E>>>,
    values: Vec<V>,
    halted: Vec<bool>,
    num_halted: usize,
    num_edges: usize,
}

impl<I: Clone + Eq + Hash + Debug, V, E> GraphStore<I, V, E> {
    /// Creates a graph from a sequence of `(source, target, edge value)`
    /// triples.
    pub fn from_edges(
        edges: impl IntoIterator<Item = (I, I, E)>,
        init: impl FnMut(&I) -> V,
    ) -> Self {
        let mut builder = GraphBuilder::new();
        for (source, target, value) in edges {
            builder.add_edge(source, target, value);
        }
        builder.build(init)
    }

    /// Creates a graph from a sequence of fallible records.
    ///
    /// The first error aborts the construction and is returned: no partially
    /// built graph is ever returned.
    pub fn try_from_edges(
        records: impl IntoIterator<Item = Result<(I, I, E)>>,
        init: impl FnMut(&I) -> V,
    ) -> Result<Self> {
        let mut builder = GraphBuilder::new();
        for record in records {
            let (source, target, value) = record?;
            builder.add_edge(source, target, value);
        }
        Ok(builder.build(init))
    }

    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.ids.len()
    }

    /// Returns the number of edges.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Returns the number of halted vertices.
    pub fn num_halted(&self) -> usize {
        self.num_halted
    }

    /// Returns whether the graph contains the given vertex.
    pub fn contains(&self, id: &I) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the dense index of a vertex, if present.
    pub fn index_of(&self, id: &I) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Returns the identifier of the vertex with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than the number of vertices.
    pub fn id(&self, index: usize) -> &I {
        &self.ids[index]
    }

    /// Returns an iterator on the identifiers of all vertices, in index
    /// order.
    pub fn all_vertices(&self) -> impl ExactSizeIterator<Item = &I> + '_ {
        self.ids.iter()
    }

    fn resolve(&self, id: &I) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| Error::UnknownVertex(format!("{id:?}")))
    }

    /// Returns the outgoing edges of a vertex.
    pub fn edges_of(&self, id: &I) -> Result<&[Edge<I, E>]> {
        Ok(&self.edges[self.resolve(id)?])
    }

    /// Returns the value of a vertex.
    pub fn value_of(&self, id: &I) -> Result<&V> {
        Ok(&self.values[self.resolve(id)?])
    }

    /// Sets the value of a vertex.
    pub fn set_value(&mut self, id: &I, value: V) -> Result<()> {
        let index = self.resolve(id)?;
        self.values[index] = value;
        Ok(())
    }

    /// Returns whether a vertex is halted.
    pub fn is_halted(&self, id: &I) -> Result<bool> {
        Ok(self.halted[self.resolve(id)?])
    }

    /// Sets the halted flag of a vertex.
    pub fn set_halted(&mut self, id: &I, halted: bool) -> Result<()> {
        let index = self.resolve(id)?;
        self.set_halted_at(index, halted);
        Ok(())
    }

    /// Returns the number of outgoing edges of a vertex.
    pub fn out_degree(&self, id: &I) -> Result<usize> {
        Ok(self.edges[self.resolve(id)?].len())
    }

    /// Returns an iterator on `(identifier, value)` pairs, in index order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = (&I, &V)> + '_ {
        self.ids.iter().zip(self.values.iter())
    }

    /// Consumes the graph, returning its `(identifier, value)` pairs in index
    /// order.
    pub fn into_values(self) -> impl ExactSizeIterator<Item = (I, V)> {
        self.ids.into_iter().zip(self.values)
    }

    pub(crate) fn edges_at(&self, index: usize) -> &[Edge<I, E>] {
        &self.edges[index]
    }

    pub(crate) fn value_at(&self, index: usize) -> &V {
        &self.values[index]
    }

    pub(crate) fn set_value_at(&mut self, index: usize, value: V) {
        self.values[index] = value;
    }

    pub(crate) fn is_halted_at(&self, index: usize) -> bool {
        self.halted[index]
    }

    pub(crate) fn set_halted_at(&mut self, index: usize, halted: bool) {
        match (self.halted[index], halted) {
            (false, true) => self.num_halted += 1,
            (true, false) => self.num_halted -= 1,
            _ => {}
        }
        self.halted[index] = halted;
    }
}
