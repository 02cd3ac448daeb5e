/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The vertex-program contract.
//!
//! A [`VertexProgram`] is a pure function of a vertex (its identifier, value
//! and outgoing edges), of the messages delivered to it and of a read-only
//! [`Context`] giving the superstep number and the aggregator values visible
//! in that superstep. It returns an [`Outcome`]: the new value, the messages
//! to send, the aggregator contributions and the decision to halt.
//!
//! Since an invocation sees no state other than its arguments, invocations
//! within a superstep are independent and the
//! [scheduler](crate::scheduler::SuperstepScheduler) runs them in parallel.
//!
//! Programs are chosen statically, as a type parameter of the scheduler. Any
//! struct can implement the trait; closures can be used via [`from_fn`].

use crate::aggregators::{AggregatorRegistry, Contribution};
use crate::graph::Edge;
use crate::Result;

/// A read-only view of a vertex during an invocation.
#[derive(Debug)]
pub struct Vertex<'a, I, V, E = ()> {
    pub(crate) id: &'a I,
    pub(crate) value: &'a V,
    pub(crate) edges: &'a [Edge<I, E>],
}

impl<I, V, E> Clone for Vertex<'_, I, V, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, V, E> Copy for Vertex<'_, I, V, E> {}

impl<'a, I, V, E> Vertex<'a, I, V, E> {
    pub fn id(&self) -> &'a I {
        self.id
    }

    /// Returns the value of the vertex at the start of the superstep.
    pub fn value(&self) -> &'a V {
        self.value
    }

    pub fn edges(&self) -> &'a [Edge<I, E>] {
        self.edges
    }

    pub fn out_degree(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether the vertex has no outgoing edges.
    pub fn is_dangling(&self) -> bool {
        self.edges.is_empty()
    }
}

/// What a vertex program can see besides its vertex and its messages.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub(crate) step: usize,
    pub(crate) num_vertices: usize,
    pub(crate) aggregators: &'a AggregatorRegistry,
}

impl Context<'_> {
    /// Returns the current superstep.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Returns the number of vertices of the graph.
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Returns the value of an aggregator visible in the current superstep.
    pub fn aggregated<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        self.aggregators.value_at(name, self.step)
    }
}

/// The result of an invocation.
///
/// A fresh outcome leaves the value unchanged, sends nothing, contributes
/// nothing and keeps the vertex active.
#[derive(Debug)]
pub struct Outcome<I, V, M> {
    value: Option<V>,
    messages: Vec<(I, M)>,
    contributions: Vec<Contribution>,
    halt: bool,
}

impl<I, V, M> Default for Outcome<I, V, M> {
    fn default() -> Self {
        Self {
            value: None,
            messages: Vec::new(),
            contributions: Vec::new(),
            halt: false,
        }
    }
}

impl<I, V, M> Outcome<I, V, M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value the vertex will have from the next superstep on.
    pub fn set_value(&mut self, value: V) -> &mut Self {
        self.value = Some(value);
        self
    }

    /// Sends a message, delivered at the next superstep.
    pub fn send(&mut self, destination: I, payload: M) -> &mut Self {
        self.messages.push((destination, payload));
        self
    }

    /// Sends a copy of `payload` along every outgoing edge of `vertex`.
    pub fn send_to_all_edges<E>(&mut self, vertex: &Vertex<'_, I, V, E>, payload: M) -> &mut Self
    where
        I: Clone,
        M: Clone,
    {
        self.messages.extend(
            vertex
                .edges()
                .iter()
                .map(|edge| (edge.target().clone(), payload.clone())),
        );
        self
    }

    /// Contributes `value` to the aggregator `name`.
    pub fn aggregate<T: Send + 'static>(&mut self, name: &'static str, value: T) -> &mut Self {
        self.contributions.push(Contribution::new(name, value));
        self
    }

    /// Votes to halt: the vertex will not be invoked again unless it receives
    /// a message.
    pub fn vote_to_halt(&mut self) -> &mut Self {
        self.halt = true;
        self
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn messages(&self) -> &[(I, M)] {
        &self.messages
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn halts(&self) -> bool {
        self.halt
    }

    pub(crate) fn into_parts(self) -> (Option<V>, Vec<(I, M)>, Vec<Contribution>, bool) {
        (self.value, self.messages, self.contributions, self.halt)
    }
}

/// A vertex program.
///
/// `I` is the type of vertex identifiers, `V` of vertex values, `E` of edge
/// values and `M` of messages.
pub trait VertexProgram<I, V, E, M>: Sync {
    /// Registers the aggregators used by the program.
    ///
    /// It is called once, when the scheduler is created.
    fn register_aggregators(&self, _registry: &mut AggregatorRegistry) -> Result<()> {
        Ok(())
    }

    /// Computes the outcome of `vertex` at the superstep `ctx.step()`.
    ///
    /// An error aborts the whole computation; the superstep is not
    /// committed.
    fn compute(
        &self,
        vertex: Vertex<'_, I, V, E>,
        messages: &[M],
        ctx: &Context<'_>,
    ) -> anyhow::Result<Outcome<I, V, M>>;
}

impl<I, V, E, M, P: VertexProgram<I, V, E, M>> VertexProgram<I, V, E, M> for &P {
    fn register_aggregators(&self, registry: &mut AggregatorRegistry) -> Result<()> {
        (**self).register_aggregators(registry)
    }

    fn compute(
        &self,
        vertex: Vertex<'_, I, V, E>,
        messages: &[M],
        ctx: &Context<'_>,
    ) -> anyhow::Result<Outcome<I, V, M>> {
        (**self).compute(vertex, messages, ctx)
    }
}

/// A vertex program defined by a closure; see [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnProgram<F>(F);

/// Wraps a closure into a [`VertexProgram`] without aggregators.
///
/// # Examples
///
/// ```
/// use pregel::program::{from_fn, Outcome};
///
/// // Every vertex halts immediately.
/// let program = from_fn(|_vertex: pregel::program::Vertex<'_, u32, u32>, _messages: &[u32], _ctx| {
///     let mut outcome = Outcome::new();
///     outcome.vote_to_halt();
///     Ok(outcome)
/// });
/// # let _ = program;
/// ```
pub fn from_fn<I, V, E, M, F>(f: F) -> FnProgram<F>
where
    F: Fn(Vertex<'_, I, V, E>, &[M], &Context<'_>) -> anyhow::Result<Outcome<I, V, M>> + Sync,
{
    FnProgram(f)
}

impl<I, V, E, M, F> VertexProgram<I, V, E, M> for FnProgram<F>
where
    F: Fn(Vertex<'_, I, V, E>, &[M], &Context<'_>) -> anyhow::Result<Outcome<I, V, M>> + Sync,
{
    fn compute(
        &self,
        vertex: Vertex<'_, I, V, E>,
        messages: &[M],
        ctx: &Context<'_>,
    ) -> anyhow::Result<Outcome<I, V, M>> {
        (self.0)(vertex, messages, ctx)
    }
}
