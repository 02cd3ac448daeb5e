/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Double-buffered message queues.
//!
//! A [`MessageRouter`] keeps two queues per vertex: the _current_ one, read
//! during the present superstep, and the _next_ one, filled by
//! [`send`](MessageRouter::send) during the present superstep. The barrier
//! ([`barrier_swap`](MessageRouter::barrier_swap)) makes the next queues
//! current, so a message is visible exactly in the superstep following the
//! one in which it was sent, and it is consumed there.
//!
//! Queues are addressed by the dense vertex indices of a
//! [`GraphStore`]; [`send_to`](MessageRouter::send_to) resolves an
//! identifier first, dropping (and logging) messages to unknown vertices.

use crate::graph::GraphStore;
use crate::{Error, Result};
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct MessageRouter<M> {
    current: Vec<Vec<M>>,
    next: Vec<Vec<M>>,
    in_flight: usize,
    pending: usize,
    dropped: usize,
}

impl<M> MessageRouter<M> {
    /// Creates a router for a graph with `num_vertices` vertices.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            current: (0..num_vertices).map(|_| Vec::new()).collect(),
            next: (0..num_vertices).map(|_| Vec::new()).collect(),
            in_flight: 0,
            pending: 0,
            dropped: 0,
        }
    }

    /// Appends a message to the next queue of the vertex with index
    /// `destination`.
    ///
    /// # Panics
    ///
    /// Panics if `destination` is not a vertex index.
    pub fn send(&mut self, destination: usize, payload: M) {
        self.next[destination].push(payload);
        self.pending += 1;
    }

    /// Resolves `destination` in `graph` and sends it a message.
    ///
    /// Messages to vertices not in the graph are dropped and logged; returns
    /// whether the message was queued.
    pub fn send_to<I: Clone + Eq + Hash + Debug, V, E>(
        &mut self,
        graph: &GraphStore<I, V, E>,
        destination: &I,
        payload: M,
    ) -> bool {
        match graph.index_of(destination) {
            Some(index) => {
                self.send(index, payload);
                true
            }
            None => {
                log::warn!("Dropping message to unknown vertex {destination:?}");
                self.record_dropped(1);
                false
            }
        }
    }

    pub(crate) fn record_dropped(&mut self, count: usize) {
        self.dropped += count;
    }

    /// Returns the messages delivered to the vertex with index `index` in the
    /// current superstep.
    pub fn messages_for(&self, index: usize) -> &[M] {
        &self.current[index]
    }

    /// Returns the messages delivered to the vertex `id` of `graph` in the
    /// current superstep.
    pub fn messages_to<I: Clone + Eq + Hash + Debug, V, E>(
        &self,
        graph: &GraphStore<I, V, E>,
        id: &I,
    ) -> Result<&[M]> {
        graph
            .index_of(id)
            .map(|index| self.messages_for(index))
            .ok_or_else(|| Error::UnknownVertex(format!("{id:?}")))
    }

    /// Returns whether the vertex with index `index` has messages in the
    /// current superstep.
    pub fn has_messages(&self, index: usize) -> bool {
        !self.current[index].is_empty()
    }

    /// Returns the number of messages readable in the current superstep.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns the number of messages sent during the current superstep.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Returns the number of messages dropped because their destination was
    /// unknown.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Makes the next queues current, discarding the current ones.
    ///
    /// Returns the number of messages now in flight.
    pub fn barrier_swap(&mut self) -> usize {
        std::mem::swap(&mut self.current, &mut self.next);
        for queue in self.next.iter_mut() {
            queue.clear();
        }
        self.in_flight = self.pending;
        self.pending = 0;
        self.in_flight
    }
}
