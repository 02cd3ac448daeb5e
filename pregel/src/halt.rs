/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Global termination.
//!
//! The halted bit of each vertex lives in the [`GraphStore`]; a vertex votes
//! to halt through the outcome of its invocation, and a halted vertex is
//! invoked again only if a message is delivered to it. The
//! [`HaltController`] observes the graph and the router after each barrier
//! and decides whether the computation is over: this happens when all
//! vertices are halted and no message is in flight.

use crate::graph::GraphStore;
use crate::router::MessageRouter;

#[derive(Debug, Clone, Default)]
pub struct HaltController {
    active: usize,
    in_flight: usize,
}

impl HaltController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refreshes the counters from the graph and the router.
    ///
    /// Must be called after each barrier.
    pub fn observe<I, V, E, M>(&mut self, graph: &GraphStore<I, V, E>, router: &MessageRouter<M>)
    where
        I: Clone + Eq + std::hash::Hash + std::fmt::Debug,
    {
        self.active = graph.num_vertices() - graph.num_halted();
        self.in_flight = router.in_flight();
    }

    /// Returns the number of vertices that did not vote to halt.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Returns the number of messages in flight after the last barrier.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns whether every vertex is halted and no message is in flight.
    pub fn is_terminated(&self) -> bool {
        self.active == 0 && self.in_flight == 0
    }
}
