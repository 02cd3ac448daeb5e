/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! PageRank as a vertex program.
//!
//! The computation runs for a fixed number of iterations, using two
//! aggregators: a persistent one, [`NUM_VERTICES`], counting the vertices, and
//! a regular one, [`RANDOM_JUMP`], collecting at each superstep the rank mass
//! that is not propagated along the edges.
//!
//! # The supersteps
//!
//! If *D* is the damping factor, *N* the number of vertices and *k* the
//! number of iterations:
//!
//! - at superstep 0 every vertex sends a zero message to its successors;
//! - at superstep 1 every vertex contributes 1 to [`NUM_VERTICES`];
//! - at superstep 2 every vertex sets its rank to 1/*N*;
//! - at superstep *s* with 3 ≤ *s* ≤ *k* + 2 every vertex sets its rank to the
//!   sum of its incoming messages plus the value of [`RANDOM_JUMP`] divided by
//!   *N*;
//! - at superstep *s* with 2 ≤ *s* ≤ *k* + 1, after updating its rank *r*, a
//!   vertex with *d* > 0 successors sends *D* *r* / *d* to each of them and
//!   contributes (1 − *D*) *r* to [`RANDOM_JUMP`], whereas a dangling vertex
//!   sends nothing and contributes *r*;
//! - at superstep *k* + 2 every vertex votes to halt.
//!
//! The random jump and the dangling vertices are thus handled uniformly: all
//! mass not sent along the edges is redistributed evenly at the next
//! superstep. As a consequence, from superstep 2 on the ranks always sum to
//! one, and the computation terminates after *k* + 3
//! [supersteps](PageRank::supersteps).
//!
//! Vertex values before superstep 2 are not meaningful.

use anyhow::{Context as _, ensure};
use dsi_progress_logger::{ConcurrentProgressLog, ProgressLog, no_logging};
use kahan::KahanSum;
use predicates::Predicate;
use pregel::aggregators::AggregatorRegistry;
use pregel::graph::GraphStore;
use pregel::program::{Context, Outcome, Vertex, VertexProgram};
use pregel::scheduler::SuperstepScheduler;
use pregel::scheduler::preds::PredParams;
use pregel::utils::Granularity;
use std::fmt::Debug;
use std::hash::Hash;

/// The name of the persistent aggregator counting the vertices.
pub const NUM_VERTICES: &str = "num_vertices";
/// The name of the aggregator collecting the mass redistributed uniformly.
pub const RANDOM_JUMP: &str = "random_jump";

/// The PageRank vertex program.
///
/// # Examples
///
/// ```
/// use pregel::graph::GraphStore;
/// use pregel_algo::rank::pagerank::PageRank;
///
/// let graph = GraphStore::from_edges([("A", "B", ()), ("B", "A", ())], |_| 0.0);
/// let mut pr = PageRank::new();
/// pr.damping(0.85).iterations(10);
/// let graph = pr.run(graph)?;
///
/// assert!((graph.value_of(&"A")? - 0.5).abs() < 1E-12);
/// assert!((graph.value_of(&"B")? - 0.5).abs() < 1E-12);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PageRank {
    damping: f64,
    iterations: usize,
    granularity: Granularity,
}

impl Default for PageRank {
    fn default() -> Self {
        Self {
            damping: Self::DEFAULT_DAMPING,
            iterations: Self::DEFAULT_ITERATIONS,
            granularity: Granularity::default(),
        }
    }
}

impl PageRank {
    pub const DEFAULT_DAMPING: f64 = 0.85;
    pub const DEFAULT_ITERATIONS: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the damping factor.
    ///
    /// # Panics
    ///
    /// Panics if `damping` is not in the interval (0 . . 1).
    pub fn damping(&mut self, damping: f64) -> &mut Self {
        assert!(
            damping > 0.0 && damping < 1.0,
            "The damping factor must be in (0 . . 1), got {damping}"
        );
        self.damping = damping;
        self
    }

    /// Sets the number of iterations.
    pub fn iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    /// Sets the parallel task granularity used by [`run`](Self::run).
    pub fn granularity(&mut self, granularity: Granularity) -> &mut Self {
        self.granularity = granularity;
        self
    }

    /// Returns the number of supersteps after which all vertices are halted.
    pub fn supersteps(&self) -> usize {
        self.iterations.saturating_add(3)
    }

    /// Runs PageRank to completion on `graph`, returning the graph with the
    /// final ranks as vertex values.
    pub fn run<I, E>(&self, graph: GraphStore<I, f64, E>) -> anyhow::Result<GraphStore<I, f64, E>>
    where
        I: Clone + Eq + Hash + Debug + Send + Sync,
        E: Send + Sync,
    {
        self.run_with_logging(
            graph,
            predicates::constant::never(),
            no_logging![],
            no_logging![],
        )
    }

    /// Runs PageRank on `graph` until all vertices halt or `predicate` is
    /// satisfied, logging progress.
    ///
    /// Stopping before [`supersteps`](Self::supersteps) supersteps yields a
    /// partial computation; the ranks still sum to one if at least three
    /// supersteps were executed.
    pub fn run_with_logging<I, E>(
        &self,
        graph: GraphStore<I, f64, E>,
        predicate: impl Predicate<PredParams>,
        pl: &mut impl ProgressLog,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> anyhow::Result<GraphStore<I, f64, E>>
    where
        I: Clone + Eq + Hash + Debug + Send + Sync,
        E: Send + Sync,
    {
        log::info!("Damping factor: {}", self.damping);
        log::info!("Iterations: {}", self.iterations);

        let mut scheduler = SuperstepScheduler::new(graph, self)?;
        scheduler.granularity(self.granularity);
        // Only the values of the previous superstep are ever read.
        scheduler.aggregators_mut().keep_history(Some(1));
        scheduler
            .run_with_logging(predicate, pl, cpl)
            .context("Could not compute PageRank")?;

        if scheduler.step() < self.supersteps() {
            log::warn!(
                "Stopped after {} supersteps out of {}",
                scheduler.step(),
                self.supersteps()
            );
        }

        let graph = scheduler.into_graph();
        let mut total = KahanSum::<f64>::new();
        for (_, &rank) in graph.values() {
            total += rank;
        }
        log::info!("Total rank: {}", total.sum());
        Ok(graph)
    }
}

impl<I: Clone, E> VertexProgram<I, f64, E, f64> for PageRank {
    fn register_aggregators(&self, registry: &mut AggregatorRegistry) -> pregel::Result<()> {
        registry.register_sum::<u64>(NUM_VERTICES, true)?;
        registry.register_sum::<f64>(RANDOM_JUMP, false)
    }

    fn compute(
        &self,
        vertex: Vertex<'_, I, f64, E>,
        messages: &[f64],
        ctx: &Context<'_>,
    ) -> anyhow::Result<Outcome<I, f64, f64>> {
        let mut outcome = Outcome::new();
        match ctx.step() {
            0 => {
                outcome.send_to_all_edges(&vertex, 0.0);
            }
            1 => {
                outcome.aggregate(NUM_VERTICES, 1_u64);
            }
            step => {
                let n = ctx.aggregated::<u64>(NUM_VERTICES)?;
                ensure!(n > 0, "No vertex was counted");
                let n = n as f64;

                let rank = if step == 2 {
                    1.0 / n
                } else {
                    let mut sum = KahanSum::<f64>::new();
                    for &m in messages {
                        sum += m;
                    }
                    sum.sum() + ctx.aggregated::<f64>(RANDOM_JUMP)? / n
                };
                outcome.set_value(rank);

                if step >= self.iterations.saturating_add(2) {
                    outcome.vote_to_halt();
                } else if vertex.is_dangling() {
                    outcome.aggregate(RANDOM_JUMP, rank);
                } else {
                    outcome
                        .send_to_all_edges(
                            &vertex,
                            self.damping * rank / vertex.out_degree() as f64,
                        )
                        .aggregate(RANDOM_JUMP, (1.0 - self.damping) * rank);
                }
            }
        }
        Ok(outcome)
    }
}
