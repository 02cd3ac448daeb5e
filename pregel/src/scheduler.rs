/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The bulk-synchronous-parallel driver loop.
//!
//! A [`SuperstepScheduler`] owns a [`GraphStore`], a [`MessageRouter`], an
//! [`AggregatorRegistry`] and a [`HaltController`], and runs a
//! [`VertexProgram`] on them one superstep at a time.
//!
//! # Supersteps
//!
//! At superstep *n* the scheduler:
//!
//! 1. computes the eligible vertices: those that are not halted, and those
//!    that are halted but have incoming messages;
//! 2. invokes the program on each eligible vertex, in parallel, passing the
//!    vertex, its messages and a read-only [`Context`];
//! 3. if all invocations succeeded, commits their outcomes in vertex-index
//!    order: new values, halt decisions, outgoing messages and aggregator
//!    contributions;
//! 4. performs the barrier: the message queues are swapped, the aggregators
//!    are finalized and the superstep counter is incremented.
//!
//! Invocations do not modify any shared state: their outcomes are collected
//! and committed only when the whole superstep has completed. Thus, an
//! invocation error (or an [interruption](InterruptHandle)) leaves the
//! computation exactly as it was at the beginning of the superstep. Since
//! commits happen in index order, the message queues and the aggregator
//! values do not depend on the number of threads, and two runs on the same
//! input produce the same output.
//!
//! # Termination
//!
//! [`run`](SuperstepScheduler::run) executes supersteps until all vertices are
//! halted and no message is in flight, or until a [stopping
//! predicate](preds) is satisfied.

pub mod preds {
    //! Predicates implementing stopping conditions.
    //!
    //! Predicates are evaluated before each superstep, in addition to the
    //! global halting condition, which is always checked. You can combine
    //! them using the `and` and `or` methods provided by the [`Predicate`]
    //! trait; [`predicates::constant::never()`] never stops the computation.
    //!
    //! # Examples
    //! ```
    //! use predicates::prelude::*;
    //! use pregel::scheduler::preds::{MaxSteps, PredParams};
    //!
    //! let predicate = MaxSteps::from(10).or(predicate::always());
    //! assert!(predicate.eval(&PredParams { step: 0, active: 1, in_flight: 0 }));
    //! ```

    use predicates::{Predicate, reflection::PredicateReflection};
    use std::fmt::Display;

    /// This structure is passed to stopping predicates to provide the
    /// information that is needed to evaluate them.
    #[derive(Debug, Clone, Copy)]
    pub struct PredParams {
        /// The number of completed supersteps.
        pub step: usize,
        /// The number of vertices that did not vote to halt.
        pub active: usize,
        /// The number of messages in flight.
        pub in_flight: usize,
    }

    /// Stops after the provided number of supersteps.
    #[derive(Debug, Clone)]
    pub struct MaxSteps {
        max_steps: usize,
    }

    impl MaxSteps {
        pub const DEFAULT_MAX_STEPS: usize = usize::MAX;
    }

    impl From<usize> for MaxSteps {
        fn from(max_steps: usize) -> Self {
            MaxSteps { max_steps }
        }
    }

    impl Default for MaxSteps {
        fn default() -> Self {
            Self::from(Self::DEFAULT_MAX_STEPS)
        }
    }

    impl Display for MaxSteps {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(max supersteps: {})", self.max_steps))
        }
    }

    impl PredicateReflection for MaxSteps {}

    impl Predicate<PredParams> for MaxSteps {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.step >= self.max_steps
        }
    }
}

use crate::aggregators::{AggregatorRegistry, Contribution};
use crate::graph::GraphStore;
use crate::halt::HaltController;
use crate::program::{Context, Outcome, Vertex, VertexProgram};
use crate::router::MessageRouter;
use crate::utils::{Granularity, InterruptHandle};
use crate::{Error, Result};
use dsi_progress_logger::{ConcurrentProgressLog, ProgressLog, no_logging};
use predicates::Predicate;
use rayon::prelude::*;
use std::fmt::Debug;
use std::hash::Hash;

/// The outcome of an invocation, with destinations resolved to indices and
/// contributions validated.
struct Resolved<V, M> {
    value: Option<V>,
    messages: Vec<(usize, M)>,
    contributions: Vec<Contribution>,
    halt: bool,
    dropped: usize,
}

/// Statistics about a committed superstep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// The superstep the statistics refer to.
    pub step: usize,
    /// The number of invocations.
    pub invoked: usize,
    /// The number of messages sent.
    pub sent: usize,
    /// The number of messages dropped because of an unknown destination.
    pub dropped: usize,
}

/// Drives a [`VertexProgram`] on a [`GraphStore`].
///
/// # Examples
///
/// Every vertex sends its value to its neighbours and keeps the maximum
/// value seen; vertices halt when their value does not change, and are
/// reactivated by incoming messages.
///
/// ```
/// use pregel::prelude::*;
///
/// struct MaxValue;
///
/// impl VertexProgram<u32, u32, (), u32> for MaxValue {
///     fn compute(
///         &self,
///         vertex: Vertex<'_, u32, u32>,
///         messages: &[u32],
///         ctx: &Context<'_>,
///     ) -> anyhow::Result<Outcome<u32, u32, u32>> {
///         let mut outcome = Outcome::new();
///         let max = messages.iter().copied().fold(*vertex.value(), u32::max);
///         if ctx.step() == 0 || max > *vertex.value() {
///             outcome.set_value(max).send_to_all_edges(&vertex, max);
///         }
///         outcome.vote_to_halt();
///         Ok(outcome)
///     }
/// }
///
/// let graph = GraphStore::from_edges([(1, 2, ()), (2, 3, ()), (3, 1, ())], |&id| id);
/// let mut scheduler = SuperstepScheduler::new(graph, MaxValue)?;
/// scheduler.run_to_halt()?;
/// assert!(scheduler.graph().values().all(|(_, &value)| value == 3));
/// # Ok::<(), pregel::Error>(())
/// ```
pub struct SuperstepScheduler<I, V, E, M, P> {
    graph: GraphStore<I, V, E>,
    router: MessageRouter<M>,
    aggregators: AggregatorRegistry,
    halt: HaltController,
    program: P,
    step: usize,
    granularity: Granularity,
    interrupt: InterruptHandle,
}

impl<I, V, E, M, P> std::fmt::Debug for SuperstepScheduler<I, V, E, M, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperstepScheduler")
            .field("step", &self.step)
            .field("granularity", &self.granularity)
            .field("aggregators", &self.aggregators)
            .finish_non_exhaustive()
    }
}

impl<I, V, E, M, P> SuperstepScheduler<I, V, E, M, P>
where
    I: Clone + Eq + Hash + Debug + Send + Sync,
    V: Send + Sync,
    E: Send + Sync,
    M: Send + Sync,
    P: VertexProgram<I, V, E, M>,
{
    /// Creates a scheduler at superstep 0, registering the aggregators of
    /// the program.
    pub fn new(graph: GraphStore<I, V, E>, program: P) -> Result<Self> {
        let mut aggregators = AggregatorRegistry::new();
        program.register_aggregators(&mut aggregators)?;
        let router = MessageRouter::new(graph.num_vertices());
        let mut halt = HaltController::new();
        halt.observe(&graph, &router);
        Ok(Self {
            graph,
            router,
            aggregators,
            halt,
            program,
            step: 0,
            granularity: Granularity::default(),
            interrupt: InterruptHandle::new(),
        })
    }

    /// Sets the parallel task granularity.
    pub fn granularity(&mut self, granularity: Granularity) -> &mut Self {
        self.granularity = granularity;
        self
    }

    /// Returns the current superstep, that is, the number of completed
    /// supersteps.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn graph(&self) -> &GraphStore<I, V, E> {
        &self.graph
    }

    /// Consumes the scheduler, returning the graph with the final values.
    pub fn into_graph(self) -> GraphStore<I, V, E> {
        self.graph
    }

    pub fn router(&self) -> &MessageRouter<M> {
        &self.router
    }

    pub fn aggregators(&self) -> &AggregatorRegistry {
        &self.aggregators
    }

    /// Gives access to the aggregators, so that further aggregators can be
    /// registered before running.
    pub fn aggregators_mut(&mut self) -> &mut AggregatorRegistry {
        &mut self.aggregators
    }

    pub fn halt_controller(&self) -> &HaltController {
        &self.halt
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    /// Returns a handle that can be used to interrupt the computation.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Returns whether all vertices are halted and no message is in flight.
    pub fn is_terminated(&self) -> bool {
        self.halt.is_terminated()
    }

    /// Runs supersteps until all vertices are halted and no message is in
    /// flight.
    pub fn run_to_halt(&mut self) -> Result<()> {
        self.run(predicates::constant::never())
    }

    /// Runs supersteps until all vertices are halted and no message is in
    /// flight, or until the given predicate is satisfied.
    pub fn run(&mut self, predicate: impl Predicate<preds::PredParams>) -> Result<()> {
        self.run_with_logging(predicate, no_logging![], no_logging![])
    }

    /// Runs supersteps until all vertices are halted and no message is in
    /// flight, or until the given predicate is satisfied, logging progress.
    ///
    /// `pl` is a sequential [`ProgressLog`] counting supersteps; `cpl` is a
    /// [`ConcurrentProgressLog`] counting invocations inside each superstep.
    /// Either can be [`no_logging![]`](dsi_progress_logger::no_logging).
    pub fn run_with_logging(
        &mut self,
        predicate: impl Predicate<preds::PredParams>,
        pl: &mut impl ProgressLog,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> Result<()> {
        log::info!(
            "Running on {} vertices and {} edges",
            self.graph.num_vertices(),
            self.graph.num_edges()
        );
        log::info!("Stopping criterion: {}", predicate);

        pl.item_name("superstep");
        pl.expected_updates(None);
        pl.start("Running supersteps...");

        let result = loop {
            if self.halt.is_terminated() {
                log::info!("All vertices halted after {} supersteps", self.step);
                break Ok(());
            }
            if predicate.eval(&preds::PredParams {
                step: self.step,
                active: self.halt.active(),
                in_flight: self.halt.in_flight(),
            }) {
                log::info!(
                    "Stopping criterion met after {} supersteps ({} active vertices, {} messages in flight)",
                    self.step,
                    self.halt.active(),
                    self.halt.in_flight()
                );
                break Ok(());
            }
            if let Err(err) = self.superstep_with_logging(cpl) {
                break Err(err);
            }
            pl.update_and_display();
        };

        pl.done();
        result
    }

    /// Executes a single superstep.
    pub fn superstep(&mut self) -> Result<StepStats> {
        self.superstep_with_logging(no_logging![])
    }

    /// Executes a single superstep, counting invocations with `cpl`.
    ///
    /// On error, nothing is committed and the superstep counter is not
    /// advanced.
    pub fn superstep_with_logging(
        &mut self,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> Result<StepStats> {
        let step = self.step;
        if self.interrupt.is_interrupted() {
            return Err(Error::Interrupted(step));
        }

        let n = self.graph.num_vertices();
        let min_len = self
            .granularity
            .vertex_granularity(n, self.graph.num_edges());

        cpl.item_name("vertex");
        cpl.expected_updates(Some(n));
        cpl.start(format!("Superstep {step}..."));

        let outcomes = self.compute(step, min_len, cpl);
        cpl.done();
        let outcomes = outcomes?;

        let stats = self.commit(step, outcomes);
        self.barrier();

        log::debug!(
            "Superstep {}: {} invocations, {} messages sent, {} dropped; {} active vertices",
            stats.step,
            stats.invoked,
            stats.sent,
            stats.dropped,
            self.halt.active()
        );
        Ok(stats)
    }

    /// Invokes the program on the eligible vertices, without modifying any
    /// state.
    fn compute(
        &self,
        step: usize,
        min_len: usize,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> Result<Vec<Option<Resolved<V, M>>>> {
        let graph = &self.graph;
        let router = &self.router;
        let aggregators = &self.aggregators;
        let program = &self.program;
        let interrupt = &self.interrupt;
        let ctx = Context {
            step,
            num_vertices: graph.num_vertices(),
            aggregators,
        };

        (0..graph.num_vertices())
            .into_par_iter()
            .with_min_len(min_len)
            .map_with(cpl.clone(), |cpl, index| {
                cpl.update();
                if graph.is_halted_at(index) && !router.has_messages(index) {
                    return Ok(None);
                }
                if interrupt.is_interrupted() {
                    return Err(Error::Interrupted(step));
                }
                let id = graph.id(index);
                let vertex = Vertex {
                    id,
                    value: graph.value_at(index),
                    edges: graph.edges_at(index),
                };
                let outcome = program
                    .compute(vertex, router.messages_for(index), &ctx)
                    .map_err(|err| program_error(err, id, step))?;
                resolve(graph, aggregators, outcome).map(Some)
            })
            .collect()
    }

    /// Applies the outcomes of a superstep in index order.
    fn commit(&mut self, step: usize, outcomes: Vec<Option<Resolved<V, M>>>) -> StepStats {
        let mut stats = StepStats {
            step,
            ..StepStats::default()
        };
        for (index, resolved) in outcomes.into_iter().enumerate() {
            let Some(resolved) = resolved else {
                continue;
            };
            stats.invoked += 1;
            stats.sent += resolved.messages.len();
            stats.dropped += resolved.dropped;
            if let Some(value) = resolved.value {
                self.graph.set_value_at(index, value);
            }
            self.graph.set_halted_at(index, resolved.halt);
            for (destination, payload) in resolved.messages {
                self.router.send(destination, payload);
            }
            for contribution in resolved.contributions {
                self.aggregators.merge_validated(contribution);
            }
        }
        self.router.record_dropped(stats.dropped);
        stats
    }

    fn barrier(&mut self) {
        self.router.barrier_swap();
        self.aggregators.barrier_finalize();
        self.step += 1;
        self.halt.observe(&self.graph, &self.router);
    }
}

/// Resolves message destinations and validates contributions.
fn resolve<I, V, E, M>(
    graph: &GraphStore<I, V, E>,
    aggregators: &AggregatorRegistry,
    outcome: Outcome<I, V, M>,
) -> Result<Resolved<V, M>>
where
    I: Clone + Eq + Hash + Debug,
{
    let (value, outgoing, contributions, halt) = outcome.into_parts();
    for contribution in &contributions {
        aggregators.validate(contribution)?;
    }
    let mut messages = Vec::with_capacity(outgoing.len());
    let mut dropped = 0;
    for (destination, payload) in outgoing {
        match graph.index_of(&destination) {
            Some(index) => messages.push((index, payload)),
            None => {
                log::warn!("Dropping message to unknown vertex {destination:?}");
                dropped += 1;
            }
        }
    }
    Ok(Resolved {
        value,
        messages,
        contributions,
        halt,
        dropped,
    })
}

/// Turns an error of a vertex program into an [`Error`], leaving errors of
/// the engine unchanged.
fn program_error<I: Debug>(err: anyhow::Error, id: &I, step: usize) -> Error {
    match err.downcast::<Error>() {
        Ok(err) => err,
        Err(source) => Error::VertexProgram {
            vertex: format!("{id:?}"),
            step,
            source,
        },
    }
}
