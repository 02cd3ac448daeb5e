/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Errors of the engine.
//!
//! All fallible operations of the crate return a [`Result`] whose error type
//! is the [`Error`] enum below. Vertex programs report their own failures
//! using [`anyhow`]; the scheduler wraps them in [`Error::VertexProgram`]
//! unless they already are an [`Error`].

use thiserror::Error;

/// A specialized [`Result`](std::result::Result) for the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// A vertex identifier that is not in the graph.
    #[error("Unknown vertex {0}")]
    UnknownVertex(String),

    /// An input record that does not resolve to a (source, target) pair.
    #[error("Malformed input at line {line}: {content:?} (expecting a separated pair of vertices)")]
    MalformedInput { line: usize, content: String },

    /// An aggregator was registered twice.
    #[error("Aggregator {0:?} is already registered")]
    DuplicateAggregator(String),

    /// An aggregator name that was never registered.
    #[error("Unknown aggregator {0:?}")]
    UnknownAggregator(String),

    /// An aggregator was read or fed with a value of the wrong type.
    #[error("Aggregator {name:?} holds values of type {expected}")]
    AggregatorType { name: String, expected: &'static str },

    /// An aggregator was queried for a superstep that has not been finalized.
    #[error("Superstep {step} has not been reached (current superstep: {current})")]
    StepOutOfRange { step: usize, current: usize },

    /// An aggregator was queried for a superstep whose value was dropped.
    #[error("The aggregated values of superstep {step} are no longer kept (current superstep: {current})")]
    StepEvicted { step: usize, current: usize },

    /// A vertex program failed; the superstep was not committed.
    #[error("Vertex program failed on vertex {vertex} at superstep {step}")]
    VertexProgram {
        vertex: String,
        step: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The computation was interrupted; the superstep in progress was not
    /// committed.
    #[error("The computation was interrupted at superstep {0}")]
    Interrupted(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
