/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_doc_comments)]
#![allow(clippy::type_complexity)]

pub mod aggregators;
pub mod error;
pub mod graph;
pub mod halt;
pub mod ingest;
pub mod program;
pub mod router;
pub mod scheduler;
pub mod utils;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::aggregators::{AggregatorRegistry, Contribution};
    pub use crate::error::{Error, Result};
    pub use crate::graph::{Edge, GraphBuilder, GraphStore};
    pub use crate::halt::HaltController;
    pub use crate::ingest::{ArcsFormat, load_graph, read_arcs};
    pub use crate::program::{Context, FnProgram, Outcome, Vertex, VertexProgram, from_fn};
    pub use crate::router::MessageRouter;
    pub use crate::scheduler::preds::{MaxSteps, PredParams};
    pub use crate::scheduler::{StepStats, SuperstepScheduler};
    pub use crate::utils::*;
}
