/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{
    ArcsArgs, GlobalArgs, GranularityArgs, NumThreadsArg, get_thread_pool, open_input,
    store_values,
};
use anyhow::{Context, Result, ensure};
use clap::Parser;
use dsi_progress_logger::{ProgressLog, concurrent_progress_logger, progress_logger};
use predicates::BoxPredicate;
use predicates::prelude::*;
use pregel::ingest::load_graph;
use pregel::scheduler::preds::{MaxSteps, PredParams};
use pregel_algo::rank::pagerank::PageRank;
use std::path::PathBuf;

/// The available vertex programs.
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum Algorithm {
    /// PageRank with uniform redistribution of the rank of dangling vertices.
    #[value(name = "pagerank")]
    PageRank,
}

#[derive(Parser, Debug)]
#[command(
    about = "Runs a vertex program on a graph given as a list of arcs.",
    long_about = None
)]
pub struct CliArgs {
    /// The list of arcs, one per line ("-" for standard input).
    pub input: PathBuf,

    /// Where to store the vertex values ("-" for standard output).
    pub output: PathBuf,

    #[arg(value_enum)]
    /// The vertex program to run.
    pub algorithm: Algorithm,

    /// Stop after this number of supersteps, even if some vertex is still
    /// active.
    pub max_steps: Option<usize>,

    #[arg(short, long, default_value_t = PageRank::DEFAULT_DAMPING)]
    /// The damping factor (must be in the interval (0 . . 1)).
    pub damping: f64,

    #[arg(short, long, default_value_t = PageRank::DEFAULT_ITERATIONS)]
    /// The number of PageRank iterations.
    pub iterations: usize,

    #[arg(long)]
    /// Store vertices by decreasing value.
    pub sorted: bool,

    #[arg(long)]
    /// Decimal digits of the stored values.
    pub precision: Option<usize>,

    #[clap(flatten)]
    pub arcs: ArcsArgs,

    #[clap(flatten)]
    pub num_threads: NumThreadsArg,

    #[clap(flatten)]
    pub granularity: GranularityArgs,
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    match args.algorithm {
        Algorithm::PageRank => pagerank(global_args, args),
    }
}

pub fn pagerank(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    ensure!(
        args.damping > 0.0 && args.damping < 1.0,
        "The damping factor must be in (0 . . 1), got {}",
        args.damping
    );

    let mut pl = progress_logger![];
    pl.display_memory(true);
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let mut cpl = concurrent_progress_logger![];
    cpl.display_memory(true);
    if let Some(log_interval) = global_args.log_interval {
        cpl.log_interval(log_interval);
    }

    let thread_pool = get_thread_pool(args.num_threads.num_threads)?;

    log::info!("Loading the graph from {}", args.input.display());
    let graph = load_graph(
        open_input(&args.input)?,
        &args.arcs.format(),
        |_| 0.0,
        &mut pl,
    )
    .with_context(|| format!("Could not load the graph from {}", args.input.display()))?;

    let mut predicate: BoxPredicate<PredParams> = predicates::constant::never().boxed();
    if let Some(max_steps) = args.max_steps {
        predicate = predicate.or(MaxSteps::from(max_steps)).boxed();
    }

    let mut pr = PageRank::new();
    pr.damping(args.damping)
        .iterations(args.iterations)
        .granularity(args.granularity.into_granularity());

    let graph = thread_pool.install(|| pr.run_with_logging(graph, predicate, &mut pl, &mut cpl))?;

    store_values(
        &args.output,
        graph.into_values(),
        args.sorted,
        args.precision,
    )
}
