/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use dsi_progress_logger::prelude::*;
use pregel::aggregators::AggregatorRegistry;
use pregel::graph::GraphStore;
use pregel::program::{Context, Outcome, Vertex, VertexProgram};
use pregel::scheduler::SuperstepScheduler;
use pregel::scheduler::preds::MaxSteps;
use pregel::utils::Granularity;
use pregel_algo::rank::pagerank::{NUM_VERTICES, PageRank, RANDOM_JUMP};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns a random graph on `n` vertices in which the multiples of four
/// are dangling.
fn random_graph(n: usize, num_edges: usize, seed: u64) -> GraphStore<usize, f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    // The cycle 0 → 1 → ⋯ → 0, without the edges leaving multiples of four.
    let mut edges = (0..n)
        .filter(|i| i % 4 != 0)
        .map(|i| (i, (i + 1) % n, ()))
        .collect::<Vec<_>>();
    for _ in 0..num_edges {
        let source = rng.random_range(0..n);
        let target = rng.random_range(0..n);
        if source % 4 != 0 {
            edges.push((source, target, ()));
        }
    }
    GraphStore::from_edges(edges, |_| 0.0)
}

/// Power iteration with uniform redistribution of the random jump and of
/// the rank of dangling vertices.
fn reference_pagerank(graph: &GraphStore<usize, f64>, damping: f64, iterations: usize) -> Vec<f64> {
    let n = graph.num_vertices();
    let ids = graph.all_vertices().copied().collect::<Vec<_>>();
    let mut rank = vec![1.0 / n as f64; n];
    for _ in 0..iterations {
        let mut next = vec![0.0; n];
        let mut jump = 0.0;
        for (i, id) in ids.iter().enumerate() {
            let edges = graph.edges_of(id).unwrap();
            if edges.is_empty() {
                jump += rank[i];
            } else {
                jump += (1.0 - damping) * rank[i];
                for edge in edges {
                    let j = graph.index_of(edge.target()).unwrap();
                    next[j] += damping * rank[i] / edges.len() as f64;
                }
            }
        }
        for x in next.iter_mut() {
            *x += jump / n as f64;
        }
        rank = next;
    }
    rank
}

fn total(graph: &GraphStore<usize, f64>) -> f64 {
    graph.values().map(|(_, &rank)| rank).sum()
}

/// Delegates to [`PageRank`], counting dangling vertices that send.
struct Watched {
    inner: PageRank,
    dangling_senders: AtomicUsize,
}

impl VertexProgram<usize, f64, (), f64> for Watched {
    fn register_aggregators(&self, registry: &mut AggregatorRegistry) -> pregel::Result<()> {
        VertexProgram::<usize, f64, (), f64>::register_aggregators(&self.inner, registry)
    }

    fn compute(
        &self,
        vertex: Vertex<'_, usize, f64>,
        messages: &[f64],
        ctx: &Context<'_>,
    ) -> anyhow::Result<Outcome<usize, f64, f64>> {
        let outcome = self.inner.compute(vertex, messages, ctx)?;
        if vertex.is_dangling() && !outcome.messages().is_empty() {
            self.dangling_senders.fetch_add(1, Ordering::Relaxed);
        }
        Ok(outcome)
    }
}

#[test]
fn test_two_cycle() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let graph = GraphStore::from_edges([("A", "B", ()), ("B", "A", ())], |_| 0.0);
    let mut pr = PageRank::new();
    pr.damping(0.85).iterations(10);

    let mut scheduler = SuperstepScheduler::new(graph, &pr)?;
    scheduler.run_to_halt()?;
    assert_eq!(scheduler.step(), pr.supersteps());
    assert_eq!(scheduler.aggregators().value::<u64>(NUM_VERTICES)?, 2);

    let graph = scheduler.into_graph();
    for id in ["A", "B"] {
        assert!((graph.value_of(&id)? - 0.5).abs() < 1E-12, "{id}");
    }
    Ok(())
}

#[test]
fn test_dangling_sink() -> anyhow::Result<()> {
    let graph = GraphStore::from_edges([(0, 1, ())], |_| 0.0);
    let program = Watched {
        inner: PageRank::new(),
        dangling_senders: AtomicUsize::new(0),
    };
    let mut scheduler = SuperstepScheduler::new(graph, program)?;

    while !scheduler.is_terminated() {
        scheduler.superstep()?;
        if scheduler.step() >= 3 {
            // The superstep just committed is at least 2.
            let sum = total(scheduler.graph());
            assert!((sum - 1.0).abs() < 1E-12, "step {}: {sum}", scheduler.step());
        }
    }
    assert_eq!(scheduler.step(), PageRank::new().supersteps());
    assert_eq!(scheduler.program().dangling_senders.load(Ordering::Relaxed), 0);
    // The sink collects more rank than the source.
    let graph = scheduler.graph();
    assert!(graph.value_of(&1)? > graph.value_of(&0)?);
    Ok(())
}

#[test]
fn test_first_steps() -> anyhow::Result<()> {
    let graph = GraphStore::from_edges([(0, 1, ())], |_| 0.0);
    let mut scheduler = SuperstepScheduler::new(graph, PageRank::new())?;

    let stats = scheduler.superstep()?;
    assert_eq!(stats.sent, 1);
    scheduler.superstep()?;
    assert_eq!(scheduler.router().in_flight(), 0);
    assert_eq!(scheduler.aggregators().value::<u64>(NUM_VERTICES)?, 2);

    scheduler.superstep()?;
    assert_eq!(*scheduler.graph().value_of(&0)?, 0.5);
    assert_eq!(*scheduler.graph().value_of(&1)?, 0.5);
    // 0 sends 0.85 · 0.5 to 1; the rest of the mass jumps.
    assert_eq!(scheduler.router().in_flight(), 1);
    let jump = scheduler.aggregators().value::<f64>(RANDOM_JUMP)?;
    assert!((jump - (0.15 * 0.5 + 0.5)).abs() < 1E-15);
    Ok(())
}

#[test]
fn test_mass_conservation() -> anyhow::Result<()> {
    for seed in 0..5 {
        let graph = random_graph(200, 800, seed);
        let program = Watched {
            inner: PageRank::new(),
            dangling_senders: AtomicUsize::new(0),
        };
        let mut scheduler = SuperstepScheduler::new(graph, program)?;
        scheduler.granularity(Granularity::Vertices(16));
        while !scheduler.is_terminated() {
            scheduler.superstep()?;
            if scheduler.step() >= 3 {
                let sum = total(scheduler.graph());
                assert!((sum - 1.0).abs() < 1E-9, "seed {seed}, step {}: {sum}", scheduler.step());
            }
        }
        assert_eq!(scheduler.program().dangling_senders.load(Ordering::Relaxed), 0);
    }
    Ok(())
}

#[test]
fn test_against_power_iteration() -> anyhow::Result<()> {
    let graph = random_graph(300, 1500, 42);
    for (damping, iterations) in [(0.85, 10), (0.5, 3), (0.99, 30), (0.85, 0)] {
        let expected = reference_pagerank(&graph, damping, iterations);
        let mut pr = PageRank::new();
        pr.damping(damping).iterations(iterations);
        let result = pr.run(graph.clone())?;
        for (i, (_, &rank)) in result.values().enumerate() {
            assert!(
                (rank - expected[i]).abs() < 1E-12,
                "damping {damping}, iterations {iterations}, vertex {i}: {rank} != {}",
                expected[i]
            );
        }
    }
    Ok(())
}

#[test]
fn test_determinism() -> anyhow::Result<()> {
    let graph = random_graph(2000, 10000, 7);
    let mut results = Vec::new();
    for num_threads in [1, 2, 4, 8] {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()?;
        let mut pr = PageRank::new();
        pr.granularity(Granularity::Edges(100));
        let result = thread_pool.install(|| {
            let mut pl = progress_logger![item_name = "superstep"];
            let mut cpl = concurrent_progress_logger![item_name = "vertex"];
            pr.run_with_logging(
                graph.clone(),
                predicates::constant::never(),
                &mut pl,
                &mut cpl,
            )
        })?;
        results.push(
            result
                .into_values()
                .map(|(_, rank)| rank.to_bits())
                .collect::<Vec<_>>(),
        );
    }
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    Ok(())
}

#[test]
fn test_max_steps() -> anyhow::Result<()> {
    let graph = random_graph(50, 200, 3);
    let pr = PageRank::new();
    let partial = pr.run_with_logging(graph.clone(), MaxSteps::from(5), no_logging![], no_logging![])?;
    let expected = reference_pagerank(&graph, 0.85, 2);
    for (i, (_, &rank)) in partial.values().enumerate() {
        assert!((rank - expected[i]).abs() < 1E-12);
    }
    Ok(())
}

#[test]
fn test_huge_iterations() -> anyhow::Result<()> {
    let graph = random_graph(20, 60, 7);
    let mut pr = PageRank::new();
    pr.iterations(usize::MAX);
    assert_eq!(pr.supersteps(), usize::MAX);
    let partial = pr.run_with_logging(graph.clone(), MaxSteps::from(6), no_logging![], no_logging![])?;
    let expected = reference_pagerank(&graph, 0.85, 3);
    for (i, (_, &rank)) in partial.values().enumerate() {
        assert!((rank - expected[i]).abs() < 1E-12);
    }
    Ok(())
}

#[test]
#[should_panic]
fn test_bad_damping() {
    PageRank::new().damping(1.0);
}
