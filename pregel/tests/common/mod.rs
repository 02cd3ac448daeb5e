/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![allow(dead_code)]

use pregel::graph::GraphStore;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Canonical test graph (8 vertices, 11 edges).
///
/// - Out-degree 0: vertex 7 (sink)
/// - Out-degree 1: vertices 2, 3, 4, 6
/// - Out-degree 2: vertices 0, 5
/// - Out-degree 3: vertex 1
/// - Cycle: 2 → 4 → 6 → 2
pub fn test_graph<V>(init: impl FnMut(&usize) -> V) -> GraphStore<usize, V> {
    GraphStore::from_edges(
        [
            (0, 1, ()),
            (0, 2, ()),
            (1, 3, ()),
            (1, 4, ()),
            (1, 5, ()),
            (2, 4, ()),
            (3, 6, ()),
            (4, 6, ()),
            (5, 6, ()),
            (5, 7, ()),
            (6, 2, ()),
        ],
        init,
    )
}

/// Returns a random graph with `n` vertices, containing the path 0 → 1 → ⋯ →
/// `n` − 1 plus `num_edges` random edges.
pub fn random_graph<V>(
    n: usize,
    num_edges: usize,
    seed: u64,
    init: impl FnMut(&usize) -> V,
) -> GraphStore<usize, V> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = Vec::with_capacity(num_edges + n);
    for i in 1..n {
        edges.push((i - 1, i, ()));
    }
    for _ in 0..num_edges {
        let source = rng.random_range(0..n);
        let target = rng.random_range(0..n);
        edges.push((source, target, ()));
    }
    GraphStore::from_edges(edges, init)
}

/// Initializes a logger for tests, ignoring repeated initializations.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
