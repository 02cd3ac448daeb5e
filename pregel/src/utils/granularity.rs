/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// Granularity of the parallel tasks of a superstep, specified by vertices
/// or by edges.
///
/// The [scheduler](crate::scheduler::SuperstepScheduler) splits the vertex
/// set among [Rayon](rayon) tasks; each task handles at least
/// [`vertex_granularity`](Self::vertex_granularity) vertices. Specifying the
/// granularity by edges is useful when the cost of an invocation is
/// proportional to the out-degree, as it happens for message-broadcasting
/// programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Each task handles at least the given number of vertices.
    Vertices(usize),
    /// Each task handles a number of vertices whose expected sum of
    /// out-degrees is the given number of edges.
    Edges(u64),
}

impl core::default::Default for Granularity {
    /// Returns a default granularity of 1000 vertices.
    fn default() -> Self {
        Self::Vertices(1000)
    }
}

impl Granularity {
    /// Returns the minimum number of vertices of a task, which is always
    /// positive.
    ///
    /// For the variant [`Edges`](Self::Edges), the number of vertices is the
    /// specified number of edges divided by the average out-degree.
    pub fn vertex_granularity(&self, num_vertices: usize, num_edges: usize) -> usize {
        match self {
            Self::Vertices(n) => (*n).max(1),
            Self::Edges(n) => {
                if num_edges == 0 {
                    return num_vertices.max(1);
                }
                let average_degree = num_edges as f64 / num_vertices.max(1) as f64;
                (*n as f64 / average_degree)
                    .ceil()
                    .clamp(1.0, usize::MAX as f64) as usize
            }
        }
    }
}
