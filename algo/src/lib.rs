/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

pub mod rank;

pub mod prelude {
    pub use crate::rank::pagerank::PageRank;
}
