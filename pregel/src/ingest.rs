/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Loading graphs from textual lists of arcs.
//!
//! Each line of the input describes an arc: a source and a target label
//! separated by a separator (a TAB by default). Further columns are ignored.
//! Blank lines are skipped, and so are lines starting with the comment
//! symbol, if one is set. Labels are opaque, so there is no comment symbol by
//! default. Any other line that does not contain the required columns makes
//! the whole load fail with [`Error::MalformedInput`].
//!
//! # Examples
//!
//! ```
//! use pregel::ingest::{ArcsFormat, load_graph};
//! use dsi_progress_logger::no_logging;
//!
//! let format = ArcsFormat {
//!     comment: Some('%'),
//!     ..ArcsFormat::default()
//! };
//! let input = "% a comment\nA\tB\nB\tA\n";
//! let graph = load_graph(input.as_bytes(), &format, |_| 0.0, no_logging![])?;
//! assert_eq!(graph.num_vertices(), 2);
//! assert_eq!(graph.num_edges(), 2);
//! # Ok::<(), pregel::Error>(())
//! ```

use crate::graph::GraphStore;
use crate::{Error, Result};
use dsi_progress_logger::ProgressLog;
use std::io::BufRead;

/// The layout of a textual list of arcs.
#[derive(Debug, Clone)]
pub struct ArcsFormat {
    /// The column separator.
    pub separator: char,
    /// Lines starting with this symbol, if any, are ignored.
    pub comment: Option<char>,
    /// The index of the column containing the source of an arc.
    pub source_column: usize,
    /// The index of the column containing the target of an arc.
    pub target_column: usize,
}

impl Default for ArcsFormat {
    fn default() -> Self {
        Self {
            separator: '\t',
            comment: None,
            source_column: 0,
            target_column: 1,
        }
    }
}

impl ArcsFormat {
    /// Parses a single line, returning `None` if the line must be skipped.
    ///
    /// `line_num` is the 1-based line number used in error messages.
    pub fn parse_line(&self, line_num: usize, line: &str) -> Option<Result<(String, String)>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(comment) = self.comment {
            if trimmed.starts_with(comment) {
                return None;
            }
        }
        let line = line.trim_end_matches('\r');
        let columns = line.split(self.separator).collect::<Vec<_>>();
        match (
            columns.get(self.source_column),
            columns.get(self.target_column),
        ) {
            (Some(source), Some(target)) if !source.is_empty() && !target.is_empty() => {
                Some(Ok((source.to_string(), target.to_string())))
            }
            _ => Some(Err(Error::MalformedInput {
                line: line_num,
                content: line.to_string(),
            })),
        }
    }
}

/// Returns an iterator on the arcs of a textual list, as `(source, target,
/// ())` records.
///
/// The iterator yields an error for each malformed line and for each I/O
/// error; [`GraphStore::try_from_edges`] stops at the first one.
pub fn read_arcs<'a, R: BufRead + 'a>(
    reader: R,
    format: &'a ArcsFormat,
) -> impl Iterator<Item = Result<(String, String, ())>> + 'a {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| match line {
            Err(e) => Some(Err(Error::from(e))),
            Ok(line) => format
                .parse_line(i + 1, &line)
                .map(|arc| arc.map(|(source, target)| (source, target, ()))),
        })
}

/// Loads a graph with string identifiers from a textual list of arcs.
///
/// `init` computes the initial value of each vertex; `pl` counts the arcs
/// read.
pub fn load_graph<R: BufRead, V>(
    reader: R,
    format: &ArcsFormat,
    init: impl FnMut(&String) -> V,
    pl: &mut impl ProgressLog,
) -> Result<GraphStore<String, V>> {
    pl.item_name("arc");
    pl.expected_updates(None);
    pl.start("Reading arcs...");
    let graph = GraphStore::try_from_edges(
        read_arcs(reader, format).inspect(|_| pl.light_update()),
        init,
    );
    pl.done();

    let graph = graph?;
    log::info!(
        "Loaded {} vertices and {} edges",
        graph.num_vertices(),
        graph.num_edges()
    );
    Ok(graph)
}
