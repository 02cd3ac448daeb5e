/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Command-line interface for the `pregel` engine.
//!
//! The only command, `run`, loads a graph from a TAB-separated list of arcs,
//! runs a vertex program on it and stores one `vertex<TAB>value` line per
//! vertex.
//!
//! The binary logs through `env_logger`: use the `RUST_LOG` environment
//! variable to change the level (the default is `info`).

#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_doc_comments)]
#![allow(clippy::type_complexity)]

use anyhow::{Context, Result, anyhow, bail, ensure};
use clap::{Args, Parser, Subcommand};
use itertools::{Either, Itertools};
use pregel::ingest::ArcsFormat;
use pregel::utils::Granularity;
use std::fmt::Display;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;

#[derive(Args, Debug)]
/// Shared CLI arguments for reading files containing arcs.
pub struct ArcsArgs {
    #[arg(long)]
    /// Ignore lines that start with this symbol (by default, every non-blank
    /// line is an arc).
    pub line_comment_symbol: Option<char>,

    #[arg(long, default_value_t = '\t')]
    /// The column separator.
    pub separator: char,

    #[arg(long, default_value_t = 0)]
    /// The index of the column containing the source vertex of an arc.
    pub source_column: usize,

    #[arg(long, default_value_t = 1)]
    /// The index of the column containing the target vertex of an arc.
    pub target_column: usize,
}

impl ArcsArgs {
    pub fn format(&self) -> ArcsFormat {
        ArcsFormat {
            separator: self.separator,
            comment: self.line_comment_symbol,
            source_column: self.source_column,
            target_column: self.target_column,
        }
    }
}

/// Parses the number of threads from a string.
///
/// This function is meant to be used with `#[arg(...,  value_parser =
/// num_threads_parser)]`.
pub fn num_threads_parser(arg: &str) -> Result<usize> {
    let num_threads = arg.parse::<usize>()?;
    ensure!(num_threads > 0, "Number of threads must be greater than 0");
    Ok(num_threads)
}

/// Shared CLI arguments for commands that specify a number of threads.
#[derive(Args, Debug)]
pub struct NumThreadsArg {
    #[arg(short = 'j', long, default_value_t = rayon::current_num_threads().max(1), value_parser = num_threads_parser)]
    /// The number of threads to use.
    pub num_threads: usize,
}

/// Shared CLI arguments for commands that specify a granularity.
#[derive(Args, Debug)]
pub struct GranularityArgs {
    #[arg(long, conflicts_with("node_granularity"))]
    /// The tentative number of edges used to define the size of a parallel job
    /// (advanced option).
    pub edge_granularity: Option<u64>,

    #[arg(long, conflicts_with("edge_granularity"))]
    /// The tentative number of vertices used to define the size of a parallel
    /// job (advanced option).
    pub node_granularity: Option<usize>,
}

impl GranularityArgs {
    pub fn into_granularity(&self) -> Granularity {
        match (self.edge_granularity, self.node_granularity) {
            (Some(_), Some(_)) => unreachable!(),
            (Some(edge_granularity), None) => Granularity::Edges(edge_granularity),
            (None, Some(node_granularity)) => Granularity::Vertices(node_granularity),
            (None, None) => Granularity::default(),
        }
    }
}

/// Opens a file for buffered reading; `-` is the standard input.
pub fn open_input(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    if path == Path::new("-") {
        log::info!("Reading from standard input");
        return Ok(Box::new(BufReader::new(std::io::stdin().lock())));
    }
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Stores `(vertex, value)` pairs, one per line, separated by a TAB.
///
/// If `sorted` is true, pairs are written by decreasing value (ties are
/// broken by the original order); otherwise, in the order given. If
/// `precision` is `Some`, values are written with the given number of
/// decimal digits. A `path` equal to `-` writes to the standard output.
pub fn store_values<I: Display>(
    path: impl AsRef<Path>,
    values: impl IntoIterator<Item = (I, f64)>,
    sorted: bool,
    precision: Option<usize>,
) -> Result<()> {
    let path = path.as_ref();
    let path_display = path.display();
    let mut out: Box<dyn Write> = if path == Path::new("-") {
        Box::new(BufWriter::new(std::io::stdout().lock()))
    } else {
        create_parent_dir(path)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("Could not create {}", path_display))?;
        Box::new(BufWriter::new(file))
    };

    let values = if sorted {
        Either::Left(
            values
                .into_iter()
                .sorted_by(|(_, a), (_, b)| b.total_cmp(a)),
        )
    } else {
        Either::Right(values.into_iter())
    };

    log::info!("Storing values at {}", path_display);
    for (id, value) in values {
        match precision {
            None => writeln!(out, "{id}\t{value}"),
            Some(precision) => writeln!(out, "{id}\t{value:.precision$}"),
        }
        .with_context(|| format!("Could not write values to {}", path_display))?;
    }
    out.flush()
        .with_context(|| format!("Could not write values to {}", path_display))?;
    Ok(())
}

/// Creates a [`ThreadPool`](rayon::ThreadPool) with the given number of threads.
pub fn get_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    let thread_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to create thread pool")?;
    log::info!("Using {} threads", thread_pool.current_num_threads());
    Ok(thread_pool)
}

/// Creates the directory that will contain `file_path`, if missing.
pub fn create_parent_dir(file_path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent_dir) = file_path.as_ref().parent() {
        std::fs::create_dir_all(parent_dir).with_context(|| {
            format!(
                "Failed to create the directory {:?}",
                parent_dir.to_string_lossy()
            )
        })?;
    }
    Ok(())
}

/// Parses a `--log-interval` value.
///
/// The value is a sequence of numbers, each followed by one of the units `d`,
/// `h`, `m` or `s`; a trailing number without unit counts milliseconds. So
/// `2m30s` is 150 seconds and `1500` is one and a half seconds.
fn parse_duration(value: &str) -> Result<Duration> {
    if value.is_empty() {
        bail!("Empty duration string, if you want every 0 milliseconds use `0`.");
    }
    let mut duration = Duration::from_secs(0);
    let mut acc = String::new();
    for c in value.chars() {
        if c.is_ascii_digit() {
            acc.push(c);
        } else if c.is_whitespace() {
            continue;
        } else {
            let dur = acc.parse::<u64>()?;
            match c {
                's' => duration += Duration::from_secs(dur),
                'm' => duration += Duration::from_secs(dur * 60),
                'h' => duration += Duration::from_secs(dur * 60 * 60),
                'd' => duration += Duration::from_secs(dur * 60 * 60 * 24),
                _ => return Err(anyhow!("Invalid duration suffix: {}", c)),
            }
            acc.clear();
        }
    }
    if !acc.is_empty() {
        let dur = acc.parse::<u64>()?;
        duration += Duration::from_millis(dur);
    }
    Ok(duration)
}

/// Sets up `env_logger` for the binary.
///
/// Each record shows the wall-clock time, the time since startup, the level,
/// the thread and the target. The level defaults to `info` when `RUST_LOG` is
/// not set.
pub fn init_env_logger() -> Result<()> {
    use jiff::SpanRound;
    use jiff::fmt::friendly::{Designator, Spacing, SpanPrinter};

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    let start = std::time::Instant::now();
    let printer = SpanPrinter::new()
        .spacing(Spacing::None)
        .designator(Designator::Compact);
    let span_round = SpanRound::new()
        .largest(jiff::Unit::Day)
        .smallest(jiff::Unit::Millisecond)
        .days_are_24_hours();

    builder.format(move |buf, record| {
        let Ok(ts) = jiff::Timestamp::try_from(SystemTime::now()) else {
            return Err(std::io::Error::other("Failed to get timestamp"));
        };
        let style = buf.default_level_style(record.level());
        let elapsed = start.elapsed();
        let span = jiff::Span::new()
            .seconds(elapsed.as_secs() as i64)
            .milliseconds(elapsed.subsec_millis() as i64);
        let span = span.round(span_round).map_err(std::io::Error::other)?;
        writeln!(
            buf,
            "{} {} {style}{}{style:#} [{:?}] {} - {}",
            ts.strftime("%F %T%.3f"),
            printer.span_to_string(&span),
            record.level(),
            std::thread::current().id(),
            record.target(),
            record.args()
        )
    });
    builder.init();
    Ok(())
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    #[arg(long, value_parser = parse_duration, global=true, display_order = 1000)]
    /// The interval between progress lines while loading and running, e.g.
    /// "30s" or "1m" (a bare number counts milliseconds; 10s if omitted).
    pub log_interval: Option<Duration>,
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    Run(run::CliArgs),
}

#[derive(Parser, Debug)]
#[command(name = "pregel", version)]
/// Bulk-synchronous-parallel vertex programs on graphs given as lists of arcs.
pub struct Cli {
    #[command(subcommand)]
    pub command: SubCommands,
    #[clap(flatten)]
    pub args: GlobalArgs,
}

pub mod run;

/// The entry point of the command-line interface.
pub fn cli_main<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let start = std::time::Instant::now();
    let cli = Cli::parse_from(args);
    match cli.command {
        SubCommands::Run(args) => {
            run::main(cli.args, args)?;
        }
    }

    log::info!(
        "The command took {}",
        pretty_print_elapsed(start.elapsed().as_secs_f64())
    );

    Ok(())
}

/// Formats the running time of a command, e.g. "1 hour 2 minutes 3.250 seconds
/// (3723.25s)".
fn pretty_print_elapsed(elapsed: f64) -> String {
    let mut result = String::new();
    let mut elapsed_seconds = elapsed as u64;
    let days = elapsed_seconds / (60 * 60 * 24);
    elapsed_seconds %= 60 * 60 * 24;
    let hours = elapsed_seconds / (60 * 60);
    elapsed_seconds %= 60 * 60;
    let minutes = elapsed_seconds / 60;

    match days {
        0 => {}
        1 => result.push_str("1 day "),
        _ => result.push_str(&format!("{} days ", days)),
    }
    match hours {
        0 => {}
        1 => result.push_str("1 hour "),
        _ => result.push_str(&format!("{} hours ", hours)),
    }
    match minutes {
        0 => {}
        1 => result.push_str("1 minute "),
        _ => result.push_str(&format!("{} minutes ", minutes)),
    }

    result.push_str(&format!("{:.3} seconds ({}s)", elapsed % 60.0, elapsed));
    result
}
