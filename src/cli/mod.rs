/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Command-line interface.
//!
//! The `cluster-bfs` binary loads a [`BvGraph`], selects
//! [star batches](crate::select::star_seeds) of seeds, and computes a
//! cluster BFS labeling for each batch, optionally verifying it.

use crate::cluster_bfs::{cluster_bfs, cluster_bfs_with_transpose, ClusterBfsStats};
use crate::labels::ClusterLabels;
use crate::seeds::Seeds;
use crate::select::star_seeds;
use crate::thread_pool;
use crate::traits::{Distance, Label};
use crate::verify::verify;
use anyhow::{anyhow, bail, ensure, Context, Result};
use clap::{Args, Parser};
use dsi_progress_logger::{progress_logger, ProgressLog};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use webgraph::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "cluster-bfs", version)]
/// Computes bounded-radius multi-source breadth-first labelings of a graph
/// of given basename, using batches of close seeds.
///
/// Noteworthy environment variables:
///
/// - RUST_MIN_STACK: minimum thread stack size (in bytes); we suggest
///   RUST_MIN_STACK=8388608 (8MiB)
///
/// - RUST_LOG: configuration for env_logger
///   <https://docs.rs/env_logger/latest/env_logger/>
pub struct Cli {
    #[clap(flatten)]
    pub global_args: GlobalArgs,
    #[clap(flatten)]
    pub args: CliArgs,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    #[arg(long, value_parser = parse_duration, global = true, display_order = 1000)]
    /// How often to log progress. Default is 10s. You can use the suffixes "s"
    /// for seconds, "m" for minutes, "h" for hours, and "d" for days. If no
    /// suffix is provided it is assumed to be in milliseconds.
    pub log_interval: Option<Duration>,
}

#[derive(Args, Debug)]
pub struct CliArgs {
    /// The basename of the graph.
    pub basename: PathBuf,

    #[arg(short, long)]
    /// The graph is directed: use the transpose with basename BASENAME-t for
    /// dense rounds (otherwise, the graph must be symmetric).
    pub transposed: bool,

    #[arg(short = 'k', long, default_value_t = 64)]
    /// The number of seeds per batch (at most 64).
    pub seeds: usize,

    #[arg(short = 'n', long, default_value_t = 1)]
    /// The number of batches.
    pub batches: usize,

    #[arg(short, long, default_value_t = 2)]
    /// The number of rounds recorded after the discovery of each node.
    pub radius: usize,

    #[arg(long, default_value_t = 1)]
    /// The maximum distance of the seeds of a batch from its center.
    pub hops: usize,

    #[arg(long, default_value_t = 0)]
    /// The seed of the pseudorandom number generator used to select batches.
    pub seed: u64,

    #[arg(long)]
    /// Use 16-bit distances instead of 8-bit distances (for graphs with
    /// eccentricities larger than 126).
    pub wide: bool,

    #[arg(long)]
    /// Verify each labeling against exact distances (slow).
    pub verify: bool,

    #[arg(short = 'j', long, default_value_t = rayon::current_num_threads().max(1), value_parser = num_threads_parser)]
    /// The number of threads to use.
    pub num_threads: usize,
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

/// Parses a duration such as `1h30m` or `500`.
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

/// Initializes the `env_logger` logger with the `info` level as default
/// and millisecond timestamps.
pub fn init_env_logger() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}

pub fn cli_main<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let start = std::time::Instant::now();
    let cli = Cli::parse_from(args);
    main(cli.global_args, cli.args)?;

    log::info!("The command took {:.3}s", start.elapsed().as_secs_f64());

    Ok(())
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    ensure!(
        (1..=<u64 as Label>::BITS).contains(&args.seeds),
        "The number of seeds per batch must be between 1 and {}",
        <u64 as Label>::BITS
    );
    ensure!(args.radius > 0, "The radius must be positive");
    ensure!(args.hops > 0, "The number of hops must be positive");

    if args.wide {
        run::<u16>(global_args, args)
    } else {
        run::<u8>(global_args, args)
    }
}

fn transpose_basename(basename: &Path) -> PathBuf {
    let mut transpose = basename.as_os_str().to_owned();
    transpose.push("-t");
    PathBuf::from(transpose)
}

fn run<D: Distance>(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    log::info!("Loading the graph from {}", args.basename.display());
    let graph = BvGraph::with_basename(&args.basename)
        .load()
        .with_context(|| format!("Could not load the graph {}", args.basename.display()))?;
    let transpose = if args.transposed {
        let basename = transpose_basename(&args.basename);
        log::info!("Loading the transpose from {}", basename.display());
        Some(
            BvGraph::with_basename(&basename)
                .load()
                .with_context(|| format!("Could not load the transpose {}", basename.display()))?,
        )
    } else {
        None
    };

    let thread_pool = thread_pool![args.num_threads];
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let batches = star_seeds(&graph, args.seeds, args.batches, args.hops, &mut rng);
    ensure!(
        !batches.is_empty(),
        "No node has a degree large enough to be the center of a batch"
    );

    let mut pl = progress_logger![];
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let mut labels = ClusterLabels::<D, u64>::new(graph.num_nodes(), args.radius);
    let mut total = ClusterBfsStats::default();

    for (i, batch) in batches.iter().enumerate() {
        let seeds = Seeds::<u64>::new(batch.iter().copied())?;
        log::info!("Batch {}: center {}, {} seeds", i, batch[0], seeds.len());

        let stats = match &transpose {
            Some(transpose) => cluster_bfs_with_transpose(
                &graph,
                transpose,
                &seeds,
                &mut labels,
                &thread_pool,
                &mut pl,
            )?,
            None => cluster_bfs(&graph, &seeds, &mut labels, &thread_pool, &mut pl)?,
        };
        total.rounds += stats.rounds;
        total.visited_nodes += stats.visited_nodes;

        let reached = labels.dists().iter().filter(|d| !d.is_inf()).count();
        let eccentricity = labels
            .dists()
            .iter()
            .filter(|d| !d.is_inf())
            .max()
            .map_or(0, |d| d.to_usize());
        log::info!(
            "Batch {}: {} rounds, {} reached nodes, maximum distance {}",
            i,
            stats.rounds,
            reached,
            eccentricity
        );

        if args.verify {
            verify(&graph, &seeds, &labels, &mut pl)
                .with_context(|| format!("Verification of batch {} failed", i))?;
        }
    }

    log::info!(
        "Processed {} batches: {} rounds, {} visited nodes",
        batches.len(),
        total.rounds,
        total.visited_nodes
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() -> Result<()> {
        assert_eq!(parse_duration("1m30s")?, Duration::from_secs(90));
        assert_eq!(parse_duration("250")?, Duration::from_millis(250));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("3x").is_err());
        Ok(())
    }

    #[test]
    fn test_transpose_basename() {
        assert_eq!(
            transpose_basename(Path::new("data/graph")),
            PathBuf::from("data/graph-t")
        );
    }

    #[test]
    fn test_args() {
        let cli = Cli::parse_from(["cluster-bfs", "graph", "-k", "8", "-r", "3", "--verify"]);
        assert_eq!(cli.args.seeds, 8);
        assert_eq!(cli.args.radius, 3);
        assert_eq!(cli.args.batches, 1);
        assert!(cli.args.verify);
        assert!(!cli.args.transposed);
        assert!(cli.global_args.log_interval.is_none());
    }
}
