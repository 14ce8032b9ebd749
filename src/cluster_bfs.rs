/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Bounded-radius bit-parallel multi-source breadth-first labelings.
//!
//! A *cluster BFS* starts a breadth-first visit from up to [`Label::BITS`]
//! seeds at the same time. Each seed is bound to one bit of a label, and
//! labels are propagated synchronously, round by round, along the arcs of
//! the graph: at the end of round *k*, a node knows exactly which seeds are
//! at distance at most *k* from it.
//!
//! Recording the full history would require a label per node per round, so
//! the history of each node is frozen after a fixed number *R* of rounds
//! past its first discovery: the output (a [`ClusterLabels`]) contains the
//! distance *D*[*v*] from the nearest seed and, for 0 ≤ *r* < *R*, the set
//! *S*[*v*][*r*] of seeds whose first arrival at *v* happens at round
//! *D*[*v*] + *r*. For each seed *i* reaching *v* within *D*[*v*] + *R* − 1
//! hops, the distance from *i* to *v* can thus be reconstructed exactly
//! (see [`ClusterLabels::query`]).
//!
//! The visit is driven by a direction-optimizing [`EdgeMap`]; the state
//! merged during a round is stored in atomic labels, and no locks are used.

use crate::engine::{EdgeMap, VertexSubset};
use crate::labels::ClusterLabels;
use crate::seeds::Seeds;
use crate::traits::{AtomicLabel, Distance, Label};
use anyhow::{ensure, Result};
use dsi_progress_logger::ProgressLog;
use rayon::{prelude::*, ThreadPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use sync_cell_slice::SyncSlice;
use webgraph::traits::RandomAccessGraph;
use webgraph::utils::Granularity;

/// Statistics about a run of [`cluster_bfs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterBfsStats {
    /// The number of rounds, that is, the number of non-empty frontiers.
    pub rounds: usize,
    /// The sum of the sizes of all frontiers.
    ///
    /// Since a node can be part of up to *R* frontiers after its discovery,
    /// this number can be larger than the number of nodes.
    pub visited_nodes: usize,
}

/// Computes a cluster BFS labeling of a symmetric graph.
///
/// The graph is used both as forward and as backward view, so the arcs are
/// followed in both directions only if the graph is symmetric. Use
/// [`cluster_bfs_with_transpose`] for directed graphs.
///
/// The labels are reset at the start of the computation, so the same
/// instance can be reused for multiple seed sets.
///
/// # Arguments
///
/// * `graph`: the graph.
///
/// * `seeds`: the seeds; the seed at position *i* is bound to bit *i*.
///
/// * `labels`: where the labeling will be stored; its radius is the number
///   of rounds recorded after the discovery of each node.
///
/// * `thread_pool`: the thread pool to use.
///
/// * `pl`: a progress logger, updated once per round.
///
/// # Errors
///
/// If a seed is not a node of the graph, or if `labels` has not been
/// created for a graph with the same number of nodes.
///
/// # Panics
///
/// If the number of rounds reaches [`Distance::INF`]: the distance type
/// must be wide enough to represent the eccentricity of the seeds plus the
/// radius.
///
/// # Examples
///
/// ```
/// use cluster_bfs::prelude::*;
/// use cluster_bfs::thread_pool;
/// use dsi_progress_logger::no_logging;
/// use webgraph::graphs::vec_graph::VecGraph;
///
/// // The undirected path 0 - 1 - 2 - 3 - 4
/// let graph = VecGraph::from_arcs([
///     (0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (3, 2), (3, 4), (4, 3),
/// ]);
/// let seeds = Seeds::<u64>::new([0, 4])?;
/// let mut labels = ClusterLabels::<u8, u64>::new(5, 3);
///
/// cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;
///
/// assert_eq!(labels.dists(), &[0, 1, 2, 1, 0]);
/// assert_eq!(labels.round_labels(2)[0], 0b11);
/// assert_eq!(labels.query(1, 1), Some(3));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cluster_bfs<D: Distance, L: Label>(
    graph: &(impl RandomAccessGraph + Sync),
    seeds: &Seeds<L>,
    labels: &mut ClusterLabels<D, L>,
    thread_pool: &ThreadPool,
    pl: &mut impl ProgressLog,
) -> Result<ClusterBfsStats> {
    cluster_bfs_with_transpose(graph, graph, seeds, labels, thread_pool, pl)
}

/// Computes a cluster BFS labeling of a graph, given its transpose.
///
/// Labels are propagated along the arcs of `graph`; `transpose` is used
/// only when the engine processes a large frontier by scanning
/// predecessors. See [`cluster_bfs`] for the other arguments.
pub fn cluster_bfs_with_transpose<D: Distance, L: Label>(
    graph: &(impl RandomAccessGraph + Sync),
    transpose: &(impl RandomAccessGraph + Sync),
    seeds: &Seeds<L>,
    labels: &mut ClusterLabels<D, L>,
    thread_pool: &ThreadPool,
    pl: &mut impl ProgressLog,
) -> Result<ClusterBfsStats> {
    cluster_bfs_with_granularity(
        graph,
        transpose,
        seeds,
        labels,
        Granularity::Nodes(128),
        thread_pool,
        pl,
    )
}

/// Computes a cluster BFS labeling of a graph, given its transpose and the
/// granularity of parallel tasks.
///
/// High granularity reduces overhead, but may lead to decreased performance
/// on graphs with a skewed outdegree distribution.
pub fn cluster_bfs_with_granularity<D: Distance, L: Label>(
    graph: &(impl RandomAccessGraph + Sync),
    transpose: &(impl RandomAccessGraph + Sync),
    seeds: &Seeds<L>,
    labels: &mut ClusterLabels<D, L>,
    granularity: Granularity,
    thread_pool: &ThreadPool,
    pl: &mut impl ProgressLog,
) -> Result<ClusterBfsStats> {
    let num_nodes = graph.num_nodes();
    ensure!(
        transpose.num_nodes() == num_nodes,
        "The transpose has {} nodes, but the graph has {} nodes",
        transpose.num_nodes(),
        num_nodes
    );
    ensure!(
        labels.num_nodes() == num_nodes,
        "The labels have been created for {} nodes, but the graph has {} nodes",
        labels.num_nodes(),
        num_nodes
    );
    for (bit, node) in seeds.iter() {
        ensure!(
            node < num_nodes,
            "Seed {} (bit {}) is not a node: the graph has {} nodes",
            node,
            bit,
            num_nodes
        );
    }
    let radius = labels.radius();
    ensure!(radius > 0, "The radius must be positive");

    let node_granularity = granularity
        .node_granularity(num_nodes, Some(graph.num_arcs()))
        .max(1);

    pl.item_name("round");
    pl.expected_updates(None);
    pl.start(format!(
        "Computing cluster BFS labels from {} seeds with radius {}...",
        seeds.len(),
        radius
    ));

    // settled[v]: seeds that have reached v in completed rounds
    // reaching[v]: seeds that have reached v up to the current round
    // claimed[v]: the last round in which v entered the next frontier
    let (settled, reaching, claimed) = thread_pool.install(|| {
        labels.par_reset();
        let settled: Box<[L::Atomic]> = (0..num_nodes)
            .into_par_iter()
            .map(|_| L::Atomic::new(L::ZERO))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let reaching: Box<[L::Atomic]> = (0..num_nodes)
            .into_par_iter()
            .map(|_| L::Atomic::new(L::ZERO))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let claimed: Box<[AtomicUsize]> = (0..num_nodes)
            .into_par_iter()
            .map(|_| AtomicUsize::new(usize::MAX))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        (settled, reaching, claimed)
    });

    for (bit, node) in seeds.iter() {
        reaching[node].fetch_or(L::bit(bit), Ordering::Relaxed);
    }

    let (dist, rounds) = labels.parts_mut();
    let dist = dist.as_sync_slice();
    let rounds = rounds.as_sync_slice();

    let mut frontier = VertexSubset::from_nodes(seeds.distinct_nodes(), thread_pool);
    let mut stats = ClusterBfsStats::default();
    let mut round = 0;

    while !frontier.is_empty() {
        assert!(
            round < D::INF.to_usize(),
            "Round {} does not fit in a distance of {} bits",
            round,
            D::BITS
        );
        log::debug!(
            "Round {}: {} nodes in the {} frontier",
            round,
            frontier.len(),
            if frontier.is_dense() { "dense" } else { "sparse" }
        );
        stats.rounds += 1;
        stats.visited_nodes += frontier.len();

        // Freeze the seeds that arrived during the last round
        frontier.par_apply(
            |node| {
                let settled_bits = settled[node].load(Ordering::Relaxed);
                let new_bits = reaching[node].load(Ordering::Relaxed) & !settled_bits;
                // SAFETY: each node appears at most once in a frontier
                let d = unsafe {
                    let mut d = dist[node].get();
                    if d.is_inf() {
                        d = D::from_usize(round);
                        dist[node].set(d);
                    }
                    d
                };
                let r = round - d.to_usize();
                debug_assert!(r < radius);
                unsafe { rounds[node * radius + r].set(new_bits) };
                settled[node].store(settled_bits | new_bits, Ordering::Relaxed);
            },
            node_granularity,
            thread_pool,
        );

        round += 1;

        let edge_map = EdgeMap::with_granularity(
            graph,
            transpose,
            |src: usize, dst: usize| {
                let src_bits = settled[src].load(Ordering::Relaxed);
                let dst_bits = reaching[dst].load(Ordering::Relaxed);
                if src_bits | dst_bits == dst_bits {
                    return false;
                }
                reaching[dst].fetch_or(src_bits, Ordering::Relaxed);
                let token = claimed[dst].load(Ordering::Relaxed);
                token != round
                    && claimed[dst]
                        .compare_exchange(token, round, Ordering::Relaxed, Ordering::Relaxed)
                        .is_ok()
            },
            |node: usize| {
                // SAFETY: distances are not written during relaxation
                let d = unsafe { dist[node].get() };
                d.is_inf() || round - d.to_usize() < radius
            },
            Granularity::Nodes(node_granularity),
        );

        frontier = edge_map.run(frontier, thread_pool);
        pl.update();
    }

    pl.done();
    log::info!(
        "Completed {} rounds visiting {} nodes",
        stats.rounds,
        stats.visited_nodes
    );

    Ok(stats)
}
