/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::VertexSubset;
use parallel_frontier::Frontier;
use rayon::{prelude::*, ThreadPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use sux::bits::AtomicBitVec;
use webgraph::traits::RandomAccessGraph;
use webgraph::utils::Granularity;

/// A direction-optimizing edge map.
///
/// Given a frontier *F*, [`run`](EdgeMap::run) returns the set of nodes *v*
/// such that for some arc (*u*, *v*) with *u* ∈ *F* the condition `cond_f(v)`
/// holds and the edge function `edge_f(u, v)` returns true.
///
/// The edge function is invoked at least once on each arc (*u*, *v*) with
/// *u* ∈ *F* and `cond_f(v)` true: in particular, the dense step evaluates it
/// on all such arcs entering a node, even after one of them has returned
/// true, so side effects of the edge function are never skipped. Since
/// evaluations happen concurrently, the edge function must be idempotent
/// and thread safe, and it should return true at most once per target
/// node if duplicates in sparse frontiers are undesirable.
///
/// `transpose` must be the transpose of `graph`; for symmetric graphs, the
/// graph itself can be used.
///
/// # Examples
///
/// ```
/// use cluster_bfs::engine::{EdgeMap, VertexSubset};
/// use cluster_bfs::thread_pool;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use webgraph::graphs::vec_graph::VecGraph;
///
/// let graph = VecGraph::from_arcs([(0, 1), (0, 2), (1, 3), (2, 3)]);
/// let transpose = VecGraph::from_arcs([(1, 0), (2, 0), (3, 1), (3, 2)]);
/// let visited: Vec<AtomicBool> = (0..4).map(|node| AtomicBool::new(node == 0)).collect();
///
/// let edge_map = EdgeMap::new(
///     &graph,
///     &transpose,
///     |_, v| !visited[v].swap(true, Ordering::Relaxed),
///     |v| !visited[v].load(Ordering::Relaxed),
/// );
///
/// let thread_pool = thread_pool![];
/// let frontier = VertexSubset::from_nodes(vec![0], &thread_pool);
/// let frontier = edge_map.run(frontier, &thread_pool);
/// let mut nodes = frontier.to_vec();
/// nodes.sort();
/// assert_eq!(nodes, vec![1, 2]);
/// let frontier = edge_map.run(frontier, &thread_pool);
/// assert_eq!(frontier.to_vec(), vec![3]);
/// ```
pub struct EdgeMap<'a, G1, G2, E, C> {
    graph: &'a G1,
    transpose: &'a G2,
    edge_f: E,
    cond_f: C,
    num_nodes: usize,
    num_arcs: u64,
    granularity: usize,
}

impl<'a, G1, G2, E, C> EdgeMap<'a, G1, G2, E, C>
where
    G1: RandomAccessGraph + Sync,
    G2: RandomAccessGraph + Sync,
    E: Fn(usize, usize) -> bool + Sync,
    C: Fn(usize) -> bool + Sync,
{
    /// Creates an edge map with a default granularity of 128 nodes.
    ///
    /// # Arguments
    ///
    /// * `graph`: the graph.
    ///
    /// * `transpose`: the transpose of `graph`.
    ///
    /// * `edge_f`: the edge function.
    ///
    /// * `cond_f`: the condition on targets.
    pub fn new(graph: &'a G1, transpose: &'a G2, edge_f: E, cond_f: C) -> Self {
        Self::with_granularity(graph, transpose, edge_f, cond_f, Granularity::Nodes(128))
    }

    /// Creates an edge map with a given granularity.
    ///
    /// High granularity reduces overhead, but may lead to decreased
    /// performance on graphs with a skewed outdegree distribution.
    pub fn with_granularity(
        graph: &'a G1,
        transpose: &'a G2,
        edge_f: E,
        cond_f: C,
        granularity: Granularity,
    ) -> Self {
        let num_nodes = graph.num_nodes();
        let num_arcs = graph.num_arcs();
        debug_assert_eq!(num_nodes, transpose.num_nodes());
        Self {
            graph,
            transpose,
            edge_f,
            cond_f,
            num_nodes,
            num_arcs,
            granularity: granularity.node_granularity(num_nodes, Some(num_arcs)).max(1),
        }
    }

    /// Returns the node granularity used for parallel tasks.
    pub fn granularity(&self) -> usize {
        self.granularity
    }

    /// Computes the next frontier.
    ///
    /// A sparse frontier is processed sparsely unless its size plus the sum
    /// of the outdegrees of its nodes exceeds a tenth of the number of arcs;
    /// a dense frontier is processed densely if it contains more than a
    /// twentieth of the nodes. The representation of the result is the one
    /// used for processing.
    pub fn run<'b>(
        &self,
        frontier: VertexSubset<'b>,
        thread_pool: &'b ThreadPool,
    ) -> VertexSubset<'b> {
        match frontier {
            VertexSubset::Sparse(ref nodes) => {
                let outdegrees: u64 = thread_pool.install(|| {
                    nodes
                        .par_iter()
                        .map(|&node| self.graph.outdegree(node) as u64)
                        .sum()
                });
                if nodes.len() as u64 + outdegrees > self.num_arcs / 10 {
                    let frontier = frontier.into_dense(self.num_nodes, thread_pool);
                    self.dense(&frontier, thread_pool)
                } else {
                    self.sparse(nodes, thread_pool)
                }
            }
            VertexSubset::Dense { len, .. } => {
                if len > self.num_nodes / 20 {
                    self.dense(&frontier, thread_pool)
                } else {
                    let frontier = frontier.into_sparse(self.granularity, thread_pool);
                    match frontier {
                        VertexSubset::Sparse(ref nodes) => self.sparse(nodes, thread_pool),
                        VertexSubset::Dense { .. } => unreachable!(),
                    }
                }
            }
        }
    }

    /// Pushes along the arcs leaving the frontier.
    fn sparse<'b>(
        &self,
        frontier: &Frontier<'_, usize>,
        thread_pool: &'b ThreadPool,
    ) -> VertexSubset<'b> {
        let next = Frontier::with_threads(thread_pool, None);
        thread_pool.install(|| {
            frontier
                .par_iter()
                .chunks(self.granularity)
                .for_each(|chunk| {
                    chunk.into_iter().for_each(|&node| {
                        for succ in self.graph.successors(node) {
                            if (self.cond_f)(succ) && (self.edge_f)(node, succ) {
                                next.push(succ);
                            }
                        }
                    })
                })
        });
        VertexSubset::Sparse(next)
    }

    /// Pulls, for each node satisfying the condition, from its predecessors
    /// in the frontier.
    fn dense<'b>(
        &self,
        frontier: &VertexSubset<'_>,
        thread_pool: &ThreadPool,
    ) -> VertexSubset<'b> {
        let VertexSubset::Dense { bits, .. } = frontier else {
            unreachable!()
        };
        let next = AtomicBitVec::new(self.num_nodes);
        let len = AtomicUsize::new(0);
        thread_pool.install(|| {
            (0..self.num_nodes)
                .into_par_iter()
                .with_min_len(self.granularity)
                .for_each(|node| {
                    if !(self.cond_f)(node) {
                        return;
                    }
                    let mut reached = false;
                    for pred in self.transpose.successors(node) {
                        if bits.get(pred, Ordering::Relaxed) {
                            reached |= (self.edge_f)(pred, node);
                        }
                    }
                    if reached {
                        next.set(node, true, Ordering::Relaxed);
                        len.fetch_add(1, Ordering::Relaxed);
                    }
                })
        });
        VertexSubset::from_bits(next, self.num_nodes, len.into_inner())
    }
}
