/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Sequential, unbounded multi-source labelings.

use crate::seeds::Seeds;
use crate::traits::Label;
use std::collections::VecDeque;
use webgraph::traits::RandomAccessGraph;

/// The exact distances from every seed to every node, computed by a single
/// sequential breadth-first visit on pairs (node, seed).
///
/// Since all seeds start at distance zero, pairs are dequeued in
/// nondecreasing order of distance, so the first arrival of each seed at
/// each node happens along a shortest path. Memory usage is proportional to
/// the number of reachable pairs, so this structure is meant for testing and
/// for small graphs.
///
/// # Examples
///
/// ```
/// use cluster_bfs::seeds::Seeds;
/// use cluster_bfs::seq::SeqLabels;
/// use webgraph::graphs::vec_graph::VecGraph;
///
/// let graph = VecGraph::from_arcs([(0, 1), (1, 2), (3, 2)]);
/// let seq = SeqLabels::compute(&graph, &Seeds::<u64>::new([0, 3])?);
/// assert_eq!(seq.dist(), &[0, 1, 1, 0]);
/// assert_eq!(seq.arrivals(2), &[(1, 1), (0, 2)]);
/// # Ok::<(), cluster_bfs::seeds::SeedError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SeqLabels {
    dist: Vec<usize>,
    arrivals: Vec<Vec<(usize, usize)>>,
}

impl SeqLabels {
    /// Computes the exact distances from `seeds` along the arcs of `graph`.
    pub fn compute<L: Label>(graph: &impl RandomAccessGraph, seeds: &Seeds<L>) -> Self {
        let num_nodes = graph.num_nodes();
        let mut seen = vec![L::ZERO; num_nodes];
        let mut dist = vec![usize::MAX; num_nodes];
        let mut arrivals = vec![vec![]; num_nodes];
        let mut queue = VecDeque::new();

        for (bit, node) in seeds.iter() {
            seen[node] |= L::bit(bit);
            dist[node] = 0;
            arrivals[node].push((bit, 0));
            queue.push_back((node, bit, 0));
        }

        while let Some((node, bit, d)) = queue.pop_front() {
            for succ in graph.successors(node) {
                if !seen[succ].contains(bit) {
                    seen[succ] |= L::bit(bit);
                    dist[succ] = dist[succ].min(d + 1);
                    arrivals[succ].push((bit, d + 1));
                    queue.push_back((succ, bit, d + 1));
                }
            }
        }

        Self { dist, arrivals }
    }

    /// Returns the distance of each node from the nearest seed, or
    /// `usize::MAX` for unreachable nodes.
    pub fn dist(&self) -> &[usize] {
        &self.dist
    }

    /// Returns the pairs (bit, distance) of the seeds reaching `node`, in
    /// nondecreasing order of distance.
    pub fn arrivals(&self, node: usize) -> &[(usize, usize)] {
        &self.arrivals[node]
    }

    /// Returns the distance from the seed bound to `bit` to `node`, if
    /// the seed reaches the node.
    pub fn seed_dist(&self, node: usize, bit: usize) -> Option<usize> {
        self.arrivals[node]
            .iter()
            .find(|&&(b, _)| b == bit)
            .map(|&(_, d)| d)
    }
}
