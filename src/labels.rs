/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::{Distance, Label};
use rayon::prelude::*;

/// The output of a [cluster BFS](crate::cluster_bfs::cluster_bfs).
///
/// For each node *v*, the structure stores the round *D*[*v*] at which *v*
/// has been reached by some seed for the first time
/// ([`Distance::INF`] if *v* is not reachable from any seed), and an
/// array of [radius](Self::radius) round labels *S*[*v*][*r*] containing the
/// set of seeds whose first arrival at *v* happens at round *D*[*v*] + *r*.
///
/// Round labels are stored in a single arena of *n* · *R* labels allocated
/// at construction, and never resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLabels<D: Distance = u8, L: Label = u64> {
    radius: usize,
    dist: Box<[D]>,
    rounds: Box<[L]>,
}

impl<D: Distance, L: Label> ClusterLabels<D, L> {
    /// Creates labels for a graph with `num_nodes` nodes recording `radius`
    /// rounds past the first discovery of each node.
    ///
    /// All nodes start unreached.
    ///
    /// # Panics
    ///
    /// If `radius` is zero.
    pub fn new(num_nodes: usize, radius: usize) -> Self {
        assert!(radius > 0, "The radius must be positive");
        Self {
            radius,
            dist: vec![D::INF; num_nodes].into_boxed_slice(),
            rounds: vec![L::ZERO; num_nodes * radius].into_boxed_slice(),
        }
    }

    /// Marks all nodes as unreached, in parallel.
    pub(crate) fn par_reset(&mut self) {
        self.dist.par_iter_mut().for_each(|d| *d = D::INF);
        self.rounds.par_iter_mut().for_each(|s| *s = L::ZERO);
    }

    pub fn num_nodes(&self) -> usize {
        self.dist.len()
    }

    /// Returns the number *R* of recorded rounds per node.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Returns the distance of `node` from the nearest seed, or
    /// [`Distance::INF`] if it is not reachable.
    #[inline(always)]
    pub fn dist(&self, node: usize) -> D {
        self.dist[node]
    }

    /// Returns the distances of all nodes from the nearest seed.
    pub fn dists(&self) -> &[D] {
        &self.dist
    }

    /// Returns the [radius](Self::radius) round labels of `node`.
    #[inline(always)]
    pub fn round_labels(&self, node: usize) -> &[L] {
        &self.rounds[node * self.radius..(node + 1) * self.radius]
    }

    /// Returns the set of seeds reaching `node` within the recorded rounds.
    pub fn reached(&self, node: usize) -> L {
        self.round_labels(node)
            .iter()
            .fold(L::ZERO, |sum, &label| sum | label)
    }

    /// Returns the first relative round at which the seed bound to `bit`
    /// reaches `node`, if it does so within the recorded rounds.
    pub fn relative_round(&self, node: usize, bit: usize) -> Option<usize> {
        let mut sum = L::ZERO;
        for (r, &label) in self.round_labels(node).iter().enumerate() {
            sum |= label;
            if sum.contains(bit) {
                return Some(r);
            }
        }
        None
    }

    /// Returns the distance from the seed bound to `bit` to `node`, if the
    /// seed reaches the node within the recorded rounds.
    pub fn query(&self, node: usize, bit: usize) -> Option<usize> {
        let d = self.dist[node];
        if d.is_inf() {
            return None;
        }
        self.relative_round(node, bit).map(|r| d.to_usize() + r)
    }

    /// Returns mutable views of the distances and of the round-label arena.
    pub(crate) fn parts_mut(&mut self) -> (&mut [D], &mut [L]) {
        (&mut self.dist, &mut self.rounds)
    }
}
