/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use parallel_frontier::Frontier;
use rayon::{prelude::*, ThreadPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use sux::bits::AtomicBitVec;

/// A set of nodes, stored either sparsely or densely.
///
/// Sparse subsets borrow the thread pool whose threads index their parts.
pub enum VertexSubset<'a> {
    /// A list of nodes, split among the threads that produced it.
    Sparse(Frontier<'a, usize>),
    /// A bit vector with one bit per node of the graph.
    Dense {
        bits: AtomicBitVec,
        /// The number of nodes of the graph.
        num_nodes: usize,
        /// The number of bits set.
        len: usize,
    },
}

impl<'a> VertexSubset<'a> {
    /// Creates an empty sparse subset whose parts are indexed by the
    /// threads of `thread_pool`.
    pub fn empty(thread_pool: &'a ThreadPool) -> Self {
        VertexSubset::Sparse(Frontier::with_threads(thread_pool, None))
    }

    /// Creates a sparse subset containing the given nodes.
    pub fn from_nodes(nodes: Vec<usize>, thread_pool: &'a ThreadPool) -> Self {
        let mut frontier = Frontier::with_threads(thread_pool, None);
        frontier.as_mut()[0] = nodes;
        VertexSubset::Sparse(frontier)
    }

    /// Creates a dense subset from a bit vector of `num_nodes` bits and its
    /// number of ones.
    pub fn from_bits(bits: AtomicBitVec, num_nodes: usize, len: usize) -> Self {
        VertexSubset::Dense {
            bits,
            num_nodes,
            len,
        }
    }

    /// Adds nodes to the subset.
    ///
    /// For sparse subsets nodes are appended, so the caller is responsible
    /// for not adding a node twice; dense subsets ignore nodes that are
    /// already present.
    pub fn add_vertices(&mut self, nodes: &[usize]) {
        match self {
            VertexSubset::Sparse(frontier) => frontier.as_mut()[0].extend_from_slice(nodes),
            VertexSubset::Dense { bits, len, .. } => {
                for &node in nodes {
                    if !bits.swap(node, true, Ordering::Relaxed) {
                        *len += 1;
                    }
                }
            }
        }
    }

    /// Returns the number of nodes in the subset.
    pub fn len(&self) -> usize {
        match self {
            VertexSubset::Sparse(frontier) => frontier.len(),
            VertexSubset::Dense { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, VertexSubset::Dense { .. })
    }

    /// Applies `f` in parallel to every node of the subset.
    pub fn par_apply<F: Fn(usize) + Sync>(
        &self,
        f: F,
        granularity: usize,
        thread_pool: &ThreadPool,
    ) {
        thread_pool.install(|| match self {
            VertexSubset::Sparse(frontier) => frontier
                .par_iter()
                .chunks(granularity)
                .for_each(|chunk| chunk.into_iter().for_each(|&node| f(node))),
            VertexSubset::Dense {
                bits, num_nodes, ..
            } => (0..*num_nodes)
                .into_par_iter()
                .with_min_len(granularity)
                .filter(|&node| bits.get(node, Ordering::Relaxed))
                .for_each(&f),
        })
    }

    /// Returns the nodes of the subset in a vector.
    ///
    /// Dense subsets return nodes in increasing order.
    pub fn to_vec(&self) -> Vec<usize> {
        match self {
            VertexSubset::Sparse(frontier) => frontier.par_iter().copied().collect(),
            VertexSubset::Dense {
                bits, num_nodes, ..
            } => (0..*num_nodes)
                .into_par_iter()
                .filter(|&node| bits.get(node, Ordering::Relaxed))
                .collect(),
        }
    }

    /// Converts the subset to a dense representation on `num_nodes` nodes.
    pub fn into_dense(self, num_nodes: usize, thread_pool: &ThreadPool) -> Self {
        match self {
            VertexSubset::Sparse(frontier) => {
                let bits = AtomicBitVec::new(num_nodes);
                let len = AtomicUsize::new(0);
                thread_pool.install(|| {
                    frontier.par_iter().for_each(|&node| {
                        if !bits.swap(node, true, Ordering::Relaxed) {
                            len.fetch_add(1, Ordering::Relaxed);
                        }
                    })
                });
                VertexSubset::Dense {
                    bits,
                    num_nodes,
                    len: len.into_inner(),
                }
            }
            dense => dense,
        }
    }

    /// Converts the subset to a sparse representation.
    pub fn into_sparse(self, granularity: usize, thread_pool: &'a ThreadPool) -> Self {
        match self {
            VertexSubset::Dense {
                bits, num_nodes, ..
            } => {
                let frontier = Frontier::with_threads(thread_pool, None);
                thread_pool.install(|| {
                    (0..num_nodes)
                        .into_par_iter()
                        .with_min_len(granularity)
                        .filter(|&node| bits.get(node, Ordering::Relaxed))
                        .for_each(|node| frontier.push(node))
                });
                VertexSubset::Sparse(frontier)
            }
            sparse => sparse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread_pool;

    #[test]
    fn test_sparse_dense() {
        let thread_pool = thread_pool![2];
        let mut subset = VertexSubset::from_nodes(vec![3, 1], &thread_pool);
        subset.add_vertices(&[7]);
        assert_eq!(subset.len(), 3);
        assert!(!subset.is_dense());

        let mut subset = subset.into_dense(10, &thread_pool);
        assert!(subset.is_dense());
        assert_eq!(subset.len(), 3);
        subset.add_vertices(&[1, 2]);
        assert_eq!(subset.len(), 4);
        assert_eq!(subset.to_vec(), vec![1, 2, 3, 7]);

        let subset = subset.into_sparse(1, &thread_pool);
        assert!(!subset.is_dense());
        let mut nodes = subset.to_vec();
        nodes.sort();
        assert_eq!(nodes, vec![1, 2, 3, 7]);
    }

    #[test]
    fn test_par_apply() {
        let thread_pool = thread_pool![3];
        let sum = AtomicUsize::new(0);
        let subset = VertexSubset::from_nodes((0..100).collect(), &thread_pool);
        subset.par_apply(
            |node| {
                sum.fetch_add(node, Ordering::Relaxed);
            },
            8,
            &thread_pool,
        );
        assert_eq!(sum.load(Ordering::Relaxed), 4950);

        let subset = subset.into_dense(100, &thread_pool);
        sum.store(0, Ordering::Relaxed);
        subset.par_apply(
            |node| {
                sum.fetch_add(node, Ordering::Relaxed);
            },
            8,
            &thread_pool,
        );
        assert_eq!(sum.load(Ordering::Relaxed), 4950);
        assert!(VertexSubset::empty(&thread_pool).is_empty());
    }
}
