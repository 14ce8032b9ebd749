/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Selection of seed batches.
//!
//! A labeling from a batch of seeds that are close to each other gives
//! accurate distance estimates, as each seed can stand in for the others.
//! The functions in this module select *star* batches: a random center of
//! sufficiently high degree, followed by nodes of its neighborhood.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use webgraph::traits::RandomAccessGraph;

/// Selects up to `num_batches` star batches of at most `batch_size` seeds.
///
/// Nodes are shuffled in a random order. Candidate centers are considered
/// in this order, and retained if their outdegree is at least `batch_size`
/// (if `hops` is one) or at least ln(`batch_size`) (otherwise). Each batch
/// contains its center followed by up to `batch_size` − 1 distinct nodes at
/// distance at most `hops` from the center, taken in the same random order.
///
/// Batches have no padding: a batch can be shorter than `batch_size` if the
/// neighborhood of its center is small. Use [`pad_with_center`] to obtain
/// fixed-size batches. Fewer than `num_batches` batches are returned if
/// there are not enough candidate centers.
///
/// # Panics
///
/// If `batch_size` or `hops` is zero.
///
/// # Examples
///
/// ```
/// use cluster_bfs::select::star_seeds;
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use webgraph::graphs::vec_graph::VecGraph;
///
/// let graph = VecGraph::from_arcs([(0, 1), (0, 2), (0, 3), (1, 0), (2, 0), (3, 0)]);
/// // Only the center has outdegree at least three
/// let batches = star_seeds(&graph, 3, 10, 1, &mut SmallRng::seed_from_u64(0));
/// assert_eq!(batches.len(), 1);
/// assert_eq!(batches[0][0], 0);
/// assert_eq!(batches[0].len(), 3);
/// ```
pub fn star_seeds<R: Rng + ?Sized>(
    graph: &impl RandomAccessGraph,
    batch_size: usize,
    num_batches: usize,
    hops: usize,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    assert!(batch_size > 0, "The batch size must be positive");
    assert!(hops > 0, "The number of hops must be positive");

    let num_nodes = graph.num_nodes();
    let mut order = (0..num_nodes).collect::<Vec<_>>();
    order.shuffle(rng);
    let mut rank = vec![0; num_nodes];
    for (i, &node) in order.iter().enumerate() {
        rank[node] = i;
    }

    let min_degree = if hops == 1 {
        batch_size
    } else {
        (batch_size as f64).ln() as usize
    };

    let mut dists = vec![usize::MAX; num_nodes];
    let mut queue = VecDeque::new();
    let mut batches = Vec::with_capacity(num_batches);

    for &center in &order {
        if batches.len() == num_batches {
            break;
        }
        if graph.outdegree(center) < min_degree {
            continue;
        }
        let mut neighborhood = ball(graph, center, hops, &mut dists, &mut queue);
        neighborhood.sort_unstable_by_key(|&node| rank[node]);
        let mut batch = Vec::with_capacity(batch_size);
        batch.push(center);
        batch.extend(neighborhood.into_iter().take(batch_size - 1));
        batches.push(batch);
    }

    log::info!(
        "Selected {} batches of at most {} seeds within {} hops",
        batches.len(),
        batch_size,
        hops
    );
    batches
}

/// Pads a batch to `batch_size` seeds by repeating its first element.
///
/// The result can be registered with
/// [`Seeds::from_padded`](crate::seeds::Seeds::from_padded).
pub fn pad_with_center(batch: &[usize], batch_size: usize) -> Vec<usize> {
    let mut padded = batch.to_vec();
    if let Some(&center) = batch.first() {
        padded.resize(batch_size.max(batch.len()), center);
    }
    padded
}

/// Returns the nodes at distance between one and `hops` from `center`.
///
/// `dists` must be filled with `usize::MAX`, and it is restored before
/// returning.
fn ball(
    graph: &impl RandomAccessGraph,
    center: usize,
    hops: usize,
    dists: &mut [usize],
    queue: &mut VecDeque<usize>,
) -> Vec<usize> {
    let mut visited = vec![center];
    dists[center] = 0;
    queue.clear();
    queue.push_back(center);
    while let Some(node) = queue.pop_front() {
        let d = dists[node];
        if d == hops {
            continue;
        }
        for succ in graph.successors(node) {
            if dists[succ] == usize::MAX {
                dists[succ] = d + 1;
                visited.push(succ);
                queue.push_back(succ);
            }
        }
    }
    for &node in &visited {
        dists[node] = usize::MAX;
    }
    visited.swap_remove(0);
    visited
}
