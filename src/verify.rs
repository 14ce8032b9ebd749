/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Verification of cluster BFS labelings against exact distances.

use crate::labels::ClusterLabels;
use crate::seeds::Seeds;
use crate::traits::{Distance, Label};
use dsi_progress_logger::ProgressLog;
use std::collections::VecDeque;
use thiserror::Error;
use webgraph::traits::RandomAccessGraph;

/// A labeling is inconsistent with the exact distances from its seeds.
///
/// Variants describing a node carry the per-round labels of the node, in
/// binary, as a trace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("The labels have {labels} nodes, but the graph has {graph} nodes")]
    NodeCount { labels: usize, graph: usize },
    #[error("Seed {seed} (bit {bit}) is not a node of the graph")]
    SeedOutOfRange { seed: usize, bit: usize },
    #[error(
        "Node {node} is at distance {true_dist} from seed {seed} (bit {bit}), but it is marked as unreachable"
    )]
    Unreached {
        seed: usize,
        bit: usize,
        node: usize,
        true_dist: usize,
    },
    #[error(
        "Node {node} is at distance {true_dist} from seed {seed} (bit {bit}), but the labels give distance {found} (D = {dist}, labels: {trace})"
    )]
    Mismatch {
        seed: usize,
        bit: usize,
        node: usize,
        true_dist: usize,
        found: usize,
        dist: usize,
        trace: String,
    },
    #[error(
        "Node {node} is at distance {true_dist} from seed {seed} (bit {bit}), which is within the radius {radius} from D = {dist}, but the seed does not appear in the labels ({trace})"
    )]
    Missing {
        seed: usize,
        bit: usize,
        node: usize,
        true_dist: usize,
        dist: usize,
        radius: usize,
        trace: String,
    },
    #[error(
        "Node {node} is at distance {true_dist} from seed {seed} (bit {bit}), which is not within {slack} from D = {dist} (labels: {trace})"
    )]
    OutOfRange {
        seed: usize,
        bit: usize,
        node: usize,
        true_dist: usize,
        dist: usize,
        slack: usize,
        trace: String,
    },
}

/// Returns the slack accepted between the distance of a node from a seed
/// that does not appear in its labels and the distance from the nearest
/// seed, that is, 2⌊(*R* + 1) / 2⌋.
pub fn slack(radius: usize) -> usize {
    2 * ((radius + 1) / 2)
}

/// Checks a labeling computed by [`cluster_bfs`](crate::cluster_bfs::cluster_bfs)
/// against exact distances.
///
/// For each seed, exact distances are computed by a sequential breadth-first
/// visit. Then, for each node *v* reachable from the seed:
///
/// - if the bit of the seed appears in the round labels of *v*, the first
///   relative round *r* in which it appears must satisfy *D*[*v*] + *r* =
///   *d*, where *d* is the exact distance;
///
/// - otherwise, *d* must be at least *D*[*v*] + *R*, as a seed within the
///   recorded rounds must appear in the labels, and at most *D*[*v*] +
///   2⌊(*R* + 1) / 2⌋ (see [`slack`]).
///
/// Nodes that are not reachable from the seed are skipped. The upper bound
/// in the second condition holds when the seeds are pairwise close, as it happens for
/// [star seeds](crate::select::star_seeds); for arbitrary seeds, labelings
/// can fail verification even if they are correct.
///
/// Verification stops at the first inconsistency, which is returned.
pub fn verify<D: Distance, L: Label>(
    graph: &impl RandomAccessGraph,
    seeds: &Seeds<L>,
    labels: &ClusterLabels<D, L>,
    pl: &mut impl ProgressLog,
) -> Result<(), VerifyError> {
    let num_nodes = graph.num_nodes();
    if labels.num_nodes() != num_nodes {
        return Err(VerifyError::NodeCount {
            labels: labels.num_nodes(),
            graph: num_nodes,
        });
    }
    let radius = labels.radius();
    let slack = slack(radius);
    let trace = |node: usize| {
        labels
            .round_labels(node)
            .iter()
            .map(|label| format!("{:b}", label))
            .collect::<Vec<_>>()
            .join(" ")
    };

    pl.item_name("seed");
    pl.expected_updates(Some(seeds.len()));
    pl.start("Verifying labels...");

    let mut true_dists = vec![usize::MAX; num_nodes];
    let mut queue = VecDeque::new();

    for (bit, seed) in seeds.iter() {
        if seed >= num_nodes {
            return Err(VerifyError::SeedOutOfRange { seed, bit });
        }
        bfs_from(graph, seed, &mut true_dists, &mut queue);

        for (node, &true_dist) in true_dists.iter().enumerate() {
            if true_dist == usize::MAX {
                continue;
            }
            let d = labels.dist(node);
            if d.is_inf() {
                return Err(VerifyError::Unreached {
                    seed,
                    bit,
                    node,
                    true_dist,
                });
            }
            let dist = d.to_usize();
            match labels.relative_round(node, bit) {
                Some(r) => {
                    if dist + r != true_dist {
                        return Err(VerifyError::Mismatch {
                            seed,
                            bit,
                            node,
                            true_dist,
                            found: dist + r,
                            dist,
                            trace: trace(node),
                        });
                    }
                }
                None => {
                    if true_dist >= dist && true_dist < dist + radius {
                        return Err(VerifyError::Missing {
                            seed,
                            bit,
                            node,
                            true_dist,
                            dist,
                            radius,
                            trace: trace(node),
                        });
                    }
                    if true_dist < dist || true_dist - dist > slack {
                        return Err(VerifyError::OutOfRange {
                            seed,
                            bit,
                            node,
                            true_dist,
                            dist,
                            slack,
                            trace: trace(node),
                        });
                    }
                }
            }
        }
        pl.update();
    }

    pl.done();
    log::info!("PASS");
    Ok(())
}

/// Stores in `dists` the distances from `root`, using `queue` as visit queue.
///
/// Unreachable nodes are at distance `usize::MAX`.
fn bfs_from(
    graph: &impl RandomAccessGraph,
    root: usize,
    dists: &mut [usize],
    queue: &mut VecDeque<usize>,
) {
    dists.fill(usize::MAX);
    queue.clear();
    dists[root] = 0;
    queue.push_back(root);
    while let Some(node) = queue.pop_front() {
        let next = dists[node] + 1;
        for succ in graph.successors(node) {
            if dists[succ] == usize::MAX {
                dists[succ] = next;
                queue.push_back(succ);
            }
        }
    }
}
