/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use cluster_bfs::prelude::*;
use cluster_bfs::seq::SeqLabels;
use cluster_bfs::thread_pool;
use dsi_progress_logger::no_logging;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use webgraph::graphs::vec_graph::VecGraph;
use webgraph::traits::{RandomAccessGraph, SequentialLabeling};
use webgraph::utils::Granularity;

/// Logs round-by-round progress when tests are run with `--nocapture`.
fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// Builds a graph from a list of arcs, removing duplicates.
fn dedup(mut arcs: Vec<(usize, usize)>) -> VecGraph {
    arcs.sort_unstable();
    arcs.dedup();
    VecGraph::from_arcs(arcs)
}

fn symmetric(arcs: impl IntoIterator<Item = (usize, usize)>) -> VecGraph {
    dedup(
        arcs.into_iter()
            .flat_map(|(u, v)| [(u, v), (v, u)])
            .collect(),
    )
}

fn path(num_nodes: usize) -> VecGraph {
    symmetric((1..num_nodes).map(|x| (x - 1, x)))
}

/// A random graph with `num_nodes` nodes and about `num_arcs` arcs, possibly
/// disconnected.
fn random_graph(num_nodes: usize, num_arcs: usize, directed: bool, seed: u64) -> VecGraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut arcs = Vec::with_capacity(num_arcs);
    for _ in 0..num_arcs {
        arcs.push((rng.random_range(0..num_nodes), rng.random_range(0..num_nodes)));
    }
    let mut graph = if directed {
        dedup(arcs)
    } else {
        symmetric(arcs)
    };
    graph.add_node(num_nodes - 1);
    graph
}

fn transpose(graph: &VecGraph) -> VecGraph {
    let mut transpose = VecGraph::new();
    transpose.add_node(graph.num_nodes() - 1);
    for node in 0..graph.num_nodes() {
        for succ in graph.successors(node) {
            transpose.add_arc(succ, node);
        }
    }
    transpose
}

/// Checks a labeling against the exact distances of a sequential visit.
fn check_against_seq<D: Distance>(
    graph: &impl RandomAccessGraph,
    seeds: &Seeds<u64>,
    labels: &ClusterLabels<D, u64>,
) {
    let seq = SeqLabels::compute(graph, seeds);
    let radius = labels.radius();
    for node in 0..graph.num_nodes() {
        let d = labels.dist(node);
        if seq.dist()[node] == usize::MAX {
            assert!(d.is_inf(), "node {} should be unreachable", node);
            assert_eq!(labels.reached(node), 0);
            continue;
        }
        assert_eq!(d.to_usize(), seq.dist()[node], "distance of node {}", node);
        let d = d.to_usize();

        let mut expected = 0_u64;
        for &(bit, true_dist) in seq.arrivals(node) {
            if true_dist < d + radius {
                expected |= 1 << bit;
                assert_eq!(
                    labels.query(node, bit),
                    Some(true_dist),
                    "node {}, bit {}",
                    node,
                    bit
                );
            } else {
                assert_eq!(labels.query(node, bit), None, "node {}, bit {}", node, bit);
            }
        }
        assert_eq!(labels.reached(node), expected, "node {}", node);

        // Round labels are disjoint
        let mut seen = 0;
        for &label in labels.round_labels(node) {
            assert_eq!(seen & label, 0, "node {}", node);
            seen |= label;
        }
    }
}

#[test]
fn test_path() -> Result<()> {
    let graph = path(5);
    let seeds = Seeds::new([0, 4])?;
    let mut labels = ClusterLabels::<u8, u64>::new(5, 3);
    let stats = cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;

    assert_eq!(labels.dists(), &[0, 1, 2, 1, 0]);
    assert_eq!(labels.round_labels(2)[0], 0b11);
    assert_eq!(labels.round_labels(0), &[0b01, 0, 0]);
    assert_eq!(labels.round_labels(1), &[0b01, 0, 0b10]);
    assert_eq!(labels.round_labels(3), &[0b10, 0, 0b01]);
    assert_eq!(labels.round_labels(4), &[0b10, 0, 0]);
    assert_eq!(stats.rounds, 4);
    check_against_seq(&graph, &seeds, &labels);
    Ok(())
}

#[test]
fn test_padded_seeds() -> Result<()> {
    let graph = path(8);
    let seeds = Seeds::<u64>::from_padded([5, 5, 5])?;
    assert_eq!(seeds.len(), 1);
    let mut labels = ClusterLabels::<u8, u64>::new(8, 2);
    cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;
    assert_eq!(labels.dists(), &[5, 4, 3, 2, 1, 0, 1, 2]);
    for node in 0..8 {
        assert_eq!(labels.round_labels(node), &[1, 0]);
    }
    Ok(())
}

#[test]
fn test_duplicate_seeds() -> Result<()> {
    let graph = path(6);
    let seeds = Seeds::<u64>::new([2, 2, 5])?;
    let mut labels = ClusterLabels::<u8, u64>::new(6, 2);
    cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![3], no_logging![])?;
    assert_eq!(labels.round_labels(2), &[0b011, 0]);
    assert_eq!(labels.query(0, 0), labels.query(0, 1));
    check_against_seq(&graph, &seeds, &labels);
    Ok(())
}

#[test]
fn test_disconnected() -> Result<()> {
    // Node 3 is isolated
    let mut graph = symmetric([(0, 1), (1, 2), (4, 2)]);
    graph.add_node(3);
    let seeds = Seeds::new([0])?;
    let mut labels = ClusterLabels::<u16, u64>::new(5, 2);
    cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;
    assert!(labels.dist(3).is_inf());
    assert_eq!(labels.round_labels(3), &[0, 0]);
    assert_eq!(labels.query(3, 0), None);
    assert_eq!(labels.dists(), &[0, 1, 2, <u16 as Distance>::INF, 3]);
    verify(&graph, &seeds, &labels, no_logging![])?;
    Ok(())
}

#[test]
fn test_radius_one() -> Result<()> {
    let graph = path(5);
    let seeds = Seeds::new([0, 4, 1])?;
    let mut labels = ClusterLabels::<u8, u64>::new(5, 1);
    cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;
    // Only first-discovery seeds are recorded
    assert_eq!(labels.dists(), &[0, 0, 1, 1, 0]);
    assert_eq!(labels.round_labels(0), &[0b001]);
    assert_eq!(labels.round_labels(1), &[0b100]);
    assert_eq!(labels.round_labels(2), &[0b100]);
    assert_eq!(labels.round_labels(3), &[0b010]);
    assert_eq!(labels.round_labels(4), &[0b010]);
    check_against_seq(&graph, &seeds, &labels);
    Ok(())
}

#[test]
fn test_single_seed() -> Result<()> {
    let graph = random_graph(200, 500, false, 0);
    let seeds = Seeds::new([17])?;
    let mut labels = ClusterLabels::<u8, u64>::new(200, 3);
    cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;
    let seq = SeqLabels::compute(&graph, &seeds);
    for node in 0..200 {
        if seq.dist()[node] == usize::MAX {
            assert!(labels.dist(node).is_inf());
            assert_eq!(labels.round_labels(node), &[0, 0, 0]);
        } else {
            assert_eq!(labels.dist(node) as usize, seq.dist()[node]);
            assert_eq!(labels.round_labels(node), &[1, 0, 0]);
        }
    }
    Ok(())
}

#[test]
fn test_too_many_seeds() {
    assert_eq!(
        Seeds::<u64>::new(0..65),
        Err(SeedError::TooManySeeds { count: 65, max: 64 })
    );
    assert_eq!(
        Seeds::<u8>::new(0..9),
        Err(SeedError::TooManySeeds { count: 9, max: 8 })
    );
}

#[test]
fn test_seed_out_of_range() -> Result<()> {
    let graph = path(3);
    let mut labels = ClusterLabels::<u8, u64>::new(3, 1);
    let result = cluster_bfs(
        &graph,
        &Seeds::new([0, 3])?,
        &mut labels,
        &thread_pool![],
        no_logging![],
    );
    assert!(result.is_err());
    Ok(())
}

#[test]
#[should_panic]
fn test_distance_overflow() {
    // 200 nodes on a path do not fit in 8-bit distances
    let graph = path(200);
    let seeds = Seeds::<u64>::new([0]).unwrap();
    let mut labels = ClusterLabels::<u8, u64>::new(200, 1);
    let _ = cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![]);
}

#[test]
fn test_wide_distances() -> Result<()> {
    let graph = path(300);
    let seeds = Seeds::<u32>::new([0, 299])?;
    let mut labels = ClusterLabels::<u16, u32>::new(300, 2);
    cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;
    assert_eq!(labels.dist(149), 149);
    assert_eq!(labels.dist(150), 149);
    assert_eq!(labels.round_labels(149), &[0b01, 0b10]);
    assert_eq!(labels.round_labels(150), &[0b10, 0b01]);
    Ok(())
}

#[test]
fn test_thread_independence() -> Result<()> {
    init_logger();
    let graph = random_graph(1000, 4000, false, 1);
    let seeds = Seeds::new((0..64).map(|i| i * 15))?;
    let mut expected = ClusterLabels::<u8, u64>::new(1000, 3);
    cluster_bfs(&graph, &seeds, &mut expected, &thread_pool![1], no_logging![])?;
    check_against_seq(&graph, &seeds, &expected);

    let mut labels = ClusterLabels::<u8, u64>::new(1000, 3);
    for num_threads in [2, 4, 8] {
        cluster_bfs(
            &graph,
            &seeds,
            &mut labels,
            &thread_pool![num_threads],
            no_logging![],
        )?;
        assert_eq!(labels, expected, "{} threads", num_threads);
    }
    Ok(())
}

#[test]
fn test_directed_with_transpose() -> Result<()> {
    let graph = random_graph(500, 2000, true, 2);
    let transpose = transpose(&graph);
    let seeds = Seeds::new([3, 99, 250, 251, 499])?;
    let mut labels = ClusterLabels::<u8, u64>::new(500, 2);
    for granularity in [1, 16, 1024] {
        cluster_bfs_with_granularity(
            &graph,
            &transpose,
            &seeds,
            &mut labels,
            Granularity::Nodes(granularity),
            &thread_pool![4],
            no_logging![],
        )?;
        check_against_seq(&graph, &seeds, &labels);
    }
    Ok(())
}

macro_rules! test_random {
    ($name:ident, $dist:ty, $num_nodes:expr, $num_arcs:expr, $num_seeds:expr, $radius:expr) => {
        #[test]
        fn $name() -> Result<()> {
            for seed in 0..3 {
                let graph = random_graph($num_nodes, $num_arcs, false, seed);
                let mut rng = SmallRng::seed_from_u64(seed);
                let seeds = Seeds::new((0..$num_seeds).map(|_| rng.random_range(0..$num_nodes)))?;
                let mut labels = ClusterLabels::<$dist, u64>::new($num_nodes, $radius);
                cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![4], no_logging![])?;
                check_against_seq(&graph, &seeds, &labels);
            }
            Ok(())
        }
    };
}

test_random!(test_random_sparse, u8, 1000, 1200, 10, 2);
test_random!(test_random_dense, u8, 300, 6000, 64, 3);
test_random!(test_random_large_radius, u16, 500, 1000, 32, 8);

#[cfg(feature = "slow_tests")]
test_random!(test_random_big, u16, 100_000, 500_000, 64, 4);

#[test]
fn test_star_batches_verify() -> Result<()> {
    init_logger();
    let graph = random_graph(2000, 10000, false, 3);
    let mut rng = SmallRng::seed_from_u64(0);
    let batches = cluster_bfs::select::star_seeds(&graph, 16, 5, 1, &mut rng);
    assert!(!batches.is_empty());
    let mut labels = ClusterLabels::<u8, u64>::new(2000, 2);
    for batch in batches {
        let seeds = Seeds::new(batch)?;
        cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;
        verify(&graph, &seeds, &labels, no_logging![])?;
        check_against_seq(&graph, &seeds, &labels);
    }
    Ok(())
}

#[test]
fn test_two_hop_batches_verify() -> Result<()> {
    init_logger();
    let graph = random_graph(1000, 3000, false, 4);
    let mut rng = SmallRng::seed_from_u64(1);
    let batches = cluster_bfs::select::star_seeds(&graph, 64, 3, 2, &mut rng);
    assert!(!batches.is_empty());
    // Seeds are within four hops of each other
    let mut labels = ClusterLabels::<u8, u64>::new(1000, 4);
    for batch in batches {
        let padded = cluster_bfs::select::pad_with_center(&batch, 64);
        let seeds = Seeds::from_padded(padded)?;
        assert_eq!(seeds.as_slice(), batch.as_slice());
        cluster_bfs(&graph, &seeds, &mut labels, &thread_pool![], no_logging![])?;
        verify(&graph, &seeds, &labels, no_logging![])?;
    }
    Ok(())
}
