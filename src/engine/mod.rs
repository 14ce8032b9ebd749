/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A minimal round-synchronous frontier engine.
//!
//! The engine follows the Ligra model: a [`VertexSubset`] is the frontier of
//! the current round, stored either as a list of nodes (sparse) or as a bit
//! vector (dense), and an [`EdgeMap`] computes the next frontier by applying
//! an edge function to the arcs leaving the frontier whose target satisfies
//! a condition. The direction of the traversal is chosen at each round
//! depending on the size of the frontier: small frontiers push along the
//! arcs of the graph, large frontiers are processed by scanning all nodes
//! and pulling from their predecessors in the transpose.
//!
//! All parallel work is executed on a caller-provided
//! [`ThreadPool`](rayon::ThreadPool); each call is a fork-join barrier.

mod edge_map;
pub use edge_map::*;

mod vertex_subset;
pub use vertex_subset::*;
