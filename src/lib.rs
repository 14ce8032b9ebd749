/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]
#![allow(clippy::type_complexity)]

pub mod cluster_bfs;
pub mod engine;
pub mod labels;
pub mod seeds;
pub mod select;
pub mod seq;
pub mod traits;
pub mod verify;

#[cfg(feature = "cli")]
pub mod cli;

pub mod prelude {
    pub use crate::cluster_bfs::*;
    pub use crate::labels::ClusterLabels;
    pub use crate::seeds::*;
    pub use crate::traits::*;
    pub use crate::verify::*;
}

/// Creates a [`ThreadPool`](rayon::ThreadPool) with default settings, or
/// with the given number of threads.
#[macro_export]
macro_rules! thread_pool {
    () => {
        rayon::ThreadPoolBuilder::new()
            .build()
            .expect("Cannot build a ThreadPool with default parameters")
    };
    ($num_threads:expr) => {
        rayon::ThreadPoolBuilder::new()
            .num_threads($num_threads)
            .build()
            .unwrap_or_else(|_| {
                panic!(
                    "Cannot build a ThreadPool with default parameters and {} threads",
                    $num_threads,
                )
            })
    };
}
