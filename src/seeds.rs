/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Registration of seeds.
//!
//! A [`Seeds`] instance is an ordered list of seed nodes in which the seed at
//! position *i* is bound to bit *i* of the [`Label`] type; its length is
//! checked against the label width at construction, so a configuration that
//! does not fit is rejected before any parallel work starts.

use crate::traits::Label;
use std::marker::PhantomData;
use thiserror::Error;

/// The seeds could not be registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("Too many seeds: {count} seeds do not fit in a label of {max} bits")]
    TooManySeeds { count: usize, max: usize },
    #[error("No seeds provided")]
    Empty,
}

/// An ordered list of seeds, each bound to one bit of a label of type `L`.
///
/// Duplicate nodes at different positions are accepted: each occupies its
/// own bit, and the labeling will report identical distances for both.
///
/// # Examples
///
/// ```
/// use cluster_bfs::seeds::{Seeds, SeedError};
///
/// let seeds = Seeds::<u64>::new([3, 7, 3])?;
/// assert_eq!(seeds.len(), 3);
/// assert_eq!(seeds.bit_of(3), Some(0));
/// assert_eq!(seeds.bit_of(7), Some(1));
///
/// // Padded lists stop at the first repetition of the first seed
/// let padded = Seeds::<u64>::from_padded([5, 5, 5])?;
/// assert_eq!(padded.as_slice(), &[5]);
///
/// assert_eq!(
///     Seeds::<u8>::new(0..9).unwrap_err(),
///     SeedError::TooManySeeds { count: 9, max: 8 }
/// );
/// # Ok::<(), SeedError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeds<L: Label = u64> {
    nodes: Vec<usize>,
    _marker: PhantomData<L>,
}

impl<L: Label> Seeds<L> {
    /// Registers the given nodes as seeds, in order.
    pub fn new(nodes: impl IntoIterator<Item = usize>) -> Result<Self, SeedError> {
        Self::check(nodes.into_iter().collect())
    }

    /// Registers seeds from a list padded by repeating its first element.
    ///
    /// Registration stops at the first occurrence of the first element at a
    /// position other than zero, which marks the end of the real seeds. Note
    /// that as a consequence the first seed cannot be legitimately repeated:
    /// use [`new`](Self::new) if that is needed.
    pub fn from_padded(nodes: impl IntoIterator<Item = usize>) -> Result<Self, SeedError> {
        let mut iter = nodes.into_iter();
        let Some(first) = iter.next() else {
            return Err(SeedError::Empty);
        };
        let mut seeds = vec![first];
        seeds.extend(iter.take_while(|&node| node != first));
        Self::check(seeds)
    }

    fn check(nodes: Vec<usize>) -> Result<Self, SeedError> {
        if nodes.is_empty() {
            return Err(SeedError::Empty);
        }
        if nodes.len() > L::BITS {
            return Err(SeedError::TooManySeeds {
                count: nodes.len(),
                max: L::BITS,
            });
        }
        Ok(Self {
            nodes,
            _marker: PhantomData,
        })
    }

    /// Returns the number of seeds.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether there are no seeds, which never happens for a
    /// successfully registered list.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the seed bound to `bit`.
    ///
    /// # Panics
    ///
    /// If `bit` is not smaller than [`len`](Self::len).
    pub fn node(&self, bit: usize) -> usize {
        self.nodes[bit]
    }

    /// Returns the first bit bound to `node`, if `node` is a seed.
    pub fn bit_of(&self, node: usize) -> Option<usize> {
        self.nodes.iter().position(|&seed| seed == node)
    }

    /// Returns the mask of all bits bound to a seed.
    pub fn mask(&self) -> L {
        L::low_mask(self.nodes.len())
    }

    /// Returns an iterator over pairs `(bit, node)`.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, usize)> + '_ {
        self.nodes.iter().copied().enumerate()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.nodes
    }

    /// Returns the seed nodes without duplicates, in order of first
    /// occurrence.
    pub fn distinct_nodes(&self) -> Vec<usize> {
        let mut distinct = Vec::with_capacity(self.nodes.len());
        for &node in &self.nodes {
            if !distinct.contains(&node) {
                distinct.push(node);
            }
        }
        distinct
    }
}
