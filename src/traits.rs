/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Numeric traits for labels and distances.
//!
//! A [`Label`] is a fixed-width bitmask in which bit *i* represents the seed
//! registered at position *i*; its associated [`AtomicLabel`] type is used
//! for the transient state that is merged concurrently during a round.
//!
//! A [`Distance`] is a fixed-width unsigned integer with an
//! [`INF`](Distance::INF) sentinel equal to half of the representable range
//! minus one, leaving headroom for the relative rounds added on top of a
//! finite distance.

use core::fmt::{Binary, Debug, Display};
use core::ops::*;
use std::sync::atomic::*;

/// A fixed-width bitmask of seeds.
pub trait Label:
    Sized
    + Send
    + Sync
    + Debug
    + Binary
    + Default
    + Clone
    + Copy
    + PartialEq
    + Eq
    + BitAnd<Output = Self>
    + BitAndAssign<Self>
    + BitOr<Output = Self>
    + BitOrAssign<Self>
    + Not<Output = Self>
    + 'static
{
    /// Number of bits, that is, the maximum number of seeds.
    const BITS: usize;
    /// The empty set of seeds.
    const ZERO: Self;
    /// The atomic counterpart of `Self`.
    type Atomic: AtomicLabel<Self>;

    /// Returns the singleton mask containing `bit`.
    fn bit(bit: usize) -> Self;

    /// Returns whether `bit` is set.
    fn contains(self, bit: usize) -> bool;

    /// Returns the number of bits set.
    fn count_ones(self) -> usize;

    /// Returns a mask with the lowest `n` bits set.
    fn low_mask(n: usize) -> Self;
}

/// The operations on atomic bitmasks used by the propagation.
///
/// All operations are lock-free; merging is performed exclusively by
/// [`fetch_or`](AtomicLabel::fetch_or), which is idempotent, so the result
/// of a round does not depend on the order in which concurrent merges
/// happen.
pub trait AtomicLabel<L>: Send + Sync + Sized {
    fn new(value: L) -> Self;
    fn load(&self, order: Ordering) -> L;
    fn store(&self, value: L, order: Ordering);
    /// Bitwise-or with the current value, returning the previous value.
    fn fetch_or(&self, value: L, order: Ordering) -> L;
    fn into_inner(self) -> L;
}

/// A fixed-width unsigned hop distance with an infinity sentinel.
pub trait Distance:
    Sized + Send + Sync + Debug + Display + Default + Clone + Copy + PartialEq + Eq + PartialOrd + Ord
{
    /// Number of bits.
    const BITS: usize;
    /// The sentinel for unreached nodes: `2^(BITS - 1) - 1`.
    const INF: Self;

    /// Converts a round number to a distance.
    ///
    /// # Panics
    ///
    /// If `value` is not smaller than [`INF`](Distance::INF).
    fn from_usize(value: usize) -> Self;

    fn to_usize(self) -> usize;

    #[inline(always)]
    fn is_inf(self) -> bool {
        self == Self::INF
    }
}

macro_rules! impl_label {
    ($($ty:ty => $atomic:ty),*) => {$(

impl Label for $ty {
    const BITS: usize = <$ty>::BITS as _;
    const ZERO: Self = 0;
    type Atomic = $atomic;

    #[inline(always)]
    fn bit(bit: usize) -> Self {
        debug_assert!(bit < <Self as Label>::BITS);
        1 << bit
    }
    #[inline(always)]
    fn contains(self, bit: usize) -> bool {
        self & Self::bit(bit) != 0
    }
    #[inline(always)]
    fn count_ones(self) -> usize {
        self.count_ones() as usize
    }
    #[inline(always)]
    fn low_mask(n: usize) -> Self {
        if n >= <Self as Label>::BITS { <$ty>::MAX } else { (1 << n) - 1 }
    }
}

impl AtomicLabel<$ty> for $atomic {
    #[inline(always)]
    fn new(value: $ty) -> Self { <$atomic>::new(value) }
    #[inline(always)]
    fn load(&self, order: Ordering) -> $ty { self.load(order) }
    #[inline(always)]
    fn store(&self, value: $ty, order: Ordering) { self.store(value, order) }
    #[inline(always)]
    fn fetch_or(&self, value: $ty, order: Ordering) -> $ty { self.fetch_or(value, order) }
    #[inline(always)]
    fn into_inner(self) -> $ty { self.into_inner() }
}

    )*};
}

impl_label!(u8 => AtomicU8, u16 => AtomicU16, u32 => AtomicU32, u64 => AtomicU64);

macro_rules! impl_distance {
    ($($ty:ty),*) => {$(

impl Distance for $ty {
    const BITS: usize = <$ty>::BITS as _;
    const INF: Self = (1 << (<$ty>::BITS - 1)) - 1;

    #[inline(always)]
    fn from_usize(value: usize) -> Self {
        assert!(
            value < Self::INF as usize,
            "Distance {} does not fit in {} bits (maximum finite distance is {})",
            value,
            <Self as Distance>::BITS,
            Self::INF - 1
        );
        value as $ty
    }
    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }
}

    )*};
}

impl_distance!(u8, u16, u32, u64);
