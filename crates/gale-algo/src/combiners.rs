// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Message and gather-accumulator types shared by the algorithms.
//!
//! Each satisfies the [`Combine`] law: `merge` is associative and
//! commutative with `identity()` as the neutral element, so folds are
//! order-independent however the engine splits the work.

use fxhash::FxHashSet;
use gale_engine::Combine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Minimum over unsigned labels; identity is `u64::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinU64(pub u64);

impl Combine for MinU64 {
    fn identity() -> Self {
        MinU64(u64::MAX)
    }

    fn merge(&mut self, other: Self) {
        self.0 = self.0.min(other.0);
    }
}

/// Minimum over signed labels; identity is `i64::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinI64(pub i64);

impl Combine for MinI64 {
    fn identity() -> Self {
        MinI64(i64::MAX)
    }

    fn merge(&mut self, other: Self) {
        self.0 = self.0.min(other.0);
    }
}

/// Minimum over path lengths; identity is positive infinity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinDistance(pub f64);

impl Combine for MinDistance {
    fn identity() -> Self {
        MinDistance(f64::INFINITY)
    }

    fn merge(&mut self, other: Self) {
        self.0 = self.0.min(other.0);
    }
}

/// Floating-point sum; identity is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RankSum(pub f64);

impl Combine for RankSum {
    fn identity() -> Self {
        RankSum(0.0)
    }

    fn merge(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Duplicate-eliminating set union; identity is the empty set.
///
/// Used where a vertex must see the distinct values of its whole
/// neighborhood (coloring) or every proposer in a round (matching), not a
/// scalar reduction of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetUnion<T: Eq + Hash>(pub FxHashSet<T>);

impl<T: Eq + Hash> SetUnion<T> {
    pub fn singleton(value: T) -> Self {
        let mut set = FxHashSet::default();
        set.insert(value);
        SetUnion(set)
    }
}

impl<T> Combine for SetUnion<T>
where
    T: Eq + Hash + Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    fn identity() -> Self {
        SetUnion(FxHashSet::default())
    }

    fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }
}

/// Element-wise bitwise OR over mask vectors; identity is the empty vector.
///
/// The shorter side is zero-extended, so merging sketches of equal length
/// is exact and the identity stays neutral.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmaskOr(pub Vec<u32>);

impl Combine for BitmaskOr {
    fn identity() -> Self {
        BitmaskOr(Vec::new())
    }

    fn merge(&mut self, other: Self) {
        if self.0.len() < other.0.len() {
            self.0.resize(other.0.len(), 0);
        }
        for (slot, bits) in self.0.iter_mut().zip(other.0) {
            *slot |= bits;
        }
    }
}
