// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! The algebraic contract on gather accumulators and signalled messages.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A value that can be folded with itself in any order.
///
/// `merge` must be associative and commutative, and `identity()` must be a
/// neutral element: merging it into any value leaves the value unchanged.
/// The engine relies on this law twice — folding gather results across the
/// selected edges of one vertex, and folding messages signalled to the same
/// target from concurrently processed sources — so the outcome is
/// independent of scan order and of how partial folds are merged across
/// workers. The law is a precondition verified by property tests, not
/// checked at runtime.
///
/// Serde bounds let messages cross worker boundaries and land in engine
/// checkpoints.
pub trait Combine: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    fn identity() -> Self;

    /// Fold `other` into `self`.
    fn merge(&mut self, other: Self);
}

/// The no-payload combiner for message-model programs: gather is skipped or
/// the signal is a bare wake-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty;

impl Combine for Empty {
    fn identity() -> Self {
        Empty
    }

    fn merge(&mut self, _other: Self) {}
}
