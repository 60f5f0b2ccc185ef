// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use serde::{Deserialize, Serialize};

/// How vertex activations are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Bulk-synchronous supersteps with global barriers between the
    /// gather, apply and scatter phases.
    #[default]
    Synchronous,
    /// Worker threads drain a shared activation queue with per-vertex
    /// mutual exclusion and no global barrier.
    Asynchronous,
}

/// Neighborhood locking level for asynchronous execution.
///
/// `Vertex` guarantees only that two activations of one vertex never
/// overlap. `Edge` additionally holds the immediate neighborhood's
/// activation locks for the whole activation, so endpoint reads during
/// gather and scatter observe a stable neighborhood.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consistency {
    #[default]
    Vertex,
    Edge,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub mode: ExecutionMode,

    /// Upper bound on supersteps (synchronous) or on per-vertex activations
    /// (asynchronous). `None` runs until convergence.
    pub max_supersteps: Option<usize>,

    /// Worker threads for the asynchronous engine
    /// (default: available parallelism).
    pub worker_threads: Option<usize>,

    /// Locking level for the asynchronous engine.
    pub consistency: Consistency,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Synchronous,
            max_supersteps: None,
            worker_threads: None,
            consistency: Consistency::Vertex,
        }
    }
}

impl EngineConfig {
    pub fn synchronous() -> Self {
        Self::default()
    }

    pub fn asynchronous() -> Self {
        Self {
            mode: ExecutionMode::Asynchronous,
            ..Self::default()
        }
    }

    pub fn with_max_supersteps(mut self, cap: usize) -> Self {
        self.max_supersteps = Some(cap);
        self
    }
}
