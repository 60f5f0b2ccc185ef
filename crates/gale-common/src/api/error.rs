// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use crate::core::id::VertexId;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GaleError {
    /// Topology mutation attempted after `finalize`.
    #[error("topology is locked: the graph was already finalized")]
    TopologyLocked,

    /// Engine construction or adjacency query on a graph that was never finalized.
    #[error("topology is open: call finalize() before running an engine")]
    TopologyOpen,

    /// Explicit re-insertion of a vertex id that was already added explicitly.
    #[error("vertex {id} already exists")]
    DuplicateVertex { id: VertexId },

    #[error("vertex {id} not found")]
    VertexNotFound { id: VertexId },

    /// Two activations of one vertex overlapped. This is an engine scheduling
    /// bug, never a vertex-program error, and aborts the run.
    #[error("activation race on vertex {id}")]
    ActivationRace { id: VertexId },

    /// Transient engine state could not be serialized or restored.
    #[error("engine state serialization failed: {message}")]
    StateSerialization { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GaleError>;
