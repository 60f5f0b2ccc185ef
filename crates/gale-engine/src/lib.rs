// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Gather-Apply-Scatter execution engines.
//!
//! Two engines drive [`VertexProgram`]s over a finalized
//! [`gale_graph::Graph`]:
//!
//! - [`SyncEngine`]: bulk-synchronous supersteps — barriered gather, apply
//!   and scatter phases over the active set, with cross-vertex parallelism
//!   inside each phase.
//! - [`AsyncEngine`]: worker threads drain an activation queue with
//!   per-vertex mutual exclusion and an optional neighborhood lock.
//!
//! Both share one control surface: `signal`, `signal_all`, `start`,
//! `iteration`, `elapsed_time`. [`build_engine`] picks the engine from
//! [`EngineConfig::mode`].

pub mod asynchronous;
pub mod combine;
pub mod program;
pub mod synchronous;

pub use asynchronous::AsyncEngine;
pub use combine::{Combine, Empty};
pub use program::{Context, Signals, VertexProgram};
pub use synchronous::{EngineCheckpoint, SyncEngine};

use gale_common::{EngineConfig, ExecutionMode, Result, VertexId};
use gale_graph::Graph;
use std::time::Duration;

/// How a run ended. `IterationLimitReached` is a status reported to the
/// host, never surfaced to vertex programs and never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Converged,
    IterationLimitReached,
}

/// Outcome of one `start()`.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub status: EngineStatus,
    /// Supersteps executed (synchronous), or the deepest per-vertex
    /// activation chain (asynchronous).
    pub supersteps: usize,
    /// Total vertex activations across the run.
    pub activations: u64,
    pub elapsed: Duration,
}

/// Control surface shared by both engines.
///
/// Engines are reusable: after a run converges the host may `signal` /
/// `signal_all` again and `start` another run on the same graph; vertex
/// data carries over, the active set starts fresh.
pub trait Engine<P: VertexProgram> {
    /// Marks one vertex active for the next run, folding `message` into any
    /// already-pending message for it.
    fn signal(&mut self, target: VertexId, message: P::Message) -> Result<()>;

    /// Marks every vertex active with the identity message.
    fn signal_all(&mut self);

    /// Runs activations until none remain or the configured cap is hit.
    fn start(&mut self) -> Result<RunReport>;

    /// Superstep count (synchronous) or deepest activation chain
    /// (asynchronous) of the last run.
    fn iteration(&self) -> usize;

    /// Wall-clock time of the last run.
    fn elapsed_time(&self) -> Duration;
}

/// Builds the engine selected by `config.mode`.
pub fn build_engine<'g, P: VertexProgram>(
    graph: &'g Graph<P::VertexData, P::EdgeData>,
    program: P,
    config: EngineConfig,
) -> Result<Box<dyn Engine<P> + 'g>> {
    Ok(match config.mode {
        ExecutionMode::Synchronous => Box::new(SyncEngine::new(graph, program, config)?),
        ExecutionMode::Asynchronous => Box::new(AsyncEngine::new(graph, program, config)?),
    })
}
