// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Bulk-synchronous engine: barriered supersteps over the active set.
//!
//! One superstep runs three globally separated phases with cross-vertex
//! parallelism inside each:
//!
//! 1. **Gather** — for each active vertex, clone the program prototype,
//!    `init` it with the pending message, scan the declared edge set and
//!    fold the results. Vertex data is only read in this phase, so every
//!    read observes the pre-superstep snapshot.
//! 2. **Apply** — each activation exclusively locks its own vertex cell and
//!    mutates it; nothing else is touched.
//! 3. **Scatter** — programs emit signals; all signals destined to one
//!    vertex are folded with the message combiner at the barrier, so the
//!    merged active set is independent of worker scheduling and scan order.

use crate::combine::Combine;
use crate::program::{Context, Signals, VertexProgram};
use crate::{Engine, EngineStatus, RunReport};
use fxhash::FxHashMap;
use gale_common::{EngineConfig, GaleError, Result, VertexId};
use gale_graph::{Graph, VertexMut};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::io;
use std::time::{Duration, Instant};

pub(crate) fn fold_message<M: Combine>(map: &mut FxHashMap<u32, M>, slot: u32, message: M) {
    match map.entry(slot) {
        Entry::Occupied(mut entry) => entry.get_mut().merge(message),
        Entry::Vacant(entry) => {
            entry.insert(message);
        }
    }
}

/// One in-flight activation between the gather and scatter phases.
struct Activation<P: VertexProgram> {
    slot: u32,
    program: P,
    gathered: P::Gather,
}

/// Pending activation state between supersteps, in id space. The only
/// transient engine state that exists at a superstep boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineCheckpoint<M> {
    pub superstep: usize,
    pub pending: Vec<(VertexId, M)>,
}

pub struct SyncEngine<'g, P: VertexProgram> {
    graph: &'g Graph<P::VertexData, P::EdgeData>,
    program: P,
    config: EngineConfig,
    /// At most one folded message per vertex at any superstep boundary.
    pending: FxHashMap<u32, P::Message>,
    superstep: usize,
    elapsed: Duration,
}

impl<'g, P: VertexProgram> SyncEngine<'g, P> {
    /// `program` is the prototype cloned for every activation; it carries
    /// algorithm configuration alongside the transient state `init` seeds.
    pub fn new(
        graph: &'g Graph<P::VertexData, P::EdgeData>,
        program: P,
        config: EngineConfig,
    ) -> Result<Self> {
        if !graph.is_finalized() {
            return Err(GaleError::TopologyOpen);
        }
        Ok(Self {
            graph,
            program,
            config,
            pending: FxHashMap::default(),
            superstep: 0,
            elapsed: Duration::ZERO,
        })
    }

    pub fn signal(&mut self, target: VertexId, message: P::Message) -> Result<()> {
        let slot = self
            .graph
            .slot_of(target)
            .ok_or(GaleError::VertexNotFound { id: target })?;
        fold_message(&mut self.pending, slot, message);
        Ok(())
    }

    pub fn signal_all(&mut self) {
        for slot in 0..self.graph.vertex_count() as u32 {
            self.pending
                .entry(slot)
                .or_insert_with(P::Message::identity);
        }
    }

    pub fn start(&mut self) -> Result<RunReport> {
        let started = Instant::now();
        let graph = self.graph;
        let prototype = self.program.clone();
        let n = graph.vertex_count();
        self.superstep = 0;
        let mut activations: u64 = 0;

        let status = loop {
            if self.pending.is_empty() {
                break EngineStatus::Converged;
            }
            if let Some(cap) = self.config.max_supersteps {
                if self.superstep >= cap {
                    break EngineStatus::IterationLimitReached;
                }
            }

            let ctx = Context::new(self.superstep, n);
            let active: Vec<(u32, P::Message)> = self.pending.drain().collect();
            activations += active.len() as u64;

            // Gather phase: reads only, pre-superstep snapshot.
            let mut acts: Vec<Activation<P>> = active
                .into_par_iter()
                .map(|(slot, message)| {
                    let vertex = graph.vertex_view(slot);
                    let mut program = prototype.clone();
                    program.init(&ctx, &vertex, message);
                    let set = program.gather_edges(&ctx, &vertex);
                    let mut gathered = P::Gather::identity();
                    for edge in graph.incident(slot, set) {
                        gathered.merge(program.gather(&ctx, &vertex, &graph.edge_view(edge)));
                    }
                    Activation {
                        slot,
                        program,
                        gathered,
                    }
                })
                .collect();

            // Apply phase: each worker holds only its own vertex cell.
            let decisions: Vec<P::Decision> = acts
                .par_iter_mut()
                .map(|act| {
                    let gathered = std::mem::replace(&mut act.gathered, P::Gather::identity());
                    let id = graph.id_at(act.slot);
                    graph.with_data_mut(act.slot, |data| {
                        act.program.apply(&ctx, &mut VertexMut::new(id, data), gathered)
                    })
                })
                .collect();

            // Scatter phase, then the barrier merge. The combiner law makes
            // the merged map independent of which worker folded what.
            self.pending = acts
                .par_iter()
                .zip(decisions.par_iter())
                .map(|(act, decision)| {
                    let vertex = graph.vertex_view(act.slot);
                    let set = act.program.scatter_edges(&ctx, &vertex, decision);
                    let mut signals = Signals::new();
                    for edge in graph.incident(act.slot, set) {
                        act.program.scatter(
                            &ctx,
                            &vertex,
                            &graph.edge_view(edge),
                            decision,
                            &mut signals,
                        );
                    }
                    signals.into_inner()
                })
                .flatten_iter()
                .fold(FxHashMap::default, |mut map, (target, message)| {
                    match graph.slot_of(target) {
                        Some(slot) => fold_message(&mut map, slot, message),
                        None => tracing::warn!(%target, "signal to unknown vertex dropped"),
                    }
                    map
                })
                .reduce(FxHashMap::default, |mut left, right| {
                    for (slot, message) in right {
                        fold_message(&mut left, slot, message);
                    }
                    left
                });

            self.superstep += 1;
            tracing::debug!(
                superstep = self.superstep,
                active = self.pending.len(),
                "superstep barrier"
            );
        };

        self.elapsed = started.elapsed();
        Ok(RunReport {
            status,
            supersteps: self.superstep,
            activations,
            elapsed: self.elapsed,
        })
    }

    pub fn iteration(&self) -> usize {
        self.superstep
    }

    pub fn elapsed_time(&self) -> Duration {
        self.elapsed
    }

    // ── Checkpointing ────────────────────────────────────────────────────

    /// Snapshot of the pending activation state, in id space and sorted for
    /// a deterministic byte image.
    pub fn checkpoint(&self) -> EngineCheckpoint<P::Message> {
        let mut pending: Vec<(VertexId, P::Message)> = self
            .pending
            .iter()
            .map(|(&slot, message)| (self.graph.id_at(slot), message.clone()))
            .collect();
        pending.sort_by_key(|(id, _)| *id);
        EngineCheckpoint {
            superstep: self.superstep,
            pending,
        }
    }

    /// Replaces the pending state from a checkpoint taken on an identical
    /// topology.
    pub fn restore(&mut self, checkpoint: EngineCheckpoint<P::Message>) -> Result<()> {
        let mut pending = FxHashMap::default();
        for (id, message) in checkpoint.pending {
            let slot = self
                .graph
                .slot_of(id)
                .ok_or(GaleError::VertexNotFound { id })?;
            fold_message(&mut pending, slot, message);
        }
        self.pending = pending;
        self.superstep = checkpoint.superstep;
        Ok(())
    }

    /// Serialization failures here are fatal to the run, per the error
    /// taxonomy.
    pub fn write_checkpoint<W: io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.checkpoint()).map_err(|e| {
            GaleError::StateSerialization {
                message: e.to_string(),
            }
        })
    }

    pub fn read_checkpoint<R: io::Read>(reader: R) -> Result<EngineCheckpoint<P::Message>> {
        serde_json::from_reader(reader).map_err(|e| GaleError::StateSerialization {
            message: e.to_string(),
        })
    }
}

impl<P: VertexProgram> Engine<P> for SyncEngine<'_, P> {
    fn signal(&mut self, target: VertexId, message: P::Message) -> Result<()> {
        SyncEngine::signal(self, target, message)
    }

    fn signal_all(&mut self) {
        SyncEngine::signal_all(self)
    }

    fn start(&mut self) -> Result<RunReport> {
        SyncEngine::start(self)
    }

    fn iteration(&self) -> usize {
        SyncEngine::iteration(self)
    }

    fn elapsed_time(&self) -> Duration {
        SyncEngine::elapsed_time(self)
    }
}
