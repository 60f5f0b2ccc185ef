// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! The vertex-program contract: the polymorphic per-vertex state machine
//! (init → gather → apply → scatter) every algorithm implements.

use crate::combine::Combine;
use gale_common::VertexId;
use gale_graph::{EdgeSet, EdgeView, VertexMut, VertexView};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Read-only execution context handed to every program operation.
#[derive(Clone, Copy, Debug)]
pub struct Context {
    iteration: usize,
    num_vertices: usize,
}

impl Context {
    pub(crate) fn new(iteration: usize, num_vertices: usize) -> Self {
        Self {
            iteration,
            num_vertices,
        }
    }

    /// The global superstep index under the synchronous engine (every vertex
    /// observes the same value within a superstep), or this vertex's own
    /// activation count under the asynchronous engine.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }
}

/// Collects the `(target, message)` pairs produced by one scatter.
///
/// Signals destined to the same vertex — from this scatter or any other
/// concurrently processed one — are folded with [`Combine::merge`] at the
/// superstep barrier, never overwritten.
pub struct Signals<M: Combine> {
    out: Vec<(VertexId, M)>,
}

impl<M: Combine> Signals<M> {
    pub(crate) fn new() -> Self {
        Self { out: Vec::new() }
    }

    /// Activates `target` for its next activation, carrying `message`.
    pub fn signal(&mut self, target: VertexId, message: M) {
        self.out.push((target, message));
    }

    pub(crate) fn into_inner(self) -> Vec<(VertexId, M)> {
        self.out
    }
}

/// One vertex program.
///
/// The engine clones a caller-supplied prototype for every activation, so an
/// instance carries both configuration (damping factors, source ids) and the
/// transient per-activation state seeded by `init`. Instances are serde-
/// serializable so in-flight state can migrate or checkpoint across workers;
/// transient state does not survive past one activation unless re-derived.
pub trait VertexProgram: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type VertexData: Clone + Default + Send + Sync + Serialize + DeserializeOwned + 'static;
    type EdgeData: Send + Sync + 'static;

    /// Accumulator for gather results along the selected edges of one vertex.
    type Gather: Combine;

    /// Message folded across concurrent signals to one target vertex.
    type Message: Combine;

    /// What `apply` decided, consumed by `scatter_edges` and `scatter`.
    type Decision: Send + Sync;

    /// Seeds per-activation transient state from the combined incoming
    /// message. Called once per activation, before gather.
    fn init(
        &mut self,
        ctx: &Context,
        vertex: &VertexView<'_, Self::VertexData, Self::EdgeData>,
        message: Self::Message,
    ) {
        let _ = (ctx, vertex, message);
    }

    /// Which edge set to scan this activation. `EdgeSet::None` skips gather
    /// entirely; `init`'s message is then the only input to `apply`.
    fn gather_edges(
        &self,
        ctx: &Context,
        vertex: &VertexView<'_, Self::VertexData, Self::EdgeData>,
    ) -> EdgeSet {
        let _ = (ctx, vertex);
        EdgeSet::None
    }

    /// Pure function of one edge; results are folded with `Combine::merge`
    /// in unspecified order.
    fn gather(
        &self,
        ctx: &Context,
        vertex: &VertexView<'_, Self::VertexData, Self::EdgeData>,
        edge: &EdgeView<'_, Self::VertexData, Self::EdgeData>,
    ) -> Self::Gather {
        let _ = (ctx, vertex, edge);
        Self::Gather::identity()
    }

    /// The only operation permitted to mutate vertex data. Runs exactly once
    /// per activation, after gather and before scatter; the returned
    /// decision carries anything scatter needs to know.
    fn apply(
        &mut self,
        ctx: &Context,
        vertex: &mut VertexMut<'_, Self::VertexData>,
        gathered: Self::Gather,
    ) -> Self::Decision;

    /// Which edge set scatter walks. `EdgeSet::None` produces no new
    /// activations; the vertex goes inactive until externally re-signalled.
    fn scatter_edges(
        &self,
        ctx: &Context,
        vertex: &VertexView<'_, Self::VertexData, Self::EdgeData>,
        decision: &Self::Decision,
    ) -> EdgeSet {
        let _ = (ctx, vertex, decision);
        EdgeSet::None
    }

    /// May signal either endpoint of `edge` to activate it next.
    fn scatter(
        &self,
        ctx: &Context,
        vertex: &VertexView<'_, Self::VertexData, Self::EdgeData>,
        edge: &EdgeView<'_, Self::VertexData, Self::EdgeData>,
        decision: &Self::Decision,
        signals: &mut Signals<Self::Message>,
    ) {
        let _ = (ctx, vertex, edge, decision, signals);
    }
}
