// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Connected components by min-label propagation, gather model.
//!
//! Labels start as the vertex's own id (bulk-initialized by the driver) and
//! every activation adopts the smallest label among edge sources across all
//! incident edges. Undirected semantics require both edge directions in the
//! store. Works under either engine and defaults to the asynchronous one.

use crate::GraphAlgorithm;
use crate::combiners::MinU64;
use fxhash::FxHashSet;
use gale_common::{EngineConfig, ExecutionMode, Result};
use gale_engine::{Context, Empty, EngineStatus, Signals, VertexProgram, build_engine};
use gale_graph::{EdgeSet, EdgeView, Graph, VertexMut, VertexView};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLabel {
    pub value: u64,
}

impl Default for ComponentLabel {
    fn default() -> Self {
        Self { value: u64::MAX }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MinNeighborProgram;

impl VertexProgram for MinNeighborProgram {
    type VertexData = ComponentLabel;
    type EdgeData = ();
    type Gather = MinU64;
    type Message = Empty;
    /// Whether the label shrank.
    type Decision = bool;

    fn gather_edges(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, ComponentLabel, ()>,
    ) -> EdgeSet {
        EdgeSet::All
    }

    // Edge sources: the neighbor on in-edges, the vertex itself on
    // out-edges; the self term is a no-op under min.
    fn gather(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, ComponentLabel, ()>,
        edge: &EdgeView<'_, ComponentLabel, ()>,
    ) -> MinU64 {
        MinU64(edge.source().data().value)
    }

    fn apply(
        &mut self,
        _ctx: &Context,
        vertex: &mut VertexMut<'_, ComponentLabel>,
        total: MinU64,
    ) -> bool {
        if vertex.data().value > total.0 {
            vertex.data().value = total.0;
            true
        } else {
            false
        }
    }

    fn scatter_edges(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, ComponentLabel, ()>,
        changed: &bool,
    ) -> EdgeSet {
        if *changed { EdgeSet::All } else { EdgeSet::None }
    }

    fn scatter(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, ComponentLabel, ()>,
        edge: &EdgeView<'_, ComponentLabel, ()>,
        _changed: &bool,
        signals: &mut Signals<Empty>,
    ) {
        signals.signal(edge.target().id(), Empty);
    }
}

pub struct ConnectedComponents;

#[derive(Clone, Debug)]
pub struct ConnectedComponentsConfig {
    pub engine: EngineConfig,
}

impl Default for ConnectedComponentsConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                mode: ExecutionMode::Asynchronous,
                ..EngineConfig::default()
            },
        }
    }
}

#[derive(Debug)]
pub struct ConnectedComponentsOutput {
    /// Distinct labels after convergence.
    pub components: usize,
    pub status: EngineStatus,
}

impl GraphAlgorithm for ConnectedComponents {
    type VertexData = ComponentLabel;
    type EdgeData = ();
    type Config = ConnectedComponentsConfig;
    type Output = ConnectedComponentsOutput;

    fn name() -> &'static str {
        "connected_components"
    }

    fn run(graph: &Graph<ComponentLabel, ()>, config: Self::Config) -> Result<Self::Output> {
        graph.transform_vertices(|id, label| label.value = id.as_u64());

        let mut engine = build_engine(graph, MinNeighborProgram, config.engine)?;
        engine.signal_all();
        let report = engine.start()?;

        let labels = graph.map_reduce_vertices(
            |_, label: &ComponentLabel| FxHashSet::from_iter([label.value]),
            |mut a, b| {
                a.extend(b);
                a
            },
        );
        tracing::info!(components = labels.len(), "connected components finished");
        Ok(ConnectedComponentsOutput {
            components: labels.len(),
            status: report.status,
        })
    }
}
