// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Connected components with a BFS prune pass.
//!
//! Two sequential engine runs on one graph: a flood from a chosen source
//! marks its whole (weakly) connected region with the pruned sentinel, then
//! min-label propagation labels the remaining vertices. Pruned vertices
//! never participate in the second pass.

use crate::GraphAlgorithm;
use crate::combiners::MinI64;
use fxhash::FxHashSet;
use gale_common::{EngineConfig, Result, VertexId};
use gale_engine::{Context, Empty, Signals, VertexProgram, build_engine};
use gale_graph::{EdgeSet, EdgeView, Graph, VertexMut, VertexView};
use serde::{Deserialize, Serialize};

/// Label of a vertex that no pass has touched yet.
pub const UNSET: i64 = i64::MAX;

/// Sentinel for vertices removed by the BFS prune pass.
pub const PRUNED: i64 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneLabel {
    pub value: i64,
}

impl Default for PruneLabel {
    fn default() -> Self {
        Self { value: UNSET }
    }
}

/// Pass one: flood from the source, stamping every reached vertex with the
/// pruned sentinel. The message payload is ignored; reaching a vertex is
/// what marks it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BfsPruneProgram;

impl VertexProgram for BfsPruneProgram {
    type VertexData = PruneLabel;
    type EdgeData = ();
    type Gather = Empty;
    type Message = MinI64;
    type Decision = bool;

    fn apply(
        &mut self,
        _ctx: &Context,
        vertex: &mut VertexMut<'_, PruneLabel>,
        _gathered: Empty,
    ) -> bool {
        if vertex.data().value == PRUNED {
            return false;
        }
        vertex.data().value = PRUNED;
        true
    }

    fn scatter_edges(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, PruneLabel, ()>,
        changed: &bool,
    ) -> EdgeSet {
        if *changed { EdgeSet::All } else { EdgeSet::None }
    }

    fn scatter(
        &self,
        _ctx: &Context,
        vertex: &VertexView<'_, PruneLabel, ()>,
        edge: &EdgeView<'_, PruneLabel, ()>,
        _changed: &bool,
        signals: &mut Signals<MinI64>,
    ) {
        signals.signal(edge.target().id(), MinI64(vertex.data().value));
    }
}

/// Pass two: message-model min-label components. Every vertex adopts its own
/// id on the first superstep, then keeps the smallest incoming label.
/// Pruned vertices drop straight through both apply and scatter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinLabelProgram {
    min_label: i64,
}

impl Default for MinLabelProgram {
    fn default() -> Self {
        Self { min_label: UNSET }
    }
}

impl VertexProgram for MinLabelProgram {
    type VertexData = PruneLabel;
    type EdgeData = ();
    type Gather = Empty;
    type Message = MinI64;
    type Decision = bool;

    fn init(
        &mut self,
        _ctx: &Context,
        _vertex: &VertexView<'_, PruneLabel, ()>,
        message: MinI64,
    ) {
        self.min_label = message.0;
    }

    fn apply(
        &mut self,
        ctx: &Context,
        vertex: &mut VertexMut<'_, PruneLabel>,
        _gathered: Empty,
    ) -> bool {
        if vertex.data().value == PRUNED {
            return false;
        }
        if ctx.iteration() == 0 {
            vertex.data().value = vertex.id().as_u64() as i64;
            return true;
        }
        if vertex.data().value > self.min_label {
            vertex.data().value = self.min_label;
            return true;
        }
        false
    }

    fn scatter_edges(
        &self,
        _ctx: &Context,
        vertex: &VertexView<'_, PruneLabel, ()>,
        changed: &bool,
    ) -> EdgeSet {
        if vertex.data().value == PRUNED {
            return EdgeSet::None;
        }
        if *changed { EdgeSet::All } else { EdgeSet::None }
    }

    fn scatter(
        &self,
        _ctx: &Context,
        vertex: &VertexView<'_, PruneLabel, ()>,
        edge: &EdgeView<'_, PruneLabel, ()>,
        _changed: &bool,
        signals: &mut Signals<MinI64>,
    ) {
        signals.signal(edge.target().id(), MinI64(vertex.data().value));
    }
}

pub struct PrunedComponents;

#[derive(Clone, Debug)]
pub struct PrunedComponentsConfig {
    /// Root of the prune flood, typically inside the giant component.
    pub source: VertexId,
    pub engine: EngineConfig,
}

impl Default for PrunedComponentsConfig {
    fn default() -> Self {
        Self {
            source: VertexId::new(0),
            engine: EngineConfig::default(),
        }
    }
}

#[derive(Debug)]
pub struct PrunedComponentsOutput {
    /// Vertices stamped by the prune pass.
    pub pruned: u64,
    /// Distinct component labels outside the pruned region.
    pub components: usize,
}

impl GraphAlgorithm for PrunedComponents {
    type VertexData = PruneLabel;
    type EdgeData = ();
    type Config = PrunedComponentsConfig;
    type Output = PrunedComponentsOutput;

    fn name() -> &'static str {
        "pruned_components"
    }

    fn run(graph: &Graph<PruneLabel, ()>, config: Self::Config) -> Result<Self::Output> {
        let mut prune = build_engine(graph, BfsPruneProgram, config.engine.clone())?;
        prune.signal(config.source, MinI64(PRUNED))?;
        let prune_report = prune.start()?;
        tracing::info!(
            supersteps = prune_report.supersteps,
            "prune pass finished"
        );

        let mut label = build_engine(graph, MinLabelProgram::default(), config.engine)?;
        label.signal_all();
        let label_report = label.start()?;
        tracing::info!(
            supersteps = label_report.supersteps,
            "labelling pass finished"
        );

        let pruned = graph.map_reduce_vertices(
            |_, label: &PruneLabel| u64::from(label.value == PRUNED),
            |a, b| a + b,
        );
        let labels = graph.map_reduce_vertices(
            |_, label: &PruneLabel| {
                if label.value == PRUNED {
                    FxHashSet::default()
                } else {
                    FxHashSet::from_iter([label.value])
                }
            },
            |mut a, b| {
                a.extend(b);
                a
            },
        );
        Ok(PrunedComponentsOutput {
            pruned,
            components: labels.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{both_directions, build_test_graph};

    #[test]
    fn test_prune_then_label() {
        // Two triangles; the flood from 0 prunes the first, min-label
        // propagation labels the second with its minimum id.
        let edges = both_directions(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
        let graph: Graph<PruneLabel, ()> = build_test_graph(&[0, 1, 2, 3, 4, 5], edges);

        let output = PrunedComponents::run(&graph, PrunedComponentsConfig::default()).unwrap();

        assert_eq!(output.pruned, 3);
        assert_eq!(output.components, 1);
        for id in 0..3 {
            assert_eq!(graph.vertex_data(VertexId::new(id)).unwrap().value, PRUNED);
        }
        for id in 3..6 {
            assert_eq!(graph.vertex_data(VertexId::new(id)).unwrap().value, 3);
        }
    }

    #[test]
    fn test_isolated_source_prunes_only_itself() {
        let edges = both_directions(&[(1, 2)]);
        let graph: Graph<PruneLabel, ()> = build_test_graph(&[0, 1, 2], edges);

        let output = PrunedComponents::run(&graph, PrunedComponentsConfig::default()).unwrap();

        assert_eq!(output.pruned, 1);
        assert_eq!(output.components, 1);
        assert_eq!(graph.vertex_data(VertexId::new(1)).unwrap().value, 1);
        assert_eq!(graph.vertex_data(VertexId::new(2)).unwrap().value, 1);
    }
}
