// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Greedy graph coloring.
//!
//! Gathers the distinct colors of the whole neighborhood, takes the
//! smallest free one, and re-signals the far end of any edge that is still
//! monochromatic. Under an edge-consistent asynchronous run the conflict
//! re-signalling is unnecessary and scatter is disabled: neighborhood
//! locking means the later endpoint of every edge already saw the earlier
//! one's final color.

use crate::GraphAlgorithm;
use crate::combiners::SetUnion;
use fxhash::FxHashSet;
use gale_common::{Consistency, EngineConfig, ExecutionMode, Result};
use gale_engine::{Context, Empty, EngineStatus, Signals, VertexProgram, build_engine};
use gale_graph::{EdgeSet, EdgeView, Graph, VertexMut, VertexView};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColoringProgram {
    /// Set when the engine run guarantees edge consistency.
    pub edge_consistent: bool,
}

impl Default for ColoringProgram {
    fn default() -> Self {
        Self {
            edge_consistent: false,
        }
    }
}

impl VertexProgram for ColoringProgram {
    type VertexData = u64;
    type EdgeData = ();
    type Gather = SetUnion<u64>;
    type Message = Empty;
    type Decision = ();

    fn gather_edges(&self, _ctx: &Context, _vertex: &VertexView<'_, u64, ()>) -> EdgeSet {
        EdgeSet::All
    }

    fn gather(
        &self,
        _ctx: &Context,
        vertex: &VertexView<'_, u64, ()>,
        edge: &EdgeView<'_, u64, ()>,
    ) -> SetUnion<u64> {
        SetUnion::singleton(edge.other(vertex.id()).data())
    }

    fn apply(
        &mut self,
        _ctx: &Context,
        vertex: &mut VertexMut<'_, u64>,
        neighborhood: SetUnion<u64>,
    ) {
        // Smallest color absent from the neighborhood; at most degree + 1.
        for candidate in 0..=neighborhood.0.len() as u64 {
            if !neighborhood.0.contains(&candidate) {
                *vertex.data() = candidate;
                break;
            }
        }
    }

    fn scatter_edges(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, u64, ()>,
        _decision: &(),
    ) -> EdgeSet {
        if self.edge_consistent {
            EdgeSet::None
        } else {
            EdgeSet::All
        }
    }

    fn scatter(
        &self,
        _ctx: &Context,
        vertex: &VertexView<'_, u64, ()>,
        edge: &EdgeView<'_, u64, ()>,
        _decision: &(),
        signals: &mut Signals<Empty>,
    ) {
        if edge.source().data() == edge.target().data() {
            signals.signal(edge.other(vertex.id()).id(), Empty);
        }
    }
}

pub struct GreedyColoring;

#[derive(Clone, Debug)]
pub struct GreedyColoringConfig {
    pub engine: EngineConfig,
}

impl Default for GreedyColoringConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                mode: ExecutionMode::Asynchronous,
                consistency: Consistency::Edge,
                ..EngineConfig::default()
            },
        }
    }
}

#[derive(Debug)]
pub struct GreedyColoringOutput {
    /// Distinct colors in use after the run.
    pub colors_used: usize,
    /// Monochromatic edges left (0 on a converged run).
    pub conflicts: u64,
    pub status: EngineStatus,
}

impl GraphAlgorithm for GreedyColoring {
    type VertexData = u64;
    type EdgeData = ();
    type Config = GreedyColoringConfig;
    type Output = GreedyColoringOutput;

    fn name() -> &'static str {
        "greedy_coloring"
    }

    fn run(graph: &Graph<u64, ()>, config: Self::Config) -> Result<Self::Output> {
        let program = ColoringProgram {
            edge_consistent: config.engine.mode == ExecutionMode::Asynchronous
                && config.engine.consistency == Consistency::Edge,
        };
        let mut engine = build_engine(graph, program, config.engine)?;
        engine.signal_all();
        let report = engine.start()?;

        let conflicts = graph.map_reduce_edges(
            |edge| u64::from(edge.source().data() == edge.target().data()),
            |a, b| a + b,
        );
        let colors = graph.map_reduce_vertices(
            |_, color: &u64| FxHashSet::from_iter([*color]),
            |mut a, b| {
                a.extend(b);
                a
            },
        );
        tracing::info!(
            colors_used = colors.len(),
            conflicts,
            "coloring finished"
        );
        Ok(GreedyColoringOutput {
            colors_used: colors.len(),
            conflicts,
            status: report.status,
        })
    }
}
