// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Single-source shortest paths, message model.
//!
//! No gather: the combined incoming message already carries the best
//! proposed distance. A vertex that improves relaxes its out-edges.

use crate::GraphAlgorithm;
use crate::combiners::MinDistance;
use gale_common::{EngineConfig, Result, VertexId};
use gale_engine::{Context, Empty, EngineStatus, Signals, VertexProgram, build_engine};
use gale_graph::{EdgeSet, EdgeView, Graph, VertexMut, VertexView};
use serde::{Deserialize, Serialize};

/// Distance from the source; unreached vertices stay at infinity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
}

impl Default for Distance {
    fn default() -> Self {
        Self {
            value: f64::INFINITY,
        }
    }
}

impl Distance {
    pub fn is_reached(&self) -> bool {
        self.value.is_finite()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SsspProgram {
    proposed: f64,
}

impl Default for SsspProgram {
    fn default() -> Self {
        Self {
            proposed: f64::INFINITY,
        }
    }
}

impl VertexProgram for SsspProgram {
    type VertexData = Distance;
    type EdgeData = f64;
    type Gather = Empty;
    type Message = MinDistance;
    /// Whether the stored distance improved.
    type Decision = bool;

    fn init(
        &mut self,
        _ctx: &Context,
        _vertex: &VertexView<'_, Distance, f64>,
        message: MinDistance,
    ) {
        self.proposed = message.0;
    }

    fn apply(
        &mut self,
        _ctx: &Context,
        vertex: &mut VertexMut<'_, Distance>,
        _gathered: Empty,
    ) -> bool {
        if vertex.data().value > self.proposed {
            vertex.data().value = self.proposed;
            true
        } else {
            false
        }
    }

    fn scatter_edges(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, Distance, f64>,
        changed: &bool,
    ) -> EdgeSet {
        if *changed { EdgeSet::Out } else { EdgeSet::None }
    }

    fn scatter(
        &self,
        _ctx: &Context,
        vertex: &VertexView<'_, Distance, f64>,
        edge: &EdgeView<'_, Distance, f64>,
        _changed: &bool,
        signals: &mut Signals<MinDistance>,
    ) {
        let relaxed = vertex.data().value + edge.data();
        signals.signal(edge.target().id(), MinDistance(relaxed));
    }
}

pub struct ShortestPaths;

#[derive(Clone, Debug)]
pub struct ShortestPathsConfig {
    pub source: VertexId,
    pub engine: EngineConfig,
}

impl Default for ShortestPathsConfig {
    fn default() -> Self {
        Self {
            source: VertexId::new(0),
            engine: EngineConfig::default(),
        }
    }
}

#[derive(Debug)]
pub struct ShortestPathsOutput {
    /// Vertices with a finite distance after the run.
    pub reached: u64,
    pub status: EngineStatus,
    pub supersteps: usize,
}

impl GraphAlgorithm for ShortestPaths {
    type VertexData = Distance;
    type EdgeData = f64;
    type Config = ShortestPathsConfig;
    type Output = ShortestPathsOutput;

    fn name() -> &'static str {
        "sssp"
    }

    fn run(graph: &Graph<Distance, f64>, config: Self::Config) -> Result<Self::Output> {
        let mut engine = build_engine(graph, SsspProgram::default(), config.engine)?;
        engine.signal(config.source, MinDistance(0.0))?;
        let report = engine.start()?;

        let reached = graph.map_reduce_vertices(
            |_, distance: &Distance| u64::from(distance.is_reached()),
            |a, b| a + b,
        );
        tracing::info!(
            reached,
            supersteps = report.supersteps,
            "shortest paths finished"
        );
        Ok(ShortestPathsOutput {
            reached,
            status: report.status,
            supersteps: report.supersteps,
        })
    }
}
