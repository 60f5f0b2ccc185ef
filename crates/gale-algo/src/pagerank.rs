// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! PageRank power iteration.
//!
//! Gathers `rank / out_degree` over in-edges, applies the damped update and
//! keeps waking out-neighbors until the local delta drops under epsilon.

use crate::GraphAlgorithm;
use crate::combiners::RankSum;
use gale_common::{EngineConfig, Result};
use gale_engine::{Context, Empty, EngineStatus, Signals, VertexProgram, build_engine};
use gale_graph::{EdgeSet, EdgeView, Graph, VertexMut, VertexView};
use serde::{Deserialize, Serialize};

const DAMPING: f64 = 0.85;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankState {
    pub rank: f64,
}

impl Default for RankState {
    fn default() -> Self {
        Self { rank: 1.0 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageRankProgram {
    pub epsilon: f64,
}

impl Default for PageRankProgram {
    fn default() -> Self {
        Self { epsilon: 0.01 }
    }
}

impl VertexProgram for PageRankProgram {
    type VertexData = RankState;
    type EdgeData = ();
    type Gather = RankSum;
    type Message = Empty;
    /// Whether this vertex's rank settled under epsilon.
    type Decision = bool;

    fn gather_edges(&self, _ctx: &Context, _vertex: &VertexView<'_, RankState, ()>) -> EdgeSet {
        EdgeSet::In
    }

    fn gather(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, RankState, ()>,
        edge: &EdgeView<'_, RankState, ()>,
    ) -> RankSum {
        let source = edge.source();
        RankSum(source.data().rank / source.num_out_edges() as f64)
    }

    fn apply(
        &mut self,
        _ctx: &Context,
        vertex: &mut VertexMut<'_, RankState>,
        total: RankSum,
    ) -> bool {
        let next = (1.0 - DAMPING) + DAMPING * total.0;
        let delta = (vertex.data().rank - next).abs();
        vertex.data().rank = next;
        delta <= self.epsilon
    }

    fn scatter_edges(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, RankState, ()>,
        converged: &bool,
    ) -> EdgeSet {
        if *converged { EdgeSet::None } else { EdgeSet::Out }
    }

    fn scatter(
        &self,
        _ctx: &Context,
        _vertex: &VertexView<'_, RankState, ()>,
        edge: &EdgeView<'_, RankState, ()>,
        _converged: &bool,
        signals: &mut Signals<Empty>,
    ) {
        signals.signal(edge.target().id(), Empty);
    }
}

pub struct PageRank;

#[derive(Clone, Debug)]
pub struct PageRankConfig {
    pub epsilon: f64,
    pub engine: EngineConfig,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            engine: EngineConfig::default(),
        }
    }
}

#[derive(Debug)]
pub struct PageRankOutput {
    pub total_rank: f64,
    pub status: EngineStatus,
    pub supersteps: usize,
}

impl GraphAlgorithm for PageRank {
    type VertexData = RankState;
    type EdgeData = ();
    type Config = PageRankConfig;
    type Output = PageRankOutput;

    fn name() -> &'static str {
        "pagerank"
    }

    fn run(graph: &Graph<RankState, ()>, config: Self::Config) -> Result<Self::Output> {
        let program = PageRankProgram {
            epsilon: config.epsilon,
        };
        let mut engine = build_engine(graph, program, config.engine)?;
        engine.signal_all();
        let report = engine.start()?;

        let total_rank = graph.map_reduce_vertices(|_, state: &RankState| state.rank, |a, b| a + b);
        tracing::info!(
            total_rank,
            supersteps = report.supersteps,
            "pagerank finished"
        );
        Ok(PageRankOutput {
            total_rank,
            status: report.status,
            supersteps: report.supersteps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_test_graph;
    use gale_common::VertexId;

    #[test]
    fn test_uniform_cycle_is_the_fixed_point() {
        // 4-node cycle: every vertex has one in- and one out-edge, so the
        // uniform rank 1.0 satisfies r = 0.15 + 0.85 * r exactly.
        let edges = vec![(0, 1, ()), (1, 2, ()), (2, 3, ()), (3, 0, ())];
        let graph: Graph<RankState, ()> = build_test_graph(&[0, 1, 2, 3], edges);

        let output = PageRank::run(&graph, PageRankConfig::default()).unwrap();

        assert_eq!(output.status, EngineStatus::Converged);
        for id in 0..4 {
            let rank = graph.vertex_data(VertexId::new(id)).unwrap().rank;
            assert!((rank - 1.0).abs() <= 0.01, "rank({id}) = {rank}");
        }
        assert!((output.total_rank - 4.0).abs() <= 0.05);
    }

    #[test]
    fn test_sink_heavy_chain_orders_ranks() {
        // 0 -> 1 -> 2: rank must strictly increase down the chain.
        let graph: Graph<RankState, ()> =
            build_test_graph(&[0, 1, 2], vec![(0, 1, ()), (1, 2, ())]);

        let config = PageRankConfig {
            epsilon: 1e-4,
            engine: EngineConfig::default().with_max_supersteps(50),
        };
        PageRank::run(&graph, config).unwrap();

        let rank = |id: u64| graph.vertex_data(VertexId::new(id)).unwrap().rank;
        assert!(rank(0) < rank(1));
        assert!(rank(1) < rank(2));
    }
}
