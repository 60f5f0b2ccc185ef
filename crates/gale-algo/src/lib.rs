// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Graph algorithms for the Gale engine.
//!
//! Every algorithm here is a plug-in vertex program against the engine
//! contract plus a thin driver that wires up signalling, outer convergence
//! loops and the aggregation passes the host would otherwise run by hand.

use gale_common::Result;
use gale_graph::Graph;

pub mod combiners;

/// Core trait for all algorithm drivers.
pub trait GraphAlgorithm {
    /// Vertex payload the algorithm computes over.
    type VertexData;
    /// Edge payload the algorithm computes over.
    type EdgeData;
    /// Algorithm parameters.
    type Config: Clone;
    /// Result type.
    type Output;

    /// Algorithm identifier.
    fn name() -> &'static str;

    /// Execute the algorithm on a finalized graph.
    fn run(
        graph: &Graph<Self::VertexData, Self::EdgeData>,
        config: Self::Config,
    ) -> Result<Self::Output>;
}

mod pagerank;
pub use pagerank::{PageRank, PageRankConfig, PageRankOutput, PageRankProgram, RankState};

mod sssp;
pub use sssp::{Distance, ShortestPaths, ShortestPathsConfig, ShortestPathsOutput, SsspProgram};

mod components;
pub use components::{
    ComponentLabel, ConnectedComponents, ConnectedComponentsConfig, ConnectedComponentsOutput,
    MinNeighborProgram,
};

mod ccsp;
pub use ccsp::{
    BfsPruneProgram, MinLabelProgram, PRUNED, PruneLabel, PrunedComponents,
    PrunedComponentsConfig, PrunedComponentsOutput, UNSET,
};

mod coloring;
pub use coloring::{ColoringProgram, GreedyColoring, GreedyColoringConfig, GreedyColoringOutput};

mod matching;
pub use matching::{
    AuctionProgram, BipartiteMatching, BipartiteMatchingConfig, BipartiteMatchingOutput,
    MatchPhase, MatchState, UNMATCHED,
};

mod diameter;
pub use diameter::{
    ApproximateDiameter, ApproximateDiameterConfig, ApproximateDiameterOutput, HopProgram,
    ReachSketch,
};

#[cfg(test)]
pub mod test_utils;
