// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Approximate diameter via Flajolet-Martin reachability sketches.
//!
//! Every vertex carries a fixed number of independently sampled geometric
//! bitmasks. One hop = one two-superstep engine run: at iteration 0 each
//! vertex sends its sketch along its out-edges, at iteration 1 each
//! receiver ORs the combined sketches into its own. After each hop a
//! map-reduce estimates the total number of reachable pairs; the hop count
//! where growth stalls is the diameter estimate.
//!
//! The hop program is keyed to the global superstep counter, so it runs on
//! the synchronous engine.

use crate::GraphAlgorithm;
use crate::combiners::BitmaskOr;
use gale_common::{EngineConfig, Result};
use gale_engine::{Context, Empty, Signals, SyncEngine, VertexProgram};
use gale_graph::{EdgeSet, EdgeView, Graph, VertexMut, VertexView};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Independent sketches per vertex; more sketches, tighter estimates.
pub const MASK_COUNT: usize = 10;

/// Flajolet-Martin correction constant.
const FM_CORRECTION: f64 = 0.77351;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReachSketch {
    pub masks: Vec<u32>,
}

impl ReachSketch {
    /// Samples `MASK_COUNT` single-bit masks at geometrically distributed
    /// positions.
    pub fn sample(rng: &mut impl Rng) -> Self {
        let masks = (0..MASK_COUNT)
            .map(|_| {
                let mut position = 0u32;
                while position < 31 && rng.gen::<f64>() < 0.5 {
                    position += 1;
                }
                1u32 << position
            })
            .collect();
        Self { masks }
    }

    /// Estimated cardinality of the set this sketch accumulated: two raised
    /// to the mean lowest-unset-bit index, scaled by the correction
    /// constant.
    pub fn estimate(&self) -> f64 {
        if self.masks.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .masks
            .iter()
            .map(|mask| (0..32).find(|bit| mask & (1 << bit) == 0).unwrap_or(0) as f64)
            .sum();
        2f64.powf(sum / self.masks.len() as f64) / FM_CORRECTION
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HopProgram {
    incoming: Vec<u32>,
}

impl VertexProgram for HopProgram {
    type VertexData = ReachSketch;
    type EdgeData = ();
    type Gather = Empty;
    type Message = BitmaskOr;
    type Decision = ();

    fn init(
        &mut self,
        _ctx: &Context,
        _vertex: &VertexView<'_, ReachSketch, ()>,
        message: BitmaskOr,
    ) {
        self.incoming = message.0;
    }

    fn apply(&mut self, ctx: &Context, vertex: &mut VertexMut<'_, ReachSketch>, _gathered: Empty) {
        if ctx.iteration() == 1 {
            let masks = &mut vertex.data().masks;
            if masks.len() < self.incoming.len() {
                masks.resize(self.incoming.len(), 0);
            }
            for (mask, bits) in masks.iter_mut().zip(&self.incoming) {
                *mask |= bits;
            }
        }
    }

    fn scatter_edges(
        &self,
        ctx: &Context,
        _vertex: &VertexView<'_, ReachSketch, ()>,
        _decision: &(),
    ) -> EdgeSet {
        if ctx.iteration() == 0 {
            EdgeSet::Out
        } else {
            EdgeSet::None
        }
    }

    fn scatter(
        &self,
        _ctx: &Context,
        vertex: &VertexView<'_, ReachSketch, ()>,
        edge: &EdgeView<'_, ReachSketch, ()>,
        _decision: &(),
        signals: &mut Signals<BitmaskOr>,
    ) {
        signals.signal(edge.target().id(), BitmaskOr(vertex.data().masks));
    }
}

pub struct ApproximateDiameter;

#[derive(Clone, Debug)]
pub struct ApproximateDiameterConfig {
    /// Upper bound on hops.
    pub max_hops: usize,
    /// Growth below `1 + epsilon` between hops counts as convergence.
    pub growth_epsilon: f64,
    /// Fixed RNG seed for reproducible sketches.
    pub seed: Option<u64>,
}

impl Default for ApproximateDiameterConfig {
    fn default() -> Self {
        Self {
            max_hops: 100,
            growth_epsilon: 1e-4,
            seed: None,
        }
    }
}

#[derive(Debug)]
pub struct ApproximateDiameterOutput {
    /// Hop count at which the reachable-pair estimate stalled.
    pub diameter: usize,
    /// Reachable-pair estimate at the last hop.
    pub pairs: f64,
    pub converged: bool,
}

impl GraphAlgorithm for ApproximateDiameter {
    type VertexData = ReachSketch;
    type EdgeData = ();
    type Config = ApproximateDiameterConfig;
    type Output = ApproximateDiameterOutput;

    fn name() -> &'static str {
        "approximate_diameter"
    }

    fn run(graph: &Graph<ReachSketch, ()>, config: Self::Config) -> Result<Self::Output> {
        let rng = Mutex::new(match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });
        graph.transform_vertices(|_, sketch| {
            *sketch = ReachSketch::sample(&mut *rng.lock());
        });

        let mut engine = SyncEngine::new(graph, HopProgram::default(), EngineConfig::synchronous())?;

        let mut previous = 0.0;
        let mut pairs = 0.0;
        let mut diameter = 0;
        let mut converged = false;
        for hop in 0..config.max_hops {
            engine.signal_all();
            engine.start()?;

            pairs = graph.map_reduce_vertices(
                |_, sketch: &ReachSketch| sketch.estimate(),
                |a, b| a + b,
            );
            tracing::info!(hop = hop + 1, pairs, "hop finished");

            if hop > 0 && pairs < previous * (1.0 + config.growth_epsilon) {
                diameter = hop;
                converged = true;
                break;
            }
            previous = pairs;
        }

        tracing::info!(diameter, converged, "approximate diameter finished");
        Ok(ApproximateDiameterOutput {
            diameter,
            pairs,
            converged,
        })
    }
}
