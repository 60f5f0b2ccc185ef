// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Bipartite matching by a phase-cyclic auction.
//!
//! The protocol cycles four named phases keyed to the synchronous superstep
//! counter, so it requires the synchronous engine: all vertices must agree
//! on the phase. One engine run is exactly one cycle; the driver repeats
//! cycles until a whole round matches nobody new.
//!
//! Messages are duplicate-eliminating id sets. A granting vertex accepts
//! its lowest proposer and sends every other proposer the rejection
//! sentinel `-(id) - 1`; rejected proposers simply sit out the rest of the
//! cycle and bid again next round.

use crate::GraphAlgorithm;
use crate::combiners::SetUnion;
use fxhash::FxHashSet;
use gale_common::{EngineConfig, Result};
use gale_engine::{Context, Empty, Signals, SyncEngine, VertexProgram};
use gale_graph::{EdgeSet, EdgeView, Graph, VertexMut, VertexView};
use serde::{Deserialize, Serialize};

pub const UNMATCHED: i64 = -1;

/// The four auction phases, mapped from the superstep counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    /// Unmatched left vertices bid on every out-neighbor.
    Propose,
    /// Unmatched right vertices grant their lowest bidder and reject the
    /// rest with the sentinel.
    AcceptLowest,
    /// Left vertices take the lowest grant and confirm it.
    Grant,
    /// Right vertices finalize on an unambiguous single confirmation.
    Confirm,
}

impl MatchPhase {
    pub fn from_iteration(iteration: usize) -> Self {
        match iteration % 4 {
            0 => MatchPhase::Propose,
            1 => MatchPhase::AcceptLowest,
            2 => MatchPhase::Grant,
            _ => MatchPhase::Confirm,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// True for the proposing side of the bipartition.
    pub left: bool,
    pub match_to: i64,
    /// Match as of the end of the previous round; the driver's convergence
    /// check compares against this.
    pub last_match_to: i64,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            left: false,
            match_to: UNMATCHED,
            last_match_to: UNMATCHED,
        }
    }
}

impl MatchState {
    pub fn new(left: bool) -> Self {
        Self {
            left,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionProgram {
    msgs: FxHashSet<i64>,
    lowest: i64,
}

impl Default for AuctionProgram {
    fn default() -> Self {
        Self {
            msgs: FxHashSet::default(),
            lowest: i64::MAX,
        }
    }
}

impl VertexProgram for AuctionProgram {
    type VertexData = MatchState;
    type EdgeData = ();
    type Gather = Empty;
    type Message = SetUnion<i64>;
    /// Whether this vertex participates in the phase's scatter.
    type Decision = bool;

    fn init(
        &mut self,
        _ctx: &Context,
        _vertex: &VertexView<'_, MatchState, ()>,
        message: SetUnion<i64>,
    ) {
        self.lowest = message.0.iter().copied().min().unwrap_or(i64::MAX);
        self.msgs = message.0;
    }

    fn apply(
        &mut self,
        ctx: &Context,
        vertex: &mut VertexMut<'_, MatchState>,
        _gathered: Empty,
    ) -> bool {
        let state = *vertex.data();
        match MatchPhase::from_iteration(ctx.iteration()) {
            MatchPhase::Propose => state.left && state.match_to == UNMATCHED,
            MatchPhase::AcceptLowest => {
                !state.left && state.match_to == UNMATCHED && !self.msgs.is_empty()
            }
            MatchPhase::Grant => {
                if state.left && state.match_to == UNMATCHED {
                    // Rejection sentinels are negative; grants carry the
                    // granting vertex's id.
                    match self.msgs.iter().copied().filter(|m| *m >= 0).min() {
                        Some(grant) => {
                            vertex.data().match_to = grant;
                            true
                        }
                        None => false,
                    }
                } else {
                    false
                }
            }
            MatchPhase::Confirm => {
                if !state.left && state.match_to == UNMATCHED && self.msgs.len() == 1 {
                    if let Some(&confirmed) = self.msgs.iter().next() {
                        vertex.data().match_to = confirmed;
                    }
                }
                false
            }
        }
    }

    fn scatter_edges(
        &self,
        ctx: &Context,
        _vertex: &VertexView<'_, MatchState, ()>,
        update: &bool,
    ) -> EdgeSet {
        match MatchPhase::from_iteration(ctx.iteration()) {
            MatchPhase::Confirm => EdgeSet::None,
            _ if *update => EdgeSet::Out,
            _ => EdgeSet::None,
        }
    }

    fn scatter(
        &self,
        ctx: &Context,
        vertex: &VertexView<'_, MatchState, ()>,
        edge: &EdgeView<'_, MatchState, ()>,
        _update: &bool,
        signals: &mut Signals<SetUnion<i64>>,
    ) {
        let own = vertex.id().as_u64() as i64;
        let target = edge.target().id();
        let target_as_msg = target.as_u64() as i64;
        match MatchPhase::from_iteration(ctx.iteration()) {
            MatchPhase::Propose => {
                signals.signal(target, SetUnion::singleton(own));
            }
            MatchPhase::AcceptLowest => {
                if target_as_msg == self.lowest {
                    signals.signal(target, SetUnion::singleton(own));
                } else if self.msgs.contains(&target_as_msg) {
                    signals.signal(target, SetUnion::singleton(-own - 1));
                }
            }
            MatchPhase::Grant => {
                if target_as_msg == vertex.data().match_to {
                    signals.signal(target, SetUnion::singleton(own));
                }
            }
            MatchPhase::Confirm => {}
        }
    }
}

pub struct BipartiteMatching;

#[derive(Clone, Debug)]
pub struct BipartiteMatchingConfig {
    /// Safety bound on auction rounds; `None` runs until a quiet round.
    pub max_rounds: Option<usize>,
    /// Superstep cap handed to each per-round engine run.
    pub max_supersteps: Option<usize>,
}

impl Default for BipartiteMatchingConfig {
    fn default() -> Self {
        Self {
            max_rounds: None,
            max_supersteps: None,
        }
    }
}

#[derive(Debug)]
pub struct BipartiteMatchingOutput {
    /// Matched pairs.
    pub matched: u64,
    /// Auction rounds executed, including the final quiet one.
    pub rounds: usize,
}

impl GraphAlgorithm for BipartiteMatching {
    type VertexData = MatchState;
    type EdgeData = ();
    type Config = BipartiteMatchingConfig;
    type Output = BipartiteMatchingOutput;

    fn name() -> &'static str {
        "bipartite_matching"
    }

    fn run(graph: &Graph<MatchState, ()>, config: Self::Config) -> Result<Self::Output> {
        // The phase cycle is keyed to the global superstep counter, so the
        // auction always runs on the synchronous engine.
        let engine_config = EngineConfig {
            max_supersteps: config.max_supersteps,
            ..EngineConfig::synchronous()
        };
        let mut engine = SyncEngine::new(graph, AuctionProgram::default(), engine_config)?;

        let mut rounds = 0;
        loop {
            engine.signal_all();
            engine.start()?;
            rounds += 1;

            let changed = graph.map_reduce_vertices(
                |_, state: &MatchState| u64::from(state.match_to != state.last_match_to),
                |a, b| a + b,
            );
            tracing::info!(round = rounds, changed, "auction round finished");
            if changed == 0 {
                break;
            }
            graph.transform_vertices(|_, state| state.last_match_to = state.match_to);

            if let Some(max_rounds) = config.max_rounds {
                if rounds >= max_rounds {
                    break;
                }
            }
        }

        let matched = graph.map_reduce_vertices(
            |_, state: &MatchState| u64::from(state.left && state.match_to != UNMATCHED),
            |a, b| a + b,
        );
        Ok(BipartiteMatchingOutput { matched, rounds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{both_directions, build_test_graph};
    use gale_common::VertexId;

    #[test]
    fn test_phase_cycle() {
        assert_eq!(MatchPhase::from_iteration(0), MatchPhase::Propose);
        assert_eq!(MatchPhase::from_iteration(1), MatchPhase::AcceptLowest);
        assert_eq!(MatchPhase::from_iteration(2), MatchPhase::Grant);
        assert_eq!(MatchPhase::from_iteration(3), MatchPhase::Confirm);
        assert_eq!(MatchPhase::from_iteration(4), MatchPhase::Propose);
    }

    fn bipartite(left: &[u64], edges: &[(u64, u64)]) -> Graph<MatchState, ()> {
        let graph = build_test_graph(&[], both_directions(edges));
        let left: FxHashSet<u64> = left.iter().copied().collect();
        graph.transform_vertices(|id, state| {
            *state = MatchState::new(left.contains(&id.as_u64()));
        });
        graph
    }

    fn assert_matching_consistent(graph: &Graph<MatchState, ()>) {
        graph.for_each_vertex(|id, state| {
            if state.match_to != UNMATCHED {
                let partner = graph
                    .vertex_data(VertexId::new(state.match_to as u64))
                    .unwrap();
                assert_eq!(
                    partner.match_to,
                    id.as_u64() as i64,
                    "one-sided match at {id}"
                );
                assert_ne!(state.left, partner.left);
            }
        });
    }

    #[test]
    fn test_contended_right_vertex_grants_lowest_proposer() {
        // Both 0 and 1 bid on 10; 0 wins as the lowest proposer, and 1 has
        // no other neighbor, so it stays unmatched after a quiet round.
        let graph = bipartite(&[0, 1], &[(0, 10), (0, 11), (1, 10)]);

        let output = BipartiteMatching::run(&graph, BipartiteMatchingConfig::default()).unwrap();

        assert_eq!(output.matched, 1);
        assert_matching_consistent(&graph);
        let state = |id: u64| graph.vertex_data(VertexId::new(id)).unwrap();
        assert_eq!(state(0).match_to, 10);
        assert_eq!(state(10).match_to, 0);
        assert_eq!(state(1).match_to, UNMATCHED);
        assert_eq!(state(11).match_to, UNMATCHED);
    }

    #[test]
    fn test_rejected_proposer_falls_back_to_other_grant() {
        // 10 rejects 1 with the sentinel, but 11 grants 1 in the same
        // cycle; the sentinel must not poison the grant set.
        let graph = bipartite(&[0, 1], &[(0, 10), (1, 10), (1, 11)]);

        let output = BipartiteMatching::run(&graph, BipartiteMatchingConfig::default()).unwrap();

        assert_eq!(output.matched, 2);
        assert_matching_consistent(&graph);
        let state = |id: u64| graph.vertex_data(VertexId::new(id)).unwrap();
        assert_eq!(state(0).match_to, 10);
        assert_eq!(state(1).match_to, 11);
    }

    #[test]
    fn test_perfect_matching_on_disjoint_pairs() {
        let graph = bipartite(&[0, 1, 2], &[(0, 10), (1, 11), (2, 12)]);

        let output = BipartiteMatching::run(&graph, BipartiteMatchingConfig::default()).unwrap();

        assert_eq!(output.matched, 3);
        assert_matching_consistent(&graph);
    }
}
