// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Input format parsers and output writers for the driver.
//!
//! One adjacency-list line per vertex: `vid out_degree neighbor...`, with a
//! weight after each neighbor in the weighted variant and a side flag after
//! the vid in the bipartite variant. Parsers return `false` on malformed
//! lines; the loader counts and skips those.

use gale_algo::{ComponentLabel, Distance, MatchState, PruneLabel, RankState, ReachSketch, UNSET};
use gale_common::VertexId;
use gale_graph::{Graph, GraphWriter};

/// `vid out_degree neighbor...`
pub fn parse_adjacency<V: Default>(
    graph: &mut Graph<V, ()>,
    line: &str,
    allow_self_loops: bool,
) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(vid) = next_u64(&mut tokens) else {
        return false;
    };
    let Some(count) = next_u64(&mut tokens) else {
        return false;
    };

    if count == 0 && !add_vertex_once(graph, vid) {
        return false;
    }
    for _ in 0..count {
        let Some(neighbor) = next_u64(&mut tokens) else {
            return false;
        };
        if !allow_self_loops && neighbor == vid {
            continue;
        }
        if graph
            .add_edge(VertexId::new(vid), VertexId::new(neighbor), ())
            .is_err()
        {
            return false;
        }
    }
    true
}

/// `vid out_degree (neighbor weight)...`
pub fn parse_weighted_adjacency(graph: &mut Graph<Distance, f64>, line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(vid) = next_u64(&mut tokens) else {
        return false;
    };
    let Some(count) = next_u64(&mut tokens) else {
        return false;
    };

    if count == 0 && !add_vertex_once(graph, vid) {
        return false;
    }
    for _ in 0..count {
        let Some(neighbor) = next_u64(&mut tokens) else {
            return false;
        };
        let Some(weight) = tokens.next().and_then(|t| t.parse::<f64>().ok()) else {
            return false;
        };
        if graph
            .add_edge(VertexId::new(vid), VertexId::new(neighbor), weight)
            .is_err()
        {
            return false;
        }
    }
    true
}

/// `vid side neighbor...` — side `0` is the proposing half of the
/// bipartition.
pub fn parse_bipartite(graph: &mut Graph<MatchState, ()>, line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(vid) = next_u64(&mut tokens) else {
        return false;
    };
    let Some(side) = next_u64(&mut tokens) else {
        return false;
    };

    let state = MatchState::new(side == 0);
    if graph.add_vertex(VertexId::new(vid), state).is_err() {
        return false;
    }
    for neighbor in tokens {
        let Ok(neighbor) = neighbor.parse::<u64>() else {
            return false;
        };
        if graph
            .add_edge(VertexId::new(vid), VertexId::new(neighbor), ())
            .is_err()
        {
            return false;
        }
    }
    true
}

fn next_u64<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<u64> {
    tokens.next().and_then(|t| t.parse().ok())
}

// A vertex line repeated in the input is a data error; an id that only
// appeared as a neighbor so far upgrades cleanly.
fn add_vertex_once<V: Default, E>(graph: &mut Graph<V, E>, vid: u64) -> bool {
    graph.add_vertex(VertexId::new(vid), V::default()).is_ok()
}

// ── Writers ──────────────────────────────────────────────────────────────

pub struct RankWriter;

impl GraphWriter<RankState, ()> for RankWriter {
    fn save_vertex(&self, id: VertexId, data: &RankState) -> String {
        format!("{}\t{}\n", id, data.rank)
    }
}

/// Omits vertices the source never reached.
pub struct DistanceWriter;

impl GraphWriter<Distance, f64> for DistanceWriter {
    fn save_vertex(&self, id: VertexId, data: &Distance) -> String {
        if data.is_reached() {
            format!("{}\t{}\n", id, data.value)
        } else {
            String::new()
        }
    }
}

/// Omits vertices no propagation ever labelled.
pub struct ComponentWriter;

impl GraphWriter<ComponentLabel, ()> for ComponentWriter {
    fn save_vertex(&self, id: VertexId, data: &ComponentLabel) -> String {
        if data.value == u64::MAX {
            String::new()
        } else {
            format!("{}\t{}\n", id, data.value)
        }
    }
}

pub struct PruneLabelWriter;

impl GraphWriter<PruneLabel, ()> for PruneLabelWriter {
    fn save_vertex(&self, id: VertexId, data: &PruneLabel) -> String {
        if data.value == UNSET {
            String::new()
        } else {
            format!("{}\t{}\n", id, data.value)
        }
    }
}

pub struct ColorWriter;

impl GraphWriter<u64, ()> for ColorWriter {
    fn save_vertex(&self, id: VertexId, data: &u64) -> String {
        format!("{}\t{}\n", id, data)
    }
}

pub struct MatchWriter;

impl GraphWriter<MatchState, ()> for MatchWriter {
    fn save_vertex(&self, id: VertexId, data: &MatchState) -> String {
        format!("{}\t{}\n", id, data.match_to)
    }
}

pub struct SketchWriter;

impl GraphWriter<ReachSketch, ()> for SketchWriter {
    fn save_vertex(&self, id: VertexId, data: &ReachSketch) -> String {
        format!("{}\t{:.2}\n", id, data.estimate())
    }
}
