// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use gale_common::VertexId;
use gale_graph::Graph;

/// Builds a finalized graph from raw ids and directed edges. Endpoints not
/// listed in `vertex_ids` are auto-created with `V::default()`.
pub fn build_test_graph<V: Default, E>(
    vertex_ids: &[u64],
    edges: Vec<(u64, u64, E)>,
) -> Graph<V, E> {
    let mut graph = Graph::new();
    for &raw in vertex_ids {
        graph.add_vertex(VertexId::new(raw), V::default()).unwrap();
    }
    for (source, target, data) in edges {
        graph
            .add_edge(VertexId::new(source), VertexId::new(target), data)
            .unwrap();
    }
    graph.finalize().unwrap();
    graph
}

/// Directed edge pairs for an undirected edge list: both directions, unit
/// payload.
pub fn both_directions(edges: &[(u64, u64)]) -> Vec<(u64, u64, ())> {
    edges
        .iter()
        .flat_map(|&(a, b)| [(a, b, ()), (b, a, ())])
        .collect()
}
