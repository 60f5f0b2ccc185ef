// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! End-to-end acceptance tests for the bundled algorithms, driven through
//! the umbrella API.

use gale::algo::{
    ApproximateDiameter, ApproximateDiameterConfig, BipartiteMatching, BipartiteMatchingConfig,
    ComponentLabel, ConnectedComponents, ConnectedComponentsConfig, Distance, GraphAlgorithm,
    GreedyColoring, GreedyColoringConfig, MatchState, PageRank, PageRankConfig, PruneLabel,
    PrunedComponents, PrunedComponentsConfig, RankState, ReachSketch, ShortestPaths,
    ShortestPathsConfig, UNMATCHED,
};
use gale::{EngineConfig, EngineStatus, ExecutionMode, Graph, VertexId};

fn graph_from<V: Default, E>(edges: Vec<(u64, u64, E)>) -> Graph<V, E> {
    let mut graph = Graph::new();
    for (a, b, data) in edges {
        graph
            .add_edge(VertexId::new(a), VertexId::new(b), data)
            .unwrap();
    }
    graph.finalize().unwrap();
    graph
}

fn undirected(edges: &[(u64, u64)]) -> Vec<(u64, u64, ())> {
    edges
        .iter()
        .flat_map(|&(a, b)| [(a, b, ()), (b, a, ())])
        .collect()
}

#[test]
fn test_pagerank_cycle_total_rank() {
    let graph: Graph<RankState, ()> =
        graph_from(vec![(0, 1, ()), (1, 2, ()), (2, 3, ()), (3, 0, ())]);

    let output = PageRank::run(&graph, PageRankConfig::default()).unwrap();

    assert_eq!(output.status, EngineStatus::Converged);
    for raw in 0..4 {
        let rank = graph.vertex_data(VertexId::new(raw)).unwrap().rank;
        assert!((rank - 1.0).abs() <= 0.01);
    }
    assert!((output.total_rank - 4.0).abs() <= 0.05);
}

#[test]
fn test_sssp_prefers_two_hop_route() {
    let graph: Graph<Distance, f64> =
        graph_from(vec![(0, 1, 2.0), (1, 2, 3.0), (0, 2, 10.0)]);

    let output = ShortestPaths::run(&graph, ShortestPathsConfig::default()).unwrap();

    assert_eq!(output.status, EngineStatus::Converged);
    let dist = |raw: u64| graph.vertex_data(VertexId::new(raw)).unwrap().value;
    assert_eq!(dist(0), 0.0);
    assert_eq!(dist(1), 2.0);
    assert_eq!(dist(2), 5.0);
}

#[test]
fn test_components_two_triangles_both_engines() {
    for mode in [ExecutionMode::Synchronous, ExecutionMode::Asynchronous] {
        let graph: Graph<ComponentLabel, ()> =
            graph_from(undirected(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]));

        let config = ConnectedComponentsConfig {
            engine: EngineConfig {
                mode,
                ..EngineConfig::default()
            },
        };
        let output = ConnectedComponents::run(&graph, config).unwrap();

        assert_eq!(output.components, 2, "mode {mode:?}");
        for raw in 0..3 {
            assert_eq!(graph.vertex_data(VertexId::new(raw)).unwrap().value, 0);
        }
        for raw in 3..6 {
            assert_eq!(graph.vertex_data(VertexId::new(raw)).unwrap().value, 3);
        }
    }
}

#[test]
fn test_pruned_components_chain() {
    // The prune flood from 0 eats the triangle; labelling gets the square.
    let graph: Graph<PruneLabel, ()> =
        graph_from(undirected(&[(0, 1), (1, 2), (2, 0), (6, 7), (7, 8), (8, 9), (9, 6)]));

    let output = PrunedComponents::run(&graph, PrunedComponentsConfig::default()).unwrap();

    assert_eq!(output.pruned, 3);
    assert_eq!(output.components, 1);
    assert_eq!(graph.vertex_data(VertexId::new(7)).unwrap().value, 6);
}

#[test]
fn test_coloring_validity_on_wheel() {
    // Wheel: 5-cycle plus a hub adjacent to every rim vertex.
    let mut edges = vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
    for rim in 0..5 {
        edges.push((5, rim));
    }
    let graph: Graph<u64, ()> = graph_from(undirected(&edges));

    let output = GreedyColoring::run(&graph, GreedyColoringConfig::default()).unwrap();

    assert_eq!(output.conflicts, 0);
    // Max degree is 5 (the hub).
    assert!(output.colors_used <= 6);

    let conflicts = graph.map_reduce_edges(
        |edge| u64::from(edge.source().data() == edge.target().data()),
        |a, b| a + b,
    );
    assert_eq!(conflicts, 0);
}

#[test]
fn test_matching_on_crown() {
    // Complete bipartite 2x2 plus a pendant pair.
    let graph: Graph<MatchState, ()> = graph_from(undirected(&[
        (0, 10),
        (0, 11),
        (1, 10),
        (1, 11),
        (2, 12),
    ]));
    graph.transform_vertices(|id, state| {
        *state = MatchState::new(id.as_u64() < 10);
    });

    let output = BipartiteMatching::run(&graph, BipartiteMatchingConfig::default()).unwrap();

    assert_eq!(output.matched, 3);
    graph.for_each_vertex(|id, state| {
        if state.match_to != UNMATCHED {
            let partner = graph
                .vertex_data(VertexId::new(state.match_to as u64))
                .unwrap();
            assert_eq!(partner.match_to, id.as_u64() as i64);
        }
    });
}

#[test]
fn test_diameter_on_seeded_path() {
    let graph: Graph<ReachSketch, ()> =
        graph_from(vec![(0, 1, ()), (1, 2, ()), (2, 3, ())]);

    let config = ApproximateDiameterConfig {
        seed: Some(7),
        ..ApproximateDiameterConfig::default()
    };
    let output = ApproximateDiameter::run(&graph, config).unwrap();

    assert!(output.converged);
    assert!((1..=3).contains(&output.diameter));
}

#[test]
fn test_pagerank_rerun_is_stable() {
    let graph: Graph<RankState, ()> =
        graph_from(vec![(0, 1, ()), (1, 2, ()), (2, 0, ()), (0, 2, ())]);

    let first = PageRank::run(&graph, PageRankConfig::default()).unwrap();
    let ranks: Vec<f64> = graph
        .vertex_ids()
        .map(|id| graph.vertex_data(id).unwrap().rank)
        .collect();

    let second = PageRank::run(&graph, PageRankConfig::default()).unwrap();
    let reranked: Vec<f64> = graph
        .vertex_ids()
        .map(|id| graph.vertex_data(id).unwrap().rank)
        .collect();

    assert_eq!(first.status, EngineStatus::Converged);
    assert_eq!(second.status, EngineStatus::Converged);
    for (a, b) in ranks.iter().zip(&reranked) {
        assert!((a - b).abs() <= 0.02);
    }
}
