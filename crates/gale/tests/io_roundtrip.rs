// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Loader and writer boundary tests: callback-driven parsing with
//! malformed-line accounting, and empty-record omission on save.

use gale::algo::{Distance, GraphAlgorithm, ShortestPaths, ShortestPathsConfig};
use gale::graph::{GraphWriter, load_lines, save};
use gale::{Graph, VertexId};
use std::io::Write;

/// `vid out_degree (neighbor weight)...`, the SSSP input format.
fn parse_weighted(graph: &mut Graph<Distance, f64>, line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(vid) = tokens.next().and_then(|t| t.parse::<u64>().ok()) else {
        return false;
    };
    let Some(count) = tokens.next().and_then(|t| t.parse::<usize>().ok()) else {
        return false;
    };
    if count == 0 && graph.add_vertex(VertexId::new(vid), Distance::default()).is_err() {
        return false;
    }
    for _ in 0..count {
        let (Some(neighbor), Some(weight)) = (
            tokens.next().and_then(|t| t.parse::<u64>().ok()),
            tokens.next().and_then(|t| t.parse::<f64>().ok()),
        ) else {
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

struct ReachedWriter;

impl GraphWriter<Distance, f64> for ReachedWriter {
    fn save_vertex(&self, id: VertexId, data: &Distance) -> String {
        if data.is_reached() {
            format!("{}\t{}\n", id, data.value)
        } else {
            String::new()
        }
    }
}

#[test]
fn test_load_run_save_roundtrip() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    writeln!(input, "0 2 1 2 2 10").unwrap();
    writeln!(input, "1 1 2 3").unwrap();
    writeln!(input, "not a line at all").unwrap();
    writeln!(input, "2 0").unwrap();
    writeln!(input, "9 0").unwrap();
    input.flush().unwrap();

    let mut graph: Graph<Distance, f64> = Graph::new();
    let report = load_lines(&mut graph, input.path(), |g, _, line| {
        parse_weighted(g, line)
    })
    .unwrap();
    graph.finalize().unwrap();

    assert_eq!(report.lines, 5);
    assert_eq!(report.malformed, 1);
    assert_eq!(graph.vertex_count(), 4);
    assert_eq!(graph.edge_count(), 3);

    ShortestPaths::run(&graph, ShortestPathsConfig::default()).unwrap();

    let output = tempfile::NamedTempFile::new().unwrap();
    let saved = save(&graph, output.path(), &ReachedWriter, true, false).unwrap();

    // Vertex 9 is disconnected and must be omitted.
    assert_eq!(saved.vertices, 3);
    let contents = std::fs::read_to_string(output.path()).unwrap();
    assert!(contents.contains("0\t0\n"));
    assert!(contents.contains("1\t2\n"));
    assert!(contents.contains("2\t5\n"));
    assert!(!contents.contains("9\t"));
}

#[test]
fn test_checkpoint_survives_json_roundtrip() {
    use gale::algo::SsspProgram;
    use gale::algo::combiners::MinDistance;
    use gale::engine::{EngineCheckpoint, SyncEngine};
    use gale::EngineConfig;

    let mut graph: Graph<Distance, f64> = Graph::new();
    graph
        .add_edge(VertexId::new(0), VertexId::new(1), 1.0)
        .unwrap();
    graph.finalize().unwrap();

    let mut engine =
        SyncEngine::new(&graph, SsspProgram::default(), EngineConfig::default()).unwrap();
    engine.signal(VertexId::new(0), MinDistance(0.0)).unwrap();

    let mut buffer = Vec::new();
    engine.write_checkpoint(&mut buffer).unwrap();

    let checkpoint: EngineCheckpoint<MinDistance> =
        SyncEngine::<SsspProgram>::read_checkpoint(buffer.as_slice()).unwrap();
    assert_eq!(checkpoint.pending, vec![(VertexId::new(0), MinDistance(0.0))]);

    let mut resumed =
        SyncEngine::new(&graph, SsspProgram::default(), EngineConfig::default()).unwrap();
    resumed.restore(checkpoint).unwrap();
    resumed.start().unwrap();

    assert_eq!(graph.vertex_data(VertexId::new(1)).unwrap().value, 1.0);
}
