// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Result serialization through caller-supplied record formatters.

use crate::store::Graph;
use gale_common::{Result, VertexId};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Formats one record per vertex and/or edge. Returning an empty string
/// omits the record.
pub trait GraphWriter<V, E> {
    fn save_vertex(&self, id: VertexId, data: &V) -> String;

    fn save_edge(&self, source: VertexId, target: VertexId, data: &E) -> String {
        let _ = (source, target, data);
        String::new()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SaveReport {
    /// Vertex records written (after omissions).
    pub vertices: usize,
    /// Edge records written (after omissions).
    pub edges: usize,
    pub elapsed: Duration,
}

/// Writes the graph to `path` through `writer`.
pub fn save<V, E, W>(
    graph: &Graph<V, E>,
    path: &Path,
    writer: &W,
    save_vertices: bool,
    save_edges: bool,
) -> Result<SaveReport>
where
    W: GraphWriter<V, E>,
{
    let started = Instant::now();
    let mut out = BufWriter::new(File::create(path)?);
    let mut report = SaveReport::default();

    if save_vertices {
        let mut failure = None;
        graph.for_each_vertex(|id, data| {
            if failure.is_some() {
                return;
            }
            let record = writer.save_vertex(id, data);
            if record.is_empty() {
                return;
            }
            match out.write_all(record.as_bytes()) {
                Ok(()) => report.vertices += 1,
                Err(e) => failure = Some(e),
            }
        });
        if let Some(e) = failure {
            return Err(e.into());
        }
    }

    if save_edges {
        for edge in 0..graph.edge_count() as u32 {
            let view = graph.edge_view(edge);
            let record = writer.save_edge(view.source().id(), view.target().id(), view.data());
            if record.is_empty() {
                continue;
            }
            out.write_all(record.as_bytes())?;
            report.edges += 1;
        }
    }

    out.flush()?;
    report.elapsed = started.elapsed();

    tracing::info!(
        path = %path.display(),
        vertices = report.vertices,
        edges = report.edges,
        "graph saved"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EvenOnly;

    impl GraphWriter<u64, ()> for EvenOnly {
        fn save_vertex(&self, id: VertexId, data: &u64) -> String {
            if data % 2 == 0 {
                format!("{}\t{}\n", id, data)
            } else {
                String::new()
            }
        }
    }

    #[test]
    fn test_empty_record_is_omitted() {
        let mut g: Graph<u64, ()> = Graph::new();
        for raw in 0..4 {
            g.add_vertex(VertexId::new(raw), raw).unwrap();
        }
        g.finalize().unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        let report = save(&g, file.path(), &EvenOnly, true, false).unwrap();

        assert_eq!(report.vertices, 2);
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert!(contents.contains("0\t0"));
        assert!(contents.contains("2\t2"));
        assert!(!contents.contains("1\t1"));
    }
}
