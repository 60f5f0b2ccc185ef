// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Line-oriented graph loading through a caller-supplied parser.
//!
//! The loader owns only the file walk; the parser callback owns the format
//! and calls `add_vertex` / `add_edge` itself. A parser returning `false`
//! flags the line as malformed: the line is skipped and counted, never
//! fatal to the load.

use crate::store::Graph;
use gale_common::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    /// Non-blank lines visited.
    pub lines: usize,
    /// Lines the parser rejected.
    pub malformed: usize,
    pub elapsed: Duration,
}

/// Feeds every non-blank line of `path` to `parse`.
pub fn load_lines<V, E, P>(graph: &mut Graph<V, E>, path: &Path, mut parse: P) -> Result<LoadReport>
where
    P: FnMut(&mut Graph<V, E>, &str, &str) -> bool,
{
    let started = Instant::now();
    let filename = path.display().to_string();
    let file = File::open(path)?;

    let mut report = LoadReport::default();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        report.lines += 1;
        if !parse(graph, &filename, &line) {
            report.malformed += 1;
            tracing::warn!(file = %filename, line = report.lines, "malformed input line skipped");
        }
    }
    report.elapsed = started.elapsed();

    tracing::info!(
        file = %filename,
        lines = report.lines,
        malformed = report.malformed,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(report)
}
