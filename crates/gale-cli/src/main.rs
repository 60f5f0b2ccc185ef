// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gale_algo::{
    ApproximateDiameter, ApproximateDiameterConfig, BipartiteMatching, BipartiteMatchingConfig,
    ComponentLabel, ConnectedComponents, ConnectedComponentsConfig, Distance, GraphAlgorithm,
    GreedyColoring, GreedyColoringConfig, MatchState, PageRank, PageRankConfig, PruneLabel,
    PrunedComponents, PrunedComponentsConfig, RankState, ReachSketch, ShortestPaths,
    ShortestPathsConfig,
};
use gale_common::{Consistency, EngineConfig, ExecutionMode, VertexId};
use gale_graph::{Graph, GraphWriter, load_lines, save};
use std::path::PathBuf;

pub mod formats;

#[derive(Parser)]
#[command(name = "gale")]
#[command(about = "Gale vertex-centric graph computation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Sync,
    Async,
}

#[derive(Args, Clone)]
struct IoArgs {
    /// Input adjacency-list file
    input: PathBuf,
    /// Where to write per-vertex results (skipped when absent)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct EngineArgs {
    #[arg(long, value_enum, default_value_t = Mode::Sync)]
    mode: Mode,
    /// Superstep cap (sync) or per-vertex activation cap (async)
    #[arg(long)]
    max_supersteps: Option<usize>,
    /// Worker threads for the asynchronous engine
    #[arg(long)]
    workers: Option<usize>,
}

impl EngineArgs {
    fn to_config(&self, consistency: Consistency) -> EngineConfig {
        EngineConfig {
            mode: match self.mode {
                Mode::Sync => ExecutionMode::Synchronous,
                Mode::Async => ExecutionMode::Asynchronous,
            },
            max_supersteps: self.max_supersteps,
            worker_threads: self.workers,
            consistency,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// PageRank power iteration
    Pagerank {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(long, default_value_t = 0.01)]
        epsilon: f64,
    },
    /// Single-source shortest paths (weighted input)
    Sssp {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(long, default_value_t = 0)]
        source: u64,
    },
    /// Connected components by min-label propagation
    Components {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// BFS-prune one component, then label the rest
    Ccsp {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(long, default_value_t = 0)]
        source: u64,
    },
    /// Greedy graph coloring
    Color {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Bipartite matching auction (bipartite input, synchronous only)
    Bmm {
        #[command(flatten)]
        io: IoArgs,
        #[arg(long)]
        max_rounds: Option<usize>,
    },
    /// Approximate diameter (synchronous only)
    Diameter {
        #[command(flatten)]
        io: IoArgs,
        #[arg(long, default_value_t = 100)]
        max_hops: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn load<V: Default, E>(
    io: &IoArgs,
    parse: impl FnMut(&mut Graph<V, E>, &str, &str) -> bool,
) -> Result<Graph<V, E>> {
    let mut graph = Graph::new();
    let report = load_lines(&mut graph, &io.input, parse)?;
    graph.finalize()?;
    println!(
        "Loaded {} vertices, {} edges in {:.3} seconds ({} malformed lines)",
        graph.vertex_count(),
        graph.edge_count(),
        report.elapsed.as_secs_f64(),
        report.malformed
    );
    Ok(graph)
}

fn dump<V, E, W: GraphWriter<V, E>>(graph: &Graph<V, E>, io: &IoArgs, writer: &W) -> Result<()> {
    if let Some(output) = &io.output {
        let report = save(graph, output, writer, true, false)?;
        println!(
            "Dumped {} records in {:.3} seconds",
            report.vertices,
            report.elapsed.as_secs_f64()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Pagerank { io, engine, epsilon } => {
            let graph: Graph<RankState, ()> =
                load(&io, |g, _, line| formats::parse_adjacency(g, line, false))?;
            let config = PageRankConfig {
                epsilon,
                engine: engine.to_config(Consistency::Vertex),
            };
            let output = PageRank::run(&graph, config)?;
            println!(
                "Finished in {} supersteps ({:?}); total rank {:.4}",
                output.supersteps, output.status, output.total_rank
            );
            dump(&graph, &io, &formats::RankWriter)?;
        }
        Commands::Sssp { io, engine, source } => {
            let graph: Graph<Distance, f64> =
                load(&io, |g, _, line| formats::parse_weighted_adjacency(g, line))?;
            let config = ShortestPathsConfig {
                source: VertexId::new(source),
                engine: engine.to_config(Consistency::Vertex),
            };
            let output = ShortestPaths::run(&graph, config)?;
            println!(
                "Finished in {} supersteps ({:?}); {} vertices reached",
                output.supersteps, output.status, output.reached
            );
            dump(&graph, &io, &formats::DistanceWriter)?;
        }
        Commands::Components { io, engine } => {
            let graph: Graph<ComponentLabel, ()> =
                load(&io, |g, _, line| formats::parse_adjacency(g, line, true))?;
            let config = ConnectedComponentsConfig {
                engine: engine.to_config(Consistency::Vertex),
            };
            let output = ConnectedComponents::run(&graph, config)?;
            println!(
                "Found {} components ({:?})",
                output.components, output.status
            );
            dump(&graph, &io, &formats::ComponentWriter)?;
        }
        Commands::Ccsp { io, engine, source } => {
            let graph: Graph<PruneLabel, ()> =
                load(&io, |g, _, line| formats::parse_adjacency(g, line, true))?;
            let config = PrunedComponentsConfig {
                source: VertexId::new(source),
                engine: engine.to_config(Consistency::Vertex),
            };
            let output = PrunedComponents::run(&graph, config)?;
            println!(
                "Pruned {} vertices; {} components remain",
                output.pruned, output.components
            );
            dump(&graph, &io, &formats::PruneLabelWriter)?;
        }
        Commands::Color { io, engine } => {
            let graph: Graph<u64, ()> =
                load(&io, |g, _, line| formats::parse_adjacency(g, line, true))?;
            let config = GreedyColoringConfig {
                engine: engine.to_config(Consistency::Edge),
            };
            let output = GreedyColoring::run(&graph, config)?;
            println!(
                "Used {} colors, {} conflicts remain ({:?})",
                output.colors_used, output.conflicts, output.status
            );
            dump(&graph, &io, &formats::ColorWriter)?;
        }
        Commands::Bmm { io, max_rounds } => {
            let graph: Graph<MatchState, ()> =
                load(&io, |g, _, line| formats::parse_bipartite(g, line))?;
            let config = BipartiteMatchingConfig {
                max_rounds,
                ..BipartiteMatchingConfig::default()
            };
            let output = BipartiteMatching::run(&graph, config)?;
            println!(
                "Matched {} pairs in {} rounds",
                output.matched, output.rounds
            );
            dump(&graph, &io, &formats::MatchWriter)?;
        }
        Commands::Diameter { io, max_hops, seed } => {
            let graph: Graph<ReachSketch, ()> =
                load(&io, |g, _, line| formats::parse_adjacency(g, line, true))?;
            let config = ApproximateDiameterConfig {
                max_hops,
                seed,
                ..ApproximateDiameterConfig::default()
            };
            let output = ApproximateDiameter::run(&graph, config)?;
            println!(
                "Approximate diameter {} (converged: {}); {:.0} reachable pairs",
                output.diameter, output.converged, output.pairs
            );
            dump(&graph, &io, &formats::SketchWriter)?;
        }
    }

    Ok(())
}
