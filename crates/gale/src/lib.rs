// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Gale: a vertex-centric Gather-Apply-Scatter graph-computation engine.
//!
//! The umbrella crate re-exports the store ([`graph`]), the execution
//! engines ([`engine`]) and the bundled algorithms ([`algo`]).

pub use gale_algo as algo;
pub use gale_engine as engine;
pub use gale_graph as graph;

pub use gale_common::{
    Consistency, EngineConfig, ExecutionMode, GaleError, Result, VertexId,
};
pub use gale_engine::{Combine, Empty, Engine, EngineStatus, RunReport, VertexProgram, build_engine};
pub use gale_graph::{EdgeSet, Graph};
