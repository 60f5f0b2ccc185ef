// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Graph store for the Gale engine.
//!
//! A [`Graph`] holds a directed graph with typed per-vertex and per-edge
//! payloads, addressed by a stable [`gale_common::VertexId`]. It is built in
//! two phases: a mutable load phase (`add_vertex` / `add_edge`) and a locked
//! compute phase entered through `finalize()`, which compiles CSR adjacency
//! indices for both edge directions. Engines only accept finalized graphs.

pub mod aggregate;
pub mod loader;
pub mod store;
pub mod view;
pub mod writer;

pub use loader::{LoadReport, load_lines};
pub use store::{AdjacentEdge, EdgeSet, Graph};
pub use view::{EdgeView, VertexMut, VertexView};
pub use writer::{GraphWriter, SaveReport, save};
