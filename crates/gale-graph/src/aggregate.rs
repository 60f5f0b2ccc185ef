// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Parallel map-reduce over vertex and edge data.
//!
//! Invoked by hosts after or between engine runs for global scalars: total
//! rank, changed-vertex counts, coloring conflicts, reachable-pair
//! estimates. `combine` must tolerate any fold order, the same requirement
//! the engine places on message combiners.

use crate::store::Graph;
use crate::view::EdgeView;
use gale_common::VertexId;
use rayon::prelude::*;

impl<V: Send + Sync, E: Send + Sync> Graph<V, E> {
    /// Maps every vertex payload snapshot and reduces with `combine`,
    /// starting from `T::default()` on each parallel split.
    pub fn map_reduce_vertices<T, M, C>(&self, map: M, combine: C) -> T
    where
        T: Default + Send,
        M: Fn(VertexId, &V) -> T + Send + Sync,
        C: Fn(T, T) -> T + Send + Sync,
    {
        (0..self.vertex_count() as u32)
            .into_par_iter()
            .map(|slot| map(self.id_at(slot), &*self.data[slot as usize].read()))
            .reduce(T::default, &combine)
    }

    /// Maps every edge and reduces with `combine`. Endpoint reads through
    /// the view are snapshots at call time.
    pub fn map_reduce_edges<T, M, C>(&self, map: M, combine: C) -> T
    where
        T: Default + Send,
        M: Fn(EdgeView<'_, V, E>) -> T + Send + Sync,
        C: Fn(T, T) -> T + Send + Sync,
    {
        (0..self.edge_count() as u32)
            .into_par_iter()
            .map(|edge| map(self.edge_view(edge)))
            .reduce(T::default, &combine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_reduce_vertices_sums() {
        let mut g: Graph<u64, ()> = Graph::new();
        for raw in 1..=10 {
            g.add_vertex(VertexId::new(raw), raw).unwrap();
        }
        g.finalize().unwrap();

        let total = g.map_reduce_vertices(|_, value| *value, |a, b| a + b);
        assert_eq!(total, 55);
    }

    #[test]
    fn test_map_reduce_edges_counts_conflicts() {
        // Two vertices with equal payloads joined by an edge: one conflict.
        let mut g: Graph<u64, ()> = Graph::new();
        g.add_vertex(VertexId::new(0), 1).unwrap();
        g.add_vertex(VertexId::new(1), 1).unwrap();
        g.add_vertex(VertexId::new(2), 2).unwrap();
        g.add_edge(VertexId::new(0), VertexId::new(1), ()).unwrap();
        g.add_edge(VertexId::new(1), VertexId::new(2), ()).unwrap();
        g.finalize().unwrap();

        let conflicts = g.map_reduce_edges(
            |edge| u64::from(edge.source().data() == edge.target().data()),
            |a, b| a + b,
        );
        assert_eq!(conflicts, 1);
    }
}
