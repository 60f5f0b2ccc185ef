// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Borrowed views over the store, handed to vertex-program operations.
//!
//! `VertexView` and `EdgeView` are read-only: payload reads return snapshots
//! taken at call time, never references into another vertex's cell.
//! `VertexMut` is the exclusive handle `apply` mutates through.

use crate::store::Graph;
use gale_common::VertexId;

/// Read-only view of one vertex.
pub struct VertexView<'g, V, E> {
    graph: &'g Graph<V, E>,
    slot: u32,
}

impl<'g, V, E> VertexView<'g, V, E> {
    pub(crate) fn new(graph: &'g Graph<V, E>, slot: u32) -> Self {
        Self { graph, slot }
    }

    pub fn id(&self) -> VertexId {
        self.graph.id_at(self.slot)
    }

    pub fn num_out_edges(&self) -> usize {
        self.graph.out_degree_at(self.slot)
    }

    pub fn num_in_edges(&self) -> usize {
        self.graph.in_degree_at(self.slot)
    }
}

impl<V: Clone, E> VertexView<'_, V, E> {
    /// Payload snapshot at call time.
    pub fn data(&self) -> V {
        self.graph.read_data_at(self.slot)
    }
}

/// Read-only view of one directed edge.
pub struct EdgeView<'g, V, E> {
    graph: &'g Graph<V, E>,
    index: u32,
}

impl<'g, V, E> EdgeView<'g, V, E> {
    pub(crate) fn new(graph: &'g Graph<V, E>, index: u32) -> Self {
        Self { graph, index }
    }

    pub fn source(&self) -> VertexView<'g, V, E> {
        let (source, _) = self.graph.edge_endpoints_at(self.index);
        VertexView::new(self.graph, source)
    }

    pub fn target(&self) -> VertexView<'g, V, E> {
        let (_, target) = self.graph.edge_endpoints_at(self.index);
        VertexView::new(self.graph, target)
    }

    /// The endpoint that is not `me`. With `EdgeSet::All` scans the same
    /// edge is seen from either side; this resolves "the neighbor".
    pub fn other(&self, me: VertexId) -> VertexView<'g, V, E> {
        let source = self.source();
        if source.id() == me {
            self.target()
        } else {
            source
        }
    }

    pub fn data(&self) -> &'g E {
        &self.graph.edges[self.index as usize].data
    }
}

/// Exclusive handle to one vertex's payload during `apply`.
pub struct VertexMut<'a, V> {
    id: VertexId,
    data: &'a mut V,
}

impl<'a, V> VertexMut<'a, V> {
    pub fn new(id: VertexId, data: &'a mut V) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn data(&mut self) -> &mut V {
        self.data
    }
}

impl<V, E> Graph<V, E> {
    /// View of the vertex in `slot`.
    pub fn vertex_view(&self, slot: u32) -> VertexView<'_, V, E> {
        VertexView::new(self, slot)
    }

    /// View of the edge with index `edge`.
    pub fn edge_view(&self, edge: u32) -> EdgeView<'_, V, E> {
        EdgeView::new(self, edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EdgeSet;

    #[test]
    fn test_edge_view_endpoints() {
        let mut g: Graph<u64, u64> = Graph::new();
        g.add_vertex(VertexId::new(7), 70).unwrap();
        g.add_vertex(VertexId::new(8), 80).unwrap();
        g.add_edge(VertexId::new(7), VertexId::new(8), 3).unwrap();
        g.finalize().unwrap();

        let slot = g.slot_of(VertexId::new(7)).unwrap();
        let edge_index = g.incident(slot, EdgeSet::Out).next().unwrap();
        let edge = g.edge_view(edge_index);

        assert_eq!(edge.source().id(), VertexId::new(7));
        assert_eq!(edge.target().id(), VertexId::new(8));
        assert_eq!(*edge.data(), 3);
        assert_eq!(edge.other(VertexId::new(7)).data(), 80);
        assert_eq!(edge.other(VertexId::new(8)).data(), 70);
    }

    #[test]
    fn test_vertex_mut_exposes_id_and_payload() {
        let mut value = 5u64;
        let mut cell = VertexMut::new(VertexId::new(1), &mut value);
        assert_eq!(cell.id(), VertexId::new(1));
        *cell.data() += 1;
        assert_eq!(value, 6);
    }
}
