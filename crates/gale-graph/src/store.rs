// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Two-phase graph store: mutable load phase, then a finalized compute phase
//! with CSR adjacency for both edge directions.

use fxhash::FxBuildHasher;
use gale_common::{GaleError, Result, VertexId};
use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::HashMap;

/// Type alias for FxHashMap (faster hashing for integer keys)
type FxHashMap<K, V> = HashMap<K, V, FxBuildHasher>;

/// Which incident edge set an operation walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeSet {
    None,
    In,
    Out,
    All,
}

/// Directed edge: endpoint slots plus the user payload.
pub(crate) struct EdgeRecord<E> {
    pub(crate) source: u32,
    pub(crate) target: u32,
    pub(crate) data: E,
}

/// Compressed sparse row index: `offsets[v]..offsets[v+1]` is the slice of
/// `edge_indices` incident to slot `v`.
#[derive(Default)]
struct Csr {
    offsets: Vec<u32>,
    edge_indices: Vec<u32>,
}

impl Csr {
    /// Build from one endpoint per edge (prefix-sum construction).
    fn build(vertex_count: usize, keys: &[u32]) -> Self {
        let mut degrees = vec![0u32; vertex_count];
        for &key in keys {
            degrees[key as usize] += 1;
        }

        let mut offsets = vec![0u32; vertex_count + 1];
        for v in 0..vertex_count {
            offsets[v + 1] = offsets[v] + degrees[v];
        }

        let mut edge_indices = vec![0u32; keys.len()];
        let mut cursor = offsets.clone();
        for (edge, &key) in keys.iter().enumerate() {
            let at = cursor[key as usize] as usize;
            edge_indices[at] = edge as u32;
            cursor[key as usize] += 1;
        }

        Self {
            offsets,
            edge_indices,
        }
    }

    fn slice(&self, slot: u32) -> &[u32] {
        if self.offsets.is_empty() {
            return &[];
        }
        let start = self.offsets[slot as usize] as usize;
        let end = self.offsets[slot as usize + 1] as usize;
        &self.edge_indices[start..end]
    }
}

/// A directed edge adjacent to a queried vertex, with the neighbor's data
/// snapshot taken at call time.
#[derive(Clone, Debug)]
pub struct AdjacentEdge<V, E> {
    pub neighbor: VertexId,
    pub neighbor_data: V,
    pub edge_data: E,
}

/// Partitioned directed graph with typed payloads.
///
/// Vertex data cells sit behind per-vertex locks: the store owns the data and
/// arbitrates handoff between engine activations, so payloads are only ever
/// mutated through `apply` (via [`Graph::with_data_mut`]) or
/// [`Graph::transform_vertices`].
pub struct Graph<V, E> {
    pub(crate) ids: Vec<VertexId>,
    pub(crate) index: FxHashMap<VertexId, u32>,
    pub(crate) data: Vec<RwLock<V>>,
    /// Slots inserted through `add_vertex` rather than auto-created by
    /// `add_edge`; governs the duplicate-insert policy.
    explicit: Vec<bool>,
    pub(crate) edges: Vec<EdgeRecord<E>>,
    out: Csr,
    incoming: Csr,
    finalized: bool,
}

impl<V, E> Default for Graph<V, E> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            index: HashMap::with_hasher(FxBuildHasher::default()),
            data: Vec::new(),
            explicit: Vec::new(),
            edges: Vec::new(),
            out: Csr::default(),
            incoming: Csr::default(),
            finalized: false,
        }
    }
}

impl<V, E> Graph<V, E> {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            ids: Vec::with_capacity(vertices),
            index: HashMap::with_capacity_and_hasher(vertices, FxBuildHasher::default()),
            data: Vec::with_capacity(vertices),
            explicit: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            ..Self::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.index.contains_key(&id)
    }

    /// Iterator over all vertex ids, in slot order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.ids.iter().copied()
    }

    fn insert_slot(&mut self, id: VertexId, data: V, explicit: bool) -> u32 {
        let slot = self.ids.len() as u32;
        self.ids.push(id);
        self.index.insert(id, slot);
        self.data.push(RwLock::new(data));
        self.explicit.push(explicit);
        slot
    }

    /// Adds a vertex with its payload.
    ///
    /// Re-adding an id that was only auto-created by `add_edge` upgrades the
    /// placeholder with the supplied payload; re-adding an explicitly added
    /// id is a [`GaleError::DuplicateVertex`].
    pub fn add_vertex(&mut self, id: VertexId, data: V) -> Result<()> {
        if self.finalized {
            return Err(GaleError::TopologyLocked);
        }
        match self.index.get(&id).copied() {
            Some(slot) if self.explicit[slot as usize] => Err(GaleError::DuplicateVertex { id }),
            Some(slot) => {
                *self.data[slot as usize].get_mut() = data;
                self.explicit[slot as usize] = true;
                Ok(())
            }
            None => {
                self.insert_slot(id, data, true);
                Ok(())
            }
        }
    }

    /// Locks the topology and compiles the adjacency indices for both edge
    /// directions. Must be called exactly once, before any engine run.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(GaleError::TopologyLocked);
        }
        let sources: Vec<u32> = self.edges.iter().map(|e| e.source).collect();
        let targets: Vec<u32> = self.edges.iter().map(|e| e.target).collect();
        self.out = Csr::build(self.vertex_count(), &sources);
        self.incoming = Csr::build(self.vertex_count(), &targets);
        self.finalized = true;
        tracing::debug!(
            vertices = self.vertex_count(),
            edges = self.edge_count(),
            "topology finalized"
        );
        Ok(())
    }

    // ── Slot-level accessors used by engines and views ───────────────────

    pub fn slot_of(&self, id: VertexId) -> Option<u32> {
        self.index.get(&id).copied()
    }

    /// Id of the vertex in `slot`. Slots are dense indices in `0..vertex_count()`.
    pub fn id_at(&self, slot: u32) -> VertexId {
        self.ids[slot as usize]
    }

    pub fn out_degree_at(&self, slot: u32) -> usize {
        self.out.slice(slot).len()
    }

    pub fn in_degree_at(&self, slot: u32) -> usize {
        self.incoming.slice(slot).len()
    }

    /// Edge indices incident to `slot` in the requested direction(s).
    /// Empty before `finalize`.
    pub fn incident(&self, slot: u32, set: EdgeSet) -> impl Iterator<Item = u32> + '_ {
        let (a, b): (&[u32], &[u32]) = match set {
            EdgeSet::None => (&[], &[]),
            EdgeSet::Out => (self.out.slice(slot), &[]),
            EdgeSet::In => (self.incoming.slice(slot), &[]),
            EdgeSet::All => (self.out.slice(slot), self.incoming.slice(slot)),
        };
        a.iter().chain(b.iter()).copied()
    }

    /// Endpoint slots `(source, target)` of an edge index.
    pub fn edge_endpoints_at(&self, edge: u32) -> (u32, u32) {
        let record = &self.edges[edge as usize];
        (record.source, record.target)
    }

    /// Runs `f` against the exclusively locked payload of `slot`.
    pub fn with_data_mut<R>(&self, slot: u32, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.data[slot as usize].write())
    }
}

impl<V: Clone, E> Graph<V, E> {
    /// Payload snapshot of the vertex in `slot`, taken at call time.
    pub fn read_data_at(&self, slot: u32) -> V {
        self.data[slot as usize].read().clone()
    }

    /// Payload snapshot by id.
    pub fn vertex_data(&self, id: VertexId) -> Option<V> {
        self.slot_of(id).map(|slot| self.read_data_at(slot))
    }
}

impl<V: Default, E> Graph<V, E> {
    /// Adds a directed edge. Missing endpoints are auto-created with
    /// `V::default()`; no implicit reverse edge is inserted.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId, data: E) -> Result<()> {
        if self.finalized {
            return Err(GaleError::TopologyLocked);
        }
        let source = self.slot_or_insert(source);
        let target = self.slot_or_insert(target);
        self.edges.push(EdgeRecord {
            source,
            target,
            data,
        });
        Ok(())
    }

    fn slot_or_insert(&mut self, id: VertexId) -> u32 {
        match self.index.get(&id).copied() {
            Some(slot) => slot,
            None => self.insert_slot(id, V::default(), false),
        }
    }
}

impl<V: Clone, E: Clone> Graph<V, E> {
    /// Outbound edges of `id`: neighbor id, neighbor data snapshot, edge data.
    pub fn out_edges(&self, id: VertexId) -> Result<Vec<AdjacentEdge<V, E>>> {
        self.adjacent(id, EdgeSet::Out)
    }

    /// Inbound edges of `id`: neighbor id, neighbor data snapshot, edge data.
    pub fn in_edges(&self, id: VertexId) -> Result<Vec<AdjacentEdge<V, E>>> {
        self.adjacent(id, EdgeSet::In)
    }

    fn adjacent(&self, id: VertexId, set: EdgeSet) -> Result<Vec<AdjacentEdge<V, E>>> {
        if !self.finalized {
            return Err(GaleError::TopologyOpen);
        }
        let slot = self
            .slot_of(id)
            .ok_or(GaleError::VertexNotFound { id })?;
        Ok(self
            .incident(slot, set)
            .map(|edge| {
                let record = &self.edges[edge as usize];
                let neighbor = if record.source == slot {
                    record.target
                } else {
                    record.source
                };
                AdjacentEdge {
                    neighbor: self.id_at(neighbor),
                    neighbor_data: self.read_data_at(neighbor),
                    edge_data: record.data.clone(),
                }
            })
            .collect())
    }
}

impl<V: Send + Sync, E: Sync> Graph<V, E> {
    /// Applies `f` to every vertex payload in parallel. No ordering
    /// guarantee; used for bulk re-initialization between engine runs.
    pub fn transform_vertices<F>(&self, f: F)
    where
        F: Fn(VertexId, &mut V) + Send + Sync,
    {
        self.data.par_iter().enumerate().for_each(|(slot, cell)| {
            f(self.ids[slot], &mut cell.write());
        });
    }
}

impl<V, E> Graph<V, E> {
    /// Sequentially visits every vertex payload.
    pub fn for_each_vertex<F>(&self, mut f: F)
    where
        F: FnMut(VertexId, &V),
    {
        for (slot, cell) in self.data.iter().enumerate() {
            f(self.ids[slot], &cell.read());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: u64) -> VertexId {
        VertexId::new(raw)
    }

    #[test]
    fn test_add_vertex_and_duplicate_policy() {
        let mut g: Graph<u64, ()> = Graph::new();
        g.add_vertex(v(1), 10).unwrap();
        assert!(matches!(
            g.add_vertex(v(1), 11),
            Err(GaleError::DuplicateVertex { .. })
        ));

        // Auto-created endpoints may later be upgraded exactly once.
        g.add_edge(v(2), v(3), ()).unwrap();
        assert_eq!(g.vertex_data(v(2)), Some(0));
        g.add_vertex(v(2), 20).unwrap();
        assert_eq!(g.vertex_data(v(2)), Some(20));
        assert!(g.add_vertex(v(2), 21).is_err());
    }

    #[test]
    fn test_finalize_locks_topology() {
        let mut g: Graph<u64, ()> = Graph::new();
        g.add_edge(v(0), v(1), ()).unwrap();
        g.finalize().unwrap();

        assert!(matches!(
            g.add_vertex(v(9), 0),
            Err(GaleError::TopologyLocked)
        ));
        assert!(matches!(
            g.add_edge(v(0), v(9), ()),
            Err(GaleError::TopologyLocked)
        ));
        assert!(matches!(g.finalize(), Err(GaleError::TopologyLocked)));
    }

    #[test]
    fn test_adjacency_both_directions() {
        let mut g: Graph<u64, u64> = Graph::new();
        g.add_edge(v(0), v(1), 5).unwrap();
        g.add_edge(v(0), v(2), 7).unwrap();
        g.add_edge(v(2), v(0), 9).unwrap();
        g.finalize().unwrap();

        let out = g.out_edges(v(0)).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|e| e.neighbor == v(1) && e.edge_data == 5));
        assert!(out.iter().any(|e| e.neighbor == v(2) && e.edge_data == 7));

        let inbound = g.in_edges(v(0)).unwrap();
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].neighbor, v(2));
        assert_eq!(inbound[0].edge_data, 9);

        assert_eq!(g.out_degree_at(g.slot_of(v(0)).unwrap()), 2);
        assert_eq!(g.in_degree_at(g.slot_of(v(0)).unwrap()), 1);
    }

    #[test]
    fn test_adjacency_requires_finalize() {
        let mut g: Graph<u64, ()> = Graph::new();
        g.add_edge(v(0), v(1), ()).unwrap();
        assert!(matches!(g.out_edges(v(0)), Err(GaleError::TopologyOpen)));
    }

    #[test]
    fn test_neighbor_data_is_a_snapshot() {
        let mut g: Graph<u64, ()> = Graph::new();
        g.add_vertex(v(0), 0).unwrap();
        g.add_vertex(v(1), 41).unwrap();
        g.add_edge(v(0), v(1), ()).unwrap();
        g.finalize().unwrap();

        assert_eq!(g.out_edges(v(0)).unwrap()[0].neighbor_data, 41);
        g.transform_vertices(|_, value| *value += 1);
        assert_eq!(g.out_edges(v(0)).unwrap()[0].neighbor_data, 42);
    }

    #[test]
    fn test_transform_touches_every_vertex() {
        let mut g: Graph<u64, ()> = Graph::new();
        for raw in 0..100 {
            g.add_vertex(v(raw), 0).unwrap();
        }
        g.finalize().unwrap();
        g.transform_vertices(|id, value| *value = id.as_u64() * 2);

        let mut seen = 0;
        g.for_each_vertex(|id, value| {
            assert_eq!(*value, id.as_u64() * 2);
            seen += 1;
        });
        assert_eq!(seen, 100);
    }
}
