// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Asynchronous engine: worker threads drain an activation queue.
//!
//! Each activation runs init → gather → apply → scatter without a global
//! barrier. The engine guarantees that two activations of the same vertex
//! never overlap: a per-vertex state word moves IDLE → QUEUED → RUNNING
//! under CAS, and a failed QUEUED → RUNNING transition is an
//! [`GaleError::ActivationRace`] — a scheduling bug, fatal to the run.
//! Signals arriving while a vertex runs fold into its pending cell and
//! re-queue it when the activation finishes.
//!
//! Under [`Consistency::Edge`] an activation additionally holds its
//! neighborhood's activation locks (acquired in slot order) for its whole
//! duration, so endpoint reads during gather and scatter observe a stable
//! neighborhood rather than just torn-write-free snapshots.

use crate::combine::Combine;
use crate::program::{Context, Signals, VertexProgram};
use crate::synchronous::fold_message;
use crate::{Engine, EngineStatus, RunReport};
use fxhash::FxHashMap;
use gale_common::{Consistency, EngineConfig, GaleError, Result, VertexId};
use gale_graph::{EdgeSet, Graph, VertexMut};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const IDLE: u8 = 0;
const QUEUED: u8 = 1;
const RUNNING: u8 = 2;

pub struct AsyncEngine<'g, P: VertexProgram> {
    graph: &'g Graph<P::VertexData, P::EdgeData>,
    program: P,
    config: EngineConfig,
    /// Signals registered while the engine is idle, folded per vertex.
    seeds: FxHashMap<u32, P::Message>,
    last_depth: usize,
    elapsed: Duration,
}

/// Run-scoped state shared by the worker threads.
struct Shared<'g, P: VertexProgram> {
    graph: &'g Graph<P::VertexData, P::EdgeData>,
    prototype: P,
    consistency: Consistency,
    /// Per-vertex activation cap (the async reading of `max_supersteps`).
    cap: Option<u64>,
    queue: Mutex<VecDeque<u32>>,
    work_ready: Condvar,
    /// Queued + running activations; zero with an empty queue means done.
    in_flight: AtomicUsize,
    stop: AtomicBool,
    capped: AtomicBool,
    fault: Mutex<Option<GaleError>>,
    status: Vec<AtomicU8>,
    pending: Vec<Mutex<Option<P::Message>>>,
    counts: Vec<AtomicU64>,
    /// Only populated under `Consistency::Edge`.
    activation_locks: Vec<Mutex<()>>,
    total: AtomicU64,
}

fn schedule<P: VertexProgram>(shared: &Shared<'_, P>, slot: u32) {
    if let Some(cap) = shared.cap {
        if shared.counts[slot as usize].load(Ordering::SeqCst) >= cap {
            shared.capped.store(true, Ordering::SeqCst);
            return;
        }
    }
    if shared.status[slot as usize]
        .compare_exchange(IDLE, QUEUED, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        shared.queue.lock().push_back(slot);
        shared.work_ready.notify_one();
    }
}

fn enqueue<P: VertexProgram>(shared: &Shared<'_, P>, slot: u32, message: P::Message) {
    {
        let mut pending = shared.pending[slot as usize].lock();
        match pending.as_mut() {
            Some(current) => current.merge(message),
            None => *pending = Some(message),
        }
    }
    schedule(shared, slot);
}

fn worker<P: VertexProgram>(shared: &Shared<'_, P>) {
    loop {
        let slot = {
            let mut queue = shared.queue.lock();
            loop {
                if shared.stop.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(slot) = queue.pop_front() {
                    break slot;
                }
                if shared.in_flight.load(Ordering::SeqCst) == 0 {
                    shared.stop.store(true, Ordering::SeqCst);
                    shared.work_ready.notify_all();
                    return;
                }
                shared.work_ready.wait(&mut queue);
            }
        };
        if let Err(error) = activate(shared, slot) {
            *shared.fault.lock() = Some(error);
            shared.stop.store(true, Ordering::SeqCst);
            shared.work_ready.notify_all();
            return;
        }
    }
}

fn activate<P: VertexProgram>(shared: &Shared<'_, P>, slot: u32) -> Result<()> {
    let graph = shared.graph;
    if shared.status[slot as usize]
        .compare_exchange(QUEUED, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(GaleError::ActivationRace {
            id: graph.id_at(slot),
        });
    }

    let iteration = shared.counts[slot as usize].fetch_add(1, Ordering::SeqCst) as usize;
    shared.total.fetch_add(1, Ordering::SeqCst);
    let message = shared.pending[slot as usize]
        .lock()
        .take()
        .unwrap_or_else(P::Message::identity);

    // Slot-ordered acquisition keeps overlapping neighborhoods deadlock-free.
    let neighborhood = match shared.consistency {
        Consistency::Vertex => Vec::new(),
        Consistency::Edge => {
            let mut slots: Vec<u32> = std::iter::once(slot)
                .chain(graph.incident(slot, EdgeSet::All).map(|edge| {
                    let (source, target) = graph.edge_endpoints_at(edge);
                    if source == slot { target } else { source }
                }))
                .collect();
            slots.sort_unstable();
            slots.dedup();
            slots
                .iter()
                .map(|&s| shared.activation_locks[s as usize].lock())
                .collect()
        }
    };

    let ctx = Context::new(iteration, graph.vertex_count());
    let vertex = graph.vertex_view(slot);
    let mut program = shared.prototype.clone();
    program.init(&ctx, &vertex, message);

    let set = program.gather_edges(&ctx, &vertex);
    let mut gathered = P::Gather::identity();
    for edge in graph.incident(slot, set) {
        gathered.merge(program.gather(&ctx, &vertex, &graph.edge_view(edge)));
    }

    let id = graph.id_at(slot);
    let decision = graph.with_data_mut(slot, |data| {
        program.apply(&ctx, &mut VertexMut::new(id, data), gathered)
    });

    let set = program.scatter_edges(&ctx, &vertex, &decision);
    let mut signals = Signals::new();
    for edge in graph.incident(slot, set) {
        program.scatter(&ctx, &vertex, &graph.edge_view(edge), &decision, &mut signals);
    }
    drop(neighborhood);

    for (target, message) in signals.into_inner() {
        match graph.slot_of(target) {
            Some(target_slot) => enqueue(shared, target_slot, message),
            None => tracing::warn!(%target, "signal to unknown vertex dropped"),
        }
    }

    shared.status[slot as usize].store(IDLE, Ordering::SeqCst);
    // A signal that raced with the tail of this activation left a pending
    // message without managing to queue the vertex; pick it up here.
    if shared.pending[slot as usize].lock().is_some() {
        schedule(shared, slot);
    }
    if shared.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
        shared.work_ready.notify_all();
    }
    Ok(())
}

impl<'g, P: VertexProgram> AsyncEngine<'g, P> {
    pub fn new(
        graph: &'g Graph<P::VertexData, P::EdgeData>,
        program: P,
        config: EngineConfig,
    ) -> Result<Self> {
        if !graph.is_finalized() {
            return Err(GaleError::TopologyOpen);
        }
        Ok(Self {
            graph,
            program,
            config,
            seeds: FxHashMap::default(),
            last_depth: 0,
            elapsed: Duration::ZERO,
        })
    }

    pub fn signal(&mut self, target: VertexId, message: P::Message) -> Result<()> {
        let slot = self
            .graph
            .slot_of(target)
            .ok_or(GaleError::VertexNotFound { id: target })?;
        fold_message(&mut self.seeds, slot, message);
        Ok(())
    }

    pub fn signal_all(&mut self) {
        for slot in 0..self.graph.vertex_count() as u32 {
            self.seeds.entry(slot).or_insert_with(P::Message::identity);
        }
    }

    pub fn start(&mut self) -> Result<RunReport> {
        let started = Instant::now();
        let graph = self.graph;
        let n = graph.vertex_count();

        let shared = Shared {
            graph,
            prototype: self.program.clone(),
            consistency: self.config.consistency,
            cap: self.config.max_supersteps.map(|cap| cap as u64),
            queue: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            in_flight: AtomicUsize::new(0),
            stop: AtomicBool::new(false),
            capped: AtomicBool::new(false),
            fault: Mutex::new(None),
            status: (0..n).map(|_| AtomicU8::new(IDLE)).collect(),
            pending: (0..n).map(|_| Mutex::new(None)).collect(),
            counts: (0..n).map(|_| AtomicU64::new(0)).collect(),
            activation_locks: match self.config.consistency {
                Consistency::Edge => (0..n).map(|_| Mutex::new(())).collect(),
                Consistency::Vertex => Vec::new(),
            },
            total: AtomicU64::new(0),
        };

        for (slot, message) in self.seeds.drain() {
            *shared.pending[slot as usize].lock() = Some(message);
            schedule(&shared, slot);
        }

        if shared.in_flight.load(Ordering::SeqCst) > 0 {
            let workers = self
                .config
                .worker_threads
                .unwrap_or_else(|| {
                    std::thread::available_parallelism()
                        .map(NonZeroUsize::get)
                        .unwrap_or(4)
                })
                .max(1);

            std::thread::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(|| worker(&shared));
                }
            });
        }

        if let Some(error) = shared.fault.lock().take() {
            return Err(error);
        }

        self.last_depth = shared
            .counts
            .iter()
            .map(|count| count.load(Ordering::SeqCst))
            .max()
            .unwrap_or(0) as usize;
        self.elapsed = started.elapsed();

        let status = if shared.capped.load(Ordering::SeqCst) {
            EngineStatus::IterationLimitReached
        } else {
            EngineStatus::Converged
        };
        let report = RunReport {
            status,
            supersteps: self.last_depth,
            activations: shared.total.load(Ordering::SeqCst),
            elapsed: self.elapsed,
        };
        tracing::debug!(
            activations = report.activations,
            depth = report.supersteps,
            "asynchronous run drained"
        );
        Ok(report)
    }

    pub fn iteration(&self) -> usize {
        self.last_depth
    }

    pub fn elapsed_time(&self) -> Duration {
        self.elapsed
    }
}

impl<P: VertexProgram> Engine<P> for AsyncEngine<'_, P> {
    fn signal(&mut self, target: VertexId, message: P::Message) -> Result<()> {
        AsyncEngine::signal(self, target, message)
    }

    fn signal_all(&mut self) {
        AsyncEngine::signal_all(self)
    }

    fn start(&mut self) -> Result<RunReport> {
        AsyncEngine::start(self)
    }

    fn iteration(&self) -> usize {
        AsyncEngine::iteration(self)
    }

    fn elapsed_time(&self) -> Duration {
        AsyncEngine::elapsed_time(self)
    }
}
