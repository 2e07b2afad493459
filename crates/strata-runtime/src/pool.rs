use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};
use hashbrown::HashSet;
use log::{error, info, warn};
use strata_chunk::BlockPos;
use strata_worldgen::{GenSettings, GeneratedChunk, TerrainGenerator, make_generator};

use crate::RuntimeError;
use crate::worker::{self, Shared, WorkerCtx, WorkerState};

/// Builds a worker's private generator from a settings snapshot.
pub type GeneratorFactory = Arc<dyn Fn(&GenSettings) -> Box<dyn TerrainGenerator> + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub busy: usize,
    pub finished_uncollected: usize,
    pub failed: usize,
    pub has_pending: bool,
}

struct Worker {
    busy: Arc<AtomicBool>,
    slot: Arc<Mutex<WorkerState>>,
    tx: Option<Sender<BlockPos>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn state_origin(&self) -> Option<BlockPos> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .origin()
    }

    fn is_idle(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
            && matches!(
                *self.slot.lock().unwrap_or_else(PoisonError::into_inner),
                WorkerState::Idle
            )
    }
}

/// Fixed set of generation threads fed one request at a time from a single "closest pending"
/// slot. Results are collected and merged by the owner; workers never see the chunk store.
pub struct GenerationPool {
    workers: Vec<Worker>,
    shared: Arc<Shared>,
    pending: Option<(BlockPos, f32)>,
    failed: HashSet<BlockPos>,
}

impl GenerationPool {
    pub fn new(settings: GenSettings, worker_count: usize) -> Result<Self, RuntimeError> {
        Self::with_factory(settings, worker_count, Arc::new(make_generator))
    }

    pub fn with_factory(
        settings: GenSettings,
        worker_count: usize,
        factory: GeneratorFactory,
    ) -> Result<Self, RuntimeError> {
        let worker_count = worker_count.max(1);
        let shared = Arc::new(Shared::new(settings));
        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let (tx, rx) = unbounded();
            let busy = Arc::new(AtomicBool::new(false));
            let slot = Arc::new(Mutex::new(WorkerState::Idle));
            let ctx = WorkerCtx {
                index,
                rx,
                slot: Arc::clone(&slot),
                busy: Arc::clone(&busy),
                shared: Arc::clone(&shared),
                factory: Arc::clone(&factory),
            };
            let handle = thread::Builder::new()
                .name(format!("strata-gen-{index}"))
                .spawn(move || worker::run(ctx))?;
            workers.push(Worker {
                busy,
                slot,
                tx: Some(tx),
                handle: Some(handle),
            });
        }
        info!("generation pool started with {worker_count} workers");
        Ok(Self {
            workers,
            shared,
            pending: None,
            failed: HashSet::new(),
        })
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn settings(&self) -> Arc<GenSettings> {
        self.shared.settings()
    }

    pub fn revision(&self) -> u64 {
        self.shared.revision()
    }

    /// True when a worker is generating `origin` or holds an uncollected result for it.
    pub fn is_covered(&self, origin: BlockPos) -> bool {
        self.workers.iter().any(|w| w.state_origin() == Some(origin))
    }

    #[inline]
    pub fn is_failed(&self, origin: BlockPos) -> bool {
        self.failed.contains(&origin)
    }

    /// Remembered request, if any.
    #[inline]
    pub fn pending(&self) -> Option<(BlockPos, f32)> {
        self.pending
    }

    /// Records a request. Only the lowest priority seen since the last dispatch is kept.
    pub fn offer(&mut self, origin: BlockPos, priority: f32) {
        if self.failed.contains(&origin) || self.is_covered(origin) {
            return;
        }
        match self.pending {
            Some((_, best)) if best <= priority => {}
            _ => self.pending = Some((origin, priority)),
        }
    }

    /// Hands the remembered request to an idle worker. Returns the dispatched origin.
    pub fn dispatch(&mut self) -> Option<BlockPos> {
        let (origin, _) = self.pending?;
        let worker = self.workers.iter().find(|w| w.is_idle())?;
        let tx = worker.tx.as_ref()?;
        *worker.slot.lock().unwrap_or_else(PoisonError::into_inner) = WorkerState::Generating(origin);
        worker.busy.store(true, Ordering::Release);
        self.shared.begin_one();
        if tx.send(origin).is_err() {
            warn!("generation worker gone, dropping request {origin:?}");
            *worker.slot.lock().unwrap_or_else(PoisonError::into_inner) = WorkerState::Idle;
            worker.busy.store(false, Ordering::Release);
            self.shared.finish_one();
            return None;
        }
        self.pending = None;
        Some(origin)
    }

    /// Takes every finished result. Failed origins are logged and never requested again.
    pub fn collect(&mut self) -> Vec<GeneratedChunk> {
        let mut out = Vec::new();
        for w in &self.workers {
            let mut slot = w.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if !matches!(*slot, WorkerState::Finished(..)) {
                continue;
            }
            if let WorkerState::Finished(origin, result) = std::mem::replace(&mut *slot, WorkerState::Idle) {
                match result {
                    Ok(batch) => out.push(batch),
                    Err(msg) => {
                        error!("generation of {origin:?} failed: {msg}");
                        self.failed.insert(origin);
                    }
                }
            }
        }
        out
    }

    /// Blocks until no worker is generating.
    pub fn wait_idle(&self) {
        self.shared.wait_idle();
    }

    /// Swaps in new settings once every worker is idle; workers rebuild their generators on
    /// their next request.
    pub fn update_settings(&mut self, settings: GenSettings) {
        self.wait_idle();
        self.shared.replace_settings(settings);
        self.failed.clear();
        self.pending = None;
        info!("generation settings updated to revision {}", self.shared.revision());
    }

    /// Waits for running work and throws away every result and remembered request.
    pub fn reset(&mut self) {
        self.wait_idle();
        for w in &self.workers {
            *w.slot.lock().unwrap_or_else(PoisonError::into_inner) = WorkerState::Idle;
        }
        self.pending = None;
        self.failed.clear();
    }

    pub fn stats(&self) -> PoolStats {
        let finished_uncollected = self
            .workers
            .iter()
            .filter(|w| {
                matches!(
                    *w.slot.lock().unwrap_or_else(PoisonError::into_inner),
                    WorkerState::Finished(..)
                )
            })
            .count();
        PoolStats {
            workers: self.workers.len(),
            busy: self.shared.busy_count(),
            finished_uncollected,
            failed: self.failed.len(),
            has_pending: self.pending.is_some(),
        }
    }
}

impl Drop for GenerationPool {
    fn drop(&mut self) {
        for w in &mut self.workers {
            w.tx.take();
        }
        for w in &mut self.workers {
            if let Some(h) = w.handle.take() {
                if h.join().is_err() {
                    error!("generation worker panicked during shutdown");
                }
            }
        }
    }
}
