use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};

use crossbeam_channel::Receiver;
use log::{debug, trace};
use strata_chunk::{BlockPos, GENERATE_SIZE};
use strata_lighting::light_columns;
use strata_worldgen::{GenSettings, GeneratedChunk, TerrainGenerator};

use crate::pool::GeneratorFactory;

/// What a worker slot currently holds, as seen from the owning thread.
#[derive(Debug)]
pub enum WorkerState {
    Idle,
    Generating(BlockPos),
    Finished(BlockPos, Result<GeneratedChunk, String>),
}

impl WorkerState {
    /// Origin this slot is working on or holding a result for.
    pub fn origin(&self) -> Option<BlockPos> {
        match self {
            WorkerState::Idle => None,
            WorkerState::Generating(o) | WorkerState::Finished(o, _) => Some(*o),
        }
    }
}

/// State every worker reads: the settings snapshot, its revision and the busy counter.
pub(crate) struct Shared {
    settings: RwLock<Arc<GenSettings>>,
    revision: AtomicU64,
    busy: Mutex<usize>,
    idle: Condvar,
}

impl Shared {
    pub(crate) fn new(settings: GenSettings) -> Self {
        Self {
            settings: RwLock::new(Arc::new(settings)),
            revision: AtomicU64::new(0),
            busy: Mutex::new(0),
            idle: Condvar::new(),
        }
    }

    pub(crate) fn settings(&self) -> Arc<GenSettings> {
        Arc::clone(&self.settings.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Replaces the snapshot. Callers must make sure no worker is generating.
    pub(crate) fn replace_settings(&self, settings: GenSettings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(settings);
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn begin_one(&self) {
        *self.busy.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    pub(crate) fn finish_one(&self) {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        *busy = busy.saturating_sub(1);
        if *busy == 0 {
            self.idle.notify_all();
        }
    }

    pub(crate) fn busy_count(&self) -> usize {
        *self.busy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait_idle(&self) {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        while *busy > 0 {
            busy = self.idle.wait(busy).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Handles a worker thread needs; everything else stays on the owning side.
pub(crate) struct WorkerCtx {
    pub index: usize,
    pub rx: Receiver<BlockPos>,
    pub slot: Arc<Mutex<WorkerState>>,
    pub busy: Arc<AtomicBool>,
    pub shared: Arc<Shared>,
    pub factory: GeneratorFactory,
}

pub(crate) fn run(ctx: WorkerCtx) {
    let WorkerCtx {
        index,
        rx,
        slot,
        busy,
        shared,
        factory,
    } = ctx;
    let mut generator: Option<Box<dyn TerrainGenerator>> = None;
    let mut cached_rev: Option<u64> = None;

    while let Ok(origin) = rx.recv() {
        let rev = shared.revision();
        if cached_rev != Some(rev) || generator.is_none() {
            let settings = shared.settings();
            debug!("worker {index}: building generator for seed {} rev {rev}", settings.seed);
            generator = Some(factory(&settings));
            cached_rev = Some(rev);
        }
        let result = match generator.as_mut() {
            Some(g) => generate_lit(g.as_mut(), origin),
            None => Err("no generator".to_string()),
        };
        if result.is_err() {
            // a generator that failed once may be left in a bad state
            generator = None;
        } else {
            trace!("worker {index}: finished {origin:?}");
        }
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = WorkerState::Finished(origin, result);
        busy.store(false, Ordering::Release);
        shared.finish_one();
    }
    debug!("worker {index}: channel closed, exiting");
}

fn generate_lit(g: &mut dyn TerrainGenerator, origin: BlockPos) -> Result<GeneratedChunk, String> {
    match catch_unwind(AssertUnwindSafe(|| g.generate(origin))) {
        Ok(Ok(mut batch)) => {
            light_columns(&mut batch.blocks, GENERATE_SIZE as usize);
            Ok(batch)
        }
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("generator panicked: {msg}"))
        }
    }
}
