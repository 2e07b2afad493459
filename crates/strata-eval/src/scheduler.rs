use log::trace;
use strata_blocks::Block;
use strata_chunk::BlockPos;

use crate::queue::{EvalNode, EvalQueue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum QueueKind {
    General = 0,
    Redstone,
    RedstoneFirst,
    Lighting,
    Particles,
    Pistons,
    Fire,
}

impl QueueKind {
    pub const ALL: [QueueKind; 7] = [
        QueueKind::General,
        QueueKind::Redstone,
        QueueKind::RedstoneFirst,
        QueueKind::Lighting,
        QueueKind::Particles,
        QueueKind::Pistons,
        QueueKind::Fire,
    ];

    /// Queues that a plain `invalidate` feeds.
    pub const INVALIDATE: [QueueKind; 4] = [
        QueueKind::General,
        QueueKind::Redstone,
        QueueKind::Pistons,
        QueueKind::Fire,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: u8) -> Option<QueueKind> {
        QueueKind::ALL.get(i as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            QueueKind::General => "general",
            QueueKind::Redstone => "redstone",
            QueueKind::RedstoneFirst => "redstone_first",
            QueueKind::Lighting => "lighting",
            QueueKind::Particles => "particles",
            QueueKind::Pistons => "pistons",
            QueueKind::Fire => "fire",
        }
    }
}

/// Drain periods in seconds for the periodic queues.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvalTiming {
    pub general_period: f32,
    pub redstone_period: f32,
}

impl Default for EvalTiming {
    fn default() -> Self {
        Self {
            general_period: 0.25,
            redstone_period: 0.1,
        }
    }
}

/// Which periodic queues are due this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DuePasses {
    pub general: bool,
    pub redstone: bool,
}

/// The seven evaluation queues plus the accumulators that pace the periodic ones.
#[derive(Debug, Clone)]
pub struct EvalScheduler {
    queues: [EvalQueue; 7],
    timing: EvalTiming,
    general_acc: f32,
    redstone_acc: f32,
}

impl Default for EvalScheduler {
    fn default() -> Self {
        Self::new(EvalTiming::default())
    }
}

impl EvalScheduler {
    pub fn new(timing: EvalTiming) -> Self {
        Self {
            queues: Default::default(),
            timing,
            general_acc: 0.0,
            redstone_acc: 0.0,
        }
    }

    pub fn timing(&self) -> EvalTiming {
        self.timing
    }

    pub fn set_timing(&mut self, timing: EvalTiming) {
        self.timing = timing;
    }

    #[inline]
    pub fn queue(&self, kind: QueueKind) -> &EvalQueue {
        &self.queues[kind.index()]
    }

    #[inline]
    pub fn queue_mut(&mut self, kind: QueueKind) -> &mut EvalQueue {
        &mut self.queues[kind.index()]
    }

    #[inline]
    pub fn insert(&mut self, kind: QueueKind, pos: BlockPos, payload: Option<Block>) {
        self.queues[kind.index()].insert(pos, payload);
    }

    /// Schedules a cell in General, Redstone, Pistons and Fire.
    pub fn invalidate(&mut self, pos: BlockPos) {
        for kind in QueueKind::INVALIDATE {
            self.queues[kind.index()].insert(pos, None);
        }
    }

    pub fn detach(&mut self, kind: QueueKind) -> Vec<EvalNode> {
        let nodes = self.queues[kind.index()].detach();
        if !nodes.is_empty() {
            trace!("detach {} x{}", kind.name(), nodes.len());
        }
        nodes
    }

    /// Feeds `dt` into the period accumulators. Each periodic queue fires at most once per call.
    pub fn advance(&mut self, dt: f32) -> DuePasses {
        let general = step_accumulator(&mut self.general_acc, dt, self.timing.general_period);
        let redstone = step_accumulator(&mut self.redstone_acc, dt, self.timing.redstone_period);
        DuePasses { general, redstone }
    }

    pub fn total_len(&self) -> usize {
        self.queues.iter().map(EvalQueue::len).sum()
    }

    pub fn clear(&mut self) {
        for q in &mut self.queues {
            q.clear();
        }
        self.general_acc = 0.0;
        self.redstone_acc = 0.0;
    }
}

fn step_accumulator(acc: &mut f32, dt: f32, period: f32) -> bool {
    if period <= 0.0 {
        return true;
    }
    *acc += dt;
    if *acc >= period {
        *acc = (*acc - period).min(period);
        true
    } else {
        false
    }
}
