use strata_chunk::BlockPos;

/// Cells scheduled for invalidation after a delay.
#[derive(Default, Debug, Clone)]
pub struct TimedInvalidates {
    pending: Vec<(BlockPos, f32)>,
}

impl TimedInvalidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pos: BlockPos, seconds: f32) {
        self.pending.push((pos, seconds.max(0.0)));
    }

    /// Counts every timer down by `dt` and returns the expired cells in insertion order.
    pub fn advance(&mut self, dt: f32) -> Vec<BlockPos> {
        let mut expired = Vec::new();
        self.pending.retain_mut(|(pos, remaining)| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*pos);
                false
            } else {
                true
            }
        });
        expired
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(BlockPos, f32)> + '_ {
        self.pending.iter()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
