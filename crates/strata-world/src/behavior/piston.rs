use log::trace;
use strata_blocks::{Block, BlockKind, Face};
use strata_chunk::{BlockPos, in_vertical_range};

use super::step;
use crate::world::World;

/// Most blocks one piston can push.
pub const PUSH_LIMIT: usize = 12;

fn pushable(b: &Block) -> bool {
    !matches!(b.kind, BlockKind::Bedrock | BlockKind::PistonHead) && !b.is_extended()
}

impl World {
    /// Pistons queue handler: extend when powered, retract when not.
    pub(crate) fn eval_piston(&mut self, p: BlockPos) {
        let Some(b) = self.block_at(p) else {
            return;
        };
        let Some(facing) = b.facing().filter(|_| b.is(BlockKind::Piston)) else {
            return;
        };
        let powered = self.receives_power(p, Some(facing));
        if powered && !b.is_extended() {
            self.extend_piston(p, facing);
        } else if !powered && b.is_extended() {
            self.retract_piston(p, facing);
        }
    }

    fn extend_piston(&mut self, p: BlockPos, facing: Face) {
        let mut line = Vec::new();
        let mut end = step(p, facing, 1);
        loop {
            if !in_vertical_range(end.y) {
                return;
            }
            let Some(nb) = self.block_at(end) else {
                return;
            };
            if nb.is_replaceable() {
                break;
            }
            if !pushable(&nb) || line.len() == PUSH_LIMIT {
                trace!("piston at {p:?} blocked at {end:?}");
                return;
            }
            line.push(nb);
            end = step(end, facing, 1);
        }
        for (i, moved) in line.iter().enumerate().rev() {
            self.put(step(p, facing, i as i32 + 2), *moved);
        }
        self.put(step(p, facing, 1), Block::piston_head(facing));
        self.put(p, Block::piston(facing, true));
    }

    fn retract_piston(&mut self, p: BlockPos, facing: Face) {
        let head = step(p, facing, 1);
        if self
            .block_at(head)
            .is_some_and(|h| h.is(BlockKind::PistonHead) && h.facing() == Some(facing))
        {
            self.put(head, Block::AIR);
        }
        self.put(p, Block::piston(facing, false));
    }
}
