//! Block reactions run from the evaluation queues, random ticks and tree growth.

mod fire;
mod fluid;
mod particles;
mod piston;
mod random;
mod redstone;

use strata_blocks::{Block, BlockKind, Face};
use strata_chunk::BlockPos;
use strata_geom::Vec3;

use crate::entity::Entity;
use crate::world::World;

/// Cell `n` steps away from `p` through `face`.
#[inline]
pub(crate) fn step(p: BlockPos, face: Face, n: i32) -> BlockPos {
    let (dx, dy, dz) = face.offset();
    p.offset(dx * n, dy * n, dz * n)
}

#[inline]
pub(crate) fn center(p: BlockPos) -> Vec3 {
    Vec3::cell_center(p.x, p.y, p.z)
}

impl World {
    #[inline]
    pub(crate) fn block_at(&self, p: BlockPos) -> Option<Block> {
        self.get_block_eval(p.x, p.y, p.z).copied()
    }

    #[inline]
    pub(crate) fn put(&mut self, p: BlockPos, b: Block) {
        self.set_block(p.x, p.y, p.z, b);
    }

    pub(crate) fn touches(&self, p: BlockPos, kind: BlockKind) -> bool {
        Face::ALL
            .iter()
            .any(|f| self.block_at(step(p, *f, 1)).is_some_and(|n| n.is(kind)))
    }

    /// General queue handler.
    pub(crate) fn eval_general(&mut self, p: BlockPos) {
        let Some(b) = self.block_at(p) else {
            return;
        };
        match b.kind {
            BlockKind::Water | BlockKind::Lava => self.flow(p, b),
            BlockKind::Fire => {
                if self.touches(p, BlockKind::Water) {
                    self.put(p, Block::AIR);
                }
            }
            k if k.has_gravity() => self.eval_block_to_entity(p, b),
            k if k.needs_support() => self.check_support(p, b),
            _ => {}
        }
    }

    /// Turns an unsupported gravity block into a falling entity.
    fn eval_block_to_entity(&mut self, p: BlockPos, b: Block) {
        let below = self.block_at(step(p, Face::NegY, 1));
        if below.is_some_and(|n| n.is_replaceable()) {
            self.put(p, Block::AIR);
            self.insert_entity(Entity::falling(center(p), b));
        }
    }

    fn check_support(&mut self, p: BlockPos, b: Block) {
        let below = self.block_at(step(p, Face::NegY, 1));
        if below.is_some_and(|n| !n.is_solid()) {
            self.put(p, Block::AIR);
            if let Some(drop) = b.dig_result() {
                self.insert_entity(Entity::item(center(p), drop, Vec3::ZERO));
            }
        }
    }
}
