use strata_blocks::{Block, BlockKind, Face};
use strata_chunk::BlockPos;

use super::{center, step};
use crate::entity::Entity;
use crate::world::World;

const MAX_AGE: u8 = 15;

impl World {
    /// Fire queue handler.
    pub(crate) fn eval_fire(&mut self, p: BlockPos) {
        let Some(b) = self.block_at(p) else {
            return;
        };
        if !b.is(BlockKind::Fire) {
            return;
        }
        if self.touches(p, BlockKind::Water) {
            self.put(p, Block::AIR);
            return;
        }
        let fuel: Vec<(BlockPos, Block)> = Face::ALL
            .iter()
            .map(|f| step(p, *f, 1))
            .filter_map(|n| self.block_at(n).map(|nb| (n, nb)))
            .filter(|(_, nb)| nb.kind.flammability() > 0)
            .collect();
        let grounded = self
            .block_at(step(p, Face::NegY, 1))
            .is_some_and(|n| n.is_solid());
        if fuel.is_empty() && !grounded {
            self.put(p, Block::AIR);
            return;
        }

        for (n, nb) in &fuel {
            if self.rng.u32(0..300) >= u32::from(nb.kind.flammability()) {
                continue;
            }
            if nb.is(BlockKind::Tnt) {
                self.put(*n, Block::AIR);
                let fuse = 0.5 + self.rng.f32();
                self.insert_entity(Entity::primed_tnt(center(*n), fuse));
            } else {
                self.put(*n, Block::with_meta(BlockKind::Fire, 0));
            }
        }

        let age = (b.meta + self.rng.u8(0..3)).min(MAX_AGE);
        if age == MAX_AGE && fuel.is_empty() {
            self.put(p, Block::AIR);
            return;
        }
        if age != b.meta {
            // age in place: set_block would relight and requeue the neighborhood on every tick
            if let Some(cell) = self.store.block_eval_mut(p.x, p.y, p.z) {
                cell.meta = age;
            }
            self.store.bump_display(p.chunk_origin());
        }
        let delay = 0.5 + self.rng.f32() * 0.5;
        self.add_timed_invalidate(p.x, p.y, p.z, delay);
    }
}
