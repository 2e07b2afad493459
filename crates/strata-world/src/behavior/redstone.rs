use strata_blocks::{Block, BlockKind, Face, MAX_LIGHT};
use strata_chunk::BlockPos;
use strata_eval::QueueKind;

use super::{center, step};
use crate::entity::Entity;
use crate::world::World;

impl World {
    /// Power a dust cell should carry: full next to a source, else the strongest adjacent
    /// dust minus one.
    pub(crate) fn dust_target(&self, p: BlockPos) -> u8 {
        let mut best = 0;
        for face in Face::ALL {
            let Some(n) = self.block_at(step(p, face, 1)) else {
                continue;
            };
            if n.is_power_source() {
                return MAX_LIGHT;
            }
            best = best.max(n.dust_power().saturating_sub(1));
        }
        best
    }

    /// True when the block at `p` is a source, live dust, or a solid block driven by an
    /// adjacent lever, redstone block, dust on top or lit torch below. `except` is ignored as
    /// a driver, so a torch never powers the block it hangs on.
    pub(crate) fn is_powered(&self, p: BlockPos, except: Option<BlockPos>) -> bool {
        let Some(b) = self.block_at(p) else {
            return false;
        };
        if b.is_power_source() || b.dust_power() > 0 {
            return true;
        }
        if !b.is_solid() {
            return false;
        }
        Face::ALL.iter().any(|face| {
            let n = step(p, *face, 1);
            if Some(n) == except {
                return false;
            }
            let Some(nb) = self.block_at(n) else {
                return false;
            };
            match nb.kind {
                BlockKind::Lever | BlockKind::RedstoneBlock => nb.is_power_source(),
                BlockKind::RedstoneDust => *face == Face::PosY && nb.dust_power() > 0,
                BlockKind::RedstoneTorch => *face == Face::NegY && nb.is_lit(),
                _ => false,
            }
        })
    }

    /// True when any neighbor, other than the one through `skip`, feeds power into `p`.
    pub(crate) fn receives_power(&self, p: BlockPos, skip: Option<Face>) -> bool {
        Face::ALL
            .iter()
            .filter(|f| Some(**f) != skip)
            .any(|f| self.is_powered(step(p, *f, 1), Some(p)))
    }

    /// Redstone queue handler: the dust spread pass. Components found here are handed to the
    /// component pass of the next redstone tick.
    pub(crate) fn eval_redstone(&mut self, p: BlockPos) {
        let Some(b) = self.block_at(p) else {
            return;
        };
        match b.kind {
            BlockKind::RedstoneDust => {
                let target = self.dust_target(p);
                if target != b.meta {
                    self.put(p, Block::dust(target));
                }
            }
            BlockKind::RedstoneTorch | BlockKind::Tnt | BlockKind::Piston => {
                self.eval.insert(QueueKind::RedstoneFirst, p, None);
            }
            _ => {}
        }
    }

    /// RedstoneFirst queue handler: torches, TNT and pistons.
    pub(crate) fn eval_redstone_first(&mut self, p: BlockPos) {
        let Some(b) = self.block_at(p) else {
            return;
        };
        match b.kind {
            BlockKind::RedstoneTorch => {
                let lit = !self.is_powered(step(p, Face::NegY, 1), Some(p));
                if lit != b.is_lit() {
                    // flips are applied together in the dust pass
                    self.eval
                        .insert(QueueKind::Redstone, p, Some(Block::redstone_torch(lit)));
                }
            }
            BlockKind::Tnt => {
                if self.receives_power(p, None) {
                    let fuse = self.config.effects.tnt_fuse;
                    self.put(p, Block::AIR);
                    self.insert_entity(Entity::primed_tnt(center(p), fuse));
                }
            }
            BlockKind::Piston => {
                let powered = self.receives_power(p, b.facing());
                if powered != b.is_extended() {
                    self.eval.insert(QueueKind::Pistons, p, None);
                }
            }
            _ => {}
        }
    }
}
