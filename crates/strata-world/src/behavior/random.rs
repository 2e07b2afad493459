use log::debug;
use strata_blocks::{Block, BlockKind, Face};
use strata_chunk::BlockPos;
use strata_geom::Vec3;
use strata_worldgen::tree_blocks;

use super::{center, step};
use crate::entity::Entity;
use crate::world::World;

/// Leaves further than this from any wood decay.
const LEAF_REACH: i32 = 4;
/// Light a dirt cell needs above it before grass spreads onto it.
const GRASS_LIGHT: u8 = 9;

impl World {
    /// Handler for a randomly picked block that ticks randomly.
    pub(crate) fn random_update(&mut self, p: BlockPos, b: Block) {
        match b.kind {
            BlockKind::Grass => self.grass_tick(p),
            BlockKind::Leaves => {
                if !self.wood_near(p) {
                    self.put(p, Block::AIR);
                    if self.rng.u32(0..20) == 0 {
                        let sapling = Block::new(BlockKind::Sapling);
                        self.insert_entity(Entity::item(center(p), sapling, Vec3::ZERO));
                    }
                }
            }
            BlockKind::Sapling => {
                if self.rng.f32() < self.config.effects.sapling_growth_chance {
                    self.queue_tree_growth(p);
                }
            }
            _ => {}
        }
    }

    fn grass_tick(&mut self, p: BlockPos) {
        let above = self.block_at(step(p, Face::PosY, 1));
        if above.is_some_and(|a| a.is_opaque()) {
            self.put(p, Block::new(BlockKind::Dirt));
            return;
        }
        let t = p.offset(
            self.rng.i32(-1..=1),
            self.rng.i32(-1..=1),
            self.rng.i32(-1..=1),
        );
        if !self.block_at(t).is_some_and(|d| d.is(BlockKind::Dirt)) {
            return;
        }
        let lit = self
            .block_at(step(t, Face::PosY, 1))
            .is_some_and(|a| !a.is_opaque() && a.sky_light.max(a.block_light) >= GRASS_LIGHT);
        if lit {
            self.put(t, Block::new(BlockKind::Grass));
        }
    }

    /// Unloaded cells count as wood so leaves at the generated border stay put.
    fn wood_near(&self, p: BlockPos) -> bool {
        let r = LEAF_REACH;
        for dy in -r..=r {
            for dz in -r..=r {
                for dx in -r..=r {
                    match self.block_at(p.offset(dx, dy, dz)) {
                        None => return true,
                        Some(b) if b.is(BlockKind::Wood) => return true,
                        Some(_) => {}
                    }
                }
            }
        }
        false
    }

    /// Replaces a sapling with a trunk and canopy when the trunk has room.
    pub(crate) fn grow_tree(&mut self, p: BlockPos) {
        if !self.block_at(p).is_some_and(|b| b.is(BlockKind::Sapling)) {
            return;
        }
        let trunk = 4 + self.rng.i32(0..=1);
        let shape = tree_blocks(trunk, 2);
        for &(dx, dy, dz, kind) in &shape {
            if kind != BlockKind::Wood || dy == 0 {
                continue;
            }
            match self.block_at(p.offset(dx, dy, dz)) {
                Some(c) if c.is_replaceable() || c.is(BlockKind::Leaves) => {}
                _ => return,
            }
        }
        for (dx, dy, dz, kind) in shape {
            let c = p.offset(dx, dy, dz);
            match kind {
                BlockKind::Wood => self.put(c, Block::new(BlockKind::Wood)),
                _ => {
                    if self.block_at(c).is_some_and(|b| b.is_air()) {
                        self.put(c, Block::new(kind));
                    }
                }
            }
        }
        debug!("tree of height {trunk} grew at {p:?}");
    }
}
