use std::hash::{Hash, Hasher};

use crate::face::Face;
use crate::kind::BlockKind;

pub const MAX_LIGHT: u8 = 15;

const LIT_BIT: u8 = 1;
const EXTENDED_BIT: u8 = 0b1000;
const FACING_MASK: u8 = 0b0111;

/// One voxel: its kind, kind-specific metadata, and cached light levels.
///
/// Identity is `kind` + `meta`; the light levels are derived state and are ignored by
/// equality and hashing, so a relit block still compares equal to the block that was placed.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub kind: BlockKind,
    pub meta: u8,
    pub sky_light: u8,
    pub block_light: u8,
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.meta == other.meta
    }
}

impl Eq for Block {}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.meta.hash(state);
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::AIR
    }
}

impl From<BlockKind> for Block {
    fn from(kind: BlockKind) -> Self {
        Block::new(kind)
    }
}

impl Block {
    pub const AIR: Block = Block::new(BlockKind::Air);

    #[inline]
    pub const fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            meta: 0,
            sky_light: 0,
            block_light: 0,
        }
    }

    #[inline]
    pub const fn with_meta(kind: BlockKind, meta: u8) -> Self {
        Self {
            kind,
            meta,
            sky_light: 0,
            block_light: 0,
        }
    }

    pub fn fluid(kind: BlockKind, level: u8) -> Self {
        debug_assert!(kind.is_fluid());
        Self::with_meta(kind, level.min(kind.max_meta()))
    }

    pub fn dust(power: u8) -> Self {
        Self::with_meta(BlockKind::RedstoneDust, power.min(MAX_LIGHT))
    }

    pub fn redstone_torch(lit: bool) -> Self {
        Self::with_meta(BlockKind::RedstoneTorch, lit as u8)
    }

    pub fn lever(on: bool) -> Self {
        Self::with_meta(BlockKind::Lever, on as u8)
    }

    pub fn piston(facing: Face, extended: bool) -> Self {
        let mut meta = facing.index() as u8;
        if extended {
            meta |= EXTENDED_BIT;
        }
        Self::with_meta(BlockKind::Piston, meta)
    }

    pub fn piston_head(facing: Face) -> Self {
        Self::with_meta(BlockKind::PistonHead, facing.index() as u8)
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.kind.is_air()
    }

    #[inline]
    pub fn is(&self, kind: BlockKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.kind.is_opaque()
    }

    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.kind.is_translucent()
    }

    #[inline]
    pub fn is_replaceable(&self) -> bool {
        self.kind.is_replaceable()
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }

    #[inline]
    pub fn light_emission(&self) -> u8 {
        self.kind.light_emission(self.meta)
    }

    #[inline]
    pub fn emits_particles(&self) -> bool {
        self.kind.emits_particles(self.meta)
    }

    /// Fluid level; 0 is a source block. `None` for non-fluids.
    #[inline]
    pub fn fluid_level(&self) -> Option<u8> {
        self.kind.is_fluid().then_some(self.meta)
    }

    /// Power carried by a dust block, 0 for everything else.
    #[inline]
    pub fn dust_power(&self) -> u8 {
        if self.kind == BlockKind::RedstoneDust {
            self.meta
        } else {
            0
        }
    }

    /// Lit torches, levers that are on, and redstone blocks drive full power.
    pub fn is_power_source(&self) -> bool {
        match self.kind {
            BlockKind::RedstoneBlock => true,
            BlockKind::RedstoneTorch | BlockKind::Lever => self.meta & LIT_BIT != 0,
            _ => false,
        }
    }

    #[inline]
    pub fn is_lit(&self) -> bool {
        self.meta & LIT_BIT != 0
    }

    /// Facing of a piston or piston head.
    pub fn facing(&self) -> Option<Face> {
        match self.kind {
            BlockKind::Piston | BlockKind::PistonHead => Face::from_index(self.meta & FACING_MASK),
            _ => None,
        }
    }

    #[inline]
    pub fn is_extended(&self) -> bool {
        self.kind == BlockKind::Piston && self.meta & EXTENDED_BIT != 0
    }

    /// The item block a dug or blasted block drops, if any.
    pub fn dig_result(&self) -> Option<Block> {
        let kind = match self.kind {
            BlockKind::Air
            | BlockKind::Water
            | BlockKind::Lava
            | BlockKind::Fire
            | BlockKind::Bedrock
            | BlockKind::Glass
            | BlockKind::Leaves
            | BlockKind::PistonHead => return None,
            BlockKind::Stone => BlockKind::Cobblestone,
            BlockKind::Grass => BlockKind::Dirt,
            BlockKind::RedstoneTorch => return Some(Block::redstone_torch(true)),
            BlockKind::Lever => return Some(Block::lever(false)),
            BlockKind::RedstoneDust => return Some(Block::dust(0)),
            BlockKind::Piston => BlockKind::Piston,
            other => other,
        };
        Some(Block::new(kind))
    }

    /// Carries cached light levels over from the block this one replaces. Block light is
    /// reset to the new emission when emission changed, so the flood fill starts from the
    /// right seed instead of the stale value.
    pub fn copy_lighting_from(&mut self, old: &Block) {
        self.sky_light = old.sky_light;
        if old.light_emission() != self.light_emission() {
            self.block_light = self.light_emission();
        } else {
            self.block_light = old.block_light;
        }
        if self.is_opaque() {
            self.sky_light = 0;
            self.block_light = self.light_emission();
        }
    }

    /// Light levels and metadata are within the ranges the simulation produces.
    pub fn is_valid(&self) -> bool {
        self.kind.meta_is_valid(self.meta)
            && self.sky_light <= MAX_LIGHT
            && self.block_light <= MAX_LIGHT
    }
}
