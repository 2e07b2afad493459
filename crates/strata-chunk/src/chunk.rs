use strata_blocks::{Block, BlockKind};

use crate::coord::ChunkOrigin;
use crate::{CHUNK_SIZE, CHUNK_VOLUME, DRAW_PHASES, GENERATED_FLAG_SIZE, GENERATED_FLAGS_PER_AXIS};

/// Handle of an entity record in the world's entity arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Head/tail of the entities currently bucketed in one chunk. The links between entries live
/// in the entity records themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityList {
    pub head: Option<EntityId>,
    pub tail: Option<EntityId>,
    pub len: u32,
}

impl EntityList {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// A `CHUNK_SIZE`³ cube of block slots anchored at an aligned origin.
///
/// A `None` slot was never written. Whether a written slot may be trusted is decided by the
/// generated bitset, one bit per `GENERATED_FLAG_SIZE`³ sub-cube.
#[derive(Clone, Debug)]
pub struct Chunk {
    origin: ChunkOrigin,
    slots: [Option<Block>; CHUNK_VOLUME],
    generated: u8,
    /// Store generation counter value of the last change that can affect drawing.
    pub draws_anything_tag: u64,
    /// Per draw phase generation counter value of the last change.
    pub display_tags: [u64; DRAW_PHASES],
    pub entities: EntityList,
    /// Number of fire blocks in this chunk, kept in step by the world's `set_block`.
    pub fire_count: u32,
}

impl Chunk {
    pub fn new(origin: ChunkOrigin) -> Self {
        debug_assert!(origin.is_aligned());
        Self {
            origin,
            slots: [None; CHUNK_VOLUME],
            generated: 0,
            draws_anything_tag: 0,
            display_tags: [0; DRAW_PHASES],
            entities: EntityList::default(),
            fire_count: 0,
        }
    }

    #[inline]
    pub fn origin(&self) -> ChunkOrigin {
        self.origin
    }

    /// Index of local coordinates in `0..CHUNK_SIZE`.
    #[inline]
    pub fn idx(lx: i32, ly: i32, lz: i32) -> usize {
        debug_assert!((0..CHUNK_SIZE).contains(&lx));
        debug_assert!((0..CHUNK_SIZE).contains(&ly));
        debug_assert!((0..CHUNK_SIZE).contains(&lz));
        ((ly * CHUNK_SIZE + lz) * CHUNK_SIZE + lx) as usize
    }

    #[inline]
    fn local(&self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        debug_assert!(self.origin.contains(x, y, z));
        (x - self.origin.x, y - self.origin.y, z - self.origin.z)
    }

    #[inline]
    fn flag_bit(lx: i32, ly: i32, lz: i32) -> u8 {
        let fx = lx / GENERATED_FLAG_SIZE;
        let fy = ly / GENERATED_FLAG_SIZE;
        let fz = lz / GENERATED_FLAG_SIZE;
        let i = (fy * GENERATED_FLAGS_PER_AXIS + fz) * GENERATED_FLAGS_PER_AXIS + fx;
        1u8 << i
    }

    /// Slot at world coordinates inside this chunk.
    #[inline]
    pub fn slot(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        let (lx, ly, lz) = self.local(x, y, z);
        self.slots[Self::idx(lx, ly, lz)].as_ref()
    }

    #[inline]
    pub fn slot_mut(&mut self, x: i32, y: i32, z: i32) -> Option<&mut Block> {
        let (lx, ly, lz) = self.local(x, y, z);
        self.slots[Self::idx(lx, ly, lz)].as_mut()
    }

    /// Replaces the slot at world coordinates and returns the previous value.
    #[inline]
    pub fn replace_slot(&mut self, x: i32, y: i32, z: i32, block: Option<Block>) -> Option<Block> {
        let (lx, ly, lz) = self.local(x, y, z);
        let i = Self::idx(lx, ly, lz);
        std::mem::replace(&mut self.slots[i], block)
    }

    #[inline]
    pub fn slots(&self) -> &[Option<Block>; CHUNK_VOLUME] {
        &self.slots
    }

    #[inline]
    pub fn is_generated(&self, x: i32, y: i32, z: i32) -> bool {
        let (lx, ly, lz) = self.local(x, y, z);
        self.generated & Self::flag_bit(lx, ly, lz) != 0
    }

    #[inline]
    pub fn set_generated(&mut self, x: i32, y: i32, z: i32) {
        let (lx, ly, lz) = self.local(x, y, z);
        self.generated |= Self::flag_bit(lx, ly, lz);
    }

    #[inline]
    pub fn generated_flags(&self) -> u8 {
        self.generated
    }

    #[inline]
    pub fn set_generated_flags(&mut self, flags: u8) {
        self.generated = flags;
    }

    #[inline]
    pub fn is_fully_generated(&self) -> bool {
        self.generated == u8::MAX
    }

    #[inline]
    pub fn any_generated(&self) -> bool {
        self.generated != 0
    }

    /// Recounts fire blocks from the slots; used after bulk writes.
    pub fn recount_fire(&mut self) {
        self.fire_count = self
            .slots
            .iter()
            .flatten()
            .filter(|b| b.kind == BlockKind::Fire)
            .count() as u32;
    }

    /// True when any generated slot holds something other than air.
    pub fn draws_anything(&self) -> bool {
        self.slots.iter().flatten().any(|b| !b.is_air())
    }
}
