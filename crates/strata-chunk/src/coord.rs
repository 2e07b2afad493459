use serde::{Deserialize, Serialize};

use crate::{CHUNK_SIZE, GENERATE_SIZE};

/// Rounds a world coordinate down to the chunk grid.
#[inline]
pub const fn chunk_align(v: i32) -> i32 {
    v & !(CHUNK_SIZE - 1)
}

/// Rounds a world coordinate down to the generator batch grid.
#[inline]
pub const fn generate_align(v: i32) -> i32 {
    v & !(GENERATE_SIZE - 1)
}

/// Integer voxel position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal axes wrap at the `i32` limits; `y` never gets near them inside the band.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            z: self.z.wrapping_add(dz),
        }
    }

    /// Manhattan distance measured the short way round the wrapped axes.
    #[inline]
    pub fn manhattan(self, other: BlockPos) -> u64 {
        u64::from(self.x.wrapping_sub(other.x).unsigned_abs())
            + u64::from(self.y.wrapping_sub(other.y).unsigned_abs())
            + u64::from(self.z.wrapping_sub(other.z).unsigned_abs())
    }

    #[inline]
    pub fn chunk_origin(self) -> ChunkOrigin {
        ChunkOrigin::containing(self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<BlockPos> for (i32, i32, i32) {
    fn from(value: BlockPos) -> Self {
        (value.x, value.y, value.z)
    }
}

/// World-space origin of a chunk; every component is a multiple of `CHUNK_SIZE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkOrigin {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkOrigin {
    /// Builds an origin from already aligned coordinates.
    #[inline]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(
            chunk_align(x) == x && chunk_align(y) == y && chunk_align(z) == z,
            "misaligned chunk origin ({x},{y},{z})"
        );
        Self { x, y, z }
    }

    #[inline]
    pub const fn containing(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: chunk_align(x),
            y: chunk_align(y),
            z: chunk_align(z),
        }
    }

    #[inline]
    pub fn is_aligned(self) -> bool {
        chunk_align(self.x) == self.x && chunk_align(self.y) == self.y && chunk_align(self.z) == self.z
    }

    /// Origin of the neighbouring chunk `d*` chunks away.
    #[inline]
    pub fn offset_chunks(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx.wrapping_mul(CHUNK_SIZE)),
            y: self.y.wrapping_add(dy.wrapping_mul(CHUNK_SIZE)),
            z: self.z.wrapping_add(dz.wrapping_mul(CHUNK_SIZE)),
        }
    }

    #[inline]
    pub fn contains(self, x: i32, y: i32, z: i32) -> bool {
        let inside = |v: i32, o: i32| (v.wrapping_sub(o) as u32) < CHUNK_SIZE as u32;
        inside(x, self.x) && inside(y, self.y) && inside(z, self.z)
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkOrigin) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let dz = i64::from(self.z) - i64::from(other.z);
        dx * dx + dy * dy + dz * dz
    }
}

impl From<ChunkOrigin> for (i32, i32, i32) {
    fn from(value: ChunkOrigin) -> Self {
        (value.x, value.y, value.z)
    }
}
