//! Chunked voxel storage: chunk records and the sparse chunk store.
#![forbid(unsafe_code)]

mod chunk;
mod coord;
mod store;

pub use chunk::{Chunk, EntityId, EntityList};
pub use coord::{BlockPos, ChunkOrigin, chunk_align, generate_align};
pub use store::{ChunkStore, ChunkStoreStats};

/// Edge length of a chunk. Must be a power of two.
pub const CHUNK_SIZE: i32 = 4;
pub const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Edge length of the sub-cubes tracked by a chunk's generated bitset.
pub const GENERATED_FLAG_SIZE: i32 = 2;
pub const GENERATED_FLAGS_PER_AXIS: i32 = CHUNK_SIZE / GENERATED_FLAG_SIZE;

/// Edge length of one terrain generator batch.
pub const GENERATE_SIZE: i32 = 16;

/// Lowest valid y is `-DEPTH`.
pub const DEPTH: i32 = 64;
/// Highest valid y is `HEIGHT - 1`.
pub const HEIGHT: i32 = 10_000;

/// Number of draw phases a chunk keeps a display tag for (opaque, translucent, overlay).
pub const DRAW_PHASES: usize = 3;

#[inline]
pub fn in_vertical_range(y: i32) -> bool {
    (-DEPTH..HEIGHT).contains(&y)
}
