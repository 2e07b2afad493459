use hashbrown::HashMap;
use strata_blocks::Block;

use crate::chunk::Chunk;
use crate::coord::ChunkOrigin;
use crate::{DRAW_PHASES, in_vertical_range};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkStoreStats {
    pub chunks: usize,
    pub generated_chunks: usize,
    pub fully_generated_chunks: usize,
    pub counter: u64,
}

/// Sparse map from chunk origin to chunk, plus the insertion-ordered traversal list.
///
/// All reads are `&self` and the store holds no interior caches, so a shared reference can be
/// handed to parallel readers.
#[derive(Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkOrigin, Box<Chunk>>,
    order: Vec<ChunkOrigin>,
    counter: u64,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ChunkStoreStats {
        let generated_chunks = self.chunks.values().filter(|c| c.any_generated()).count();
        let fully_generated_chunks = self
            .chunks
            .values()
            .filter(|c| c.is_fully_generated())
            .count();
        ChunkStoreStats {
            chunks: self.chunks.len(),
            generated_chunks,
            fully_generated_chunks,
            counter: self.counter,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn chunk_origin(x: i32, y: i32, z: i32) -> ChunkOrigin {
        ChunkOrigin::containing(x, y, z)
    }

    /// Index of a world position inside its chunk's slot array.
    #[inline]
    pub fn local_index(x: i32, y: i32, z: i32) -> usize {
        let o = ChunkOrigin::containing(x, y, z);
        Chunk::idx(x - o.x, y - o.y, z - o.z)
    }

    pub fn find(&self, origin: ChunkOrigin) -> Option<&Chunk> {
        debug_assert!(origin.is_aligned(), "misaligned lookup {origin:?}");
        self.chunks.get(&origin).map(|c| &**c)
    }

    pub fn find_mut(&mut self, origin: ChunkOrigin) -> Option<&mut Chunk> {
        debug_assert!(origin.is_aligned(), "misaligned lookup {origin:?}");
        self.chunks.get_mut(&origin).map(|c| &mut **c)
    }

    /// Returns the chunk at `origin`, allocating it and appending it to the traversal list on miss.
    pub fn find_or_insert(&mut self, origin: ChunkOrigin) -> &mut Chunk {
        debug_assert!(origin.is_aligned(), "misaligned insert {origin:?}");
        let order = &mut self.order;
        let chunk = self.chunks.entry(origin).or_insert_with(|| {
            order.push(origin);
            Box::new(Chunk::new(origin))
        });
        &mut **chunk
    }

    /// Raw slot read; ignores the generated flags.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        self.find(ChunkOrigin::containing(x, y, z))?.slot(x, y, z)
    }

    /// Slot read that only answers for generated cells.
    pub fn get_block_eval(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        let chunk = self.find(ChunkOrigin::containing(x, y, z))?;
        if !chunk.is_generated(x, y, z) {
            return None;
        }
        chunk.slot(x, y, z)
    }

    pub fn block_mut(&mut self, x: i32, y: i32, z: i32) -> Option<&mut Block> {
        self.find_mut(ChunkOrigin::containing(x, y, z))?
            .slot_mut(x, y, z)
    }

    pub fn block_eval_mut(&mut self, x: i32, y: i32, z: i32) -> Option<&mut Block> {
        let chunk = self.find_mut(ChunkOrigin::containing(x, y, z))?;
        if !chunk.is_generated(x, y, z) {
            return None;
        }
        chunk.slot_mut(x, y, z)
    }

    #[inline]
    pub fn is_generated(&self, x: i32, y: i32, z: i32) -> bool {
        self.find(ChunkOrigin::containing(x, y, z))
            .is_some_and(|c| c.is_generated(x, y, z))
    }

    /// Marks the sub-cube holding `(x,y,z)` generated, creating the chunk if needed.
    pub fn set_generated(&mut self, x: i32, y: i32, z: i32) {
        self.find_or_insert(ChunkOrigin::containing(x, y, z))
            .set_generated(x, y, z);
    }

    /// Writes a slot without any lighting or invalidation side effects and returns the old
    /// value. Out-of-band writes are ignored.
    pub fn write_slot(&mut self, x: i32, y: i32, z: i32, block: Option<Block>) -> Option<Block> {
        if !in_vertical_range(y) {
            return None;
        }
        self.find_or_insert(ChunkOrigin::containing(x, y, z))
            .replace_slot(x, y, z, block)
    }

    /// Advances the display counter and stamps every draw phase of the chunk with it.
    pub fn bump_display(&mut self, origin: ChunkOrigin) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        let stamp = self.counter;
        if let Some(c) = self.find_mut(origin) {
            c.draws_anything_tag = stamp;
            c.display_tags = [stamp; DRAW_PHASES];
        }
        stamp
    }

    /// Current value of the display counter.
    #[inline]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Origins in insertion order.
    #[inline]
    pub fn origins(&self) -> &[ChunkOrigin] {
        &self.order
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.order.iter().filter_map(|o| self.find(*o))
    }

    /// Drops every chunk. The display counter keeps counting so cached tags stay stale.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.order.clear();
        self.counter = self.counter.wrapping_add(1).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_blocks::BlockKind;

    #[test]
    fn find_or_insert_links_once() {
        let mut s = ChunkStore::new();
        let o = ChunkOrigin::new(-4, 0, 8);
        s.find_or_insert(o);
        s.find_or_insert(o);
        assert_eq!(s.len(), 1);
        assert_eq!(s.origins(), &[o]);
    }

    #[test]
    fn write_slot_ignores_out_of_band() {
        let mut s = ChunkStore::new();
        assert_eq!(s.write_slot(0, -65, 0, Some(Block::new(BlockKind::Stone))), None);
        assert!(s.is_empty());
    }

    #[test]
    fn bump_display_stamps_chunk() {
        let mut s = ChunkStore::new();
        let o = ChunkOrigin::new(0, 0, 0);
        s.find_or_insert(o);
        let a = s.bump_display(o);
        let b = s.bump_display(o);
        assert!(b > a);
        let c = s.find(o).unwrap();
        assert_eq!(c.draws_anything_tag, b);
        assert_eq!(c.display_tags, [b; DRAW_PHASES]);
    }

    #[test]
    fn local_index_is_unique_within_chunk() {
        let mut seen = [false; crate::CHUNK_VOLUME];
        for y in 8..12 {
            for z in -4..0 {
                for x in 4..8 {
                    let i = ChunkStore::local_index(x, y, z);
                    assert!(!seen[i]);
                    seen[i] = true;
                }
            }
        }
        assert!(seen.iter().all(|b| *b));
    }
}
