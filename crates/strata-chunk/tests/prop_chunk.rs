use proptest::prelude::*;
use strata_blocks::{Block, BlockKind};
use strata_chunk::{CHUNK_SIZE, ChunkOrigin, ChunkStore, DEPTH, chunk_align};

fn coord() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

fn height() -> impl Strategy<Value = i32> {
    -DEPTH..1_000
}

#[test]
fn set_then_read_scenario() {
    let mut s = ChunkStore::new();
    assert!(s.get_block(5, 5, 5).is_none());
    s.write_slot(5, 5, 5, Some(Block::new(BlockKind::Stone)));
    assert_eq!(s.len(), 1);
    let c = s.find(ChunkOrigin::new(4, 4, 4)).expect("chunk at (4,4,4)");
    assert_eq!(c.origin(), ChunkOrigin::new(4, 4, 4));
    assert_eq!(
        c.slots()[strata_chunk::Chunk::idx(1, 1, 1)],
        Some(Block::new(BlockKind::Stone))
    );
    assert_eq!(s.get_block(5, 5, 5), Some(&Block::new(BlockKind::Stone)));
    assert!(s.get_block_eval(5, 5, 5).is_none());
}

#[test]
fn generated_flags_cover_two_cubed_sub_cubes() {
    let mut s = ChunkStore::new();
    s.set_generated(1, 1, 1);
    for (x, y, z) in [(0, 0, 0), (1, 0, 1), (0, 1, 0), (1, 1, 1)] {
        assert!(s.is_generated(x, y, z));
    }
    assert!(!s.is_generated(2, 0, 0));
    assert!(!s.is_generated(0, 2, 0));
    assert!(!s.is_generated(0, 0, 2));
    assert_eq!(s.find(ChunkOrigin::new(0, 0, 0)).unwrap().generated_flags(), 1);
}

proptest! {
    // The chunk that owns a position sits at the aligned coordinates of that position.
    #[test]
    fn found_chunk_is_aligned(x in coord(), y in height(), z in coord()) {
        let mut s = ChunkStore::new();
        s.write_slot(x, y, z, Some(Block::AIR));
        let o = ChunkOrigin::containing(x, y, z);
        let c = s.find(o).expect("chunk exists after write");
        prop_assert_eq!(c.origin().x, chunk_align(x));
        prop_assert_eq!(c.origin().y, chunk_align(y));
        prop_assert_eq!(c.origin().z, chunk_align(z));
        prop_assert!(c.origin().x <= x && x < c.origin().x + CHUNK_SIZE);
        prop_assert!(c.origin().contains(x, y, z));
    }

    // Slots written without set_generated stay invisible to eval reads.
    #[test]
    fn eval_reads_gate_on_generated(x in coord(), y in height(), z in coord()) {
        let mut s = ChunkStore::new();
        s.write_slot(x, y, z, Some(Block::new(BlockKind::Dirt)));
        prop_assert!(s.get_block(x, y, z).is_some());
        prop_assert!(s.get_block_eval(x, y, z).is_none());
        s.set_generated(x, y, z);
        prop_assert_eq!(s.get_block_eval(x, y, z), Some(&Block::new(BlockKind::Dirt)));
    }

    // A generated sub-cube never leaks into a neighbouring chunk.
    #[test]
    fn generated_flag_stays_in_chunk(x in coord(), y in height(), z in coord()) {
        let mut s = ChunkStore::new();
        s.set_generated(x, y, z);
        let o = ChunkOrigin::containing(x, y, z);
        let neighbour = o.offset_chunks(1, 0, 0);
        prop_assert!(!s.is_generated(neighbour.x, neighbour.y, neighbour.z));
    }
}
