use proptest::prelude::*;
use strata_blocks::Block;
use strata_chunk::BlockPos;
use strata_eval::{EvalScheduler, QueueKind};

fn arb_pos() -> impl Strategy<Value = BlockPos> {
    (-8i32..8, -8i32..8, -8i32..8).prop_map(|(x, y, z)| BlockPos::new(x, y, z))
}

proptest! {
    // N inserts of one cell before a drain yield exactly one node for that cell.
    #[test]
    fn repeated_inserts_drain_once(pos in arb_pos(), n in 1usize..50) {
        let mut s = EvalScheduler::default();
        for _ in 0..n {
            s.insert(QueueKind::Redstone, pos, None);
        }
        let nodes = s.detach(QueueKind::Redstone);
        prop_assert_eq!(nodes.iter().filter(|e| e.pos == pos).count(), 1);
    }

    // Drain order is first-insertion order and every key appears once.
    #[test]
    fn drain_preserves_first_insertion_order(cells in prop::collection::vec(arb_pos(), 1..80)) {
        let mut s = EvalScheduler::default();
        for p in &cells {
            s.insert(QueueKind::General, *p, None);
        }
        let mut expected = Vec::new();
        for p in &cells {
            if !expected.contains(p) {
                expected.push(*p);
            }
        }
        let got: Vec<BlockPos> = s.detach(QueueKind::General).into_iter().map(|n| n.pos).collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(s.queue(QueueKind::General).len(), 0);
    }

    // Payload nodes keep the last payload written for the cell.
    #[test]
    fn last_payload_wins(pos in arb_pos(), powers in prop::collection::vec(0u8..16, 1..10)) {
        let mut s = EvalScheduler::default();
        for p in &powers {
            s.insert(QueueKind::Redstone, pos, Some(Block::dust(*p)));
        }
        let nodes = s.detach(QueueKind::Redstone);
        prop_assert_eq!(nodes.len(), 1);
        prop_assert_eq!(nodes[0].payload, Some(Block::dust(*powers.last().unwrap())));
    }
}
