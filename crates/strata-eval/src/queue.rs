use hashbrown::HashMap;
use strata_blocks::Block;
use strata_chunk::BlockPos;

/// One pending evaluation: a cell, optionally carrying a block to write when drained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalNode {
    pub pos: BlockPos,
    pub payload: Option<Block>,
}

type NodeKey = (BlockPos, bool);

/// Insertion-ordered queue keyed by `(pos, payload present)`.
///
/// Inserting an existing key replaces the payload in place; the entry keeps its original
/// position in the drain order.
#[derive(Default, Debug, Clone)]
pub struct EvalQueue {
    index: HashMap<NodeKey, usize>,
    entries: Vec<EvalNode>,
}

impl EvalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pos: BlockPos, payload: Option<Block>) {
        let key = (pos, payload.is_some());
        match self.index.get(&key) {
            Some(&i) => self.entries[i].payload = payload,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(EvalNode { pos, payload });
            }
        }
    }

    /// True when any node, with or without payload, is pending for `pos`.
    pub fn contains(&self, pos: BlockPos) -> bool {
        self.index.contains_key(&(pos, false)) || self.index.contains_key(&(pos, true))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Takes every pending node in insertion order and leaves the queue empty. Nodes inserted
    /// while the returned batch is processed land in the next detach.
    pub fn detach(&mut self) -> Vec<EvalNode> {
        self.index.clear();
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvalNode> + '_ {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_blocks::BlockKind;

    #[test]
    fn same_key_collapses() {
        let mut q = EvalQueue::new();
        let p = BlockPos::new(1, 2, 3);
        q.insert(p, None);
        q.insert(p, None);
        q.insert(BlockPos::new(0, 0, 0), None);
        q.insert(p, None);
        assert_eq!(q.len(), 2);
        let nodes = q.detach();
        assert_eq!(nodes[0].pos, p);
        assert!(q.is_empty());
        assert!(!q.contains(p));
    }

    #[test]
    fn payload_presence_is_part_of_the_key() {
        let mut q = EvalQueue::new();
        let p = BlockPos::new(0, 0, 0);
        q.insert(p, None);
        q.insert(p, Some(Block::new(BlockKind::Stone)));
        assert_eq!(q.len(), 2);
        assert!(q.contains(p));
    }

    #[test]
    fn second_payload_replaces_first_in_place() {
        let mut q = EvalQueue::new();
        let p = BlockPos::new(7, 0, 7);
        q.insert(p, Some(Block::redstone_torch(true)));
        q.insert(BlockPos::new(8, 0, 7), None);
        q.insert(p, Some(Block::redstone_torch(false)));
        let nodes = q.detach();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].pos, p);
        assert_eq!(nodes[0].payload, Some(Block::redstone_torch(false)));
    }

    #[test]
    fn inserts_after_detach_start_a_new_batch() {
        let mut q = EvalQueue::new();
        q.insert(BlockPos::new(0, 0, 0), None);
        let first = q.detach();
        for n in &first {
            q.insert(n.pos, None);
        }
        assert_eq!(first.len(), 1);
        assert_eq!(q.len(), 1);
    }
}
