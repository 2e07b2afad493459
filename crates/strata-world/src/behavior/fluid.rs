use strata_blocks::{Block, BlockKind, Face};
use strata_chunk::BlockPos;

use super::step;
use crate::world::World;

/// What a fluid turns a cell of the other fluid into.
fn mixed(existing: Block, incoming: BlockKind) -> Option<Block> {
    match (existing.kind, incoming) {
        (BlockKind::Lava, BlockKind::Water) => Some(Block::new(if existing.meta == 0 {
            BlockKind::Stone
        } else {
            BlockKind::Cobblestone
        })),
        (BlockKind::Water, BlockKind::Lava) => Some(Block::new(BlockKind::Stone)),
        _ => None,
    }
}

impl World {
    /// Level this flowing cell should hold given its feeders, `None` when nothing feeds it.
    fn fed_level(&self, p: BlockPos, kind: BlockKind) -> Option<u8> {
        if self
            .block_at(step(p, Face::PosY, 1))
            .is_some_and(|a| a.is(kind))
        {
            return Some(1);
        }
        Face::HORIZONTAL
            .iter()
            .filter_map(|f| self.block_at(step(p, *f, 1)))
            .filter(|n| n.is(kind))
            .map(|n| n.meta + 1)
            .min()
    }

    /// Fluid update: dry up when unfed, fall, then spread sideways one level thinner.
    pub(crate) fn flow(&mut self, p: BlockPos, b: Block) {
        let kind = b.kind;
        let max = kind.max_meta();

        if kind == BlockKind::Lava && self.touches(p, BlockKind::Water) {
            if let Some(solid) = mixed(b, BlockKind::Water) {
                self.put(p, solid);
            }
            return;
        }

        if b.meta > 0 {
            match self.fed_level(p, kind) {
                Some(level) if level <= max => {
                    if level != b.meta {
                        self.put(p, Block::fluid(kind, level));
                        return;
                    }
                }
                _ => {
                    self.put(p, Block::AIR);
                    return;
                }
            }
        }

        let below = step(p, Face::NegY, 1);
        match self.block_at(below) {
            None => return,
            Some(n) if n.is(kind) => return,
            Some(n) if n.kind.is_fluid() => {
                if let Some(solid) = mixed(n, kind) {
                    self.put(below, solid);
                }
                return;
            }
            Some(n) if n.is_replaceable() => {
                self.put(below, Block::fluid(kind, 1));
                return;
            }
            Some(_) => {}
        }

        if b.meta >= max {
            return;
        }
        let next = b.meta + 1;
        for face in Face::HORIZONTAL {
            let n = step(p, face, 1);
            let Some(nb) = self.block_at(n) else {
                continue;
            };
            if nb.is(kind) {
                if nb.meta > next {
                    self.put(n, Block::fluid(kind, next));
                }
            } else if nb.kind.is_fluid() {
                if let Some(solid) = mixed(nb, kind) {
                    self.put(n, solid);
                }
            } else if nb.is_replaceable() {
                self.put(n, Block::fluid(kind, next));
            }
        }
    }
}
