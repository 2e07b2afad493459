use strata_blocks::{Block, BlockKind};
use strata_chunk::{BlockPos, DEPTH, GENERATE_SIZE};

use crate::config::WorldGenParams;
use crate::{Biome, GenerateError, GeneratedChunk, TerrainGenerator, check_batch_origin};

/// Layered ground: bedrock floor, stone, one dirt layer and grass on top.
pub struct FlatGenerator {
    top: i32,
}

impl FlatGenerator {
    pub fn new(params: &WorldGenParams) -> Self {
        Self {
            top: params.flat_thickness - 1,
        }
    }

    fn block_at(&self, y: i32) -> Block {
        let kind = if y <= -DEPTH {
            BlockKind::Bedrock
        } else if y < self.top - 1 {
            BlockKind::Stone
        } else if y < self.top {
            BlockKind::Dirt
        } else if y == self.top {
            BlockKind::Grass
        } else {
            BlockKind::Air
        };
        Block::new(kind)
    }
}

impl TerrainGenerator for FlatGenerator {
    fn generate(&mut self, origin: BlockPos) -> Result<GeneratedChunk, GenerateError> {
        check_batch_origin(origin)?;
        let mut out = GeneratedChunk::filled(origin, Block::AIR);
        for ly in 0..GENERATE_SIZE {
            let b = self.block_at(origin.y + ly);
            if b.is_air() {
                continue;
            }
            for lz in 0..GENERATE_SIZE {
                for lx in 0..GENERATE_SIZE {
                    out.set_local(lx, ly, lz, b);
                }
            }
        }
        Ok(out)
    }

    fn rock_height(&mut self, _x: i32, _z: i32) -> i32 {
        self.top
    }

    fn biome_at(&mut self, _x: i32, _z: i32) -> Biome {
        Biome::Plains
    }
}
