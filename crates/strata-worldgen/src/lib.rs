//! Terrain generation contract and the built-in generators.
#![forbid(unsafe_code)]

mod config;
mod flat;
mod noise;
mod trees;

pub use config::{
    Caves, Flat, GenSettings, Height, Mode, Surface, Trees, Water, WorldGenConfig, WorldGenParams,
    load_params_from_path,
};
pub use flat::FlatGenerator;
pub use noise::NoiseGenerator;
pub use trees::tree_blocks;

use strata_blocks::Block;
use strata_chunk::{BlockPos, DEPTH, GENERATE_SIZE, HEIGHT, generate_align};

/// Number of blocks in one generator batch.
pub const BATCH_VOLUME: usize = (GENERATE_SIZE * GENERATE_SIZE * GENERATE_SIZE) as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Plains,
    Forest,
    Desert,
    Ocean,
    Mountains,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("batch origin {0:?} is not aligned to the generation grid")]
    Misaligned(BlockPos),
    #[error("batch origin {0:?} is outside the vertical band")]
    OutOfRange(BlockPos),
    #[error("generator failed: {0}")]
    Failed(String),
}

/// A `GENERATE_SIZE`³ block batch produced off the simulation thread.
#[derive(Clone, Debug)]
pub struct GeneratedChunk {
    pub origin: BlockPos,
    /// Laid out as `(ly*GENERATE_SIZE + lz)*GENERATE_SIZE + lx`.
    pub blocks: Vec<Block>,
}

impl GeneratedChunk {
    pub fn filled(origin: BlockPos, block: Block) -> Self {
        Self {
            origin,
            blocks: vec![block; BATCH_VOLUME],
        }
    }

    #[inline]
    pub fn idx(lx: i32, ly: i32, lz: i32) -> usize {
        ((ly * GENERATE_SIZE + lz) * GENERATE_SIZE + lx) as usize
    }

    #[inline]
    pub fn get_local(&self, lx: i32, ly: i32, lz: i32) -> Block {
        self.blocks[Self::idx(lx, ly, lz)]
    }

    #[inline]
    pub fn set_local(&mut self, lx: i32, ly: i32, lz: i32, b: Block) {
        self.blocks[Self::idx(lx, ly, lz)] = b;
    }

    /// World-space read; `None` outside the batch.
    pub fn get_world(&self, x: i32, y: i32, z: i32) -> Option<Block> {
        let (lx, ly, lz) = (
            x.wrapping_sub(self.origin.x),
            y.wrapping_sub(self.origin.y),
            z.wrapping_sub(self.origin.z),
        );
        let r = 0..GENERATE_SIZE;
        (r.contains(&lx) && r.contains(&ly) && r.contains(&lz)).then(|| self.get_local(lx, ly, lz))
    }
}

/// Produces block batches for the world. Implementations are owned by one worker thread each.
pub trait TerrainGenerator: Send {
    /// Fills the batch at `origin`, which must be aligned to `GENERATE_SIZE`.
    fn generate(&mut self, origin: BlockPos) -> Result<GeneratedChunk, GenerateError>;

    /// Height of the topmost terrain block in column `(x, z)`.
    fn rock_height(&mut self, x: i32, z: i32) -> i32;

    fn biome_at(&mut self, x: i32, z: i32) -> Biome;
}

/// Checks a batch origin before generating.
pub fn check_batch_origin(origin: BlockPos) -> Result<(), GenerateError> {
    if generate_align(origin.x) != origin.x
        || generate_align(origin.y) != origin.y
        || generate_align(origin.z) != origin.z
    {
        return Err(GenerateError::Misaligned(origin));
    }
    if origin.y + GENERATE_SIZE <= -DEPTH || origin.y >= HEIGHT {
        return Err(GenerateError::OutOfRange(origin));
    }
    Ok(())
}

/// Builds the generator the settings ask for.
pub fn make_generator(settings: &GenSettings) -> Box<dyn TerrainGenerator> {
    let params = settings.params();
    match params.mode {
        Mode::Flat => Box::new(FlatGenerator::new(&params)),
        Mode::Normal => Box::new(NoiseGenerator::new(settings.seed, params)),
    }
}
