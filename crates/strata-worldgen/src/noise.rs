use fastnoise_lite::{FastNoiseLite, NoiseType};
use strata_blocks::{Block, BlockKind};
use strata_chunk::{BlockPos, DEPTH, GENERATE_SIZE};

use crate::config::WorldGenParams;
use crate::trees::{tree_blocks, tree_in_column};
use crate::{Biome, GenerateError, GeneratedChunk, TerrainGenerator, check_batch_origin};

/// Height-map terrain with climate based biomes, noise caves, a flat sea and scattered trees.
pub struct NoiseGenerator {
    seed: i32,
    params: WorldGenParams,
    terrain: FastNoiseLite,
    climate: FastNoiseLite,
    caves: FastNoiseLite,
}

impl NoiseGenerator {
    pub fn new(seed: i32, params: WorldGenParams) -> Self {
        let mut terrain = FastNoiseLite::with_seed(seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(params.height_frequency));
        let mut climate = FastNoiseLite::with_seed(seed ^ 0x1203_5F31);
        climate.set_noise_type(Some(NoiseType::OpenSimplex2));
        climate.set_frequency(Some(params.climate_frequency));
        let mut caves = FastNoiseLite::with_seed(seed ^ 41_337);
        caves.set_noise_type(Some(NoiseType::OpenSimplex2));
        caves.set_frequency(Some(params.cave_frequency));
        Self {
            seed,
            params,
            terrain,
            climate,
            caves,
        }
    }

    pub fn params(&self) -> &WorldGenParams {
        &self.params
    }

    fn height(&self, x: i32, z: i32) -> i32 {
        let n = self.terrain.get_noise_2d(x as f32, z as f32);
        let t = ((n + 1.0) * 0.5).clamp(0.0, 1.0);
        let span = (self.params.max_y - self.params.min_y) as f32;
        self.params.min_y + (t * span).round() as i32
    }

    fn biome(&self, x: i32, z: i32, height: i32) -> Biome {
        let p = &self.params;
        if p.water_enable && height < p.sea_level {
            return Biome::Ocean;
        }
        if height >= p.mountain_y {
            return Biome::Mountains;
        }
        let c = self.climate.get_noise_2d(x as f32, z as f32);
        if c > p.desert_threshold {
            Biome::Desert
        } else if c < -0.2 {
            Biome::Forest
        } else {
            Biome::Plains
        }
    }

    fn column_block(&self, biome: Biome, height: i32, x: i32, y: i32, z: i32) -> BlockKind {
        let p = &self.params;
        if y <= -DEPTH {
            return BlockKind::Bedrock;
        }
        if y > height {
            return if p.water_enable && y <= p.sea_level {
                BlockKind::Water
            } else {
                BlockKind::Air
            };
        }
        let kind = if y == height {
            match biome {
                Biome::Ocean | Biome::Desert => BlockKind::Sand,
                Biome::Mountains => BlockKind::Stone,
                Biome::Plains | Biome::Forest => BlockKind::Grass,
            }
        } else if y > height - p.topsoil_thickness {
            match biome {
                Biome::Ocean => BlockKind::Gravel,
                Biome::Desert => BlockKind::Sand,
                Biome::Mountains => BlockKind::Stone,
                Biome::Plains | Biome::Forest => BlockKind::Dirt,
            }
        } else {
            BlockKind::Stone
        };
        if p.caves_enable && y < height - 1 && self.is_cave(x, y, z) {
            return BlockKind::Air;
        }
        kind
    }

    fn is_cave(&self, x: i32, y: i32, z: i32) -> bool {
        self.caves.get_noise_3d(x as f32, y as f32 * 1.5, z as f32) > self.params.cave_threshold
    }

    fn place_trees(&self, out: &mut GeneratedChunk) {
        let o = out.origin;
        let r = self.params.leaf_radius;
        for tz in o.z.saturating_sub(r)..o.z.saturating_add(GENERATE_SIZE + r) {
            for tx in o.x.saturating_sub(r)..o.x.saturating_add(GENERATE_SIZE + r) {
                let h = self.height(tx, tz);
                let biome = self.biome(tx, tz, h);
                let Some(trunk) = tree_in_column(self.seed, &self.params, biome, tx, tz) else {
                    continue;
                };
                let top = h + trunk + 2;
                if top < o.y || h + 1 - 2 >= o.y + GENERATE_SIZE {
                    continue;
                }
                for (dx, dy, dz, kind) in tree_blocks(trunk, r) {
                    let (x, y, z) = (tx.wrapping_add(dx), h + 1 + dy, tz.wrapping_add(dz));
                    let Some(cur) = out.get_world(x, y, z) else {
                        continue;
                    };
                    let fits = match kind {
                        BlockKind::Wood => cur.is_air() || cur.is(BlockKind::Leaves),
                        _ => cur.is_air(),
                    };
                    if fits {
                        out.set_local(x.wrapping_sub(o.x), y - o.y, z.wrapping_sub(o.z), Block::new(kind));
                    }
                }
            }
        }
    }
}

impl TerrainGenerator for NoiseGenerator {
    fn generate(&mut self, origin: BlockPos) -> Result<GeneratedChunk, GenerateError> {
        check_batch_origin(origin)?;
        let mut out = GeneratedChunk::filled(origin, Block::AIR);
        for lz in 0..GENERATE_SIZE {
            for lx in 0..GENERATE_SIZE {
                let (x, z) = (origin.x + lx, origin.z + lz);
                let h = self.height(x, z);
                let biome = self.biome(x, z, h);
                for ly in 0..GENERATE_SIZE {
                    let kind = self.column_block(biome, h, x, origin.y + ly, z);
                    if kind != BlockKind::Air {
                        out.set_local(lx, ly, lz, Block::new(kind));
                    }
                }
            }
        }
        if self.params.tree_probability > 0.0 {
            self.place_trees(&mut out);
        }
        Ok(out)
    }

    fn rock_height(&mut self, x: i32, z: i32) -> i32 {
        self.height(x, z)
    }

    fn biome_at(&mut self, x: i32, z: i32) -> Biome {
        let h = self.height(x, z);
        self.biome(x, z, h)
    }
}
