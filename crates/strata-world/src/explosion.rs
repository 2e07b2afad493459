use std::sync::OnceLock;

use rayon::prelude::*;
use strata_blocks::{Block, BlockKind};
use strata_chunk::{BlockPos, ChunkStore};
use strata_geom::Vec3;

/// Grid resolution of the blast directions; only cells on the grid's surface are used.
const GRID: usize = 16;
const STEP: f32 = 0.3;
const STEP_DECAY: f32 = 0.225;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingExplosion {
    pub center: Vec3,
    pub strength: f32,
    pub ignore_rails: bool,
}

/// Unit directions through the surface cells of a `GRID`³ cube (1352 of them).
pub fn blast_directions() -> &'static [Vec3] {
    static DIRS: OnceLock<Vec<Vec3>> = OnceLock::new();
    DIRS.get_or_init(|| {
        let edge = (GRID - 1) as f32;
        let mut out = Vec::with_capacity(GRID * GRID * 6);
        for i in 0..GRID {
            for j in 0..GRID {
                for k in 0..GRID {
                    let on_surface = [i, j, k].iter().any(|v| *v == 0 || *v == GRID - 1);
                    if !on_surface {
                        continue;
                    }
                    let d = Vec3::new(
                        i as f32 / edge * 2.0 - 1.0,
                        j as f32 / edge * 2.0 - 1.0,
                        k as f32 / edge * 2.0 - 1.0,
                    );
                    out.push(d.normalized());
                }
            }
        }
        out
    })
}

fn march(store: &ChunkStore, blast: &PendingExplosion, dir: Vec3, jitter: f32) -> Vec<BlockPos> {
    let mut out = Vec::new();
    let mut intensity = blast.strength * (0.7 + 0.6 * jitter);
    let mut p = blast.center;
    while intensity > 0.0 {
        let (x, y, z) = p.floor_i32();
        let Some(b) = store.get_block_eval(x, y, z) else {
            break;
        };
        if !b.is_air() {
            intensity -= (b.kind.blast_resistance() + 0.3) * 0.3;
            let spared = blast.ignore_rails && b.is(BlockKind::Rail);
            if intensity > 0.0 && !spared {
                out.push(BlockPos::new(x, y, z));
            }
        }
        p += dir * STEP;
        intensity -= STEP_DECAY;
    }
    out
}

/// Casts every blast ray in parallel against the immutable store and returns the destroyed
/// cells, sorted and deduplicated. `seed` makes the per-ray jitter reproducible.
pub fn cast_rays(store: &ChunkStore, blast: &PendingExplosion, seed: u64) -> Vec<BlockPos> {
    let mut cells: Vec<BlockPos> = blast_directions()
        .par_iter()
        .enumerate()
        .flat_map_iter(|(i, dir)| {
            let mut rng = fastrand::Rng::with_seed(seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            march(store, blast, *dir, rng.f32())
        })
        .collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}

/// True for blocks an explosion converts into something other than air.
#[inline]
pub(crate) fn primes_instead(b: &Block) -> bool {
    b.is(BlockKind::Tnt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_count_matches_cube_surface() {
        let dirs = blast_directions();
        assert_eq!(dirs.len(), 16 * 16 * 16 - 14 * 14 * 14);
        assert!(dirs.iter().all(|d| (d.length() - 1.0).abs() < 1e-5));
    }

    fn filled(kind: BlockKind) -> ChunkStore {
        let mut store = ChunkStore::new();
        for y in -8..8 {
            for z in -8..8 {
                for x in -8..8 {
                    store.write_slot(x, y, z, Some(Block::new(kind)));
                    store.set_generated(x, y, z);
                }
            }
        }
        store
    }

    #[test]
    fn bedrock_stops_everything() {
        let store = filled(BlockKind::Bedrock);
        let blast = PendingExplosion {
            center: Vec3::new(0.5, 0.5, 0.5),
            strength: 4.0,
            ignore_rails: false,
        };
        assert!(cast_rays(&store, &blast, 7).is_empty());
    }

    #[test]
    fn dirt_crater_is_bounded_and_reproducible() {
        let store = filled(BlockKind::Dirt);
        let blast = PendingExplosion {
            center: Vec3::new(0.5, 0.5, 0.5),
            strength: 4.0,
            ignore_rails: false,
        };
        let a = cast_rays(&store, &blast, 42);
        let b = cast_rays(&store, &blast, 42);
        assert_eq!(a, b);
        assert!(a.contains(&BlockPos::new(0, 0, 0)));
        assert!(a.iter().all(|c| c.x.abs() <= 6 && c.y.abs() <= 6 && c.z.abs() <= 6));
    }

    #[test]
    fn rails_are_spared_on_request() {
        let store = filled(BlockKind::Rail);
        let blast = PendingExplosion {
            center: Vec3::new(0.5, 0.5, 0.5),
            strength: 2.0,
            ignore_rails: true,
        };
        assert!(cast_rays(&store, &blast, 1).is_empty());
    }
}
