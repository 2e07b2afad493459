use strata_blocks::BlockKind;

use crate::Biome;
use crate::config::WorldGenParams;

fn hash2(ix: i32, iz: i32, seed: u32) -> u32 {
    let mut h = (ix as u32).wrapping_mul(0x85eb_ca6b)
        ^ (iz as u32).wrapping_mul(0xc2b2_ae35)
        ^ seed.wrapping_mul(0x27d4_eb2d);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

fn rand01(seed: u32, ix: i32, iz: i32, salt: u32) -> f32 {
    let h = hash2(ix, iz, (seed ^ salt).wrapping_add(0x9E37_79B9));
    ((h & 0x00FF_FFFF) as f32) / 16_777_216.0
}

/// Trunk height of the tree rooted in column `(x, z)`, if one grows there.
pub(crate) fn tree_in_column(
    seed: i32,
    params: &WorldGenParams,
    biome: Biome,
    x: i32,
    z: i32,
) -> Option<i32> {
    let density = match biome {
        Biome::Forest => params.tree_probability * 5.0,
        Biome::Plains => params.tree_probability,
        Biome::Desert | Biome::Ocean | Biome::Mountains => return None,
    };
    let seed = seed as u32;
    if rand01(seed, x, z, 0x7EE5) >= density {
        return None;
    }
    let span = (params.trunk_max - params.trunk_min + 1).max(1) as u32;
    Some(params.trunk_min + (hash2(x, z, seed ^ 0xA11CE) % span) as i32)
}

/// Offsets relative to the cell directly above the ground for a tree of the given trunk height.
/// Trunk entries come first; leaves never overlap the trunk.
pub fn tree_blocks(trunk_height: i32, leaf_radius: i32) -> Vec<(i32, i32, i32, BlockKind)> {
    let mut out = Vec::new();
    for dy in 0..trunk_height {
        out.push((0, dy, 0, BlockKind::Wood));
    }
    let top = trunk_height - 1;
    for dy in -2..=1 {
        let rad = if dy >= 1 { leaf_radius - 1 } else { leaf_radius };
        let extra = if dy <= -1 { 1 } else { 0 };
        for dz in -leaf_radius..=leaf_radius {
            for dx in -leaf_radius..=leaf_radius {
                if dx == 0 && dz == 0 && dy <= 0 {
                    continue;
                }
                if dx.abs() + dz.abs() <= rad + extra {
                    out.push((dx, top + dy, dz, BlockKind::Leaves));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trunk_is_solid_column() {
        let blocks = tree_blocks(5, 2);
        let wood: Vec<_> = blocks.iter().filter(|b| b.3 == BlockKind::Wood).collect();
        assert_eq!(wood.len(), 5);
        assert!(wood.iter().all(|b| b.0 == 0 && b.2 == 0));
        assert!(blocks.contains(&(0, 5, 0, BlockKind::Leaves)));
        assert!(!blocks.contains(&(0, 4, 0, BlockKind::Leaves)));
    }

    #[test]
    fn deserts_grow_nothing() {
        let p = WorldGenParams {
            tree_probability: 1.0,
            ..WorldGenParams::default()
        };
        assert_eq!(tree_in_column(1, &p, Biome::Desert, 0, 0), None);
        let h = tree_in_column(1, &p, Biome::Forest, 3, 4).unwrap();
        assert!((p.trunk_min..=p.trunk_max).contains(&h));
    }
}
