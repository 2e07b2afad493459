//! Per-cell light recompute, sky brightness, and light sampling for draw consumers.
#![forbid(unsafe_code)]

use strata_blocks::{Block, Face, MAX_LIGHT};
use strata_chunk::{ChunkStore, HEIGHT};

mod column;

pub use column::light_columns;

/// Light lost when entering a cell; translucent cells cost an extra level.
#[inline]
fn attenuation(b: &Block) -> u8 {
    if b.is_translucent() { 2 } else { 1 }
}

/// True when the cell above lets undiminished sky light fall straight into `(x,y,z)`.
fn open_to_sky(store: &ChunkStore, x: i32, y: i32, z: i32) -> bool {
    if y + 1 >= HEIGHT {
        return true;
    }
    match store.get_block_eval(x, y + 1, z) {
        None => true,
        Some(above) => {
            !above.is_opaque() && !above.is_translucent() && above.sky_light == MAX_LIGHT
        }
    }
}

/// Light levels `(sky, block)` that `(x,y,z)` should hold given its current neighbors.
/// `None` when the cell is not generated.
pub fn target_levels(store: &ChunkStore, x: i32, y: i32, z: i32) -> Option<(u8, u8)> {
    let b = store.get_block_eval(x, y, z)?;
    let emission = b.light_emission();
    if b.is_opaque() {
        return Some((0, emission));
    }
    let att = attenuation(b);
    let mut sky_in = 0u8;
    let mut blk_in = 0u8;
    for f in Face::ALL {
        let (nx, ny, nz) = f.neighbor(x, y, z);
        if let Some(n) = store.get_block_eval(nx, ny, nz) {
            sky_in = sky_in.max(n.sky_light);
            blk_in = blk_in.max(n.block_light);
        }
    }
    let sky = if !b.is_translucent() && open_to_sky(store, x, y, z) {
        MAX_LIGHT
    } else {
        sky_in.saturating_sub(att)
    };
    let blk = emission.max(blk_in.saturating_sub(att));
    Some((sky, blk))
}

/// Recomputes the cached light of one cell from its neighbors. Returns true when either level
/// changed, in which case the caller is expected to schedule the six neighbors.
pub fn recompute_cell(store: &mut ChunkStore, x: i32, y: i32, z: i32) -> bool {
    let Some((sky, blk)) = target_levels(store, x, y, z) else {
        return false;
    };
    let Some(b) = store.block_eval_mut(x, y, z) else {
        return false;
    };
    if b.sky_light == sky && b.block_light == blk {
        return false;
    }
    b.sky_light = sky;
    b.block_light = blk;
    true
}

/// Relights every generated cell in the 3×3×3 neighborhood of `(x,y,z)`, top layer first so
/// sky light can fall through in one pass. Returns the cells that changed.
pub fn relight_neighborhood(store: &mut ChunkStore, x: i32, y: i32, z: i32) -> Vec<(i32, i32, i32)> {
    let mut changed = Vec::new();
    for dy in [1, 0, -1] {
        for dz in -1..=1 {
            for dx in -1..=1 {
                let p = (x.wrapping_add(dx), y + dy, z.wrapping_add(dz));
                if recompute_cell(store, p.0, p.1, p.2) {
                    changed.push(p);
                }
            }
        }
    }
    changed
}

/// Global sky brightness multiplier for a time of day in `[0,1)`; 0 is midnight, 0.5 noon.
pub fn sky_brightness(time_of_day: f32) -> f32 {
    let t = time_of_day.rem_euclid(1.0);
    let daylight = 0.5 - 0.5 * (t * std::f32::consts::TAU).cos();
    // plateau around noon and midnight
    let shaped = ((daylight - 0.5) * 1.6 + 0.5).clamp(0.0, 1.0);
    0.2 + 0.8 * shaped
}

/// Effective brightness in `[0,1]` of a single block under the given sky multiplier.
#[inline]
pub fn block_brightness(b: &Block, sky: f32) -> f32 {
    let s = f32::from(b.sky_light) * sky;
    let l = f32::from(b.block_light);
    s.max(l) / f32::from(MAX_LIGHT)
}

/// Brightness of the 3×3×3 neighborhood around `(x,y,z)`, indexed `[dx+1][dy+1][dz+1]`.
/// Ungenerated neighbors read as open sky.
pub fn lighting_array(store: &ChunkStore, x: i32, y: i32, z: i32, sky: f32) -> [[[f32; 3]; 3]; 3] {
    let mut out = [[[0.0f32; 3]; 3]; 3];
    for (ix, plane) in out.iter_mut().enumerate() {
        for (iy, row) in plane.iter_mut().enumerate() {
            for (iz, v) in row.iter_mut().enumerate() {
                let (nx, ny, nz) = (
                    x.wrapping_add(ix as i32 - 1),
                    y + iy as i32 - 1,
                    z.wrapping_add(iz as i32 - 1),
                );
                *v = match store.get_block_eval(nx, ny, nz) {
                    Some(b) => block_brightness(b, sky),
                    None => sky,
                };
            }
        }
    }
    out
}

#[cfg(test)]
mod tests;
