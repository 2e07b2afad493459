use strata_blocks::{Block, MAX_LIGHT};

/// Seeds light for a freshly generated `size`³ batch laid out as `(y*size + z)*size + x`.
///
/// Sky light falls straight down each column from the top of the batch, losing two levels per
/// translucent cell and stopping at the first opaque one. Block light is set to each block's
/// emission. Lateral spread is left to the world's lighting queue.
pub fn light_columns(blocks: &mut [Block], size: usize) {
    debug_assert_eq!(blocks.len(), size * size * size);
    for z in 0..size {
        for x in 0..size {
            let mut level = MAX_LIGHT;
            for y in (0..size).rev() {
                let b = &mut blocks[(y * size + z) * size + x];
                if b.is_opaque() {
                    level = 0;
                } else if b.is_translucent() {
                    level = level.saturating_sub(2);
                }
                b.sky_light = level;
                b.block_light = b.light_emission();
            }
        }
    }
}
