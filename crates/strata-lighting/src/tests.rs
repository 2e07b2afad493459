use super::*;
use strata_blocks::BlockKind;

fn generated_store(cells: &[((i32, i32, i32), Block)]) -> ChunkStore {
    let mut s = ChunkStore::new();
    for &((x, y, z), b) in cells {
        s.write_slot(x, y, z, Some(b));
        s.set_generated(x, y, z);
    }
    s
}

fn air_box(x0: i32, x1: i32, y0: i32, y1: i32, z0: i32, z1: i32) -> Vec<((i32, i32, i32), Block)> {
    let mut v = Vec::new();
    for y in y0..y1 {
        for z in z0..z1 {
            for x in x0..x1 {
                v.push(((x, y, z), Block::AIR));
            }
        }
    }
    v
}

#[test]
fn air_under_open_sky_is_full_bright() {
    let mut s = generated_store(&air_box(0, 2, 0, 2, 0, 2));
    assert!(recompute_cell(&mut s, 0, 1, 0));
    assert_eq!(s.get_block(0, 1, 0).unwrap().sky_light, MAX_LIGHT);
    assert!(!recompute_cell(&mut s, 0, 1, 0));
}

#[test]
fn opaque_cells_hold_only_emission() {
    let mut s = generated_store(&[((0, 0, 0), Block::new(BlockKind::Glowstone))]);
    recompute_cell(&mut s, 0, 0, 0);
    let b = s.get_block(0, 0, 0).unwrap();
    assert_eq!((b.sky_light, b.block_light), (0, 15));
}

#[test]
fn torch_light_falls_off_by_one() {
    let mut cells = air_box(0, 4, 0, 2, 0, 2);
    cells.push(((0, 0, 0), Block::new(BlockKind::Torch)));
    let mut s = generated_store(&cells);
    for _ in 0..4 {
        for x in 0..4 {
            recompute_cell(&mut s, x, 0, 0);
        }
    }
    assert_eq!(s.get_block(0, 0, 0).unwrap().block_light, 14);
    assert_eq!(s.get_block(1, 0, 0).unwrap().block_light, 13);
    assert_eq!(s.get_block(3, 0, 0).unwrap().block_light, 11);
}

#[test]
fn sky_brightness_range() {
    assert!((sky_brightness(0.0) - 0.2).abs() < 1e-5);
    assert!((sky_brightness(0.5) - 1.0).abs() < 1e-5);
    for i in 0..100 {
        let v = sky_brightness(i as f32 / 100.0);
        assert!((0.2..=1.0).contains(&v));
    }
}

#[test]
fn lighting_array_reads_ungenerated_as_sky() {
    let s = ChunkStore::new();
    let a = lighting_array(&s, 10, 10, 10, 0.6);
    assert!(a.iter().flatten().flatten().all(|v| (*v - 0.6).abs() < 1e-6));
}

#[test]
fn columns_stop_at_opaque() {
    let size = 4;
    let mut blocks = vec![Block::AIR; size * size * size];
    blocks[(2 * size) * size] = Block::new(BlockKind::Stone);
    blocks[(3 * size + 1) * size + 1] = Block::new(BlockKind::Leaves);
    light_columns(&mut blocks, size);
    assert_eq!(blocks[(3 * size) * size].sky_light, 15);
    assert_eq!(blocks[(2 * size) * size].sky_light, 0);
    assert_eq!(blocks[(size) * size].sky_light, 0);
    assert_eq!(blocks[(3 * size + 1) * size + 1].sky_light, 13);
    assert_eq!(blocks[(size + 1) * size + 1].sky_light, 13);
}
