use std::time::{Duration, Instant};

use strata_blocks::BlockKind;
use strata_chunk::BlockPos;
use strata_geom::Vec3;
use strata_world::{Camera, World, WorldConfig};
use strata_worldgen::{GenSettings, Mode, WorldGenConfig};

fn flat_world(workers: usize) -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut gen_cfg = WorldGenConfig::default();
    gen_cfg.mode = Mode::Flat;
    let mut cfg = WorldConfig::default();
    cfg.generation.workers = workers;
    cfg.generation.radius = 16;
    cfg.ticks.random_updates_per_tick = 0;
    World::new(cfg, GenSettings::new(4, gen_cfg)).unwrap()
}

#[test]
fn blocking_generation_fills_the_neighbourhood() {
    let mut w = flat_world(2);
    let merged = w.generate_around_blocking(BlockPos::new(0, 0, 0), 8);
    assert_eq!(merged, 8);
    for origin in [BlockPos::new(-16, -16, -16), BlockPos::new(0, 0, 0)] {
        assert!(w.is_batch_generated(origin), "{origin:?}");
    }
    assert_eq!(w.get_block_eval(0, 3, 0).unwrap().kind, BlockKind::Grass);
    assert_eq!(w.get_block_eval(-5, 2, 7).unwrap().kind, BlockKind::Dirt);
    assert_eq!(w.get_block_eval(3, -10, -3).unwrap().kind, BlockKind::Stone);
    assert_eq!(w.get_block_eval(0, 4, 0).unwrap().kind, BlockKind::Air);

    w.step(0.05);
    assert_eq!(w.get_block_eval(0, 8, 0).unwrap().sky_light, 15);

    // already generated batches are not requested again
    assert_eq!(w.generate_around_blocking(BlockPos::new(0, 0, 0), 8), 0);
}

#[test]
fn merge_keeps_cells_edited_before_the_batch_arrived() {
    let mut w = flat_world(1);
    w.set_generated_block(1, 3, 1, strata_blocks::Block::new(BlockKind::Glass));
    w.generate_around_blocking(BlockPos::new(1, 3, 1), 0);
    assert_eq!(w.get_block_eval(1, 3, 1).unwrap().kind, BlockKind::Glass);
    // the neighbouring sub-cube came from the generator
    assert_eq!(w.get_block_eval(4, 3, 1).unwrap().kind, BlockKind::Grass);
}

#[test]
fn camera_driven_generation_reaches_the_camera_batch() {
    let mut w = flat_world(2);
    let camera = Camera::new(Vec3::new(8.0, 8.0, 8.0), Vec3::new(1.0, 0.0, 0.0));
    let deadline = Instant::now() + Duration::from_secs(30);
    while !w.is_batch_generated(BlockPos::new(0, 0, 0)) {
        assert!(Instant::now() < deadline, "camera batch never generated");
        w.generate_chunks(&camera);
        std::thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(w.get_block_eval(8, 3, 8).unwrap().kind, BlockKind::Grass);
}

#[test]
fn flagged_batches_jump_the_queue() {
    let mut w = flat_world(1);
    w.flag_generate(100, 2, 100);
    assert!(w.pool_stats().has_pending);
    w.flag_generate(0, -65, 0);
    let camera = Camera::new(Vec3::new(100.0, 2.0, 100.0), Vec3::new(0.0, 0.0, 1.0));
    let deadline = Instant::now() + Duration::from_secs(30);
    while !w.is_batch_generated(BlockPos::new(96, 0, 96)) {
        assert!(Instant::now() < deadline);
        w.generate_chunks(&camera);
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn switching_generator_keeps_existing_terrain() {
    let mut w = flat_world(1);
    w.generate_around_blocking(BlockPos::new(0, 0, 0), 0);
    let mut thick = WorldGenConfig::default();
    thick.mode = Mode::Flat;
    thick.flat.thickness = 8;
    w.update_generation_config(thick);
    assert_eq!(w.settings().config.flat.thickness, 8);
    assert_eq!(w.get_block_eval(0, 3, 0).unwrap().kind, BlockKind::Grass);

    w.generate_around_blocking(BlockPos::new(20, 0, 0), 0);
    assert_eq!(w.get_block_eval(20, 7, 0).unwrap().kind, BlockKind::Grass);
}
