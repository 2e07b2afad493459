use proptest::prelude::*;
use strata_blocks::BlockKind;
use strata_chunk::{BlockPos, DEPTH, GENERATE_SIZE};
use strata_worldgen::{
    GenSettings, GenerateError, GeneratedChunk, Mode, TerrainGenerator, WorldGenConfig,
    make_generator,
};

fn flat_settings(thickness: i32) -> GenSettings {
    let mut cfg = WorldGenConfig::default();
    cfg.mode = Mode::Flat;
    cfg.flat.thickness = thickness;
    GenSettings::new(1, cfg)
}

#[test]
fn flat_layers() {
    let mut g = make_generator(&flat_settings(4));
    let batch = g.generate(BlockPos::new(0, 0, 0)).unwrap();
    assert_eq!(batch.get_world(3, 3, 3).unwrap().kind, BlockKind::Grass);
    assert_eq!(batch.get_world(3, 2, 3).unwrap().kind, BlockKind::Dirt);
    assert_eq!(batch.get_world(3, 1, 3).unwrap().kind, BlockKind::Stone);
    assert!(batch.get_world(3, 4, 3).unwrap().is_air());
    assert_eq!(g.rock_height(100, -100), 3);
}

#[test]
fn bedrock_floor() {
    for settings in [flat_settings(2), GenSettings::new(5, WorldGenConfig::default())] {
        let mut g = make_generator(&settings);
        let batch = g.generate(BlockPos::new(16, -DEPTH, -32)).unwrap();
        for lz in 0..GENERATE_SIZE {
            for lx in 0..GENERATE_SIZE {
                assert_eq!(batch.get_local(lx, 0, lz).kind, BlockKind::Bedrock);
            }
        }
    }
}

#[test]
fn misaligned_origin_is_rejected() {
    let mut g = make_generator(&GenSettings::default());
    assert!(matches!(
        g.generate(BlockPos::new(4, 0, 0)),
        Err(GenerateError::Misaligned(_))
    ));
    assert!(matches!(
        g.generate(BlockPos::new(0, -96, 0)),
        Err(GenerateError::OutOfRange(_))
    ));
}

#[test]
fn surface_sits_at_rock_height() {
    let mut cfg = WorldGenConfig::default();
    cfg.caves.enable = false;
    cfg.trees.probability = 0.0;
    cfg.water.enable = false;
    let mut g = make_generator(&GenSettings::new(77, cfg));
    let h = g.rock_height(5, 9);
    let origin = BlockPos::new(0, strata_chunk::generate_align(h), 0);
    let batch: GeneratedChunk = g.generate(origin).unwrap();
    let top = batch.get_world(5, h, 9).unwrap();
    assert!(!top.is_air());
    if let Some(above) = batch.get_world(5, h + 1, 9) {
        assert!(above.is_air());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // Two generators built from the same settings agree block for block.
    #[test]
    fn generation_is_deterministic(seed in any::<i32>(), bx in -4i32..4, by in -4i32..4, bz in -4i32..4) {
        let settings = GenSettings::new(seed, WorldGenConfig::default());
        let origin = BlockPos::new(bx * GENERATE_SIZE, by * GENERATE_SIZE, bz * GENERATE_SIZE);
        let a = make_generator(&settings).generate(origin).unwrap();
        let b = make_generator(&settings).generate(origin).unwrap();
        prop_assert_eq!(a.blocks, b.blocks);
    }
}
