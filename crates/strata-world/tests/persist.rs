use strata_blocks::{Block, BlockKind};
use strata_chunk::BlockPos;
use strata_eval::QueueKind;
use strata_geom::Vec3;
use strata_world::{Entity, LoadError, World, WorldConfig};
use strata_worldgen::{GenSettings, Mode, WorldGenConfig};

fn world(seed: i32) -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut cfg = WorldConfig::default();
    cfg.generation.workers = 1;
    cfg.ticks.random_updates_per_tick = 0;
    World::new(cfg, GenSettings::new(seed, WorldGenConfig::default())).unwrap()
}

/// A small world with blocks, entities and pending work in every kind of queue.
fn busy_world() -> World {
    let mut w = world(11);
    for z in -3..=3 {
        for x in -3..=3 {
            w.set_generated_block(x, 0, z, Block::new(BlockKind::Stone));
            for y in 1..=8 {
                w.set_generated_block(x, y, z, Block::AIR);
            }
        }
    }
    w.set_block(0, 1, 0, Block::lever(true));
    w.set_block(1, 1, 0, Block::dust(0));
    w.set_block(-2, 1, -2, Block::new(BlockKind::Torch));
    w.set_block(2, 1, 2, Block::new(BlockKind::Sapling));
    w.queue_tree_growth(BlockPos::new(2, 1, 2));
    w.add_timed_invalidate(1, 1, 1, 2.5);
    w.insert_entity(Entity::item(
        Vec3::new(0.5, 2.5, 0.5),
        Block::new(BlockKind::Dirt),
        Vec3::new(0.0, 1.0, 0.0),
    ));
    w.insert_entity(Entity::primed_tnt(Vec3::new(-1.5, 1.5, 1.5), 3.0));
    w.insert_entity(Entity::transfer(
        Vec3::new(-2.5, 1.5, -0.5),
        Block::new(BlockKind::Cobblestone),
        BlockPos::new(-3, 1, 3),
    ));
    w.set_time_of_day(0.3);
    w
}

#[test]
fn roundtrip_reproduces_the_same_bytes() {
    let w = busy_world();
    let bytes = w.to_bytes().unwrap();

    let mut other = world(99);
    other.load_bytes(&bytes).unwrap();
    assert_eq!(other.seed(), 11);
    assert_eq!(other.time_of_day(), w.time_of_day());
    assert_eq!(other.entities().len(), 3);
    assert_eq!(other.timed_invalidates().len(), 1);
    for kind in QueueKind::ALL {
        assert_eq!(
            other.eval().queue(kind).len(),
            w.eval().queue(kind).len(),
            "{kind:?}"
        );
    }
    let lever = other.get_block_eval(0, 1, 0).unwrap();
    assert_eq!(*lever, Block::lever(true));
    let orig = w.get_block_eval(1, 1, 0).unwrap();
    let back = other.get_block_eval(1, 1, 0).unwrap();
    assert_eq!(
        (back.sky_light, back.block_light),
        (orig.sky_light, orig.block_light)
    );
    other.entities().check_consistency(other.store()).unwrap();
    assert_eq!(other.to_bytes().unwrap(), bytes);
}

#[test]
fn loaded_world_keeps_simulating() {
    let w = busy_world();
    let bytes = w.to_bytes().unwrap();
    let mut other = world(1);
    other.load_bytes(&bytes).unwrap();
    for _ in 0..4 {
        other.step(0.25);
    }
    assert_eq!(other.get_block_eval(1, 1, 0).unwrap().dust_power(), 15);
    assert_eq!(other.get_block_eval(2, 4, 2).unwrap().kind, BlockKind::Wood);
}

#[test]
fn corrupt_saves_leave_the_world_alone() {
    let bytes = busy_world().to_bytes().unwrap();
    let mut target = world(5);
    target.set_generated_block(9, 9, 9, Block::new(BlockKind::Glass));
    let before = target.to_bytes().unwrap();

    let mut flipped = bytes.clone();
    let i = flipped.len() - 5;
    flipped[i] ^= 0x40;
    assert!(matches!(
        target.load_bytes(&flipped),
        Err(LoadError::ChecksumMismatch { .. })
    ));

    let mut magic = bytes.clone();
    magic[0] = b'X';
    assert!(matches!(target.load_bytes(&magic), Err(LoadError::BadMagic)));

    let mut version = bytes.clone();
    version[4..8].copy_from_slice(&2u32.to_le_bytes());
    assert!(matches!(
        target.load_bytes(&version),
        Err(LoadError::UnsupportedVersion(2))
    ));

    assert!(target.load_bytes(&bytes[..bytes.len() - 1]).is_err());
    assert!(target.load_bytes(&bytes[..6]).is_err());

    assert_eq!(target.to_bytes().unwrap(), before);
}

#[test]
fn valid_checksum_with_bad_content_is_rejected() {
    let mut bytes = busy_world().to_bytes().unwrap();
    let text_len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
    let at = 16 + text_len;
    bytes[at..at + 4].copy_from_slice(&2.0f32.to_le_bytes());
    let end = bytes.len() - 4;
    let crc = crc32fast::hash(&bytes[8..end]);
    bytes[end..].copy_from_slice(&crc.to_le_bytes());

    let mut target = world(5);
    match target.load_bytes(&bytes) {
        Err(LoadError::Corrupt(msg)) => assert!(msg.contains("time of day")),
        other => panic!("unexpected {other:?}"),
    }
    assert!(target.store().is_empty());
}

/// Recomputes the trailing checksum after a test edits the payload.
fn reseal(bytes: &mut [u8]) {
    let end = bytes.len() - 4;
    let crc = crc32fast::hash(&bytes[8..end]);
    bytes[end..].copy_from_slice(&crc.to_le_bytes());
}

/// Byte offset of the first chunk record.
fn first_chunk_at(bytes: &[u8]) -> usize {
    let text_len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
    // time of day, rng seed and chunk count follow the settings text
    16 + text_len + 4 + 8 + 4
}

/// One generated stone cell at the origin and an item resting above it.
fn single_cell_world() -> World {
    let mut w = world(3);
    w.set_generated_block(0, 0, 0, Block::new(BlockKind::Stone));
    w.insert_entity(Entity::item(
        Vec3::new(0.5, 1.5, 0.5),
        Block::new(BlockKind::Dirt),
        Vec3::ZERO,
    ));
    w
}

#[test]
fn generated_flags_without_blocks_are_rejected() {
    let mut bytes = single_cell_world().to_bytes().unwrap();
    let flags_at = first_chunk_at(&bytes) + 12;
    assert_eq!(bytes[flags_at], 1);
    bytes[flags_at] = 0xFF;
    reseal(&mut bytes);

    let mut target = busy_world();
    let before = target.to_bytes().unwrap();
    match target.load_bytes(&bytes) {
        Err(LoadError::Corrupt(msg)) => assert!(msg.contains("no blocks"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(target.to_bytes().unwrap(), before);
}

#[test]
fn entities_below_the_band_are_rejected() {
    let mut bytes = single_cell_world().to_bytes().unwrap();
    // one chunk record: origin, flags, slot mask and a single four-byte block
    let entity_at = first_chunk_at(&bytes) + 12 + 1 + 8 + 4 + 4;
    let y_at = entity_at + 1 + 4;
    assert_eq!(f32::from_le_bytes(bytes[y_at..y_at + 4].try_into().unwrap()), 1.5);
    bytes[y_at..y_at + 4].copy_from_slice(&(-80.0f32).to_le_bytes());
    reseal(&mut bytes);

    let mut target = world(5);
    match target.load_bytes(&bytes) {
        Err(LoadError::Corrupt(msg)) => assert!(msg.contains("band"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(target.store().is_empty());
    assert!(target.entities().is_empty());
}

#[test]
fn single_cell_world_round_trips() {
    let w = single_cell_world();
    let bytes = w.to_bytes().unwrap();
    let mut back = world(5);
    back.load_bytes(&bytes).unwrap();
    assert_eq!(back.get_block_eval(0, 0, 0).map(|b| b.kind), Some(BlockKind::Stone));
    assert!(back.get_block_eval(1, 1, 1).is_none());
    assert!(back.store().is_generated(1, 1, 1));
    assert_eq!(back.entities().len(), 1);
}

#[test]
fn generator_settings_travel_with_the_save() {
    let mut cfg = WorldGenConfig::default();
    cfg.mode = Mode::Flat;
    cfg.flat.thickness = 6;
    let mut wc = WorldConfig::default();
    wc.generation.workers = 1;
    let w = World::new(wc, GenSettings::new(21, cfg.clone())).unwrap();
    let bytes = w.to_bytes().unwrap();

    let mut other = world(3);
    other.load_bytes(&bytes).unwrap();
    assert_eq!(other.settings().config, cfg);
    assert_eq!(other.seed(), 21);
}

#[test]
fn save_and_load_through_a_file() {
    let w = busy_world();
    let path = std::env::temp_dir().join(format!("strata-world-{}.sav", std::process::id()));
    w.save(&path).unwrap();
    let mut other = world(2);
    other.load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(other.to_bytes().unwrap(), w.to_bytes().unwrap());

    let missing = path.with_extension("missing");
    assert!(matches!(other.load(&missing), Err(LoadError::Io(_))));
}
