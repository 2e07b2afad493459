use proptest::prelude::*;
use serde::Deserialize;
use strata_blocks::{Block, BlockKind, MAX_LIGHT};

fn arb_kind() -> impl Strategy<Value = BlockKind> {
    (0..BlockKind::ALL.len()).prop_map(|i| BlockKind::ALL[i])
}

#[derive(Deserialize)]
struct Palette {
    top: BlockKind,
    filler: BlockKind,
}

#[test]
fn kinds_deserialize_from_snake_case_names() {
    let p: Palette = toml::from_str(
        r#"
        top = "grass"
        filler = "redstone_block"
    "#,
    )
    .unwrap();
    assert_eq!(p.top, BlockKind::Grass);
    assert_eq!(p.filler, BlockKind::RedstoneBlock);
}

#[test]
fn ids_are_dense_and_ordered() {
    for (i, k) in BlockKind::ALL.iter().enumerate() {
        assert_eq!(k.id() as usize, i);
    }
    assert_eq!(BlockKind::from_id(BlockKind::ALL.len() as u8), None);
}

proptest! {
    #[test]
    fn id_roundtrips(kind in arb_kind()) {
        prop_assert_eq!(BlockKind::from_id(kind.id()), Some(kind));
    }

    // Opaque blocks never keep sky light after taking over another block's lighting.
    #[test]
    fn opaque_blocks_shed_sky_light(kind in arb_kind(), sky in 0u8..=MAX_LIGHT, blk in 0u8..=MAX_LIGHT) {
        let mut old = Block::AIR;
        old.sky_light = sky;
        old.block_light = blk;
        let mut b = Block::new(kind);
        b.copy_lighting_from(&old);
        if kind.is_opaque() {
            prop_assert_eq!(b.sky_light, 0);
            prop_assert_eq!(b.block_light, b.light_emission());
        } else {
            prop_assert_eq!(b.sky_light, sky);
        }
        prop_assert!(b.is_valid());
    }

    // Every metadata value the kind accepts survives validation, the next one up does not.
    #[test]
    fn meta_bounds(kind in arb_kind()) {
        prop_assume!(kind != BlockKind::Piston);
        prop_assert!(kind.meta_is_valid(kind.max_meta()));
        prop_assert!(!kind.meta_is_valid(kind.max_meta().saturating_add(1)) || kind.max_meta() == u8::MAX);
    }

    // Solid implies not replaceable.
    #[test]
    fn solid_is_not_replaceable(kind in arb_kind()) {
        if kind.is_solid() {
            prop_assert!(!kind.is_replaceable());
        }
    }
}
