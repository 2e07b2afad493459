use proptest::prelude::*;
use strata_geom::{Aabb, Vec3};

fn coord() -> impl Strategy<Value = f32> {
    -100.0f32..100.0
}

fn arb_point() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_dir() -> impl Strategy<Value = Vec3> {
    (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0)
        .prop_filter("non-degenerate", |(x, y, z)| x * x + y * y + z * z > 1e-3)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z).normalized())
}

proptest! {
    // The entry point reported by the slab test lies on (or inside) the box.
    #[test]
    fn ray_entry_point_is_on_box(origin in arb_point(), dir in arb_dir(), cx in -20i32..20, cy in -20i32..20, cz in -20i32..20) {
        let b = Aabb::cell(cx, cy, cz);
        if let Some(t) = b.ray_distance(origin, dir) {
            prop_assert!(t >= 0.0);
            let p = origin + dir * t;
            let grown = Aabb::new(b.min - Vec3::splat(1e-3), b.max + Vec3::splat(1e-3));
            prop_assert!(grown.contains(p));
        }
    }

    // A ray aimed at the box center from outside always hits it.
    #[test]
    fn ray_toward_center_hits(origin in arb_point(), cx in -20i32..20, cy in -20i32..20, cz in -20i32..20) {
        let b = Aabb::cell(cx, cy, cz);
        let to_center = b.center() - origin;
        prop_assume!(to_center.length() > 1e-3);
        let t = b.ray_distance(origin, to_center.normalized());
        prop_assert!(t.is_some());
        prop_assert!(t.unwrap() <= to_center.length() + 1e-3);
    }

    // Intersection is symmetric.
    #[test]
    fn intersects_symmetric(a in arb_point(), b in arb_point(), ha in 0.1f32..5.0, hb in 0.1f32..5.0) {
        let x = Aabb::around(a, Vec3::splat(ha));
        let y = Aabb::around(b, Vec3::splat(hb));
        prop_assert_eq!(x.intersects(&y), y.intersects(&x));
    }
}
