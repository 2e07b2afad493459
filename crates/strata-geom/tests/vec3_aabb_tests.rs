use strata_geom::{Aabb, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_constants() {
    assert!(vec3_approx_eq(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(Vec3::UP, Vec3::new(0.0, 1.0, 0.0), 1e-6));
}

#[test]
fn vec3_add_sub_neg() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));
    assert!(vec3_approx_eq(c - a, b, 1e-6));
    assert!(vec3_approx_eq(-a, Vec3::new(-1.0, -2.0, -3.0), 1e-6));
}

#[test]
fn vec3_floor_handles_negatives() {
    assert_eq!(Vec3::new(-0.5, 0.5, -1.0).floor_i32(), (-1, 0, -1));
    assert_eq!(Vec3::new(3.99, -3.01, 0.0).floor_i32(), (3, -4, 0));
}

#[test]
fn aabb_contains_and_intersects() {
    let a = Aabb::cell(0, 0, 0);
    assert!(a.contains(Vec3::new(0.5, 0.5, 0.5)));
    assert!(!a.contains(Vec3::new(1.5, 0.5, 0.5)));
    let b = Aabb::around(Vec3::new(1.2, 0.5, 0.5), Vec3::splat(0.25));
    assert!(a.intersects(&b));
    let c = Aabb::cell(5, 5, 5);
    assert!(!a.intersects(&c));
}

#[test]
fn aabb_ray_distance_front_inside_behind() {
    let b = Aabb::cell(0, 0, 5);
    let d = b
        .ray_distance(Vec3::new(0.5, 0.5, 10.5), Vec3::new(0.0, 0.0, -1.0))
        .unwrap();
    assert!(approx_eq(d, 4.5, 1e-5));

    let inside = b
        .ray_distance(Vec3::new(0.5, 0.5, 5.5), Vec3::new(0.0, 0.0, -1.0))
        .unwrap();
    assert_eq!(inside, 0.0);

    assert!(
        b.ray_distance(Vec3::new(0.5, 0.5, 10.5), Vec3::new(0.0, 0.0, 1.0))
            .is_none()
    );
    assert!(
        b.ray_distance(Vec3::new(3.5, 0.5, 10.5), Vec3::new(0.0, 0.0, -1.0))
            .is_none()
    );
}
