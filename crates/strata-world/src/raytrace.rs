use strata_blocks::{BlockKind, Face};
use strata_chunk::{BlockPos, ChunkOrigin, EntityId, in_vertical_range};
use strata_geom::Vec3;

use crate::world::World;

/// Direction components smaller than this are nudged to it so every axis has a finite step.
pub const RAY_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaterMode {
    Solid,
    PassThrough,
    /// Passes through water only when the ray starts inside water.
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RayHit {
    Block {
        pos: BlockPos,
        hit_point: Vec3,
        face: Face,
        distance: f32,
    },
    Entity {
        id: EntityId,
        distance: f32,
    },
    Nothing,
    /// The ray reached a cell that is not generated yet.
    Unloaded,
}

/// One cell crossed by a [`VoxelWalk`]. `distance` is where the ray enters the cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkStep {
    pub cell: BlockPos,
    pub entered_through: Option<Face>,
    pub distance: f32,
}

/// Cells crossed by a ray, in order, starting with the cell holding the origin.
/// The walk never ends on its own; callers stop it by distance.
#[derive(Clone, Debug)]
pub struct VoxelWalk {
    origin: Vec3,
    dir: Vec3,
    cell: [i32; 3],
    step: [i32; 3],
    t_max: [f32; 3],
    t_delta: [f32; 3],
    last: f32,
    started: bool,
}

#[inline]
fn nudge(v: f32) -> f32 {
    if v.abs() < RAY_EPSILON {
        if v.is_sign_negative() { -RAY_EPSILON } else { RAY_EPSILON }
    } else {
        v
    }
}

impl VoxelWalk {
    /// `dir` need not be normalized but must be finite and non-zero.
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        let dir = Vec3::new(nudge(dir.x), nudge(dir.y), nudge(dir.z)).normalized();
        let (cx, cy, cz) = origin.floor_i32();
        let cell = [cx, cy, cz];
        let mut step = [0; 3];
        let mut t_max = [0.0; 3];
        let mut t_delta = [0.0; 3];
        for axis in 0..3 {
            let d = dir.axis(axis);
            let o = origin.axis(axis);
            let inv = 1.0 / d.abs();
            t_delta[axis] = inv;
            if d > 0.0 {
                step[axis] = 1;
                t_max[axis] = ((cell[axis] + 1) as f32 - o) * inv;
            } else {
                step[axis] = -1;
                t_max[axis] = (o - cell[axis] as f32) * inv;
            }
        }
        Self {
            origin,
            dir,
            cell,
            step,
            t_max,
            t_delta,
            last: 0.0,
            started: false,
        }
    }

    /// Normalized direction the walk follows.
    #[inline]
    pub fn dir(&self) -> Vec3 {
        self.dir
    }

    /// Point where the ray enters `step.cell`. The coordinate of the crossed axis is set to
    /// the exact cell boundary; the others are interpolated along the ray.
    pub fn entry_point(&self, step: &WalkStep) -> Vec3 {
        let p = self.origin + self.dir * step.distance;
        let Some(face) = step.entered_through else {
            return p;
        };
        let c = step.cell;
        let mut coords = [p.x, p.y, p.z];
        let cell = [c.x, c.y, c.z];
        let axis = face.axis();
        // entering through the negative face means the boundary is the cell's low side
        let low = face.offset().0 + face.offset().1 + face.offset().2 < 0;
        coords[axis] = if low {
            cell[axis] as f32
        } else {
            (cell[axis] + 1) as f32
        };
        Vec3::new(coords[0], coords[1], coords[2])
    }
}

impl Iterator for VoxelWalk {
    type Item = WalkStep;

    fn next(&mut self) -> Option<WalkStep> {
        if !self.started {
            self.started = true;
            return Some(WalkStep {
                cell: BlockPos::new(self.cell[0], self.cell[1], self.cell[2]),
                entered_through: None,
                distance: 0.0,
            });
        }
        let axis = if self.t_max[0] < self.t_max[1] {
            if self.t_max[0] < self.t_max[2] { 0 } else { 2 }
        } else if self.t_max[1] < self.t_max[2] {
            1
        } else {
            2
        };
        // a ray through an edge or corner crosses several boundaries at the same distance;
        // later crossings are reported one ulp further so distances strictly increase
        let distance = if self.t_max[axis] > self.last {
            self.t_max[axis]
        } else {
            f32::from_bits(self.last.to_bits() + 1)
        };
        self.last = distance;
        self.cell[axis] = self.cell[axis].wrapping_add(self.step[axis]);
        self.t_max[axis] += self.t_delta[axis];
        Some(WalkStep {
            cell: BlockPos::new(self.cell[0], self.cell[1], self.cell[2]),
            entered_through: Some(Face::entered_by_step(axis, self.step[axis])),
            distance,
        })
    }
}

/// Face of the cell a ray starting inside it is considered to hit: the one facing back
/// along the dominant direction axis.
fn facing_back(dir: Vec3) -> Face {
    let (ax, ay, az) = (dir.x.abs(), dir.y.abs(), dir.z.abs());
    let (axis, positive) = if ax >= ay && ax >= az {
        (0, dir.x > 0.0)
    } else if ay >= az {
        (1, dir.y > 0.0)
    } else {
        (2, dir.z > 0.0)
    };
    Face::entered_by_step(axis, if positive { 1 } else { -1 })
}

impl World {
    /// First block or entity along the ray within `max_distance`.
    ///
    /// With `before_hit` the result is the last empty cell crossed before the hit block,
    /// reported with the face it shares with the hit block.
    pub fn pointed_at_block(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        before_hit: bool,
        water: WaterMode,
    ) -> RayHit {
        if !origin.is_finite() || !dir.is_finite() || dir.length_sq() == 0.0 {
            return RayHit::Nothing;
        }
        let (ox, oy, oz) = origin.floor_i32();
        let pass_water = match water {
            WaterMode::Solid => false,
            WaterMode::PassThrough => true,
            WaterMode::Auto => self
                .get_block_eval(ox, oy, oz)
                .is_some_and(|b| b.is(BlockKind::Water)),
        };

        let walk = VoxelWalk::new(origin, dir);
        let unit = walk.dir();
        let mut max_d = max_distance;
        let mut best_entity: Option<(EntityId, f32)> = None;
        let mut last_chunk: Option<ChunkOrigin> = None;
        let mut prev: Option<WalkStep> = None;
        let entity_hit = |best: Option<(EntityId, f32)>| match best {
            Some((id, distance)) => RayHit::Entity { id, distance },
            None => RayHit::Nothing,
        };

        for step in walk.clone() {
            if step.distance > max_d {
                break;
            }
            let c = step.cell;
            let chunk = c.chunk_origin();
            if last_chunk != Some(chunk) {
                last_chunk = Some(chunk);
                for (id, e) in self.entities().in_chunk(self.store(), chunk) {
                    if let Some(d) = e.ray_hit_distance(origin, unit) {
                        if d <= max_d {
                            max_d = d;
                            best_entity = Some((id, d));
                        }
                    }
                }
                if step.distance > max_d {
                    break;
                }
            }
            if !in_vertical_range(c.y) {
                prev = Some(step);
                continue;
            }
            let Some(b) = self.get_block_eval(c.x, c.y, c.z) else {
                return match best_entity {
                    Some(_) => entity_hit(best_entity),
                    None => RayHit::Unloaded,
                };
            };
            let empty = b.is_air() || b.is(BlockKind::Fire) || (pass_water && b.is(BlockKind::Water));
            if empty {
                prev = Some(step);
                continue;
            }
            let face = step.entered_through.unwrap_or_else(|| facing_back(unit));
            if before_hit {
                if let Some(p) = prev {
                    return RayHit::Block {
                        pos: p.cell,
                        hit_point: walk.entry_point(&step),
                        face: face.opposite(),
                        distance: step.distance,
                    };
                }
            }
            return RayHit::Block {
                pos: c,
                hit_point: walk.entry_point(&step),
                face,
                distance: step.distance,
            };
        }
        entity_hit(best_entity)
    }

    pub fn pointed_at_block_from_camera(
        &self,
        camera: &Camera,
        max_distance: f32,
        before_hit: bool,
        water: WaterMode,
    ) -> RayHit {
        self.pointed_at_block(camera.position, camera.forward, max_distance, before_hit, water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_starts_in_origin_cell() {
        let mut w = VoxelWalk::new(Vec3::new(0.5, 0.5, 10.5), Vec3::new(0.0, 0.0, -1.0));
        let first = w.next().unwrap();
        assert_eq!(first.cell, BlockPos::new(0, 0, 10));
        assert_eq!(first.entered_through, None);
        let second = w.next().unwrap();
        assert_eq!(second.cell, BlockPos::new(0, 0, 9));
        assert_eq!(second.entered_through, Some(Face::PosZ));
        assert!((second.distance - 0.5).abs() < 1e-5);
    }

    #[test]
    fn entry_point_snaps_crossed_axis() {
        let w = VoxelWalk::new(Vec3::new(0.25, 0.5, 0.5), Vec3::new(1.0, 0.3, 0.0));
        let step = w.clone().nth(1).unwrap();
        assert_eq!(step.cell, BlockPos::new(1, 0, 0));
        let p = w.entry_point(&step);
        assert_eq!(p.x, 1.0);
        assert!(p.y > 0.5 && p.y < 1.0);
    }

    #[test]
    fn corner_crossings_keep_distance_increasing() {
        let steps: Vec<WalkStep> = VoxelWalk::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 0.0))
            .take(5)
            .collect();
        assert_eq!(steps[1].cell, BlockPos::new(0, 1, 0));
        assert_eq!(steps[2].cell, BlockPos::new(1, 1, 0));
        assert!((steps[1].distance - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        assert!((steps[2].distance - steps[1].distance).abs() < 1e-5);
        assert!(steps.windows(2).all(|w| w[1].distance > w[0].distance));
    }

    #[test]
    fn degenerate_direction_still_walks() {
        let mut w = VoxelWalk::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.0, 1.0, 0.0));
        let s = w.nth(3).unwrap();
        assert_eq!(s.cell, BlockPos::new(0, 3, 0));
        assert!(s.distance.is_finite());
    }
}
