use strata_blocks::{Block, BlockKind};
use strata_chunk::{BlockPos, in_vertical_range};
use strata_geom::{Aabb, Vec3};

use crate::world::World;

const GRAVITY: f32 = 20.0;
const TERMINAL_VELOCITY: f32 = 40.0;
/// Seconds a dropped item lies around before it despawns.
pub const ITEM_LIFETIME: f32 = 300.0;
pub const PARTICLE_FRAMES: u8 = 8;
/// Blocks per second an item in transfer travels toward its target cell.
pub const TRANSFER_SPEED: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParticleKind {
    Smoke = 0,
    Flame,
    Redstone,
    LavaDrip,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 4] = [
        ParticleKind::Smoke,
        ParticleKind::Flame,
        ParticleKind::Redstone,
        ParticleKind::LavaDrip,
    ];

    pub fn from_index(i: u8) -> Option<Self> {
        Self::ALL.get(i as usize).copied()
    }

    /// Particle an emitting block gives off.
    pub fn for_block(b: &Block) -> Option<Self> {
        match b.kind {
            BlockKind::Torch => Some(ParticleKind::Smoke),
            BlockKind::Fire => Some(ParticleKind::Flame),
            BlockKind::Lava => Some(ParticleKind::LavaDrip),
            BlockKind::RedstoneTorch if b.is_lit() => Some(ParticleKind::Redstone),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Nothing,
    Item {
        block: Block,
        velocity: Vec3,
        age: f32,
    },
    ThrownBlock {
        block: Block,
        velocity: Vec3,
    },
    Particle {
        kind: ParticleKind,
        velocity: Vec3,
        age: f32,
        lifetime: f32,
        frame: u8,
    },
    FallingBlock {
        block: Block,
        velocity: Vec3,
    },
    PrimedTnt {
        fuse: f32,
        velocity: Vec3,
    },
    PlaceBlockIfReplaceable {
        block: Block,
    },
    RemoveBlockIfEqual {
        block: Block,
    },
    /// An item carried in a straight line to the center of `to`, where it comes to rest.
    TransferItem {
        block: Block,
        to: BlockPos,
    },
    ApplyBoneMealOrPutBackInContainer,
}

/// A positioned entity value. Cloning duplicates it; the index owns the stored copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub pos: Vec3,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(pos: Vec3, kind: EntityKind) -> Self {
        Self { pos, kind }
    }

    pub fn item(pos: Vec3, block: Block, velocity: Vec3) -> Self {
        Self::new(
            pos,
            EntityKind::Item {
                block,
                velocity,
                age: 0.0,
            },
        )
    }

    pub fn falling(pos: Vec3, block: Block) -> Self {
        Self::new(
            pos,
            EntityKind::FallingBlock {
                block,
                velocity: Vec3::ZERO,
            },
        )
    }

    pub fn primed_tnt(pos: Vec3, fuse: f32) -> Self {
        Self::new(
            pos,
            EntityKind::PrimedTnt {
                fuse,
                velocity: Vec3::new(0.0, 2.0, 0.0),
            },
        )
    }

    pub fn transfer(pos: Vec3, block: Block, to: BlockPos) -> Self {
        Self::new(pos, EntityKind::TransferItem { block, to })
    }

    pub fn particle(pos: Vec3, kind: ParticleKind, velocity: Vec3, lifetime: f32) -> Self {
        Self::new(
            pos,
            EntityKind::Particle {
                kind,
                velocity,
                age: 0.0,
                lifetime,
                frame: 0,
            },
        )
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, EntityKind::Nothing)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.kind = EntityKind::Nothing;
    }

    /// True while the entity sits at a finite position inside the vertical band.
    #[inline]
    pub fn in_band(&self) -> bool {
        self.pos.is_finite() && in_vertical_range(self.pos.y.floor() as i32)
    }

    #[inline]
    pub fn cell(&self) -> BlockPos {
        self.pos.floor_i32().into()
    }

    /// Bounding box used for ray picking; `None` for entities that cannot be hit.
    pub fn bounds(&self) -> Option<Aabb> {
        let half = match self.kind {
            EntityKind::Item { .. }
            | EntityKind::ThrownBlock { .. }
            | EntityKind::TransferItem { .. } => 0.125,
            EntityKind::FallingBlock { .. } | EntityKind::PrimedTnt { .. } => 0.5,
            _ => return None,
        };
        Some(Aabb::around(self.pos, Vec3::splat(half)))
    }

    /// Distance along a normalized ray to this entity, if the ray hits it at or after the origin.
    pub fn ray_hit_distance(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        self.bounds()?.ray_distance(origin, dir).filter(|d| *d >= 0.0)
    }

    /// Reacts to a blast of `strength` centered at `center`.
    pub fn explode(&mut self, center: Vec3, strength: f32, rng: &mut fastrand::Rng) {
        let away = self.pos - center;
        let dist = away.length();
        let dir = if dist > 1e-4 { away / dist } else { Vec3::UP };
        let push = dir * (strength * 4.0 / (dist + 1.0));
        match &mut self.kind {
            EntityKind::Item { velocity, .. }
            | EntityKind::ThrownBlock { velocity, .. }
            | EntityKind::FallingBlock { velocity, .. } => *velocity += push,
            EntityKind::PrimedTnt { fuse, velocity } => {
                *fuse = fuse.min(0.25 + rng.f32() * 0.5);
                *velocity += push;
            }
            EntityKind::Particle { .. } => self.kind = EntityKind::Nothing,
            EntityKind::Nothing
            | EntityKind::PlaceBlockIfReplaceable { .. }
            | EntityKind::RemoveBlockIfEqual { .. }
            | EntityKind::TransferItem { .. }
            | EntityKind::ApplyBoneMealOrPutBackInContainer => {}
        }
    }

    /// Advances the entity by `dt` seconds. May read and write world blocks, spawn entities,
    /// or clear the entity to `Nothing`.
    pub fn step(&mut self, world: &mut World, dt: f32) {
        if !self.in_band() {
            self.clear();
            return;
        }
        let pos = self.pos;
        let cell = self.cell();
        match &mut self.kind {
            EntityKind::Nothing => {}
            EntityKind::Item {
                velocity, age, ..
            } => {
                *age += dt;
                if *age >= ITEM_LIFETIME {
                    self.kind = EntityKind::Nothing;
                    return;
                }
                let (p, _) = physics(world, pos, velocity, dt);
                self.pos = p;
            }
            EntityKind::ThrownBlock { block, velocity } => {
                let block = *block;
                let (p, hit) = physics(world, pos, velocity, dt);
                self.pos = p;
                if hit {
                    self.kind = EntityKind::Item {
                        block,
                        velocity: Vec3::ZERO,
                        age: 0.0,
                    };
                }
            }
            EntityKind::Particle {
                velocity,
                age,
                lifetime,
                frame,
                ..
            } => {
                *age += dt;
                if *age >= *lifetime {
                    self.kind = EntityKind::Nothing;
                    return;
                }
                *frame = ((*age / *lifetime) * f32::from(PARTICLE_FRAMES)) as u8;
                self.pos = pos + *velocity * dt;
            }
            EntityKind::FallingBlock { block, velocity } => {
                let block = *block;
                let (p, landed) = physics(world, pos, velocity, dt);
                self.pos = p;
                if landed {
                    let c = self.cell();
                    match world.get_block_eval(c.x, c.y, c.z) {
                        Some(b) if b.is_replaceable() => {
                            world.set_block(c.x, c.y, c.z, block);
                        }
                        _ => {
                            if let Some(drop) = block.dig_result() {
                                world.insert_entity(Entity::item(p, drop, Vec3::ZERO));
                            }
                        }
                    }
                    self.kind = EntityKind::Nothing;
                }
            }
            EntityKind::PrimedTnt { fuse, velocity } => {
                *fuse -= dt;
                if *fuse <= 0.0 {
                    let strength = world.config().effects.tnt_strength;
                    world.add_explosion(pos, strength, false);
                    self.kind = EntityKind::Nothing;
                    return;
                }
                let (p, _) = physics(world, pos, velocity, dt);
                self.pos = p;
            }
            EntityKind::PlaceBlockIfReplaceable { block } => {
                let block = *block;
                match world.get_block_eval(cell.x, cell.y, cell.z) {
                    None => {}
                    Some(b) => {
                        if b.is_replaceable() {
                            world.set_block(cell.x, cell.y, cell.z, block);
                        }
                        self.kind = EntityKind::Nothing;
                    }
                }
            }
            EntityKind::RemoveBlockIfEqual { block } => {
                let block = *block;
                match world.get_block_eval(cell.x, cell.y, cell.z) {
                    None => {}
                    Some(b) => {
                        if *b == block {
                            world.set_block(cell.x, cell.y, cell.z, Block::AIR);
                        }
                        self.kind = EntityKind::Nothing;
                    }
                }
            }
            EntityKind::TransferItem { block, to } => {
                let (block, to) = (*block, *to);
                let rest = EntityKind::Item {
                    block,
                    velocity: Vec3::ZERO,
                    age: 0.0,
                };
                if !in_vertical_range(to.y) {
                    self.kind = rest;
                    return;
                }
                let target = Vec3::cell_center(to.x, to.y, to.z);
                let left = target - pos;
                let dist = left.length();
                let travel = TRANSFER_SPEED * dt;
                if dist > travel {
                    self.pos = pos + left * (travel / dist);
                    return;
                }
                self.pos = target;
                // wait at the target until its cell is generated
                if world.get_block_eval(to.x, to.y, to.z).is_some() {
                    self.kind = rest;
                }
            }
            EntityKind::ApplyBoneMealOrPutBackInContainer => {
                if let Some(b) = world.get_block_eval(cell.x, cell.y, cell.z) {
                    if b.is(BlockKind::Sapling) {
                        world.queue_tree_growth(cell);
                    } else {
                        // the container lives outside the world; the meal just goes back
                        log::trace!("bone meal at {cell:?} had no target");
                    }
                    self.kind = EntityKind::Nothing;
                }
            }
        }
    }
}

/// Moves a point entity under gravity one axis at a time, stopping at solid or ungenerated
/// cells. Returns the new position and whether downward motion was blocked.
fn physics(world: &World, pos: Vec3, velocity: &mut Vec3, dt: f32) -> (Vec3, bool) {
    velocity.y = (velocity.y - GRAVITY * dt).max(-TERMINAL_VELOCITY);
    let mut p = pos;
    let mut landed = false;
    for axis in [1usize, 0, 2] {
        let v = velocity.axis(axis);
        if v == 0.0 {
            continue;
        }
        let mut next = p;
        match axis {
            0 => next.x += v * dt,
            1 => next.y += v * dt,
            _ => next.z += v * dt,
        }
        let (cx, cy, cz) = next.floor_i32();
        let blocked = match world.get_block_eval(cx, cy, cz) {
            Some(b) => b.is_solid(),
            None => true,
        };
        if blocked {
            match axis {
                0 => velocity.x = 0.0,
                1 => {
                    if v < 0.0 {
                        landed = true;
                        // rest on top of the blocking cell
                        p.y = p.y.floor() + 0.5;
                    }
                    velocity.y = 0.0;
                }
                _ => velocity.z = 0.0,
            }
        } else {
            p = next;
        }
    }
    if landed {
        velocity.x *= 0.5;
        velocity.z *= 0.5;
    }
    (p, landed)
}
