//! The simulated world: block mutation and invalidation, the tick loop, block behaviors,
//! ray picking, entities, explosions and persistence.
#![forbid(unsafe_code)]

mod behavior;
pub mod config;
pub mod entities;
pub mod entity;
pub mod explosion;
pub mod persist;
pub mod raytrace;
mod world;

pub use config::{ConfigError, WorldConfig, load_world_config_from_path};
pub use entities::{EntitiesInBox, EntityIndex};
pub use entity::{Entity, EntityKind, ParticleKind};
pub use persist::{LoadError, SaveError};
pub use raytrace::{Camera, RAY_EPSILON, RayHit, VoxelWalk, WalkStep, WaterMode};
pub use world::World;

pub use strata_chunk::{BlockPos, EntityId};
