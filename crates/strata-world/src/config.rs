use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use strata_eval::EvalTiming;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Simulation tuning. Every section and field falls back to its default when absent.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct WorldConfig {
    #[serde(default)]
    pub ticks: Ticks,
    #[serde(default)]
    pub day: Day,
    #[serde(default)]
    pub generation: Generation,
    #[serde(default)]
    pub effects: Effects,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Ticks {
    #[serde(default = "default_general_period")]
    pub general_period: f32,
    #[serde(default = "default_redstone_period")]
    pub redstone_period: f32,
    #[serde(default = "default_lighting_max_passes")]
    pub lighting_max_passes: u32,
    #[serde(default = "default_dust_max_passes")]
    pub redstone_dust_max_passes: u32,
    #[serde(default = "default_redstone_first_max_passes")]
    pub redstone_first_max_passes: u32,
    #[serde(default = "default_random_updates")]
    pub random_updates_per_tick: u32,
}

fn default_general_period() -> f32 {
    0.25
}
fn default_redstone_period() -> f32 {
    0.1
}
fn default_lighting_max_passes() -> u32 {
    100
}
fn default_dust_max_passes() -> u32 {
    16
}
fn default_redstone_first_max_passes() -> u32 {
    64
}
fn default_random_updates() -> u32 {
    32
}

impl Default for Ticks {
    fn default() -> Self {
        Self {
            general_period: default_general_period(),
            redstone_period: default_redstone_period(),
            lighting_max_passes: default_lighting_max_passes(),
            redstone_dust_max_passes: default_dust_max_passes(),
            redstone_first_max_passes: default_redstone_first_max_passes(),
            random_updates_per_tick: default_random_updates(),
        }
    }
}

impl Ticks {
    pub fn timing(&self) -> EvalTiming {
        EvalTiming {
            general_period: self.general_period,
            redstone_period: self.redstone_period,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Day {
    /// Seconds for a full day/night cycle.
    #[serde(default = "default_day_length")]
    pub length: f32,
    #[serde(default)]
    pub start_time: f32,
}

fn default_day_length() -> f32 {
    600.0
}

impl Default for Day {
    fn default() -> Self {
        Self {
            length: default_day_length(),
            start_time: 0.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Generation {
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Blocks around the camera the visibility scan requests batches for.
    #[serde(default = "default_radius")]
    pub radius: i32,
}

fn default_workers() -> usize {
    strata_runtime::DEFAULT_WORKERS
}
fn default_radius() -> i32 {
    48
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            radius: default_radius(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Effects {
    /// Particles per second an emitting block spawns on average.
    #[serde(default = "default_particle_rate")]
    pub particle_rate: f32,
    #[serde(default = "default_tnt_fuse")]
    pub tnt_fuse: f32,
    #[serde(default = "default_tnt_strength")]
    pub tnt_strength: f32,
    /// Chance that a random update on a sapling queues tree growth.
    #[serde(default = "default_sapling_chance")]
    pub sapling_growth_chance: f32,
    /// Chance that a block destroyed by an explosion drops an item.
    #[serde(default = "default_explosion_drop_chance")]
    pub explosion_drop_chance: f32,
}

fn default_particle_rate() -> f32 {
    2.0
}
fn default_tnt_fuse() -> f32 {
    4.0
}
fn default_tnt_strength() -> f32 {
    4.0
}
fn default_sapling_chance() -> f32 {
    0.125
}
fn default_explosion_drop_chance() -> f32 {
    0.3
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            particle_rate: default_particle_rate(),
            tnt_fuse: default_tnt_fuse(),
            tnt_strength: default_tnt_strength(),
            sapling_growth_chance: default_sapling_chance(),
            explosion_drop_chance: default_explosion_drop_chance(),
        }
    }
}

pub fn load_world_config_from_path(path: &Path) -> Result<WorldConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: WorldConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, WorldConfig::default());
        assert_eq!(cfg.ticks.lighting_max_passes, 100);
        assert_eq!(cfg.generation.workers, 5);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: WorldConfig = toml::from_str(
            r#"
            [ticks]
            redstone_period = 0.05
            [generation]
            radius = 16
        "#,
        )
        .unwrap();
        assert_eq!(cfg.ticks.redstone_period, 0.05);
        assert_eq!(cfg.ticks.general_period, 0.25);
        assert_eq!(cfg.generation.radius, 16);
        assert_eq!(cfg.day.length, 600.0);
    }
}
