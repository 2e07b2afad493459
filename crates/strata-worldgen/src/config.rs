use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct WorldGenConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub water: Water,
    #[serde(default)]
    pub trees: Trees,
    #[serde(default)]
    pub caves: Caves,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Flat,
}

fn default_mode() -> Mode {
    Mode::Normal
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Flat {
    #[serde(default = "default_flat_thickness")]
    pub thickness: i32,
}
fn default_flat_thickness() -> i32 {
    4
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            thickness: default_flat_thickness(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Height {
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "default_min_y")]
    pub min_y: i32,
    #[serde(default = "default_max_y")]
    pub max_y: i32,
}
fn default_height_freq() -> f32 {
    0.01
}
fn default_min_y() -> i32 {
    -8
}
fn default_max_y() -> i32 {
    48
}
impl Default for Height {
    fn default() -> Self {
        Self {
            frequency: default_height_freq(),
            min_y: default_min_y(),
            max_y: default_max_y(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Surface {
    #[serde(default = "default_topsoil")]
    pub topsoil_thickness: i32,
    #[serde(default = "default_climate_freq")]
    pub climate_frequency: f32,
    #[serde(default = "default_desert_threshold")]
    pub desert_threshold: f32,
    #[serde(default = "default_mountain_y")]
    pub mountain_y: i32,
}
fn default_topsoil() -> i32 {
    3
}
fn default_climate_freq() -> f32 {
    0.004
}
fn default_desert_threshold() -> f32 {
    0.45
}
fn default_mountain_y() -> i32 {
    36
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            topsoil_thickness: default_topsoil(),
            climate_frequency: default_climate_freq(),
            desert_threshold: default_desert_threshold(),
            mountain_y: default_mountain_y(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Water {
    #[serde(default = "default_water_enable")]
    pub enable: bool,
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
}
fn default_water_enable() -> bool {
    true
}
fn default_sea_level() -> i32 {
    4
}
impl Default for Water {
    fn default() -> Self {
        Self {
            enable: default_water_enable(),
            sea_level: default_sea_level(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Trees {
    #[serde(default = "default_tree_probability")]
    pub probability: f32,
    #[serde(default = "default_trunk_min")]
    pub trunk_min: i32,
    #[serde(default = "default_trunk_max")]
    pub trunk_max: i32,
    #[serde(default = "default_leaf_radius")]
    pub leaf_radius: i32,
}
fn default_tree_probability() -> f32 {
    0.01
}
fn default_trunk_min() -> i32 {
    4
}
fn default_trunk_max() -> i32 {
    5
}
fn default_leaf_radius() -> i32 {
    2
}
impl Default for Trees {
    fn default() -> Self {
        Self {
            probability: default_tree_probability(),
            trunk_min: default_trunk_min(),
            trunk_max: default_trunk_max(),
            leaf_radius: default_leaf_radius(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Caves {
    #[serde(default = "default_caves_enable")]
    pub enable: bool,
    #[serde(default = "default_cave_freq")]
    pub frequency: f32,
    #[serde(default = "default_cave_threshold")]
    pub threshold: f32,
}
fn default_caves_enable() -> bool {
    true
}
fn default_cave_freq() -> f32 {
    0.05
}
fn default_cave_threshold() -> f32 {
    0.6
}
impl Default for Caves {
    fn default() -> Self {
        Self {
            enable: default_caves_enable(),
            frequency: default_cave_freq(),
            threshold: default_cave_threshold(),
        }
    }
}

/// Flattened, validated view of a `WorldGenConfig` that generators read from.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldGenParams {
    pub mode: Mode,
    pub flat_thickness: i32,
    pub height_frequency: f32,
    pub min_y: i32,
    pub max_y: i32,
    pub topsoil_thickness: i32,
    pub climate_frequency: f32,
    pub desert_threshold: f32,
    pub mountain_y: i32,
    pub water_enable: bool,
    pub sea_level: i32,
    pub tree_probability: f32,
    pub trunk_min: i32,
    pub trunk_max: i32,
    pub leaf_radius: i32,
    pub caves_enable: bool,
    pub cave_frequency: f32,
    pub cave_threshold: f32,
}

impl Default for WorldGenParams {
    fn default() -> Self {
        Self::from_config(&WorldGenConfig::default())
    }
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        let min_y = cfg.height.min_y.min(cfg.height.max_y);
        let max_y = cfg.height.max_y.max(cfg.height.min_y);
        let trunk_min = cfg.trees.trunk_min.max(1);
        Self {
            mode: cfg.mode,
            flat_thickness: cfg.flat.thickness.max(1),
            height_frequency: cfg.height.frequency,
            min_y,
            max_y,
            topsoil_thickness: cfg.surface.topsoil_thickness.max(1),
            climate_frequency: cfg.surface.climate_frequency,
            desert_threshold: cfg.surface.desert_threshold,
            mountain_y: cfg.surface.mountain_y,
            water_enable: cfg.water.enable,
            sea_level: cfg.water.sea_level,
            tree_probability: cfg.trees.probability.clamp(0.0, 1.0),
            trunk_min,
            trunk_max: cfg.trees.trunk_max.max(trunk_min),
            leaf_radius: cfg.trees.leaf_radius.clamp(0, 4),
            caves_enable: cfg.caves.enable,
            cave_frequency: cfg.caves.frequency,
            cave_threshold: cfg.caves.threshold,
        }
    }
}

pub fn load_params_from_path(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldGenConfig = toml::from_str(&s)?;
    Ok(cfg)
}

/// Everything a worker needs to build its private generator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenSettings {
    pub seed: i32,
    pub config: WorldGenConfig,
}

impl GenSettings {
    pub fn new(seed: i32, config: WorldGenConfig) -> Self {
        Self { seed, config }
    }

    pub fn params(&self) -> WorldGenParams {
        WorldGenParams::from_config(&self.config)
    }

    pub fn config_to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(&self.config)
    }

    pub fn config_from_toml(s: &str) -> Result<WorldGenConfig, toml::de::Error> {
        toml::from_str(s)
    }
}
