//! # Configuration
//!
//! Startup settings of the engine, read from a JSON file. Every field has a default, so a
//! config file only needs to name the values it changes:
//!
//! ```json
//! { "world": { "render_distance": 64 }, "picking": { "reach": 5.0 } }
//! ```

use std::{
    fs::File,
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::MAX_FACE_SLOTS;

/// Config file used when `VOXEL_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "assets/config.json";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "VOXEL_CONFIG";

/// Failure to read or accept a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for `EngineConfig`.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The file parsed but holds values the engine cannot run with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Window creation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial inner width in physical pixels
    pub width: u32,
    /// Initial inner height in physical pixels
    pub height: u32,
    /// Window title
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 1920,
            height: 1080,
            title: "Voxel Window".to_string(),
        }
    }
}

/// Size of the streamed block window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal extent of the window in blocks (x and z)
    pub render_distance: i32,
    /// Vertical extent of the window in blocks
    pub world_height: i32,
    /// Edge length of one block in world units
    pub block_size: f32,
}

impl WorldConfig {
    /// Face slots needed for every cell of the window to be an isolated block.
    pub fn face_capacity(&self) -> u64 {
        let horizontal = self.render_distance.max(0) as u64;
        horizontal * horizontal * self.world_height.max(0) as u64 * 6
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            render_distance: 48,
            world_height: 32,
            block_size: 0.1,
        }
    }
}

/// Block picking settings. Distances are measured in blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Maximum distance of a picked block
    pub reach: f32,
    /// Distance between two ray samples
    pub ray_step: f32,
    /// Opacity of the placement indicator block
    pub indicator_opacity: f32,
    /// Half-height of the crosshair in normalized device coordinates
    pub crosshair_size: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        PickingConfig {
            reach: 8.0,
            ray_step: 0.1,
            indicator_opacity: 0.6,
            crosshair_size: 0.03,
        }
    }
}

/// First-person camera settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view
    pub fov_degrees: f32,
    /// Movement speed in world units per second
    pub speed: f32,
    /// Degrees of rotation per pixel of mouse movement
    pub mouse_sensitivity: f32,
    /// Near clipping plane
    pub znear: f32,
    /// Far clipping plane
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            fov_degrees: 90.0,
            speed: 1.2,
            mouse_sensitivity: 0.1,
            znear: 0.01,
            zfar: 1000.0,
        }
    }
}

/// Which density field generates the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    /// Height-biased 3D Perlin noise
    #[default]
    Perlin,
    /// Solid up to `flat_surface`, empty above
    Flat,
}

/// Parameters of the terrain density field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Generator selection
    pub kind: TerrainKind,
    /// Highest solid y coordinate of the flat generator
    pub flat_surface: i32,
    /// Noise seed
    pub seed: u32,
    /// Noise frequency per block
    pub frequency: f64,
    /// Height at which the density bias is zero
    pub ground_level: f64,
    /// Density removed per block above `ground_level` (added below it)
    pub vertical_falloff: f64,
    /// Depth below the surface density at which blocks turn to stone
    pub stone_depth: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            kind: TerrainKind::Perlin,
            flat_surface: 8,
            seed: 0,
            frequency: 0.05,
            ground_level: 12.0,
            vertical_falloff: 0.08,
            stone_depth: 0.4,
        }
    }
}

/// Locations of files loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// WGSL source of the block pipeline
    pub block_shader: PathBuf,
    /// Vertical strip texture atlas
    pub atlas: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        AssetConfig {
            block_shader: PathBuf::from("assets/shaders/block.wgsl"),
            atlas: PathBuf::from("assets/textures/atlas.png"),
        }
    }
}

/// Every setting the engine reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window creation
    pub window: WindowConfig,
    /// Block window dimensions
    pub world: WorldConfig,
    /// Ray picking
    pub picking: PickingConfig,
    /// Camera and movement
    pub camera: CameraConfig,
    /// Terrain generation
    pub terrain: TerrainConfig,
    /// Asset paths
    pub assets: AssetConfig,
}

impl EngineConfig {
    /// Path of the config file: `VOXEL_CONFIG` if set, `assets/config.json` otherwise.
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Reads and validates the config file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: EngineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::Io(error)) if error.kind() == ErrorKind::NotFound => {
                info!(
                    "No config file at {}, using defaults",
                    path.as_ref().display()
                );
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Parses and validates a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.render_distance <= 0 || world.world_height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "window extent must be positive, got {}x{}",
                world.render_distance, world.world_height
            )));
        }
        if world.face_capacity() > MAX_FACE_SLOTS as u64 {
            return Err(ConfigError::Invalid(format!(
                "a {}x{}x{} window needs {} face slots, more than the limit of {}",
                world.render_distance,
                world.world_height,
                world.render_distance,
                world.face_capacity(),
                MAX_FACE_SLOTS
            )));
        }
        if !(world.block_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "block_size must be positive, got {}",
                world.block_size
            )));
        }

        let picking = &self.picking;
        if !(picking.ray_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ray_step must be positive, got {}",
                picking.ray_step
            )));
        }
        if !(picking.reach >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "reach must not be negative, got {}",
                picking.reach
            )));
        }
        if !(0.0..=1.0).contains(&picking.indicator_opacity) {
            return Err(ConfigError::Invalid(format!(
                "indicator_opacity must be within [0, 1], got {}",
                picking.indicator_opacity
            )));
        }

        if !(0.0..=1.0).contains(&picking.crosshair_size) {
            return Err(ConfigError::Invalid(format!(
                "crosshair_size must be within [0, 1], got {}",
                picking.crosshair_size
            )));
        }

        let camera = &self.camera;
        if !(camera.znear > 0.0 && camera.zfar > camera.znear) {
            return Err(ConfigError::Invalid(format!(
                "clipping planes must satisfy 0 < znear < zfar, got {} and {}",
                camera.znear, camera.zfar
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.picking.reach, 8.0);
        assert_eq!(config.picking.ray_step, 0.1);
        assert_eq!(config.world.block_size, 0.1);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = EngineConfig::from_json(r#"{ "world": { "render_distance": 16 } }"#)
            .expect("partial config parses");
        assert_eq!(config.world.render_distance, 16);
        assert_eq!(config.world.world_height, WorldConfig::default().world_height);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn non_positive_ray_step_is_rejected() {
        let result = EngineConfig::from_json(r#"{ "picking": { "ray_step": 0.0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn negative_crosshair_size_is_rejected() {
        let result = EngineConfig::from_json(r#"{ "picking": { "crosshair_size": -0.1 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_extent_is_rejected() {
        let result = EngineConfig::from_json(r#"{ "world": { "world_height": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn window_beyond_the_slot_limit_is_rejected() {
        let result = EngineConfig::from_json(
            r#"{ "world": { "render_distance": 20000, "world_height": 64 } }"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn face_capacity_counts_six_faces_per_cell() {
        let world = WorldConfig {
            render_distance: 4,
            world_height: 3,
            block_size: 1.0,
        };
        assert_eq!(world.face_capacity(), 4 * 4 * 3 * 6);
    }

    #[test]
    fn terrain_kind_is_lowercase() {
        let config = EngineConfig::from_json(r#"{ "terrain": { "kind": "flat", "flat_surface": 2 } }"#)
            .expect("terrain config parses");
        assert_eq!(config.terrain.kind, TerrainKind::Flat);
        assert_eq!(config.terrain.flat_surface, 2);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = EngineConfig::from_json(r#"{ "world": "#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = EngineConfig::from_json(include_str!("../assets/config.json"))
            .expect("shipped config parses");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("voxel-window-config-that-does-not-exist.json");
        let config = EngineConfig::load_or_default(&path).expect("defaults");
        assert_eq!(config, EngineConfig::default());
    }
}
