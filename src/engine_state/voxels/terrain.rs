//! # Terrain Module
//!
//! Scalar density fields that decide which world coordinates hold blocks when the window
//! streams new cells in. A coordinate is solid when its density is greater than zero.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use super::block::block_type::BlockType;
use crate::config::{TerrainConfig, TerrainKind};

/// Builds the density field selected by `config`.
pub fn terrain_from_config(config: &TerrainConfig) -> Box<dyn TerrainField> {
    match config.kind {
        TerrainKind::Perlin => Box::new(PerlinTerrain::new(config)),
        TerrainKind::Flat => Box::new(FlatTerrain {
            surface: config.flat_surface,
        }),
    }
}

/// A deterministic density field over block coordinates.
pub trait TerrainField {
    /// Density at `world`; the coordinate is solid when this is greater than zero.
    fn sample(&self, world: Point3<i32>) -> f64;

    /// Type of the block generated at a solid coordinate.
    fn block_type_at(&self, _world: Point3<i32>, _density: f64) -> BlockType {
        BlockType::GRASS
    }

    /// The block generated at `world`, `None` for empty coordinates.
    fn generate(&self, world: Point3<i32>) -> Option<BlockType> {
        let density = self.sample(world);
        (density > 0.0).then(|| self.block_type_at(world, density))
    }
}

/// 3D Perlin noise biased by height, so the field forms ground below `ground_level` and air
/// above it.
pub struct PerlinTerrain {
    perlin: Perlin,
    frequency: f64,
    ground_level: f64,
    vertical_falloff: f64,
    stone_depth: f64,
}

impl PerlinTerrain {
    /// Creates the field described by `config`.
    pub fn new(config: &TerrainConfig) -> Self {
        PerlinTerrain {
            perlin: Perlin::new(config.seed),
            frequency: config.frequency,
            ground_level: config.ground_level,
            vertical_falloff: config.vertical_falloff,
            stone_depth: config.stone_depth,
        }
    }

    /// Converts block coordinates to noise space.
    fn to_perlin_pos(&self, world: Point3<i32>) -> [f64; 3] {
        [
            world.x as f64 * self.frequency,
            world.y as f64 * self.frequency,
            world.z as f64 * self.frequency,
        ]
    }
}

impl TerrainField for PerlinTerrain {
    fn sample(&self, world: Point3<i32>) -> f64 {
        let noise = self.perlin.get(self.to_perlin_pos(world));
        noise - (world.y as f64 - self.ground_level) * self.vertical_falloff
    }

    fn block_type_at(&self, world: Point3<i32>, density: f64) -> BlockType {
        if density > self.stone_depth {
            BlockType::STONE
        } else if self.sample(world + cgmath::Vector3::unit_y()) > 0.0 {
            BlockType::DIRT
        } else {
            BlockType::GRASS
        }
    }
}

/// A field that is solid exactly at and below a fixed height.
pub struct FlatTerrain {
    /// Highest solid y coordinate
    pub surface: i32,
}

impl TerrainField for FlatTerrain {
    fn sample(&self, world: Point3<i32>) -> f64 {
        if world.y <= self.surface {
            1.0
        } else {
            -1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perlin_terrain_is_deterministic() {
        let config = TerrainConfig::default();
        let a = PerlinTerrain::new(&config);
        let b = PerlinTerrain::new(&config);
        for x in -20..20 {
            let world = Point3::new(x, 7, x * 3 - 5);
            assert_eq!(a.sample(world), b.sample(world));
        }
    }

    #[test]
    fn perlin_terrain_is_solid_deep_down_and_empty_high_up() {
        let terrain = PerlinTerrain::new(&TerrainConfig::default());
        for x in -10..10 {
            for z in -10..10 {
                assert!(terrain.generate(Point3::new(x, -40, z)).is_some());
                assert!(terrain.generate(Point3::new(x, 80, z)).is_none());
            }
        }
    }

    #[test]
    fn flat_terrain_surface_is_grass() {
        let terrain = FlatTerrain { surface: 3 };
        assert_eq!(terrain.generate(Point3::new(0, 3, 0)), Some(BlockType::GRASS));
        assert_eq!(terrain.generate(Point3::new(0, 4, 0)), None);
    }
}
