//! Fixed-step ray marching against the block grid.

use cgmath::{InnerSpace, Point3, Vector3};

use super::grid::VoxelGrid;

/// First solid block along a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Coordinate of the block that was hit
    pub cell: Point3<i32>,
    /// Sample position one step before the hit, in block space
    pub pre_hit: Point3<f32>,
}

impl RayHit {
    /// The block coordinate containing the pre-hit sample, where a new block would go.
    pub fn placement_cell(&self) -> Point3<i32> {
        block_containing(self.pre_hit)
    }
}

/// Block coordinate that contains a block-space position.
pub fn block_containing(position: Point3<f32>) -> Point3<i32> {
    Point3::new(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    )
}

/// Marches from `origin` along `direction` and returns the first existing in-window block.
///
/// Positions are in block space (one unit per block). Sample `i` sits at
/// `origin + direction * step_size * i` for `i` in `0..floor(reach / step_size)`, so thin
/// corners between samples can be missed. Blocks outside the window are never hit.
///
/// # Arguments
/// * `grid` - The blocks to test against
/// * `origin` - Start of the ray
/// * `direction` - Unit direction of the ray
/// * `reach` - Maximum marched distance
/// * `step_size` - Distance between samples, must be positive
pub fn march(
    grid: &VoxelGrid,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    reach: f32,
    step_size: f32,
) -> Option<RayHit> {
    debug_assert!(step_size > 0.0, "ray step size must be positive");
    let steps = (reach / step_size).floor() as usize;
    let sample_at = |i: f32| origin + direction * (step_size * i);

    (0..steps).find_map(|i| {
        let cell = block_containing(sample_at(i as f32));
        grid.exists(cell).then(|| RayHit {
            cell,
            pre_hit: sample_at(i as f32 - 1.0),
        })
    })
}

/// Block picking with fixed reach and sampling precision.
#[derive(Copy, Clone, Debug)]
pub struct RayPicker {
    /// Maximum distance of a pick, in blocks
    pub reach: f32,
    /// Distance between samples, in blocks
    pub step_size: f32,
}

impl RayPicker {
    /// Picks along the view ray of a viewer at world-space `eye`.
    ///
    /// `eye` is divided by `block_size` to move into block space; `look` does not need to be
    /// normalised.
    pub fn pick(
        &self,
        grid: &VoxelGrid,
        eye: Point3<f32>,
        look: Vector3<f32>,
        block_size: f32,
    ) -> Option<RayHit> {
        let origin = Point3::new(eye.x / block_size, eye.y / block_size, eye.z / block_size);
        march(grid, origin, look.normalize(), self.reach, self.step_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType,
        world::VoxelWorld,
        MemoryFaceBuffer,
    };

    fn world_with_block_at_origin() -> VoxelWorld {
        let mut world = VoxelWorld::new(Vector3::new(16, 16, 16), Point3::new(-8, -8, -8), 0.1);
        let mut sink = MemoryFaceBuffer::for_world(&world);
        world.place(Point3::new(0, 0, 0), BlockType::GRASS, &mut sink);
        world
    }

    #[test]
    fn ray_hits_the_block_in_front_of_the_viewer() {
        let world = world_with_block_at_origin();
        let hit = march(
            world.grid(),
            Point3::new(0.0, 0.0, -5.0),
            Vector3::unit_z(),
            8.0,
            0.1,
        )
        .expect("block straight ahead is hit");

        assert_eq!(hit.cell, Point3::new(0, 0, 0));
        assert!(hit.pre_hit.z < 0.0, "pre-hit must lie before the block");
        assert!(hit.pre_hit.z >= -0.1 - 1e-4, "pre-hit is exactly one step short");
        assert_eq!(hit.placement_cell(), Point3::new(0, 0, -1));
    }

    #[test]
    fn empty_grid_is_never_hit() {
        let world = VoxelWorld::new(Vector3::new(16, 16, 16), Point3::new(-8, -8, -8), 0.1);
        for direction in [
            Vector3::unit_x(),
            -Vector3::unit_y(),
            Vector3::new(1.0, 1.0, 1.0).normalize(),
        ] {
            assert_eq!(march(world.grid(), Point3::new(0.5, 0.5, 0.5), direction, 8.0, 0.1), None);
        }
    }

    #[test]
    fn blocks_beyond_reach_are_not_hit() {
        let world = world_with_block_at_origin();
        let hit = march(world.grid(), Point3::new(0.5, 0.5, -7.0), Vector3::unit_z(), 5.0, 0.1);
        assert_eq!(hit, None);
    }

    #[test]
    fn blocks_outside_the_window_are_ignored() {
        let mut world = VoxelWorld::new(Vector3::new(16, 16, 16), Point3::new(-8, -8, -8), 0.1);
        let mut sink = MemoryFaceBuffer::for_world(&world);
        world.place(Point3::new(-8, 0, 0), BlockType::STONE, &mut sink);

        // x = 8 shares its storage with x = -8 but lies outside the window
        let beyond = march(world.grid(), Point3::new(8.5, 0.5, -3.0), Vector3::unit_z(), 8.0, 0.1);
        assert_eq!(beyond, None);

        let inside = march(world.grid(), Point3::new(-6.5, 0.5, -3.0), Vector3::unit_z(), 8.0, 0.1);
        assert_eq!(inside, None, "neighbouring column is empty");
        let aligned = march(world.grid(), Point3::new(-5.5, 0.5, 0.5), -Vector3::unit_x(), 8.0, 0.1);
        assert_eq!(aligned.map(|hit| hit.cell), Some(Point3::new(-8, 0, 0)));
    }

    #[test]
    fn picker_converts_world_space_to_block_space() {
        let world = world_with_block_at_origin();
        let picker = RayPicker {
            reach: 8.0,
            step_size: 0.1,
        };
        // 0.05 world units is half a block at block size 0.1
        let hit = picker
            .pick(world.grid(), Point3::new(0.05, 0.05, 0.5), -Vector3::unit_z() * 3.0, 0.1)
            .expect("block behind the viewer along -z is hit");
        assert_eq!(hit.cell, Point3::new(0, 0, 0));
        assert_eq!(hit.placement_cell(), Point3::new(0, 0, 1));
    }
}
