//! Toroidal addressing of the grid window.
//!
//! The grid stores a fixed `extent` of cells per axis. A world coordinate maps to the cell
//! at `world.rem_euclid(extent)` on each axis, so a coordinate keeps its cell while the
//! window slides. Only coordinates with `0 <= world - offset < extent` are inside the
//! window; the storage of any other coordinate belongs to a different world position.

use cgmath::{Point3, Vector3};

/// Result of mapping a world coordinate onto the grid storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Linear index into the grid storage
    pub index: usize,
    /// Whether the coordinate lies inside the current window
    pub in_window: bool,
}

/// Maps world coordinates to grid cells for a window of fixed extent at a movable offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WindowAddressing {
    extent: Vector3<i32>,
    offset: Point3<i32>,
}

impl WindowAddressing {
    /// Creates addressing for a window of `extent` cells whose origin is `offset`.
    ///
    /// # Panics
    /// Panics if any extent component is not positive.
    pub fn new(extent: Vector3<i32>, offset: Point3<i32>) -> Self {
        assert!(
            extent.x > 0 && extent.y > 0 && extent.z > 0,
            "window extent must be positive on every axis, got {:?}",
            extent
        );
        WindowAddressing { extent, offset }
    }

    /// Number of cells per axis.
    pub fn extent(&self) -> Vector3<i32> {
        self.extent
    }

    /// World coordinate of the window's lowest corner.
    pub fn offset(&self) -> Point3<i32> {
        self.offset
    }

    /// Total number of cells in the window.
    pub fn cell_count(&self) -> usize {
        self.extent.x as usize * self.extent.y as usize * self.extent.z as usize
    }

    /// Moves the window origin by `delta`.
    pub fn translate(&mut self, delta: Vector3<i32>) {
        self.offset += delta;
    }

    /// Whether `world` lies inside the current window.
    pub fn in_window(&self, world: Point3<i32>) -> bool {
        let relative = world - self.offset;
        (0..self.extent.x).contains(&relative.x)
            && (0..self.extent.y).contains(&relative.y)
            && (0..self.extent.z).contains(&relative.z)
    }

    /// Maps a world coordinate to its storage cell.
    ///
    /// The index is defined for every coordinate. It may only be dereferenced when
    /// `in_window` is set.
    pub fn to_cell(&self, world: Point3<i32>) -> Cell {
        let ix = world.x.rem_euclid(self.extent.x) as usize;
        let iy = world.y.rem_euclid(self.extent.y) as usize;
        let iz = world.z.rem_euclid(self.extent.z) as usize;
        let index = (ix * self.extent.y as usize + iy) * self.extent.z as usize + iz;

        Cell {
            index,
            in_window: self.in_window(world),
        }
    }

    /// Storage index of an in-window coordinate, `None` outside the window.
    pub fn index_of(&self, world: Point3<i32>) -> Option<usize> {
        let cell = self.to_cell(world);
        cell.in_window.then_some(cell.index)
    }

    /// The world coordinate currently stored at `index`.
    ///
    /// Inverse of `to_cell` for in-window coordinates.
    pub fn world_of_cell(&self, index: usize) -> Point3<i32> {
        let ez = self.extent.z as usize;
        let ey = self.extent.y as usize;
        let storage = Vector3::new(
            (index / (ey * ez)) as i32,
            ((index / ez) % ey) as i32,
            (index % ez) as i32,
        );

        Point3::new(
            self.unwrap_axis(storage.x, self.offset.x, self.extent.x),
            self.unwrap_axis(storage.y, self.offset.y, self.extent.y),
            self.unwrap_axis(storage.z, self.offset.z, self.extent.z),
        )
    }

    fn unwrap_axis(&self, storage: i32, offset: i32, extent: i32) -> i32 {
        offset + (storage - offset).rem_euclid(extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(offset: Point3<i32>) -> WindowAddressing {
        WindowAddressing::new(Vector3::new(8, 4, 8), offset)
    }

    #[test]
    fn negative_coordinates_wrap_with_euclidean_modulo() {
        let addressing = window(Point3::new(-8, 0, -8));
        let cell = addressing.to_cell(Point3::new(-1, 0, -1));
        assert!(cell.in_window);
        // -1 mod 8 == 7 on both horizontal axes
        assert_eq!(cell.index, (7 * 4) * 8 + 7);
        // -8 shares its storage with 0
        assert_eq!(
            addressing.to_cell(Point3::new(-8, 0, 0)).index,
            addressing.to_cell(Point3::new(0, 0, 0)).index
        );
    }

    #[test]
    fn window_bounds_are_half_open() {
        let addressing = window(Point3::new(2, 0, 2));
        assert!(addressing.in_window(Point3::new(2, 0, 2)));
        assert!(addressing.in_window(Point3::new(9, 3, 9)));
        assert!(!addressing.in_window(Point3::new(10, 0, 2)));
        assert!(!addressing.in_window(Point3::new(1, 0, 2)));
        assert!(!addressing.in_window(Point3::new(2, 4, 2)));
        assert!(!addressing.in_window(Point3::new(2, -1, 2)));
        assert_eq!(addressing.index_of(Point3::new(10, 0, 2)), None);
    }

    #[test]
    fn in_window_coordinates_map_to_distinct_cells() {
        let addressing = window(Point3::new(-3, -1, 5));
        let mut seen = vec![false; addressing.cell_count()];
        for x in -3..5 {
            for y in -1..3 {
                for z in 5..13 {
                    let index = addressing
                        .index_of(Point3::new(x, y, z))
                        .expect("coordinate inside the window");
                    assert!(!seen[index], "two coordinates share cell {}", index);
                    seen[index] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn cell_index_is_stable_while_the_window_slides() {
        let world = Point3::new(5, 2, -3);
        let mut addressing = window(Point3::new(0, 0, -6));
        let index = addressing.to_cell(world).index;

        for delta in [
            Vector3::new(1, 0, 0),
            Vector3::new(-3, 0, 2),
            Vector3::new(0, 0, -1),
        ] {
            addressing.translate(delta);
            if addressing.in_window(world) {
                assert_eq!(addressing.to_cell(world).index, index);
            }
        }
    }

    #[test]
    fn world_of_cell_inverts_to_cell() {
        let addressing = window(Point3::new(-5, -2, 11));
        for x in -5..3 {
            for y in -2..2 {
                for z in 11..19 {
                    let world = Point3::new(x, y, z);
                    let index = addressing.to_cell(world).index;
                    assert_eq!(addressing.world_of_cell(index), world);
                }
            }
        }
    }
}
