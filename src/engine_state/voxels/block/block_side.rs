//! # Block Side Module
//!
//! This module defines the six faces of a voxel block, the neighbour each face looks at,
//! and the corner layout used to build a face quad.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant corresponds to a specific face and is assigned a unique integer value
/// used to index per-face arrays (`Block::faces`, texture row tables).
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Index of this side into per-face arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offset from a block to the neighbour this face looks at.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// The face of the neighbouring block that touches this one.
    ///
    /// When a block appears next to another, the neighbour's `side.opposite()` face
    /// becomes hidden.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// Corners of this face on the unit cube, counter-clockwise when seen from outside.
    ///
    /// The first two corners lie on the bottom edge of the texture, the last two on the
    /// top edge.
    pub fn corners(self) -> [[u8; 3]; 4] {
        match self {
            BlockSide::FRONT => [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
            BlockSide::BACK => [[1, 0, 0], [0, 0, 0], [0, 1, 0], [1, 1, 0]],
            BlockSide::BOTTOM => [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
            BlockSide::TOP => [[0, 1, 1], [1, 1, 1], [1, 1, 0], [0, 1, 0]],
            BlockSide::LEFT => [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
            BlockSide::RIGHT => [[1, 0, 1], [1, 0, 0], [1, 1, 0], [1, 1, 1]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(c: [u8; 3]) -> Vector3<i32> {
        Vector3::new(c[0] as i32, c[1] as i32, c[2] as i32)
    }

    #[test]
    fn opposite_sides_point_back_at_each_other() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.offset() + side.opposite().offset(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn corners_wind_counter_clockwise_around_the_outward_normal() {
        for side in BlockSide::all() {
            let c = side.corners();
            let edge_a = corner(c[1]) - corner(c[0]);
            let edge_b = corner(c[3]) - corner(c[0]);
            assert_eq!(
                edge_a.cross(edge_b),
                side.offset(),
                "winding of {:?} does not face outward",
                side
            );
        }
    }
}
