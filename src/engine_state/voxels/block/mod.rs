//! # Block Module
//!
//! This module provides the block record stored in every occupied grid cell, along with
//! block type definitions and block face handling.

use block_side::BlockSide;
use block_type::BlockType;

use super::face_slots::FaceSlot;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in compact form.
pub type BlockTypeSize = u8;

/// Number of texture rows stacked vertically in the block atlas.
pub const ATLAS_ROWS: usize = 4;

/// Maps each block type to the atlas row used for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array contains 6 atlas rows, one for each face in the order:
/// [Front, Back, Bottom, Top, Left, Right]
///
/// Atlas rows: 0 grass side, 1 grass top, 2 dirt, 3 stone.
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[usize; 6]; 3] = [
    [0, 0, 2, 1, 0, 0], // GRASS (top: 1, bottom: 2, sides: 0)
    [2, 2, 2, 2, 2, 2], // DIRT
    [3, 3, 3, 3, 3, 3], // STONE
];

/// An existing block in the grid window.
///
/// Empty cells hold no `Block` at all, so a value of this type always means the cell is
/// occupied. Each face holds the slot its quad is written to while the face is exposed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// The type of this block, selects the atlas rows of its faces.
    pub block_type: BlockType,
    /// Face slots indexed by `BlockSide::index`. `None` means the face is hidden.
    pub faces: [Option<FaceSlot>; 6],
}

impl Block {
    /// Creates a new block of the specified type with every face hidden.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type,
            faces: [None; 6],
        }
    }

    /// The slot currently holding the given face, if the face is exposed.
    pub fn face(&self, side: BlockSide) -> Option<FaceSlot> {
        self.faces[side.index()]
    }

    /// Number of exposed faces.
    pub fn exposed_faces(&self) -> usize {
        self.faces.iter().filter(|face| face.is_some()).count()
    }

    /// Gets the atlas row of one face of a block type.
    pub fn texture_row(block_type: BlockType, side: BlockSide) -> usize {
        BLOCK_TYPE_TO_TEXTURE_INDICES[block_type as usize][side.index()]
    }
}
