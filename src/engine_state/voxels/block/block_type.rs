//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all placeable block types.
///
/// The `FromPrimitive` derive allows conversion from integers, which is how the hotbar
/// keys select a type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// A grass block with different textures on top and sides.
    /// The top is green, sides have grass on dirt, and bottom is plain dirt.
    GRASS,

    /// A basic dirt block.
    DIRT,

    /// A stone block, generated below the surface.
    STONE,
}

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the value does not name a block type
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(btype)
    }
}
