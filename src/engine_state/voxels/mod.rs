//! # Voxel World Core
//!
//! This module contains the block store of the engine: a bounded window of blocks over an
//! unbounded integer lattice, the visible-face bookkeeping that mirrors it into the block
//! vertex buffer, and the queries that run against it.
//!
//! ## Architecture
//!
//! * **Addressing**: toroidal mapping from world coordinates to window cells
//! * **Face slots**: free-list allocation of face quads in the vertex buffer
//! * **Grid**: the block array and existence queries
//! * **Mesh sync**: `place` / `destroy` with incremental face exposure updates
//! * **Streamer**: slides the window and generates new cells from a terrain field
//! * **Picker**: fixed-step ray marching for block selection
//!
//! ## Data Flow
//!
//! 1. Input or streaming requests a block edit on the `VoxelWorld`
//! 2. The world updates the grid and acquires or releases face slots
//! 3. Changed face quads go to a `FaceSink`, normally the GPU block buffer
//! 4. The renderer draws `[0, high_water_mark * 6)` vertices of that buffer
//!
//! Everything here runs on the frame thread; no call blocks.

pub mod addressing;
pub mod block;
pub mod face_slots;
pub mod grid;
pub mod mesh_sync;
pub mod picker;
pub mod streamer;
pub mod terrain;
pub mod world;

#[cfg(test)]
mod test_support;
#[cfg(test)]
pub(crate) use test_support::{assert_consistent, MemoryFaceBuffer};
