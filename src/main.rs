//! # Voxel Window Entry Point
//!
//! Calls into the library's `run()` function to load the configuration and start the engine.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_window::run();
}
