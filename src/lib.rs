#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Window
//!
//! A first-person voxel sandbox over a fixed-size window of blocks that slides with the
//! viewer, built with Rust and WGPU.
//!
//! Every visible block face owns one slot of a single vertex buffer. Placing, destroying
//! and streaming blocks rewrite only the slots whose visibility changed; nothing is ever
//! re-meshed as a whole.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, GPU bring-up, input and the event loop handler
//! * `config` - Startup settings loaded from JSON
//! * `core` - Shared single-threaded handles
//! * `engine_state` - The block window, face slots, streaming, picking and rendering
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_window::run();
//! }
//! ```
//!
//! The config file is read from `VOXEL_CONFIG`, or `assets/config.json` when unset.
//! Logging follows `RUST_LOG`.

use application_state::{
    graphics_resources_builder::{Graphics, GraphicsBuilder, MaybeGraphics},
    ApplicationState,
};
use config::EngineConfig;
use log::{error, info};
use winit::event_loop::EventLoop;

mod application_state;
mod config;
mod core;
mod engine_state;

/// Loads the configuration, opens the window and runs the event loop until exit.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config_path = EngineConfig::path_from_env();
    let config = match EngineConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid config {}: {}", config_path.display(), err);
            return;
        }
    };

    let event_loop = match EventLoop::<Graphics>::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Could not create the event loop: {}", err);
            return;
        }
    };

    let builder = GraphicsBuilder::new(event_loop.create_proxy(), config.clone());
    let mut state = ApplicationState::new(MaybeGraphics::Builder(builder), config);

    if let Err(err) = event_loop.run_app(&mut state) {
        error!("Event loop terminated with an error: {}", err);
    }
}
