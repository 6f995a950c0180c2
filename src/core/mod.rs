//! # Core Module
//!
//! Shared-ownership containers for the single-threaded frame loop.
//!
//! ## Key Components
//! - `StSystem`: shared, mutably borrowable handle to a GPU-side system (device, queue,
//!   buffer registry)
//! - `StResource`: shared value behind a read-write lock, used for bookkeeping that is
//!   updated through `&self`
//!
//! Nothing in here is `Send`; the engine never hands these across threads.

pub mod st_resource;
pub mod st_system;

pub use st_resource::StResource;
pub use st_system::StSystem;
