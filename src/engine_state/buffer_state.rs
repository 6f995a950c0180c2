//! # Buffer State Module
//!
//! Named registry for the GPU buffers of the engine: the block vertex buffer the face slots
//! index into, the placement indicator buffer and the camera uniform.
//!
//! ## Key Features
//!
//! * Buffers are created once and looked up by a static name
//! * Writes are bounds checked against the allocated size
//! * Per-buffer analytics (allocated bytes, highest written byte, write count) feed the
//!   debug stats
//!
//! ## Performance Considerations
//!
//! Face writes arrive already coalesced into contiguous runs, so the analytics also show
//! how many `write_buffer` calls a frame actually issues.

use std::collections::HashMap;

use bytemuck::NoUninit;
use wgpu::{util::DeviceExt, Buffer, Device, Queue};

use crate::core::{StResource, StSystem};

/// Analytics data for a GPU buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    pub allocated_memory: u64,
    /// Highest byte ever written, exclusive
    pub used_memory: u64,
    /// Number of times the buffer has been written to
    pub times_written: u64,
}

impl BufferAnalytics {
    fn allocated(size: u64) -> Self {
        Self {
            allocated_memory: size,
            ..Default::default()
        }
    }

    /// Records a write of `len` bytes at `offset`.
    ///
    /// # Panics
    /// Panics if the write would exceed the allocated size.
    fn record_write(&mut self, buffer_name: &str, offset: u64, len: u64) {
        if offset + len > self.allocated_memory {
            panic!(
                "Buffer write out of bounds for buffer name '{}': {} bytes at offset {} exceed {}",
                buffer_name, len, offset, self.allocated_memory
            );
        }
        self.used_memory = self.used_memory.max(offset + len);
        self.times_written += 1;
    }
}

/// Central manager for GPU buffers in the voxel engine
///
/// # Examples
///
/// ```ignore
/// let mut buffer_state = BufferState::new(device, queue);
///
/// buffer_state.create_buffer(
///     BLOCK_VERTEX_BUFFER_NAME,
///     wgpu::BufferDescriptor {
///         label: Some(BLOCK_VERTEX_BUFFER_NAME),
///         size: vertex_bytes,
///         usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
///         mapped_at_creation: false,
///     },
/// );
///
/// buffer_state.write_slice(BLOCK_VERTEX_BUFFER_NAME, 0, &quad);
/// ```
pub struct BufferState {
    /// Reference to the GPU device
    pub device: StSystem<Device>,
    /// Reference to the GPU command queue
    pub queue: StSystem<Queue>,
    /// Map of buffer names to buffer objects
    buffers: HashMap<&'static str, Buffer>,
    /// Analytics data for each buffer
    buffer_analytics: StResource<HashMap<&'static str, BufferAnalytics>>,
}

impl BufferState {
    /// Creates a buffer registry with no buffers.
    pub fn new(device: StSystem<Device>, queue: StSystem<Queue>) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            buffer_analytics: StResource::new(HashMap::new()),
        }
    }

    /// Creates a zero-initialised buffer under `buffer_name`.
    pub fn create_buffer(
        &mut self,
        buffer_name: &'static str,
        buffer_descriptor: wgpu::BufferDescriptor,
    ) {
        let buffer = self.device.get().create_buffer(&buffer_descriptor);

        self.buffers.insert(buffer_name, buffer);
        self.buffer_analytics
            .get_mut()
            .insert(buffer_name, BufferAnalytics::allocated(buffer_descriptor.size));
    }

    /// Creates a buffer under `buffer_name` holding `init_descriptor.contents`.
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &'static str,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) {
        let size = init_descriptor.contents.len() as u64;
        let buffer = self.device.get().create_buffer_init(&init_descriptor);

        let mut analytics = BufferAnalytics::allocated(size);
        analytics.record_write(buffer_name, 0, size);

        self.buffers.insert(buffer_name, buffer);
        self.buffer_analytics
            .get_mut()
            .insert(buffer_name, analytics);
    }

    /// Writes raw bytes to a buffer at a byte offset.
    ///
    /// # Panics
    ///
    /// Panics if the buffer does not exist or if the write would exceed buffer bounds
    pub fn write_buffer(&self, buffer_name: &'static str, offset: wgpu::BufferAddress, data: &[u8]) {
        let buffer = self.get_buffer(buffer_name);
        {
            let mut analytics = self.buffer_analytics.get_mut();
            let Some(buffer_analytics) = analytics.get_mut(buffer_name) else {
                panic!("No analytics for buffer '{}'", buffer_name);
            };
            buffer_analytics.record_write(buffer_name, offset, data.len() as u64);
        }

        self.queue.get().write_buffer(buffer, offset, data);
    }

    /// Writes a slice of plain-old-data values to a buffer at a byte offset.
    pub fn write_slice<T: NoUninit>(
        &self,
        buffer_name: &'static str,
        offset: wgpu::BufferAddress,
        data: &[T],
    ) {
        self.write_buffer(buffer_name, offset, bytemuck::cast_slice(data));
    }

    /// Gets a reference to a buffer by name
    ///
    /// # Panics
    ///
    /// Panics if the buffer does not exist
    pub fn get_buffer(&self, buffer_name: &'static str) -> &Buffer {
        match self.buffers.get(buffer_name) {
            Some(buffer) => buffer,
            None => panic!("No buffer named '{}'", buffer_name),
        }
    }

    /// Gets a binding resource for the entire buffer
    pub fn get_entire_binding(&self, buffer_name: &'static str) -> wgpu::BindingResource {
        self.get_buffer(buffer_name).as_entire_binding()
    }

    /// Analytics of a single buffer, if it exists.
    pub fn get_analytics(&self, buffer_name: &'static str) -> Option<BufferAnalytics> {
        self.buffer_analytics.get().get(buffer_name).copied()
    }

    /// Gets the total allocated memory across all buffers in bytes
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .get()
            .values()
            .map(|analytics| analytics.allocated_memory)
            .sum()
    }

    /// Gets the total used memory across all buffers in bytes
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffer_analytics
            .get()
            .values()
            .map(|analytics| analytics.used_memory)
            .sum()
    }
}
