//! Manages WebGPU bind groups and their layouts.
//!
//! The block pipeline reads two groups: the camera uniform at group 0 and the atlas
//! texture with its sampler at group 1.

use std::collections::HashMap;

use wgpu::{BindGroup, BindGroupLayout, Device};

use crate::engine_state::{buffer_state::BufferState, camera_state::CAMERA_BUFFER_NAME};

use super::texture::Texture;

/// Name of the camera bind group
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Name of the camera bind group layout
pub const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";
/// Name of the texture bind group
pub const TEXTURE_BIND_GROUP: &str = "texture_bind_group";
/// Name of the texture bind group layout
pub const TEXTURE_BIND_GROUP_LAYOUT: &str = "texture_bind_group_layout";

/// Bind groups and layouts, looked up by name.
pub struct BindGroupState {
    bind_groups: HashMap<&'static str, BindGroup>,
    bind_group_layouts: HashMap<&'static str, BindGroupLayout>,
    /// Keeps the atlas alive for as long as its bind group exists
    _atlas: Texture,
}

impl BindGroupState {
    /// Creates the camera and atlas bind groups.
    ///
    /// The camera buffer must already exist in `buffer_state`.
    pub fn new(device: &Device, buffer_state: &BufferState, atlas: Texture) -> Self {
        let mut bind_groups = HashMap::new();
        let mut bind_group_layouts = HashMap::new();

        let (camera_bind_group, camera_bind_group_layout) =
            Self::generate_camera_bindgroups(device, buffer_state);
        bind_groups.insert(CAMERA_BIND_GROUP, camera_bind_group);
        bind_group_layouts.insert(CAMERA_BIND_GROUP_LAYOUT, camera_bind_group_layout);

        let (texture_bind_group, texture_bind_group_layout) =
            Self::generate_texture_bindgroups(device, &atlas);
        bind_groups.insert(TEXTURE_BIND_GROUP, texture_bind_group);
        bind_group_layouts.insert(TEXTURE_BIND_GROUP_LAYOUT, texture_bind_group_layout);

        Self {
            bind_groups,
            bind_group_layouts,
            _atlas: atlas,
        }
    }

    /// Retrieves a bind group by name.
    ///
    /// # Panics
    /// Panics if no bind group with the given name exists
    pub fn get_bind_group(&self, name: &'static str) -> &BindGroup {
        match self.bind_groups.get(name) {
            Some(bind_group) => bind_group,
            None => panic!("No bind group named '{}'", name),
        }
    }

    /// Retrieves a bind group layout by name.
    ///
    /// # Panics
    /// Panics if no bind group layout with the given name exists
    pub fn get_bind_group_layout(&self, name: &'static str) -> &BindGroupLayout {
        match self.bind_group_layouts.get(name) {
            Some(layout) => layout,
            None => panic!("No bind group layout named '{}'", name),
        }
    }

    fn generate_camera_bindgroups(
        device: &Device,
        buffer_state: &BufferState,
    ) -> (BindGroup, BindGroupLayout) {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some(CAMERA_BIND_GROUP_LAYOUT),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer_state.get_entire_binding(CAMERA_BUFFER_NAME),
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        (camera_bind_group, camera_bind_group_layout)
    }

    fn generate_texture_bindgroups(device: &Device, atlas: &Texture) -> (BindGroup, BindGroupLayout) {
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some(TEXTURE_BIND_GROUP_LAYOUT),
            });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
            label: Some(TEXTURE_BIND_GROUP),
        });

        (texture_bind_group, texture_bind_group_layout)
    }
}
