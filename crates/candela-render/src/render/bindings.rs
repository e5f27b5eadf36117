//! Bind groups over resources this core does not own (scene uniforms) and
//! over the G-buffer it does own.
//!
//! Both are derived state: the scene bind group goes stale when a
//! collaborator reallocates a referenced buffer, the G-buffer bind group
//! when the attachments are reallocated on resize. Each exposes a `rebuild`
//! for exactly that event.

use crate::camera::Camera;
use crate::lights::LightSet;

use super::gbuffer::GBuffer;

/// Per-frame scene data visible to both raster passes: camera uniforms
/// (vertex + fragment), light set and cluster indices (resolve fragment
/// stage; the geometry pass only writes surface attributes and ignores
/// them).
pub struct SceneBindings {
    layout: wgpu::BindGroupLayout,
    group: wgpu::BindGroup,
}

impl SceneBindings {
    pub fn new(device: &wgpu::Device, camera: &Camera, lights: &LightSet) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("candela scene bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let group = create_group(device, &layout, camera, lights);

        Self { layout, group }
    }

    /// Rebinds after a collaborator reallocated one of the referenced
    /// buffers (e.g. light-set growth). The layout is unchanged, so the
    /// pipelines stay valid.
    pub fn rebuild(&mut self, device: &wgpu::Device, camera: &Camera, lights: &LightSet) {
        self.group = create_group(device, &self.layout, camera, lights);
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn group(&self) -> &wgpu::BindGroup {
        &self.group
    }
}

fn create_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera: &Camera,
    lights: &LightSet,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("candela scene bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera.buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: lights.light_buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: lights.cluster_buffer().as_entire_binding(),
            },
        ],
    })
}

/// G-buffer attachments exposed as sampled inputs to the resolve pass.
///
/// Position and normal hold raw non-color data and are declared
/// unfilterable; the resolve shader reads them with `textureLoad`, so no
/// sampler is bound at all.
pub struct GBufferBindings {
    layout: wgpu::BindGroupLayout,
    group: wgpu::BindGroup,
}

impl GBufferBindings {
    pub fn new(device: &wgpu::Device, gbuffer: &GBuffer) -> Self {
        let texture_entry = |binding: u32, filterable: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("candela gbuffer bgl"),
            entries: &[
                texture_entry(0, false), // position
                texture_entry(1, false), // normal
                texture_entry(2, true),  // albedo
            ],
        });

        let group = create_gbuffer_group(device, &layout, gbuffer);

        Self { layout, group }
    }

    /// Rebinds after the G-buffer was reallocated (resize).
    pub fn rebuild(&mut self, device: &wgpu::Device, gbuffer: &GBuffer) {
        self.group = create_gbuffer_group(device, &self.layout, gbuffer);
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn group(&self) -> &wgpu::BindGroup {
        &self.group
    }
}

fn create_gbuffer_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    gbuffer: &GBuffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("candela gbuffer bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&gbuffer.position_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&gbuffer.normal_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&gbuffer.albedo_view),
            },
        ],
    })
}
