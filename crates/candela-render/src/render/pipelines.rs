//! Pipeline construction for the two raster passes.
//!
//! Invariants enforced here by construction:
//! - the geometry pipeline's color targets match the G-buffer formats, in
//!   attachment order
//! - each pipeline's bind-group layouts match, in slot order, the groups
//!   bound during its pass (see the slot constants in `render`)

use crate::scene::{SharedLayouts, Vertex};

use super::gbuffer::{ALBEDO_FORMAT, DEPTH_FORMAT, NORMAL_FORMAT, POSITION_FORMAT};

/// Builds the geometry pipeline: rasterizes scene primitives into the three
/// G-buffer attachments plus depth. Slot order {scene, model, material}.
pub(super) fn geometry_pipeline(
    device: &wgpu::Device,
    scene_layout: &wgpu::BindGroupLayout,
    shared: &SharedLayouts,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("candela geometry shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/geometry.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("candela geometry pipeline layout"),
        bind_group_layouts: &[scene_layout, &shared.model, &shared.material],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("candela geometry pipeline"),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[
                Some(POSITION_FORMAT.into()),
                Some(NORMAL_FORMAT.into()),
                Some(ALBEDO_FORMAT.into()),
            ],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        // Sole depth producer of the frame; the resolve pass has no depth.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}

/// Builds the resolve pipeline: one fullscreen draw sampling the G-buffer
/// and shading against the pixel's light cluster. Slot order
/// {scene, gbuffer}; no vertex buffers, no depth test.
pub(super) fn resolve_pipeline(
    device: &wgpu::Device,
    scene_layout: &wgpu::BindGroupLayout,
    gbuffer_layout: &wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("candela resolve shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/resolve.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("candela resolve pipeline layout"),
        bind_group_layouts: &[scene_layout, gbuffer_layout],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("candela resolve pipeline"),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            // Fullscreen quad is generated from the vertex index.
            buffers: &[],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(surface_format.into())],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}
