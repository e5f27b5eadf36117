//! Frame orchestration for clustered deferred shading.

use crate::camera::Camera;
use crate::device::Gpu;
use crate::lights::LightSet;
use crate::scene::{Scene, SharedLayouts};

use super::bindings::{GBufferBindings, SceneBindings};
use super::gbuffer::GBuffer;
use super::pipelines;
use super::{GBUFFER_GROUP, MATERIAL_GROUP, MODEL_GROUP, SCENE_GROUP};

/// Clustered deferred renderer.
///
/// Owns the G-buffer, both raster pipelines and the bind groups around
/// them; everything is built once at construction and lives for the
/// renderer's lifetime (resize and light-buffer growth rebuild the affected
/// derived state explicitly). Per-frame state is limited to the transient
/// command encoder inside [`render_frame`].
///
/// [`render_frame`]: ClusteredDeferredRenderer::render_frame
pub struct ClusteredDeferredRenderer {
    shared: SharedLayouts,
    gbuffer: GBuffer,
    scene_bindings: SceneBindings,
    gbuffer_bindings: GBufferBindings,
    geometry_pipeline: wgpu::RenderPipeline,
    resolve_pipeline: wgpu::RenderPipeline,
}

impl ClusteredDeferredRenderer {
    /// Builds all pipelines, attachments and bind groups.
    ///
    /// Any resource-creation failure here is a device-level validation or
    /// OOM error and aborts construction; there is no partial state or
    /// retry.
    pub fn new(gpu: &Gpu, camera: &Camera, lights: &LightSet) -> Self {
        let device = gpu.device();
        let size = gpu.size();

        let shared = SharedLayouts::new(device);
        let gbuffer = GBuffer::new(device, size.width.max(1), size.height.max(1));
        let scene_bindings = SceneBindings::new(device, camera, lights);
        let gbuffer_bindings = GBufferBindings::new(device, &gbuffer);

        let geometry_pipeline =
            pipelines::geometry_pipeline(device, scene_bindings.layout(), &shared);
        let resolve_pipeline = pipelines::resolve_pipeline(
            device,
            scene_bindings.layout(),
            gbuffer_bindings.layout(),
            gpu.surface_format(),
        );

        log::info!(
            "clustered deferred renderer ready ({}x{})",
            gbuffer.width(),
            gbuffer.height()
        );

        Self {
            shared,
            gbuffer,
            scene_bindings,
            gbuffer_bindings,
            geometry_pipeline,
            resolve_pipeline,
        }
    }

    /// Layouts scene content must be built against (model + material).
    pub fn shared_layouts(&self) -> &SharedLayouts {
        &self.shared
    }

    /// Matches the G-buffer to a new surface resolution.
    ///
    /// Idempotent for equal sizes. The G-buffer bind group is derived state
    /// and is rebuilt together with the attachments.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.gbuffer.rebuild(device, width.max(1), height.max(1)) {
            self.gbuffer_bindings.rebuild(device, &self.gbuffer);
        }
    }

    /// Rebinds the scene bind group after a collaborator reallocated one of
    /// its buffers (see [`LightSet::ensure_uploaded`]).
    pub fn rebuild_scene_bindings(
        &mut self,
        device: &wgpu::Device,
        camera: &Camera,
        lights: &LightSet,
    ) {
        self.scene_bindings.rebuild(device, camera, lights);
    }

    /// Renders one frame: clustering compute, geometry pass, resolve pass,
    /// all recorded in that order on one encoder and submitted together.
    /// Pass ordering relies on submission-order execution of a single
    /// queue; no explicit synchronization is used.
    pub fn render_frame(
        &self,
        gpu: &Gpu,
        scene: &Scene,
        lights: &LightSet,
    ) -> Result<(), wgpu::SurfaceError> {
        let mut frame = gpu.begin_frame()?;

        // Cluster assignments must be complete (in submission order) before
        // the resolve pass consumes them.
        lights.run_clustering(&mut frame.encoder);

        self.geometry_pass(&mut frame.encoder, scene);
        self.resolve_pass(&mut frame.encoder, &frame.view);

        gpu.submit(frame);
        Ok(())
    }

    /// Geometry pass: clears all attachments, then rasterizes every scene
    /// draw into the G-buffer.
    fn geometry_pass(&self, encoder: &mut wgpu::CommandEncoder, scene: &Scene) {
        let clear = |view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("candela geometry pass"),
            color_attachments: &[
                clear(&self.gbuffer.position_view),
                clear(&self.gbuffer.normal_view),
                clear(&self.gbuffer.albedo_view),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.gbuffer.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.geometry_pipeline);
        rpass.set_bind_group(SCENE_GROUP, self.scene_bindings.group(), &[]);

        for draw in scene.draws() {
            rpass.set_bind_group(MODEL_GROUP, draw.model_bind_group, &[]);
            rpass.set_bind_group(MATERIAL_GROUP, draw.material_bind_group, &[]);
            rpass.set_vertex_buffer(0, draw.primitive.vertex_buffer.slice(..));
            rpass.set_index_buffer(
                draw.primitive.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            rpass.draw_indexed(0..draw.primitive.index_count, 0, 0..1);
        }
    }

    /// Resolve pass: one fullscreen quad shading every pixel from the
    /// G-buffer and its light cluster. Not depth tested — visibility was
    /// already resolved into the G-buffer.
    fn resolve_pass(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("candela resolve pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.resolve_pipeline);
        rpass.set_bind_group(SCENE_GROUP, self.scene_bindings.group(), &[]);
        rpass.set_bind_group(GBUFFER_GROUP, self.gbuffer_bindings.group(), &[]);

        // Two triangles covering the surface.
        rpass.draw(0..6, 0..1);
    }
}
