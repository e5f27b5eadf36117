//! Light storage and the light-clustering compute stage.
//!
//! Responsibilities:
//! - own the light-set storage buffer (`count` header + packed light records)
//! - own the cluster→light-index storage buffer written by the compute stage
//! - record the clustering dispatch onto the frame's command encoder
//!
//! Consumers (the deferred renderer's scene bindings) only *reference* these
//! buffers. Growing the light set reallocates the light buffer; callers must
//! treat that as invalidating every bind group that references it, which is
//! why [`LightSet::ensure_uploaded`] reports reallocation explicitly.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::camera::Camera;

/// Cluster grid dimensions: screen tiles in X/Y, exponential depth slices in Z.
///
/// Shared with `clustering.wgsl` and `resolve.wgsl`; the three definitions
/// must agree.
pub const CLUSTER_GRID_X: u32 = 16;
pub const CLUSTER_GRID_Y: u32 = 9;
pub const CLUSTER_GRID_Z: u32 = 24;

/// Upper bound on lights recorded per cluster. One `u32` count plus this many
/// indices gives a 512-byte cluster record.
pub const MAX_LIGHTS_PER_CLUSTER: u32 = 127;

/// Workgroup size of the clustering shader, one invocation per cluster.
const WORKGROUP: (u32, u32, u32) = (4, 4, 4);

/// GPU-side light record (32 bytes, matches `Light` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct GpuLight {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

impl GpuLight {
    pub fn new(position: Vec3, radius: f32, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            radius,
            color: color.to_array(),
            _pad: 0.0,
        }
    }
}

/// Total number of clusters in the grid.
pub const fn cluster_count() -> u32 {
    CLUSTER_GRID_X * CLUSTER_GRID_Y * CLUSTER_GRID_Z
}

/// Byte size of one cluster record: count + MAX_LIGHTS_PER_CLUSTER indices.
pub const fn cluster_record_size() -> u64 {
    4 * (1 + MAX_LIGHTS_PER_CLUSTER as u64)
}

/// Byte size of the whole cluster→light-index buffer.
pub const fn cluster_records_size() -> u64 {
    cluster_count() as u64 * cluster_record_size()
}

/// Byte size of the light-set buffer for `n` lights: 16-byte count header
/// (the WGSL runtime-sized `lights` array starts at the struct's alignment)
/// plus the packed records.
pub const fn light_set_size(n: usize) -> u64 {
    16 + (n as u64) * std::mem::size_of::<GpuLight>() as u64
}

/// Workgroup counts that cover the full cluster grid.
pub const fn dispatch_extent() -> (u32, u32, u32) {
    (
        CLUSTER_GRID_X.div_ceil(WORKGROUP.0),
        CLUSTER_GRID_Y.div_ceil(WORKGROUP.1),
        CLUSTER_GRID_Z.div_ceil(WORKGROUP.2),
    )
}

/// Owns the light buffers and the clustering compute pipeline.
pub struct LightSet {
    lights: Vec<GpuLight>,
    capacity: usize,
    dirty: bool,

    light_buffer: wgpu::Buffer,
    cluster_buffer: wgpu::Buffer,

    clustering_layout: wgpu::BindGroupLayout,
    clustering_pipeline: wgpu::ComputePipeline,
    clustering_bind_group: wgpu::BindGroup,
}

const INITIAL_CAPACITY: usize = 64;

impl LightSet {
    pub fn new(device: &wgpu::Device, camera: &Camera) -> Self {
        let capacity = INITIAL_CAPACITY;
        let light_buffer = create_light_buffer(device, capacity);

        let cluster_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("candela cluster light indices"),
            size: cluster_records_size(),
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("candela clustering shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("clustering.wgsl").into()),
        });

        let clustering_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("candela clustering bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("candela clustering pipeline layout"),
            bind_group_layouts: &[&clustering_layout],
            immediate_size: 0,
        });

        let clustering_pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("candela clustering pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some("cs_main"),
                compilation_options: Default::default(),
                cache: None,
            });

        let clustering_bind_group = create_clustering_bind_group(
            device,
            &clustering_layout,
            camera,
            &light_buffer,
            &cluster_buffer,
        );

        Self {
            lights: Vec::new(),
            capacity,
            dirty: true,
            light_buffer,
            cluster_buffer,
            clustering_layout,
            clustering_pipeline,
            clustering_bind_group,
        }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn push(&mut self, light: GpuLight) {
        self.lights.push(light);
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.lights.clear();
        self.dirty = true;
    }

    /// Mutable access to the CPU-side records, e.g. for animation.
    /// Marks the set dirty; the next [`ensure_uploaded`] re-writes the buffer.
    ///
    /// [`ensure_uploaded`]: LightSet::ensure_uploaded
    pub fn lights_mut(&mut self) -> &mut [GpuLight] {
        self.dirty = true;
        &mut self.lights
    }

    /// Storage buffer of light records (`count` header + packed lights).
    pub fn light_buffer(&self) -> &wgpu::Buffer {
        &self.light_buffer
    }

    /// Storage buffer mapping cluster id → light index list.
    pub fn cluster_buffer(&self) -> &wgpu::Buffer {
        &self.cluster_buffer
    }

    /// Uploads pending CPU-side changes, growing the light buffer if needed.
    ///
    /// Returns `true` when the light buffer was reallocated; every bind group
    /// referencing it is then stale and must be rebuilt by the caller. The
    /// clustering stage's own bind group is rebuilt here.
    pub fn ensure_uploaded(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera,
    ) -> bool {
        let mut reallocated = false;

        if self.lights.len() > self.capacity {
            self.capacity = self.lights.len().next_power_of_two().max(INITIAL_CAPACITY);
            self.light_buffer = create_light_buffer(device, self.capacity);
            self.clustering_bind_group = create_clustering_bind_group(
                device,
                &self.clustering_layout,
                camera,
                &self.light_buffer,
                &self.cluster_buffer,
            );
            reallocated = true;
            self.dirty = true;
            log::debug!("light buffer grown to {} records", self.capacity);
        }

        if self.dirty {
            let header = [self.lights.len() as u32, 0, 0, 0];
            let mut bytes = Vec::with_capacity(light_set_size(self.lights.len()) as usize);
            bytes.extend_from_slice(bytemuck::bytes_of(&header));
            bytes.extend_from_slice(bytemuck::cast_slice(&self.lights));
            queue.write_buffer(&self.light_buffer, 0, &bytes);
            self.dirty = false;
        }

        reallocated
    }

    /// Records the clustering dispatch onto `encoder`.
    ///
    /// Must be recorded before any pass that reads the cluster buffer;
    /// ordering is provided purely by the encoder's recording order.
    pub fn run_clustering(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("candela light clustering"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.clustering_pipeline);
        pass.set_bind_group(0, &self.clustering_bind_group, &[]);
        let (x, y, z) = dispatch_extent();
        pass.dispatch_workgroups(x, y, z);
    }
}

fn create_light_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("candela light set"),
        size: light_set_size(capacity),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_clustering_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera: &Camera,
    light_buffer: &wgpu::Buffer,
    cluster_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("candela clustering bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera.buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: light_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: cluster_buffer.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── record layout ─────────────────────────────────────────────────────

    #[test]
    fn gpu_light_is_32_bytes() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 32);
    }

    #[test]
    fn cluster_record_holds_count_plus_indices() {
        // 1 count word + 127 index words = 512 bytes.
        assert_eq!(cluster_record_size(), 512);
        assert_eq!(cluster_record_size() % 4, 0);
    }

    #[test]
    fn light_set_header_is_16_bytes() {
        assert_eq!(light_set_size(0), 16);
        assert_eq!(light_set_size(2), 16 + 64);
    }

    // ── grid coverage ─────────────────────────────────────────────────────

    #[test]
    fn cluster_count_matches_grid() {
        assert_eq!(
            cluster_count(),
            CLUSTER_GRID_X * CLUSTER_GRID_Y * CLUSTER_GRID_Z
        );
        assert_eq!(
            cluster_records_size(),
            cluster_count() as u64 * cluster_record_size()
        );
    }

    // ── wgsl agreement ────────────────────────────────────────────────────

    #[test]
    fn wgsl_sources_declare_matching_grid_constants() {
        // The grid is declared three times: here and in the two shaders
        // that index clusters. Drift in a shader copy corrupts cluster
        // lookups without tripping any validation, so pin the WGSL text to
        // these constants.
        let clustering = include_str!("clustering.wgsl");
        let resolve = include_str!("../render/shaders/resolve.wgsl");

        for src in [clustering, resolve] {
            assert!(src.contains(&format!("const GRID_X: u32 = {CLUSTER_GRID_X}u;")));
            assert!(src.contains(&format!("const GRID_Y: u32 = {CLUSTER_GRID_Y}u;")));
            assert!(src.contains(&format!("const GRID_Z: u32 = {CLUSTER_GRID_Z}u;")));
            assert!(src.contains(&format!("indices: array<u32, {MAX_LIGHTS_PER_CLUSTER}>")));
        }
        assert!(clustering.contains(&format!(
            "const MAX_LIGHTS_PER_CLUSTER: u32 = {MAX_LIGHTS_PER_CLUSTER}u;"
        )));
    }

    #[test]
    fn dispatch_covers_grid_without_excess() {
        let (x, y, z) = dispatch_extent();
        assert!(x * WORKGROUP.0 >= CLUSTER_GRID_X);
        assert!(y * WORKGROUP.1 >= CLUSTER_GRID_Y);
        assert!(z * WORKGROUP.2 >= CLUSTER_GRID_Z);
        // No workgroup row may be entirely out of range.
        assert!((x - 1) * WORKGROUP.0 < CLUSTER_GRID_X);
        assert!((y - 1) * WORKGROUP.1 < CLUSTER_GRID_Y);
        assert!((z - 1) * WORKGROUP.2 < CLUSTER_GRID_Z);
    }
}
