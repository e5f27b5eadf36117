use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::SharedLayouts;

/// GPU-side per-model data. Matches `ModelUniforms` in geometry.wgsl.
///
/// The normal is transformed with the model matrix directly, so transforms
/// are assumed rigid (rotation/translation, uniform scale).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
}

/// A draw entry on a node: material slot + primitive slot into the scene.
#[derive(Debug, Copy, Clone)]
pub struct NodeDraw {
    pub material: usize,
    pub primitive: usize,
}

/// Scene node: one model transform (uniform buffer + bind group) and the
/// draws rendered with it.
pub struct Node {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pub draws: Vec<NodeDraw>,
}

impl Node {
    pub fn new(device: &wgpu::Device, layouts: &SharedLayouts, transform: Mat4) -> Self {
        let uniforms = ModelUniforms {
            model: transform.to_cols_array_2d(),
        };

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("candela model ubo"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("candela model bind group"),
            layout: &layouts.model,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            draws: Vec::new(),
        }
    }

    pub fn with_draw(mut self, material: usize, primitive: usize) -> Self {
        self.draws.push(NodeDraw {
            material,
            primitive,
        });
        self
    }

    /// Rewrites the model transform in place; the bind group stays valid.
    pub fn set_transform(&self, queue: &wgpu::Queue, transform: Mat4) {
        let uniforms = ModelUniforms {
            model: transform.to_cols_array_2d(),
        };
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_uniforms_size_matches_wgsl() {
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 64);
    }
}
