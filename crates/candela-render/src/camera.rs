//! Camera state and its GPU uniform buffer.
//!
//! The camera owns the uniform buffer that both raster passes and the light
//! clustering stage read. Everything else only *references* this buffer via
//! bind groups; the buffer itself is never reallocated, so those bindings
//! stay valid for the camera's lifetime.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// GPU-side camera data.
///
/// Layout must match the `CameraUniforms` struct declared in every WGSL
/// shader of this crate (208 bytes, 16-byte aligned).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub near: f32,
    pub far: f32,
}

/// Perspective camera with an owned uniform buffer.
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,

    buffer: wgpu::Buffer,
}

impl Camera {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("candela camera ubo"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            eye: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
            buffer,
        }
    }

    /// Returns the uniform buffer for binding. Read-only for all consumers.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Computes the uniform contents for a surface of `width` × `height`.
    pub fn uniforms(&self, width: u32, height: u32) -> CameraUniforms {
        compute_uniforms(
            self.eye, self.target, self.up, self.fov_y, self.near, self.far, width, height,
        )
    }

    /// Recomputes matrices and writes the uniform buffer.
    pub fn update(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        let uniforms = self.uniforms(width, height);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}

/// Pure matrix computation behind [`Camera::uniforms`].
#[allow(clippy::too_many_arguments)]
pub fn compute_uniforms(
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    fov_y: f32,
    near: f32,
    far: f32,
    width: u32,
    height: u32,
) -> CameraUniforms {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    // Depth range 0..1 (wgpu convention).
    let proj = Mat4::perspective_rh(fov_y, aspect, near, far);
    let view = Mat4::look_at_rh(eye, target, up);

    CameraUniforms {
        view_proj: (proj * view).to_cols_array_2d(),
        view: view.to_cols_array_2d(),
        inv_proj: proj.inverse().to_cols_array_2d(),
        resolution: [width as f32, height as f32],
        near,
        far,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_uniforms() -> CameraUniforms {
        compute_uniforms(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            60f32.to_radians(),
            0.1,
            100.0,
            1280,
            720,
        )
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn uniforms_size_matches_wgsl() {
        // 3 mat4x4 (192) + vec2 resolution (8) + near/far (8).
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 208);
        assert_eq!(std::mem::size_of::<CameraUniforms>() % 16, 0);
    }

    // ── matrices ──────────────────────────────────────────────────────────

    #[test]
    fn resolution_recorded() {
        let u = test_uniforms();
        assert_eq!(u.resolution, [1280.0, 720.0]);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let u = test_uniforms();
        let vp = Mat4::from_cols_array_2d(&u.view_proj);
        let clip = vp * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        // wgpu depth range is [0, 1]; the target sits between near and far.
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn view_maps_eye_to_origin() {
        let u = test_uniforms();
        let view = Mat4::from_cols_array_2d(&u.view);
        let at_origin = view * Vec3::new(0.0, 0.0, 5.0).extend(1.0);
        assert!(at_origin.truncate().length() < 1e-5);
    }

    #[test]
    fn inv_proj_inverts_proj() {
        let u = test_uniforms();
        let vp = Mat4::from_cols_array_2d(&u.view_proj);
        let view = Mat4::from_cols_array_2d(&u.view);
        let inv_proj = Mat4::from_cols_array_2d(&u.inv_proj);
        let proj = vp * view.inverse();

        let id = proj * inv_proj;
        for (i, col) in id.to_cols_array_2d().iter().enumerate() {
            for (j, v) in col.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-4, "element ({i},{j}) = {v}");
            }
        }
    }
}
