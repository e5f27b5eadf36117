//! Geometry-buffer store: the attachments written by the geometry pass and
//! sampled by the resolve pass, managed together.
//!
//! All four attachments always share one resolution; they are allocated in a
//! single operation and reallocated together or not at all. Formats and
//! usages are fixed, not caller-configurable.

use wgpu::TextureFormat;

/// World-space position. Float target: positions exceed the normalized
/// color range.
pub const POSITION_FORMAT: TextureFormat = TextureFormat::Rgba16Float;
/// World-space normal. Float target for directional precision.
pub const NORMAL_FORMAT: TextureFormat = TextureFormat::Rgba16Float;
/// Material albedo. 8-bit normalized is enough for color.
pub const ALBEDO_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;
/// Depth attachment of the geometry pass. Never read by the resolve pass.
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth24Plus;

/// Every color attachment is rendered to by the geometry pass and sampled by
/// the resolve pass within the same frame; both usages are required.
pub const ATTACHMENT_USAGES: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING);

/// The G-buffer attachments and their readable views.
pub struct GBuffer {
    pub position: wgpu::Texture,
    pub position_view: wgpu::TextureView,
    pub normal: wgpu::Texture,
    pub normal_view: wgpu::TextureView,
    pub albedo: wgpu::Texture,
    pub albedo_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GBuffer {
    /// Allocates all four attachments at `width` × `height`.
    ///
    /// Allocation is all-or-nothing: any creation failure is a device-level
    /// fatal error, never a partially usable G-buffer.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (position, position_view) =
            create_attachment(device, "candela gbuffer position", POSITION_FORMAT, width, height);
        let (normal, normal_view) =
            create_attachment(device, "candela gbuffer normal", NORMAL_FORMAT, width, height);
        let (albedo, albedo_view) =
            create_attachment(device, "candela gbuffer albedo", ALBEDO_FORMAT, width, height);

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("candela gbuffer depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            position,
            position_view,
            normal,
            normal_view,
            albedo,
            albedo_view,
            depth,
            depth_view,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocates every attachment at the new size; idempotent for equal
    /// sizes. Returns `true` when a reallocation happened — the G-buffer
    /// bind group is then stale and must be rebuilt by the caller.
    pub fn rebuild(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        log::debug!("rebuilding gbuffer at {width}x{height}");
        *self = Self::new(device, width, height);
        true
    }
}

fn create_attachment(
    device: &wgpu::Device,
    label: &str,
    format: TextureFormat,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: ATTACHMENT_USAGES,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_fixed() {
        assert_eq!(POSITION_FORMAT, TextureFormat::Rgba16Float);
        assert_eq!(NORMAL_FORMAT, TextureFormat::Rgba16Float);
        assert_eq!(ALBEDO_FORMAT, TextureFormat::Rgba8Unorm);
        assert_eq!(DEPTH_FORMAT, TextureFormat::Depth24Plus);
    }

    #[test]
    fn attachments_are_render_targets_and_sampled() {
        // Written in the geometry pass, sampled in the resolve pass — both
        // usages must be present on every color attachment.
        assert!(ATTACHMENT_USAGES.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        assert!(ATTACHMENT_USAGES.contains(wgpu::TextureUsages::TEXTURE_BINDING));
    }
}
