use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Surface setup options for [`Gpu::new`].
///
/// Deliberately small: the deferred pipeline fixes its own formats and
/// features, so only the presentation side is configurable.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface format when the platform offers one, so the
    /// resolve pass output is display-encoded by the surface itself.
    pub prefer_srgb: bool,

    /// Swapchain present mode. FIFO is supported everywhere and paces the
    /// viewer to the display refresh.
    pub present_mode: wgpu::PresentMode,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
        }
    }
}

/// Device context threaded explicitly through the renderer.
///
/// Owns the device, queue, and the window surface with its configuration.
/// Collaborators borrow [`device`](Gpu::device) and [`queue`](Gpu::queue)
/// from here; nothing graphics-related lives in a global.
pub struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

/// One acquired surface frame: the texture to present, a view on it, and
/// the encoder every stage of the frame records into.
///
/// Short-lived by contract — pass it back to [`Gpu::submit`] promptly;
/// holding the surface texture blocks later acquisitions.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// What the frame loop should do after a [`SurfaceError`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; try again next frame.
    Reconfigured,
    /// Transient failure; drop this frame and continue.
    SkipFrame,
    /// Unrecoverable (out of memory); shut down.
    Fatal,
}

impl Gpu {
    /// Brings up instance, adapter, device and queue, and configures the
    /// window surface. The window arrives in an `Arc` so the `'static`
    /// surface keeps its own handle to it.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("requesting GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("candela device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting device and queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats, init.prefer_srgb)
            .context("surface reports no supported formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!(
            "gpu ready: {format:?} surface at {}x{}",
            size.width,
            size.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    /// Format the resolve pipeline must target.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current drawable size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Tracks a window resize. A zero-sized surface cannot be configured;
    /// the size is recorded and configuration waits for a nonzero resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquires the next surface texture and opens the frame's encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("candela frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the frame's commands and presents the surface texture.
    pub fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        frame.surface_texture.present();
    }

    /// Maps a surface error to the action the frame loop should take.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                log::warn!("surface lost or outdated, reconfiguring");
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(&self.device, &self.config);
                }
                SurfaceErrorAction::Reconfigured
            }
            SurfaceError::Timeout => {
                log::warn!("surface acquire timed out, skipping frame");
                SurfaceErrorAction::SkipFrame
            }
            SurfaceError::Other => SurfaceErrorAction::SkipFrame,
            SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        }
    }
}

fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        if let Some(format) = formats.iter().copied().find(|f| f.is_srgb()) {
            return Some(format);
        }
    }
    formats.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_format_preferred_when_offered() {
        let formats = [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        // Without the preference the capability order wins.
        assert_eq!(
            choose_surface_format(&formats, false),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn falls_back_to_first_format_without_srgb() {
        let formats = [wgpu::TextureFormat::Rgba16Float];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(wgpu::TextureFormat::Rgba16Float)
        );
        assert_eq!(choose_surface_format(&[], true), None);
    }
}
