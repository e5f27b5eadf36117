//! Candela viewer: opens a window and drives the clustered deferred
//! renderer over a demo scene — a ground plane, a ring of cubes, and a
//! few dozen animated point lights.

use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use candela_render::camera::Camera;
use candela_render::device::{Gpu, GpuInit, SurfaceErrorAction};
use candela_render::lights::{GpuLight, LightSet};
use candela_render::logging::{LoggingConfig, init_logging};
use candela_render::render::ClusteredDeferredRenderer;
use candela_render::scene::{self, Material, Node, Scene, SharedLayouts};

const LIGHT_COUNT: usize = 96;
const CUBE_COUNT: usize = 12;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let event_loop = EventLoop::new()?;

    let mut viewer = Viewer::default();
    event_loop.run_app(&mut viewer)?;
    Ok(())
}

#[derive(Default)]
struct Viewer {
    state: Option<State>,
}

struct State {
    window: Arc<Window>,
    gpu: Gpu,
    camera: Camera,
    lights: LightSet,
    renderer: ClusteredDeferredRenderer,
    scene: Scene,
    started: Instant,
}

impl State {
    fn new(event_loop: &ActiveEventLoop) -> anyhow::Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("candela viewer")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let gpu = pollster::block_on(Gpu::new(window.clone(), GpuInit::default()))?;
        let size = gpu.size();

        let camera = Camera::new(gpu.device());
        camera.update(gpu.queue(), size.width, size.height);

        let mut lights = LightSet::new(gpu.device(), &camera);
        seed_lights(&mut lights);

        let renderer = ClusteredDeferredRenderer::new(&gpu, &camera, &lights);
        let scene = build_scene(&gpu, renderer.shared_layouts());

        Ok(Self {
            window,
            gpu,
            camera,
            lights,
            renderer,
            scene,
            started: Instant::now(),
        })
    }

    /// Renders one frame. Returns `false` on a fatal surface error.
    fn redraw(&mut self) -> bool {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return true;
        }

        let t = self.started.elapsed().as_secs_f32();

        // Slow orbit around the scene center.
        let angle = t * 0.2;
        self.camera.eye = Vec3::new(10.0 * angle.cos(), 5.0, 10.0 * angle.sin());
        self.camera.target = Vec3::new(0.0, 1.0, 0.0);
        self.camera.update(self.gpu.queue(), size.width, size.height);

        animate_lights(&mut self.lights, t);
        if self
            .lights
            .ensure_uploaded(self.gpu.device(), self.gpu.queue(), &self.camera)
        {
            // Light buffer grew; the scene bind group references it.
            self.renderer
                .rebuild_scene_bindings(self.gpu.device(), &self.camera, &self.lights);
        }

        match self.renderer.render_frame(&self.gpu, &self.scene, &self.lights) {
            Ok(()) => true,
            Err(err) => self.gpu.handle_surface_error(err) != SurfaceErrorAction::Fatal,
        }
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);
        match State::new(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("initialization failed: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(new_size) => {
                state.gpu.resize(new_size);
                state
                    .renderer
                    .resize(state.gpu.device(), new_size.width, new_size.height);
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if !state.redraw() {
                    log::error!("fatal surface error, exiting");
                    event_loop.exit();
                    return;
                }
                state.window.request_redraw();
            }

            _ => {}
        }
    }
}

fn build_scene(gpu: &Gpu, layouts: &SharedLayouts) -> Scene {
    let device = gpu.device();
    let queue = gpu.queue();

    let mut scene = Scene::new();

    let ground_mat =
        scene.add_material(Material::solid_color(device, queue, layouts, [90, 90, 100, 255]));
    let cube_mats = [
        scene.add_material(Material::solid_color(device, queue, layouts, [220, 60, 50, 255])),
        scene.add_material(Material::solid_color(device, queue, layouts, [60, 200, 90, 255])),
        scene.add_material(Material::solid_color(device, queue, layouts, [70, 110, 230, 255])),
    ];

    let plane = scene.add_primitive(scene::plane(device, 24.0));
    let cube = scene.add_primitive(scene::cube(device));

    scene.add_node(Node::new(device, layouts, Mat4::IDENTITY).with_draw(ground_mat, plane));

    for i in 0..CUBE_COUNT {
        let angle = i as f32 / CUBE_COUNT as f32 * std::f32::consts::TAU;
        let pos = Vec3::new(5.0 * angle.cos(), 0.75, 5.0 * angle.sin());
        let transform =
            Mat4::from_translation(pos) * Mat4::from_rotation_y(angle) * Mat4::from_scale(Vec3::splat(1.5));
        scene.add_node(
            Node::new(device, layouts, transform).with_draw(cube_mats[i % cube_mats.len()], cube),
        );
    }

    scene
}

fn seed_lights(lights: &mut LightSet) {
    for i in 0..LIGHT_COUNT {
        let f = i as f32 / LIGHT_COUNT as f32;
        let angle = f * std::f32::consts::TAU;
        let radius = 2.0 + 6.0 * ((i * 7919) % 100) as f32 / 100.0;
        let position = Vec3::new(radius * angle.cos(), 0.5, radius * angle.sin());
        let color = Vec3::new(
            0.5 + 0.5 * (angle).sin().abs(),
            0.5 + 0.5 * (angle * 2.0).sin().abs(),
            0.5 + 0.5 * (angle * 3.0).sin().abs(),
        );
        lights.push(GpuLight::new(position, 3.0, color));
    }
}

fn animate_lights(lights: &mut LightSet, t: f32) {
    for (i, light) in lights.lights_mut().iter_mut().enumerate() {
        let phase = i as f32 * 0.37;
        light.position[1] = 1.0 + (t * 0.8 + phase).sin() * 0.8;
    }
}
