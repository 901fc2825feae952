//! Winit application handler: window lifecycle, input, and the redraw loop.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use orrery_animation::AnimationDriver;
use orrery_config::Config;
use orrery_render::{
    BloomParams, OrbitCamera, RenderSink, Renderer, Viewport, init_gpu_blocking,
};
use orrery_scene::SceneGraph;
use orrery_system::build_solar_system;

/// Pointer drag sensitivity, radians per pixel.
const ORBIT_SENSITIVITY: f32 = 0.005;
/// Scroll lines per zoom step.
const ZOOM_LINE_SCALE: f32 = 0.5;

/// Everything that only exists once a window and GPU are up.
struct Running {
    window: Arc<Window>,
    renderer: Renderer,
    scene: SceneGraph,
    driver: AnimationDriver,
    camera: OrbitCamera,
    viewport: Viewport,
    dragging: bool,
    cursor: Option<(f64, f64)>,
}

/// The application: configuration until `resumed`, then the running state.
pub struct App {
    config: Config,
    assets_dir: PathBuf,
    running: Option<Running>,
}

impl App {
    pub fn new(config: Config, assets_dir: PathBuf) -> Self {
        Self {
            config,
            assets_dir,
            running: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let gpu = match init_gpu_blocking(window.clone(), self.config.window.vsync) {
            Ok(gpu) => gpu,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height, window.scale_factor());

        let bloom = BloomParams {
            threshold: self.config.bloom.threshold,
            strength: self.config.bloom.strength,
            radius: self.config.bloom.radius,
            enabled: self.config.bloom.enabled,
        };
        let renderer = Renderer::new(gpu, self.assets_dir.clone(), bloom);

        let mut scene = SceneGraph::new();
        let system = build_solar_system(&mut scene);
        info!(nodes = scene.len(), "Solar system built");
        let driver = AnimationDriver::new(system);

        let cam = &self.config.camera;
        let camera = OrbitCamera::from_position(
            glam::Vec3::from_array(cam.position),
            cam.fov_degrees.to_radians(),
            viewport.aspect_ratio(),
            cam.near,
            cam.far,
            cam.min_distance,
            cam.max_distance,
        );

        window.request_redraw();
        self.running = Some(Running {
            window,
            renderer,
            scene,
            driver,
            camera,
            viewport,
            dragging: false,
            cursor: None,
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!(
                    ticks = running.driver.tick_count(),
                    "Close requested, shutting down"
                );
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(resize) = running.viewport.handle_resize(size.width, size.height) {
                    running.renderer.resize(resize.width, resize.height);
                    running
                        .camera
                        .set_aspect_ratio(resize.width as f32, resize.height as f32);
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = running.window.inner_size();
                if let Some(resize) = running.viewport.handle_scale_factor_changed(
                    scale_factor,
                    size.width,
                    size.height,
                ) {
                    running.renderer.resize(resize.width, resize.height);
                    running
                        .camera
                        .set_aspect_ratio(resize.width as f32, resize.height as f32);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    running.dragging = state == ElementState::Pressed;
                    if !running.dragging {
                        running.cursor = None;
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if running.dragging {
                    if let Some((last_x, last_y)) = running.cursor {
                        let dx = (position.x - last_x) as f32 * ORBIT_SENSITIVITY;
                        let dy = (position.y - last_y) as f32 * ORBIT_SENSITIVITY;
                        running.camera.orbit(dx, -dy);
                    }
                    running.cursor = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => lines * ZOOM_LINE_SCALE,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                running.camera.zoom(amount);
            }

            WindowEvent::RedrawRequested => {
                // One animation tick per presented frame: the update rate is
                // tied to the display refresh rate.
                let mut sink = RenderSink {
                    renderer: &mut running.renderer,
                    camera: &running.camera,
                };
                running.driver.tick(&mut running.scene, &mut sink);
                running.window.request_redraw();
            }

            _ => {}
        }
    }
}
