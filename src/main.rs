use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use scene_viewer::cli::Cli;
use scene_viewer::config::ViewerConfig;
use scene_viewer::error::RenderError;
use scene_viewer::gpu::GpuRenderer;
use scene_viewer::lifecycle::{SceneLifecycleManager, StaticContainers};
use scene_viewer::scene::SceneKind;

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;
/// Radians of orbit per pixel of drag.
const MOUSE_ROTATE_SPEED: f32 = 0.005;

/// The mount target name the window registers itself under.
const VIEWPORT: &str = "viewport";

struct App {
    cli: Cli,
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    renderer: Option<GpuRenderer>,
    containers: StaticContainers,
    lifecycle: SceneLifecycleManager,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl App {
    fn new(cli: Cli, config: ViewerConfig) -> Self {
        Self {
            cli,
            config,
            window: None,
            renderer: None,
            containers: StaticContainers::new(),
            lifecycle: SceneLifecycleManager::new(),
            dragging: false,
            last_cursor: None,
        }
    }

    fn mount(&mut self, kind: SceneKind) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        // A missing container is a logged no-op, not a fault.
        if let Err(e) = self
            .lifecycle
            .mount(&self.containers, VIEWPORT, kind, &self.config, renderer)
        {
            warn!("mount skipped: {}", e);
        }
    }

    fn scene_for_key(code: KeyCode) -> Option<SceneKind> {
        match code {
            KeyCode::Digit1 => Some(SceneKind::Box),
            KeyCode::Digit2 => Some(SceneKind::Sphere),
            KeyCode::Digit3 => Some(SceneKind::Cylinder),
            KeyCode::Digit4 => Some(SceneKind::BoxMaterial),
            KeyCode::Digit5 => Some(SceneKind::Model),
            _ => None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Scene Viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer =
            match pollster::block_on(GpuRenderer::new(window.clone(), !self.cli.no_ui)) {
                Ok(r) => r,
                Err(e) => {
                    error!("failed to initialize renderer: {}", e);
                    event_loop.exit();
                    return;
                }
            };

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.containers.register(VIEWPORT);
        self.mount(self.cli.scene.into());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // The panel gets first refusal on pointer and keyboard input.
        if let Some(renderer) = &mut self.renderer {
            if renderer.handle_event(&event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                if let Some(renderer) = &mut self.renderer {
                    self.lifecycle.unmount(renderer);
                }
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if let Some(kind) = Self::scene_for_key(code) {
                    self.mount(kind);
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    self.lifecycle
                        .handle_resize(renderer, size.width, size.height);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state.is_pressed();
                if !self.dragging {
                    self.last_cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some((last_x, last_y)) = self.last_cursor {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        self.lifecycle.pointer_rotate(
                            -dx * MOUSE_ROTATE_SPEED,
                            dy * MOUSE_ROTATE_SPEED,
                        );
                    }
                }
                self.last_cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.lifecycle.pointer_zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                if let Some(renderer) = &mut self.renderer {
                    match self.lifecycle.frame(renderer) {
                        Ok(()) => {}
                        Err(RenderError::OutOfMemory) => {
                            error!("render device out of memory, exiting");
                            event_loop.exit();
                        }
                        Err(e) => error!("render error: {}", e),
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path).context("loading viewer config")?,
        None => ViewerConfig::default(),
    };

    info!("starting with `{:?}` scene; keys 1-5 switch scenes, Escape quits", cli.scene);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
