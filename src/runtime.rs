use anyhow::{anyhow, Result};
use glam::Vec2;
use log::warn;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::ActiveEventLoop;

use crate::app::Viewer;
use crate::input::{mouse_button_from_winit, scroll_steps, PointerTracker};
use crate::render::Renderer;

// Longest step fed to the animation, so a stalled tab does not jump.
const MAX_FRAME_STEP: f32 = 0.25;

/// Window event handling shared by the native and web entry points.
pub struct WindowApp {
    renderer: Renderer,
    viewer: Viewer,
    pointer: PointerTracker,
    clock: FrameClock,
    stall_reported: bool,
}

impl WindowApp {
    pub fn new(renderer: Renderer, viewer: Viewer) -> Self {
        renderer.window().set_title(viewer.title());
        Self {
            renderer,
            viewer,
            pointer: PointerTracker::new(),
            clock: FrameClock::new(),
            stall_reported: false,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn process_event(&mut self, event: &Event<()>, elwt: &ActiveEventLoop) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => self.renderer.resize(*size),
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = self.renderer.window().inner_size();
                        self.renderer.resize(size);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        let button = mouse_button_from_winit(*button);
                        match state {
                            ElementState::Pressed => self.pointer.button_down(button),
                            ElementState::Released => self.pointer.button_up(button),
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let position = Vec2::new(position.x as f32, position.y as f32);
                        if let Some(gesture) = self.pointer.cursor_moved(position) {
                            self.viewer.apply(gesture, self.renderer.size());
                        }
                    }
                    WindowEvent::CursorLeft { .. } => self.pointer.cursor_left(),
                    WindowEvent::MouseWheel { delta, .. } => {
                        if let Some(gesture) = self.pointer.wheel(scroll_steps(*delta)) {
                            self.viewer.apply(gesture, self.renderer.size());
                        }
                    }
                    WindowEvent::RedrawRequested => self.draw_frame()?,
                    _ => {}
                }
            }
            Event::AboutToWait => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn draw_frame(&mut self) -> Result<()> {
        let dt = self.clock.tick();
        if self.viewer.poll_assets() {
            if let Some(assets) = self.viewer.earth_assets() {
                self.renderer.upload_earth(assets);
            }
            self.renderer.window().set_title(self.viewer.title());
        } else if !self.stall_reported && !self.viewer.can_load() {
            warn!("Earth assets will never arrive; keeping the loading view");
            self.stall_reported = true;
        }
        self.viewer.advance(dt);

        match self.renderer.render(&self.viewer) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.renderer.window().inner_size();
                self.renderer.resize(size);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU is out of memory")),
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timeout; retrying next frame");
                Ok(())
            }
            Err(err) => {
                warn!("Surface error ({err}); retrying next frame");
                Ok(())
            }
        }
    }
}

/// Wall clock for frame deltas.
struct FrameClock {
    last: Option<f64>,
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
}

impl FrameClock {
    fn new() -> Self {
        Self {
            last: None,
            #[cfg(not(target_arch = "wasm32"))]
            origin: std::time::Instant::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    #[cfg(target_arch = "wasm32")]
    fn now(&self) -> f64 {
        web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| performance.now() / 1000.0)
            .unwrap_or(0.0)
    }

    fn tick(&mut self) -> f32 {
        let now = self.now();
        let dt = self.last.map_or(0.0, |last| (now - last) as f32);
        self.last = Some(now);
        dt.clamp(0.0, MAX_FRAME_STEP)
    }
}
