use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowBuilder};

use flycam::{FlyCamera, KeyState};

use crate::gpu::GpuState;
use crate::types::RendererConfig;

/// Latest-wins slot for raw pointer motion. The event loop accumulates
/// deltas into a virtual absolute position; the frame drains at most one
/// sample before the camera update.
#[derive(Default)]
struct PointerSlot {
    virtual_position: (f64, f64),
    pending: Option<(f64, f64)>,
}

impl PointerSlot {
    fn push_motion(&mut self, delta: (f64, f64)) {
        self.virtual_position.0 += delta.0;
        self.virtual_position.1 += delta.1;
        self.pending = Some(self.virtual_position);
    }

    fn drain(&mut self) -> Option<(f64, f64)> {
        self.pending.take()
    }
}

/// Pressed-key set fed by window events and snapshotted once per frame.
#[derive(Default)]
struct PressedKeys {
    keys: HashSet<KeyCode>,
}

impl PressedKeys {
    fn handle(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match state {
            ElementState::Pressed => {
                self.keys.insert(code);
            }
            ElementState::Released => {
                self.keys.remove(&code);
            }
        }
    }

    /// Release events delivered while unfocused never arrive, so focus loss
    /// drops everything currently held.
    fn clear(&mut self) {
        self.keys.clear();
    }

    fn is_down(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }

    fn snapshot(&self) -> KeyState {
        KeyState {
            forward: self.is_down(KeyCode::KeyW),
            backward: self.is_down(KeyCode::KeyS),
            left: self.is_down(KeyCode::KeyA),
            right: self.is_down(KeyCode::KeyD),
            up: self.is_down(KeyCode::Space),
            down: self.is_down(KeyCode::ShiftLeft),
            precision: self.is_down(KeyCode::ControlLeft),
            speed_down: self.is_down(KeyCode::KeyQ),
            speed_up: self.is_down(KeyCode::KeyE),
            slider_down: [
                self.is_down(KeyCode::NumpadSubtract),
                self.is_down(KeyCode::ArrowDown),
                self.is_down(KeyCode::ArrowLeft),
                self.is_down(KeyCode::PageDown),
            ],
            slider_up: [
                self.is_down(KeyCode::NumpadAdd),
                self.is_down(KeyCode::ArrowUp),
                self.is_down(KeyCode::ArrowRight),
                self.is_down(KeyCode::PageUp),
            ],
        }
    }
}

/// Opens the preview window and runs the render loop until the window closes
/// or Escape is pressed.
pub fn run_preview(config: RendererConfig) -> Result<()> {
    let source = load_shader_source(&config.shader_path)?;
    let (render_width, render_height) = config.render_extent();
    info!(
        shader = %config.shader_path.display(),
        render_width,
        render_height,
        windowed = config.windowed,
        "starting shader preview"
    );

    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let mut builder = WindowBuilder::new().with_title(config.window_title.clone());
    if config.windowed {
        builder = builder.with_inner_size(PhysicalSize::new(render_width, render_height));
    } else {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = builder
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);
    grab_cursor(&window);

    let surface_size = window.inner_size();
    let mut gpu = GpuState::new(
        window.as_ref(),
        surface_size,
        (render_width, render_height),
        &source,
    )?;

    let mut camera = FlyCamera::new(config.tuning);
    let mut pointer = PointerSlot::default();
    let mut pressed = PressedKeys::default();

    event_loop
        .run(move |event, elwt| match event {
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                pointer.push_motion(delta);
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed
                        && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    {
                        elwt.exit();
                        return;
                    }
                    pressed.handle(event.physical_key, event.state);
                }
                WindowEvent::Focused(false) => pressed.clear(),
                WindowEvent::Resized(new_size) => gpu.resize(new_size),
                WindowEvent::RedrawRequested => {
                    if let Some((x, y)) = pointer.drain() {
                        camera.pointer_sample(x, y);
                    }
                    camera.update(&pressed.snapshot());
                    match gpu.render(&camera) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu.resize(gpu.size());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; closing preview");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            }
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

/// Hides the cursor and locks it to the window so raw motion keeps flowing
/// while the pointer sits over the preview. Platforms that support neither
/// grab mode still get a working preview, just without capture.
fn grab_cursor(window: &Window) {
    window.set_cursor_visible(false);
    if let Err(err) = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    {
        warn!(error = %err, "cursor grab unavailable; pointer may leave the window");
    }
}

/// Reads the shader source, dropping any trailing NUL bytes some editors
/// append to GLSL files.
fn load_shader_source(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read shader at {}", path.display()))?;
    Ok(raw.trim_end_matches('\0').to_string())
}
