//! Renderer crate for shaderfly.
//!
//! Glues the preview window, the `wgpu` pipeline pair, and the GLSL wrapping
//! together. The overall flow is:
//!
//! ```text
//!   CLI / shaderfly
//!          │ RendererConfig
//!          ▼
//!   run_preview ──▶ winit event loop ──▶ GpuState::render()
//!          ▲                │                  │
//!          │                └─▶ FlyCamera ─────┴─▶ uniform block ─▶ GPU
//! ```
//!
//! Each frame renders the user's fragment shader into a fixed-size offscreen
//! target (pass A) and then stretches that target across the window surface
//! with nearest-neighbor sampling (pass B). The fragment source is wrapped at
//! load time so it compiles as Vulkan-flavored GLSL while still reading the
//! plain `uniform` names it was written against.

mod compile;
mod gpu;
mod types;
mod window;

pub use compile::ShaderError;
pub use types::{render_extent, RendererConfig};
pub use window::run_preview;
