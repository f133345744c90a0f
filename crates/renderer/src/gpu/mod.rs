//! GPU plumbing behind the preview window.
//!
//! - `context` owns the wgpu instance/device/surface wiring and rebuilds
//!   swapchain state when the window resizes.
//! - `target` holds the fixed-size offscreen texture the user shader renders
//!   into, plus the nearest-neighbor sampling side of the blit.
//! - `pipeline` builds both pass pipelines from wrapped GLSL.
//! - `uniforms` mirrors the injected uniform block and writes changes through
//!   the queue each frame.
//! - `state` glues everything together into the `GpuState` API that `window`
//!   drives once per redraw.

mod context;
mod pipeline;
mod state;
mod target;
mod uniforms;

pub(crate) use state::GpuState;
