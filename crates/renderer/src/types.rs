use std::path::PathBuf;

use flycam::CameraTuning;

/// Configuration for the preview window and render pipeline.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Path to the fragment shader that should be rendered.
    pub shader_path: PathBuf,
    /// Offscreen render width in pixels.
    pub render_width: u32,
    /// Render aspect ratio, width over height.
    pub aspect_ratio: f32,
    /// Open a decorated window at the render size instead of borderless
    /// fullscreen on the primary monitor.
    pub windowed: bool,
    /// Window title.
    pub window_title: String,
    /// Camera behavior forwarded to [`flycam::FlyCamera`].
    pub tuning: CameraTuning,
}

impl Default for RendererConfig {
    /// Provides a 320-wide 16:9 fullscreen configuration with no shader
    /// selected.
    fn default() -> Self {
        Self {
            shader_path: PathBuf::new(),
            render_width: 320,
            aspect_ratio: 16.0 / 9.0,
            windowed: false,
            window_title: "shaderfly".to_string(),
            tuning: CameraTuning::default(),
        }
    }
}

impl RendererConfig {
    /// Offscreen target dimensions for this configuration.
    pub fn render_extent(&self) -> (u32, u32) {
        render_extent(self.render_width, self.aspect_ratio)
    }
}

/// Derives the offscreen target dimensions from the configured width and
/// aspect ratio; the height is rounded to the nearest pixel. The extent is
/// fixed for the lifetime of the preview and never follows a window resize.
pub fn render_extent(render_width: u32, aspect_ratio: f32) -> (u32, u32) {
    let height = (render_width as f32 / aspect_ratio).round().max(1.0) as u32;
    (render_width.max(1), height)
}
