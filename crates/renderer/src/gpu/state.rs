use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use flycam::FlyCamera;

use super::context::GpuContext;
use super::pipeline::{build_blit_pipeline, PipelineLayouts, ShaderPipeline};
use super::target::{OffscreenTarget, OFFSCREEN_FORMAT};
use super::uniforms::FlightUniforms;

const QUAD_POSITIONS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];
// Unflipped on purpose: pass A writes rows top-down and v addresses them
// top-down, so the blit comes out upright.
const QUAD_TEXCOORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// Per-window GPU state: the device context, the fixed-size offscreen target,
/// both pass pipelines, and the uniform block mirror.
pub(crate) struct GpuState {
    context: GpuContext,
    offscreen: OffscreenTarget,
    shader_pipeline: ShaderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    position_buffer: wgpu::Buffer,
    texcoord_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: FlightUniforms,
    start_time: Instant,
    last_fps_update: Instant,
    frames_since_last_update: u32,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        surface_size: PhysicalSize<u32>,
        render_size: (u32, u32),
        shader_source: &str,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, surface_size)?;

        let (render_width, render_height) = render_size;
        let max_dimension = context.device.limits().max_texture_dimension_2d;
        if render_width > max_dimension || render_height > max_dimension {
            anyhow::bail!(
                "render target {render_width}x{render_height} exceeds the GPU texture limit of {max_dimension}"
            );
        }

        let layouts = PipelineLayouts::new(&context.device);
        let offscreen = OffscreenTarget::new(
            &context.device,
            &layouts.blit_layout,
            render_width,
            render_height,
        );
        let shader_pipeline =
            ShaderPipeline::new(&context.device, &layouts, shader_source, OFFSCREEN_FORMAT)?;
        let blit_pipeline = build_blit_pipeline(&context.device, &layouts, context.surface_format)?;

        let position_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad positions"),
                contents: bytemuck::cast_slice(&QUAD_POSITIONS),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let texcoord_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad texcoords"),
                contents: bytemuck::cast_slice(&QUAD_TEXCOORDS),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: std::mem::size_of::<FlightUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let uniforms = FlightUniforms::new(render_width, render_height);
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let now = Instant::now();
        Ok(Self {
            context,
            offscreen,
            shader_pipeline,
            blit_pipeline,
            position_buffer,
            texcoord_buffer,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            start_time: now,
            last_fps_update: now,
            frames_since_last_update: 0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Only the window surface follows a resize; the offscreen target and the
    /// resolution uniform stay at the configured render size.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// Renders one frame: the user shader into the offscreen target, then the
    /// target stretched across the current surface texture.
    pub(crate) fn render(&mut self, camera: &FlyCamera) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        let now = Instant::now();
        self.frames_since_last_update += 1;
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
            debug!(fps = fps.round(), time = self.uniforms.time, "render stats");
        }

        self.uniforms
            .set_time(self.start_time.elapsed().as_secs_f32());
        self.uniforms.set_camera(camera);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shader pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.offscreen.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.shader_pipeline.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.position_buffer.slice(..));
            pass.draw(0..4, 0..1);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.offscreen.bind_group, &[]);
            pass.set_vertex_buffer(0, self.position_buffer.slice(..));
            pass.set_vertex_buffer(1, self.texcoord_buffer.slice(..));
            pass.draw(0..4, 0..1);
        }

        self.context
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
