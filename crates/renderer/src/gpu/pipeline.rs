use anyhow::Result;
use tracing::error;
use wgpu::naga::ShaderStage;

use crate::compile::{
    self, BLIT_FRAGMENT_GLSL, BLIT_VERTEX_GLSL, FALLBACK_FRAGMENT_GLSL, VERTEX_SHADER_GLSL,
};

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const TEXCOORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    }
}

fn texcoord_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TEXCOORD_ATTRIBUTES,
    }
}

/// Bind group layouts shared by both passes.
pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub blit_layout: wgpu::BindGroupLayout,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            uniform_layout,
            blit_layout,
        }
    }
}

/// Pass A pipeline built around the user's fragment shader.
pub(crate) struct ShaderPipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl ShaderPipeline {
    /// Builds the user-shader pipeline for the offscreen pass.
    ///
    /// Compile diagnostics from the GLSL front end and validation errors from
    /// pipeline creation are logged, and the fragment stage is replaced with
    /// the built-in fallback; the returned pipeline is always usable.
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        source: &str,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        compile::log_unreferenced_uniforms(source);
        let wrapped = compile::wrap_user_fragment(source);

        let fragment_source = match compile::validate_fragment_source("fragment", &wrapped) {
            Ok(()) => wrapped,
            Err(err) => {
                error!("{err}");
                FALLBACK_FRAGMENT_GLSL.to_string()
            }
        };

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shader pipeline layout"),
            bind_group_layouts: &[&layouts.uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = match build_pass_pipeline(
            device,
            &pipeline_layout,
            "shader pipeline",
            &fragment_source,
            target_format,
        ) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                error!("{err}");
                build_pass_pipeline(
                    device,
                    &pipeline_layout,
                    "fallback shader pipeline",
                    FALLBACK_FRAGMENT_GLSL,
                    target_format,
                )
                .map_err(|err| anyhow::anyhow!("fallback shader failed to build: {err}"))?
            }
        };

        Ok(Self { pipeline })
    }
}

/// Creates the offscreen pipeline under a validation error scope so failures
/// surface as loggable diagnostics instead of device panics.
fn build_pass_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    fragment_source: &str,
    target_format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, compile::ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex_module = compile::create_module(
        device,
        "quad vertex",
        VERTEX_SHADER_GLSL,
        ShaderStage::Vertex,
    );
    let fragment_module = compile::create_module(
        device,
        "user fragment",
        fragment_source,
        ShaderStage::Fragment,
    );

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[position_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });

    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(compile::ShaderError::Link {
            message: error.to_string(),
        });
    }

    Ok(pipeline)
}

/// Builds the pass B pipeline that stretches the offscreen target over the
/// window surface. Its stages are trusted, so any failure here is fatal.
pub(crate) fn build_blit_pipeline(
    device: &wgpu::Device,
    layouts: &PipelineLayouts,
    surface_format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex_module =
        compile::create_module(device, "blit vertex", BLIT_VERTEX_GLSL, ShaderStage::Vertex);
    let fragment_module = compile::create_module(
        device,
        "blit fragment",
        BLIT_FRAGMENT_GLSL,
        ShaderStage::Fragment,
    );

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("blit pipeline layout"),
        bind_group_layouts: &[&layouts.blit_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("blit pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[position_layout(), texcoord_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });

    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        anyhow::bail!("blit pipeline failed to build: {error}");
    }

    Ok(pipeline)
}
