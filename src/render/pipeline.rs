use wgpu::Device;

use crate::error::RenderError;
use crate::geometry::{GpuGeometry, Vertex};
use crate::render::frame::{FramePlan, PassKind};
use crate::render::texture::{DEPTH_FORMAT, RENDER_TARGET_FORMAT, TARGET_DEPTH_FORMAT};
use crate::render::uniforms::{
    FrameUniforms, InstanceUniforms, TextureSlot, aligned_stride, names,
};
use crate::shading::ShadingMode;

pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");

const IRRADIANCE_REQUIRED: &[&str] = &[
    names::ALBEDO,
    names::CAMERA_POSITION,
    names::MODEL_TRANSFORM,
    names::LOCAL_TO_PROJECTION,
    names::ALPHA,
    names::METALLIC,
    names::TEXTURE_CUBEMAP,
];

const PUNCTUAL_REQUIRED: &[&str] = &[
    names::ALBEDO,
    names::CAMERA_POSITION,
    names::MODEL_TRANSFORM,
    names::LOCAL_TO_PROJECTION,
    names::ALPHA,
    names::METALLIC,
];

const IMAGE_BASED_REQUIRED: &[&str] = &[
    names::ALBEDO,
    names::CAMERA_POSITION,
    names::MODEL_TRANSFORM,
    names::LOCAL_TO_PROJECTION,
    names::ALPHA,
    names::METALLIC,
    names::TEXTURE_DIFFUSE,
    names::TEXTURE_SPECULAR,
    names::TEXTURE_BRDF,
];

const TEXTURED_METAL_REQUIRED: &[&str] = &[
    names::ALBEDO,
    names::CAMERA_POSITION,
    names::MODEL_TRANSFORM,
    names::LOCAL_TO_PROJECTION,
    names::ALPHA,
    names::METALLIC,
    names::TEXTURE_METAL_COLOR,
    names::TEXTURE_METAL_METALLIC,
    names::TEXTURE_METAL_NORMAL,
    names::TEXTURE_METAL_ROUGHNESS,
    names::TEXTURE_BRDF,
];

/// Names that must be present in the merged table before a draw in `mode`.
pub fn required_uniforms(mode: ShadingMode) -> &'static [&'static str] {
    match mode {
        ShadingMode::IrradianceConvolution => IRRADIANCE_REQUIRED,
        ShadingMode::Punctual => PUNCTUAL_REQUIRED,
        ShadingMode::ImageBased => IMAGE_BASED_REQUIRED,
        ShadingMode::TexturedMetal => TEXTURED_METAL_REQUIRED,
    }
}

/// Colour and depth formats a pipeline renders into.
pub type AttachmentFormats = (wgpu::TextureFormat, wgpu::TextureFormat);

/// Formats of the offscreen target, see [`crate::render::RenderTarget`].
pub const OFFSCREEN_ATTACHMENTS: AttachmentFormats = (RENDER_TARGET_FORMAT, TARGET_DEPTH_FORMAT);

pub fn surface_attachments(surface_format: wgpu::TextureFormat) -> AttachmentFormats {
    (surface_format, DEPTH_FORMAT)
}

/// Upper bound on draws per frame; sizes the dynamic instance buffer.
pub const MAX_DRAWS: u64 = 25;

/// The compiled sphere program: one shader module, a pipeline per colour
/// target format, and the group 0 uniform buffers.
pub struct SphereProgram {
    pub surface_pipeline: wgpu::RenderPipeline,
    pub offscreen_pipeline: wgpu::RenderPipeline,
    pub environment_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_stride: u64,
}

impl SphereProgram {
    /// Compiles inside a validation error scope so a broken shader surfaces
    /// as [`RenderError::ProgramCompile`] instead of a panic on first use.
    pub async fn compile(
        device: &Device,
        surface_format: wgpu::TextureFormat,
        environment_layout: wgpu::BindGroupLayout,
    ) -> Result<Self, RenderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let instance_size = std::mem::size_of::<InstanceUniforms>() as u64;
        let instance_stride = aligned_stride(instance_size, alignment);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Uniform Buffer"),
            size: instance_stride * MAX_DRAWS,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FrameUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(instance_size),
                    },
                    count: None,
                },
            ],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &instance_buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(instance_size),
                    }),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &environment_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, (format, depth_format): AttachmentFormats| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        let surface_pipeline =
            make_pipeline("Sphere Surface Pipeline", surface_attachments(surface_format));
        let offscreen_pipeline = make_pipeline("Sphere Offscreen Pipeline", OFFSCREEN_ATTACHMENTS);

        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderError::ProgramCompile {
                label: "sphere".to_string(),
                message: err.to_string(),
            });
        }
        log::info!(
            "Sphere program compiled (surface {:?}, offscreen {:?}, instance stride {})",
            surface_format,
            RENDER_TARGET_FORMAT,
            instance_stride
        );

        Ok(Self {
            surface_pipeline,
            offscreen_pipeline,
            environment_layout,
            frame_buffer,
            instance_buffer,
            uniform_bind_group,
            instance_stride,
        })
    }

    /// Merges, validates and uploads every uniform block the plan needs.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, plan: &FramePlan) -> Result<(), RenderError> {
        let frame = FrameUniforms::from_table(&plan.base, plan.mode, plan.viewport)?;
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        for (index, draw) in plan.draws.iter().take(MAX_DRAWS as usize).enumerate() {
            let merged = plan.uniforms_for(draw)?;
            let block = InstanceUniforms::from_table(&merged)?;
            queue.write_buffer(
                &self.instance_buffer,
                index as u64 * self.instance_stride,
                bytemuck::bytes_of(&block),
            );
        }
        Ok(())
    }

    /// One indexed draw per planned instance, each with its own dynamic
    /// offset into the instance buffer.
    pub fn record(
        &self,
        rpass: &mut wgpu::RenderPass<'_>,
        plan: &FramePlan,
        geometry: &GpuGeometry,
        environment: &wgpu::BindGroup,
    ) {
        let pipeline = match plan.pass {
            PassKind::OffscreenPrecompute => &self.offscreen_pipeline,
            PassKind::ForwardShading => &self.surface_pipeline,
        };
        rpass.set_viewport(
            0.0,
            0.0,
            plan.viewport.0 as f32,
            plan.viewport.1 as f32,
            0.0,
            1.0,
        );
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(1, environment, &[]);
        geometry.bind(rpass);
        for index in 0..plan.draws.len().min(MAX_DRAWS as usize) {
            let offset = (index as u64 * self.instance_stride) as wgpu::DynamicOffset;
            rpass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
            geometry.draw(rpass);
        }
    }
}

/// Texture slots a mode samples, for logging which inputs are live.
pub fn sampled_slots(mode: ShadingMode) -> Vec<TextureSlot> {
    required_uniforms(mode)
        .iter()
        .filter_map(|name| {
            TextureSlot::ALL
                .into_iter()
                .find(|slot| slot.uniform_name() == *name)
        })
        .collect()
}
