//! Raster variant of the filter program: a full-screen quad rendered into an
//! off-screen target, with the convolution evaluated per fragment.
//!
//! Border policy: the input sampler uses repeat addressing, so neighborhood
//! samples past the edge wrap around to the opposite side. This differs from
//! both the CPU path (zero border) and the compute path (clamp) on purpose.

use wgpu::util::DeviceExt;

use crate::error::Error;
use crate::gpu::context::GpuContext;
use crate::gpu::target::RenderTarget;
use crate::gpu::texture::GpuImage;

/// Dimension uniforms for the fragment stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FilterUniforms {
    width: f32,
    height: f32,
}

/// One quad vertex: clip-space position + texture coordinate, interleaved.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadVertex {
    position: [f32; 2],
    tex_coord: [f32; 2],
}

/// Two triangles covering the full clip-space square. Texture coordinate
/// (0, 0) maps to the top-left of the target so the output keeps the input's
/// row order.
const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { position: [-1.0, -1.0], tex_coord: [0.0, 1.0] },
    QuadVertex { position: [1.0, -1.0], tex_coord: [1.0, 1.0] },
    QuadVertex { position: [1.0, 1.0], tex_coord: [1.0, 0.0] },
    QuadVertex { position: [-1.0, -1.0], tex_coord: [0.0, 1.0] },
    QuadVertex { position: [1.0, 1.0], tex_coord: [1.0, 0.0] },
    QuadVertex { position: [-1.0, 1.0], tex_coord: [0.0, 0.0] },
];

/// Compiled vertex + fragment filter program.
///
/// A value of this type only exists if the shader module and pipeline passed
/// validation - a failed build returns `Error::Program` with the diagnostic
/// and leaves nothing runnable behind.
pub struct RasterFilter {
    render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
}

impl RasterFilter {
    /// Compile and link the raster program.
    pub fn new(ctx: &GpuContext) -> Result<Self, Error> {
        let device = &ctx.device;

        // Capture compile/link diagnostics instead of panicking on them.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Raster Filter Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/raster.wgsl").into()),
        });

        // Bind group layout: input texture + sampler + dimension uniforms
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Raster Filter Bind Group Layout"),
            entries: &[
                // input texture
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
                // sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Raster Filter Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Raster Filter Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        // position
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 0,
                        },
                        // tex_coord
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 8,
                            shader_location: 1,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: Some(wgpu::BlendState::REPLACE),
                    // This variant does not write alpha; the attachment keeps
                    // its cleared alpha value.
                    write_mask: wgpu::ColorWrites::COLOR,
                })],
                compilation_options: Default::default(),
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
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(Error::Program {
                stage: "raster",
                message: err.to_string(),
            });
        }

        // Repeat addressing is this variant's border policy; nearest
        // filtering keeps samples at texel centers exact.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Raster Filter Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Raster Filter Uniform Buffer"),
            size: std::mem::size_of::<FilterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Full-screen Quad"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        log::debug!("raster filter program built");

        Ok(Self {
            render_pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            vertex_buffer,
        })
    }

    /// Render the filtered input into the target's color attachment.
    ///
    /// Issues a fixed 6-vertex draw inside a single scoped render pass, then
    /// synchronizes the device so the attachment is safe to read back
    /// immediately.
    pub fn run(&self, ctx: &GpuContext, input: &GpuImage, target: &RenderTarget) {
        ctx.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[FilterUniforms {
                width: target.width() as f32,
                height: target.height() as f32,
            }]),
        );

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Raster Filter Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&input.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Raster Filter Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Raster Filter Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.attachment_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Opaque black: the fragment stage leaves alpha alone.
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..6, 0..1);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        // No implicit present barrier off-screen, so sync before read-back.
        ctx.wait();
    }
}
