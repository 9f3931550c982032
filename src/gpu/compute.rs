//! Compute variant of the filter program: one invocation per output pixel,
//! dispatched directly over paired read/write images - no rasterization.
//!
//! Border policy: neighborhood coordinates are clamped to the image extent
//! (clamp-to-edge), unlike the raster pass (wrap) and the CPU pass (zero
//! border).

use crate::error::Error;
use crate::gpu::context::GpuContext;
use crate::gpu::texture::GpuImage;

/// Invocations per workgroup dimension; the dispatch rounds up and the
/// shader guards out-of-bounds global IDs.
const WORKGROUP_SIZE: u32 = 8;

/// Compiled compute filter program.
///
/// As with the raster variant, construction fails with the validation
/// diagnostic rather than producing an unusable program.
pub struct ComputeFilter {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl ComputeFilter {
    /// Compile the compute program.
    pub fn new(ctx: &GpuContext) -> Result<Self, Error> {
        let device = &ctx.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Compute Filter Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/compute.wgsl").into()),
        });

        // Fixed binding contract: input image at 0, output image at 1.
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Compute Filter Bind Group Layout"),
            entries: &[
                // input image (read-only)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // output image (write-only storage)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Compute Filter Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Compute Filter Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(Error::Program {
                stage: "compute",
                message: err.to_string(),
            });
        }

        log::debug!("compute filter program built");

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }

    /// Dispatch one invocation per pixel of `output`, then fully synchronize
    /// the device so the caller may read `output` back immediately.
    pub fn run(&self, ctx: &GpuContext, input: &GpuImage, output: &GpuImage) {
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Compute Filter Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&input.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&output.view),
                },
            ],
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Compute Filter Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Compute Filter Pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);

            // Ceiling division: every pixel covered even when the extent is
            // not a multiple of the workgroup size.
            let workgroups_x = (output.width + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
            let workgroups_y = (output.height + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
            compute_pass.dispatch_workgroups(workgroups_x, workgroups_y, 1);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        // Full device sync: writes to `output` are visible before we return.
        ctx.wait();
    }
}
