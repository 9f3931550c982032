//! GPU context management - headless device and queue setup.
//!
//! Every pipeline here renders off-screen, so no surface or window is ever
//! created. The context is the single explicit device handle threaded through
//! all resource constructors; there is no ambient global graphics state.

use crate::error::Error;

/// Holds all wgpu state needed for off-screen filtering.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Create a new headless GPU context.
    pub fn new() -> Result<Self, Error> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> Result<Self, Error> {
        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Request adapter (GPU) - no compatible surface, we never present
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::NoAdapter)?;

        // Log adapter info
        let info = adapter.get_info();
        log::info!("Using GPU: {} ({:?})", info.name, info.backend);

        // Request device and queue
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Filter Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self { device, queue })
    }

    /// Device-wide synchronization point: blocks until every submitted
    /// command has completed. Required before reading back any image the
    /// GPU has written - skipping it can silently return partial data.
    pub fn wait(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }

    /// Largest texture dimension the device accepts.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
