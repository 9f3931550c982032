//! Device-resident RGBA8 images: upload, storage allocation, and read-back.
//!
//! `GpuImage` owns its wgpu texture; dropping it releases the device memory
//! on every exit path, so repeated benchmark iterations cannot leak.
//! Read-back goes through a 256-byte-row-aligned staging buffer and a full
//! device sync - wgpu requires the alignment, correctness requires the sync.

use crate::buffer::PixelBuffer;
use crate::error::Error;
use crate::gpu::context::GpuContext;

/// wgpu requires `bytes_per_row` in texture/buffer copies to be a multiple
/// of this value; read-back rows are padded up to it and stripped after.
const COPY_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// An RGBA8 2D image resident on the GPU. Format and dimensions are fixed
/// at creation.
#[derive(Debug)]
pub struct GpuImage {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl GpuImage {
    /// Upload a `PixelBuffer` as a sampled input image. 3-channel buffers
    /// are expanded to RGBA on the way up.
    pub fn from_pixels(ctx: &GpuContext, pixels: &PixelBuffer) -> Result<Self, Error> {
        let img = Self::create(
            ctx,
            "Input Image",
            pixels.width(),
            pixels.height(),
            wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
        )?;

        let rgba = pixels.to_rgba_bytes();
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &img.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(img.width * 4),
                rows_per_image: Some(img.height),
            },
            wgpu::Extent3d {
                width: img.width,
                height: img.height,
                depth_or_array_layers: 1,
            },
        );

        Ok(img)
    }

    /// Allocate an empty image the compute pass can write into.
    pub fn new_storage(ctx: &GpuContext, width: u32, height: u32) -> Result<Self, Error> {
        Self::create(
            ctx,
            "Storage Image",
            width,
            height,
            wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        )
    }

    /// Allocate an empty image usable as a render-pass color attachment.
    pub(crate) fn new_render_attachment(
        ctx: &GpuContext,
        width: u32,
        height: u32,
    ) -> Result<Self, Error> {
        Self::create(
            ctx,
            "Color Attachment",
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        )
    }

    fn create(
        ctx: &GpuContext,
        label: &str,
        width: u32,
        height: u32,
        usage: wgpu::TextureUsages,
    ) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::DeviceResource(format!(
                "{label}: zero-sized image ({width}x{height})"
            )));
        }
        let max = ctx.max_texture_dimension();
        if width > max || height > max {
            return Err(Error::DeviceResource(format!(
                "{label}: {width}x{height} exceeds device texture limit {max}"
            )));
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Rgba8Unorm (not sRGB): bytes survive upload/read-back unchanged
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        log::debug!("created {label} {width}x{height}");

        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }

    /// Copy the image back to host memory as a 4-channel `PixelBuffer`.
    ///
    /// Blocks until all GPU work writing to this image has completed: the
    /// copy is submitted, then the device is fully synchronized before the
    /// mapped bytes are consumed.
    pub fn read_back(&self, ctx: &GpuContext) -> Result<PixelBuffer, Error> {
        let row_bytes = self.width * 4;
        let aligned_row = align_to(row_bytes, COPY_ALIGNMENT);
        let readback_size = (aligned_row * self.height) as u64;

        let readback_buf = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Read-back Buffer"),
            size: readback_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Read-back Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback_buf,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(aligned_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        // Map is async in wgpu's API; block on it via a channel + full poll.
        let buf_slice = readback_buf.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buf_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        ctx.wait();
        receiver
            .recv()
            .map_err(|_| Error::DeviceResource("read-back map callback never fired".into()))?
            .map_err(|e| Error::DeviceResource(format!("read-back map failed: {e}")))?;

        // Strip the per-row alignment padding.
        let mapped = buf_slice.get_mapped_range();
        let mut out = vec![0u8; (row_bytes * self.height) as usize];
        for y in 0..self.height as usize {
            let src = y * aligned_row as usize;
            let dst = y * row_bytes as usize;
            out[dst..dst + row_bytes as usize]
                .copy_from_slice(&mapped[src..src + row_bytes as usize]);
        }
        drop(mapped);
        readback_buf.unmap();

        PixelBuffer::from_vec(self.width, self.height, 4, out)
    }
}

/// Round `value` up to the next multiple of `alignment`.
#[inline]
pub(crate) fn align_to(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) / alignment * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to_already_aligned() {
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(512, 256), 512);
    }

    #[test]
    fn test_align_to_rounds_up() {
        assert_eq!(align_to(1, 256), 256);
        assert_eq!(align_to(255, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        // 640 pixels * 4 bytes = 2560, already a multiple of 256.
        assert_eq!(align_to(640 * 4, 256), 2560);
    }
}
