//! Off-screen render target for the raster filter pass.
//!
//! Owns exactly one color attachment. There is no bind/unbind state machine:
//! the attachment view is only ever installed for the duration of a single
//! `begin_render_pass` scope, so at most one target is active at a time and
//! nested binds cannot occur.

use crate::error::Error;
use crate::gpu::context::GpuContext;
use crate::gpu::texture::GpuImage;

/// Off-screen destination composed of one RGBA8 color attachment.
#[derive(Debug)]
pub struct RenderTarget {
    attachment: GpuImage,
}

impl RenderTarget {
    /// Allocate a render-capable attachment of the given size.
    ///
    /// Fails with a device-resource error when the configuration would be
    /// rejected (zero dimensions, over the texture limit) - the wgpu analog
    /// of a framebuffer completeness check.
    pub fn create(ctx: &GpuContext, width: u32, height: u32) -> Result<Self, Error> {
        let attachment = GpuImage::new_render_attachment(ctx, width, height)?;
        Ok(Self { attachment })
    }

    pub fn width(&self) -> u32 {
        self.attachment.width
    }

    pub fn height(&self) -> u32 {
        self.attachment.height
    }

    /// The backing image, for read-back once the pass has ended.
    pub fn color_attachment(&self) -> &GpuImage {
        &self.attachment
    }

    /// View to install as the pass's sole color attachment.
    pub(crate) fn attachment_view(&self) -> &wgpu::TextureView {
        &self.attachment.view
    }
}
