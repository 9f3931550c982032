//! Error taxonomy for the filter pipelines.
//!
//! Three classes, none retried:
//! - device/resource errors (adapter, allocation, attachment) are fatal
//! - program errors carry the compiler diagnostic; a program that failed to
//!   build is never constructed, so it can never be run
//! - input format errors are rejected before any processing starts

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No usable GPU adapter was found.
    #[error("no suitable GPU adapter found")]
    NoAdapter,

    /// The adapter refused to create a device.
    #[error("GPU device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// The device rejected a resource configuration (zero-sized attachment,
    /// dimensions over the texture limit, allocation failure).
    #[error("device rejected resource: {0}")]
    DeviceResource(String),

    /// Shader compilation or pipeline creation failed. The diagnostic text
    /// comes straight from wgpu's validation layer.
    #[error("{stage} program failed to build: {message}")]
    Program { stage: &'static str, message: String },

    /// The CPU filter only accepts interleaved RGB input.
    #[error("expected a {expected}-channel image, got {got} channels")]
    InputFormat { expected: u8, got: u8 },

    /// Pixel data length does not match width * height * channels.
    #[error("pixel data length {len} does not match {width}x{height}x{channels}")]
    BufferSize {
        width: u32,
        height: u32,
        channels: u8,
        len: usize,
    },

    /// Image file could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The minifb display window failed.
    #[error("viewer error: {0}")]
    Viewer(String),
}
