//! Owned 8-bit pixel buffers - the common currency between CPU and GPU paths.
//!
//! A `PixelBuffer` is a flat row-major array of interleaved RGB or RGBA
//! samples with no stride or padding. The length invariant
//! `data.len() == width * height * channels` holds for every constructed
//! value; buffers that would violate it are rejected at construction.

use crate::error::Error;

/// Flat, row-major 8-bit image with 3 (RGB) or 4 (RGBA) interleaved channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer.
    pub fn zeroed(width: u32, height: u32, channels: u8) -> Result<Self, Error> {
        check_channels(channels)?;
        let len = width as usize * height as usize * channels as usize;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0u8; len],
        })
    }

    /// Wrap existing pixel data, validating the length invariant.
    pub fn from_vec(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, Error> {
        check_channels(channels)?;
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(Error::BufferSize {
                width,
                height,
                channels,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Copy a decoded RGB image into a 3-channel buffer.
    pub fn from_rgb_image(img: &image::RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            channels: 3,
            data: img.as_raw().clone(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// RGB value at (x, y), ignoring alpha for 4-channel buffers.
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let c = self.channels as usize;
        let idx = (y as usize * self.width as usize + x as usize) * c;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Interleaved RGBA bytes for GPU upload. 3-channel buffers are expanded
    /// with alpha 255; 4-channel buffers are copied as-is.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        match self.channels {
            4 => self.data.clone(),
            _ => {
                let pixels = self.width as usize * self.height as usize;
                let mut out = Vec::with_capacity(pixels * 4);
                for rgb in self.data.chunks_exact(3) {
                    out.extend_from_slice(rgb);
                    out.push(255);
                }
                out
            }
        }
    }
}

fn check_channels(channels: u8) -> Result<(), Error> {
    match channels {
        3 | 4 => Ok(()),
        got => Err(Error::InputFormat { expected: 3, got }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_validates_length() {
        let err = PixelBuffer::from_vec(2, 2, 3, vec![0u8; 11]).unwrap_err();
        assert!(matches!(err, Error::BufferSize { len: 11, .. }));
        assert!(PixelBuffer::from_vec(2, 2, 3, vec![0u8; 12]).is_ok());
    }

    #[test]
    fn test_rejects_bad_channel_count() {
        let err = PixelBuffer::zeroed(2, 2, 2).unwrap_err();
        assert!(matches!(err, Error::InputFormat { got: 2, .. }));
    }

    #[test]
    fn test_rgba_expansion() {
        let buf = PixelBuffer::from_vec(2, 1, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buf.to_rgba_bytes(), vec![1, 2, 3, 255, 4, 5, 6, 255]);

        let rgba = PixelBuffer::from_vec(1, 1, 4, vec![9, 8, 7, 6]).unwrap();
        assert_eq!(rgba.to_rgba_bytes(), vec![9, 8, 7, 6]);
    }

    #[test]
    fn test_rgb_accessor() {
        let buf = PixelBuffer::from_vec(2, 2, 4, (0u8..16).collect()).unwrap();
        assert_eq!(buf.rgb(0, 0), [0, 1, 2]);
        assert_eq!(buf.rgb(1, 1), [12, 13, 14]);
    }
}
