//! CPU reference implementation of the 3x3 edge filter.
//!
//! Border policy: interior pixels only (rows and columns [1, n-2]); border
//! pixels are left at zero. The GPU variants use different border policies
//! (wrap for the raster pass, clamp for the compute pass) - the three are
//! intentionally kept distinct.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::Error;

/// Laplacian edge kernel, shared verbatim by the CPU path and both shaders.
pub const KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, -8.0, 1.0, 1.0, 1.0, 1.0];

/// Apply the kernel to a 3-channel buffer.
///
/// `parallel == false` runs a plain sequential loop and never touches the
/// rayon pool; `parallel == true` partitions the interior rows across worker
/// threads. Both produce byte-identical output - each output pixel is written
/// by exactly one thread and the input is read-only during the pass.
pub fn apply(input: &PixelBuffer, parallel: bool) -> Result<PixelBuffer, Error> {
    if input.channels() != 3 {
        return Err(Error::InputFormat {
            expected: 3,
            got: input.channels(),
        });
    }

    let w = input.width() as usize;
    let h = input.height() as usize;
    let mut output = PixelBuffer::zeroed(input.width(), input.height(), 3)?;

    // Images too small to have interior pixels come back all zero.
    if w < 3 || h < 3 {
        return Ok(output);
    }

    let row_bytes = w * 3;
    let interior = &mut output.data_mut()[row_bytes..row_bytes * (h - 1)];

    if parallel {
        interior
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(i, row)| filter_row(input, i + 1, row));
    } else {
        for (i, row) in interior.chunks_mut(row_bytes).enumerate() {
            filter_row(input, i + 1, row);
        }
    }

    Ok(output)
}

/// Convolve one interior row. `row` is the full output row y; columns 0 and
/// w-1 are left untouched (zero border).
fn filter_row(input: &PixelBuffer, y: usize, row: &mut [u8]) {
    let w = input.width() as usize;
    let data = input.data();

    for x in 1..w - 1 {
        for c in 0..3 {
            let mut sum = 0.0f32;
            for ky in 0..3 {
                let row_base = ((y + ky - 1) * w + (x - 1)) * 3 + c;
                sum += data[row_base] as f32 * KERNEL[ky * 3];
                sum += data[row_base + 3] as f32 * KERNEL[ky * 3 + 1];
                sum += data[row_base + 6] as f32 * KERNEL[ky * 3 + 2];
            }
            // Saturating cast: round to nearest, clamp to [0, 255].
            row[x * 3 + c] = sum.round().clamp(0.0, 255.0) as u8;
        }
    }
}
