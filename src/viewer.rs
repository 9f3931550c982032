//! minifb display of a filtered result for visual inspection.

use minifb::{Key, Window, WindowOptions};

use crate::buffer::PixelBuffer;
use crate::error::Error;

/// Show the buffer in a window until ESC is pressed or the window closes.
pub fn show(title: &str, image: &PixelBuffer) -> Result<(), Error> {
    let width = image.width() as usize;
    let height = image.height() as usize;

    // Pack pixels as 0RGB u32 for minifb
    let mut buffer = vec![0u32; width * height];
    for y in 0..height {
        for x in 0..width {
            let [r, g, b] = image.rgb(x as u32, y as u32);
            buffer[y * width + x] = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        }
    }

    let mut window = Window::new(
        &format!("{title} (ESC to close)"),
        width,
        height,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    )
    .map_err(|e| Error::Viewer(e.to_string()))?;
    window.set_target_fps(60);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| Error::Viewer(e.to_string()))?;
    }

    Ok(())
}
