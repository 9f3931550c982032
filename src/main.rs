mod bench;
mod buffer;
mod error;
mod filter;
mod gpu;
mod viewer;

#[cfg(test)]
mod tests;

// Re-export public API
pub use bench::{BenchmarkHarness, TimingRecord, print_records};
pub use buffer::PixelBuffer;
pub use error::Error;
pub use filter::KERNEL;

use std::time::Instant;

use gpu::compute::ComputeFilter;
use gpu::context::GpuContext;
use gpu::raster::RasterFilter;
use gpu::target::RenderTarget;
use gpu::texture::GpuImage;

fn main() {
    env_logger::init();

    // Check for command line arguments
    let args: Vec<String> = std::env::args().collect();

    let result = if args.len() > 1 && args[1] == "--benchmark" {
        run_benchmark(args.get(2).map(String::as_str))
    } else {
        run_filter(args.get(1).map(String::as_str))
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Run every filter variant once, print timings, display the CPU result.
fn run_filter(path: Option<&str>) -> Result<(), Error> {
    let base = load_base(path)?;
    let input = PixelBuffer::from_rgb_image(&base);
    println!("Input: {}x{}", input.width(), input.height());

    let start = Instant::now();
    let cpu_output = filter::apply(&input, false)?;
    println!("CPU serial:   {:8.3} ms", ms_since(start));

    let start = Instant::now();
    let _ = filter::apply(&input, true)?;
    println!("CPU parallel: {:8.3} ms", ms_since(start));

    let ctx = GpuContext::new()?;
    let raster = RasterFilter::new(&ctx)?;
    let compute = ComputeFilter::new(&ctx)?;

    let start = Instant::now();
    let gpu_input = GpuImage::from_pixels(&ctx, &input)?;
    let target = RenderTarget::create(&ctx, input.width(), input.height())?;
    raster.run(&ctx, &gpu_input, &target);
    let _ = target.color_attachment().read_back(&ctx)?;
    println!("GPU raster:   {:8.3} ms", ms_since(start));

    let start = Instant::now();
    let gpu_input = GpuImage::from_pixels(&ctx, &input)?;
    let gpu_output = GpuImage::new_storage(&ctx, input.width(), input.height())?;
    compute.run(&ctx, &gpu_input, &gpu_output);
    let _ = gpu_output.read_back(&ctx)?;
    println!("GPU compute:  {:8.3} ms", ms_since(start));

    viewer::show("Edge Filter - CPU output", &cpu_output)
}

/// Run the benchmark harness over scale factors [1, 2, 3, 4].
fn run_benchmark(path: Option<&str>) -> Result<(), Error> {
    let base = load_base(path)?;
    println!("=== Edge Filter Benchmark ===");
    println!("Base image: {}x{}\n", base.width(), base.height());

    let ctx = GpuContext::new()?;
    let harness = BenchmarkHarness::new(base, vec![1, 2, 3, 4]);
    let records = harness.run(&ctx)?;
    print_records(&records);

    Ok(())
}

/// Decode the given file, or synthesize a test pattern when no path is given.
fn load_base(path: Option<&str>) -> Result<image::RgbImage, Error> {
    match path {
        Some(p) => Ok(image::open(p)?.to_rgb8()),
        None => Ok(test_pattern(512, 384)),
    }
}

/// Checkerboard-plus-ramp pattern with plenty of edges for the kernel to find.
fn test_pattern(width: u32, height: u32) -> image::RgbImage {
    image::RgbImage::from_fn(width, height, |x, y| {
        let checker: u8 = if (x / 32 + y / 32) % 2 == 0 { 200 } else { 40 };
        let ramp = (x * 255 / width.max(1)) as u8;
        image::Rgb([checker, ramp, ((x ^ y) & 0xff) as u8])
    })
}

fn ms_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
