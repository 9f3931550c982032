//! Benchmark harness: runs every filter variant over a range of upscaled
//! image sizes and collects wall-clock timings.
//!
//! Inherently sequential - each factor is resized, then timed through CPU
//! serial, CPU parallel, raster GPU and compute GPU in that order. GPU
//! timings cover upload + execute + read-back with fresh per-factor
//! resources; the two programs are built once (compilation is
//! size-independent).

use std::time::Instant;

use crate::buffer::PixelBuffer;
use crate::error::Error;
use crate::filter;
use crate::gpu::compute::ComputeFilter;
use crate::gpu::context::GpuContext;
use crate::gpu::raster::RasterFilter;
use crate::gpu::target::RenderTarget;
use crate::gpu::texture::GpuImage;

/// One row of benchmark output.
#[derive(Debug, Clone)]
pub struct TimingRecord {
    pub scale_factor: u32,
    pub pixel_count: u64,
    pub cpu_serial_ms: f64,
    pub cpu_parallel_ms: f64,
    pub raster_ms: f64,
    pub compute_ms: f64,
}

/// Drives all filter variants over a fixed base image and scale factors.
pub struct BenchmarkHarness {
    base: image::RgbImage,
    factors: Vec<u32>,
}

impl BenchmarkHarness {
    pub fn new(base: image::RgbImage, factors: Vec<u32>) -> Self {
        Self { base, factors }
    }

    /// Run the full sequence, returning one record per scale factor.
    pub fn run(&self, ctx: &GpuContext) -> Result<Vec<TimingRecord>, Error> {
        let raster = RasterFilter::new(ctx)?;
        let compute = ComputeFilter::new(ctx)?;

        let mut records = Vec::with_capacity(self.factors.len());
        for &factor in &self.factors {
            let width = self.base.width() * factor;
            let height = self.base.height() * factor;
            log::info!("benchmark: factor {factor} ({width}x{height})");

            let resized = image::imageops::resize(
                &self.base,
                width,
                height,
                image::imageops::FilterType::Triangle,
            );
            let input = PixelBuffer::from_rgb_image(&resized);

            let start = Instant::now();
            let _ = filter::apply(&input, false)?;
            let cpu_serial_ms = start.elapsed().as_secs_f64() * 1000.0;

            let start = Instant::now();
            let _ = filter::apply(&input, true)?;
            let cpu_parallel_ms = start.elapsed().as_secs_f64() * 1000.0;

            let start = Instant::now();
            {
                let gpu_input = GpuImage::from_pixels(ctx, &input)?;
                let target = RenderTarget::create(ctx, width, height)?;
                raster.run(ctx, &gpu_input, &target);
                let _ = target.color_attachment().read_back(ctx)?;
            }
            let raster_ms = start.elapsed().as_secs_f64() * 1000.0;

            let start = Instant::now();
            {
                let gpu_input = GpuImage::from_pixels(ctx, &input)?;
                let gpu_output = GpuImage::new_storage(ctx, width, height)?;
                compute.run(ctx, &gpu_input, &gpu_output);
                let _ = gpu_output.read_back(ctx)?;
            }
            let compute_ms = start.elapsed().as_secs_f64() * 1000.0;

            records.push(TimingRecord {
                scale_factor: factor,
                pixel_count: width as u64 * height as u64,
                cpu_serial_ms,
                cpu_parallel_ms,
                raster_ms,
                compute_ms,
            });
        }

        Ok(records)
    }
}

/// Print the collected records as a table.
pub fn print_records(records: &[TimingRecord]) {
    println!(
        "{:>6} {:>12} {:>12} {:>14} {:>10} {:>11}",
        "scale", "pixels", "cpu (ms)", "cpu par (ms)", "raster", "compute"
    );
    for r in records {
        println!(
            "{:>6} {:>12} {:>12.3} {:>14.3} {:>10.3} {:>11.3}",
            r.scale_factor,
            r.pixel_count,
            r.cpu_serial_ms,
            r.cpu_parallel_ms,
            r.raster_ms,
            r.compute_ms
        );
    }
}
