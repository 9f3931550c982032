//! Cross-variant tests for the edge filter.
//!
//! Pure CPU tests live next to their modules; this file holds the tests that
//! exercise the GPU paths and the equivalence contract between variants.
//! GPU tests are `#[ignore]` so `cargo test` passes on machines without an
//! adapter - run them with `cargo test -- --include-ignored`.

use crate::bench::BenchmarkHarness;
use crate::buffer::PixelBuffer;
use crate::error::Error;
use crate::filter;
use crate::gpu::compute::ComputeFilter;
use crate::gpu::context::GpuContext;
use crate::gpu::raster::RasterFilter;
use crate::gpu::target::RenderTarget;
use crate::gpu::texture::GpuImage;

/// Smooth-ish deterministic RGB test image.
fn gradient_rgb(w: u32, h: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::zeroed(w, h, 3).unwrap();
    for y in 0..h as usize {
        for x in 0..w as usize {
            for c in 0..3 {
                buf.data_mut()[(y * w as usize + x) * 3 + c] =
                    ((x * 3 + y * 2 + c * 11) % 256) as u8;
            }
        }
    }
    buf
}

/// Horizontal ramp (all channels = x * 16) - constant along y, so border
/// differences between the three variants show up cleanly at column 0.
fn horizontal_ramp() -> PixelBuffer {
    let mut buf = PixelBuffer::zeroed(16, 16, 3).unwrap();
    for y in 0..16usize {
        for x in 0..16usize {
            for c in 0..3 {
                buf.data_mut()[(y * 16 + x) * 3 + c] = (x * 16) as u8;
            }
        }
    }
    buf
}

fn assert_rgb_close(a: [u8; 3], b: [u8; 3], tol: i16, context: &str) {
    for c in 0..3 {
        let diff = (a[c] as i16 - b[c] as i16).abs();
        assert!(diff <= tol, "{context}: {a:?} vs {b:?} (channel {c})");
    }
}

// ---- GPU round trip ------------------------------------------------------

#[test]
#[ignore = "requires a GPU adapter"]
fn test_upload_readback_round_trip() {
    let ctx = GpuContext::new().unwrap();
    // Odd dimensions so read-back rows need alignment padding.
    let input = gradient_rgb(33, 17);

    let img = GpuImage::from_pixels(&ctx, &input).unwrap();
    let back = img.read_back(&ctx).unwrap();

    assert_eq!(back.width(), 33);
    assert_eq!(back.height(), 17);
    assert_eq!(back.channels(), 4);
    for y in 0..17 {
        for x in 0..33 {
            assert_eq!(back.rgb(x, y), input.rgb(x, y), "mismatch at ({x},{y})");
        }
    }
    // Expanded alpha survives the trip.
    assert!(back.data().chunks_exact(4).all(|p| p[3] == 255));
}

// ---- CPU/GPU equivalence on interior pixels ------------------------------

#[test]
#[ignore = "requires a GPU adapter"]
fn test_compute_matches_cpu_interior() {
    let ctx = GpuContext::new().unwrap();
    let input = gradient_rgb(64, 48);
    let cpu = filter::apply(&input, false).unwrap();

    let compute = ComputeFilter::new(&ctx).unwrap();
    let gpu_input = GpuImage::from_pixels(&ctx, &input).unwrap();
    let gpu_output = GpuImage::new_storage(&ctx, 64, 48).unwrap();
    compute.run(&ctx, &gpu_input, &gpu_output);
    let result = gpu_output.read_back(&ctx).unwrap();

    // Interior pixels share the same math; only unorm rounding differs.
    for y in 1..47 {
        for x in 1..63 {
            assert_rgb_close(
                result.rgb(x, y),
                cpu.rgb(x, y),
                1,
                &format!("compute vs cpu at ({x},{y})"),
            );
        }
    }
}

#[test]
#[ignore = "requires a GPU adapter"]
fn test_raster_matches_cpu_interior() {
    let ctx = GpuContext::new().unwrap();
    let input = gradient_rgb(64, 48);
    let cpu = filter::apply(&input, false).unwrap();

    let raster = RasterFilter::new(&ctx).unwrap();
    let gpu_input = GpuImage::from_pixels(&ctx, &input).unwrap();
    let target = RenderTarget::create(&ctx, 64, 48).unwrap();
    raster.run(&ctx, &gpu_input, &target);
    let result = target.color_attachment().read_back(&ctx).unwrap();

    for y in 1..47 {
        for x in 1..63 {
            assert_rgb_close(
                result.rgb(x, y),
                cpu.rgb(x, y),
                1,
                &format!("raster vs cpu at ({x},{y})"),
            );
        }
    }
}

// ---- Idempotence with fresh resources ------------------------------------

#[test]
#[ignore = "requires a GPU adapter"]
fn test_raster_idempotent() {
    let ctx = GpuContext::new().unwrap();
    let input = gradient_rgb(40, 30);
    let raster = RasterFilter::new(&ctx).unwrap();

    let run_once = || {
        let gpu_input = GpuImage::from_pixels(&ctx, &input).unwrap();
        let target = RenderTarget::create(&ctx, 40, 30).unwrap();
        raster.run(&ctx, &gpu_input, &target);
        target.color_attachment().read_back(&ctx).unwrap()
    };

    let a = run_once();
    let b = run_once();
    assert_eq!(a.data(), b.data());
}

#[test]
#[ignore = "requires a GPU adapter"]
fn test_compute_idempotent() {
    let ctx = GpuContext::new().unwrap();
    let input = gradient_rgb(40, 30);
    let compute = ComputeFilter::new(&ctx).unwrap();

    let run_once = || {
        let gpu_input = GpuImage::from_pixels(&ctx, &input).unwrap();
        let gpu_output = GpuImage::new_storage(&ctx, 40, 30).unwrap();
        compute.run(&ctx, &gpu_input, &gpu_output);
        gpu_output.read_back(&ctx).unwrap()
    };

    let a = run_once();
    let b = run_once();
    assert_eq!(a.data(), b.data());
}

// ---- Flat input filters to zero everywhere -------------------------------

#[test]
#[ignore = "requires a GPU adapter"]
fn test_flat_image_is_zero_in_all_variants() {
    let ctx = GpuContext::new().unwrap();
    let flat = PixelBuffer::from_vec(24, 24, 3, vec![128u8; 24 * 24 * 3]).unwrap();

    // Every border policy sees the same 128 on a flat image, so the
    // zero-sum kernel yields zero at every pixel, borders included.
    let compute = ComputeFilter::new(&ctx).unwrap();
    let gpu_input = GpuImage::from_pixels(&ctx, &flat).unwrap();
    let gpu_output = GpuImage::new_storage(&ctx, 24, 24).unwrap();
    compute.run(&ctx, &gpu_input, &gpu_output);
    let result = gpu_output.read_back(&ctx).unwrap();
    for y in 0..24 {
        for x in 0..24 {
            assert_eq!(result.rgb(x, y), [0, 0, 0], "compute at ({x},{y})");
        }
    }

    let raster = RasterFilter::new(&ctx).unwrap();
    let gpu_input = GpuImage::from_pixels(&ctx, &flat).unwrap();
    let target = RenderTarget::create(&ctx, 24, 24).unwrap();
    raster.run(&ctx, &gpu_input, &target);
    let result = target.color_attachment().read_back(&ctx).unwrap();
    for y in 0..24 {
        for x in 0..24 {
            assert_eq!(result.rgb(x, y), [0, 0, 0], "raster at ({x},{y})");
        }
    }
}

// ---- The three border policies stay distinct -----------------------------

#[test]
#[ignore = "requires a GPU adapter"]
fn test_border_policies_diverge() {
    // On a horizontal ramp, column 0 of an interior row separates the three
    // policies:
    //   CPU (zero border):      exactly 0
    //   compute (clamp):        3 * (v(1) - v(0)) = 48
    //   raster (wrap):          picks up the bright far column, saturates
    let ctx = GpuContext::new().unwrap();
    let ramp = horizontal_ramp();

    let cpu = filter::apply(&ramp, false).unwrap();
    assert_eq!(cpu.rgb(0, 8), [0, 0, 0]);

    let compute = ComputeFilter::new(&ctx).unwrap();
    let gpu_input = GpuImage::from_pixels(&ctx, &ramp).unwrap();
    let gpu_output = GpuImage::new_storage(&ctx, 16, 16).unwrap();
    compute.run(&ctx, &gpu_input, &gpu_output);
    let compute_out = gpu_output.read_back(&ctx).unwrap();
    assert_rgb_close(compute_out.rgb(0, 8), [48, 48, 48], 3, "compute border");

    let raster = RasterFilter::new(&ctx).unwrap();
    let gpu_input = GpuImage::from_pixels(&ctx, &ramp).unwrap();
    let target = RenderTarget::create(&ctx, 16, 16).unwrap();
    raster.run(&ctx, &gpu_input, &target);
    let raster_out = target.color_attachment().read_back(&ctx).unwrap();
    assert_eq!(raster_out.rgb(0, 8), [255, 255, 255], "raster border");

    // Pairwise distinct - these must never be unified.
    assert_ne!(cpu.rgb(0, 8), compute_out.rgb(0, 8));
    assert_ne!(compute_out.rgb(0, 8), raster_out.rgb(0, 8));
    assert_ne!(cpu.rgb(0, 8), raster_out.rgb(0, 8));
}

// ---- Resource validation -------------------------------------------------

#[test]
#[ignore = "requires a GPU adapter"]
fn test_zero_sized_target_rejected() {
    let ctx = GpuContext::new().unwrap();
    let err = RenderTarget::create(&ctx, 0, 16).unwrap_err();
    assert!(matches!(err, Error::DeviceResource(_)));
    let err = GpuImage::new_storage(&ctx, 16, 0).unwrap_err();
    assert!(matches!(err, Error::DeviceResource(_)));
}

// ---- Benchmark harness ---------------------------------------------------

#[test]
#[ignore = "requires a GPU adapter"]
fn test_harness_produces_one_record_per_factor() {
    let ctx = GpuContext::new().unwrap();
    let base = image::RgbImage::from_fn(16, 12, |x, y| {
        image::Rgb([(x * 16) as u8, (y * 20) as u8, 128])
    });

    let harness = BenchmarkHarness::new(base, vec![1, 2]);
    let records = harness.run(&ctx).unwrap();

    assert_eq!(records.len(), 2);
    for (record, factor) in records.iter().zip([1u64, 2]) {
        assert_eq!(record.scale_factor as u64, factor);
        assert_eq!(record.pixel_count, (16 * factor) * (12 * factor));
        assert!(record.cpu_serial_ms >= 0.0);
        assert!(record.cpu_parallel_ms >= 0.0);
        assert!(record.raster_ms >= 0.0);
        assert!(record.compute_ms >= 0.0);
    }
}
