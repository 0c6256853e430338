//! Benchmarks for vipsx file operations.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vipsx::{
    HeifSaveParams, JpegSaveParams, OutDimension, RuntimeConfig, ThumbnailParams, Vips,
};

/// Write a gradient PNG for benchmarking.
fn write_gradient_png(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join(format!("gradient_{}x{}.png", width, height));
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            (((x + y) * 127) / (width + height).max(1)) as u8,
        ])
    })
    .save(&path)
    .unwrap();
    path
}

fn vips() -> &'static Vips {
    Vips::init(RuntimeConfig::new("vipsx-bench")).unwrap()
}

fn bench_convert_jpeg(c: &mut Criterion) {
    let vips = vips();
    let dir = TempDir::new().unwrap();
    let mut group = c.benchmark_group("convert_jpeg");

    for &(width, height) in &[(256, 256), (1024, 768)] {
        let input = write_gradient_png(dir.path(), width, height);
        let output = dir.path().join("out.jpg");
        group.throughput(Throughput::Elements((width * height) as u64));

        for scale in [None, Some(0.5)] {
            let id = match scale {
                Some(s) => format!("{}x{}@{}", width, height, s),
                None => format!("{}x{}", width, height),
            };
            group.bench_with_input(BenchmarkId::new("q85", id), &input, |b, input| {
                b.iter(|| {
                    vips.convert_jpeg(
                        black_box(input),
                        &output,
                        &JpegSaveParams::new().quality(85),
                        scale,
                    )
                    .unwrap()
                });
            });
        }
    }

    group.finish();
}

fn bench_convert_heif(c: &mut Criterion) {
    let vips = vips();
    let dir = TempDir::new().unwrap();
    if !vips.check_encoders(dir.path()).unwrap().heif {
        return;
    }
    let input = write_gradient_png(dir.path(), 512, 512);
    let output = dir.path().join("out.avif");

    c.bench_function("convert_heif/avif_512x512", |b| {
        b.iter(|| {
            vips.convert_heif(black_box(&input), &output, &HeifSaveParams::new(), None)
                .unwrap()
        });
    });
}

fn bench_thumbnail(c: &mut Criterion) {
    let vips = vips();
    let dir = TempDir::new().unwrap();
    let input = write_gradient_png(dir.path(), 1024, 768);
    let mut group = c.benchmark_group("thumbnail");

    for outputs in [1usize, 4] {
        let params = ThumbnailParams {
            in_path: input.clone(),
            out_paths: (0..outputs)
                .map(|i| dir.path().join(format!("thumb_{}.jpg", i)))
                .collect(),
            out_dimension: OutDimension::Crop {
                width: 200,
                height: 200,
            },
        };
        group.bench_with_input(BenchmarkId::new("crop_200", outputs), &params, |b, params| {
            b.iter(|| vips.thumbnail(black_box(params)).unwrap());
        });
    }

    group.finish();
}

fn bench_read_image_info(c: &mut Criterion) {
    let vips = vips();
    let dir = TempDir::new().unwrap();
    let input = write_gradient_png(dir.path(), 1024, 768);

    c.bench_function("read_image_info", |b| {
        b.iter(|| vips.read_image_info(black_box(&input)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_convert_jpeg,
    bench_convert_heif,
    bench_thumbnail,
    bench_read_image_info
);
criterion_main!(benches);
