// Annotation rendering benchmark - measure outline, label, and legend drawing time
//
// Run with: cargo bench --bench annotation_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, ImageBuffer, Rgba};
use moldetect_annotate::Annotator;
use moldetect_common::{BoundingBox, Detection, DetectionResult};

const CATEGORIES: [(&str, i64); 4] = [("[Mol]", 1), ("[Rct]", 3), ("[Pdt]", 4), ("[Idt]", 7)];

/// Deterministic grid of detections across the unit square
fn synthetic_result(count: usize) -> DetectionResult {
    let mut bboxes = Vec::with_capacity(count);
    for i in 0..count {
        let (category, category_id) = CATEGORIES[i % CATEGORIES.len()];
        let col = (i % 4) as f64;
        let row = ((i / 4) % 4) as f64;
        let x1 = 0.02 + col * 0.25;
        let y1 = 0.02 + row * 0.25;
        bboxes.push(Detection {
            category: category.to_string(),
            category_id,
            bbox: BoundingBox::new(x1, y1, x1 + 0.2, y1 + 0.2),
            score: 0.5 + (i as f64) * 0.01,
        });
    }

    let corefs = if count >= 2 {
        vec![vec![0, count - 1]]
    } else {
        Vec::new()
    };

    DetectionResult { bboxes, corefs }
}

/// Create test image (striped pattern)
fn synthetic_image(width: u32, height: u32) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([
            ((x + y) % 256) as u8,
            ((x * 2) % 256) as u8,
            ((y * 2) % 256) as u8,
            255,
        ])
    });
    DynamicImage::ImageRgba8(img)
}

/// Benchmark full rendering at different image resolutions
fn bench_image_sizes(c: &mut Criterion) {
    let Ok(annotator) = Annotator::new(None) else {
        eprintln!("Skipping annotation benchmarks: no usable font installed");
        return;
    };

    let mut group = c.benchmark_group("annotate_image_size");
    let result = synthetic_result(6);

    let resolutions = vec![(320, 240, "320x240"), (640, 480, "640x480"), (1280, 960, "1280x960")];

    for (width, height, name) in resolutions {
        let image = synthetic_image(width, height);

        group.bench_with_input(BenchmarkId::new("render", name), &image, |b, img| {
            b.iter(|| {
                let rendered = annotator
                    .render(black_box(img), black_box(&result), "bench")
                    .expect("Render failed");
                black_box(rendered);
            });
        });
    }

    group.finish();
}

/// Benchmark rendering against growing detection counts
fn bench_detection_counts(c: &mut Criterion) {
    let Ok(annotator) = Annotator::new(None) else {
        eprintln!("Skipping annotation benchmarks: no usable font installed");
        return;
    };

    let mut group = c.benchmark_group("annotate_detection_count");
    let image = synthetic_image(640, 480);

    for count in [1usize, 4, 16] {
        let result = synthetic_result(count);

        group.bench_with_input(BenchmarkId::from_parameter(count), &result, |b, result| {
            b.iter(|| {
                let rendered = annotator
                    .render(black_box(&image), black_box(result), "bench")
                    .expect("Render failed");
                black_box(rendered);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_image_sizes, bench_detection_counts);
criterion_main!(benches);
