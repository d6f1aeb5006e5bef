use criterion::{criterion_group, criterion_main, Criterion};

use planar_image::{copy_to_image, GraphicView, ImageLayout, PlanarLayout};
use std::hint::black_box;

const IMAGE_WIDTH: u32 = 1920;
const IMAGE_HEIGHT: u32 = 1080;

fn run_benchmarks(c: &mut Criterion) {
    let size = IMAGE_WIDTH as usize * IMAGE_HEIGHT as usize * 3 / 2;

    let nv12 = GraphicView::new(
        vec![0x5Au8; size],
        PlanarLayout::yuv420_semiplanar(IMAGE_WIDTH, IMAGE_HEIGHT, false),
        IMAGE_WIDTH,
        IMAGE_HEIGHT,
    )
    .unwrap();
    let i420 = GraphicView::new(
        vec![0xA5u8; size],
        PlanarLayout::yuv420_planar(IMAGE_WIDTH, IMAGE_HEIGHT),
        IMAGE_WIDTH,
        IMAGE_HEIGHT,
    )
    .unwrap();

    let semiplanar = ImageLayout::yuv420_semiplanar(IMAGE_WIDTH, IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_HEIGHT);
    let planar = ImageLayout::yuv420_planar(IMAGE_WIDTH, IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_HEIGHT);

    let mut image = vec![0u8; size];

    c.bench_function("NV12 to NV12", |b| {
        b.iter(|| copy_to_image(black_box(&mut image), &semiplanar, &nv12).unwrap())
    });

    c.bench_function("NV12 to I420", |b| {
        b.iter(|| copy_to_image(black_box(&mut image), &planar, &nv12).unwrap())
    });

    c.bench_function("I420 to NV12", |b| {
        b.iter(|| copy_to_image(black_box(&mut image), &semiplanar, &i420).unwrap())
    });

    c.bench_function("I420 to I420", |b| {
        b.iter(|| copy_to_image(black_box(&mut image), &planar, &i420).unwrap())
    });
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
