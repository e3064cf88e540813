use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mxpred::{to_engine_layout, Images};

fn bench_single_image(c: &mut Criterion) {
    let shape = [224usize, 224, 3];
    let mut data = vec![0.0f32; 224 * 224 * 3];
    for (i, v) in data.iter_mut().enumerate() {
        *v = (i % 255) as f32 / 255.0;
    }

    c.bench_function("layout_224x224x3", |b| {
        b.iter(|| {
            let _ = black_box(to_engine_layout(Images::new(&shape, black_box(&data))));
        });
    });
}

fn bench_batch(c: &mut Criterion) {
    let shape = [28usize, 28, 1, 64];
    let mut data = vec![0.0f32; 28 * 28 * 64];
    for (i, v) in data.iter_mut().enumerate() {
        *v = (i % 28) as f32 * 0.1;
    }

    c.bench_function("layout_28x28x1x64", |b| {
        b.iter(|| {
            let _ = black_box(to_engine_layout(Images::new(&shape, black_box(&data))));
        });
    });
}

criterion_group!(benches, bench_single_image, bench_batch);
criterion_main!(benches);
