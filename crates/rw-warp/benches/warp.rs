use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rw_core::Image;
use rw_warp::{Affine, Resize, Warp};

fn test_image(rows: usize, cols: usize) -> Image {
    let mut data = Vec::with_capacity(rows * cols);
    for i in 0..(rows * cols) {
        data.push((i % 251) as f32);
    }
    Image::from_vec([rows, cols], 1, data).expect("valid image")
}

fn bench_identity_warp(c: &mut Criterion) {
    let img = test_image(1024, 1280);
    let t = Affine::identity(2);

    c.bench_function("warp_to_shape_identity_1280x1024", |b| {
        b.iter(|| {
            let out = black_box(&img)
                .warp_to_shape(img.shape().clone(), &t, None)
                .expect("identity warp");
            black_box(out);
        });
    });
}

fn bench_batched_scale_warp(c: &mut Criterion) {
    let img = test_image(1024, 1280);
    let t = Affine::scaling(&[0.5, 0.5]);

    c.bench_function("warp_to_shape_scale_batched_64k", |b| {
        b.iter(|| {
            let out = black_box(&img)
                .warp_to_shape([512, 640], &t, Some(65536))
                .expect("scale warp");
            black_box(out);
        });
    });
}

fn bench_resize_half(c: &mut Criterion) {
    let img = test_image(1024, 1280);

    c.bench_function("resize_half_1280x1024", |b| {
        b.iter(|| {
            let out = black_box(&img).resize([512, 640]).expect("valid resize");
            black_box(out);
        });
    });
}

criterion_group!(
    benches,
    bench_identity_warp,
    bench_batched_scale_warp,
    bench_resize_half
);
criterion_main!(benches);
