use criterion::{black_box, criterion_group, criterion_main, Criterion};

use neuromap::{Activation, Init, Loss, Mlp};

fn bench_network() -> Mlp<f32> {
    Mlp::new_with_seed(
        &[17, 32, 32, 8],
        &[Activation::ReLU, Activation::ReLU, Activation::Sigmoid],
        Loss::Mse,
        Init::Uniform,
        0,
    )
    .unwrap()
}

fn mlp_forward_bench(c: &mut Criterion) {
    let mut mlp = bench_network();
    let input = vec![0.1_f32; mlp.num_inputs()];

    c.bench_function("mlp_forward_17_32_32_8", |b| {
        b.iter(|| {
            let out = mlp.forward(black_box(&input), true).unwrap();
            black_box(out);
        })
    });
}

fn mlp_train_epoch_bench(c: &mut Criterion) {
    let mut mlp = bench_network();
    let features: Vec<Vec<f32>> = (0..8)
        .map(|i| vec![i as f32 / 8.0; mlp.num_inputs()])
        .collect();
    let labels: Vec<Vec<f32>> = (0..8)
        .map(|i| vec![i as f32 / 8.0; mlp.num_outputs()])
        .collect();

    c.bench_function("mlp_train_epoch_8_samples", |b| {
        b.iter(|| {
            let loss = mlp
                .train(black_box(&features), black_box(&labels), 0.1, 1, 0.0)
                .unwrap();
            black_box(loss);
        })
    });
}

fn mlp_train_batch_bench(c: &mut Criterion) {
    let mut mlp = bench_network();
    let features: Vec<Vec<f32>> = (0..8)
        .map(|i| vec![i as f32 / 8.0; mlp.num_inputs()])
        .collect();
    let labels: Vec<Vec<f32>> = (0..8)
        .map(|i| vec![i as f32 / 8.0; mlp.num_outputs()])
        .collect();

    c.bench_function("mlp_train_batch_8_samples_b4", |b| {
        b.iter(|| {
            let loss = mlp
                .train_batch(black_box(&features), black_box(&labels), 0.1, 1, 4, 0.0)
                .unwrap();
            black_box(loss);
        })
    });
}

criterion_group!(
    benches,
    mlp_forward_bench,
    mlp_train_epoch_bench,
    mlp_train_batch_bench
);
criterion_main!(benches);
