//! Absorption Benchmarks
//!
//! Performance benchmarks for curve evaluation and the optimizer.

use acoustica::{
    AbsorberEngine, BroadbandMetric, FrequencyAxis, Incidence, LayerSpec, Objective,
    OptimizeRequest, PanelKind, PorousModel, Stack,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn faced_stack() -> Stack {
    Stack::new(vec![
        LayerSpec::perforated(8.0, 30.0, 6.0, PanelKind::Ingard),
        LayerSpec::porous(13_000.0, 50.0, PorousModel::Miki),
        LayerSpec::air(50.0),
    ])
}

fn benchmark_normal_incidence(c: &mut Criterion) {
    let engine = AbsorberEngine::default();
    let stack = faced_stack();
    let axis = FrequencyAxis::log_spaced(20.0, 20_000.0, 12).unwrap();

    c.bench_function("normal_3_layers_121_freqs", |b| {
        b.iter(|| {
            engine
                .evaluate(black_box(&stack), &axis, Incidence::Normal)
                .unwrap();
        })
    });
}

fn benchmark_diffuse_field(c: &mut Criterion) {
    let engine = AbsorberEngine::default();
    let stack = faced_stack();
    let axis = FrequencyAxis::third_octave(50.0, 5000.0).unwrap();

    c.bench_function("diffuse_3_layers_third_octave", |b| {
        b.iter(|| {
            engine
                .evaluate(black_box(&stack), &axis, Incidence::Diffuse)
                .unwrap();
        })
    });
}

fn benchmark_optimizer(c: &mut Criterion) {
    let engine = AbsorberEngine::default();
    let request = OptimizeRequest::new(Objective::Broadband(BroadbandMetric::Nrc), 100.0)
        .with_frequency_axis(FrequencyAxis::third_octave(100.0, 4000.0).unwrap())
        .with_max_evaluations(300);

    let mut group = c.benchmark_group("optimizer");
    group.sample_size(10);
    group.bench_function("nrc_100mm_300_evals", |b| {
        b.iter(|| engine.optimize(black_box(&request)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_normal_incidence,
    benchmark_diffuse_field,
    benchmark_optimizer
);
criterion_main!(benches);
