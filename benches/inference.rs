//! Inference benchmark: isolation forest fit and batch scoring.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nids_sentinel::features::{to_matrix, FeatureVector, FEATURE_COUNT};
use nids_sentinel::model::{synthetic_model, AnomalyModel, ForestParams, IsolationForest, ModelHandle};
use nids_sentinel::scoring::AnomalyScorer;
use ndarray::Array2;
use std::sync::Arc;

fn vectors(n: usize) -> Vec<FeatureVector> {
    (0..n)
        .map(|i| {
            let mut v = [0.0; FEATURE_COUNT];
            for (j, x) in v.iter_mut().enumerate() {
                *x = ((i * 31 + j * 7) % 100) as f64 / 100.0;
            }
            FeatureVector::new(v)
        })
        .collect()
}

fn bench_forest_fit(c: &mut Criterion) {
    let data = Array2::from_shape_fn((1_000, FEATURE_COUNT), |(i, j)| ((i * 13 + j) % 97) as f64);
    let params = ForestParams::default();

    c.bench_function("forest_fit_1000x10", |b| {
        b.iter(|| black_box(IsolationForest::fit(data.view(), &params)))
    });
}

fn bench_decision_function(c: &mut Criterion) {
    let forest = synthetic_model().unwrap();

    let mut g = c.benchmark_group("decision_function_by_rows");
    for n in [1usize, 100, 1_000, 10_000] {
        let matrix = to_matrix(&vectors(n));
        g.bench_function(format!("rows_{}", n).as_str(), |b| {
            b.iter(|| forest.decision_function(black_box(matrix.view())))
        });
    }
    g.finish();
}

fn bench_score_batch(c: &mut Criterion) {
    let scorer = AnomalyScorer::new(ModelHandle::with_model(Arc::new(synthetic_model().unwrap())));
    let batch = vectors(1_000);

    c.bench_function("score_batch_1000", |b| {
        b.iter(|| black_box(scorer.score_batch(black_box(&batch))))
    });
}

criterion_group!(benches, bench_forest_fit, bench_decision_function, bench_score_batch);
criterion_main!(benches);
