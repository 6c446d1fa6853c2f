use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mushroom_classifier::{ArtifactConfig, ArtifactStore, Classifier, Selection};
use std::path::PathBuf;

fn artifacts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("model")
}

fn setup_benchmark_classifier() -> Classifier {
    Classifier::builder()
        .with_artifacts_dir(artifacts_dir())
        .build()
        .unwrap()
}

fn selection(odor: &str) -> Selection {
    Selection::builder()
        .odor(odor)
        .gill_size("narrow")
        .gill_color("buff")
        .spore_print_color("white")
        .population("several")
        .stalk_surface_above_ring("smooth")
        .build()
        .unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let classifier = setup_benchmark_classifier();
    let mut group = c.benchmark_group("Pipeline");

    // Configure sampling
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    // Shallow leaf
    let foul = selection("foul");
    group.bench_function("encode", |b| b.iter(|| classifier.encode(black_box(&foul)).unwrap()));
    group.bench_function("predict_shallow", |b| {
        b.iter(|| classifier.predict(black_box(&foul)).unwrap())
    });

    // Deepest path through the tree
    let none = selection("none");
    group.bench_function("predict_deep", |b| {
        b.iter(|| classifier.predict(black_box(&none)).unwrap())
    });

    group.finish();
}

fn bench_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("Loading");
    group.sample_size(20);

    group.bench_function("cold_load", |b| {
        b.iter(|| {
            let store = ArtifactStore::new(ArtifactConfig::new(artifacts_dir()));
            store.load().unwrap()
        })
    });

    let store = ArtifactStore::new(ArtifactConfig::new(artifacts_dir()));
    store.load().unwrap();
    group.bench_function("cached_load", |b| b.iter(|| store.load().unwrap()));

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_loading);
criterion_main!(benches);
