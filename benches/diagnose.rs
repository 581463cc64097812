use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nutrient_cf_rust::{DiagnosisEngine, KnowledgeBase, KnowledgeBaseStore, ReportGenerator};
use std::path::Path;
use std::sync::Arc;

const KB_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/knowledge_base.json");

fn bench_diagnose(c: &mut Criterion) {
    let kb = Arc::new(KnowledgeBase::load(Path::new(KB_PATH)).unwrap());
    let engine = DiagnosisEngine::new(Arc::clone(&kb));

    let input: Vec<(&str, f64)> = vec![
        ("G01", 0.6),
        ("G02", 0.8),
        ("G19", 0.8),
        ("G20", 1.0),
        ("G21", 0.6),
        ("G24", 0.4),
    ];

    c.bench_function("load_knowledge_base", |b| {
        b.iter(|| KnowledgeBase::load(black_box(Path::new(KB_PATH))).unwrap())
    });

    c.bench_function("cached_store_load", |b| {
        let store = KnowledgeBaseStore::from_path(KB_PATH);
        store.load().unwrap();
        b.iter(|| store.load().unwrap())
    });

    c.bench_function("calculate_cf_with_details", |b| {
        b.iter(|| engine.calculate_cf_with_details(black_box(input.iter().copied())).unwrap())
    });

    c.bench_function("calculate_cf_parallel", |b| {
        b.iter(|| engine.calculate_cf_parallel(black_box(input.iter().copied())).unwrap())
    });

    c.bench_function("generate_report", |b| {
        let diagnosis = engine.calculate_cf_with_details(input.iter().copied()).unwrap();
        b.iter(|| ReportGenerator::generate(&kb, black_box(&diagnosis)))
    });
}

criterion_group!(benches, bench_diagnose);
criterion_main!(benches);
