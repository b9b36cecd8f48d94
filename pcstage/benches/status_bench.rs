//! Benchmarks for status parsing and phase mapping.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pcstage::core::{PhaseOutcome, PrivateComputationStatus, StagePhase};

fn status_benchmark(c: &mut Criterion) {
    c.bench_function("parse_status", |b| {
        b.iter(|| {
            black_box("POST_PROCESSING_HANDLERS_FAILED")
                .parse::<PrivateComputationStatus>()
                .ok()
        })
    });

    c.bench_function("phase_status", |b| {
        b.iter(|| {
            StagePhase::ALL
                .iter()
                .map(|phase| phase.status(black_box(PhaseOutcome::Completed)))
                .filter(PrivateComputationStatus::is_terminal)
                .count()
        })
    });
}

criterion_group!(benches, status_benchmark);
criterion_main!(benches);
