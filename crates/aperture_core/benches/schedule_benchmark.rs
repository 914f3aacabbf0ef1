//! Benchmark for the due-set selection scan.
//!
//! The scan runs once per simulation tick on the real-time-sensitive
//! stepping thread, so it has to stay cheap even with many sensors.
//!
//! Run with: cargo bench --package aperture_core --bench schedule_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use aperture_core::{select_due, DueCandidate, MaskPolicy, MaskTable, SensorId, SimTime};

fn candidates(n: u64) -> Vec<DueCandidate> {
    (1..=n)
        .map(|i| DueCandidate {
            id: SensorId(i),
            // Half the sensors are due, half are not.
            next_due: if i % 2 == 0 {
                SimTime::ZERO
            } else {
                SimTime::from_secs_f64(10.0)
            },
            rate_hz: 10.0 + (i % 30) as f64,
        })
        .collect()
}

fn bench_select_due(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_due");
    let policy = MaskPolicy::default();

    for &n in &[16u64, 256, 4096] {
        let cands = candidates(n);
        group.throughput(Throughput::Elements(n));
        group.bench_function(format!("{n}_sensors"), |b| {
            b.iter(|| {
                // Fresh table per iteration so masking work is included.
                let mut mask = MaskTable::new();
                let due = select_due(
                    black_box(SimTime::from_secs_f64(1.0)),
                    cands.iter().copied(),
                    &mut mask,
                    &policy,
                );
                black_box(due)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_select_due);
criterion_main!(benches);
