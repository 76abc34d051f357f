use criterion::BenchmarkId;
use criterion::Throughput;
use criterion::{criterion_group, criterion_main, Criterion};
use narcore::{BudgetValue, LinkNoveltyTracker, TaskLink};

fn benchmark_novel_within_horizon(c: &mut Criterion) {
    let mut tracker = LinkNoveltyTracker::new(u32::MAX, 100);
    for key in 0..99u32 {
        tracker.novel(&key, 0, u64::MAX, false);
    }

    c.bench_function("novel within horizon", |b| {
        b.iter(|| {
            tracker.novel(&50, 1, u64::MAX, false);
        });
    });
}

fn benchmark_novel_insert_evict(c: &mut Criterion) {
    let mut tracker = LinkNoveltyTracker::new(u32::MAX, 100);
    let mut key = 0u32;

    c.bench_function("novel insert with eviction", |b| {
        b.iter(|| {
            tracker.novel(&key, u64::from(key), 1_000, false);
            key = key.wrapping_add(1) % (u32::MAX - 1);
        });
    });
}

fn benchmark_refresh_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh_cycle");

    for record_length in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*record_length as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(record_length),
            record_length,
            |b, &record_length| {
                let mut link = TaskLink::new(u32::MAX, None, BudgetValue::default(), record_length);
                let mut time = 0u64;
                b.iter(|| {
                    // Horizon 1 makes every recurring key novel again and moves it to the tail
                    for key in 0..record_length as u32 {
                        link.novel(&key, time, 1);
                    }
                    time += 1;
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_novel_within_horizon,
    benchmark_novel_insert_evict,
    benchmark_refresh_cycle
);
criterion_main!(benches);
