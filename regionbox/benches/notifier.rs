use std::hint::black_box;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use regionbox::{
    DeliveryPolicy, EventKind, EventPayload, NativeValue, Notifier, Overflow, RegionName,
};

const EVENTS: usize = 1_000;

fn payloads(count: usize) -> Vec<EventPayload> {
    (0..count)
        .map(|i| {
            EventPayload::new(
                RegionName::new("bench"),
                EventKind::Put,
                format!("key-{i}"),
                &NativeValue::from(format!("value-{i}")),
            )
            .unwrap()
        })
        .collect()
}

fn policies() -> Vec<(&'static str, DeliveryPolicy)> {
    vec![
        ("latest", DeliveryPolicy::Latest),
        ("bounded", DeliveryPolicy::default()),
        (
            "bounded_full",
            DeliveryPolicy::Bounded {
                capacity: NonZeroUsize::new(64).unwrap(),
                overflow: Overflow::DropOldest,
            },
        ),
    ]
}

/// Benchmark posting from one thread, then draining
fn bench_post_and_take(c: &mut Criterion) {
    let mut group = c.benchmark_group("notifier_post_take");
    group.throughput(Throughput::Elements(EVENTS as u64));

    for (name, policy) in policies() {
        let events = payloads(EVENTS);
        group.bench_with_input(BenchmarkId::from_parameter(name), &policy, |b, policy| {
            let notifier = Notifier::new(RegionName::new("bench"), *policy);
            b.iter(|| {
                for payload in events.iter().cloned() {
                    black_box(notifier.post(payload));
                }
                black_box(notifier.take());
            });
        });
    }
    group.finish();
}

/// Benchmark contended posting from several listener threads
fn bench_concurrent_post(c: &mut Criterion) {
    let mut group = c.benchmark_group("notifier_concurrent_post");

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((EVENTS * threads) as u64));
        let events = Arc::new(payloads(EVENTS));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let notifier = Arc::new(Notifier::new(
                RegionName::new("bench"),
                DeliveryPolicy::default(),
            ));
            b.iter(|| {
                thread::scope(|scope| {
                    for _ in 0..threads {
                        let notifier = Arc::clone(&notifier);
                        let events = Arc::clone(&events);
                        scope.spawn(move || {
                            for payload in events.iter().cloned() {
                                notifier.post(payload);
                            }
                        });
                    }
                });
                black_box(notifier.take());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_post_and_take, bench_concurrent_post);
criterion_main!(benches);
