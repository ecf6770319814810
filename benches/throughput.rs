use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use topic_observer::{DedupPolicy, MessageId, Observer, ObserverConfig, QueueInfo};

const KB: usize = 1024;

fn create_observer(dedup: DedupPolicy) -> Arc<Observer> {
    let config = ObserverConfig {
        name: "bench_observer".to_string(),
        dedup,
        ..Default::default()
    };
    Arc::new(Observer::new(config).unwrap())
}

fn append_and_consume(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_consume");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(1));

    for size in [32, KB, 64 * KB].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let observer = create_observer(DedupPolicy::default());
            let data = vec![1u8; size];

            b.iter(|| {
                let sqn = observer
                    .append_with_id("/bench/topic", MessageId::new(), black_box(data.clone()))
                    .unwrap();
                let payload = observer.read_message("/bench/topic", sqn).unwrap();
                black_box(payload);
                observer.consume_message("/bench/topic", sqn).unwrap();
            });
        });
    }
    group.finish();
}

fn dedup_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup_policy");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let policies = [
        ("disabled", DedupPolicy::Disabled),
        ("span_1024", DedupPolicy::SequenceSpan(1024)),
        ("count_1024", DedupPolicy::EntryCount(1024)),
    ];

    for (label, policy) in policies.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(label), policy, |b, &policy| {
            let observer = create_observer(policy);
            let data = vec![7u8; 64];
            let mut info = QueueInfo::new();

            b.iter(|| {
                let sqn = observer
                    .append_with_id("/bench/dedup", MessageId::new(), data.clone())
                    .unwrap();
                observer.queue_info_into("/bench/dedup", &mut info);
                observer.consume_message("/bench/dedup", black_box(sqn)).unwrap();
            });
        });
    }
    group.finish();
}

fn multiple_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_producer");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    for producers in [2usize, 4].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(producers),
            producers,
            |b, &producers| {
                b.iter(|| {
                    let observer = create_observer(DedupPolicy::default());
                    let barrier = Arc::new(Barrier::new(producers));
                    let handles: Vec<_> = (0..producers)
                        .map(|_| {
                            let observer = Arc::clone(&observer);
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                barrier.wait();
                                for _ in 0..1000 {
                                    observer
                                        .append_with_id("/bench/shared", MessageId::new(), vec![1u8; 32])
                                        .unwrap();
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, append_and_consume, dedup_policies, multiple_producers);
criterion_main!(benches);
