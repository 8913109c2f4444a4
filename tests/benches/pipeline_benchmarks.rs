//! # Vote Pipeline Benchmarks
//!
//! Hot paths of a single vote: wire codec, reservation, routing and the
//! ingestion batch.
//!
//! ```bash
//! cargo bench --package vp-tests --bench pipeline_benchmarks
//! cargo bench --package vp-tests --bench pipeline_benchmarks -- reservation
//! ```

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_bus::{ConsumerChannel, Destination, InMemoryVoteBroker, VoteEnvelope, VotePublisher};
use shared_cache::{InMemoryCache, KeyValueCache};
use shared_types::{MockTimeSource, VoteChoice, VoteMessage, VoterKey};
use tokio::runtime::Runtime;
use vote_node::adapters::InMemoryVoteStore;
use vp_01_session_cache::SnapshotTtlPolicy;
use vp_02_vote_guard::{reservation_key, ReservationTtlPolicy};
use vp_03_vote_dispatcher::{decide, DispatcherConfig, VoteDispatcher};
use vp_04_vote_ingestion::{desired_workers, VoteIngestionApi, VoteIngestionConsumer};

fn voter(i: u64) -> VoterKey {
    VoterKey::normalize(&format!("{:011}", 40_000_000_000u64 + i))
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime")
}

fn bench_envelope_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");
    let envelope = VoteEnvelope::new(VoteMessage::new(7, voter(1), VoteChoice::Yes));
    let wire = envelope.to_wire().unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(&envelope).to_wire().unwrap())
    });
    group.bench_function("decode", |b| {
        b.iter(|| VoteEnvelope::from_wire(black_box(&wire)).unwrap())
    });
    group.finish();
}

fn bench_reservation(c: &mut Criterion) {
    let mut group = c.benchmark_group("reservation");
    let rt = runtime();
    let cache = InMemoryCache::new();
    let ttl = Duration::from_secs(3600);

    let mut next = 0u64;
    group.bench_function("first_vote", |b| {
        b.iter(|| {
            next += 1;
            let key = reservation_key(1, &voter(next));
            rt.block_on(cache.set_if_absent(&key, "1", ttl)).unwrap()
        })
    });

    let taken = reservation_key(1, &voter(0));
    rt.block_on(cache.set_if_absent(&taken, "1", ttl)).unwrap();
    group.bench_function("duplicate_vote", |b| {
        b.iter(|| rt.block_on(cache.set_if_absent(black_box(&taken), "1", ttl)).unwrap())
    });

    let snapshot = SnapshotTtlPolicy::default();
    let reservation = ReservationTtlPolicy::default();
    group.bench_function("ttl_policies", |b| {
        b.iter(|| {
            (
                snapshot.ttl_for(black_box(1_000_000), black_box(900_000)),
                reservation.ttl_for(black_box(1_000_000), black_box(900_000)),
            )
        })
    });
    group.finish();
}

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    let max_retries = DispatcherConfig::default().max_retries;

    group.bench_function("decide", |b| {
        b.iter(|| {
            for retry_count in 0..=max_retries {
                black_box(decide(black_box(retry_count), max_retries));
            }
        })
    });
    group.bench_function("desired_workers", |b| {
        b.iter(|| desired_workers(black_box(1_234), 50, 2, 4))
    });
    group.finish();
}

fn bench_ingestion_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion");
    let rt = runtime();

    for size in [1usize, 10, 50] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("batch", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let broker = InMemoryVoteBroker::new();
                    let consumer = VoteIngestionConsumer::new(
                        Arc::new(InMemoryVoteStore::new()),
                        Arc::new(VoteDispatcher::new(
                            Arc::new(broker.clone()),
                            DispatcherConfig::default(),
                        )),
                        Arc::new(MockTimeSource::new(1_700_000_000_000)),
                    );
                    rt.block_on(async {
                        for i in 0..size {
                            let message = VoteMessage::new(1, voter(i as u64), VoteChoice::Yes);
                            broker
                                .publish(Destination::Main, &VoteEnvelope::new(message))
                                .await
                                .unwrap();
                        }
                    });
                    (broker, consumer)
                },
                |(broker, consumer)| {
                    rt.block_on(async {
                        let mut channel = broker.channel();
                        let batch = channel
                            .receive_batch(size, Duration::from_millis(500))
                            .await
                            .unwrap();
                        consumer.process_batch(&mut channel, batch).await.unwrap()
                    })
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_envelope_codec,
    bench_reservation,
    bench_routing,
    bench_ingestion_batch
);
criterion_main!(benches);
