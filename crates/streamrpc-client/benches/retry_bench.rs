// Criterion benchmarks for the streamrpc-client retry machinery
//
// Run benchmarks with:
//   cargo bench -p streamrpc-client

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;
use streamrpc_client::{exponential_backoff, RetryPolicy};
use streamrpc_common::{RpcError, StatusCode};

fn bench_backoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("backoff");

    group.bench_function("uncapped_attempt", |b| {
        b.iter(|| {
            exponential_backoff(
                black_box(3),
                black_box(Duration::from_millis(500)),
                black_box(Duration::from_secs(3600)),
            )
        });
    });

    group.bench_function("capped_attempt", |b| {
        b.iter(|| {
            exponential_backoff(
                black_box(20),
                black_box(Duration::from_millis(500)),
                black_box(Duration::from_secs(60)),
            )
        });
    });

    group.finish();
}

fn bench_policy_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_evaluation");

    let policy = RetryPolicy::response_not_ok();
    let retryable = RpcError::new(StatusCode::Unavailable, "draining");
    let ok = RpcError::new(StatusCode::Ok, "");

    group.bench_function("predicate_retryable", |b| {
        b.iter(|| (policy.should_retry)(black_box(&retryable)));
    });

    group.bench_function("predicate_not_retryable", |b| {
        b.iter(|| (policy.should_retry)(black_box(&ok)));
    });

    group.finish();
}

fn bench_policy_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_construction");

    group.bench_function("never", |b| {
        b.iter(RetryPolicy::never);
    });

    group.bench_function("exponential", |b| {
        b.iter(|| {
            RetryPolicy::exponential(
                black_box(Duration::from_millis(500)),
                black_box(Some(Duration::from_secs(60))),
            )
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_backoff,
    bench_policy_evaluation,
    bench_policy_construction,
);
criterion_main!(benches);
