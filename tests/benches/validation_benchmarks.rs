//! # Coupon-Quorum Benchmarks
//!
//! | Path | Expectation |
//! |------|-------------|
//! | Filter lookup (hit or miss) | O(k) bit probes, no allocation |
//! | Length gate rejection | No lock, no I/O |
//! | Cached validation | One mutex acquisition |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::time::Duration;

use coupon_tests::fixtures::{quorum_sources, test_config, IN_ALL};
use coupon_validation::{CouponCode, CouponValidatorApi, MembershipFilter, StreamingQuorumValidator};

fn random_codes(count: usize) -> Vec<CouponCode> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let len = rng.gen_range(8..=10);
            let raw: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            CouponCode::normalize(&raw)
        })
        .collect()
}

// ============================================================================
// MEMBERSHIP FILTER
// ============================================================================

fn bench_filter_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership-filter");
    group.measurement_time(Duration::from_secs(5));

    for size in [10_000usize, 100_000, 1_000_000] {
        let inserted = random_codes(size);
        let mut filter = MembershipFilter::new_with_fpr(size, 0.01);
        for code in &inserted {
            filter.insert(code.as_bytes());
        }
        let absent = random_codes(1_000);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("contains_hit", size), &size, |b, _| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % inserted.len();
                black_box(filter.contains(inserted[i].as_bytes()))
            })
        });
        group.bench_with_input(BenchmarkId::new("contains_miss", size), &size, |b, _| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % absent.len();
                black_box(filter.contains(absent[i].as_bytes()))
            })
        });
    }

    group.finish();
}

// ============================================================================
// VALIDATOR
// ============================================================================

fn bench_validation(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let (_dir, locations) = quorum_sources().expect("fixture sources");
    let validator =
        StreamingQuorumValidator::streaming(&test_config()).expect("validator builds");
    runtime
        .block_on(validator.load(&locations))
        .expect("fixture loads");
    // Warm the cache
    assert!(runtime.block_on(validator.validate(IN_ALL)));

    let mut group = c.benchmark_group("quorum-validator");

    group.bench_function("length_gate_rejection", |b| {
        b.iter(|| black_box(runtime.block_on(validator.validate(black_box("SHORT")))))
    });

    group.bench_function("cached_validation", |b| {
        b.iter(|| black_box(runtime.block_on(validator.validate(black_box("  validabc ")))))
    });

    group.finish();
}

criterion_group!(benches, bench_filter_lookups, bench_validation);
criterion_main!(benches);
