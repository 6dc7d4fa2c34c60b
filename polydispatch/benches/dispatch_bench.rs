//! Call-path benchmarks using criterion.
//!
//! Measures selection and invocation for direct matches, widened matches,
//! misses, and long candidate lists.
//!
//! Run with: cargo bench --bench dispatch_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polydispatch::{ConversionSpec, FunctionSpec, GuardSpec, OverloadedFn, TypeRegistry, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pair(f64, f64);

fn mul(extra: usize) -> OverloadedFn {
    let mut registry = TypeRegistry::new();
    let number = registry.declare("number");
    let text = registry.declare("string");
    let pair = registry.nominal::<Pair>();
    registry
        .add(
            GuardSpec::new()
                .guard(number, |v| v.is::<f64>())
                .guard(text, |v| v.is::<String>())
                .guard(pair, |v| v.is::<Pair>()),
        )
        .expect("guards");
    registry
        .add(ConversionSpec::new().conversion(number, pair, |v| {
            Value::new(Pair(*v.downcast_ref::<f64>().unwrap_or(&0.0), 0.0))
        }))
        .expect("conversions");

    // Padding overloads that never match numbers or pairs.
    let mut spec = FunctionSpec::new().named("mul");
    for _ in 0..extra {
        spec = spec.overload(vec![vec![text], vec![text]], |_| Value::unit());
    }
    spec = spec
        .overload(vec![vec![number], vec![number]], |args| {
            let a = args[0].downcast_ref::<f64>().copied().unwrap_or_default();
            let b = args[1].downcast_ref::<f64>().copied().unwrap_or_default();
            Value::new(a * b)
        })
        .overload(vec![vec![pair], vec![pair]], |args| {
            let a = args[0].downcast_ref::<Pair>().copied().unwrap_or(Pair(0.0, 0.0));
            let b = args[1].downcast_ref::<Pair>().copied().unwrap_or(Pair(0.0, 0.0));
            Value::new(Pair(a.0 * b.0 - a.1 * b.1, a.0 * b.1 + a.1 * b.0))
        });
    registry.compile(&spec).expect("compile")
}

/// Benchmark the three call outcomes
fn bench_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("call");
    let f = mul(0);

    group.bench_function("direct", |b| {
        b.iter(|| black_box(f.call(vec![Value::new(3.0_f64), Value::new(6.0_f64)])))
    });

    group.bench_function("widened", |b| {
        b.iter(|| black_box(f.call(vec![Value::new(3.0_f64), Value::new(Pair(0.0, 6.0))])))
    });

    group.bench_function("no_match", |b| {
        b.iter(|| black_box(f.call(vec![Value::new(3.0_f64), Value::new(String::from("6"))])))
    });

    group.finish();
}

/// Benchmark selection cost as the candidate list grows
fn bench_candidate_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_count");

    for extra in [0usize, 8, 64] {
        let f = mul(extra);
        group.bench_with_input(BenchmarkId::from_parameter(extra), &f, |b, f| {
            b.iter(|| black_box(f.call(vec![Value::new(Pair(1.0, 1.0)), Value::new(2.0_f64)])))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_call, bench_candidate_count);
criterion_main!(benches);
