use std::hint::black_box;
use std::str::FromStr;

use criterion::{Criterion, criterion_group, criterion_main};
use radixnum::{DecimalFraction, PrecisionContext};
use rust_decimal::{Decimal, RoundingStrategy};

// Side-by-side timings against a fixed 96-bit decimal. `cli_decimal` rounds
// to the same 96-bit coefficient and 28-place scale.

fn bench_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("addition");
    group.bench_function("rust_decimal", |b| {
        let x = Decimal::from_str("123.456789").unwrap();
        let y = Decimal::from_str("987.654321").unwrap();
        b.iter(|| black_box(black_box(x) + black_box(y)));
    });
    group.bench_function("radixnum", |b| {
        let ctx = PrecisionContext::cli_decimal();
        let x = DecimalFraction::from_str("123.456789").unwrap();
        let y = DecimalFraction::from_str("987.654321").unwrap();
        b.iter(|| black_box(black_box(&x).add(black_box(&y), &ctx).unwrap()));
    });
    group.finish();
}

fn bench_multiplication(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiplication");
    group.bench_function("rust_decimal", |b| {
        let x = Decimal::from_str("123.456789").unwrap();
        let y = Decimal::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(x) * black_box(y)));
    });
    group.bench_function("radixnum", |b| {
        let ctx = PrecisionContext::cli_decimal();
        let x = DecimalFraction::from_str("123.456789").unwrap();
        let y = DecimalFraction::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(&x).multiply(black_box(&y), &ctx).unwrap()));
    });
    group.finish();
}

fn bench_division(c: &mut Criterion) {
    let mut group = c.benchmark_group("division");
    group.bench_function("rust_decimal", |b| {
        let x = Decimal::from_str("123.456789").unwrap();
        let y = Decimal::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(x) / black_box(y)));
    });
    group.bench_function("radixnum", |b| {
        let ctx = PrecisionContext::cli_decimal();
        let x = DecimalFraction::from_str("123.456789").unwrap();
        let y = DecimalFraction::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(&x).divide(black_box(&y), &ctx).unwrap()));
    });
    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.bench_function("rust_decimal", |b| {
        b.iter(|| black_box(Decimal::from_str(black_box("123.456789")).unwrap()));
    });
    group.bench_function("radixnum", |b| {
        b.iter(|| black_box(DecimalFraction::from_str(black_box("123.456789")).unwrap()));
    });
    group.finish();
}

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.bench_function("rust_decimal", |b| {
        let d = Decimal::from_str("123.456789").unwrap();
        b.iter(|| black_box(format!("{}", d)));
    });
    group.bench_function("radixnum", |b| {
        let d = DecimalFraction::from_str("123.456789").unwrap();
        b.iter(|| black_box(format!("{}", d)));
    });
    group.finish();
}

fn bench_rounding(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_to_2_decimals");
    group.bench_function("rust_decimal", |b| {
        let d = Decimal::from_str("123.456789").unwrap();
        b.iter(|| {
            black_box(black_box(d).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        });
    });
    group.bench_function("radixnum", |b| {
        let ctx = PrecisionContext::decimal64();
        let d = DecimalFraction::from_str("123.456789").unwrap();
        let cents = DecimalFraction::from_str("0.01").unwrap();
        b.iter(|| black_box(black_box(&d).quantize(&cents, &ctx).unwrap()));
    });
    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison");
    group.bench_function("rust_decimal", |b| {
        let x = Decimal::from_str("123.456789").unwrap();
        let y = Decimal::from_str("123.456790").unwrap();
        b.iter(|| black_box(black_box(x) < black_box(y)));
    });
    group.bench_function("radixnum", |b| {
        let x = DecimalFraction::from_str("123.456789").unwrap();
        let y = DecimalFraction::from_str("123.456790").unwrap();
        b.iter(|| black_box(black_box(&x).compare_to(black_box(&y)).is_lt()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_addition,
    bench_multiplication,
    bench_division,
    bench_parsing,
    bench_formatting,
    bench_rounding,
    bench_comparison,
);

criterion_main!(benches);
