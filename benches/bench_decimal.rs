use std::hint::black_box;
use std::str::FromStr;

use criterion::{Criterion, criterion_group, criterion_main};
use radixnum::{BigFloat, DecimalFraction, PrecisionContext};

fn bench_addition(c: &mut Criterion) {
    c.bench_function("decimal_addition", |b| {
        let ctx = PrecisionContext::decimal64();
        let x = DecimalFraction::from_str("123.456789").unwrap();
        let y = DecimalFraction::from_str("987.654321").unwrap();
        b.iter(|| black_box(black_box(&x).add(black_box(&y), &ctx).unwrap()));
    });
}

fn bench_addition_far_apart(c: &mut Criterion) {
    c.bench_function("decimal_addition_far_apart", |b| {
        let ctx = PrecisionContext::decimal64();
        let x = DecimalFraction::from_str("1E+1000").unwrap();
        let y = DecimalFraction::from_str("1E-1000").unwrap();
        b.iter(|| black_box(black_box(&x).add(black_box(&y), &ctx).unwrap()));
    });
}

fn bench_multiplication(c: &mut Criterion) {
    c.bench_function("decimal_multiplication", |b| {
        let ctx = PrecisionContext::decimal64();
        let x = DecimalFraction::from_str("123.456789").unwrap();
        let y = DecimalFraction::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(&x).multiply(black_box(&y), &ctx).unwrap()));
    });
}

fn bench_division(c: &mut Criterion) {
    c.bench_function("decimal_division", |b| {
        let ctx = PrecisionContext::decimal64();
        let x = DecimalFraction::from_str("123.456789").unwrap();
        let y = DecimalFraction::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(&x).divide(black_box(&y), &ctx).unwrap()));
    });
}

fn bench_division_decimal128(c: &mut Criterion) {
    c.bench_function("decimal_division_decimal128", |b| {
        let ctx = PrecisionContext::decimal128();
        let x = DecimalFraction::from_i64(1);
        let y = DecimalFraction::from_i64(7);
        b.iter(|| black_box(black_box(&x).divide(black_box(&y), &ctx).unwrap()));
    });
}

fn bench_parsing(c: &mut Criterion) {
    c.bench_function("decimal_parsing", |b| {
        b.iter(|| black_box(DecimalFraction::from_str(black_box("123.456789")).unwrap()));
    });
}

fn bench_formatting(c: &mut Criterion) {
    c.bench_function("decimal_formatting", |b| {
        let d = DecimalFraction::from_str("123.456789").unwrap();
        b.iter(|| black_box(format!("{}", d)));
    });
}

fn bench_quantize(c: &mut Criterion) {
    c.bench_function("decimal_quantize_to_2_places", |b| {
        let ctx = PrecisionContext::decimal64();
        let d = DecimalFraction::from_str("123.456789").unwrap();
        let cents = DecimalFraction::from_str("0.01").unwrap();
        b.iter(|| black_box(black_box(&d).quantize(&cents, &ctx).unwrap()));
    });
}

fn bench_sum(c: &mut Criterion) {
    c.bench_function("decimal_sum_1000_values", |b| {
        let ctx = PrecisionContext::unlimited();
        let values: Vec<DecimalFraction> = (0..1000)
            .map(|i| DecimalFraction::from_str(&format!("{}.{:02}", i, i % 100)).unwrap())
            .collect();
        b.iter(|| {
            black_box(
                values
                    .iter()
                    .try_fold(DecimalFraction::zero(), |acc, v| acc.add(v, &ctx))
                    .unwrap(),
            )
        });
    });
}

fn bench_comparison(c: &mut Criterion) {
    c.bench_function("decimal_comparison", |b| {
        let x = DecimalFraction::from_str("123.456789").unwrap();
        let y = DecimalFraction::from_str("123.456790").unwrap();
        b.iter(|| black_box(black_box(&x).compare_to(black_box(&y))));
    });
}

fn bench_to_f64(c: &mut Criterion) {
    c.bench_function("decimal_to_f64", |b| {
        let d = DecimalFraction::from_str("123.456789").unwrap();
        b.iter(|| black_box(black_box(&d).to_f64()));
    });
}

fn bench_from_f64(c: &mut Criterion) {
    c.bench_function("decimal_from_f64", |b| {
        b.iter(|| black_box(DecimalFraction::from_f64(black_box(123.456789)).unwrap()));
    });
}

fn bench_big_float_division(c: &mut Criterion) {
    c.bench_function("big_float_division_binary64", |b| {
        let ctx = PrecisionContext::binary64();
        let x = BigFloat::from_f64(123.456789).unwrap();
        let y = BigFloat::from_f64(9.876543).unwrap();
        b.iter(|| black_box(black_box(&x).divide(black_box(&y), &ctx).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_addition,
    bench_addition_far_apart,
    bench_multiplication,
    bench_division,
    bench_division_decimal128,
    bench_parsing,
    bench_formatting,
    bench_quantize,
    bench_sum,
    bench_comparison,
    bench_to_f64,
    bench_from_f64,
    bench_big_float_division,
);

criterion_main!(benches);
