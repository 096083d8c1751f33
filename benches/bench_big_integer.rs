use std::hint::black_box;
use std::str::FromStr;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use radixnum::BigInteger;

/// A pseudo-random integer of roughly `digits` decimal digits.
fn operand(digits: usize, seed: u64) -> BigInteger {
    let mut state = seed;
    let text: String = (0..digits)
        .map(|i| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let digit = ((state >> 33) % 10) as u8;
            char::from(b'0' + if i == 0 { digit.max(1) } else { digit })
        })
        .collect();
    BigInteger::from_str(&text).unwrap()
}

fn bench_multiplication(c: &mut Criterion) {
    let mut group = c.benchmark_group("big_integer_multiply");
    for digits in [20, 200, 2000] {
        let x = operand(digits, 1);
        let y = operand(digits, 2);
        group.bench_with_input(BenchmarkId::from_parameter(digits), &digits, |b, _| {
            b.iter(|| black_box(black_box(&x).multiply(black_box(&y))));
        });
    }
    group.finish();
}

fn bench_division(c: &mut Criterion) {
    let mut group = c.benchmark_group("big_integer_div_rem");
    for digits in [20, 200, 2000] {
        let x = operand(digits * 2, 3);
        let y = operand(digits, 4);
        group.bench_with_input(BenchmarkId::from_parameter(digits), &digits, |b, _| {
            b.iter(|| black_box(black_box(&x).div_rem(black_box(&y)).unwrap()));
        });
    }
    group.finish();
}

fn bench_to_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("big_integer_to_string");
    for digits in [20, 200, 2000] {
        let x = operand(digits, 5);
        group.bench_with_input(BenchmarkId::from_parameter(digits), &digits, |b, _| {
            b.iter(|| black_box(black_box(&x).to_string()));
        });
    }
    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    c.bench_function("big_integer_parsing_200_digits", |b| {
        let text = operand(200, 6).to_string();
        b.iter(|| black_box(BigInteger::from_str(black_box(&text)).unwrap()));
    });
}

fn bench_pow(c: &mut Criterion) {
    c.bench_function("big_integer_pow_7_500", |b| {
        let seven = BigInteger::from_i32(7);
        b.iter(|| black_box(black_box(&seven).pow(500).unwrap()));
    });
}

fn bench_sqrt(c: &mut Criterion) {
    c.bench_function("big_integer_sqrt_200_digits", |b| {
        let x = operand(200, 7);
        b.iter(|| black_box(black_box(&x).sqrt().unwrap()));
    });
}

fn bench_gcd(c: &mut Criterion) {
    c.bench_function("big_integer_gcd_100_digits", |b| {
        let x = operand(100, 8);
        let y = operand(100, 9);
        b.iter(|| black_box(black_box(&x).gcd(black_box(&y))));
    });
}

fn bench_bytes(c: &mut Criterion) {
    c.bench_function("big_integer_bytes_round_trip", |b| {
        let x = operand(200, 10).negate();
        b.iter(|| {
            let bytes = black_box(&x).to_bytes(true);
            black_box(BigInteger::from_bytes(&bytes, true))
        });
    });
}

criterion_group!(
    benches,
    bench_multiplication,
    bench_division,
    bench_to_string,
    bench_parsing,
    bench_pow,
    bench_sqrt,
    bench_gcd,
    bench_bytes,
);

criterion_main!(benches);
