use std::hint::black_box;
use std::str::FromStr;

use criterion::{Criterion, criterion_group, criterion_main};
use radixnum::{BigFloat, BigInteger, DecimalFraction};
use serde::{Deserialize, Serialize};

// ============================================================================
// JSON Serialization/Deserialization
// ============================================================================

fn bench_decimal_serialize_json(c: &mut Criterion) {
    c.bench_function("decimal_serialize_json", |b| {
        let d = DecimalFraction::from_str("123.456789").unwrap();
        b.iter(|| black_box(serde_json::to_string(black_box(&d)).unwrap()));
    });
}

fn bench_decimal_deserialize_json(c: &mut Criterion) {
    c.bench_function("decimal_deserialize_json", |b| {
        let json = r#""123.456789""#;
        b.iter(|| black_box(serde_json::from_str::<DecimalFraction>(black_box(json)).unwrap()));
    });
}

fn bench_big_integer_roundtrip_json(c: &mut Criterion) {
    c.bench_function("big_integer_roundtrip_json", |b| {
        let x = BigInteger::from_i32(7).pow(200).unwrap();
        b.iter(|| {
            let json = serde_json::to_string(black_box(&x)).unwrap();
            black_box(serde_json::from_str::<BigInteger>(&json).unwrap())
        });
    });
}

fn bench_big_float_roundtrip_json(c: &mut Criterion) {
    c.bench_function("big_float_roundtrip_json", |b| {
        let x = BigFloat::from_f64(123.456789).unwrap();
        b.iter(|| {
            let json = serde_json::to_string(black_box(&x)).unwrap();
            black_box(serde_json::from_str::<BigFloat>(&json).unwrap())
        });
    });
}

// ============================================================================
// Struct Serialization (common use case)
// ============================================================================

#[derive(Serialize, Deserialize)]
struct Trade {
    price: DecimalFraction,
    quantity: DecimalFraction,
    commission: DecimalFraction,
}

fn bench_struct_serialize_json(c: &mut Criterion) {
    c.bench_function("decimal_struct_serialize_json", |b| {
        let trade = Trade {
            price: DecimalFraction::from_str("123.45").unwrap(),
            quantity: DecimalFraction::from_str("1000").unwrap(),
            commission: DecimalFraction::from_str("2.50").unwrap(),
        };
        b.iter(|| black_box(serde_json::to_string(black_box(&trade)).unwrap()));
    });
}

fn bench_struct_deserialize_json(c: &mut Criterion) {
    c.bench_function("decimal_struct_deserialize_json", |b| {
        let json = r#"{"price":"123.45","quantity":"1000","commission":"2.50"}"#;
        b.iter(|| black_box(serde_json::from_str::<Trade>(black_box(json)).unwrap()));
    });
}

// ============================================================================
// Binary Serialization (bincode)
// ============================================================================

fn bench_decimal_serialize_bincode(c: &mut Criterion) {
    c.bench_function("decimal_serialize_bincode", |b| {
        let d = DecimalFraction::from_str("123.456789").unwrap();
        b.iter(|| black_box(bincode::serialize(black_box(&d)).unwrap()));
    });
}

fn bench_decimal_deserialize_bincode(c: &mut Criterion) {
    c.bench_function("decimal_deserialize_bincode", |b| {
        let d = DecimalFraction::from_str("123.456789").unwrap();
        let bytes = bincode::serialize(&d).unwrap();
        b.iter(|| black_box(bincode::deserialize::<DecimalFraction>(black_box(&bytes)).unwrap()));
    });
}

fn bench_big_integer_roundtrip_bincode(c: &mut Criterion) {
    c.bench_function("big_integer_roundtrip_bincode", |b| {
        let x = BigInteger::from_i32(7).pow(200).unwrap();
        b.iter(|| {
            let bytes = bincode::serialize(black_box(&x)).unwrap();
            black_box(bincode::deserialize::<BigInteger>(&bytes).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_decimal_serialize_json,
    bench_decimal_deserialize_json,
    bench_big_integer_roundtrip_json,
    bench_big_float_roundtrip_json,
    bench_struct_serialize_json,
    bench_struct_deserialize_json,
    bench_decimal_serialize_bincode,
    bench_decimal_deserialize_bincode,
    bench_big_integer_roundtrip_bincode,
);

criterion_main!(benches);
