//! Benchmarks for the per-cycle local work.
//!
//! One access cycle encodes a frame, encrypts the container and parses a
//! short response. On a Raspberry Pi class board the whole local part has
//! to stay well below the network round trip.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench pipeline_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fingergate_core::SharedSecret;
use fingergate_crypto::{derive_key, encrypt_stream, generate_iv};
use fingergate_imaging::{RawImage, encode};
use fingergate_protocol::parse_decision;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

/// Frame sizes of common optical sensors.
const SIZES: [(&str, u32, u32); 3] = [
    ("256x288", 256, 288),
    ("320x480", 320, 480),
    ("400x500", 400, 500),
];

fn frame(width: u32, height: u32) -> RawImage {
    let pixels = (0..width * height).map(|i| (i % 251) as u8).collect();
    RawImage::new(width, height, pixels).unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("bmp_encode");

    for (name, width, height) in SIZES {
        let image = frame(width, height);
        group.throughput(Throughput::Bytes(image.pixel_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &image, |b, image| {
            b.iter(|| black_box(encode(black_box(image)).unwrap()));
        });
    }

    group.finish();
}

fn bench_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt_stream");
    let key = derive_key(&SharedSecret::new("YourSecretKey123"));
    let iv = generate_iv(&mut StdRng::seed_from_u64(0));

    for (name, width, height) in SIZES {
        let container = encode(&frame(width, height)).unwrap();
        group.throughput(Throughput::Bytes(container.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &container.bytes,
            |b, bytes| {
                b.iter(|| {
                    let mut out = Vec::with_capacity(bytes.len() + 32);
                    encrypt_stream(black_box(&bytes[..]), &mut out, &key, &iv).unwrap();
                    black_box(out)
                });
            },
        );
    }

    group.finish();
}

fn bench_parse_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_decision");
    group.throughput(Throughput::Elements(1));

    let cases = [
        ("grant", r#"{"success":true,"message":"ok","nameOfUser":"Alice"}"#),
        ("deny", r#"{"success":false,"message":"Unknown finger"}"#),
        ("empty", ""),
    ];

    for (name, body) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &body, |b, body| {
            b.iter(|| black_box(parse_decision(black_box(body))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_encrypt, bench_parse_decision);
criterion_main!(benches);
