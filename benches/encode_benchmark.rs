use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use hex2b32::base32::{self, Base32Encoder, EncoderConfig};
use hex2b32::convert;
use hex2b32::hex::HexErrorPolicy;

fn generate_bytes(len: usize) -> Vec<u8> {
    // xorshift so every carry pattern shows up
    let mut x: u32 = 0x9E37_79B9;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        })
        .collect()
}

fn generate_hex(len: usize, line_breaks: bool) -> Vec<u8> {
    let mut text = Vec::with_capacity(len * 2 + len / 32);
    for (i, b) in generate_bytes(len).into_iter().enumerate() {
        text.extend_from_slice(format!("{:02x}", b).as_bytes());
        if line_breaks && i % 32 == 31 {
            text.push(b'\n');
        }
    }
    text
}

fn bench_consume(c: &mut Criterion) {
    let mut group = c.benchmark_group("base32_consume");
    for size_mb in [1, 10] {
        let data = generate_bytes(size_mb * 1024 * 1024);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("state_machine", format!("{}MB", size_mb)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut enc = Base32Encoder::default();
                    let mut n = 0usize;
                    for &byte in black_box(data).iter() {
                        n += enc.consume(byte).len();
                    }
                    n + enc.finalize().len()
                })
            },
        );
    }
    group.finish();
}

fn bench_encode_to_writer(c: &mut Criterion) {
    let data = generate_bytes(4 * 1024 * 1024);
    let mut group = c.benchmark_group("base32_writer");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("4MB", |b| {
        let mut out = Vec::with_capacity(base32::encoded_len(data.len(), true));
        b.iter(|| {
            out.clear();
            base32::encode_to_writer(black_box(&data), EncoderConfig::default(), &mut out)
                .unwrap();
        })
    });
    group.finish();
}

fn bench_hex_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("hex_to_base32");
    for (name, policy, line_breaks) in [
        ("skip_lines", HexErrorPolicy::Skip, true),
        ("fatal", HexErrorPolicy::Fatal, false),
    ] {
        let text = generate_hex(4 * 1024 * 1024, line_breaks);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(name, |b| {
            let mut out = Vec::new();
            b.iter(|| {
                out.clear();
                convert::hex_to_base32(
                    black_box(&text[..]),
                    policy,
                    EncoderConfig::default(),
                    &mut out,
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_consume,
    bench_encode_to_writer,
    bench_hex_pipeline
);
criterion_main!(benches);
