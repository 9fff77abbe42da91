// Throughput benches for the chunked pipeline across worker counts.

use std::io::Cursor;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cryptainer_core::{CancellationToken, DecryptOptions, EncryptOptions, StreamCipher};

const CHUNK: usize = 256 * 1024;
const PAYLOAD: usize = 8 * 1024 * 1024;

fn master_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    for (i, b) in key.iter_mut().enumerate() {
        *b = i as u8;
    }
    key
}

fn payload() -> Vec<u8> {
    (0..PAYLOAD).map(|i| (i % 251) as u8).collect()
}

fn bench_encrypt(c: &mut Criterion) {
    let data = payload();
    let mut group = c.benchmark_group("encrypt");
    group.throughput(Throughput::Bytes(PAYLOAD as u64));

    for threads in [1usize, 2, 4, 8] {
        let cipher = StreamCipher::with_threads(master_key(), 7, threads).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, _| {
            b.iter(|| {
                let mut input = Cursor::new(data.clone());
                let mut output = Vec::with_capacity(data.len() + 64 * 1024);
                cipher
                    .encrypt(
                        &mut input,
                        &mut output,
                        &EncryptOptions::sized(CHUNK, data.len() as u64),
                        &CancellationToken::new(),
                    )
                    .unwrap();
                output
            });
        });
    }
    group.finish();
}

fn bench_decrypt(c: &mut Criterion) {
    let data = payload();
    let cipher = StreamCipher::with_threads(master_key(), 7, 4).unwrap();

    let mut input = Cursor::new(data.clone());
    let mut encrypted = Vec::new();
    cipher
        .encrypt(
            &mut input,
            &mut encrypted,
            &EncryptOptions::sized(CHUNK, data.len() as u64),
            &CancellationToken::new(),
        )
        .unwrap();

    let mut group = c.benchmark_group("decrypt");
    group.throughput(Throughput::Bytes(PAYLOAD as u64));

    for threads in [1usize, 2, 4, 8] {
        let cipher = StreamCipher::with_threads(master_key(), 7, threads).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, _| {
            b.iter(|| {
                let mut input = Cursor::new(encrypted.clone());
                let mut output = Vec::with_capacity(data.len());
                cipher
                    .decrypt(
                        &mut input,
                        &mut output,
                        &DecryptOptions::strict(),
                        &CancellationToken::new(),
                    )
                    .unwrap();
                output
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encrypt, bench_decrypt);
criterion_main!(benches);
